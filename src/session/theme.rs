/// Day/night state of the map.
///
/// With the natural cycle on, `dark` follows the daylight checks; with it off
/// the user switches it by hand. Every check gets a number and only the
/// newest one may land, and none at all once the natural cycle is off.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    natural_cycle: bool,
    dark: bool,
    check: u64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            natural_cycle: true,
            dark: false,
            check: 0,
        }
    }
}

impl Theme {
    pub fn natural_cycle(&self) -> bool {
        self.natural_cycle
    }

    pub fn dark(&self) -> bool {
        self.dark
    }

    /// Number for a new daylight check, if checks are wanted at all.
    pub fn begin_check(&mut self) -> Option<u64> {
        if !self.natural_cycle {
            return None;
        }

        self.check += 1;
        Some(self.check)
    }

    /// Returns the check to start, if any.
    pub fn set_natural_cycle(&mut self, enabled: bool) -> Option<u64> {
        self.natural_cycle = enabled;

        if enabled {
            self.begin_check()
        } else {
            // outstanding checks must not flip a manual choice
            self.check += 1;
            None
        }
    }

    /// Manual switch; ignored while the natural cycle is on.
    pub fn set_dark(&mut self, dark: bool) -> bool {
        if self.natural_cycle {
            return false;
        }

        self.dark = dark;
        true
    }

    pub fn daylight_checked(&mut self, check: u64, dark: bool) -> bool {
        if !self.natural_cycle || check != self.check {
            return false;
        }

        self.dark = dark;
        true
    }
}
