use std::{collections::HashMap, sync::RwLock};

use crate::util::config::LoggingSection;

pub(crate) static LOGGER_CONFIG: once_cell::sync::Lazy<RwLock<LoggingConfig>> =
    once_cell::sync::Lazy::new(|| RwLock::new(LoggingConfig::default()));

#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub enum LogLevel {
    INFO,
    VERBOSE,
}

/// Logs for the component named by the enclosing impl's `CC`.
#[macro_export]
macro_rules! logln {
    ($($arg:tt)*) => {
        if $crate::util::logging::is_enabled(Self::CC) {
            println!("[{} {}:{}] {}", Self::CC, file!(), line!(), format_args!($($arg)*));
        }
    };
}

/// Like `logln!`, only when the component is verbose.
#[macro_export]
macro_rules! logvbln {
    ($($arg:tt)*) => {
        if $crate::util::logging::is_at_level(Self::CC, $crate::util::logging::LogLevel::VERBOSE) {
            println!("[{} {}:{}] {}", Self::CC, file!(), line!(), format_args!($($arg)*));
        }
    };
}

pub fn is_enabled(cc: &str) -> bool {
    LOGGER_CONFIG
        .read()
        .map(|config| config.cc_enabled(cc))
        .unwrap_or(false)
}

pub fn is_at_level(cc: &str, level: LogLevel) -> bool {
    LOGGER_CONFIG
        .read()
        .map(|config| config.cc_enabled(cc) && config.cc_at_level(cc, level))
        .unwrap_or(false)
}

/// Replaces the process-wide logging setup with the one from the config file.
pub fn apply(section: &LoggingSection) {
    if let Ok(mut config) = LOGGER_CONFIG.write() {
        *config = LoggingConfig::from(section);
    }
}

pub struct LoggingConfig {
    enabled: bool,
    global_level: LogLevel,
    flags: HashMap<String, (bool, LogLevel)>, // <component, (enabled, level)>
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            global_level: LogLevel::INFO,
            flags: Default::default(),
        }
    }
}

impl From<&LoggingSection> for LoggingConfig {
    fn from(section: &LoggingSection) -> Self {
        let mut config = LoggingConfig {
            enabled: section.enabled,
            global_level: if section.verbose {
                LogLevel::VERBOSE
            } else {
                LogLevel::INFO
            },
            flags: HashMap::new(),
        };

        for cc in &section.verbose_components {
            config.enable_cc(cc, LogLevel::VERBOSE);
        }
        // muting wins over verbosity
        for cc in &section.muted {
            config.disable_cc(cc);
        }

        config
    }
}

impl LoggingConfig {
    pub fn cc_enabled(&self, cc: &str) -> bool {
        if !self.enabled {
            return false;
        }

        self.flags.get(cc).map_or(true, |(enabled, _)| *enabled)
    }

    pub fn cc_at_level(&self, cc: &str, level: LogLevel) -> bool {
        if self.global_level >= level {
            return true;
        }

        self.flags.get(cc).map_or(false, |(_, cc_level)| *cc_level >= level)
    }

    pub fn enable_cc(&mut self, cc: &str, level: LogLevel) {
        self.flags.insert(cc.to_string(), (true, level));
    }

    pub fn disable_cc(&mut self, cc: &str) {
        self.flags.insert(cc.to_string(), (false, LogLevel::INFO));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_log_info_everywhere() {
        let config = LoggingConfig::default();
        assert!(config.cc_enabled("Session"));
        assert!(config.cc_at_level("Session", LogLevel::INFO));
        assert!(!config.cc_at_level("Session", LogLevel::VERBOSE));
    }

    #[test]
    fn section_picks_verbose_and_muted_components() {
        let section = LoggingSection {
            enabled: true,
            verbose: false,
            verbose_components: vec!["Synchronizer".to_string(), "Benchmark".to_string()],
            muted: vec!["Benchmark".to_string()],
        };
        let config = LoggingConfig::from(&section);

        assert!(config.cc_at_level("Synchronizer", LogLevel::VERBOSE));
        assert!(!config.cc_at_level("Session", LogLevel::VERBOSE));
        assert!(!config.cc_enabled("Benchmark"));
        assert!(config.cc_enabled("Session"));
    }

    #[test]
    fn switched_off_silences_everything() {
        let section = LoggingSection {
            enabled: false,
            verbose: true,
            ..Default::default()
        };
        let config = LoggingConfig::from(&section);
        assert!(!config.cc_enabled("RouteFetcher"));
        assert!(config.cc_at_level("RouteFetcher", LogLevel::VERBOSE));
    }
}
