use std::{fmt::Display, time::Instant};

use crate::logvbln;

/// Logs how long a scope took once it is dropped (verbose level).
pub struct Benchmark {
    time: Instant,
    label: String,
}

impl Benchmark {
    const CC: &str = "Benchmark";

    pub fn start<L: Into<String>>(label: L) -> Self {
        Self {
            label: label.into(),
            time: Instant::now(),
        }
    }
}

impl Drop for Benchmark {
    fn drop(&mut self) {
        logvbln!("{}: {}", self.label, self);
    }
}

impl Display for Benchmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let duration = self.time.elapsed();

        if duration.as_secs() > 60 {
            write!(
                f,
                "{:0>2}:{:0>2}min",
                duration.as_secs() / 60,
                duration.as_secs() % 60
            )
        } else {
            write!(f, "{}ms", duration.as_millis())
        }
    }
}
