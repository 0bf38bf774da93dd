// src/dev_utils.rs

use std::time::Instant;

/// A simple RAII timer for profiling deployment steps.
/// When created, it records the start time. When it goes out of scope (is dropped),
/// it logs the elapsed time at debug level.
#[derive(Debug)]
pub struct StepTimer {
    name: String,
    start: Instant,
}

impl StepTimer {
    /// Creates a new timer and starts it immediately.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for StepTimer {
    fn drop(&mut self) {
        log::debug!(
            "step [{}] took {} ms",
            self.name,
            self.start.elapsed().as_millis()
        );
    }
}
