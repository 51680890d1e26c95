//! Simple stopwatch for measuring elapsed time.

use std::time::Instant;

/// A lightweight stopwatch.
///
/// It is `Copy`, so one watch started at process launch can be handed to any number
/// of handlers to report the uptime.
#[derive(Clone, Copy, Debug)]
pub struct Watch {
    start: Instant,
}

impl Watch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed seconds with sub-second precision.
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
