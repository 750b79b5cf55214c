//! Wall-clock tick scheduling for the interactive shell.

use std::time::{Duration, Instant};

/// Accumulates wall-clock time into whole one-second ticks.
///
/// The shell drains due ticks before handling each command, so a long
/// pause between inputs still advances the stopwatch by the right
/// number of seconds.
#[derive(Debug)]
pub struct TickClock {
    last: Instant,
}

impl TickClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Whole seconds elapsed since the last drain; the sub-second
    /// remainder carries over to the next call.
    pub fn due_ticks(&mut self) -> u64 {
        let ticks = self.last.elapsed().as_secs();
        self.last += Duration::from_secs(ticks);
        ticks
    }

    /// Drops accumulated time. Called while the stopwatch is stopped so
    /// stopped time never turns into ticks.
    pub fn rearm(&mut self) {
        self.last = Instant::now();
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}
