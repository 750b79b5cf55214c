//! The one-second stopwatch bound to today's ledger entry.

use chrono::NaiveDate;

use crate::duration::Duration;
use crate::settings::Settings;

/// What the caller may do with the bound ledger entry after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Update the visible readout only; the bound entry must not be
    /// written this tick.
    ReadoutOnly,
    /// The bound entry may be overwritten with the new elapsed value.
    WriteThrough,
}

/// Stopwatch state machine: `Stopped <-> Running`, toggle only.
///
/// Running status is never persisted; a fresh engine always starts
/// stopped with its elapsed value re-seeded from today's ledger cell.
///
/// Suspension covers in-progress manual edits of today's cell. Once the
/// edit commits ([`TimerEngine::resolve_edit`]) the suspension expires
/// on the next tick boundary rather than on an explicit resume; that
/// expiring tick reports [`TickOutcome::ReadoutOnly`] so a suspended
/// tick never writes the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEngine {
    running: bool,
    elapsed: Duration,
    bound_date: NaiveDate,
    suspended: bool,
    resume_pending: bool,
}

impl TimerEngine {
    /// A stopped engine bound to `today`, at zero.
    #[must_use]
    pub const fn new(bound_date: NaiveDate) -> Self {
        Self {
            running: false,
            elapsed: Duration::ZERO,
            bound_date,
            suspended: false,
            resume_pending: false,
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The calendar day the stopwatch writes into.
    #[must_use]
    pub const fn bound_date(&self) -> NaiveDate {
        self.bound_date
    }

    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub const fn start(&mut self) {
        self.running = true;
    }

    /// Stops the tick source. Cancellation takes effect before the next
    /// scheduled tick: the event loop delivers no ticks while stopped.
    pub const fn stop(&mut self) {
        self.running = false;
    }

    /// Flips between stopped and running; there is no separate pause.
    pub const fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Re-seeds the elapsed value (from today's cell on load, or after a
    /// reset) and lifts any suspension outright.
    pub const fn seed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
        self.suspended = false;
        self.resume_pending = false;
    }

    /// The user started hand-editing today's cell; ticks must stop
    /// overwriting it until the edit is resolved.
    pub const fn mark_editing(&mut self) {
        self.suspended = true;
        self.resume_pending = false;
    }

    /// A manual edit of today's cell committed: adopt its value. The
    /// suspension is left to expire on the next tick boundary.
    pub const fn resolve_edit(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
        self.resume_pending = true;
    }

    /// Advances the stopwatch by one second.
    ///
    /// A suspended tick never allows a ledger write; if an edit has
    /// resolved since the last tick, this tick also clears the
    /// suspension so the following one writes through again.
    pub const fn tick(&mut self) -> TickOutcome {
        self.elapsed = self.elapsed.add_secs(1);
        if self.suspended {
            if self.resume_pending {
                self.suspended = false;
                self.resume_pending = false;
            }
            TickOutcome::ReadoutOnly
        } else {
            TickOutcome::WriteThrough
        }
    }

    /// Whether the elapsed time has reached the configured daily limit.
    /// Presentation flag only; the value itself is never clamped.
    #[must_use]
    pub const fn is_over_limit(&self, settings: &Settings) -> bool {
        self.elapsed.as_secs() >= settings.max_hours_per_day as u64 * 3600
    }
}
