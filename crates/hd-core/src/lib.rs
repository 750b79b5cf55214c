//! Core time-bookkeeping for the hours dashboard.
//!
//! This crate contains the fundamental types and logic for:
//! - Duration values: canonical `HH:MM:SS` text and shorthand decoding
//! - Month ledger: per-day entries and monthly total recomputation
//! - Timer engine: the one-second stopwatch bound to today's entry
//! - Settings: daily hour limit and weekend classification

pub mod duration;
pub mod ledger;
pub mod settings;
pub mod timer;

pub use duration::{Duration, ParseDurationError, normalize_input};
pub use ledger::{LedgerEntry, MonthLedger};
pub use settings::Settings;
pub use timer::{TickOutcome, TimerEngine};
