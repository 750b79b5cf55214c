//! User settings: daily hour limit and weekend classification.

use std::collections::BTreeSet;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Process-wide settings, loaded once at startup and reloaded only when
/// the settings dialog confirms a change.
///
/// Serialized field names are the on-disk schema of `settings.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Daily limit in whole hours, clamped to `0..=24`.
    pub max_hours_per_day: u8,
    /// Weekday indices treated as weekend, `0` = Monday .. `6` = Sunday.
    pub weekend_days: BTreeSet<u8>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_hours_per_day: 8,
            weekend_days: BTreeSet::from([5, 6]),
        }
    }
}

impl Settings {
    /// Whether the given weekday is classified as weekend.
    ///
    /// Weekend entries get a presentation flag only; they still count
    /// toward the monthly total.
    #[must_use]
    pub fn is_weekend(&self, weekday: Weekday) -> bool {
        u8::try_from(weekday.num_days_from_monday())
            .is_ok_and(|idx| self.weekend_days.contains(&idx))
    }

    /// Clamps out-of-range values read from an external settings file.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.max_hours_per_day = self.max_hours_per_day.min(24);
        self.weekend_days.retain(|day| *day < 7);
        self
    }
}
