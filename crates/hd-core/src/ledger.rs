//! Month ledger: one entry per calendar day plus a derived total.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::duration::{Duration, normalize_input};
use crate::settings::Settings;

/// One calendar day's recorded worked duration.
///
/// The cell holds *text*, not a parsed value: malformed user input is
/// preserved verbatim and simply contributes nothing to the total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub text: String,
    /// Presentation flag derived from [`Settings::weekend_days`].
    pub weekend: bool,
}

impl LedgerEntry {
    /// The cell's duration, if its text is canonical.
    #[must_use]
    pub fn worked(&self) -> Option<Duration> {
        self.text.parse().ok()
    }
}

/// Exactly one month's worked-time table and its derived total.
///
/// The total is recomputed after every entry mutation, load, and reset;
/// it is never observable in a stale state.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthLedger {
    year: i32,
    month: u32,
    entries: Vec<LedgerEntry>,
    total_seconds: u64,
}

impl MonthLedger {
    /// Builds one entry per day of the given month, each at `00:00:00`,
    /// with weekend flags taken from `settings`.
    ///
    /// # Panics
    ///
    /// Panics if `month` is not in `1..=12`; the selection widgets only
    /// ever offer valid months.
    #[must_use]
    pub fn populate(year: i32, month: u32, settings: &Settings) -> Self {
        assert!((1..=12).contains(&month), "invalid month: {month}");

        let mut entries = Vec::with_capacity(31);
        let mut day = 1;
        while let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            entries.push(LedgerEntry {
                date,
                text: Duration::ZERO.to_string(),
                weekend: settings.is_weekend(date.weekday()),
            });
            day += 1;
        }
        tracing::debug!(year, month, days = entries.len(), "populated month ledger");

        Self {
            year,
            month,
            entries,
            total_seconds: 0,
        }
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Day entries in calendar order, day 1 first.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// The entry at `day_index` (0-based).
    ///
    /// # Panics
    ///
    /// Panics when out of range; indices reaching the ledger have
    /// already been bounds-checked against the day rows.
    #[must_use]
    pub fn entry(&self, day_index: usize) -> &LedgerEntry {
        &self.entries[day_index]
    }

    /// Overwrites entries whose date appears in `loaded`, leaving all
    /// others untouched, then recomputes the total. Loaded text is
    /// adopted verbatim; non-canonical cells stay as they were saved.
    pub fn apply_loaded(&mut self, loaded: &BTreeMap<NaiveDate, String>) {
        for (date, text) in loaded {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.date == *date) {
                entry.text.clone_from(text);
            }
        }
        self.recompute_total();
    }

    /// Stores user input at `day_index` after one-shot shorthand
    /// normalization and recomputes the total. Returns the stored text.
    pub fn set_entry(&mut self, day_index: usize, raw: &str) -> &str {
        self.entries[day_index].text = normalize_input(raw);
        self.recompute_total();
        &self.entries[day_index].text
    }

    /// Sets each named entry back to `00:00:00`, then recomputes once.
    pub fn reset_entries(&mut self, day_indices: &[usize]) {
        for &day_index in day_indices {
            self.entries[day_index].text = Duration::ZERO.to_string();
        }
        self.recompute_total();
    }

    /// Re-derives the total from the day entries.
    ///
    /// Accumulates fractional hours (h + m/60 + s/3600) per parseable
    /// cell and re-encodes via rounded seconds. Idempotent.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "the rounded total is non-negative and far below 2^52"
    )]
    pub fn recompute_total(&mut self) {
        let hours: f64 = self
            .entries
            .iter()
            .filter_map(LedgerEntry::worked)
            .map(Duration::hours_fraction)
            .sum();
        self.total_seconds = (hours * 3600.0).round() as u64;
    }

    /// The derived monthly total.
    #[must_use]
    pub const fn total(&self) -> Duration {
        Duration::from_secs(self.total_seconds)
    }

    /// The total in its aggregate three-digit-hour form.
    #[must_use]
    pub fn total_text(&self) -> String {
        self.total().to_total_string()
    }

    /// Re-derives weekend flags in place after a settings change.
    /// Worked values are not touched.
    pub fn refresh_weekends(&mut self, settings: &Settings) {
        for entry in &mut self.entries {
            entry.weekend = settings.is_weekend(entry.date.weekday());
        }
    }

    /// Fractional hours per day, for the bar chart. Unparseable cells
    /// chart as zero.
    #[must_use]
    pub fn hours_series(&self) -> Vec<f64> {
        self.entries
            .iter()
            .map(|entry| entry.worked().map_or(0.0, Duration::hours_fraction))
            .collect()
    }
}
