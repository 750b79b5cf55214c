//! Duration values: canonical `HH:MM:SS` text and shorthand decoding.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing canonical duration text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseDurationError {
    /// The text was not of the form `HH:MM:SS`.
    #[error("expected HH:MM:SS, got {0:?}")]
    Malformed(String),
    /// Minutes or seconds were 60 or more.
    #[error("minutes and seconds must be below 60: {0:?}")]
    FieldOutOfRange(String),
}

/// A non-negative worked duration with one-second resolution.
///
/// The canonical textual form is `HH:MM:SS` with a zero-padded two-digit
/// hours field; hours above 99 simply take more digits. The aggregated
/// monthly total uses a three-digit hours field instead, rendered by
/// [`Duration::to_total_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Duration(u64);

impl Duration {
    /// Zero seconds.
    pub const ZERO: Self = Self(0);

    /// Twenty-four hours, the cap for shorthand `h` input.
    pub const DAY: Self = Self(24 * 3600);

    /// Creates a duration from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Total seconds.
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Splits into hours, minutes, and seconds fields.
    #[must_use]
    pub const fn hms(self) -> (u64, u64, u64) {
        (self.0 / 3600, self.0 / 60 % 60, self.0 % 60)
    }

    /// Adds `n` seconds. There is no upper bound; the stopwatch may run
    /// past 24 hours and only a presentation flag marks it as over.
    #[must_use]
    pub const fn add_secs(self, n: u64) -> Self {
        Self(self.0.saturating_add(n))
    }

    /// Fractional hours, the unit the monthly total accumulates in.
    #[expect(
        clippy::cast_precision_loss,
        reason = "field values are tiny; hours stay far below 2^52"
    )]
    #[must_use]
    pub fn hours_fraction(self) -> f64 {
        let (h, m, s) = self.hms();
        h as f64 + m as f64 / 60.0 + s as f64 / 3600.0
    }

    /// Renders the aggregate form with a three-digit hours field,
    /// e.g. `000:00:00` or `123:05:09`.
    #[must_use]
    pub fn to_total_string(self) -> String {
        let (h, m, s) = self.hms();
        format!("{h:03}:{m:02}:{s:02}")
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.hms();
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

impl std::str::FromStr for Duration {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseDurationError::Malformed(s.to_string());

        let mut parts = s.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        // Minutes and seconds are exactly two digits; hours take two or
        // more (the aggregate form uses three).
        if h.len() < 2 || m.len() != 2 || sec.len() != 2 {
            return Err(malformed());
        }
        if ![h, m, sec]
            .iter()
            .all(|field| field.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(malformed());
        }

        let hours: u64 = h.parse().map_err(|_| malformed())?;
        let minutes: u64 = m.parse().map_err(|_| malformed())?;
        let seconds: u64 = sec.parse().map_err(|_| malformed())?;
        if minutes >= 60 || seconds >= 60 {
            return Err(ParseDurationError::FieldOutOfRange(s.to_string()));
        }

        // An absurd hours field must degrade like any other bad text,
        // never overflow.
        hours
            .checked_mul(3600)
            .and_then(|secs| secs.checked_add(minutes * 60 + seconds))
            .map(Self)
            .ok_or_else(malformed)
    }
}

impl TryFrom<String> for Duration {
    type Error = ParseDurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Duration> for String {
    fn from(d: Duration) -> Self {
        d.to_string()
    }
}

/// Decodes shorthand cell input into canonical duration text.
///
/// Empty text maps to `00:00:00`. A trailing `s`, `m`, or `h` with an
/// integer prefix is expanded to that many seconds, minutes, or hours;
/// an `h` value above 24 clamps to `24:00:00`. Anything else — a bad
/// numeric prefix, an unknown suffix, or text that is already canonical —
/// is returned unchanged. Malformed input is never an error here: the
/// cell keeps whatever the user typed.
#[must_use]
pub fn normalize_input(raw: &str) -> String {
    if raw.is_empty() {
        return Duration::ZERO.to_string();
    }

    let decoded = if let Some(n) = raw.strip_suffix('s') {
        n.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(n) = raw.strip_suffix('m') {
        // Minute counts too large for a second total fall back to
        // passthrough, like any other undecodable prefix.
        n.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else if let Some(n) = raw.strip_suffix('h') {
        n.parse::<u64>().ok().map(|h| {
            if h > 24 {
                Duration::DAY
            } else {
                Duration::from_secs(h * 3600)
            }
        })
    } else {
        None
    };

    decoded.map_or_else(|| raw.to_string(), |d| d.to_string())
}
