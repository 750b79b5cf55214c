//! JSON file storage for the hours dashboard.
//!
//! Worked time lives in one file per month, named `{year}-{month}.json`
//! (month unpadded), a flat object mapping `dd/MM/yyyy` date strings to
//! `HH:MM:SS` duration strings. Only days whose cell is non-empty are
//! written; absent keys mean zero. Settings live in `settings.json` in
//! the same directory with the schema
//! `{ "max_hours_per_day": int, "weekend_days": [int, ...] }`.
//!
//! No storage problem is fatal to the session: a missing month file is
//! an empty mapping, entries with malformed date keys are skipped with
//! a warning, and missing or unreadable settings fall back to defaults
//! which are immediately written back. Cell values round-trip verbatim,
//! including non-canonical text the table preserved as typed.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use hd_core::{MonthLedger, Settings};
use thiserror::Error;

/// On-disk date key format, `dd/MM/yyyy`.
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A file held something other than the expected JSON object.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File store rooted at a data directory.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Opens a store at `dir`, creating the directory if necessary.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// The directory the store writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn month_path(&self, year: i32, month: u32) -> PathBuf {
        self.dir.join(format!("{year}-{month}.json"))
    }

    fn settings_path(&self) -> PathBuf {
        self.dir.join("settings.json")
    }

    /// Loads one month's worked-time cells.
    ///
    /// A missing file yields an empty mapping. Entries with a malformed
    /// date key are skipped, never fatal. Values come back verbatim:
    /// a cell that held preserved non-canonical text is saved as-is and
    /// must reload as-is.
    pub fn load_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<BTreeMap<NaiveDate, String>, StoreError> {
        let path = self.month_path(year, month);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };
        let parsed: BTreeMap<String, String> = serde_json::from_str(&raw)?;

        let mut loaded = BTreeMap::new();
        for (key, value) in parsed {
            let Ok(date) = NaiveDate::parse_from_str(&key, DATE_FORMAT) else {
                tracing::warn!(%key, path = %path.display(), "skipping malformed date key");
                continue;
            };
            loaded.insert(date, value);
        }
        tracing::debug!(path = %path.display(), days = loaded.len(), "loaded month file");
        Ok(loaded)
    }

    /// Saves one month: every entry with non-empty cell text, verbatim.
    pub fn save_month(&self, ledger: &MonthLedger) -> Result<(), StoreError> {
        let mut data = BTreeMap::new();
        for entry in ledger.entries() {
            if !entry.text.is_empty() {
                data.insert(entry.date.format(DATE_FORMAT).to_string(), &entry.text);
            }
        }
        let path = self.month_path(ledger.year(), ledger.month());
        fs::write(&path, serde_json::to_string(&data)?)?;
        tracing::debug!(path = %path.display(), days = data.len(), "saved month file");
        Ok(())
    }

    /// Loads settings, falling back to defaults.
    ///
    /// When the file is missing or unreadable the defaults are written
    /// back immediately so the file exists from then on. Out-of-range
    /// values from an existing file are clamped.
    pub fn load_settings(&self) -> Result<Settings, StoreError> {
        match fs::read_to_string(self.settings_path()) {
            Ok(raw) => match serde_json::from_str::<Settings>(&raw) {
                Ok(settings) => Ok(settings.sanitized()),
                Err(err) => {
                    tracing::warn!(%err, "settings file unreadable, rewriting defaults");
                    let settings = Settings::default();
                    self.save_settings(&settings)?;
                    Ok(settings)
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let settings = Settings::default();
                self.save_settings(&settings)?;
                Ok(settings)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Persists settings. Called on every settings-dialog confirm.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        fs::write(self.settings_path(), serde_json::to_string(settings)?)?;
        Ok(())
    }
}
