//! Named events driving the session controller.
//!
//! Every mutation in the application — a timer tick, a manual cell
//! edit, month navigation, a settings save — arrives as one of these
//! events, so the whole state machine is exercisable without any
//! rendering surface.

use hd_core::Settings;

/// An input event for [`crate::SessionController::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// One second elapsed while the stopwatch is running.
    Tick,
    /// Toggle the stopwatch between stopped and running.
    ToggleTimer,
    /// Select a month (1..=12) of the current year selection.
    SelectMonth(u32),
    /// Select a year.
    SelectYear(i32),
    /// The user started hand-editing a day cell (double-activation
    /// gesture on the row).
    BeginEdit { row: usize },
    /// A cell edit committed with the given raw text.
    CommitEdit { row: usize, text: String },
    /// Reset the given day rows to `00:00:00`.
    ResetRows(Vec<usize>),
    /// Add one hour to today's cell.
    AddHours,
    /// Show or hide the chart.
    ToggleChart,
    /// The settings dialog confirmed new settings.
    SaveSettings(Settings),
    /// Leave the application.
    Quit,
}

/// Maps a main-window key press to its event.
///
/// `r` resets the rows currently selected in the table, so the caller
/// passes the live selection along.
#[must_use]
pub fn event_for_key(key: char, selection: &[usize]) -> Option<AppEvent> {
    match key.to_ascii_lowercase() {
        't' => Some(AppEvent::ToggleTimer),
        'r' => Some(AppEvent::ResetRows(selection.to_vec())),
        'a' => Some(AppEvent::AddHours),
        'g' => Some(AppEvent::ToggleChart),
        'q' | '\u{1b}' => Some(AppEvent::Quit),
        _ => None,
    }
}
