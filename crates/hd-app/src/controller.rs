//! Session controller: orchestrates ledger, timer, settings, and store.
//!
//! All mutation flows through [`SessionController::handle`]; the
//! controller owns the one active [`MonthLedger`] and [`TimerEngine`]
//! and keeps them, the persisted month file, and the render surface
//! consistent across manual edits, timer ticks, and month navigation.

use chrono::{Datelike, NaiveDate};
use hd_core::{Duration, MonthLedger, Settings, TickOutcome, TimerEngine};
use hd_store::Store;

use crate::events::AppEvent;
use crate::surface::Surface;

/// Whether the event loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The application root: month/year selection, stopwatch wiring,
/// persistence, and chart refresh on every mutating event.
pub struct SessionController {
    store: Store,
    settings: Settings,
    ledger: MonthLedger,
    timer: TimerEngine,
    today: NaiveDate,
    selected_year: i32,
    selected_month: u32,
    chart_visible: bool,
}

impl SessionController {
    /// Builds a controller showing `today`'s month, with settings and
    /// any previously saved worked time loaded from `store`.
    #[must_use]
    pub fn new(store: Store, today: NaiveDate) -> Self {
        let settings = store.load_settings().unwrap_or_else(|err| {
            tracing::warn!(%err, "failed to load settings, using defaults");
            Settings::default()
        });

        let ledger = MonthLedger::populate(today.year(), today.month(), &settings);
        let mut controller = Self {
            store,
            settings,
            ledger,
            timer: TimerEngine::new(today),
            today,
            selected_year: today.year(),
            selected_month: today.month(),
            chart_visible: false,
        };
        controller.load_selected_month();
        controller
    }

    /// Dispatches one event. Returns [`Flow::Quit`] only for
    /// [`AppEvent::Quit`]; no event is fatal.
    pub fn handle(&mut self, event: AppEvent, surface: &mut dyn Surface) -> Flow {
        match event {
            AppEvent::Tick => self.on_tick(surface),
            AppEvent::ToggleTimer => {
                self.timer.toggle();
                tracing::debug!(running = self.timer.is_running(), "timer toggled");
            }
            AppEvent::SelectMonth(month) => {
                if (1..=12).contains(&month) {
                    self.selected_month = month;
                    self.on_selection_changed(surface);
                } else {
                    tracing::warn!(month, "ignoring out-of-range month selection");
                }
            }
            AppEvent::SelectYear(year) => {
                self.selected_year = year;
                self.on_selection_changed(surface);
            }
            AppEvent::BeginEdit { row } => {
                if self.today_row() == Some(row) {
                    self.timer.mark_editing();
                }
            }
            AppEvent::CommitEdit { row, text } => self.on_commit_edit(row, &text, surface),
            AppEvent::ResetRows(rows) => self.on_reset(&rows, surface),
            AppEvent::AddHours => self.on_add_hours(surface),
            AppEvent::ToggleChart => {
                self.chart_visible = !self.chart_visible;
                surface.chart_visibility(self.chart_visible);
                self.refresh_chart(surface);
            }
            AppEvent::SaveSettings(settings) => self.on_save_settings(settings, surface),
            AppEvent::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Pushes the complete current state into the surface.
    pub fn render_all(&self, surface: &mut dyn Surface) {
        surface.table_reset(&self.ledger);
        surface.total_changed(&self.ledger.total_text());
        self.push_readout(surface);
        surface.chart_visibility(self.chart_visible);
        self.refresh_chart(surface);
    }

    #[must_use]
    pub fn ledger(&self) -> &MonthLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn selection(&self) -> (i32, u32) {
        (self.selected_year, self.selected_month)
    }

    #[must_use]
    pub const fn chart_visible(&self) -> bool {
        self.chart_visible
    }

    /// Today's row index, when the selection shows today's month.
    fn today_row(&self) -> Option<usize> {
        if (self.selected_year, self.selected_month) == (self.today.year(), self.today.month()) {
            Some(self.today.day() as usize - 1)
        } else {
            None
        }
    }

    /// Repopulates the ledger for the current selection, applies the
    /// saved month file, and re-seeds the stopwatch when today's cell
    /// is visible again. Re-seeding always clears a leftover
    /// suspension, even when today's cell holds non-canonical text.
    fn load_selected_month(&mut self) {
        self.ledger =
            MonthLedger::populate(self.selected_year, self.selected_month, &self.settings);
        match self.store.load_month(self.selected_year, self.selected_month) {
            Ok(loaded) => self.ledger.apply_loaded(&loaded),
            Err(err) => {
                tracing::warn!(%err, "month file unreadable, starting from defaults");
                self.ledger.recompute_total();
            }
        }

        if let Some(row) = self.today_row() {
            let worked = self
                .ledger
                .entry(row)
                .worked()
                .unwrap_or_else(|| self.timer.elapsed());
            self.timer.seed(worked);
        }
    }

    fn on_selection_changed(&mut self, surface: &mut dyn Surface) {
        self.load_selected_month();
        surface.table_reset(&self.ledger);
        surface.total_changed(&self.ledger.total_text());
        self.push_readout(surface);
        self.refresh_chart(surface);
    }

    fn on_tick(&mut self, surface: &mut dyn Surface) {
        // Ticks queued before stop() are dropped.
        if !self.timer.is_running() {
            return;
        }
        let outcome = self.timer.tick();
        self.push_readout(surface);

        if outcome == TickOutcome::WriteThrough {
            if let Some(row) = self.today_row() {
                // An empty cell means the day was cleared out entirely;
                // the stopwatch does not resurrect it.
                if !self.ledger.entry(row).text.is_empty() {
                    let text = self.timer.elapsed().to_string();
                    self.ledger.set_entry(row, &text);
                    surface.cell_changed(row, &text, self.ledger.entry(row).weekend);
                    surface.total_changed(&self.ledger.total_text());
                    self.persist();
                }
            }
        }
    }

    fn on_commit_edit(&mut self, row: usize, text: &str, surface: &mut dyn Surface) {
        // The synthetic total row sits one past the last day and is not
        // editable.
        if row >= self.ledger.entries().len() {
            tracing::debug!(row, "ignoring edit of the total row");
            return;
        }

        let normalized = self.ledger.set_entry(row, text).to_string();
        surface.cell_changed(row, &normalized, self.ledger.entry(row).weekend);

        if self.today_row() == Some(row) {
            let elapsed = normalized.parse().unwrap_or(self.timer.elapsed());
            self.timer.resolve_edit(elapsed);
            self.push_readout(surface);
        }

        surface.total_changed(&self.ledger.total_text());
        self.persist();
        self.refresh_chart(surface);
    }

    fn on_reset(&mut self, rows: &[usize], surface: &mut dyn Surface) {
        let day_rows: Vec<usize> = rows
            .iter()
            .copied()
            .filter(|row| *row < self.ledger.entries().len())
            .collect();
        if day_rows.is_empty() {
            return;
        }

        self.ledger.reset_entries(&day_rows);
        for &row in &day_rows {
            surface.cell_changed(row, "00:00:00", self.ledger.entry(row).weekend);
        }
        if self.today_row().is_some_and(|row| day_rows.contains(&row)) {
            self.timer.seed(Duration::ZERO);
            self.push_readout(surface);
        }

        surface.total_changed(&self.ledger.total_text());
        self.persist();
        self.refresh_chart(surface);
    }

    fn on_add_hours(&mut self, surface: &mut dyn Surface) {
        let Some(row) = self.today_row() else {
            tracing::debug!("today is not visible, add hours ignored");
            return;
        };

        let worked = self.ledger.entry(row).worked().unwrap_or_default();
        let bumped = worked.add_secs(3600);
        let text = bumped.to_string();
        self.ledger.set_entry(row, &text);
        self.timer.seed(bumped);

        surface.cell_changed(row, &text, self.ledger.entry(row).weekend);
        surface.total_changed(&self.ledger.total_text());
        self.push_readout(surface);
        self.persist();
        self.refresh_chart(surface);
    }

    fn on_save_settings(&mut self, settings: Settings, surface: &mut dyn Surface) {
        let settings = settings.sanitized();
        if let Err(err) = self.store.save_settings(&settings) {
            tracing::error!(%err, "failed to save settings");
        }
        self.settings = settings;

        // Reclassify the displayed month; worked values stay as they are.
        self.ledger.refresh_weekends(&self.settings);
        surface.table_reset(&self.ledger);
        surface.total_changed(&self.ledger.total_text());
        self.push_readout(surface);
    }

    fn push_readout(&self, surface: &mut dyn Surface) {
        surface.timer_changed(
            &self.timer.elapsed().to_string(),
            self.timer.is_over_limit(&self.settings),
        );
    }

    fn refresh_chart(&self, surface: &mut dyn Surface) {
        if self.chart_visible {
            surface.chart_changed(&self.ledger.hours_series());
        }
    }

    fn persist(&self) {
        if let Err(err) = self.store.save_month(&self.ledger) {
            tracing::error!(%err, "failed to save month file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Surface double recording every update the controller pushes.
    #[derive(Debug, Default)]
    struct RecordingSurface {
        table_resets: usize,
        cells: Vec<(usize, String)>,
        totals: Vec<String>,
        readouts: Vec<(String, bool)>,
        charts: Vec<Vec<f64>>,
        visible: Option<bool>,
    }

    impl Surface for RecordingSurface {
        fn table_reset(&mut self, _ledger: &MonthLedger) {
            self.table_resets += 1;
        }

        fn cell_changed(&mut self, row: usize, text: &str, _weekend: bool) {
            self.cells.push((row, text.to_string()));
        }

        fn total_changed(&mut self, text: &str) {
            self.totals.push(text.to_string());
        }

        fn timer_changed(&mut self, text: &str, over_limit: bool) {
            self.readouts.push((text.to_string(), over_limit));
        }

        fn chart_changed(&mut self, series: &[f64]) {
            self.charts.push(series.to_vec());
        }

        fn chart_visibility(&mut self, visible: bool) {
            self.visible = Some(visible);
        }
    }

    const TODAY: (i32, u32, u32) = (2024, 2, 15);

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(TODAY.0, TODAY.1, TODAY.2).unwrap()
    }

    fn controller() -> (TempDir, SessionController, RecordingSurface) {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path()).unwrap();
        let controller = SessionController::new(store, today());
        (temp, controller, RecordingSurface::default())
    }

    #[test]
    fn starts_on_todays_month_with_defaults() {
        let (_temp, controller, _surface) = controller();
        assert_eq!(controller.selection(), (2024, 2));
        assert_eq!(controller.ledger().entries().len(), 29);
        assert_eq!(controller.ledger().total_text(), "000:00:00");
        assert!(!controller.timer().is_running());
    }

    #[test]
    fn running_tick_writes_todays_cell_and_persists() {
        let (temp, mut controller, mut surface) = controller();
        controller.handle(AppEvent::ToggleTimer, &mut surface);
        controller.handle(AppEvent::Tick, &mut surface);
        controller.handle(AppEvent::Tick, &mut surface);

        assert_eq!(controller.ledger().entry(14).text, "00:00:02");
        assert_eq!(controller.ledger().total_text(), "000:00:02");

        let saved = std::fs::read_to_string(temp.path().join("2024-2.json")).unwrap();
        assert!(saved.contains(r#""15/02/2024":"00:00:02""#));
    }

    #[test]
    fn tick_while_stopped_is_dropped() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(AppEvent::Tick, &mut surface);
        assert_eq!(controller.timer().elapsed(), Duration::ZERO);
        assert!(surface.readouts.is_empty());
    }

    #[test]
    fn suspended_tick_updates_readout_but_not_the_cell() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(AppEvent::ToggleTimer, &mut surface);
        controller.handle(AppEvent::BeginEdit { row: 14 }, &mut surface);
        controller.handle(AppEvent::Tick, &mut surface);

        assert_eq!(controller.ledger().entry(14).text, "00:00:00");
        assert_eq!(surface.readouts.last().unwrap().0, "00:00:01");
        assert!(surface.cells.is_empty());
    }

    #[test]
    fn commit_edit_resolves_the_suspension_one_tick_later() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(AppEvent::ToggleTimer, &mut surface);
        controller.handle(AppEvent::BeginEdit { row: 14 }, &mut surface);
        controller.handle(
            AppEvent::CommitEdit {
                row: 14,
                text: "2h".to_string(),
            },
            &mut surface,
        );
        assert_eq!(controller.ledger().entry(14).text, "02:00:00");
        assert_eq!(controller.timer().elapsed(), Duration::from_secs(2 * 3600));

        // First tick after the commit: readout only.
        controller.handle(AppEvent::Tick, &mut surface);
        assert_eq!(controller.ledger().entry(14).text, "02:00:00");
        // Second tick writes through again.
        controller.handle(AppEvent::Tick, &mut surface);
        assert_eq!(controller.ledger().entry(14).text, "02:00:02");
    }

    #[test]
    fn edit_of_another_row_leaves_the_timer_alone() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(
            AppEvent::CommitEdit {
                row: 3,
                text: "45m".to_string(),
            },
            &mut surface,
        );
        assert_eq!(controller.ledger().entry(3).text, "00:45:00");
        assert_eq!(controller.timer().elapsed(), Duration::ZERO);
        assert_eq!(controller.ledger().total_text(), "000:45:00");
    }

    #[test]
    fn malformed_edit_is_kept_verbatim_and_total_ignores_it() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(
            AppEvent::CommitEdit {
                row: 14,
                text: "soonish".to_string(),
            },
            &mut surface,
        );
        assert_eq!(controller.ledger().entry(14).text, "soonish");
        assert_eq!(controller.ledger().total_text(), "000:00:00");
        // The readout cannot adopt garbage; elapsed stays put.
        assert_eq!(controller.timer().elapsed(), Duration::ZERO);
    }

    #[test]
    fn total_row_edit_is_silently_ignored() {
        let (_temp, mut controller, mut surface) = controller();
        let total_row = controller.ledger().entries().len();
        controller.handle(
            AppEvent::CommitEdit {
                row: total_row,
                text: "99:00:00".to_string(),
            },
            &mut surface,
        );
        assert!(surface.cells.is_empty());
        assert_eq!(controller.ledger().total_text(), "000:00:00");
    }

    #[test]
    fn month_switch_roundtrips_through_the_store() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(
            AppEvent::CommitEdit {
                row: 4,
                text: "02:30:00".to_string(),
            },
            &mut surface,
        );

        controller.handle(AppEvent::SelectMonth(3), &mut surface);
        assert_eq!(controller.selection(), (2024, 3));
        assert_eq!(controller.ledger().entry(4).text, "00:00:00");

        controller.handle(AppEvent::SelectMonth(2), &mut surface);
        assert_eq!(controller.ledger().entry(4).text, "02:30:00");
        assert_eq!(controller.ledger().total_text(), "002:30:00");
    }

    #[test]
    fn cross_month_tick_advances_readout_without_touching_the_ledger() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(AppEvent::ToggleTimer, &mut surface);
        controller.handle(AppEvent::SelectMonth(3), &mut surface);
        surface.cells.clear();

        controller.handle(AppEvent::Tick, &mut surface);
        assert_eq!(controller.timer().elapsed(), Duration::from_secs(1));
        assert!(surface.cells.is_empty());
        assert!(
            controller
                .ledger()
                .entries()
                .iter()
                .all(|e| e.text == "00:00:00")
        );
    }

    #[test]
    fn malformed_cell_text_survives_a_month_roundtrip() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(
            AppEvent::CommitEdit {
                row: 7,
                text: "soonish".to_string(),
            },
            &mut surface,
        );

        controller.handle(AppEvent::SelectMonth(3), &mut surface);
        controller.handle(AppEvent::SelectMonth(2), &mut surface);
        assert_eq!(controller.ledger().entry(7).text, "soonish");
        assert_eq!(controller.ledger().total_text(), "000:00:00");
    }

    #[test]
    fn returning_to_todays_month_clears_a_stale_suspension() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(
            AppEvent::CommitEdit {
                row: 14,
                text: "soonish".to_string(),
            },
            &mut surface,
        );
        // Open the editor on today's cell, then navigate away with the
        // edit never committed.
        controller.handle(AppEvent::BeginEdit { row: 14 }, &mut surface);
        assert!(controller.timer().is_suspended());

        controller.handle(AppEvent::SelectMonth(3), &mut surface);
        controller.handle(AppEvent::SelectMonth(2), &mut surface);
        assert!(!controller.timer().is_suspended());
        assert_eq!(controller.ledger().entry(14).text, "soonish");
    }

    #[test]
    fn returning_to_todays_month_reseeds_the_stopwatch() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(
            AppEvent::CommitEdit {
                row: 14,
                text: "03:00:00".to_string(),
            },
            &mut surface,
        );
        controller.handle(AppEvent::SelectMonth(5), &mut surface);
        controller.handle(AppEvent::SelectMonth(2), &mut surface);
        assert_eq!(controller.timer().elapsed(), Duration::from_secs(3 * 3600));
    }

    #[test]
    fn reset_clears_selected_rows_and_todays_readout() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(
            AppEvent::CommitEdit {
                row: 2,
                text: "01:00:00".to_string(),
            },
            &mut surface,
        );
        controller.handle(
            AppEvent::CommitEdit {
                row: 14,
                text: "02:00:00".to_string(),
            },
            &mut surface,
        );

        controller.handle(AppEvent::ResetRows(vec![2, 14]), &mut surface);
        assert_eq!(controller.ledger().entry(2).text, "00:00:00");
        assert_eq!(controller.ledger().entry(14).text, "00:00:00");
        assert_eq!(controller.ledger().total_text(), "000:00:00");
        assert_eq!(controller.timer().elapsed(), Duration::ZERO);
        assert_eq!(surface.readouts.last().unwrap().0, "00:00:00");
    }

    #[test]
    fn reset_of_other_rows_keeps_the_stopwatch_value() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(
            AppEvent::CommitEdit {
                row: 14,
                text: "02:00:00".to_string(),
            },
            &mut surface,
        );
        controller.handle(AppEvent::ResetRows(vec![3]), &mut surface);
        assert_eq!(controller.timer().elapsed(), Duration::from_secs(2 * 3600));
        assert_eq!(controller.ledger().entry(14).text, "02:00:00");
    }

    #[test]
    fn add_hours_bumps_todays_cell_by_one_hour() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(AppEvent::AddHours, &mut surface);
        assert_eq!(controller.ledger().entry(14).text, "01:00:00");
        assert_eq!(controller.timer().elapsed(), Duration::from_secs(3600));

        controller.handle(AppEvent::SelectMonth(7), &mut surface);
        surface.cells.clear();
        controller.handle(AppEvent::AddHours, &mut surface);
        assert!(surface.cells.is_empty());
    }

    #[test]
    fn chart_toggle_pushes_the_series_on_show() {
        let (_temp, mut controller, mut surface) = controller();
        controller.handle(
            AppEvent::CommitEdit {
                row: 0,
                text: "01:30:00".to_string(),
            },
            &mut surface,
        );
        assert!(surface.charts.is_empty());

        controller.handle(AppEvent::ToggleChart, &mut surface);
        assert_eq!(surface.visible, Some(true));
        let series = surface.charts.last().unwrap();
        assert!((series[0] - 1.5).abs() < f64::EPSILON);

        controller.handle(AppEvent::ToggleChart, &mut surface);
        assert_eq!(surface.visible, Some(false));
    }

    #[test]
    fn save_settings_persists_and_reclassifies_weekends() {
        let (temp, mut controller, mut surface) = controller();
        let new_settings = Settings {
            max_hours_per_day: 6,
            weekend_days: std::collections::BTreeSet::from([0]),
        };
        controller.handle(AppEvent::SaveSettings(new_settings), &mut surface);

        // 5 February 2024 is a Monday, 3 February a Saturday.
        assert!(controller.ledger().entry(4).weekend);
        assert!(!controller.ledger().entry(2).weekend);

        let saved = std::fs::read_to_string(temp.path().join("settings.json")).unwrap();
        assert_eq!(saved, r#"{"max_hours_per_day":6,"weekend_days":[0]}"#);
    }

    #[test]
    fn over_limit_flag_follows_the_configured_threshold() {
        let (_temp, mut controller, mut surface) = controller();
        let low_limit = Settings {
            max_hours_per_day: 1,
            ..Settings::default()
        };
        controller.handle(AppEvent::SaveSettings(low_limit), &mut surface);
        controller.handle(
            AppEvent::CommitEdit {
                row: 14,
                text: "1h".to_string(),
            },
            &mut surface,
        );
        let (text, over) = surface.readouts.last().unwrap().clone();
        assert_eq!(text, "01:00:00");
        assert!(over);
    }

    #[test]
    fn quit_event_ends_the_flow() {
        let (_temp, mut controller, mut surface) = controller();
        assert_eq!(controller.handle(AppEvent::Quit, &mut surface), Flow::Quit);
        assert_eq!(
            controller.handle(AppEvent::ToggleTimer, &mut surface),
            Flow::Continue
        );
    }
}
