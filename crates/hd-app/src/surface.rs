//! Render surface abstraction.
//!
//! The controller never talks to a widget toolkit. It pushes cell,
//! total, timer, and chart updates into a [`Surface`] sink; the
//! terminal gets [`TextSurface`], tests use a recording double.

use std::fmt::Write as _;

use hd_core::MonthLedger;

/// A render sink for the session controller.
pub trait Surface {
    /// Redraws the whole month table (month switch, settings change).
    fn table_reset(&mut self, ledger: &MonthLedger);
    /// Updates a single day cell.
    fn cell_changed(&mut self, row: usize, text: &str, weekend: bool);
    /// Updates the synthetic total row.
    fn total_changed(&mut self, text: &str);
    /// Updates the stopwatch readout; `over_limit` drives the warning
    /// style (red border in the original dashboard).
    fn timer_changed(&mut self, text: &str, over_limit: bool);
    /// Redraws the chart from fractional hours per day.
    fn chart_changed(&mut self, series: &[f64]);
    /// Shows or hides the chart.
    fn chart_visibility(&mut self, visible: bool);
}

/// Renders the month table as plain text.
///
/// Weekend rows are marked with a trailing `*` instead of the grey
/// background the GUI used.
#[must_use]
pub fn render_table(ledger: &MonthLedger) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<10}  Time Worked", "Date");
    for entry in ledger.entries() {
        let marker = if entry.weekend { "  *" } else { "" };
        let _ = writeln!(out, "{}  {}{marker}", entry.date.format("%d/%m/%Y"), entry.text);
    }
    let _ = writeln!(out, "{:<10}  {}", "Total", ledger.total_text());
    out
}

/// Renders the hours-per-day bar chart as plain text, one `#` per half
/// hour.
#[must_use]
pub fn render_chart(series: &[f64]) -> String {
    let mut out = String::from("Hours worked per day\n");
    for (day, hours) in (1..).zip(series) {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "worked hours are small and non-negative"
        )]
        let bar = "#".repeat((hours * 2.0).round() as usize);
        let _ = writeln!(out, "{day:>2} | {bar} {hours:.2}");
    }
    out
}

/// Terminal surface: prints every update to stdout.
#[derive(Debug, Default)]
pub struct TextSurface {
    chart_visible: bool,
}

impl TextSurface {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chart_visible: false,
        }
    }
}

impl Surface for TextSurface {
    fn table_reset(&mut self, ledger: &MonthLedger) {
        print!("{}", render_table(ledger));
    }

    fn cell_changed(&mut self, row: usize, text: &str, weekend: bool) {
        let marker = if weekend { "  *" } else { "" };
        println!("day {:>2} -> {text}{marker}", row + 1);
    }

    fn total_changed(&mut self, text: &str) {
        println!("total  -> {text}");
    }

    fn timer_changed(&mut self, text: &str, over_limit: bool) {
        let marker = if over_limit { "  [over limit]" } else { "" };
        println!("timer  -> {text}{marker}");
    }

    fn chart_changed(&mut self, series: &[f64]) {
        if self.chart_visible {
            print!("{}", render_chart(series));
        }
    }

    fn chart_visibility(&mut self, visible: bool) {
        self.chart_visible = visible;
    }
}
