use std::io::{self, BufRead};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hd_app::{
    AppEvent, Cli, Config, Flow, SessionController, TextSurface, TickClock, event_for_key,
};
use hd_core::Settings;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    tracing::debug!(?config, "loaded configuration");

    let store =
        hd_store::Store::open(&config.data_dir).context("failed to open data directory")?;
    let today = chrono::Local::now().date_naive();

    let mut controller = SessionController::new(store, today);
    let mut surface = TextSurface::new();
    controller.render_all(&mut surface);
    print_help();

    run_loop(&mut controller, &mut surface)
}

/// Line-oriented event loop. Due stopwatch ticks are drained before
/// each command so elapsed wall-clock time lands in today's cell.
fn run_loop(controller: &mut SessionController, surface: &mut TextSurface) -> Result<()> {
    let stdin = io::stdin();
    let mut clock = TickClock::new();
    let mut selection: Vec<usize> = Vec::new();

    for line in stdin.lock().lines() {
        let line = line.context("failed to read input")?;

        if controller.timer().is_running() {
            for _ in 0..clock.due_ticks() {
                controller.handle(AppEvent::Tick, surface);
            }
        } else {
            clock.rearm();
        }

        for event in parse_command(line.trim(), &mut selection) {
            if controller.handle(event, surface) == Flow::Quit {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Translates one input line into controller events.
///
/// Single letters map through the main-window keyboard shortcuts;
/// the worded forms cover what the GUI did with combo boxes, cell
/// editing, row selection, and the settings dialog.
fn parse_command(line: &str, selection: &mut Vec<usize>) -> Vec<AppEvent> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Vec::new();
    };

    match head {
        "m" => match words.next().and_then(|w| w.parse::<u32>().ok()) {
            Some(month) => vec![AppEvent::SelectMonth(month)],
            None => unknown_command(line),
        },
        "y" => match words.next().and_then(|w| w.parse::<i32>().ok()) {
            Some(year) => vec![AppEvent::SelectYear(year)],
            None => unknown_command(line),
        },
        "e" => {
            let Some(row) = words
                .next()
                .and_then(|w| w.parse::<usize>().ok())
                .and_then(|day| day.checked_sub(1))
            else {
                return unknown_command(line);
            };
            let text = words.next().unwrap_or_default().to_string();
            // A hand edit is the double-activation gesture followed by
            // the commit.
            vec![AppEvent::BeginEdit { row }, AppEvent::CommitEdit { row, text }]
        }
        "s" => {
            *selection = words
                .filter_map(|w| w.parse::<usize>().ok())
                .filter_map(|day| day.checked_sub(1))
                .collect();
            println!("selected {} row(s)", selection.len());
            Vec::new()
        }
        "set" => match words.next().and_then(|w| w.parse::<u8>().ok()) {
            Some(max_hours_per_day) => {
                let weekend_days = words.filter_map(|w| w.parse::<u8>().ok()).collect();
                vec![AppEvent::SaveSettings(Settings {
                    max_hours_per_day,
                    weekend_days,
                })]
            }
            None => unknown_command(line),
        },
        _ => {
            let mut chars = head.chars();
            match (chars.next(), chars.next()) {
                (Some(key), None) => match event_for_key(key, selection) {
                    Some(event) => vec![event],
                    None => unknown_command(line),
                },
                _ => unknown_command(line),
            }
        }
    }
}

fn unknown_command(line: &str) -> Vec<AppEvent> {
    println!("unrecognized command: {line}");
    print_help();
    Vec::new()
}

fn print_help() {
    println!("commands:");
    println!("  t              start/stop the stopwatch");
    println!("  e <day> <time> edit a day cell (shorthand like 45m, 2h, 30s works)");
    println!("  s <day> ...    select rows for reset");
    println!("  r              reset the selected rows to 00:00:00");
    println!("  a              add one hour to today");
    println!("  g              show/hide the chart");
    println!("  m <1-12>       switch month    y <year>  switch year");
    println!("  set <max> <weekend day> ...   save settings (0 = Monday)");
    println!("  q              quit");
}
