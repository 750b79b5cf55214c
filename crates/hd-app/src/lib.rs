//! Hours dashboard application shell.
//!
//! Wires the core bookkeeping engine to JSON persistence and a render
//! surface, and exposes the event-driven session controller.

mod cli;
mod clock;
mod config;
pub mod controller;
pub mod events;
pub mod surface;

pub use cli::Cli;
pub use clock::TickClock;
pub use config::Config;
pub use controller::{Flow, SessionController};
pub use events::{AppEvent, event_for_key};
pub use surface::{Surface, TextSurface, render_chart, render_table};
