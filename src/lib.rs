//! Rebar cutting calculator with a terminal UI.
//!
//! The calculator and record store are usable without the TUI: `records`
//! works against any [`db::KeyValueStore`], so tests and tools can swap the
//! SQLite file for an in-memory map.
pub mod calc;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod records;
pub mod settings;
pub mod ui;

pub use config::AppConfig;
pub use db::{KeyValueStore, MemoryStore, SqliteStore};
pub use models::{CalculationInput, CalculationResult, Record};
pub use records::{RecordError, RecordStore};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
