//! Binary entry point: resolve the data directory, open the store, and run
//! the TUI until the user quits.
use rebar_cutter::settings::load_theme;
use rebar_cutter::{logging, run_app, App, AppConfig, RecordStore, SqliteStore};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    logging::init(&config.log_path())?;
    info!(data_dir = %config.data_dir.display(), "starting rebar cutter");

    let backend = SqliteStore::open(&config.db_path())?;
    let theme = load_theme(&backend)?;
    let store = RecordStore::load(backend)?;

    let mut app = App::new(store, theme);
    let result = run_app(&mut app);
    info!(records = app.records().len(), "shutting down");
    result
}
