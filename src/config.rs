//! Paths and constants shared across the application.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".rebar-cutter";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "rebar.sqlite";
/// Log file written next to the database. The TUI owns stdout.
const LOG_FILE_NAME: &str = "rebar-cutter.log";
/// Environment variable that relocates the data directory.
pub const HOME_ENV_VAR: &str = "REBAR_CUTTER_HOME";

/// Store key holding the serialized record collection.
pub const RECORDS_KEY: &str = "savedRecords";
/// Store key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// Bar length the form starts with and resets to.
pub const DEFAULT_BAR_LENGTH: &str = "1750";
/// Bar count the form starts with and resets to.
pub const DEFAULT_QUANTITY: &str = "1";
/// Names longer than this are shortened in the records table.
pub const NAME_DISPLAY_WIDTH: usize = 20;

/// Resolved on-disk locations.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Honor `REBAR_CUTTER_HOME` when set, otherwise use `~/.rebar-cutter`.
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = env::var_os(HOME_ENV_VAR).filter(|value| !value.is_empty()) {
            return Ok(Self::with_data_dir(PathBuf::from(dir)));
        }

        let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::with_data_dir(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_in_the_data_dir() {
        let config = AppConfig::with_data_dir(PathBuf::from("/tmp/rebar"));
        assert_eq!(config.db_path(), PathBuf::from("/tmp/rebar/rebar.sqlite"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/rebar/rebar-cutter.log"));
    }
}
