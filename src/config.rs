//! Configuration management. Values layer as built-in defaults, then an
//! optional `config.toml` in the data directory, then environment variables
//! such as `EQUIPMENT_TRACKER_ADMIN__PASSPHRASE`.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use config::{Config, ConfigError, Environment, File};
use directories::BaseDirs;
use serde::Deserialize;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".equipment-tracker";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "inventory.sqlite";
/// Optional settings file inside the application data directory.
const CONFIG_FILE_NAME: &str = "config.toml";
/// Shipped placeholder; startup warns while it is still in use.
pub const DEFAULT_PASSPHRASE: &str = "change-this-passphrase";

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Deserialize, Clone)]
pub struct AdminConfig {
    pub passphrase: String,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// How many transactions the recent feed shows.
    pub recent_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    /// Lifetime of a footer toast.
    pub toast_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
    pub dashboard: DashboardConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration rooted at `~/.equipment-tracker`.
    pub fn load() -> Result<Self> {
        let data_dir = data_dir()?;
        Self::load_from(&data_dir).context("failed to load configuration")
    }

    /// Load configuration with defaults and the optional settings file taken
    /// from `data_dir`.
    pub fn load_from(data_dir: &Path) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("database.path", path_value(&data_dir.join(DB_FILE_NAME)))?
            .set_default("admin.passphrase", DEFAULT_PASSPHRASE)?
            .set_default("logging.level", "info")?
            .set_default("logging.directory", path_value(data_dir))?
            .set_default("dashboard.recent_limit", 20_i64)?
            .set_default("ui.toast_seconds", 3_i64)?
            .add_source(File::from(data_dir.join(CONFIG_FILE_NAME)).required(false))
            .add_source(
                Environment::with_prefix("EQUIPMENT_TRACKER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn uses_default_passphrase(&self) -> bool {
        self.admin.passphrase == DEFAULT_PASSPHRASE
    }
}

/// Resolve the application data directory inside the user's home.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
