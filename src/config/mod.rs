use crate::errors::{AppError, AppResult};
use crate::models::payment::PaymentType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".rlabourledger";
const APP_DIR_WINDOWS: &str = "rlabourledger";
const CONFIG_FILE: &str = "rlabourledger.conf";
const DB_FILE: &str = "rlabourledger.sqlite";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_payment_type")]
    pub default_payment_type: String,
}

fn default_currency() -> String {
    "Rs".to_string()
}
fn default_payment_type() -> String {
    PaymentType::default().to_db_str().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            currency: default_currency(),
            default_payment_type: default_payment_type(),
        }
    }
}

fn app_dir(base: Option<PathBuf>, windows: bool) -> PathBuf {
    let name = if windows { APP_DIR_WINDOWS } else { APP_DIR };
    base.unwrap_or_else(|| PathBuf::from(".")).join(name)
}

impl Config {
    /// `%APPDATA%\rlabourledger` on Windows, `~/.rlabourledger` elsewhere.
    /// Falls back to the current directory when the base is unknown.
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            app_dir(dirs::config_dir(), true)
        } else {
            app_dir(dirs::home_dir(), false)
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join(DB_FILE)
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        cfg.payment_type()?;
        Ok(cfg)
    }

    /// Payment type used when `pay` is called without `--type`.
    pub fn payment_type(&self) -> AppResult<PaymentType> {
        PaymentType::from_db_str(&self.default_payment_type).ok_or_else(|| {
            AppError::Config(format!(
                "default_payment_type '{}' is not one of daily, weekly, monthly, advance, bonus",
                self.default_payment_type
            ))
        })
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Serialization(e.to_string()))
    }

    /// Initialize configuration and database files.
    ///
    /// In test mode the config file is left untouched; only the database
    /// path is resolved and created. Returns that path.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();

        let db_path = match custom_db {
            Some(name) if Path::new(name).is_absolute() => PathBuf::from(name),
            Some(name) => dir.join(name),
            None => dir.join(DB_FILE),
        };

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if !is_test {
            fs::create_dir_all(&dir)?;
            let config = Config {
                database: db_path.to_string_lossy().to_string(),
                ..Config::default()
            };
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(config.to_yaml()?.as_bytes())?;
        }

        Ok(db_path)
    }
}
