//! Configuration loading and root folder resolution
//!
//! The root folder holds everything the service persists: the SQLite
//! database and the uploaded song files.

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable consulted when no CLI argument is given
pub const ROOT_FOLDER_ENV: &str = "TUNEHUB_ROOT_FOLDER";

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub root_folder: PathBuf,
}

impl Config {
    /// Path of the SQLite database inside the root folder
    pub fn db_path(&self) -> PathBuf {
        self.root_folder.join("tunehub.sqlite3")
    }

    /// Directory uploaded audio files are saved to, keyed by original filename
    pub fn upload_dir(&self) -> PathBuf {
        self.root_folder.join("songs")
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `TUNEHUB_ROOT_FOLDER` environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<PathBuf>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path;
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Get default configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    // ~/.config/tunehub/config.toml first, then /etc/tunehub/config.toml
    if let Some(path) = dirs::config_dir().map(|d| d.join("tunehub").join("config.toml")) {
        if path.exists() {
            return Ok(path);
        }
    }

    let system_config = PathBuf::from("/etc/tunehub/config.toml");
    if system_config.exists() {
        return Ok(system_config);
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tunehub"))
        .unwrap_or_else(|| PathBuf::from("./tunehub_data"))
}

/// Create the root folder and upload directory if missing
pub fn ensure_directories(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.root_folder)?;
    std::fs::create_dir_all(config.upload_dir())?;
    Ok(())
}
