//! # Configuration State
//!
//! Application configuration, loaded once at startup and passed to the
//! commands that need it.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`PROCURA_*`)
//! 2. Config file (`--config <path>` or `procura.toml` in the platform
//!    config directory)
//! 3. Defaults (this file)
//!
//! Preferences that change at runtime (default register, dashboard flag)
//! live in the settings table instead.
//!
//! ## File Layout
//! ```toml
//! [database]
//! path = "/home/bac/.local/share/procura/procura.db"
//! max_connections = 5
//!
//! [documents]
//! template_dir = "/home/bac/.local/share/procura/templates"
//! output_dir = "/home/bac/Documents/procura"
//!
//! [auth]
//! username = "admin"
//! password_hash = "$argon2id$v=19$m=19456,t=2,p=1$..."
//! session_hours = 8
//!
//! [office]
//! name = "Bids and Awards Committee"
//!
//! [office.goods]
//! name = "KATHERINE V. LADAGA"
//! id = "12 G 0106"
//! designation = "End User for Goods"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use procura_db::DbConfig;
use procura_docs::OfficeConfig;

use super::session::hash_password;

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "procura.toml";

/// Longest session a login may grant.
pub const MAX_SESSION_HOURS: i64 = 24 * 30;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The config file could not be read.
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`AppConfig`].
    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value (from the file or the environment) is out of range.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Hashing the administrator password failed.
    #[error("Cannot hash password: {0}")]
    Hash(String),
}

impl ConfigError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[database]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite database file.
    pub path: PathBuf,
    /// Pool size.
    pub max_connections: u32,
}

/// `[documents]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsSection {
    /// Folder holding `bond.docx`, `oblig.docx`, `3-STRIKE/...`.
    pub template_dir: PathBuf,
    /// Folder generated documents are written to.
    pub output_dir: PathBuf,
}

/// `[auth]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub username: String,
    /// Argon2 PHC string. Without one nobody can log in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub session_hours: i64,
    /// Where the active session is remembered between invocations.
    pub session_file: PathBuf,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseSection,
    pub documents: DocumentsSection,
    pub auth: AuthSection,
    pub office: OfficeConfig,
}

// =============================================================================
// Defaults
// =============================================================================

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "procura", "procura")
}

/// Platform data directory, or `./.procura` when no home directory exists.
///
/// - **Linux**: `~/.local/share/procura`
/// - **macOS**: `~/Library/Application Support/com.procura.procura`
/// - **Windows**: `%APPDATA%\procura\procura\data`
fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".procura"))
}

/// Default location of `procura.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: data_dir().join("procura.db"),
            max_connections: 5,
        }
    }
}

impl Default for DocumentsSection {
    fn default() -> Self {
        let base = data_dir();
        DocumentsSection {
            template_dir: base.join("templates"),
            output_dir: base.join("documents"),
        }
    }
}

impl Default for AuthSection {
    fn default() -> Self {
        AuthSection {
            username: "admin".to_string(),
            password_hash: None,
            session_hours: 8,
            session_file: data_dir().join("session.json"),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

impl AppConfig {
    /// Loads configuration: defaults, then the file, then the environment.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let mut config = match path {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => AppConfig::from_file(path)?,
            None => match default_config_path() {
                Some(default) if default.is_file() => AppConfig::from_file(&default)?,
                _ => {
                    debug!("No config file, using defaults");
                    AppConfig::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file.
    pub fn from_file(path: &Path) -> Result<AppConfig, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Applies `PROCURA_*` overrides read through `lookup`.
    ///
    /// ## Variables
    /// - `PROCURA_DB_PATH`, `PROCURA_DB_MAX_CONNECTIONS`
    /// - `PROCURA_TEMPLATE_DIR`, `PROCURA_OUTPUT_DIR`
    /// - `PROCURA_ADMIN_USER`, `PROCURA_SESSION_HOURS`
    /// - `PROCURA_ADMIN_PASSWORD_HASH`, or `PROCURA_ADMIN_PASSWORD` (hashed here)
    /// - `PROCURA_OFFICE_NAME`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("PROCURA_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(max) = lookup("PROCURA_DB_MAX_CONNECTIONS") {
            self.database.max_connections = max
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("PROCURA_DB_MAX_CONNECTIONS", "not a number"))?;
        }
        if let Some(dir) = lookup("PROCURA_TEMPLATE_DIR") {
            self.documents.template_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("PROCURA_OUTPUT_DIR") {
            self.documents.output_dir = PathBuf::from(dir);
        }
        if let Some(user) = lookup("PROCURA_ADMIN_USER") {
            self.auth.username = user;
        }
        if let Some(hours) = lookup("PROCURA_SESSION_HOURS") {
            self.auth.session_hours = hours
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("PROCURA_SESSION_HOURS", "not a number"))?;
        }
        if let Some(hash) = lookup("PROCURA_ADMIN_PASSWORD_HASH") {
            self.auth.password_hash = Some(hash);
        } else if let Some(password) = lookup("PROCURA_ADMIN_PASSWORD") {
            self.auth.password_hash = Some(hash_password(&password)?);
        }
        if let Some(name) = lookup("PROCURA_OFFICE_NAME") {
            self.office.name = name;
        }
        Ok(())
    }

    /// Checks ranges and formats that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid("database.max_connections", "must be at least 1"));
        }
        if self.auth.username.trim().is_empty() {
            return Err(ConfigError::invalid("auth.username", "must not be empty"));
        }
        if !(1..=MAX_SESSION_HOURS).contains(&self.auth.session_hours) {
            return Err(ConfigError::invalid(
                "auth.session_hours",
                format!("must be between 1 and {}", MAX_SESSION_HOURS),
            ));
        }
        if let Some(hash) = &self.auth.password_hash {
            argon2::PasswordHash::new(hash)
                .map_err(|e| ConfigError::invalid("auth.password_hash", e.to_string()))?;
        }
        let end_users = [
            ("office.goods", &self.office.goods),
            ("office.infrastructure", &self.office.infrastructure),
        ];
        for (key, user) in end_users {
            if user.name.trim().is_empty() {
                return Err(ConfigError::invalid(key, "end-user name must not be empty"));
            }
        }
        Ok(())
    }

    /// Pool settings for [`procura_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    /// The configuration as TOML with the password hash masked.
    pub fn to_display_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.auth.password_hash.is_some() {
            shown.auth.password_hash = Some("<set>".to_string());
        }
        toml::to_string_pretty(&shown).map_err(|e| ConfigError::invalid("config", e.to_string()))
    }
}
