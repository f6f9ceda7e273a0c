//! # Settings Commands
//!
//! Persistent preferences kept in the database, and a view of the loaded
//! configuration file.
//!
//! | Key              | Values                 | Effect                                   |
//! |------------------|------------------------|------------------------------------------|
//! | `register`       | `contracts` \| `goods` | Register used without `--register`       |
//! | `show_dashboard` | `true` \| `false`      | `procura` with no command shows the dashboard |

use std::collections::BTreeMap;

use tracing::{debug, info};

use procura_core::{Register, ValidationError};

use crate::error::ApiError;
use crate::state::{AppConfig, DbState, Session, REGISTER_SETTING};

pub const SHOW_DASHBOARD_SETTING: &str = "show_dashboard";

/// Keys `settings set` accepts.
pub const KNOWN_SETTINGS: [&str; 2] = [REGISTER_SETTING, SHOW_DASHBOARD_SETTING];

/// Canonical stored form of a setting value, or why it is rejected.
fn normalize(key: &str, value: &str) -> Result<String, ValidationError> {
    match key {
        REGISTER_SETTING => Ok(value.parse::<Register>()?.as_str().to_string()),
        SHOW_DASHBOARD_SETTING => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok("true".to_string()),
            "false" | "no" | "0" | "off" => Ok("false".to_string()),
            _ => Err(ValidationError::NotAllowed {
                field: key.to_string(),
                allowed: vec!["true".to_string(), "false".to_string()],
            }),
        },
        _ => Err(ValidationError::NotAllowed {
            field: "setting".to_string(),
            allowed: KNOWN_SETTINGS.iter().map(|k| k.to_string()).collect(),
        }),
    }
}

pub async fn get_setting(db: &DbState, key: &str) -> Result<Option<String>, ApiError> {
    debug!(key = %key, "get_setting command");
    Ok(db.settings().get(key).await?)
}

/// Validates and stores a setting. Returns the stored value.
pub async fn set_setting(
    db: &DbState,
    session: &Session,
    key: &str,
    value: &str,
) -> Result<String, ApiError> {
    debug!(user = %session.username, key = %key, "set_setting command");
    let value = normalize(key, value)?;
    db.settings().set(key, &value).await?;
    info!(key = %key, value = %value, "Setting saved");
    Ok(value)
}

/// Removes a stored setting so its default applies again.
pub async fn reset_setting(db: &DbState, session: &Session, key: &str) -> Result<bool, ApiError> {
    debug!(user = %session.username, key = %key, "reset_setting command");
    Ok(db.settings().delete(key).await?)
}

pub async fn list_settings(db: &DbState) -> Result<BTreeMap<String, String>, ApiError> {
    Ok(db.settings().list().await?.into_iter().collect())
}

/// Whether a bare `procura` prints the dashboard (default on).
pub async fn show_dashboard(db: &DbState) -> Result<bool, ApiError> {
    Ok(db.settings().get_bool(SHOW_DASHBOARD_SETTING, true).await?)
}

/// The effective configuration as TOML, with the password hash masked.
pub fn show_config(config: &AppConfig) -> Result<String, ApiError> {
    Ok(config.to_display_toml()?)
}
