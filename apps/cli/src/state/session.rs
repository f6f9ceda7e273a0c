//! # Session State
//!
//! A single administrator credential guards every command that changes data
//! or writes documents.
//!
//! ## Flow
//! ```text
//! procura login admin            procura contract status ...      procura logout
//!       │                               │                               │
//!       ▼                               ▼                               ▼
//! verify against auth.password_hash   SessionStore::require()       delete file
//!       │                               │
//!       ▼                               ├── no file / expired ──► UNAUTHORIZED
//! write session.json                    │
//! { id, username, expiresAt }           └── valid ──► Session (passed to command)
//! ```
//!
//! Gated command functions take a `&Session` parameter, so a mutation cannot
//! be called without first obtaining one.

use std::fs;
use std::path::{Path, PathBuf};

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::{AuthSection, ConfigError};
use crate::error::ApiError;

/// Hashes a password into an Argon2 PHC string.
///
/// The salt is the 16 random bytes of a v4 UUID.
pub fn hash_password(password: &str) -> Result<String, ConfigError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| ConfigError::Hash(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ConfigError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Checks a password against a PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    auth: AuthSection,
}

impl SessionStore {
    /// Uses `auth.session_file` as the session location.
    pub fn new(auth: AuthSection) -> Self {
        SessionStore {
            path: auth.session_file.clone(),
            auth,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verifies the credential and starts a session.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        self.login_at(username, password, Utc::now())
    }

    fn login_at(&self, username: &str, password: &str, now: DateTime<Utc>) -> Result<Session, ApiError> {
        let Some(hash) = self.auth.password_hash.as_deref() else {
            return Err(ApiError::unauthorized(
                "No administrator password configured (set auth.password_hash or PROCURA_ADMIN_PASSWORD)",
            ));
        };

        if username != self.auth.username || !verify_password(password, hash) {
            warn!(username = %username, "Login rejected");
            return Err(ApiError::unauthorized("Invalid username or password"));
        }

        let session = Session {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: now,
            expires_at: now + Duration::hours(self.auth.session_hours),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&session)
            .map_err(|e| ApiError::internal(e.to_string()))?;
        fs::write(&self.path, json)?;

        info!(username = %session.username, expires_at = %session.expires_at, "Logged in");
        Ok(session)
    }

    /// Ends the session. Returns false when none was active.
    pub fn logout(&self) -> Result<bool, ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Logged out");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// The active session, if any. Expired or unreadable files are removed.
    pub fn current(&self) -> Result<Option<Session>, ApiError> {
        self.current_at(Utc::now())
    }

    fn current_at(&self, now: DateTime<Utc>) -> Result<Option<Session>, ApiError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: Session = match serde_json::from_str(&text) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session file");
                self.logout()?;
                return Ok(None);
            }
        };

        // A session issued to a different configured user is void
        if session.is_expired_at(now) || session.username != self.auth.username {
            debug!(username = %session.username, "Session expired");
            self.logout()?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// The active session, or an UNAUTHORIZED error.
    pub fn require(&self) -> Result<Session, ApiError> {
        self.current()?
            .ok_or_else(|| ApiError::unauthorized("Not logged in (run `procura login`)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn store(dir: &Path) -> SessionStore {
        SessionStore::new(AuthSection {
            username: "admin".to_string(),
            password_hash: Some(hash_password("s3cret").unwrap()),
            session_hours: 8,
            session_file: dir.join("state").join("session.json"),
        })
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "garbage"));
    }

    #[test]
    fn test_login_require_logout() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        assert_eq!(store.require().unwrap_err().code, ErrorCode::Unauthorized);

        let session = store.login("admin", "s3cret").unwrap();
        assert!(store.path().is_file());
        assert_eq!(store.require().unwrap(), session);

        assert!(store.logout().unwrap());
        assert!(!store.logout().unwrap());
        assert!(store.current().unwrap().is_none());
    }

    #[test]
    fn test_wrong_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert_eq!(
            store.login("admin", "nope").unwrap_err().code,
            ErrorCode::Unauthorized
        );
        assert_eq!(
            store.login("root", "s3cret").unwrap_err().code,
            ErrorCode::Unauthorized
        );
        assert!(!store.path().exists());
    }

    #[test]
    fn test_no_password_configured() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(AuthSection {
            password_hash: None,
            session_file: dir.path().join("session.json"),
            ..AuthSection::default()
        });
        let err = store.login("admin", "anything").unwrap_err();
        assert!(err.message.contains("No administrator password"));
    }

    #[test]
    fn test_session_expires() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let start = Utc::now();
        store.login_at("admin", "s3cret", start).unwrap();

        assert!(store.current_at(start + Duration::hours(7)).unwrap().is_some());
        assert!(store.current_at(start + Duration::hours(8)).unwrap().is_none());
        // The expired file was removed
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_session_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.current().unwrap().is_none());
        assert!(!store.path().exists());
    }
}
