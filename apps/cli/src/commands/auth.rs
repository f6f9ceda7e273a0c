//! # Auth Commands
//!
//! Login and logout for the single administrator account.

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{hash_password, Session, SessionStore};

/// Result of `procura whoami`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

pub fn login(store: &SessionStore, username: &str, password: &str) -> Result<Session, ApiError> {
    debug!(username = %username, "login command");
    store.login(username, password)
}

/// Returns whether a session was ended.
pub fn logout(store: &SessionStore) -> Result<bool, ApiError> {
    debug!("logout command");
    store.logout()
}

pub fn whoami(store: &SessionStore) -> Result<WhoAmI, ApiError> {
    let session = store.current()?;
    Ok(WhoAmI {
        logged_in: session.is_some(),
        session,
    })
}

/// Produces a PHC string for `auth.password_hash`.
pub fn hash(password: &str) -> Result<String, ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation("Password must not be empty"));
    }
    Ok(hash_password(password)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{verify_password, AuthSection};

    #[test]
    fn test_login_whoami_logout() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(AuthSection {
            password_hash: Some(hash("s3cret").unwrap()),
            session_file: dir.path().join("session.json"),
            ..AuthSection::default()
        });

        assert!(!whoami(&store).unwrap().logged_in);
        let session = login(&store, "admin", "s3cret").unwrap();

        let me = whoami(&store).unwrap();
        assert!(me.logged_in);
        assert_eq!(me.session, Some(session));

        assert!(logout(&store).unwrap());
        assert!(!whoami(&store).unwrap().logged_in);
    }

    #[test]
    fn test_hash() {
        let phc = hash("s3cret").unwrap();
        assert!(phc.starts_with("$argon2"));
        assert!(verify_password("s3cret", &phc));
        assert!(hash("").is_err());
    }
}
