//! # Database State
//!
//! Wraps the `Database` connection together with the register the current
//! invocation works on.
//!
//! ## Register Resolution
//! ```text
//! --register goods ──► Goods
//!        │ (absent)
//!        ▼
//! settings "register" = "goods" ──► Goods
//!        │ (absent or invalid)
//!        ▼
//! Contracts
//! ```

use tracing::warn;

use procura_core::Register;
use procura_db::{ContractRepository, ContractorRepository, Database, DbResult, SettingsRepository};

/// Settings key holding the default register.
pub const REGISTER_SETTING: &str = "register";

/// Database plus the register contract commands target.
#[derive(Debug)]
pub struct DbState {
    db: Database,
    register: Register,
}

impl DbState {
    /// Creates a DbState bound to an explicit register.
    pub fn new(db: Database, register: Register) -> Self {
        DbState { db, register }
    }

    /// Creates a DbState, falling back to the stored default register.
    pub async fn resolve(db: Database, register: Option<Register>) -> DbResult<Self> {
        let register = match register {
            Some(register) => register,
            None => match db.settings().get(REGISTER_SETTING).await? {
                Some(stored) => stored.parse().unwrap_or_else(|_| {
                    warn!(stored = %stored, "Ignoring invalid register setting");
                    Register::default()
                }),
                None => Register::default(),
            },
        };
        Ok(DbState { db, register })
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    pub fn register(&self) -> Register {
        self.register
    }

    /// Contracts in the selected register.
    pub fn contracts(&self) -> ContractRepository {
        self.db.contracts(self.register)
    }

    pub fn contractors(&self) -> ContractorRepository {
        self.db.contractors()
    }

    pub fn settings(&self) -> SettingsRepository {
        self.db.settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procura_db::DbConfig;

    #[tokio::test]
    async fn test_register_falls_back_to_setting() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.settings().set(REGISTER_SETTING, "goods").await.unwrap();

        let state = DbState::resolve(db, None).await.unwrap();
        assert_eq!(state.register(), Register::Goods);
        assert_eq!(state.contracts().register(), Register::Goods);
    }

    #[tokio::test]
    async fn test_explicit_register_wins() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.settings().set(REGISTER_SETTING, "goods").await.unwrap();

        let state = DbState::resolve(db, Some(Register::Contracts)).await.unwrap();
        assert_eq!(state.register(), Register::Contracts);
    }

    #[tokio::test]
    async fn test_invalid_setting_uses_default() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.settings().set(REGISTER_SETTING, "furniture").await.unwrap();

        let state = DbState::resolve(db, None).await.unwrap();
        assert_eq!(state.register(), Register::Contracts);
    }
}
