//! # Settings Repository
//!
//! Key/value preferences stored in the `settings` table.
//!
//! Known keys:
//! - `register` - register used when `--register` is not given
//! - `show_dashboard` - whether `procura` with no command prints the dashboard

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for application settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Reads a setting.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Writes a setting, replacing any previous value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, "Writing setting");
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Reads a boolean setting; anything other than "true"/"1" is false.
    pub async fn get_bool(&self, key: &str, default: bool) -> DbResult<bool> {
        Ok(match self.get(key).await? {
            Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
            None => default,
        })
    }

    pub async fn set_bool(&self, key: &str, value: bool) -> DbResult<()> {
        self.set(key, if value { "true" } else { "false" }).await
    }

    /// Removes a setting. Returns whether it existed.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM settings WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All settings ordered by key.
    pub async fn list(&self) -> DbResult<Vec<(String, String)>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM settings ORDER BY key")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = db.settings();

        assert_eq!(settings.get("register").await.unwrap(), None);
        settings.set("register", "goods").await.unwrap();
        settings.set("register", "contracts").await.unwrap();
        assert_eq!(settings.get("register").await.unwrap().as_deref(), Some("contracts"));

        assert!(settings.get_bool("show_dashboard", true).await.unwrap());
        settings.set_bool("show_dashboard", false).await.unwrap();
        assert!(!settings.get_bool("show_dashboard", true).await.unwrap());

        assert_eq!(settings.list().await.unwrap().len(), 2);
        assert!(settings.delete("register").await.unwrap());
        assert!(!settings.delete("register").await.unwrap());
    }
}
