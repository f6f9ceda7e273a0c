//! # Contractor Repository
//!
//! The contractor directory: the names, addresses and officers that the
//! documents and the contract forms pick from.
//!
//! ## Import Matching
//! ```text
//! input.email present? ──yes──► row with that email? ──yes──► update it
//!        │                              │
//!        no                             no
//!        ▼                              ▼
//! row with that exact name? ──yes──► update it
//!        │
//!        no ──► insert
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use procura_core::validation::{validate_contractor, validate_search_query};
use procura_core::{Contractor, ContractorInput, CoreError, UpsertOutcome};

const CONTRACTOR_COLUMNS: &str =
    "id, name, address, email, amo, designation, tin, created_at, updated_at";

/// Repository for contractor database operations.
#[derive(Debug, Clone)]
pub struct ContractorRepository {
    pool: SqlitePool,
}

impl ContractorRepository {
    /// Creates a new ContractorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ContractorRepository { pool }
    }

    /// Inserts a new contractor.
    ///
    /// ## Errors
    /// - Validation error (missing name/address, malformed email)
    /// - [`DbError::UniqueViolation`] when the email is already used
    pub async fn insert(&self, input: &ContractorInput) -> DbResult<Contractor> {
        let input = clean(input);
        validate_contractor(&input)?;
        debug!(name = %input.name, "Inserting contractor");

        let now = Utc::now();
        let contractor = Contractor {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            address: input.address,
            email: input.email,
            amo: input.amo,
            designation: input.designation,
            tin: input.tin,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO contractors (id, name, address, email, amo, designation, tin, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&contractor.id)
        .bind(&contractor.name)
        .bind(&contractor.address)
        .bind(&contractor.email)
        .bind(&contractor.amo)
        .bind(&contractor.designation)
        .bind(&contractor.tin)
        .bind(contractor.created_at)
        .bind(contractor.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(contractor.email.clone().unwrap_or_default()))?;

        info!(id = %contractor.id, name = %contractor.name, "Contractor created");
        Ok(contractor)
    }

    /// Gets a contractor by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Contractor>> {
        let sql = format!("SELECT {} FROM contractors WHERE id = ?1", CONTRACTOR_COLUMNS);
        let contractor = sqlx::query_as::<_, Contractor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contractor)
    }

    /// Gets a contractor by exact name (first match when names repeat).
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Contractor>> {
        let sql = format!(
            "SELECT {} FROM contractors WHERE name = ?1 ORDER BY created_at LIMIT 1",
            CONTRACTOR_COLUMNS
        );
        let contractor = sqlx::query_as::<_, Contractor>(&sql)
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(contractor)
    }

    /// Gets a contractor by email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Contractor>> {
        let sql = format!("SELECT {} FROM contractors WHERE email = ?1", CONTRACTOR_COLUMNS);
        let contractor = sqlx::query_as::<_, Contractor>(&sql)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(contractor)
    }

    /// Like [`get_by_name`](Self::get_by_name) but missing is an error.
    pub async fn require_by_name(&self, name: &str) -> DbResult<Contractor> {
        self.get_by_name(name)
            .await?
            .ok_or_else(|| DbError::Domain(CoreError::ContractorNotFound(name.to_string())))
    }

    /// Searches name, address and email.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Contractor>> {
        let query = validate_search_query(query)?;
        let pattern = format!("%{}%", query);
        let sql = format!(
            "SELECT {} FROM contractors \
             WHERE name LIKE ?1 OR address LIKE ?1 OR IFNULL(email, '') LIKE ?1 \
             ORDER BY name \
             LIMIT ?2",
            CONTRACTOR_COLUMNS
        );

        let contractors = sqlx::query_as::<_, Contractor>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = contractors.len(), "Contractor search complete");
        Ok(contractors)
    }

    /// Lists every contractor ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Contractor>> {
        let sql = format!("SELECT {} FROM contractors ORDER BY name", CONTRACTOR_COLUMNS);
        let contractors = sqlx::query_as::<_, Contractor>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(contractors)
    }

    /// Replaces a contractor's fields.
    pub async fn update(&self, id: &str, input: &ContractorInput) -> DbResult<Contractor> {
        let input = clean(input);
        validate_contractor(&input)?;
        debug!(id = %id, "Updating contractor");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE contractors SET
                name = ?2, address = ?3, email = ?4, amo = ?5,
                designation = ?6, tin = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.email)
        .bind(&input.amo)
        .bind(&input.designation)
        .bind(&input.tin)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(input.email.clone().unwrap_or_default()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Contractor", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Contractor", id))
    }

    /// Deletes a contractor.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting contractor");
        let result = sqlx::query("DELETE FROM contractors WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Contractor", id));
        }
        Ok(())
    }

    /// Inserts or merges an imported contractor.
    ///
    /// Matches by email first, then by exact name. On a match the
    /// non-empty imported fields overwrite the stored ones.
    pub async fn upsert_by_email(&self, input: &ContractorInput) -> DbResult<UpsertOutcome> {
        let input = clean(input);

        let existing = match input.email.as_deref() {
            Some(email) => match self.get_by_email(email).await? {
                Some(found) => Some(found),
                None => self.get_by_name(&input.name).await?,
            },
            None => self.get_by_name(&input.name).await?,
        };

        match existing {
            Some(stored) => {
                let merged = ContractorInput {
                    name: stored.name,
                    address: stored.address,
                    email: stored.email,
                    amo: stored.amo,
                    designation: stored.designation,
                    tin: stored.tin,
                }
                .merge(input);
                self.update(&stored.id, &merged).await?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.insert(&input).await?;
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    /// Number of contractors in the directory.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contractors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Trims text and turns blank optional fields into `None`.
fn clean(input: &ContractorInput) -> ContractorInput {
    fn opt(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
    ContractorInput {
        name: input.name.trim().to_string(),
        address: input.address.trim().to_string(),
        email: opt(&input.email),
        amo: opt(&input.amo),
        designation: opt(&input.designation),
        tin: opt(&input.tin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn acme() -> ContractorInput {
        ContractorInput {
            name: "ACME Builders".to_string(),
            address: "Tagbilaran City, Bohol".to_string(),
            email: Some("bids@acme.ph".to_string()),
            amo: Some("Juan Dela Cruz".to_string()),
            designation: Some("Manager".to_string()),
            tin: None,
        }
    }

    async fn repo() -> ContractorRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().contractors()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let repo = repo().await;
        let created = repo.insert(&acme()).await.unwrap();

        assert_eq!(repo.get_by_id(&created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(repo.require_by_name("ACME Builders").await.unwrap().id, created.id);
        assert_eq!(repo.search("tagbilaran", 10).await.unwrap().len(), 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = repo().await;
        repo.insert(&acme()).await.unwrap();

        let mut other = acme();
        other.name = "Other Builders".to_string();
        match repo.insert(&other).await.unwrap_err() {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "bids@acme.ph"),
            e => panic!("unexpected error: {e:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_email_is_not_unique() {
        let repo = repo().await;
        let mut a = acme();
        a.email = Some("  ".to_string());
        let mut b = a.clone();
        b.name = "Beta Corp".to_string();

        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_matches_email_then_name() {
        let repo = repo().await;
        repo.insert(&acme()).await.unwrap();

        // Same email, new name and TIN
        let renamed = ContractorInput {
            name: "ACME Builders Inc.".to_string(),
            address: String::new(),
            email: Some("bids@acme.ph".to_string()),
            tin: Some("123-456-789".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.upsert_by_email(&renamed).await.unwrap(), UpsertOutcome::Updated);

        let stored = repo.get_by_email("bids@acme.ph").await.unwrap().unwrap();
        assert_eq!(stored.name, "ACME Builders Inc.");
        assert_eq!(stored.address, "Tagbilaran City, Bohol");
        assert_eq!(stored.tin.as_deref(), Some("123-456-789"));
        assert_eq!(stored.amo.as_deref(), Some("Juan Dela Cruz"));

        // No email, matched by name
        let by_name = ContractorInput {
            name: "ACME Builders Inc.".to_string(),
            address: "Panglao, Bohol".to_string(),
            ..Default::default()
        };
        assert_eq!(repo.upsert_by_email(&by_name).await.unwrap(), UpsertOutcome::Updated);

        let fresh = ContractorInput {
            name: "Beta Corp".to_string(),
            address: "Loon, Bohol".to_string(),
            ..Default::default()
        };
        assert_eq!(repo.upsert_by_email(&fresh).await.unwrap(), UpsertOutcome::Inserted);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = repo().await;
        let created = repo.insert(&acme()).await.unwrap();

        let mut edited = acme();
        edited.address = "Jagna, Bohol".to_string();
        let updated = repo.update(&created.id, &edited).await.unwrap();
        assert_eq!(updated.address, "Jagna, Bohol");

        repo.delete(&created.id).await.unwrap();
        assert!(matches!(
            repo.delete(&created.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
