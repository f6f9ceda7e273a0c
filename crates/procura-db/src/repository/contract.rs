//! # Contract Repository
//!
//! Database operations for contracts in one register.
//!
//! ## Key Operations
//! - Batch creation (one transaction per batch)
//! - Lookup, search and filtered listing
//! - Single-record edit, bulk milestone update, explicit status change
//! - Import upserts with keep-what-is-stored semantics
//! - Dashboard counts and recent lists
//!
//! ## Registers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.contracts(Register::Contracts) ──► table `contracts`                │
//! │  db.contracts(Register::Goods)     ──► table `goods`                    │
//! │                                                                         │
//! │  Same columns, same SQL. The table name comes from the Register enum    │
//! │  (never from user input), everything else is bound as a parameter.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Bulk Update Semantics
//! ```text
//! MilestoneUpdate { noa: 2024-02-10, contractor: "ACME", rest: None }
//!      │
//!      ▼
//! UPDATE goods SET noa = COALESCE(?, noa), contractor = COALESCE(?, contractor),
//!                  ..., status = COALESCE(?, status)   ← Some(awarded),
//!                                                          cancelled rows kept
//!  WHERE contract_id = ?
//!      │
//!      ▼
//! None fields keep the stored value; rows affected are summed
//! ```

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use procura_core::validation::{
    normalize_year, validate_contract_id, validate_new_batch, validate_project_name,
    validate_search_query,
};
use procura_core::{
    Contract, ContractFilter, ContractStatus, ContractSummary, CoreError, DashboardSummary,
    ImportedContract, MilestoneUpdate, NewBatch, Register, UpsertOutcome, ValidationError,
};

/// Column list matching [`Contract`]'s `FromRow` layout.
const CONTRACT_COLUMNS: &str = "id, contract_id, batch, year, posting, pre_bid, bidding, \
     project_name, status, contract_amount, contractor, bid_eval_start, bid_eval_end, \
     post_qual_start, post_qual_end, reso, noa, ntp, ntp_received, contract_date, \
     created_at, updated_at";

/// Repository for contract database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.contracts(Register::Contracts);
///
/// let created = repo.insert_batch(&batch).await?;
/// let found = repo.search("bridge", None, 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ContractRepository {
    pool: SqlitePool,
    register: Register,
}

impl ContractRepository {
    /// Creates a new ContractRepository bound to `register`.
    pub fn new(pool: SqlitePool, register: Register) -> Self {
        ContractRepository { pool, register }
    }

    /// The register this repository reads and writes.
    pub fn register(&self) -> Register {
        self.register
    }

    fn table(&self) -> &'static str {
        self.register.table()
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Inserts every contract of a batch in one transaction.
    ///
    /// ## Behavior
    /// - Every contract starts `posted`
    /// - Shared batch fields are copied to each contract
    /// - A contract ID that already exists fails the WHOLE batch with
    ///   [`DbError::UniqueViolation`] naming that ID; nothing is written
    pub async fn insert_batch(&self, batch: &NewBatch) -> DbResult<Vec<Contract>> {
        validate_new_batch(batch)?;
        let year = normalize_year(&batch.year)?;

        debug!(
            register = %self.register,
            batch = %batch.batch,
            count = batch.contracts.len(),
            "Inserting contract batch"
        );

        let now = Utc::now();
        let contracts: Vec<Contract> = batch
            .contracts
            .iter()
            .map(|c| Contract {
                id: Uuid::new_v4().to_string(),
                contract_id: c.contract_id.trim().to_string(),
                batch: batch.batch.trim().to_string(),
                year: year.clone(),
                posting: batch.posting,
                pre_bid: batch.pre_bid,
                bidding: batch.bidding,
                project_name: c.project_name.trim().to_string(),
                status: ContractStatus::Posted,
                contract_amount: None,
                contractor: None,
                bid_eval_start: None,
                bid_eval_end: None,
                post_qual_start: None,
                post_qual_end: None,
                reso: None,
                noa: None,
                ntp: None,
                ntp_received: None,
                contract_date: None,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let mut tx = self.pool.begin().await?;
        for contract in &contracts {
            self.insert_in(&mut tx, contract)
                .await
                .map_err(|e| e.with_value(contract.contract_id.clone()))?;
        }
        tx.commit().await?;

        info!(
            register = %self.register,
            batch = %batch.batch,
            count = contracts.len(),
            "Contract batch created"
        );
        Ok(contracts)
    }

    /// Inserts one full contract row inside a transaction.
    async fn insert_in(&self, tx: &mut Transaction<'_, Sqlite>, c: &Contract) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)",
            self.table(),
            CONTRACT_COLUMNS
        );

        sqlx::query(&sql)
            .bind(&c.id)
            .bind(&c.contract_id)
            .bind(&c.batch)
            .bind(&c.year)
            .bind(c.posting)
            .bind(c.pre_bid)
            .bind(c.bidding)
            .bind(&c.project_name)
            .bind(c.status)
            .bind(c.contract_amount)
            .bind(&c.contractor)
            .bind(c.bid_eval_start)
            .bind(c.bid_eval_end)
            .bind(c.post_qual_start)
            .bind(c.post_qual_end)
            .bind(c.reso)
            .bind(c.noa)
            .bind(c.ntp)
            .bind(c.ntp_received)
            .bind(c.contract_date)
            .bind(c.created_at)
            .bind(c.updated_at)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Gets a contract by its business key.
    pub async fn get_by_contract_id(&self, contract_id: &str) -> DbResult<Option<Contract>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE contract_id = ?1",
            CONTRACT_COLUMNS,
            self.table()
        );
        let contract = sqlx::query_as::<_, Contract>(&sql)
            .bind(contract_id.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(contract)
    }

    /// Gets a contract by its UUID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Contract>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", CONTRACT_COLUMNS, self.table());
        let contract = sqlx::query_as::<_, Contract>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contract)
    }

    /// Like [`get_by_contract_id`](Self::get_by_contract_id) but missing is an error.
    pub async fn require(&self, contract_id: &str) -> DbResult<Contract> {
        self.get_by_contract_id(contract_id)
            .await?
            .ok_or_else(|| DbError::Domain(CoreError::ContractNotFound(contract_id.to_string())))
    }

    /// Searches contract ID, project name and contractor.
    ///
    /// ## Arguments
    /// * `query` - Substring to look for (case-insensitive for ASCII)
    /// * `year` - Optional year restriction
    /// * `limit` - Maximum results to return
    ///
    /// An empty query lists the register (optionally for one year).
    pub async fn search(
        &self,
        query: &str,
        year: Option<&str>,
        limit: u32,
    ) -> DbResult<Vec<Contract>> {
        let query = validate_search_query(query)?;
        debug!(register = %self.register, query = %query, limit = %limit, "Searching contracts");

        let pattern = format!("%{}%", query);
        let sql = format!(
            "SELECT {} FROM {} \
             WHERE (contract_id LIKE ?1 OR project_name LIKE ?1 OR IFNULL(contractor, '') LIKE ?1) \
               AND (?2 IS NULL OR year = ?2) \
             ORDER BY contract_id \
             LIMIT ?3",
            CONTRACT_COLUMNS,
            self.table()
        );

        let contracts = sqlx::query_as::<_, Contract>(&sql)
            .bind(pattern)
            .bind(year)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = contracts.len(), "Search returned contracts");
        Ok(contracts)
    }

    /// Lists contracts, optionally filtered by year and status, ordered by contract ID.
    pub async fn list(&self, filter: &ContractFilter) -> DbResult<Vec<Contract>> {
        debug!(
            register = %self.register,
            year = ?filter.year,
            status = ?filter.status,
            "Listing contracts"
        );

        let sql = format!(
            "SELECT {} FROM {} \
             WHERE (?1 IS NULL OR year = ?1) AND (?2 IS NULL OR status = ?2) \
             ORDER BY contract_id",
            CONTRACT_COLUMNS,
            self.table()
        );

        let contracts = sqlx::query_as::<_, Contract>(&sql)
            .bind(filter.year.as_deref())
            .bind(filter.status)
            .fetch_all(&self.pool)
            .await?;

        Ok(contracts)
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Writes every field of an edited contract (matched on `id`).
    ///
    /// The status is stored as given after [`Contract::check_status`] accepts
    /// it; `updated_at` is refreshed.
    pub async fn update(&self, contract: &Contract) -> DbResult<Contract> {
        validate_contract_id(&contract.contract_id)?;
        validate_project_name(&contract.project_name)?;
        let year = normalize_year(&contract.year)?;
        contract.check_status(contract.status)?;

        debug!(register = %self.register, contract_id = %contract.contract_id, "Updating contract");

        let mut updated = contract.clone();
        updated.year = year;
        updated.updated_at = Utc::now();

        let sql = format!(
            "UPDATE {} SET \
                contract_id = ?2, batch = ?3, year = ?4, posting = ?5, pre_bid = ?6, \
                bidding = ?7, project_name = ?8, status = ?9, contract_amount = ?10, \
                contractor = ?11, bid_eval_start = ?12, bid_eval_end = ?13, \
                post_qual_start = ?14, post_qual_end = ?15, reso = ?16, noa = ?17, \
                ntp = ?18, ntp_received = ?19, contract_date = ?20, updated_at = ?21 \
             WHERE id = ?1",
            self.table()
        );

        let result = sqlx::query(&sql)
            .bind(&updated.id)
            .bind(&updated.contract_id)
            .bind(&updated.batch)
            .bind(&updated.year)
            .bind(updated.posting)
            .bind(updated.pre_bid)
            .bind(updated.bidding)
            .bind(&updated.project_name)
            .bind(updated.status)
            .bind(updated.contract_amount)
            .bind(&updated.contractor)
            .bind(updated.bid_eval_start)
            .bind(updated.bid_eval_end)
            .bind(updated.post_qual_start)
            .bind(updated.post_qual_end)
            .bind(updated.reso)
            .bind(updated.noa)
            .bind(updated.ntp)
            .bind(updated.ntp_received)
            .bind(updated.contract_date)
            .bind(updated.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_value(updated.contract_id.clone()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Contract", &updated.id));
        }

        Ok(updated)
    }

    /// Applies one milestone update to many contracts.
    ///
    /// ## Behavior
    /// - Only `Some` fields are written; `None` keeps the stored value
    /// - Status follows [`MilestoneUpdate::implied_status`]
    ///   (NTP → proceed, else NOA → awarded, else unchanged), except that a
    ///   cancelled contract stays cancelled
    /// - Unknown contract IDs are skipped
    ///
    /// ## Returns
    /// Number of contracts updated.
    ///
    /// ## Errors
    /// A validation error when the update has no fields or no IDs are given.
    pub async fn update_milestones(
        &self,
        contract_ids: &[String],
        update: &MilestoneUpdate,
    ) -> DbResult<usize> {
        if contract_ids.is_empty() {
            return Err(ValidationError::required("contract IDs").into());
        }
        if update.is_empty() {
            return Err(ValidationError::required("at least one field to update").into());
        }

        let status = update.implied_status();
        debug!(
            register = %self.register,
            count = contract_ids.len(),
            status = ?status,
            "Bulk updating contract milestones"
        );

        let sql = format!(
            "UPDATE {} SET \
                contract_amount = COALESCE(?1, contract_amount), \
                contractor = COALESCE(?2, contractor), \
                bid_eval_start = COALESCE(?3, bid_eval_start), \
                bid_eval_end = COALESCE(?4, bid_eval_end), \
                post_qual_start = COALESCE(?5, post_qual_start), \
                post_qual_end = COALESCE(?6, post_qual_end), \
                reso = COALESCE(?7, reso), \
                noa = COALESCE(?8, noa), \
                ntp = COALESCE(?9, ntp), \
                ntp_received = COALESCE(?10, ntp_received), \
                contract_date = COALESCE(?11, contract_date), \
                status = CASE WHEN status = 'cancelled' THEN status \
                              ELSE COALESCE(?12, status) END, \
                updated_at = ?13 \
             WHERE contract_id = ?14",
            self.table()
        );

        let now = Utc::now();
        let mut affected = 0usize;
        let mut tx = self.pool.begin().await?;

        for contract_id in contract_ids {
            let result = sqlx::query(&sql)
                .bind(update.contract_amount)
                .bind(update.contractor.as_deref())
                .bind(update.bid_eval_start)
                .bind(update.bid_eval_end)
                .bind(update.post_qual_start)
                .bind(update.post_qual_end)
                .bind(update.reso)
                .bind(update.noa)
                .bind(update.ntp)
                .bind(update.ntp_received)
                .bind(update.contract_date)
                .bind(status)
                .bind(now)
                .bind(contract_id.trim())
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                debug!(contract_id = %contract_id, "Bulk update skipped unknown contract");
            }
            affected += result.rows_affected() as usize;
        }

        tx.commit().await?;

        info!(register = %self.register, affected, "Bulk update complete");
        Ok(affected)
    }

    /// Sets a contract's status explicitly.
    ///
    /// ## Errors
    /// - Contract not found
    /// - [`CoreError::InvalidStatusTransition`] when the milestones don't
    ///   support the status (e.g. `awarded` without a NOA date)
    pub async fn set_status(&self, contract_id: &str, status: ContractStatus) -> DbResult<Contract> {
        let mut contract = self.require(contract_id).await?;
        contract.check_status(status)?;

        debug!(
            register = %self.register,
            contract_id = %contract_id,
            from = %contract.status,
            to = %status,
            "Setting contract status"
        );

        let now = Utc::now();
        let sql = format!(
            "UPDATE {} SET status = ?1, updated_at = ?2 WHERE id = ?3",
            self.table()
        );
        sqlx::query(&sql)
            .bind(status)
            .bind(now)
            .bind(&contract.id)
            .execute(&self.pool)
            .await?;

        contract.status = status;
        contract.updated_at = now;
        Ok(contract)
    }

    /// Deletes a contract by its business key.
    pub async fn delete(&self, contract_id: &str) -> DbResult<()> {
        debug!(register = %self.register, contract_id = %contract_id, "Deleting contract");

        let sql = format!("DELETE FROM {} WHERE contract_id = ?1", self.table());
        let result = sqlx::query(&sql)
            .bind(contract_id.trim())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::Domain(CoreError::ContractNotFound(
                contract_id.to_string(),
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Import
    // =========================================================================

    /// Inserts or merges one imported row.
    ///
    /// ## Merge Rules
    /// ```text
    /// stored   : reso=2024-02-01  noa=None        contractor="ACME"
    /// imported : reso=None        noa=2024-02-10  contractor=None
    ///      │
    ///      ▼
    /// merged   : reso=2024-02-01  noa=2024-02-10  contractor="ACME"
    ///            status = derived from merged milestones (cancelled stays)
    /// ```
    ///
    /// New contracts need every batch field (batch, year, the three posting
    /// dates, project name); status comes from their milestones.
    pub async fn upsert_imported(&self, row: &ImportedContract) -> DbResult<UpsertOutcome> {
        validate_contract_id(&row.contract_id)?;

        match self.get_by_contract_id(&row.contract_id).await? {
            Some(existing) => {
                let merged = merge_imported(existing, row)?;
                self.update(&merged).await?;
                debug!(contract_id = %row.contract_id, "Import updated contract");
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let contract = new_from_imported(row)?;
                let mut tx = self.pool.begin().await?;
                self.insert_in(&mut tx, &contract)
                    .await
                    .map_err(|e| e.with_value(contract.contract_id.clone()))?;
                tx.commit().await?;
                debug!(contract_id = %row.contract_id, "Import inserted contract");
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Counts per status plus the most recent contracts of each status.
    ///
    /// ## Ordering of the recent lists
    /// ```text
    /// posted    → bidding date DESC
    /// awarded   → NOA date DESC
    /// proceed   → NTP date DESC
    /// cancelled → NTP date DESC
    /// ```
    pub async fn dashboard(&self, year: &str, limit: u32) -> DbResult<DashboardSummary> {
        debug!(register = %self.register, year = %year, "Building dashboard");

        let sql = format!(
            "SELECT status, COUNT(*) FROM {} WHERE year = ?1 GROUP BY status",
            self.table()
        );
        let counts: Vec<(ContractStatus, i64)> = sqlx::query_as(&sql)
            .bind(year)
            .fetch_all(&self.pool)
            .await?;

        let contractors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contractors")
            .fetch_one(&self.pool)
            .await?;

        let mut summary = DashboardSummary {
            year: year.to_string(),
            contractors,
            ..Default::default()
        };
        for (status, count) in counts {
            summary.total += count;
            match status {
                ContractStatus::Posted => summary.posted = count,
                ContractStatus::Awarded => summary.awarded = count,
                ContractStatus::Proceed => summary.proceed = count,
                ContractStatus::Cancelled => summary.cancelled = count,
            }
        }

        summary.recent_posted = self
            .recent(year, ContractStatus::Posted, "bidding", limit)
            .await?;
        summary.recent_awarded = self.recent(year, ContractStatus::Awarded, "noa", limit).await?;
        summary.recent_proceed = self.recent(year, ContractStatus::Proceed, "ntp", limit).await?;
        summary.recent_cancelled = self
            .recent(year, ContractStatus::Cancelled, "ntp", limit)
            .await?;

        Ok(summary)
    }

    /// `order_column` is always one of the fixed milestone column names.
    async fn recent(
        &self,
        year: &str,
        status: ContractStatus,
        order_column: &'static str,
        limit: u32,
    ) -> DbResult<Vec<ContractSummary>> {
        let sql = format!(
            "SELECT contract_id, project_name, contractor, status, bidding, {col} AS milestone \
             FROM {table} \
             WHERE status = ?1 AND year = ?2 \
             ORDER BY {col} DESC, contract_id \
             LIMIT ?3",
            col = order_column,
            table = self.table()
        );

        let rows = sqlx::query_as::<_, ContractSummary>(&sql)
            .bind(status)
            .bind(year)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

// =============================================================================
// Import Helpers
// =============================================================================

/// Overlays the non-empty fields of an imported row on a stored contract.
fn merge_imported(mut c: Contract, row: &ImportedContract) -> DbResult<Contract> {
    fn keep<T>(slot: &mut T, value: Option<T>) {
        if let Some(value) = value {
            *slot = value;
        }
    }
    fn keep_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
        if value.is_some() {
            slot.clone_from(value);
        }
    }

    keep(&mut c.batch, row.batch.clone());
    if let Some(year) = &row.year {
        c.year = normalize_year(year)?;
    }
    keep(&mut c.posting, row.posting);
    keep(&mut c.pre_bid, row.pre_bid);
    keep(&mut c.bidding, row.bidding);
    keep(&mut c.project_name, row.project_name.clone());

    let m = &row.milestones;
    keep_opt(&mut c.contract_amount, &m.contract_amount);
    keep_opt(&mut c.contractor, &m.contractor);
    keep_opt(&mut c.bid_eval_start, &m.bid_eval_start);
    keep_opt(&mut c.bid_eval_end, &m.bid_eval_end);
    keep_opt(&mut c.post_qual_start, &m.post_qual_start);
    keep_opt(&mut c.post_qual_end, &m.post_qual_end);
    keep_opt(&mut c.reso, &m.reso);
    keep_opt(&mut c.noa, &m.noa);
    keep_opt(&mut c.ntp, &m.ntp);
    keep_opt(&mut c.ntp_received, &m.ntp_received);
    keep_opt(&mut c.contract_date, &m.contract_date);

    c.status = c.derived_status();
    Ok(c)
}

/// Builds a brand-new contract from an imported row.
fn new_from_imported(row: &ImportedContract) -> DbResult<Contract> {
    fn need<T: Clone>(field: &str, value: &Option<T>) -> DbResult<T> {
        value
            .clone()
            .ok_or_else(|| ValidationError::required(field).into())
    }

    let project_name = need("project_name", &row.project_name)?;
    validate_project_name(&project_name)?;
    let year = normalize_year(&need("year", &row.year)?)?;
    let m = &row.milestones;
    let now = Utc::now();

    Ok(Contract {
        id: Uuid::new_v4().to_string(),
        contract_id: row.contract_id.trim().to_string(),
        batch: need("batch", &row.batch)?,
        year,
        posting: need("posting", &row.posting)?,
        pre_bid: need("pre_bid", &row.pre_bid)?,
        bidding: need("bidding", &row.bidding)?,
        project_name,
        status: ContractStatus::from_milestones(m.noa, m.ntp),
        contract_amount: m.contract_amount,
        contractor: m.contractor.clone(),
        bid_eval_start: m.bid_eval_start,
        bid_eval_end: m.bid_eval_end,
        post_qual_start: m.post_qual_start,
        post_qual_end: m.post_qual_end,
        reso: m.reso,
        noa: m.noa,
        ntp: m.ntp,
        ntp_received: m.ntp_received,
        contract_date: m.contract_date,
        created_at: now,
        updated_at: now,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use procura_core::{Amount, NewContract};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch(ids: &[&str]) -> NewBatch {
        NewBatch {
            batch: "1".to_string(),
            year: "2024".to_string(),
            posting: ymd(2024, 1, 8),
            pre_bid: ymd(2024, 1, 15),
            bidding: ymd(2024, 1, 29),
            contracts: ids
                .iter()
                .map(|id| NewContract {
                    contract_id: id.to_string(),
                    project_name: format!("Construction of {}", id),
                })
                .collect(),
        }
    }

    async fn repo() -> ContractRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.contracts(Register::Contracts)
    }

    #[tokio::test]
    async fn test_insert_batch_starts_posted() {
        let repo = repo().await;
        let created = repo.insert_batch(&batch(&["24ID0001", "24ID0002"])).await.unwrap();
        assert_eq!(created.len(), 2);

        let stored = repo.get_by_contract_id("24ID0002").await.unwrap().unwrap();
        assert_eq!(stored.status, ContractStatus::Posted);
        assert_eq!(stored.bidding, ymd(2024, 1, 29));
        assert_eq!(stored.batch, "1");
        assert_eq!(repo.get_by_id(&stored.id).await.unwrap().unwrap(), stored);
    }

    #[tokio::test]
    async fn test_insert_batch_is_atomic() {
        let repo = repo().await;
        repo.insert_batch(&batch(&["24ID0002"])).await.unwrap();

        let err = repo
            .insert_batch(&batch(&["24ID0001", "24ID0002", "24ID0003"]))
            .await
            .unwrap_err();
        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "24ID0002"),
            other => panic!("unexpected error: {other:?}"),
        }

        // Nothing from the failed batch was written
        assert!(repo.get_by_contract_id("24ID0001").await.unwrap().is_none());
        assert!(repo.get_by_contract_id("24ID0003").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_registers_are_separate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.contracts(Register::Goods)
            .insert_batch(&batch(&["24G0001"]))
            .await
            .unwrap();

        assert!(db
            .contracts(Register::Contracts)
            .get_by_contract_id("24G0001")
            .await
            .unwrap()
            .is_none());
        // Same ID may exist in both registers
        db.contracts(Register::Contracts)
            .insert_batch(&batch(&["24G0001"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_and_list() {
        let repo = repo().await;
        repo.insert_batch(&batch(&["24ID0001", "24ID0002"])).await.unwrap();

        let found = repo.search("0002", None, 20).await.unwrap();
        assert_eq!(found.len(), 1);
        let found = repo.search("construction", Some("2024"), 20).await.unwrap();
        assert_eq!(found.len(), 2);
        let found = repo.search("", Some("2023"), 20).await.unwrap();
        assert!(found.is_empty());

        let listed = repo
            .list(&ContractFilter {
                year: Some("2024".to_string()),
                status: Some(ContractStatus::Posted),
            })
            .await
            .unwrap();
        let ids: Vec<_> = listed.iter().map(|c| c.contract_id.as_str()).collect();
        assert_eq!(ids, vec!["24ID0001", "24ID0002"]);

        let awarded = repo
            .list(&ContractFilter {
                year: None,
                status: Some(ContractStatus::Awarded),
            })
            .await
            .unwrap();
        assert!(awarded.is_empty());
    }

    #[tokio::test]
    async fn test_update_milestones_only_touches_given_fields() {
        let repo = repo().await;
        repo.insert_batch(&batch(&["24ID0001", "24ID0002", "24ID0003"])).await.unwrap();

        let first = MilestoneUpdate {
            reso: Some(ymd(2024, 2, 5)),
            contractor: Some("ACME Builders".to_string()),
            ..Default::default()
        };
        let ids = vec!["24ID0001".to_string(), "24ID0002".to_string(), "NOPE".to_string()];
        assert_eq!(repo.update_milestones(&ids, &first).await.unwrap(), 2);

        let second = MilestoneUpdate {
            noa: Some(ymd(2024, 2, 10)),
            contract_amount: Some(Amount::from_pesos(1_500_000)),
            ..Default::default()
        };
        let ids = vec!["24ID0001".to_string()];
        assert_eq!(repo.update_milestones(&ids, &second).await.unwrap(), 1);

        let c = repo.require("24ID0001").await.unwrap();
        assert_eq!(c.status, ContractStatus::Awarded);
        assert_eq!(c.reso, Some(ymd(2024, 2, 5)));
        assert_eq!(c.contractor.as_deref(), Some("ACME Builders"));
        assert_eq!(c.contract_amount, Some(Amount::from_pesos(1_500_000)));

        // Only reso/contractor: status untouched
        let c = repo.require("24ID0002").await.unwrap();
        assert_eq!(c.status, ContractStatus::Posted);

        let third = MilestoneUpdate {
            ntp: Some(ymd(2024, 3, 1)),
            ..Default::default()
        };
        repo.update_milestones(&["24ID0003".to_string()], &third).await.unwrap();
        assert_eq!(repo.require("24ID0003").await.unwrap().status, ContractStatus::Proceed);
    }

    #[tokio::test]
    async fn test_update_milestones_rejects_empty() {
        let repo = repo().await;
        let err = repo
            .update_milestones(&["24ID0001".to_string()], &MilestoneUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_set_status_and_delete() {
        let repo = repo().await;
        repo.insert_batch(&batch(&["24ID0001"])).await.unwrap();

        let err = repo.set_status("24ID0001", ContractStatus::Awarded).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidStatusTransition { .. })
        ));

        let c = repo.set_status("24ID0001", ContractStatus::Cancelled).await.unwrap();
        assert_eq!(c.status, ContractStatus::Cancelled);

        repo.delete("24ID0001").await.unwrap();
        assert!(matches!(
            repo.delete("24ID0001").await,
            Err(DbError::Domain(CoreError::ContractNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_full_record() {
        let repo = repo().await;
        repo.insert_batch(&batch(&["24ID0001"])).await.unwrap();

        let mut c = repo.require("24ID0001").await.unwrap();
        c.project_name = "Rehabilitation of Bridge".to_string();
        c.noa = Some(ymd(2024, 2, 10));
        c.status = ContractStatus::Awarded;
        repo.update(&c).await.unwrap();

        let stored = repo.require("24ID0001").await.unwrap();
        assert_eq!(stored.project_name, "Rehabilitation of Bridge");
        assert_eq!(stored.status, ContractStatus::Awarded);
        assert!(stored.updated_at >= stored.created_at);
    }

    #[tokio::test]
    async fn test_upsert_imported_coalesces() {
        let repo = repo().await;
        repo.insert_batch(&batch(&["24ID0001"])).await.unwrap();
        repo.update_milestones(
            &["24ID0001".to_string()],
            &MilestoneUpdate {
                reso: Some(ymd(2024, 2, 1)),
                contractor: Some("ACME".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let row = ImportedContract {
            contract_id: "24ID0001".to_string(),
            milestones: MilestoneUpdate {
                noa: Some(ymd(2024, 2, 10)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(repo.upsert_imported(&row).await.unwrap(), UpsertOutcome::Updated);

        let c = repo.require("24ID0001").await.unwrap();
        assert_eq!(c.reso, Some(ymd(2024, 2, 1)));
        assert_eq!(c.contractor.as_deref(), Some("ACME"));
        assert_eq!(c.noa, Some(ymd(2024, 2, 10)));
        assert_eq!(c.status, ContractStatus::Awarded);
        assert_eq!(c.project_name, "Construction of 24ID0001");
    }

    #[tokio::test]
    async fn test_upsert_imported_inserts_and_requires_batch_fields() {
        let repo = repo().await;

        let incomplete = ImportedContract {
            contract_id: "24ID0009".to_string(),
            project_name: Some("Drainage".to_string()),
            ..Default::default()
        };
        assert!(repo.upsert_imported(&incomplete).await.is_err());

        let row = ImportedContract {
            contract_id: "24ID0009".to_string(),
            batch: Some("3".to_string()),
            year: Some("2024.0".to_string()),
            posting: Some(ymd(2024, 3, 1)),
            pre_bid: Some(ymd(2024, 3, 8)),
            bidding: Some(ymd(2024, 3, 20)),
            project_name: Some("Drainage".to_string()),
            milestones: MilestoneUpdate {
                ntp: Some(ymd(2024, 4, 15)),
                ..Default::default()
            },
        };
        assert_eq!(repo.upsert_imported(&row).await.unwrap(), UpsertOutcome::Inserted);

        let c = repo.require("24ID0009").await.unwrap();
        assert_eq!(c.year, "2024");
        assert_eq!(c.status, ContractStatus::Proceed);
    }

    #[tokio::test]
    async fn test_upsert_keeps_cancelled() {
        let repo = repo().await;
        repo.insert_batch(&batch(&["24ID0001"])).await.unwrap();
        repo.set_status("24ID0001", ContractStatus::Cancelled).await.unwrap();

        let row = ImportedContract {
            contract_id: "24ID0001".to_string(),
            milestones: MilestoneUpdate {
                reso: Some(ymd(2024, 2, 1)),
                ..Default::default()
            },
            ..Default::default()
        };
        repo.upsert_imported(&row).await.unwrap();
        assert_eq!(repo.require("24ID0001").await.unwrap().status, ContractStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_bulk_update_keeps_cancelled() {
        let repo = repo().await;
        repo.insert_batch(&batch(&["24ID0001", "24ID0002"])).await.unwrap();
        repo.set_status("24ID0001", ContractStatus::Cancelled).await.unwrap();

        let ids = vec!["24ID0001".to_string(), "24ID0002".to_string()];
        let affected = repo
            .update_milestones(
                &ids,
                &MilestoneUpdate {
                    noa: Some(ymd(2024, 2, 10)),
                    ntp: Some(ymd(2024, 2, 20)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(affected, 2);

        let cancelled = repo.require("24ID0001").await.unwrap();
        assert_eq!(cancelled.status, ContractStatus::Cancelled);
        assert_eq!(cancelled.noa, Some(ymd(2024, 2, 10)));
        assert_eq!(repo.require("24ID0002").await.unwrap().status, ContractStatus::Proceed);
    }

    #[tokio::test]
    async fn test_dashboard_counts_and_recent() {
        let repo = repo().await;
        repo.insert_batch(&batch(&["24ID0001", "24ID0002", "24ID0003"])).await.unwrap();
        repo.update_milestones(
            &["24ID0001".to_string(), "24ID0002".to_string()],
            &MilestoneUpdate {
                noa: Some(ymd(2024, 2, 10)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        repo.update_milestones(
            &["24ID0002".to_string()],
            &MilestoneUpdate {
                noa: Some(ymd(2024, 2, 20)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let summary = repo.dashboard("2024", 10).await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.posted, 1);
        assert_eq!(summary.awarded, 2);
        assert_eq!(summary.proceed, 0);
        assert_eq!(summary.contractors, 0);

        // Most recent NOA first
        assert_eq!(summary.recent_awarded[0].contract_id, "24ID0002");
        assert_eq!(summary.recent_awarded[0].milestone, Some(ymd(2024, 2, 20)));
        assert_eq!(summary.recent_posted.len(), 1);

        let empty = repo.dashboard("2030", 10).await.unwrap();
        assert_eq!(empty.total, 0);
    }
}
