//! # Contract Commands
//!
//! Batch creation, lookups, edits, bulk milestone updates, the dashboard and
//! the document checklist.
//!
//! ## Lifecycle Through the Commands
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_batch ───► posted                                              │
//! │                      │                                                  │
//! │                      │ bulk_update { noa }        update_contract       │
//! │                      ▼                            (any field, --clear)  │
//! │                   awarded                                               │
//! │                      │                                                  │
//! │                      │ bulk_update { ntp }                              │
//! │                      ▼                                                  │
//! │                   proceed                                               │
//! │                                                                         │
//! │  set_status(cancelled) from anywhere; cancelled survives later edits   │
//! │  and imports until set_status moves it back                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::path::Path;
use std::time::Instant;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use procura_core::{
    Amount, Contract, ContractFilter, ContractStatus, DashboardSummary, MilestoneUpdate, NewBatch,
    ValidationError, DASHBOARD_RECENT_LIMIT,
};

use crate::error::ApiError;
use crate::state::{DbState, Session};

/// Default and maximum number of search results.
const SEARCH_DEFAULT_LIMIT: u32 = 20;
const SEARCH_MAX_LIMIT: u32 = 100;

/// The current calendar year, used when no year is given.
pub fn current_year() -> String {
    Local::now().year().to_string()
}

// =============================================================================
// Create
// =============================================================================

/// Adds a batch of contracts, all starting as posted.
///
/// The whole batch fails if any contract ID already exists.
pub async fn create_batch(
    db: &DbState,
    session: &Session,
    batch: NewBatch,
) -> Result<Vec<Contract>, ApiError> {
    let start = Instant::now();
    debug!(
        user = %session.username,
        batch = %batch.batch,
        count = batch.contracts.len(),
        "create_batch command"
    );

    let contracts = db.contracts().insert_batch(&batch).await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = contracts.len(),
        register = %db.register(),
        "create_batch complete"
    );
    Ok(contracts)
}

// =============================================================================
// Lookups
// =============================================================================

/// Gets one contract by its contract ID.
pub async fn get_contract(db: &DbState, contract_id: &str) -> Result<Contract, ApiError> {
    debug!(contract_id = %contract_id, "get_contract command");
    Ok(db.contracts().require(contract_id.trim()).await?)
}

/// Lists contracts by year and status.
pub async fn list_contracts(db: &DbState, filter: ContractFilter) -> Result<Vec<Contract>, ApiError> {
    debug!(year = ?filter.year, status = ?filter.status, "list_contracts command");
    Ok(db.contracts().list(&filter).await?)
}

/// Searches contract ID, project name and contractor.
///
/// ## Arguments
/// * `limit` - Maximum results (default: 20, max: 100)
pub async fn search_contracts(
    db: &DbState,
    query: &str,
    year: Option<&str>,
    limit: Option<u32>,
) -> Result<Vec<Contract>, ApiError> {
    let start = Instant::now();
    let limit = limit.unwrap_or(SEARCH_DEFAULT_LIMIT).min(SEARCH_MAX_LIMIT);
    debug!(query = %query, year = ?year, limit = %limit, "search_contracts command");

    let contracts = db.contracts().search(query, year, limit).await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = contracts.len(),
        "search_contracts complete"
    );
    Ok(contracts)
}

// =============================================================================
// Single Edit
// =============================================================================

/// Changes to one contract. `None` keeps the stored value; `clear` empties
/// optional fields by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractEdit {
    pub contract_id: Option<String>,
    pub batch: Option<String>,
    pub year: Option<String>,
    pub posting: Option<NaiveDate>,
    pub pre_bid: Option<NaiveDate>,
    pub bidding: Option<NaiveDate>,
    pub project_name: Option<String>,
    pub milestones: MilestoneUpdate,
    pub clear: Vec<String>,
}

/// Names accepted by `ContractEdit::clear`.
pub const CLEARABLE_FIELDS: [&str; 11] = [
    "contract-amount",
    "contractor",
    "bid-eval-start",
    "bid-eval-end",
    "post-qual-start",
    "post-qual-end",
    "reso",
    "noa",
    "ntp",
    "ntp-received",
    "contract-date",
];

impl ContractEdit {
    /// Applies the edit. The status is re-derived from the resulting
    /// milestones unless the contract is cancelled.
    pub fn apply(self, contract: &mut Contract) -> Result<(), ValidationError> {
        for field in &self.clear {
            match field.trim().replace('_', "-").as_str() {
                "contract-amount" | "amount" => contract.contract_amount = None,
                "contractor" => contract.contractor = None,
                "bid-eval-start" => contract.bid_eval_start = None,
                "bid-eval-end" => contract.bid_eval_end = None,
                "post-qual-start" => contract.post_qual_start = None,
                "post-qual-end" => contract.post_qual_end = None,
                "reso" => contract.reso = None,
                "noa" => contract.noa = None,
                "ntp" => contract.ntp = None,
                "ntp-received" => contract.ntp_received = None,
                "contract-date" => contract.contract_date = None,
                _ => {
                    return Err(ValidationError::NotAllowed {
                        field: "clear".to_string(),
                        allowed: CLEARABLE_FIELDS.iter().map(|f| f.to_string()).collect(),
                    })
                }
            }
        }

        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        fn set_opt<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut contract.contract_id, self.contract_id);
        set(&mut contract.batch, self.batch);
        set(&mut contract.year, self.year);
        set(&mut contract.posting, self.posting);
        set(&mut contract.pre_bid, self.pre_bid);
        set(&mut contract.bidding, self.bidding);
        set(&mut contract.project_name, self.project_name);

        let m = self.milestones;
        set_opt(&mut contract.contract_amount, m.contract_amount);
        set_opt(&mut contract.contractor, m.contractor);
        set_opt(&mut contract.bid_eval_start, m.bid_eval_start);
        set_opt(&mut contract.bid_eval_end, m.bid_eval_end);
        set_opt(&mut contract.post_qual_start, m.post_qual_start);
        set_opt(&mut contract.post_qual_end, m.post_qual_end);
        set_opt(&mut contract.reso, m.reso);
        set_opt(&mut contract.noa, m.noa);
        set_opt(&mut contract.ntp, m.ntp);
        set_opt(&mut contract.ntp_received, m.ntp_received);
        set_opt(&mut contract.contract_date, m.contract_date);

        contract.status = contract.derived_status();
        Ok(())
    }
}

/// Edits one contract.
pub async fn update_contract(
    db: &DbState,
    session: &Session,
    contract_id: &str,
    edit: ContractEdit,
) -> Result<Contract, ApiError> {
    debug!(user = %session.username, contract_id = %contract_id, "update_contract command");

    let repo = db.contracts();
    let mut contract = repo.require(contract_id.trim()).await?;
    edit.apply(&mut contract)?;
    let updated = repo.update(&contract).await?;

    info!(contract_id = %updated.contract_id, status = %updated.status, "Contract updated");
    Ok(updated)
}

// =============================================================================
// Bulk Update / Status / Delete
// =============================================================================

/// Applies the same milestone fields to several contracts.
///
/// ## Returns
/// Number of contracts updated (unknown IDs are skipped).
pub async fn bulk_update(
    db: &DbState,
    session: &Session,
    contract_ids: &[String],
    update: MilestoneUpdate,
) -> Result<usize, ApiError> {
    debug!(
        user = %session.username,
        count = contract_ids.len(),
        implied = ?update.implied_status(),
        "bulk_update command"
    );
    Ok(db.contracts().update_milestones(contract_ids, &update).await?)
}

/// Sets a contract's status explicitly (e.g. cancelling it).
pub async fn set_status(
    db: &DbState,
    session: &Session,
    contract_id: &str,
    status: ContractStatus,
) -> Result<Contract, ApiError> {
    debug!(user = %session.username, contract_id = %contract_id, status = %status, "set_status command");
    Ok(db.contracts().set_status(contract_id.trim(), status).await?)
}

/// Deletes a contract.
pub async fn delete_contract(db: &DbState, session: &Session, contract_id: &str) -> Result<(), ApiError> {
    debug!(user = %session.username, contract_id = %contract_id, "delete_contract command");
    db.contracts().delete(contract_id).await?;
    info!(contract_id = %contract_id, register = %db.register(), "Contract deleted");
    Ok(())
}

// =============================================================================
// Dashboard
// =============================================================================

/// Counts and recent contracts per status for a year (default: this year).
pub async fn dashboard(db: &DbState, year: Option<&str>) -> Result<DashboardSummary, ApiError> {
    let year = match year {
        Some(year) => procura_core::validation::normalize_year(year)?,
        None => current_year(),
    };
    debug!(year = %year, "dashboard command");
    Ok(db.contracts().dashboard(&year, DASHBOARD_RECENT_LIMIT).await?)
}

// =============================================================================
// Checklist
// =============================================================================

/// Which checklist rows to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    #[default]
    All,
    Present,
    Missing,
}

/// Checklist options.
#[derive(Debug, Clone, Default)]
pub struct ChecklistQuery {
    pub year: Option<String>,
    pub status: Option<ContractStatus>,
    pub presence: Presence,
    pub descending: bool,
}

/// One contract and whether the folder holds a file for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistEntry {
    pub contract_id: String,
    pub project_name: String,
    pub status: ContractStatus,
    pub contract_amount: Option<Amount>,
    /// First matching file name, if any.
    pub file: Option<String>,
}

impl ChecklistEntry {
    pub fn is_present(&self) -> bool {
        self.file.is_some()
    }
}

/// Marks each contract of a year as present or missing in `folder`.
///
/// A contract is present when any entry name in the folder contains its
/// contract ID, ignoring case (`24id0001 signed.pdf` matches `24ID0001`).
pub async fn checklist(
    db: &DbState,
    folder: &Path,
    query: ChecklistQuery,
) -> Result<Vec<ChecklistEntry>, ApiError> {
    if !folder.is_dir() {
        return Err(ApiError::validation(format!(
            "Not a folder: {}",
            folder.display()
        )));
    }

    let mut names: Vec<String> = fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();

    let filter = ContractFilter {
        year: Some(query.year.unwrap_or_else(current_year)),
        status: query.status,
    };
    let contracts = db.contracts().list(&filter).await?;
    debug!(folder = %folder.display(), files = names.len(), contracts = contracts.len(), "checklist command");

    let mut entries: Vec<ChecklistEntry> = contracts
        .into_iter()
        .map(|c| {
            let id = c.contract_id.to_lowercase();
            let file = lowered
                .iter()
                .position(|name| name.contains(&id))
                .map(|i| names[i].clone());
            ChecklistEntry {
                contract_id: c.contract_id,
                project_name: c.project_name,
                status: c.status,
                contract_amount: c.contract_amount,
                file,
            }
        })
        .filter(|e| match query.presence {
            Presence::All => true,
            Presence::Present => e.is_present(),
            Presence::Missing => !e.is_present(),
        })
        .collect();

    if query.descending {
        entries.reverse();
    }
    Ok(entries)
}
