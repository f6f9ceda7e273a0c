//! # Domain Types
//!
//! Core domain types for Procura.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Procura Domain Model                               │
//! │                                                                         │
//! │  ┌─────────────┐          ┌──────────────┐                              │
//! │  │  NewBatch   │ creates  │   Contract   │ contractor (by name)         │
//! │  │ ─────────── │ ───────► │ ──────────── │ ──────────────────┐          │
//! │  │ batch, year │  1..N    │ contract_id  │                   ▼          │
//! │  │ posting     │          │ status       │          ┌──────────────┐    │
//! │  │ pre_bid     │          │ milestones   │          │  Contractor  │    │
//! │  │ bidding     │          └──────┬───────┘          │ ──────────── │    │
//! │  └─────────────┘                 │                  │ name, email  │    │
//! │                                  │ updated by       │ amo, tin     │    │
//! │                    ┌─────────────┴─────────┐        └──────────────┘    │
//! │                    │ MilestoneUpdate (bulk)│                            │
//! │                    │ ImportedContract      │                            │
//! │                    └───────────────────────┘                            │
//! │                                                                         │
//! │  Each contract lives in one Register: contracts (infra) or goods        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Lifecycle
//! ```text
//!   posted ──(NOA date)──► awarded ──(NTP date)──► proceed
//!     │                       │                       │
//!     └───────────────────────┴───────────────────────┴──► cancelled (explicit)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::amount::Amount;
use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Register
// =============================================================================

/// Which contract register an operation targets.
///
/// Both registers share one schema; the variant names the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Register {
    /// Infrastructure contracts.
    #[default]
    Contracts,
    /// Goods and services.
    Goods,
}

impl Register {
    /// Table backing the register.
    pub const fn table(&self) -> &'static str {
        match self {
            Register::Contracts => "contracts",
            Register::Goods => "goods",
        }
    }

    /// Label used in logs and messages.
    pub const fn as_str(&self) -> &'static str {
        self.table()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Register {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contracts" | "contract" | "infra" | "infrastructure" => Ok(Register::Contracts),
            "goods" => Ok(Register::Goods),
            _ => Err(ValidationError::NotAllowed {
                field: "register".to_string(),
                allowed: vec!["contracts".to_string(), "goods".to_string()],
            }),
        }
    }
}

// =============================================================================
// Contract Status
// =============================================================================

/// Procurement status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ContractStatus {
    /// Advertised; bidding not yet concluded.
    Posted,
    /// Notice of Award issued.
    Awarded,
    /// Notice to Proceed issued.
    Proceed,
    /// Procurement cancelled. Only ever set explicitly.
    Cancelled,
}

impl ContractStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [ContractStatus; 4] = [
        ContractStatus::Posted,
        ContractStatus::Awarded,
        ContractStatus::Proceed,
        ContractStatus::Cancelled,
    ];

    /// Lowercase name as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Posted => "posted",
            ContractStatus::Awarded => "awarded",
            ContractStatus::Proceed => "proceed",
            ContractStatus::Cancelled => "cancelled",
        }
    }

    /// Status implied by the award milestones.
    ///
    /// An NTP date wins over a NOA date; with neither the contract is posted.
    pub fn from_milestones(noa: Option<NaiveDate>, ntp: Option<NaiveDate>) -> Self {
        if ntp.is_some() {
            ContractStatus::Proceed
        } else if noa.is_some() {
            ContractStatus::Awarded
        } else {
            ContractStatus::Posted
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "posted" => Ok(ContractStatus::Posted),
            "awarded" => Ok(ContractStatus::Awarded),
            "proceed" => Ok(ContractStatus::Proceed),
            "cancelled" | "canceled" => Ok(ContractStatus::Cancelled),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: ContractStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Contract
// =============================================================================

/// A procurement contract record.
///
/// ## Lifecycle
/// ```text
/// NewBatch ──insert_batch──► Contract(posted)
///                                │
///       MilestoneUpdate / edit / import
///                                │
///                                ▼
///                 Contract(awarded | proceed | cancelled)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Contract {
    /// UUID primary key.
    pub id: String,
    /// Business key, unique within a register (e.g. `24ID0001`).
    pub contract_id: String,
    /// Procurement batch number.
    pub batch: String,
    /// Four-digit year.
    pub year: String,
    #[ts(as = "String")]
    pub posting: NaiveDate,
    #[ts(as = "String")]
    pub pre_bid: NaiveDate,
    #[ts(as = "String")]
    pub bidding: NaiveDate,
    pub project_name: String,
    pub status: ContractStatus,
    pub contract_amount: Option<Amount>,
    /// Winning contractor's name.
    pub contractor: Option<String>,
    #[ts(as = "Option<String>")]
    pub bid_eval_start: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub bid_eval_end: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub post_qual_start: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub post_qual_end: Option<NaiveDate>,
    /// BAC resolution date.
    #[ts(as = "Option<String>")]
    pub reso: Option<NaiveDate>,
    /// Notice of Award.
    #[ts(as = "Option<String>")]
    pub noa: Option<NaiveDate>,
    /// Notice to Proceed.
    #[ts(as = "Option<String>")]
    pub ntp: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub ntp_received: Option<NaiveDate>,
    /// Contract signing date.
    #[ts(as = "Option<String>")]
    pub contract_date: Option<NaiveDate>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// Checks that the contract's milestones allow `to`.
    ///
    /// `awarded` needs a NOA date and `proceed` needs an NTP date; `posted`
    /// and `cancelled` are always allowed.
    pub fn check_status(&self, to: ContractStatus) -> CoreResult<()> {
        let reason = match to {
            ContractStatus::Awarded if self.noa.is_none() => "awarded requires a NOA date",
            ContractStatus::Proceed if self.ntp.is_none() => "proceed requires an NTP date",
            _ => return Ok(()),
        };
        Err(CoreError::InvalidStatusTransition {
            contract_id: self.contract_id.clone(),
            to: to.to_string(),
            reason: reason.to_string(),
        })
    }

    /// Status implied by this contract's milestones, keeping `cancelled`.
    pub fn derived_status(&self) -> ContractStatus {
        if self.status == ContractStatus::Cancelled {
            return ContractStatus::Cancelled;
        }
        ContractStatus::from_milestones(self.noa, self.ntp)
    }
}

// =============================================================================
// Contract Inputs
// =============================================================================

/// One contract inside a new batch.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewContract {
    pub contract_id: String,
    pub project_name: String,
}

/// A batch of contracts advertised together.
///
/// All contracts share the batch number, year and the three posting dates.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewBatch {
    pub batch: String,
    pub year: String,
    #[ts(as = "String")]
    pub posting: NaiveDate,
    #[ts(as = "String")]
    pub pre_bid: NaiveDate,
    #[ts(as = "String")]
    pub bidding: NaiveDate,
    pub contracts: Vec<NewContract>,
}

/// Fields applied to many contracts at once.
///
/// `None` means "leave unchanged"; only the provided fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MilestoneUpdate {
    pub contract_amount: Option<Amount>,
    pub contractor: Option<String>,
    #[ts(as = "Option<String>")]
    pub bid_eval_start: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub bid_eval_end: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub post_qual_start: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub post_qual_end: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub reso: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub noa: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub ntp: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub ntp_received: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub contract_date: Option<NaiveDate>,
}

impl MilestoneUpdate {
    /// True when no field would be written.
    pub fn is_empty(&self) -> bool {
        self == &MilestoneUpdate::default()
    }

    /// Status the update implies, if any.
    ///
    /// ```text
    /// ntp given  → proceed
    /// noa given  → awarded
    /// otherwise  → unchanged (None)
    /// ```
    pub fn implied_status(&self) -> Option<ContractStatus> {
        if self.ntp.is_some() {
            Some(ContractStatus::Proceed)
        } else if self.noa.is_some() {
            Some(ContractStatus::Awarded)
        } else {
            None
        }
    }
}

/// A contract row read from an import file.
///
/// Empty cells are `None`; on update they keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportedContract {
    pub contract_id: String,
    pub batch: Option<String>,
    pub year: Option<String>,
    #[ts(as = "Option<String>")]
    pub posting: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub pre_bid: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub bidding: Option<NaiveDate>,
    pub project_name: Option<String>,
    /// Milestones and award fields, same semantics as a bulk update.
    pub milestones: MilestoneUpdate,
}

/// Result of an import upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Filter for listing contracts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContractFilter {
    pub year: Option<String>,
    pub status: Option<ContractStatus>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Compact row for dashboard lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ContractSummary {
    pub contract_id: String,
    pub project_name: String,
    pub contractor: Option<String>,
    pub status: ContractStatus,
    #[ts(as = "String")]
    pub bidding: NaiveDate,
    /// The milestone the list is ordered by (bidding, NOA or NTP).
    #[ts(as = "Option<String>")]
    pub milestone: Option<NaiveDate>,
}

/// Counts and recent contracts per status for one year.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub year: String,
    pub total: i64,
    pub posted: i64,
    pub awarded: i64,
    pub proceed: i64,
    pub cancelled: i64,
    pub contractors: i64,
    pub recent_posted: Vec<ContractSummary>,
    pub recent_awarded: Vec<ContractSummary>,
    pub recent_proceed: Vec<ContractSummary>,
    pub recent_cancelled: Vec<ContractSummary>,
}

// =============================================================================
// Contractor
// =============================================================================

/// A contractor in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Contractor {
    pub id: String,
    pub name: String,
    pub address: String,
    pub email: Option<String>,
    /// Authorized managing officer.
    pub amo: Option<String>,
    pub designation: Option<String>,
    pub tin: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Contractor fields supplied by a form or an import row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContractorInput {
    pub name: String,
    pub address: String,
    pub email: Option<String>,
    pub amo: Option<String>,
    pub designation: Option<String>,
    pub tin: Option<String>,
}

impl ContractorInput {
    /// Overlays `other` on `self`: non-empty fields of `other` win.
    pub fn merge(self, other: ContractorInput) -> ContractorInput {
        fn pick(new: String, old: String) -> String {
            if new.trim().is_empty() {
                old
            } else {
                new
            }
        }
        ContractorInput {
            name: pick(other.name, self.name),
            address: pick(other.address, self.address),
            email: other.email.or(self.email),
            amo: other.amo.or(self.amo),
            designation: other.designation.or(self.designation),
            tin: other.tin.or(self.tin),
        }
    }
}

// =============================================================================
// Document Inputs
// =============================================================================

/// A bidder listed on a three-strike memo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bidder {
    pub name: String,
    pub address: String,
    pub tel_no: String,
    pub phil_reg: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
