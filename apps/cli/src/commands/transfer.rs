//! # Import / Export Commands
//!
//! CSV in the office spreadsheet layout.
//!
//! ## Contract Columns
//! ```text
//! Batch No. | Year | Posting Date | Pre-Bid Date | Bidding Date | Contract ID |
//! Project Name | Contract Amount | Contractor | Bid Evaluation Start |
//! Bid Evaluation End | Post-Qualification Start | Post-Qualification End |
//! Resolution | NOA | NTP | NTP Received | Contract Signed [| Status]
//! ```
//!
//! ## Import Rules
//! ```text
//! row ──► parse cells ──┬── bad cell ─────────────► failed (warn!, next row)
//!                       ▼
//!              upsert_imported
//!                ├── new contract ──► added
//!                ├── existing ──────► updated (empty cells keep stored values)
//!                └── error ─────────► failed
//! ```
//! Headers are matched ignoring case and surrounding spaces; column order
//! does not matter. One bad row never aborts the file.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use procura_core::dates::parse_flexible;
use procura_core::validation::normalize_year;
use procura_core::{
    Amount, Contract, ContractFilter, Contractor, ContractorInput, ImportedContract, MilestoneUpdate,
    UpsertOutcome, ValidationError,
};

use crate::error::ApiError;
use crate::state::{DbState, Session};

/// Contract columns in spreadsheet order.
pub const CONTRACT_HEADERS: [&str; 18] = [
    "Batch No.",
    "Year",
    "Posting Date",
    "Pre-Bid Date",
    "Bidding Date",
    "Contract ID",
    "Project Name",
    "Contract Amount",
    "Contractor",
    "Bid Evaluation Start",
    "Bid Evaluation End",
    "Post-Qualification Start",
    "Post-Qualification End",
    "Resolution",
    "NOA",
    "NTP",
    "NTP Received",
    "Contract Signed",
];

/// Extra export column.
pub const STATUS_HEADER: &str = "Status";

/// Contractor columns.
pub const CONTRACTOR_HEADERS: [&str; 6] = ["contractorName", "address", "email", "amo", "designation", "tin"];

/// A row that could not be imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFailure {
    /// 1-based line in the file (the header is line 1).
    pub line: u64,
    /// Contract ID or contractor name, when the row had one.
    pub key: Option<String>,
    pub reason: String,
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub added: usize,
    pub updated: usize,
    pub failed: Vec<RowFailure>,
}

impl ImportReport {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.added += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }

    fn fail(&mut self, line: u64, key: Option<String>, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(line, key = ?key, reason = %reason, "Skipping import row");
        self.failed.push(RowFailure { line, key, reason });
    }
}

// =============================================================================
// Row Access
// =============================================================================

/// Header name → column index, ignoring case and surrounding spaces.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        Columns(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_lowercase(), i))
                .collect(),
        )
    }

    fn has(&self, header: &str) -> bool {
        self.0.contains_key(&header.to_lowercase())
    }

    /// The trimmed cell, or `None` when the column is absent or the cell empty.
    fn cell<'r>(&self, record: &'r StringRecord, header: &str) -> Option<&'r str> {
        let index = *self.0.get(&header.to_lowercase())?;
        record.get(index).map(str::trim).filter(|v| !v.is_empty())
    }

    fn text(&self, record: &StringRecord, header: &str) -> Option<String> {
        self.cell(record, header).map(str::to_string)
    }

    fn date(&self, record: &StringRecord, header: &str) -> Result<Option<NaiveDate>, ValidationError> {
        self.cell(record, header)
            .map(|v| parse_flexible(v).map_err(|e| relabel(e, header)))
            .transpose()
    }
}

/// Puts the column name on a date/amount error.
fn relabel(err: ValidationError, header: &str) -> ValidationError {
    match err {
        ValidationError::InvalidFormat { reason, .. } => ValidationError::invalid_format(header, reason),
        other => other,
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Parses one contract row.
fn parse_contract_row(cols: &Columns, record: &StringRecord) -> Result<ImportedContract, ValidationError> {
    let contract_id = cols
        .text(record, "Contract ID")
        .ok_or_else(|| ValidationError::required("Contract ID"))?;

    let year = cols.cell(record, "Year").map(normalize_year).transpose()?;
    let contract_amount = cols
        .cell(record, "Contract Amount")
        .map(|v| Amount::parse(v).map_err(|e| relabel(e, "Contract Amount")))
        .transpose()?;

    Ok(ImportedContract {
        contract_id,
        batch: cols.text(record, "Batch No."),
        year,
        posting: cols.date(record, "Posting Date")?,
        pre_bid: cols.date(record, "Pre-Bid Date")?,
        bidding: cols.date(record, "Bidding Date")?,
        project_name: cols.text(record, "Project Name"),
        milestones: MilestoneUpdate {
            contract_amount,
            contractor: cols.text(record, "Contractor"),
            bid_eval_start: cols.date(record, "Bid Evaluation Start")?,
            bid_eval_end: cols.date(record, "Bid Evaluation End")?,
            post_qual_start: cols.date(record, "Post-Qualification Start")?,
            post_qual_end: cols.date(record, "Post-Qualification End")?,
            reso: cols.date(record, "Resolution")?,
            noa: cols.date(record, "NOA")?,
            ntp: cols.date(record, "NTP")?,
            ntp_received: cols.date(record, "NTP Received")?,
            contract_date: cols.date(record, "Contract Signed")?,
        },
    })
}

fn parse_contractor_row(cols: &Columns, record: &StringRecord) -> ContractorInput {
    ContractorInput {
        name: cols.text(record, "contractorName").unwrap_or_default(),
        address: cols.text(record, "address").unwrap_or_default(),
        email: cols.text(record, "email"),
        amo: cols.text(record, "amo"),
        designation: cols.text(record, "designation"),
        tin: cols.text(record, "tin"),
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, ApiError> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ApiError::transfer(format!("Cannot open {}: {}", path.display(), e)))
}

// =============================================================================
// Contracts
// =============================================================================

/// Imports contracts into the selected register.
pub async fn import_contracts(db: &DbState, session: &Session, path: &Path) -> Result<ImportReport, ApiError> {
    let start = Instant::now();
    debug!(user = %session.username, path = %path.display(), register = %db.register(), "import_contracts command");

    let mut reader = open_reader(path)?;
    let cols = Columns::new(reader.headers()?);
    if !cols.has("Contract ID") {
        return Err(ApiError::transfer("Missing required column: Contract ID"));
    }

    let repo = db.contracts();
    let mut report = ImportReport::default();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                report.fail(line, None, e.to_string());
                continue;
            }
        };
        // Spreadsheets export trailing blank rows
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let line = line_of(&record);
        let row = match parse_contract_row(&cols, &record) {
            Ok(row) => row,
            Err(e) => {
                report.fail(line, cols.text(&record, "Contract ID"), e.to_string());
                continue;
            }
        };

        match repo.upsert_imported(&row).await {
            Ok(outcome) => report.record(outcome),
            Err(e) => report.fail(line, Some(row.contract_id), ApiError::from(e).message),
        }
    }

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        added = report.added,
        updated = report.updated,
        failed = report.failed.len(),
        "import_contracts complete"
    );
    Ok(report)
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn contract_record(c: &Contract) -> Vec<String> {
    vec![
        c.batch.clone(),
        c.year.clone(),
        date_cell(Some(c.posting)),
        date_cell(Some(c.pre_bid)),
        date_cell(Some(c.bidding)),
        c.contract_id.clone(),
        c.project_name.clone(),
        c.contract_amount.map(|a| a.to_plain_string()).unwrap_or_default(),
        c.contractor.clone().unwrap_or_default(),
        date_cell(c.bid_eval_start),
        date_cell(c.bid_eval_end),
        date_cell(c.post_qual_start),
        date_cell(c.post_qual_end),
        date_cell(c.reso),
        date_cell(c.noa),
        date_cell(c.ntp),
        date_cell(c.ntp_received),
        date_cell(c.contract_date),
        c.status.to_string(),
    ]
}

/// Writes the register's contracts (filtered by year and status) to `path`.
///
/// ## Returns
/// Number of contracts written.
pub async fn export_contracts(db: &DbState, path: &Path, filter: ContractFilter) -> Result<usize, ApiError> {
    debug!(path = %path.display(), year = ?filter.year, status = ?filter.status, "export_contracts command");

    let contracts = db.contracts().list(&filter).await?;
    let mut writer = WriterBuilder::new().from_path(path)?;

    let mut header: Vec<&str> = CONTRACT_HEADERS.to_vec();
    header.push(STATUS_HEADER);
    writer.write_record(&header)?;
    for contract in &contracts {
        writer.write_record(contract_record(contract))?;
    }
    writer.flush()?;

    info!(count = contracts.len(), path = %path.display(), "Contracts exported");
    Ok(contracts.len())
}

// =============================================================================
// Contractors
// =============================================================================

/// Folds rows sharing an email into one, later non-empty fields winning.
fn dedupe_by_email(rows: Vec<(u64, ContractorInput)>) -> Vec<(u64, ContractorInput)> {
    let mut out: Vec<(u64, ContractorInput)> = Vec::with_capacity(rows.len());
    let mut by_email: HashMap<String, usize> = HashMap::new();

    for (line, row) in rows {
        let key = row.email.as_deref().map(|e| e.trim().to_lowercase());
        match key.as_ref().and_then(|k| by_email.get(k)) {
            Some(&index) => {
                let (_, earlier) = std::mem::take(&mut out[index]);
                out[index] = (line, earlier.merge(row));
            }
            None => {
                if let Some(key) = key {
                    by_email.insert(key, out.len());
                }
                out.push((line, row));
            }
        }
    }
    out
}

/// Imports contractors, matching existing ones by email (then name).
pub async fn import_contractors(db: &DbState, session: &Session, path: &Path) -> Result<ImportReport, ApiError> {
    let start = Instant::now();
    debug!(user = %session.username, path = %path.display(), "import_contractors command");

    let mut reader = open_reader(path)?;
    let cols = Columns::new(reader.headers()?);
    if !cols.has("contractorName") {
        return Err(ApiError::transfer("Missing required column: contractorName"));
    }

    let mut report = ImportReport::default();
    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) if record.iter().all(|cell| cell.is_empty()) => {}
            Ok(record) => rows.push((line_of(&record), parse_contractor_row(&cols, &record))),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                report.fail(line, None, e.to_string());
            }
        }
    }

    let repo = db.contractors();
    for (line, row) in dedupe_by_email(rows) {
        let key = Some(row.name.clone()).filter(|n| !n.is_empty());
        match repo.upsert_by_email(&row).await {
            Ok(outcome) => report.record(outcome),
            Err(e) => report.fail(line, key, ApiError::from(e).message),
        }
    }

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        added = report.added,
        updated = report.updated,
        failed = report.failed.len(),
        "import_contractors complete"
    );
    Ok(report)
}

fn contractor_record(c: &Contractor) -> [String; 6] {
    [
        c.name.clone(),
        c.address.clone(),
        c.email.clone().unwrap_or_default(),
        c.amo.clone().unwrap_or_default(),
        c.designation.clone().unwrap_or_default(),
        c.tin.clone().unwrap_or_default(),
    ]
}

/// Writes the whole contractor directory to `path`.
pub async fn export_contractors(db: &DbState, path: &Path) -> Result<usize, ApiError> {
    debug!(path = %path.display(), "export_contractors command");

    let contractors = db.contractors().list().await?;
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(CONTRACTOR_HEADERS)?;
    for contractor in &contractors {
        writer.write_record(contractor_record(contractor))?;
    }
    writer.flush()?;

    info!(count = contractors.len(), path = %path.display(), "Contractors exported");
    Ok(contractors.len())
}
