//! # Document Commands
//!
//! Renders the office's Word templates into the output directory.
//!
//! ```text
//! CLI flags ──► prefill(db, contract_id) ──► typed request ──► builder ──► RenderJob(s)
//!                 contract + contractor                                      │
//!                 fill blank fields                                          ▼
//!                                                         render_all(template_dir, output_dir)
//! ```
//!
//! Every generator requires a [`Session`].

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use procura_core::{Amount, Contract, Contractor};
use procura_docs::{
    bid_receipt_document, bond_document, obligation_document, pio_memo_documents, render_all,
    strike_documents, BidReceiptRequest, BondRequest, ObligationRequest, PioMemoRequest,
    RenderJob, StrikeRequest,
};

use crate::error::ApiError;
use crate::state::{AppConfig, DbState, Session};

/// What the stored records know about a contract, used to fill blank flags.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prefill {
    pub contract: Option<Contract>,
    pub contractor: Option<Contractor>,
}

impl Prefill {
    pub fn project_name(&self) -> Option<String> {
        self.contract.as_ref().map(|c| c.project_name.clone())
    }

    pub fn amount(&self) -> Option<Amount> {
        self.contract.as_ref().and_then(|c| c.contract_amount)
    }

    pub fn year(&self) -> Option<String> {
        self.contract.as_ref().map(|c| c.year.clone())
    }

    pub fn contractor_name(&self) -> Option<String> {
        self.contractor
            .as_ref()
            .map(|c| c.name.clone())
            .or_else(|| self.contract.as_ref().and_then(|c| c.contractor.clone()))
    }

    pub fn contractor_address(&self) -> Option<String> {
        self.contractor.as_ref().map(|c| c.address.clone())
    }

    pub fn contractor_tin(&self) -> Option<String> {
        self.contractor.as_ref().and_then(|c| c.tin.clone())
    }

    pub fn representative(&self) -> Option<String> {
        self.contractor.as_ref().and_then(|c| c.amo.clone())
    }

    pub fn representative_designation(&self) -> Option<String> {
        self.contractor.as_ref().and_then(|c| c.designation.clone())
    }
}

/// Looks up the contract in the current register and its winning contractor.
///
/// Unknown contracts are not an error: documents are often produced before
/// the contract is entered.
pub async fn prefill(
    db: &DbState,
    contract_id: &str,
    contractor: Option<&str>,
) -> Result<Prefill, ApiError> {
    let contract = db.contracts().get_by_contract_id(contract_id.trim()).await?;

    let name = contractor
        .map(str::to_string)
        .or_else(|| contract.as_ref().and_then(|c| c.contractor.clone()));
    let contractor = match name {
        Some(name) if !name.trim().is_empty() => db.contractors().get_by_name(name.trim()).await?,
        _ => None,
    };

    debug!(
        contract_id = %contract_id,
        contract_found = contract.is_some(),
        contractor_found = contractor.is_some(),
        "Document prefill"
    );
    Ok(Prefill {
        contract,
        contractor,
    })
}

fn render(config: &AppConfig, jobs: &[RenderJob]) -> Result<Vec<PathBuf>, ApiError> {
    let docs = &config.documents;
    std::fs::create_dir_all(&docs.output_dir)?;
    let written = render_all(jobs, &docs.template_dir, &docs.output_dir)?;
    info!(count = written.len(), output_dir = %docs.output_dir.display(), "Documents generated");
    Ok(written)
}

/// Strike memo, transmittal and one strike form per bidder.
pub fn generate_strike(
    config: &AppConfig,
    session: &Session,
    req: &StrikeRequest,
) -> Result<Vec<PathBuf>, ApiError> {
    debug!(user = %session.username, contract_id = %req.contract_id, bidders = req.bidders.len(), "generate_strike command");
    render(config, &strike_documents(req, &config.office)?)
}

pub fn generate_bid_receipt(
    config: &AppConfig,
    session: &Session,
    req: &BidReceiptRequest,
) -> Result<Vec<PathBuf>, ApiError> {
    debug!(user = %session.username, contract_id = %req.contract_id, "generate_bid_receipt command");
    render(config, &[bid_receipt_document(req, &config.office)?])
}

/// Posting memo plus certificate for the public information office.
pub fn generate_pio_memo(
    config: &AppConfig,
    session: &Session,
    req: &PioMemoRequest,
) -> Result<Vec<PathBuf>, ApiError> {
    debug!(user = %session.username, contracts = req.contracts.len(), "generate_pio_memo command");
    render(config, &pio_memo_documents(req, &config.office)?)
}

pub fn generate_bond(
    config: &AppConfig,
    session: &Session,
    req: &BondRequest,
) -> Result<Vec<PathBuf>, ApiError> {
    debug!(user = %session.username, contract_id = %req.contract_id, bond_type = %req.bond_type, "generate_bond command");
    render(config, &[bond_document(req, &config.office)?])
}

pub fn generate_obligation(
    config: &AppConfig,
    session: &Session,
    req: &ObligationRequest,
) -> Result<Vec<PathBuf>, ApiError> {
    debug!(user = %session.username, contract_id = %req.contract_id, "generate_obligation command");
    render(config, &[obligation_document(req, &config.office)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::{NaiveDate, Utc};
    use procura_core::{ContractorInput, NewBatch, NewContract, Register};
    use procura_db::{Database, DbConfig};
    use std::io::{Cursor, Read, Write};
    use std::path::Path;
    use uuid::Uuid;
    use zip::write::SimpleFileOptions;
    use zip::{ZipArchive, ZipWriter};

    fn session() -> Session {
        Session {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_template(dir: &Path, relative: &str, body: &str) {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(format!("<w:document><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:document>", body).as_bytes())
            .unwrap();
        std::fs::write(path, writer.finish().unwrap().into_inner()).unwrap();
    }

    fn document_xml(path: &Path) -> String {
        let bytes = std::fs::read(path).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    fn config(root: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.documents.template_dir = root.join("templates");
        config.documents.output_dir = root.join("out");
        config
    }

    fn bond(contract_id: &str) -> BondRequest {
        BondRequest {
            contract_id: contract_id.to_string(),
            insurance_company: "Safe Insurance Co.".to_string(),
            date_validated: ymd(2024, 3, 4),
            amount: Amount::from_centavos(123_450),
            amount_text: None,
            contractor: "ACME Builders".to_string(),
            project_no: "P-1".to_string(),
            project_name: "Road Repair".to_string(),
            the_who: "The Regional Director".to_string(),
            designation: "Director".to_string(),
            bond_type: "PERFORMANCE BOND".to_string(),
        }
    }

    #[test]
    fn test_generate_bond() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        write_template(
            &config.documents.template_dir,
            "bond.docx",
            "{contractID}: {amount} ({amountInWords}) {dateValidated}",
        );

        let written = generate_bond(&config, &session(), &bond("24ID0001")).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("24ID0001 PERFORMANCE BOND.docx"));

        let xml = document_xml(&written[0]);
        assert!(xml.contains(
            "24ID0001: 1,234.50 (One Thousand Two Hundred Thirty Four Pesos &amp; 50/100) March 04, 2024"
        ));
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let err = generate_bond(&config, &session(), &bond("24ID0001")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DocumentError);
    }

    #[test]
    fn test_invalid_request_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        write_template(&config.documents.template_dir, "bond.docx", "{contractID}");

        let mut req = bond("24ID0001");
        req.bond_type = "SURETY".to_string();
        let err = generate_bond(&config, &session(), &req).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(!config.documents.output_dir.join("24ID0001 SURETY.docx").exists());
    }

    #[test]
    fn test_generate_strike_set() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let templates = &config.documents.template_dir;
        write_template(templates, "3-STRIKE/strike.docx", "{#bidders}{id}. {name} {/bidders}");
        write_template(templates, "3-STRIKE/transmittal.docx", "{contractName}");
        write_template(templates, "3-STRIKE/individual.docx", "{name} {endUser}");

        let bidder = |name: &str| procura_core::Bidder {
            name: name.to_string(),
            address: "Tagbilaran".to_string(),
            tel_no: "411-0000".to_string(),
            phil_reg: "PG-1".to_string(),
        };
        let req = StrikeRequest {
            contract_id: "24G0001".to_string(),
            contract_name: "Supply of Laptops".to_string(),
            budget: Amount::from_pesos(1_500_000),
            date: ymd(2024, 3, 4),
            category: "Goods and Services".to_string(),
            bidders: vec![bidder("ACME"), bidder("Beta Corp")],
        };

        let written = generate_strike(&config, &session(), &req).unwrap();
        assert_eq!(written.len(), 4);
        assert!(document_xml(&written[0]).contains("1. ACME 2. Beta Corp"));
        assert!(document_xml(&written[3]).contains(&format!("Beta Corp {}", config.office.goods.name)));
    }

    #[tokio::test]
    async fn test_prefill_from_records() {
        let db = DbState::new(
            Database::new(DbConfig::in_memory()).await.unwrap(),
            Register::Contracts,
        );
        db.contractors()
            .insert(&ContractorInput {
                name: "ACME Builders".to_string(),
                address: "Tagbilaran City".to_string(),
                tin: Some("123-456".to_string()),
                amo: Some("Juan".to_string()),
                ..ContractorInput::default()
            })
            .await
            .unwrap();

        let batch = NewBatch {
            batch: "1".to_string(),
            year: "2024".to_string(),
            posting: ymd(2024, 3, 4),
            pre_bid: ymd(2024, 3, 11),
            bidding: ymd(2024, 3, 18),
            contracts: vec![NewContract {
                contract_id: "24ID0001".to_string(),
                project_name: "Road Repair".to_string(),
            }],
        };
        let mut stored = db.contracts().insert_batch(&batch).await.unwrap().remove(0);
        stored.contractor = Some("ACME Builders".to_string());
        stored.contract_amount = Some(Amount::from_pesos(500_000));
        db.contracts().update(&stored).await.unwrap();

        let filled = prefill(&db, "24ID0001", None).await.unwrap();
        assert_eq!(filled.project_name().as_deref(), Some("Road Repair"));
        assert_eq!(filled.amount(), Some(Amount::from_pesos(500_000)));
        assert_eq!(filled.contractor_tin().as_deref(), Some("123-456"));
        assert_eq!(filled.representative().as_deref(), Some("Juan"));

        let unknown = prefill(&db, "24ID9999", None).await.unwrap();
        assert!(unknown.contract.is_none());
        assert!(unknown.contractor_name().is_none());
    }
}
