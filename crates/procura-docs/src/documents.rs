//! # Document Catalogue
//!
//! Turns a typed request into one or more [`RenderJob`]s: which template to
//! fill, with what data, under what file name.
//!
//! ## Catalogue
//! ```text
//! ┌──────────────┬──────────────────────────────┬──────────────────────────────────────┐
//! │ Request      │ Template(s)                  │ Output file(s)                       │
//! ├──────────────┼──────────────────────────────┼──────────────────────────────────────┤
//! │ Strike       │ 3-STRIKE/strike.docx         │ <ID> STRIKE.docx                     │
//! │              │ 3-STRIKE/transmittal.docx    │ <ID> TRANSMITTAL.docx                │
//! │              │ 3-STRIKE/individual.docx     │ <ID> <bidder> STRIKE FORM.docx  (×n) │
//! │ BidReceipt   │ bidReceiptTemplate.docx      │ <ID> <contractor> BID RECEIPT.docx   │
//! │ PioMemo      │ pioMemoTemplate.docx         │ MEMO <IDs> <CERT TYPE>.docx          │
//! │              │ pioCertTemplate.docx         │ CERT <IDs> <CERT TYPE>.docx          │
//! │ Bond         │ bond.docx                    │ <ID> <bond type>.docx                │
//! │ Obligation   │ oblig.docx                   │ <ID> OBLIGATION.docx                 │
//! └──────────────┴──────────────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! Template keys are camelCase (`contractID`, `amountInWords`, ...) so the
//! same .docx files work unchanged.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use procura_core::dates::{ensure_working_day, format_long, format_long_padded, ordinal_day};
use procura_core::validation::{
    validate_bidders, validate_choice, validate_complete, validate_contract_id,
    validate_file_component,
};
use procura_core::{
    amount_to_words, Amount, Bidder, ValidationError, BOND_TYPES, GOODS_CATEGORY, PIO_CERT_TYPES,
    STRIKE_CATEGORIES,
};

use crate::docx::render_docx_file;
use crate::error::DocResult;

/// How many contract IDs a PIO memo file name lists.
const PIO_FILE_NAME_IDS: usize = 5;

// =============================================================================
// Office Configuration
// =============================================================================

/// A signatory printed on strike documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndUser {
    pub name: String,
    pub id: String,
    pub designation: String,
}

/// Office-level values the documents need (the `[office]` config section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    /// Office name, available to every template as `{officeName}`.
    pub name: String,
    /// Signs strike documents for the "Goods and Services" category.
    pub goods: EndUser,
    /// Signs strike documents for every other category.
    pub infrastructure: EndUser,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        OfficeConfig {
            name: "Bids and Awards Committee".to_string(),
            goods: EndUser {
                name: "KATHERINE V. LADAGA".to_string(),
                id: "12 G 0106".to_string(),
                designation: "End User for Goods".to_string(),
            },
            infrastructure: EndUser {
                name: "EDISON M. SALAZAR".to_string(),
                id: "86 G 0033".to_string(),
                designation: "End-user for Construction / Maintenance and Consultancy Projects"
                    .to_string(),
            },
        }
    }
}

impl OfficeConfig {
    /// The end-user who signs for `category`.
    pub fn end_user_for(&self, category: &str) -> &EndUser {
        if category == GOODS_CATEGORY {
            &self.goods
        } else {
            &self.infrastructure
        }
    }
}

// =============================================================================
// Render Jobs
// =============================================================================

/// Every template the catalogue knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Strike,
    Transmittal,
    StrikeForm,
    BidReceipt,
    PioMemo,
    PioCert,
    Bond,
    Obligation,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 8] = [
        DocumentKind::Strike,
        DocumentKind::Transmittal,
        DocumentKind::StrikeForm,
        DocumentKind::BidReceipt,
        DocumentKind::PioMemo,
        DocumentKind::PioCert,
        DocumentKind::Bond,
        DocumentKind::Obligation,
    ];

    /// Template path relative to the template directory.
    pub fn template(&self) -> &'static str {
        match self {
            DocumentKind::Strike => "3-STRIKE/strike.docx",
            DocumentKind::Transmittal => "3-STRIKE/transmittal.docx",
            DocumentKind::StrikeForm => "3-STRIKE/individual.docx",
            DocumentKind::BidReceipt => "bidReceiptTemplate.docx",
            DocumentKind::PioMemo => "pioMemoTemplate.docx",
            DocumentKind::PioCert => "pioCertTemplate.docx",
            DocumentKind::Bond => "bond.docx",
            DocumentKind::Obligation => "oblig.docx",
        }
    }
}

/// One document to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub kind: DocumentKind,
    pub file_name: String,
    pub data: Value,
}

impl RenderJob {
    fn new(kind: DocumentKind, file_name: String, data: Value) -> Self {
        RenderJob {
            kind,
            file_name,
            data,
        }
    }

    /// Fills the template from `template_dir` and writes the result into
    /// `output_dir`. Returns the written path.
    pub fn render(&self, template_dir: &Path, output_dir: &Path) -> DocResult<PathBuf> {
        let template = template_dir.join(self.kind.template());
        let output = output_dir.join(&self.file_name);

        debug!(kind = ?self.kind, template = %template.display(), "Rendering document");
        render_docx_file(&template, &output, &self.data)?;
        info!(file = %output.display(), "Document written");

        Ok(output)
    }
}

/// Renders every job, stopping at the first failure.
pub fn render_all(jobs: &[RenderJob], template_dir: &Path, output_dir: &Path) -> DocResult<Vec<PathBuf>> {
    jobs.iter()
        .map(|job| job.render(template_dir, output_dir))
        .collect()
}

/// Overlays the keys of `extra` on `base` (both JSON objects).
fn merged(base: &Value, extra: Value) -> Value {
    let mut map: Map<String, Value> = base.as_object().cloned().unwrap_or_default();
    if let Value::Object(extra) = extra {
        map.extend(extra);
    }
    Value::Object(map)
}

// =============================================================================
// Three-Strike Set
// =============================================================================

/// The three-strike memo set for one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeRequest {
    pub contract_id: String,
    pub contract_name: String,
    pub budget: Amount,
    pub date: NaiveDate,
    pub category: String,
    pub bidders: Vec<Bidder>,
}

/// Builds the strike memo, the transmittal and one strike form per bidder.
///
/// ## Data
/// ```text
/// common:      contractID, contractName, budget "1,500,000.00",
///              date "March 4, 2024", category,
///              endUser, endID, endDesignation  (chosen by category)
/// strike:      common + bidders[{id: 1.., name, address, telNo, philReg}]
/// transmittal: common
/// form:        common + name, address, telNo, philReg of one bidder
/// ```
pub fn strike_documents(req: &StrikeRequest, office: &OfficeConfig) -> DocResult<Vec<RenderJob>> {
    validate_contract_id(&req.contract_id)?;
    validate_complete(&[("contract name", &req.contract_name)])?;
    validate_choice("category", &req.category, &STRIKE_CATEGORIES)?;
    validate_bidders(&req.bidders)?;

    let end_user = office.end_user_for(&req.category);
    let common = json!({
        "contractID": req.contract_id,
        "contractName": req.contract_name,
        "budget": req.budget.to_string(),
        "date": format_long(req.date),
        "category": req.category,
        "endUser": end_user.name,
        "endID": end_user.id,
        "endDesignation": end_user.designation,
        "officeName": office.name,
    });

    let numbered: Vec<Value> = req
        .bidders
        .iter()
        .enumerate()
        .map(|(i, bidder)| merged(&json!({ "id": i + 1 }), bidder_value(bidder)))
        .collect();

    let mut jobs = vec![
        RenderJob::new(
            DocumentKind::Strike,
            format!("{} STRIKE.docx", req.contract_id),
            merged(&common, json!({ "bidders": numbered })),
        ),
        RenderJob::new(
            DocumentKind::Transmittal,
            format!("{} TRANSMITTAL.docx", req.contract_id),
            common.clone(),
        ),
    ];

    for bidder in &req.bidders {
        jobs.push(RenderJob::new(
            DocumentKind::StrikeForm,
            format!("{} {} STRIKE FORM.docx", req.contract_id, bidder.name.trim()),
            merged(&common, bidder_value(bidder)),
        ));
    }

    Ok(jobs)
}

fn bidder_value(bidder: &Bidder) -> Value {
    json!({
        "name": bidder.name,
        "address": bidder.address,
        "telNo": bidder.tel_no,
        "philReg": bidder.phil_reg,
    })
}

// =============================================================================
// Bid Receipt
// =============================================================================

/// Acknowledgement that a bidder submitted its bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidReceiptRequest {
    pub contract_id: String,
    pub project_name: String,
    pub location: String,
    pub date: NaiveDate,
    pub representative: String,
    pub representative_designation: String,
    pub contractor: String,
    pub address: String,
}

/// Every field is required.
pub fn bid_receipt_document(req: &BidReceiptRequest, office: &OfficeConfig) -> DocResult<RenderJob> {
    validate_contract_id(&req.contract_id)?;
    validate_file_component("contractor", &req.contractor)?;
    validate_complete(&[
        ("project name", &req.project_name),
        ("location", &req.location),
        ("representative", &req.representative),
        ("representative designation", &req.representative_designation),
        ("address", &req.address),
    ])?;

    Ok(RenderJob::new(
        DocumentKind::BidReceipt,
        format!("{} {} BID RECEIPT.docx", req.contract_id, req.contractor.trim()),
        json!({
            "contractID": req.contract_id,
            "projectName": req.project_name,
            "location": req.location,
            "date": format_long(req.date),
            "representative": req.representative,
            "representativeDesignation": req.representative_designation,
            "contractor": req.contractor,
            "address": req.address,
            "officeName": office.name,
        }),
    ))
}

// =============================================================================
// PIO Memo + Certificate
// =============================================================================

/// A contract listed on a PIO memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PioContract {
    pub contract_id: String,
    pub project_name: String,
}

/// Posting memo and certificate sent to the public information office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PioMemoRequest {
    pub cert_type: String,
    pub memo_date: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cert_date: NaiveDate,
    pub contracts: Vec<PioContract>,
}

/// Builds the memo and the certificate.
///
/// ## Rules
/// - The certificate type must be one of the offered types
/// - At least one contract
/// - Every date must be a working day (no weekends or holidays)
/// - The posting period must not end before it starts
pub fn pio_memo_documents(req: &PioMemoRequest, office: &OfficeConfig) -> DocResult<Vec<RenderJob>> {
    validate_choice("certificate type", &req.cert_type, &PIO_CERT_TYPES)?;
    if req.contracts.is_empty() {
        return Err(ValidationError::required("contracts").into());
    }
    for contract in &req.contracts {
        validate_contract_id(&contract.contract_id)?;
    }

    ensure_working_day("memo date", req.memo_date)?;
    ensure_working_day("start date", req.start_date)?;
    ensure_working_day("end date", req.end_date)?;
    ensure_working_day("certificate date", req.cert_date)?;
    if req.end_date < req.start_date {
        return Err(ValidationError::invalid_format("end date", "is before the start date").into());
    }

    let contracts: Vec<Value> = req
        .contracts
        .iter()
        .map(|c| json!({ "contractID": c.contract_id, "projectName": c.project_name }))
        .collect();

    let data = json!({
        "certType": req.cert_type,
        "memoDate": format_long(req.memo_date),
        "startDate": format_long(req.start_date),
        "endDate": format_long(req.end_date),
        "certDate": format_long(req.cert_date),
        "certDay": ordinal_day(req.cert_date),
        "certMonthYear": req.cert_date.format("%B %Y").to_string(),
        "officeName": office.name,
        "contracts": contracts,
    });

    let ids = req
        .contracts
        .iter()
        .take(PIO_FILE_NAME_IDS)
        .map(|c| c.contract_id.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let cert = req.cert_type.trim().to_uppercase();

    Ok(vec![
        RenderJob::new(
            DocumentKind::PioMemo,
            format!("MEMO {} {}.docx", ids, cert),
            data.clone(),
        ),
        RenderJob::new(DocumentKind::PioCert, format!("CERT {} {}.docx", ids, cert), data),
    ])
}

// =============================================================================
// Bond Certification
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondRequest {
    pub contract_id: String,
    pub insurance_company: String,
    pub date_validated: NaiveDate,
    pub amount: Amount,
    /// The amount as the user typed it. A typed `.00` reads "& 00/100" in
    /// words; a parsed `Amount` alone would read "Only".
    #[serde(default)]
    pub amount_text: Option<String>,
    pub contractor: String,
    pub project_no: String,
    pub project_name: String,
    /// Person the certification is addressed to.
    pub the_who: String,
    pub designation: String,
    pub bond_type: String,
}

pub fn bond_document(req: &BondRequest, office: &OfficeConfig) -> DocResult<RenderJob> {
    validate_contract_id(&req.contract_id)?;
    validate_choice("bond type", &req.bond_type, &BOND_TYPES)?;
    validate_complete(&[
        ("insurance company", &req.insurance_company),
        ("contractor", &req.contractor),
        ("project name", &req.project_name),
    ])?;

    let words = match &req.amount_text {
        Some(text) => amount_to_words(text),
        None => req.amount.to_words(),
    };

    Ok(RenderJob::new(
        DocumentKind::Bond,
        format!("{} {}.docx", req.contract_id, req.bond_type.trim()),
        json!({
            "contractID": req.contract_id,
            "insuranceCompany": req.insurance_company,
            "dateValidated": format_long_padded(req.date_validated),
            "amount": req.amount.to_string(),
            "amountInWords": words,
            "contractor": req.contractor,
            "projectNo": req.project_no,
            "projectName": req.project_name,
            "theWho": req.the_who,
            "designation": req.designation,
            "bondType": req.bond_type,
            "officeName": office.name,
        }),
    ))
}

// =============================================================================
// Obligation Request
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObligationRequest {
    pub fund: String,
    pub date: NaiveDate,
    pub amount: Amount,
    pub contractor: String,
    pub contractor_address: String,
    pub contractor_tin: String,
    pub contract_id: String,
    pub pmis: String,
    pub contract_name: String,
    /// Relative weights of the cost split (usually percentages).
    pub labor: u64,
    pub material: u64,
    pub equipment: u64,
    pub saro: String,
    pub source_of_fund: String,
    pub uacs: String,
    pub year: String,
    pub end_user: String,
    pub designation: String,
    pub end_user_title: String,
}

/// Builds the obligation request.
///
/// The amount is split into labor, material and equipment by weight; the
/// three printed parts always add up to the printed total.
pub fn obligation_document(req: &ObligationRequest, office: &OfficeConfig) -> DocResult<RenderJob> {
    validate_contract_id(&req.contract_id)?;
    validate_complete(&[("fund", &req.fund), ("contractor", &req.contractor)])?;

    let parts = req.amount.allocate(&[req.labor, req.material, req.equipment])?;
    let part = |i: usize| parts.get(i).copied().unwrap_or_default().to_string();

    Ok(RenderJob::new(
        DocumentKind::Obligation,
        format!("{} OBLIGATION.docx", req.contract_id),
        json!({
            "fund": req.fund,
            "date": format_long(req.date),
            "amount": req.amount.to_string(),
            "amountWords": req.amount.to_words(),
            "contractor": req.contractor,
            "contractorAddress": req.contractor_address,
            "contractorTIN": req.contractor_tin,
            "contractID": req.contract_id,
            "pmis": req.pmis,
            "contractName": req.contract_name,
            "labor": part(0),
            "material": part(1),
            "equipment": part(2),
            "total": req.amount.to_string(),
            "saro": req.saro,
            "sourceOfFund": req.source_of_fund,
            "uacs": req.uacs,
            "year": req.year,
            "endUser": req.end_user,
            "designation": req.designation,
            "endUserTitle": req.end_user_title,
            "officeName": office.name,
        }),
    ))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocError;
    use procura_core::CoreError;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bidder(name: &str) -> Bidder {
        Bidder {
            name: name.to_string(),
            address: "Tagbilaran City".to_string(),
            tel_no: "038-411-0000".to_string(),
            phil_reg: "PG-1234".to_string(),
        }
    }

    fn strike(category: &str) -> StrikeRequest {
        StrikeRequest {
            contract_id: "24G0001".to_string(),
            contract_name: "Supply of Laptops".to_string(),
            budget: Amount::from_pesos(1_500_000),
            date: ymd(2024, 3, 4),
            category: category.to_string(),
            bidders: vec![bidder("ACME"), bidder("Beta Corp")],
        }
    }

    #[test]
    fn test_strike_set() {
        let jobs = strike_documents(&strike("Goods and Services"), &OfficeConfig::default()).unwrap();
        let names: Vec<_> = jobs.iter().map(|j| j.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "24G0001 STRIKE.docx",
                "24G0001 TRANSMITTAL.docx",
                "24G0001 ACME STRIKE FORM.docx",
                "24G0001 Beta Corp STRIKE FORM.docx",
            ]
        );

        let strike = &jobs[0].data;
        assert_eq!(strike["budget"], "1,500,000.00");
        assert_eq!(strike["date"], "March 4, 2024");
        assert_eq!(strike["endUser"], "KATHERINE V. LADAGA");
        assert_eq!(strike["endID"], "12 G 0106");
        assert_eq!(strike["bidders"][1]["id"], 2);
        assert_eq!(strike["bidders"][1]["telNo"], "038-411-0000");

        assert!(jobs[1].data.get("bidders").is_none());
        assert_eq!(jobs[3].data["name"], "Beta Corp");
        assert_eq!(jobs[3].data["contractID"], "24G0001");
        assert_eq!(jobs[3].kind.template(), "3-STRIKE/individual.docx");
    }

    #[test]
    fn test_strike_end_user_by_category() {
        let office = OfficeConfig::default();
        for category in ["Infrastructure", "Consultancy"] {
            let jobs = strike_documents(&strike(category), &office).unwrap();
            assert_eq!(jobs[0].data["endUser"], "EDISON M. SALAZAR");
            assert_eq!(jobs[0].data["endID"], "86 G 0033");
        }
    }

    #[test]
    fn test_strike_requires_bidders_and_known_category() {
        let mut req = strike("Infrastructure");
        req.bidders.clear();
        assert!(strike_documents(&req, &OfficeConfig::default()).is_err());

        let req = strike("Catering");
        assert!(strike_documents(&req, &OfficeConfig::default()).is_err());
    }

    #[test]
    fn test_bid_receipt() {
        let req = BidReceiptRequest {
            contract_id: "24ID0001".to_string(),
            project_name: "Road".to_string(),
            location: "Loboc".to_string(),
            date: ymd(2025, 1, 5),
            representative: "Juan".to_string(),
            representative_designation: "Engineer".to_string(),
            contractor: "ACME".to_string(),
            address: "Tagbilaran".to_string(),
        };
        let job = bid_receipt_document(&req, &OfficeConfig::default()).unwrap();
        assert_eq!(job.file_name, "24ID0001 ACME BID RECEIPT.docx");
        assert_eq!(job.data["date"], "January 5, 2025");

        let mut incomplete = req;
        incomplete.location = " ".to_string();
        assert!(bid_receipt_document(&incomplete, &OfficeConfig::default()).is_err());
    }

    fn pio(ids: &[&str]) -> PioMemoRequest {
        PioMemoRequest {
            cert_type: "Notice of Award".to_string(),
            memo_date: ymd(2025, 3, 3),
            start_date: ymd(2025, 3, 4),
            end_date: ymd(2025, 3, 11),
            cert_date: ymd(2025, 3, 12),
            contracts: ids
                .iter()
                .map(|id| PioContract {
                    contract_id: id.to_string(),
                    project_name: format!("Project {id}"),
                })
                .collect(),
        }
    }

    #[test]
    fn test_pio_memo_names_and_data() {
        let jobs = pio_memo_documents(
            &pio(&["A1", "A2", "A3", "A4", "A5", "A6"]),
            &OfficeConfig::default(),
        )
        .unwrap();
        assert_eq!(jobs[0].file_name, "MEMO A1, A2, A3, A4, A5 NOTICE OF AWARD.docx");
        assert_eq!(jobs[1].file_name, "CERT A1, A2, A3, A4, A5 NOTICE OF AWARD.docx");
        assert_eq!(jobs[0].kind.template(), "pioMemoTemplate.docx");
        assert_eq!(jobs[1].kind.template(), "pioCertTemplate.docx");

        let data = &jobs[0].data;
        assert_eq!(data["certDay"], "12th");
        assert_eq!(data["certMonthYear"], "March 2025");
        assert_eq!(data["contracts"].as_array().unwrap().len(), 6);
        assert_eq!(data["contracts"][5]["contractID"], "A6");
    }

    #[test]
    fn test_pio_memo_rejects_non_working_days() {
        let mut req = pio(&["A1"]);
        req.memo_date = ymd(2025, 3, 1); // Saturday
        match pio_memo_documents(&req, &OfficeConfig::default()).unwrap_err() {
            DocError::Domain(CoreError::NotAWorkingDay { field, .. }) => assert_eq!(field, "memo date"),
            other => panic!("unexpected {other:?}"),
        }

        let mut req = pio(&["A1"]);
        req.cert_date = ymd(2025, 12, 25);
        assert!(pio_memo_documents(&req, &OfficeConfig::default()).is_err());

        let req = pio(&[]);
        assert!(pio_memo_documents(&req, &OfficeConfig::default()).is_err());
    }

    #[test]
    fn test_bond_fields() {
        let req = BondRequest {
            contract_id: "24ID0001".to_string(),
            insurance_company: "Bohol Surety".to_string(),
            date_validated: ymd(2025, 1, 5),
            amount: Amount::from_centavos(150_000_050),
            amount_text: None,
            contractor: "ACME".to_string(),
            project_no: "P-1".to_string(),
            project_name: "Road".to_string(),
            the_who: "Engr. Cruz".to_string(),
            designation: "BAC Chair".to_string(),
            bond_type: "PERFORMANCE BOND".to_string(),
        };
        let job = bond_document(&req, &OfficeConfig::default()).unwrap();
        assert_eq!(job.file_name, "24ID0001 PERFORMANCE BOND.docx");
        assert_eq!(job.data["dateValidated"], "January 05, 2025");
        assert_eq!(job.data["amount"], "1,500,000.50");
        assert_eq!(
            job.data["amountInWords"],
            "One Million Five Hundred Thousand Pesos & 50/100"
        );
    }

    #[test]
    fn test_bond_words_follow_typed_amount() {
        let typed = "1500000.00";
        let req = BondRequest {
            contract_id: "24ID0001".to_string(),
            insurance_company: "Bohol Surety".to_string(),
            date_validated: ymd(2025, 1, 6),
            amount: Amount::parse(typed).unwrap(),
            amount_text: Some(typed.to_string()),
            contractor: "ACME".to_string(),
            project_no: "P-1".to_string(),
            project_name: "Road".to_string(),
            the_who: "Engr. Cruz".to_string(),
            designation: "BAC Chair".to_string(),
            bond_type: "PERFORMANCE BOND".to_string(),
        };
        let job = bond_document(&req, &OfficeConfig::default()).unwrap();
        assert_eq!(job.data["amount"], "1,500,000.00");
        assert_eq!(
            job.data["amountInWords"],
            "One Million Five Hundred Thousand Pesos & 00/100"
        );

        let req = BondRequest {
            amount: Amount::from_pesos(1_500_000),
            amount_text: Some("1500000".to_string()),
            ..req
        };
        let job = bond_document(&req, &OfficeConfig::default()).unwrap();
        assert_eq!(
            job.data["amountInWords"],
            "One Million Five Hundred Thousand Pesos Only"
        );
    }

    fn oblig(labor: u64, material: u64, equipment: u64) -> ObligationRequest {
        ObligationRequest {
            fund: "General Fund".to_string(),
            date: ymd(2025, 2, 3),
            amount: Amount::from_pesos(100),
            contractor: "ACME".to_string(),
            contractor_address: "Tagbilaran".to_string(),
            contractor_tin: "123".to_string(),
            contract_id: "24ID0001".to_string(),
            pmis: "PMIS-1".to_string(),
            contract_name: "Road".to_string(),
            labor,
            material,
            equipment,
            saro: "SARO-1".to_string(),
            source_of_fund: "20% DF".to_string(),
            uacs: "5021".to_string(),
            year: "2025".to_string(),
            end_user: "Engr. Cruz".to_string(),
            designation: "PEO".to_string(),
            end_user_title: "Provincial Engineer".to_string(),
        }
    }

    #[test]
    fn test_obligation_split_sums_to_total() {
        let job = obligation_document(&oblig(1, 1, 1), &OfficeConfig::default()).unwrap();
        assert_eq!(job.file_name, "24ID0001 OBLIGATION.docx");
        assert_eq!(job.data["labor"], "33.33");
        assert_eq!(job.data["material"], "33.33");
        assert_eq!(job.data["equipment"], "33.34");
        assert_eq!(job.data["total"], "100.00");
        assert_eq!(job.data["amountWords"], "One Hundred Pesos Only");
    }

    #[test]
    fn test_obligation_zero_weights() {
        assert!(matches!(
            obligation_document(&oblig(0, 0, 0), &OfficeConfig::default()),
            Err(DocError::Domain(CoreError::InvalidAllocation { .. }))
        ));
    }

    #[test]
    fn test_every_kind_has_a_template() {
        for kind in DocumentKind::ALL {
            assert!(kind.template().ends_with(".docx"));
        }
    }
}
