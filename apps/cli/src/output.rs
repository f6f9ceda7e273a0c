//! # Terminal Output
//!
//! Plain-text tables and detail views for command results. `--json` skips
//! this module and serializes the results directly.

use std::fmt::Write;
use std::path::PathBuf;

use chrono::NaiveDate;

use procura_core::{Contract, ContractSummary, Contractor, DashboardSummary};

use crate::commands::contract::ChecklistEntry;
use crate::commands::transfer::ImportReport;

/// Left-aligned columns sized to their widest cell, with a dashed rule
/// under the header.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers.iter().map(|h| h.to_string()).collect()));
    out.push('\n');
    out.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.clone()));
        out.push('\n');
    }
    out
}

fn date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_default()
}

// =============================================================================
// Contracts
// =============================================================================

pub fn contract_list(contracts: &[Contract]) -> String {
    if contracts.is_empty() {
        return "No contracts found.".to_string();
    }
    let rows: Vec<Vec<String>> = contracts
        .iter()
        .map(|c| {
            vec![
                c.contract_id.clone(),
                c.year.clone(),
                c.status.to_string(),
                c.bidding.to_string(),
                c.contract_amount.map(|a| a.to_string()).unwrap_or_default(),
                c.project_name.clone(),
            ]
        })
        .collect();
    let mut out = table(
        &["Contract ID", "Year", "Status", "Bidding", "Amount", "Project"],
        &rows,
    );
    let _ = write!(out, "{} contract(s)", contracts.len());
    out
}

pub fn contract_details(c: &Contract) -> String {
    let fields: [(&str, String); 19] = [
        ("Contract ID", c.contract_id.clone()),
        ("Project", c.project_name.clone()),
        ("Status", c.status.to_string()),
        ("Batch", c.batch.clone()),
        ("Year", c.year.clone()),
        ("Posting", c.posting.to_string()),
        ("Pre-bid", c.pre_bid.to_string()),
        ("Bidding", c.bidding.to_string()),
        ("Amount", c.contract_amount.map(|a| a.to_string()).unwrap_or_default()),
        ("Contractor", c.contractor.clone().unwrap_or_default()),
        ("Bid eval start", date(c.bid_eval_start)),
        ("Bid eval end", date(c.bid_eval_end)),
        ("Post-qual start", date(c.post_qual_start)),
        ("Post-qual end", date(c.post_qual_end)),
        ("Resolution", date(c.reso)),
        ("NOA", date(c.noa)),
        ("NTP", date(c.ntp)),
        ("NTP received", date(c.ntp_received)),
        ("Contract date", date(c.contract_date)),
    ];

    let mut out = String::new();
    for (label, value) in fields {
        let _ = writeln!(out, "{:<16} {}", format!("{}:", label), value);
    }
    out.trim_end().to_string()
}

fn recent(title: &str, list: &[ContractSummary]) -> String {
    let mut out = format!("{}\n", title);
    if list.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for s in list {
        let _ = writeln!(
            out,
            "  {:<12} {:<10} {}{}",
            s.contract_id,
            date(s.milestone),
            s.project_name,
            s.contractor
                .as_deref()
                .map(|c| format!(" ({})", c))
                .unwrap_or_default()
        );
    }
    out
}

pub fn dashboard(d: &DashboardSummary) -> String {
    let mut out = format!("Dashboard {}\n", d.year);
    out.push_str(&"=".repeat(out.len() - 1));
    out.push('\n');
    let _ = writeln!(
        out,
        "Total {}   Posted {}   Awarded {}   Proceed {}   Cancelled {}   Contractors {}\n",
        d.total, d.posted, d.awarded, d.proceed, d.cancelled, d.contractors
    );
    out.push_str(&recent("Recently posted", &d.recent_posted));
    out.push_str(&recent("Recently awarded", &d.recent_awarded));
    out.push_str(&recent("Recently proceeded", &d.recent_proceed));
    out.push_str(&recent("Cancelled", &d.recent_cancelled));
    out.trim_end().to_string()
}

pub fn checklist(entries: &[ChecklistEntry]) -> String {
    if entries.is_empty() {
        return "No contracts found.".to_string();
    }
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                if e.is_present() { "[x]" } else { "[ ]" }.to_string(),
                e.contract_id.clone(),
                e.status.to_string(),
                e.project_name.clone(),
                e.file.clone().unwrap_or_default(),
            ]
        })
        .collect();
    let present = entries.iter().filter(|e| e.is_present()).count();
    let mut out = table(&["", "Contract ID", "Status", "Project", "File"], &rows);
    let _ = write!(out, "{} of {} present", present, entries.len());
    out
}

// =============================================================================
// Contractors
// =============================================================================

pub fn contractor_list(contractors: &[Contractor]) -> String {
    if contractors.is_empty() {
        return "No contractors found.".to_string();
    }
    let rows: Vec<Vec<String>> = contractors
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                c.address.clone(),
                c.email.clone().unwrap_or_default(),
                c.tin.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(&["Name", "Address", "Email", "TIN"], &rows)
}

pub fn contractor_details(c: &Contractor) -> String {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    format!(
        "Name:        {}\nAddress:     {}\nEmail:       {}\nAMO:         {}\nDesignation: {}\nTIN:         {}\nID:          {}",
        c.name,
        c.address,
        opt(&c.email),
        opt(&c.amo),
        opt(&c.designation),
        opt(&c.tin),
        c.id
    )
}

// =============================================================================
// Misc
// =============================================================================

pub fn import_report(report: &ImportReport) -> String {
    let mut out = format!(
        "Added {}, updated {}, failed {}",
        report.added,
        report.updated,
        report.failed.len()
    );
    for failure in &report.failed {
        let key = failure.key.as_deref().unwrap_or("-");
        let _ = write!(out, "\n  line {} ({}): {}", failure.line, key, failure.reason);
    }
    out
}

pub fn written(paths: &[PathBuf]) -> String {
    let mut out = format!("Generated {} document(s):", paths.len());
    for path in paths {
        let _ = write!(out, "\n  {}", path.display());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_aligns_columns() {
        let out = table(
            &["ID", "Name"],
            &[
                vec!["1".to_string(), "Alpha".to_string()],
                vec!["100".to_string(), "B".to_string()],
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID   Name");
        assert_eq!(lines[1], "---  -----");
        assert_eq!(lines[2], "1    Alpha");
        assert_eq!(lines[3], "100  B");
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(contract_list(&[]), "No contracts found.");
        assert_eq!(contractor_list(&[]), "No contractors found.");
    }
}
