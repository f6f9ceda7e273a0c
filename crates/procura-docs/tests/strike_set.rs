//! Renders a full three-strike set from template files on disk.

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use procura_core::{Amount, Bidder};
use procura_docs::{render_all, strike_documents, OfficeConfig, StrikeRequest};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

fn write_template(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(body.as_bytes()).unwrap();
    fs::write(path, writer.finish().unwrap().into_inner()).unwrap();
}

fn document_xml(path: &Path) -> String {
    let mut archive = ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

#[test]
fn strike_set_renders_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    let output = dir.path().join("out");

    write_template(
        &templates.join("3-STRIKE/strike.docx"),
        "<w:p><w:r><w:t>{contractID} ₱{budget} {endUser}</w:t></w:r></w:p>\
         {#bidders}<w:p><w:r><w:t>{id}. {name}</w:t></w:r></w:p>{/bidders}",
    );
    write_template(
        &templates.join("3-STRIKE/transmittal.docx"),
        "<w:p><w:r><w:t>{date} {endDesignation}</w:t></w:r></w:p>",
    );
    write_template(
        &templates.join("3-STRIKE/individual.docx"),
        "<w:p><w:r><w:t>{name} / {philReg}</w:t></w:r></w:p>",
    );

    let request = StrikeRequest {
        contract_id: "24ID0007".to_string(),
        contract_name: "Road Concreting".to_string(),
        budget: Amount::from_pesos(2_750_000),
        date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        category: "Infrastructure".to_string(),
        bidders: vec![
            Bidder {
                name: "ACME & Sons".to_string(),
                address: "Loboc".to_string(),
                tel_no: "1".to_string(),
                phil_reg: "PG-1".to_string(),
            },
            Bidder {
                name: "Beta".to_string(),
                address: "Jagna".to_string(),
                tel_no: "2".to_string(),
                phil_reg: "PG-2".to_string(),
            },
        ],
    };

    let jobs = strike_documents(&request, &OfficeConfig::default()).unwrap();
    let written = render_all(&jobs, &templates, &output).unwrap();
    assert_eq!(written.len(), 4);

    let strike = document_xml(&output.join("24ID0007 STRIKE.docx"));
    assert!(strike.contains("24ID0007 ₱2,750,000.00 EDISON M. SALAZAR"));
    assert!(strike.contains("1. ACME &amp; Sons"));
    assert!(strike.contains("2. Beta"));

    let transmittal = document_xml(&output.join("24ID0007 TRANSMITTAL.docx"));
    assert!(transmittal.contains("June 3, 2024 End-user for Construction"));

    let form = document_xml(&output.join("24ID0007 Beta STRIKE FORM.docx"));
    assert!(form.contains("Beta / PG-2"));
}
