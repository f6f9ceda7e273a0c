//! # .docx Rendering
//!
//! A .docx file is a zip package of XML parts. Text lives in `<w:t>`
//! elements, and Word freely splits one typed word across several runs:
//!
//! ```text
//! typed:   {contractID}
//! stored:  <w:r><w:t>{contract</w:t></w:r><w:proofErr/><w:r><w:t>ID}</w:t></w:r>
//! ```
//!
//! ## Pipeline
//! ```text
//! template.docx
//!      │  ZipArchive
//!      ▼
//! for each entry ─────────────────────────────────────────────┐
//!      │                                                      │
//!      │ word/document.xml, word/header*.xml, word/footer*.xml│ anything else
//!      ▼                                                      ▼
//! merge_split_tags ──► Template::parse ──► render(Xml)    raw copy
//!      │                                                      │
//!      └──────────────────────────► ZipWriter ◄───────────────┘
//!                                      │
//!                                      ▼
//!                                  output.docx
//! ```

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use serde_json::Value;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{DocError, DocResult};
use crate::template::{Escape, Template};

/// Whether a package entry carries template tags.
fn is_template_part(name: &str) -> bool {
    if name == "word/document.xml" {
        return true;
    }
    (name.starts_with("word/header") || name.starts_with("word/footer")) && name.ends_with(".xml")
}

/// Renders a .docx template held in memory.
pub fn render_docx(template: &[u8], data: &Value) -> DocResult<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(template))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for i in 0..archive.len() {
        let name = archive.by_index(i)?.name().to_string();

        if is_template_part(&name) {
            let mut xml = String::new();
            archive.by_index(i)?.read_to_string(&mut xml)?;

            let merged = merge_split_tags(&xml);
            let rendered = Template::parse(&merged)
                .map_err(|e| in_part(e, &name))?
                .render(data, Escape::Xml);

            writer.start_file(name.as_str(), SimpleFileOptions::default())?;
            writer.write_all(rendered.as_bytes())?;
            debug!(part = %name, "Rendered template part");
        } else {
            writer.raw_copy_file(archive.by_index_raw(i)?)?;
        }
    }

    Ok(writer.finish()?.into_inner())
}

/// Renders a template file into `output`, creating parent directories.
pub fn render_docx_file(template: &Path, output: &Path, data: &Value) -> DocResult<()> {
    if !template.is_file() {
        return Err(DocError::TemplateNotFound(template.to_path_buf()));
    }

    let bytes = fs::read(template)?;
    let rendered = render_docx(&bytes, data)?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, rendered)?;
    Ok(())
}

fn in_part(err: DocError, part: &str) -> DocError {
    match err {
        DocError::TemplateSyntax { position, message } => DocError::TemplateSyntax {
            position,
            message: format!("{} (in {})", message, part),
        },
        other => other,
    }
}

// =============================================================================
// Split Tag Merging
// =============================================================================

/// One `<w:t>` element: where its opening tag starts and where its text is.
struct TextRun {
    open_start: usize,
    text_start: usize,
    text_end: usize,
}

/// Finds every `<w:t>` / `<w:t attr="...">` element with text content.
fn find_text_runs(xml: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut from = 0;

    while let Some(found) = xml[from..].find("<w:t") {
        let open_start = from + found;
        let after_name = open_start + "<w:t".len();
        from = after_name;

        // Skip <w:tab>, <w:tbl>, <w:tc> and friends
        match xml[after_name..].chars().next() {
            Some('>') | Some(' ') => {}
            _ => continue,
        }
        let Some(gt) = xml[after_name..].find('>') else {
            break;
        };
        let text_start = after_name + gt + 1;
        if xml[..text_start].ends_with("/>") {
            continue;
        }
        let Some(close) = xml[text_start..].find("</w:t>") else {
            break;
        };
        let text_end = text_start + close;

        runs.push(TextRun {
            open_start,
            text_start,
            text_end,
        });
        from = text_end;
    }

    runs
}

/// Moves every tag that spans several `<w:t>` elements into the element
/// where it starts.
///
/// ```text
/// before: <w:t>Dear {con</w:t> ... <w:t>tractor}, hi</w:t>
/// after:  <w:t xml:space="preserve">Dear {contractor}</w:t> ... <w:t xml:space="preserve">, hi</w:t>
/// ```
///
/// Text outside tags never moves. All `<w:t>` elements become
/// space-preserving so rendered values keep their spacing.
pub fn merge_split_tags(xml: &str) -> String {
    let runs = find_text_runs(xml);
    if runs.is_empty() {
        return xml.to_string();
    }

    let mut texts: Vec<String> = vec![String::new(); runs.len()];
    let mut owner: Option<usize> = None;

    for (i, run) in runs.iter().enumerate() {
        for c in xml[run.text_start..run.text_end].chars() {
            match owner {
                Some(o) => {
                    texts[o].push(c);
                    if c == '}' {
                        owner = None;
                    }
                }
                None => {
                    texts[i].push(c);
                    if c == '{' {
                        owner = Some(i);
                    }
                }
            }
        }
    }

    let mut out = String::with_capacity(xml.len());
    let mut last = 0;
    for (run, text) in runs.iter().zip(&texts) {
        out.push_str(&xml[last..run.open_start]);
        let open_tag = &xml[run.open_start..run.text_start];
        if open_tag == "<w:t>" {
            out.push_str("<w:t xml:space=\"preserve\">");
        } else {
            out.push_str(open_tag);
        }
        out.push_str(text);
        last = run.text_end;
    }
    out.push_str(&xml[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Builds a minimal package with a document part, a header and an image.
    fn package(document_xml: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.start_file("word/header1.xml", options).unwrap();
        writer
            .write_all(b"<w:hdr><w:p><w:r><w:t>{contractID}</w:t></w:r></w:p></w:hdr>")
            .unwrap();
        writer.start_file("word/media/image1.png", options).unwrap();
        writer.write_all(&[0x89, b'P', b'N', b'G', b'{']).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn read_part(docx: &[u8], name: &str) -> Vec<u8> {
        let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut bytes = Vec::new();
        archive.by_name(name).unwrap().read_to_end(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_merge_moves_tag_into_first_run() {
        let xml = "<w:p><w:r><w:t>Dear {con</w:t></w:r><w:proofErr/>\
                   <w:r><w:t xml:space=\"preserve\">tract</w:t></w:r>\
                   <w:r><w:t>or}, hi</w:t></w:r></w:p>";
        assert_eq!(
            merge_split_tags(xml),
            "<w:p><w:r><w:t xml:space=\"preserve\">Dear {contractor}</w:t></w:r><w:proofErr/>\
             <w:r><w:t xml:space=\"preserve\"></w:t></w:r>\
             <w:r><w:t xml:space=\"preserve\">, hi</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_merge_ignores_tab_and_table_elements() {
        let xml = "<w:tbl><w:tc><w:r><w:tab/><w:t>{a}</w:t></w:r></w:tc></w:tbl>";
        assert_eq!(
            merge_split_tags(xml),
            "<w:tbl><w:tc><w:r><w:tab/><w:t xml:space=\"preserve\">{a}</w:t></w:r></w:tc></w:tbl>"
        );
    }

    #[test]
    fn test_render_docx_fills_document_and_header() {
        let document = "<w:document><w:body>\
            <w:p><w:r><w:t>{contract</w:t></w:r><w:r><w:t>ID} {projectName}</w:t></w:r></w:p>\
            {#bidders}<w:p><w:r><w:t>{id}. {name}</w:t></w:r></w:p>{/bidders}\
            </w:body></w:document>";
        let data = json!({
            "contractID": "24ID0001",
            "projectName": "Road & Bridge",
            "bidders": [ { "id": 1, "name": "ACME" }, { "id": 2, "name": "Beta" } ]
        });

        let out = render_docx(&package(document), &data).unwrap();

        let body = String::from_utf8(read_part(&out, "word/document.xml")).unwrap();
        // The tag moved into the first run; the text after it stayed put
        assert!(body.contains(">24ID0001<"));
        assert!(body.contains("> Road &amp; Bridge<"));
        assert!(body.contains(">1. ACME<"));
        assert!(body.contains(">2. Beta<"));
        assert!(!body.contains('{'));

        let header = String::from_utf8(read_part(&out, "word/header1.xml")).unwrap();
        assert!(header.contains(">24ID0001<"));

        // Binary parts are copied untouched, even with a stray brace
        assert_eq!(read_part(&out, "word/media/image1.png"), vec![0x89, b'P', b'N', b'G', b'{']);
    }

    #[test]
    fn test_render_docx_reports_part_on_syntax_error() {
        let document = "<w:p><w:r><w:t>{#open}</w:t></w:r></w:p>";
        match render_docx(&package(document), &json!({})).unwrap_err() {
            DocError::TemplateSyntax { message, .. } => {
                assert!(message.contains("word/document.xml"), "{message}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_not_a_package() {
        assert!(matches!(
            render_docx(b"plain text", &json!({})),
            Err(DocError::Package(_))
        ));
    }

    #[test]
    fn test_render_docx_file() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("bond.docx");
        fs::write(&template, package("<w:t>{amount}</w:t>")).unwrap();

        let output = dir.path().join("out").join("24ID0001 Performance Bond.docx");
        render_docx_file(&template, &output, &json!({ "amount": "1,000.00" })).unwrap();

        let body = String::from_utf8(read_part(&fs::read(&output).unwrap(), "word/document.xml")).unwrap();
        assert!(body.contains("1,000.00"));

        let missing = render_docx_file(&dir.path().join("nope.docx"), &output, &json!({}));
        assert!(matches!(missing, Err(DocError::TemplateNotFound(_))));
    }
}
