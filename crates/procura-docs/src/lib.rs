//! # procura-docs: Document Generation for Procura
//!
//! Fills the office's Word templates with contract data.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CLI: procura doc strike --contract 24G0001 --bidder ...                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  documents::strike_documents(&request, &office)                         │
//! │       │   validate, format amounts and dates, pick end-user             │
//! │       ▼                                                                 │
//! │  Vec<RenderJob { kind, file_name, data: serde_json::Value }>            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  docx::render_docx_file(template, output, &data)                        │
//! │       │   unzip → merge split tags → template::Template → zip           │
//! │       ▼                                                                 │
//! │  <output_dir>/24G0001 STRIKE.docx, ...                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`template`] - The `{tag}` engine (values, paths, sections)
//! - [`docx`] - Reading and writing .docx packages
//! - [`documents`] - Request types and per-document data shaping
//! - [`error`] - [`DocError`]

pub mod documents;
pub mod docx;
pub mod error;
pub mod template;

pub use documents::{
    bid_receipt_document, bond_document, obligation_document, pio_memo_documents, render_all,
    strike_documents, BidReceiptRequest, BondRequest, DocumentKind, EndUser, ObligationRequest,
    OfficeConfig, PioContract, PioMemoRequest, RenderJob, StrikeRequest,
};
pub use docx::{render_docx, render_docx_file};
pub use error::{DocError, DocResult};
pub use template::{Escape, Template};
