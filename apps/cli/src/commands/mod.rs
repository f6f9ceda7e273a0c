//! # Command Handlers
//!
//! One function per CLI action. [`crate::run`] parses flags, obtains the
//! state each handler needs and prints what it returns.
//!
//! ## Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports)
//! ├── auth.rs        ◄─── login, logout, whoami, hash-password
//! ├── contract.rs    ◄─── Batch create, edit, status, dashboard, checklist
//! ├── contractor.rs  ◄─── Contractor directory
//! ├── document.rs    ◄─── Strike, bid receipt, PIO memo, bond, obligation
//! ├── settings.rs    ◄─── Stored preferences, effective config
//! ├── transfer.rs    ◄─── CSV import / export
//! └── utility.rs     ◄─── Amount in words, number formatting
//! ```
//!
//! ## Handler Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  async fn update_contract(                                              │
//! │      db: &DbState,          ◄── pool + active register                  │
//! │      session: &Session,     ◄── only on mutations and documents         │
//! │      contract_id: &str,                                                 │
//! │      edit: ContractEdit,                                                │
//! │  ) -> Result<Contract, ApiError>                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  text table on stdout, or JSON with --json                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Read-only handlers take no session: anyone with the database file can
//! browse it.

pub mod auth;
pub mod contract;
pub mod contractor;
pub mod document;
pub mod settings;
pub mod transfer;
pub mod utility;
