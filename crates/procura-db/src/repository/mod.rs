//! # Repository Module
//!
//! Database repository implementations for Procura.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command                                                            │
//! │       │                                                                 │
//! │       │  db.contracts(Register::Goods).search("laptop", None, 20)       │
//! │       ▼                                                                 │
//! │  ContractRepository { pool, register }                                  │
//! │  ├── insert_batch(&self, batch)                                         │
//! │  ├── search(&self, query, year, limit)                                  │
//! │  ├── update_milestones(&self, ids, update)                              │
//! │  └── upsert_imported(&self, row)                                        │
//! │       │                                                                 │
//! │       │  SQL Query (table chosen by register)                           │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`contract::ContractRepository`] - Contracts of one register
//! - [`contractor::ContractorRepository`] - Contractor directory
//! - [`settings::SettingsRepository`] - Key/value preferences

pub mod contract;
pub mod contractor;
pub mod settings;
