//! # procura-db: Database Layer for Procura
//!
//! Local SQLite storage for both contract registers, the contractor
//! directory and user settings, accessed through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Procura Data Flow                                │
//! │                                                                         │
//! │  CLI command (contract bulk-update)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     procura-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │   │    │
//! │  │   │               │    │ ContractRepo   │    │              │   │    │
//! │  │   │ SqlitePool    │◄───│ ContractorRepo │    │ 001_init.sql │   │    │
//! │  │   │               │    │ SettingsRepo   │    │              │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  procura.db  (contracts, goods, contractors, settings)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use procura_db::{Database, DbConfig};
//! use procura_core::Register;
//!
//! let db = Database::new(DbConfig::new("procura.db")).await?;
//! let awarded = db.contracts(Register::Contracts).dashboard("2024", 10).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::contract::ContractRepository;
pub use repository::contractor::ContractorRepository;
pub use repository::settings::SettingsRepository;
