//! # State Module
//!
//! Everything a command may need, built once per invocation in `lib.rs`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────────┐      │
//! │  │   DbState    │  │    AppConfig     │  │    SessionStore      │      │
//! │  │              │  │                  │  │                      │      │
//! │  │  Database    │  │  [database]      │  │  session.json        │      │
//! │  │  (SQLite     │  │  [documents]     │  │  login / logout      │      │
//! │  │   pool)      │  │  [auth]          │  │  require() → Session │      │
//! │  │  Register    │  │  [office]        │  │                      │      │
//! │  └──────────────┘  └──────────────────┘  └──────────────────────┘      │
//! │                                                                         │
//! │  Commands declare exactly the state they need:                         │
//! │  • lookups take &DbState                                               │
//! │  • mutations take &DbState and &Session                                │
//! │  • documents take &AppConfig and &Session (and &DbState for lookups)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod session;

pub use config::{
    default_config_path, AppConfig, AuthSection, ConfigError, DatabaseSection, DocumentsSection,
    CONFIG_FILE_NAME,
};
pub use db::{DbState, REGISTER_SETTING};
pub use session::{hash_password, verify_password, Session, SessionStore};
