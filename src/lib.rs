//! Core library surface for the equipment tracker TUI.
//!
//! Staff take or return equipment through a guided form; an admin tab behind
//! a shared passphrase shows live stock and the recent transaction log.
pub mod config;
pub mod db;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod models;
pub mod router;
pub mod ui;

/// Persistence entry points used by `main.rs` and tooling.
pub use db::{ensure_schema, open_database};

pub use config::AppConfig;
pub use error::WorkflowError;
pub use models::{ActionType, Equipment, RecentTransaction, Transaction};
pub use router::{AdminGate, Session, Tab};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
