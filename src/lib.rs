// Pocket Ledger - Core Library
// Personal income/expense tracker: SQLite storage, a running balance and a terminal window

pub mod app;
pub mod config;
pub mod db;
pub mod form;
pub mod ledger;
pub mod logging;
pub mod money;

// Only compile the terminal window when the TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use app::{App, Focus, Modal};
pub use config::Config;
pub use db::{ensure_schema, SqliteLedger, Transaction, TransactionId, TransactionKind};
pub use form::{EntryError, EntryForm, NewTransaction};
pub use ledger::{Ledger, MemoryLedger};
pub use money::{format_currency, parse_amount, Locale};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
