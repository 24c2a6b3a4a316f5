//! Stock rules: the cached directory, guided search, the take/return
//! workflow, the admin dashboard, and the lock they share.

mod dashboard;
mod directory;
mod lock;
mod search;
mod workflow;

pub use dashboard::{clear_log, compare_inventory, stock_percent, ClearOutcome, Dashboard, StockStatus};
pub use directory::EquipmentDirectory;
pub use lock::{SubmitGuard, SubmitLock};
pub use search::{search, SearchOutcome};
pub use workflow::{submit, validate, Receipt, TransactionRequest};
