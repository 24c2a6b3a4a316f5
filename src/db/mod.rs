//! Persistence module split across logical submodules. These helpers are the
//! only place SQL is written; everything above talks to the store through
//! them.

mod connection;
mod equipment;
mod transactions;

pub use connection::{ensure_schema, open_database};
pub use equipment::{fetch_equipment, fetch_stock, swap_available_quantity};
pub use transactions::{
    clear_transactions, fetch_recent_transactions, insert_transaction, record_movement,
    MovementOutcome,
};

#[cfg(test)]
pub(crate) use equipment::fixtures;
