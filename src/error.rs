//! Typed failures of the take/return workflow. The `Display` text of each
//! variant is exactly what the footer toast shows.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Another submission or log clear is still running.
    #[error("Another operation is still in progress.")]
    Busy,

    #[error("Please select an item from the list first!")]
    NoSelection,

    #[error("Your name is required.")]
    MissingName,

    #[error("Quantity must be at least 1.")]
    InvalidQuantity,

    #[error("Error: Not enough items available!")]
    NotEnoughAvailable { available: i64 },

    #[error("Error: Cannot return more than what was taken!")]
    ReturnExceedsTaken { outstanding: i64 },

    /// The row changed underneath us or disappeared; nothing was written.
    #[error("Stock changed while saving. Please try again.")]
    StaleStock,

    #[error("Transaction failed. Database busy.")]
    Storage(#[source] anyhow::Error),
}
