use rusqlite::Connection;

use super::lock::SubmitLock;
use crate::db::{record_movement, MovementOutcome};
use crate::error::WorkflowError;
use crate::models::{ActionType, Equipment, Transaction};

/// Raw input from the take/return form. `item` is only ever a row picked
/// from search results, never free-typed text.
#[derive(Debug, Clone, Copy)]
pub struct TransactionRequest<'a> {
    pub action: ActionType,
    pub user_name: &'a str,
    pub item: Option<&'a Equipment>,
    pub quantity: i64,
}

/// What a successful run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction: Transaction,
    /// Stored available quantity after the update.
    pub available: i64,
}

/// Check a request against the cached row without touching the store.
/// Returns the selected item and the trimmed user name on success.
pub fn validate<'a>(
    request: &TransactionRequest<'a>,
) -> Result<(&'a Equipment, &'a str), WorkflowError> {
    let item = request.item.ok_or(WorkflowError::NoSelection)?;

    let user_name = request.user_name.trim();
    if user_name.is_empty() {
        return Err(WorkflowError::MissingName);
    }
    if request.quantity < 1 {
        return Err(WorkflowError::InvalidQuantity);
    }

    check_bounds(
        request.action,
        request.quantity,
        item.available_quantity,
        item.total_quantity,
    )?;
    Ok((item, user_name))
}

fn check_bounds(
    action: ActionType,
    quantity: i64,
    available: i64,
    total: i64,
) -> Result<(), WorkflowError> {
    match action {
        ActionType::Take if quantity > available => {
            Err(WorkflowError::NotEnoughAvailable { available })
        }
        ActionType::Return if quantity > total - available => {
            Err(WorkflowError::ReturnExceedsTaken {
                outstanding: total - available,
            })
        }
        _ => Ok(()),
    }
}

/// Run one take/return end to end: claim the submit lock, validate against
/// the cached row, then apply the movement against fresh stock in a single
/// store transaction. A call made while the lock is held returns
/// [`WorkflowError::Busy`] and writes nothing.
pub fn submit(
    conn: &mut Connection,
    lock: &SubmitLock,
    request: &TransactionRequest<'_>,
) -> Result<Receipt, WorkflowError> {
    let Some(_guard) = lock.try_acquire() else {
        tracing::warn!(action = %request.action, "submission ignored, another operation in flight");
        return Err(WorkflowError::Busy);
    };

    let (item, user_name) = validate(request).inspect_err(|err| {
        tracing::warn!(action = %request.action, error = %err, "submission rejected");
    })?;

    let outcome = record_movement(conn, &item.id, user_name, request.quantity, request.action)
        .map_err(|err| {
            tracing::error!(equipment = %item.id, error = ?err, "stock movement failed");
            WorkflowError::Storage(err)
        })?;

    match outcome {
        MovementOutcome::Recorded {
            transaction,
            available,
        } => {
            tracing::info!(
                equipment = %item.id,
                action = %request.action,
                quantity = request.quantity,
                available,
                "stock movement recorded"
            );
            Ok(Receipt {
                transaction,
                available,
            })
        }
        MovementOutcome::OutOfBounds { available, total } => {
            tracing::warn!(equipment = %item.id, available, total, "cached stock was stale");
            check_bounds(request.action, request.quantity, available, total)?;
            Err(WorkflowError::StaleStock)
        }
        MovementOutcome::Conflict | MovementOutcome::Missing => {
            tracing::warn!(equipment = %item.id, "equipment row changed during movement");
            Err(WorkflowError::StaleStock)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{insert_equipment, memory_db};
    use crate::db::{fetch_recent_transactions, fetch_stock};

    fn cached(available: i64, total: i64) -> Equipment {
        Equipment {
            id: "tent".into(),
            name_en: "Tent".into(),
            name_ar: None,
            location: None,
            total_quantity: total,
            available_quantity: available,
        }
    }

    fn request<'a>(action: ActionType, item: &'a Equipment, quantity: i64) -> TransactionRequest<'a> {
        TransactionRequest {
            action,
            user_name: "Mona",
            item: Some(item),
            quantity,
        }
    }

    #[test]
    fn take_beyond_available_is_rejected() {
        let item = cached(5, 10);
        let err = validate(&request(ActionType::Take, &item, 6)).unwrap_err();
        assert!(matches!(err, WorkflowError::NotEnoughAvailable { available: 5 }));
        assert!(validate(&request(ActionType::Take, &item, 5)).is_ok());
    }

    #[test]
    fn return_beyond_outstanding_is_rejected() {
        let item = cached(5, 10);
        let err = validate(&request(ActionType::Return, &item, 6)).unwrap_err();
        assert!(matches!(err, WorkflowError::ReturnExceedsTaken { outstanding: 5 }));
        assert!(validate(&request(ActionType::Return, &item, 5)).is_ok());
    }

    #[test]
    fn selection_name_and_quantity_are_required() {
        let item = cached(5, 10);
        let mut req = request(ActionType::Take, &item, 1);
        req.item = None;
        assert!(matches!(validate(&req), Err(WorkflowError::NoSelection)));

        let mut req = request(ActionType::Take, &item, 1);
        req.user_name = "   ";
        assert!(matches!(validate(&req), Err(WorkflowError::MissingName)));

        let req = request(ActionType::Take, &item, 0);
        assert!(matches!(validate(&req), Err(WorkflowError::InvalidQuantity)));
    }

    #[test]
    fn take_then_return_keeps_stock_in_bounds() {
        let mut conn = memory_db();
        insert_equipment(&conn, "tent", "Tent", None, 5, 10);
        let lock = SubmitLock::new();

        let receipt = submit(&mut conn, &lock, &request(ActionType::Take, &cached(5, 10), 5)).unwrap();
        assert_eq!(receipt.available, 0);
        assert_eq!(receipt.transaction.user_name, "Mona");

        let receipt =
            submit(&mut conn, &lock, &request(ActionType::Return, &cached(0, 10), 10)).unwrap();
        assert_eq!(receipt.available, 10);
        assert_eq!(fetch_stock(&conn, "tent").unwrap(), Some((10, 10)));
        assert!(!lock.is_held());
    }

    #[test]
    fn stale_cache_is_rechecked_against_fresh_stock() {
        let mut conn = memory_db();
        insert_equipment(&conn, "tent", "Tent", None, 2, 10);
        let lock = SubmitLock::new();

        // The cached row still thinks five are available.
        let err = submit(&mut conn, &lock, &request(ActionType::Take, &cached(5, 10), 4)).unwrap_err();
        assert!(matches!(err, WorkflowError::NotEnoughAvailable { available: 2 }));
        assert_eq!(fetch_stock(&conn, "tent").unwrap(), Some((2, 10)));
        assert!(fetch_recent_transactions(&conn, 20).unwrap().is_empty());
        assert!(!lock.is_held());
    }

    #[test]
    fn submission_while_in_flight_is_a_no_op() {
        let mut conn = memory_db();
        insert_equipment(&conn, "tent", "Tent", None, 5, 10);
        let lock = SubmitLock::new();
        let item = cached(5, 10);

        let held = lock.try_acquire().unwrap();
        let err = submit(&mut conn, &lock, &request(ActionType::Take, &item, 1)).unwrap_err();
        assert!(matches!(err, WorkflowError::Busy));
        assert!(fetch_recent_transactions(&conn, 20).unwrap().is_empty());

        drop(held);
        submit(&mut conn, &lock, &request(ActionType::Take, &item, 1)).unwrap();
        assert_eq!(fetch_recent_transactions(&conn, 20).unwrap().len(), 1);
    }

    #[test]
    fn storage_failure_releases_lock() {
        let mut conn = memory_db();
        let lock = SubmitLock::new();
        conn.execute("DROP TABLE transactions", []).unwrap();
        conn.execute("DROP TABLE equipment", []).unwrap();

        let err = submit(&mut conn, &lock, &request(ActionType::Take, &cached(5, 10), 1)).unwrap_err();
        assert!(matches!(err, WorkflowError::Storage(_)));
        assert_eq!(err.to_string(), "Transaction failed. Database busy.");
        assert!(!lock.is_held());
    }
}
