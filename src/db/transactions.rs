use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, TransactionBehavior};
use uuid::Uuid;

use super::equipment::{fetch_stock, swap_available_quantity};
use crate::models::{ActionType, RecentTransaction, Transaction};

impl ToSql for ActionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ActionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        ActionType::parse(raw)
            .ok_or_else(|| FromSqlError::Other(format!("unknown action type {raw:?}").into()))
    }
}

/// Result of trying to apply a take or return to the stored stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementOutcome {
    /// The log row was written and the stock updated to `available`.
    Recorded {
        transaction: Transaction,
        available: i64,
    },
    /// The fresh stock does not allow the movement. Nothing was written.
    OutOfBounds { available: i64, total: i64 },
    /// The guarded update matched no row. The immediate lock already keeps
    /// other connections out between the read and the update, so this only
    /// fires if that lock is bypassed.
    Conflict,
    /// The equipment row no longer exists.
    Missing,
}

/// Insert one transaction row. The store assigns `created_at`; the hydrated
/// record is returned so callers do not have to re-query.
pub fn insert_transaction(
    conn: &Connection,
    equipment_id: &str,
    user_name: &str,
    quantity: i64,
    action_type: ActionType,
) -> Result<Transaction> {
    let id = Uuid::new_v4().to_string();
    let created_at: DateTime<Utc> = conn
        .query_row(
            "INSERT INTO transactions (id, equipment_id, user_name, quantity, action_type)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING created_at",
            params![id, equipment_id, user_name, quantity, action_type],
            |row| row.get(0),
        )
        .context("failed to insert transaction")?;

    Ok(Transaction {
        id,
        equipment_id: equipment_id.to_string(),
        user_name: user_name.to_string(),
        quantity,
        action_type,
        created_at,
    })
}

/// Re-read the stock, re-check the bounds, update the available quantity and
/// log the movement, all inside one immediate transaction. Any early return
/// drops the transaction and rolls back.
///
/// `BEGIN IMMEDIATE` takes the write lock up front, so the read and the update
/// see the same row. The compare-and-swap update is a backstop under that
/// lock, not the primary guard.
pub fn record_movement(
    conn: &mut Connection,
    equipment_id: &str,
    user_name: &str,
    quantity: i64,
    action_type: ActionType,
) -> Result<MovementOutcome> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("failed to begin stock movement")?;

    let Some((available, total)) = fetch_stock(&tx, equipment_id)? else {
        return Ok(MovementOutcome::Missing);
    };

    let next = available + action_type.delta(quantity);
    if next < 0 || next > total {
        return Ok(MovementOutcome::OutOfBounds { available, total });
    }

    if !swap_available_quantity(&tx, equipment_id, available, next)? {
        return Ok(MovementOutcome::Conflict);
    }

    let transaction = insert_transaction(&tx, equipment_id, user_name, quantity, action_type)?;
    tx.commit().context("failed to commit stock movement")?;

    Ok(MovementOutcome::Recorded {
        transaction,
        available: next,
    })
}

/// Most recent transactions first, joined with their equipment names.
pub fn fetch_recent_transactions(conn: &Connection, limit: usize) -> Result<Vec<RecentTransaction>> {
    let mut stmt = conn
        .prepare(
            "SELECT t.id, t.equipment_id, t.user_name, t.quantity, t.action_type, t.created_at,
                    e.name_en, e.name_ar
             FROM transactions t
             LEFT JOIN equipment e ON e.id = t.equipment_id
             ORDER BY t.created_at DESC, t.rowid DESC
             LIMIT ?1",
        )
        .context("failed to prepare recent transactions query")?;

    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt
        .query_map(params![limit], |row| {
            Ok(RecentTransaction {
                transaction: Transaction {
                    id: row.get(0)?,
                    equipment_id: row.get(1)?,
                    user_name: row.get(2)?,
                    quantity: row.get(3)?,
                    action_type: row.get(4)?,
                    created_at: row.get(5)?,
                },
                equipment_name_en: row.get(6)?,
                equipment_name_ar: row.get(7)?,
            })
        })
        .context("failed to load recent transactions")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect recent transactions")?;

    Ok(rows)
}

/// Delete every transaction row. Irreversible. Returns how many rows went.
pub fn clear_transactions(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM transactions", [])
        .context("failed to clear transactions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::equipment::fixtures::{insert_equipment, memory_db};

    #[test]
    fn take_updates_stock_and_logs() {
        let mut conn = memory_db();
        insert_equipment(&conn, "tent", "Tent", None, 5, 10);

        let outcome = record_movement(&mut conn, "tent", "Mona", 5, ActionType::Take).unwrap();
        let MovementOutcome::Recorded {
            transaction,
            available,
        } = outcome
        else {
            panic!("expected a recorded movement, got {outcome:?}");
        };
        assert_eq!(available, 0);
        assert_eq!(transaction.action_type, ActionType::Take);
        assert_eq!(fetch_stock(&conn, "tent").unwrap(), Some((0, 10)));
        assert_eq!(fetch_recent_transactions(&conn, 20).unwrap().len(), 1);
    }

    #[test]
    fn out_of_bounds_writes_nothing() {
        let mut conn = memory_db();
        insert_equipment(&conn, "tent", "Tent", None, 5, 10);

        let outcome = record_movement(&mut conn, "tent", "Mona", 6, ActionType::Return).unwrap();
        assert_eq!(
            outcome,
            MovementOutcome::OutOfBounds {
                available: 5,
                total: 10
            }
        );
        assert_eq!(fetch_stock(&conn, "tent").unwrap(), Some((5, 10)));
        assert!(fetch_recent_transactions(&conn, 20).unwrap().is_empty());
    }

    #[test]
    fn missing_equipment_is_reported() {
        let mut conn = memory_db();
        let outcome = record_movement(&mut conn, "ghost", "Mona", 1, ActionType::Take).unwrap();
        assert_eq!(outcome, MovementOutcome::Missing);
    }

    #[test]
    fn recent_feed_is_newest_first_and_limited() {
        let conn = memory_db();
        insert_equipment(&conn, "tent", "Tent", Some("خيمة"), 10, 10);
        for qty in 1..=3 {
            insert_transaction(&conn, "tent", "Ali", qty, ActionType::Take).unwrap();
        }

        let feed = fetch_recent_transactions(&conn, 2).unwrap();
        let quantities: Vec<_> = feed.iter().map(|r| r.transaction.quantity).collect();
        assert_eq!(quantities, [3, 2]);
        assert_eq!(feed[0].equipment_label(), "Tent");
        assert_eq!(feed[0].equipment_name_ar.as_deref(), Some("خيمة"));
    }

    #[test]
    fn clear_removes_every_row() {
        let conn = memory_db();
        insert_equipment(&conn, "tent", "Tent", None, 10, 10);
        insert_transaction(&conn, "tent", "Ali", 1, ActionType::Take).unwrap();
        insert_transaction(&conn, "tent", "Ali", 1, ActionType::Return).unwrap();

        assert_eq!(clear_transactions(&conn).unwrap(), 2);
        assert!(fetch_recent_transactions(&conn, 20).unwrap().is_empty());
    }
}
