use std::cmp::Ordering;
use std::fmt;

use anyhow::Result;
use rusqlite::Connection;

use super::lock::SubmitLock;
use crate::db::{clear_transactions, fetch_equipment, fetch_recent_transactions};
use crate::error::WorkflowError;
use crate::models::{Equipment, RecentTransaction};

/// Stock health bucket derived from the available percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    Empty,
    Red,
    Yellow,
    Green,
}

impl StockStatus {
    /// Classify by `p = available / total * 100`. A zero total has nothing to
    /// hand out and counts as empty.
    pub fn classify(available: i64, total: i64) -> Self {
        let percent = stock_percent(available, total);
        if percent <= 0.0 {
            StockStatus::Empty
        } else if percent < 50.0 {
            StockStatus::Red
        } else if percent < 100.0 {
            StockStatus::Yellow
        } else {
            StockStatus::Green
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StockStatus::Empty => "EMPTY",
            StockStatus::Red => "RED",
            StockStatus::Yellow => "YELLOW",
            StockStatus::Green => "GREEN",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Available stock as a percentage of the total; `0.0` when total is zero.
pub fn stock_percent(available: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    available as f64 / total as f64 * 100.0
}

/// Depleted items (some units out) first, then alphabetical by primary name.
pub fn compare_inventory(a: &Equipment, b: &Equipment) -> Ordering {
    b.is_depleted()
        .cmp(&a.is_depleted())
        .then_with(|| a.name_en.to_lowercase().cmp(&b.name_en.to_lowercase()))
        .then_with(|| a.name_en.cmp(&b.name_en))
}

/// Snapshot behind the admin view. Built only when both queries succeed.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// Equipment in display order.
    pub inventory: Vec<Equipment>,
    /// Newest first.
    pub recent: Vec<RecentTransaction>,
}

impl Dashboard {
    /// Fetch the full equipment set and the `limit` most recent transactions.
    /// Any failure aborts the whole load.
    pub fn load(conn: &Connection, limit: usize) -> Result<Self> {
        let mut inventory = fetch_equipment(conn)?;
        let recent = fetch_recent_transactions(conn, limit)?;
        inventory.sort_by(compare_inventory);
        Ok(Self { inventory, recent })
    }

    /// Items with the status recomputed for this render.
    pub fn rows(&self) -> impl Iterator<Item = (&Equipment, StockStatus)> + '_ {
        self.inventory.iter().map(|item| {
            (
                item,
                StockStatus::classify(item.available_quantity, item.total_quantity),
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared(usize),
    Declined,
}

/// Delete the whole transaction log once the admin has confirmed. Shares the
/// submit lock so two clears never overlap.
pub fn clear_log(
    conn: &Connection,
    lock: &SubmitLock,
    confirmed: bool,
) -> Result<ClearOutcome, WorkflowError> {
    let Some(_guard) = lock.try_acquire() else {
        tracing::warn!("log clear ignored, another operation in flight");
        return Err(WorkflowError::Busy);
    };

    if !confirmed {
        return Ok(ClearOutcome::Declined);
    }

    let removed = clear_transactions(conn).map_err(|err| {
        tracing::error!(error = ?err, "failed to clear transaction log");
        WorkflowError::Storage(err)
    })?;
    tracing::info!(removed, "transaction log cleared");
    Ok(ClearOutcome::Cleared(removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{insert_equipment, memory_db};
    use crate::db::insert_transaction;
    use crate::models::ActionType;

    fn item(name: &str, available: i64, total: i64) -> Equipment {
        Equipment {
            id: name.to_lowercase(),
            name_en: name.into(),
            name_ar: None,
            location: None,
            total_quantity: total,
            available_quantity: available,
        }
    }

    #[test]
    fn classifies_by_percentage() {
        assert_eq!(StockStatus::classify(0, 10), StockStatus::Empty);
        assert_eq!(StockStatus::classify(4, 10), StockStatus::Red);
        assert_eq!(StockStatus::classify(5, 10), StockStatus::Yellow);
        assert_eq!(StockStatus::classify(6, 10), StockStatus::Yellow);
        assert_eq!(StockStatus::classify(10, 10), StockStatus::Green);
        assert_eq!(StockStatus::classify(0, 0), StockStatus::Empty);
    }

    #[test]
    fn depleted_items_sort_first_then_by_name() {
        let mut items = vec![
            item("Axe", 3, 3),
            item("Tent", 1, 4),
            item("lantern", 0, 2),
            item("Bucket", 5, 5),
        ];
        items.sort_by(compare_inventory);
        let names: Vec<_> = items.iter().map(|i| i.name_en.as_str()).collect();
        assert_eq!(names, ["lantern", "Tent", "Axe", "Bucket"]);
    }

    #[test]
    fn load_sorts_and_limits_feed() {
        let conn = memory_db();
        insert_equipment(&conn, "a", "Axe", None, 3, 3);
        insert_equipment(&conn, "t", "Tent", None, 2, 4);
        for _ in 0..25 {
            insert_transaction(&conn, "t", "Ali", 1, ActionType::Take).unwrap();
        }

        let dashboard = Dashboard::load(&conn, 20).unwrap();
        assert_eq!(dashboard.inventory[0].name_en, "Tent");
        assert_eq!(dashboard.recent.len(), 20);
        let statuses: Vec<_> = dashboard.rows().map(|(_, s)| s).collect();
        assert_eq!(statuses, [StockStatus::Yellow, StockStatus::Green]);
    }

    #[test]
    fn clear_requires_confirmation() {
        let conn = memory_db();
        insert_equipment(&conn, "t", "Tent", None, 2, 4);
        insert_transaction(&conn, "t", "Ali", 2, ActionType::Take).unwrap();
        let lock = SubmitLock::new();

        assert_eq!(clear_log(&conn, &lock, false).unwrap(), ClearOutcome::Declined);
        assert_eq!(Dashboard::load(&conn, 20).unwrap().recent.len(), 1);

        assert_eq!(clear_log(&conn, &lock, true).unwrap(), ClearOutcome::Cleared(1));
        assert!(Dashboard::load(&conn, 20).unwrap().recent.is_empty());
        assert!(!lock.is_held());
    }

    #[test]
    fn overlapping_clear_is_rejected() {
        let conn = memory_db();
        let lock = SubmitLock::new();
        let _held = lock.try_acquire().unwrap();
        assert!(matches!(clear_log(&conn, &lock, true), Err(WorkflowError::Busy)));
    }
}
