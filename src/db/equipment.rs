use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::Equipment;

fn equipment_from_row(row: &Row<'_>) -> rusqlite::Result<Equipment> {
    Ok(Equipment {
        id: row.get(0)?,
        name_en: row.get(1)?,
        name_ar: row.get(2)?,
        location: row.get(3)?,
        total_quantity: row.get(4)?,
        available_quantity: row.get(5)?,
    })
}

/// Retrieve every equipment row ordered by primary name. This is the single
/// source of truth for directory order.
pub fn fetch_equipment(conn: &Connection) -> Result<Vec<Equipment>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name_en, name_ar, location, total_quantity, available_quantity
             FROM equipment
             ORDER BY name_en",
        )
        .context("failed to prepare equipment query")?;

    let items = stmt
        .query_map([], equipment_from_row)
        .context("failed to load equipment")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect equipment")?;

    Ok(items)
}

/// Fresh `(available_quantity, total_quantity)` for one row, bypassing any
/// cached copy. `None` when the row no longer exists.
pub fn fetch_stock(conn: &Connection, id: &str) -> Result<Option<(i64, i64)>> {
    conn.query_row(
        "SELECT available_quantity, total_quantity FROM equipment WHERE id = ?1",
        params![id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
    .context("failed to read equipment stock")
}

/// Write a new available quantity only if the stored value still equals
/// `expected`. Returns whether the row was updated.
pub fn swap_available_quantity(
    conn: &Connection,
    id: &str,
    expected: i64,
    new_value: i64,
) -> Result<bool> {
    let updated = conn
        .execute(
            "UPDATE equipment SET available_quantity = ?1
             WHERE id = ?2 AND available_quantity = ?3",
            params![new_value, id, expected],
        )
        .context("failed to update available quantity")?;

    Ok(updated == 1)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rusqlite::{params, Connection};

    use crate::db::ensure_schema;

    /// In-memory database with the real schema.
    pub(crate) fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn
    }

    pub(crate) fn insert_equipment(
        conn: &Connection,
        id: &str,
        name_en: &str,
        name_ar: Option<&str>,
        available: i64,
        total: i64,
    ) {
        conn.execute(
            "INSERT INTO equipment (id, name_en, name_ar, location, total_quantity, available_quantity)
             VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
            params![id, name_en, name_ar, total, available],
        )
        .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{insert_equipment, memory_db};
    use super::*;

    #[test]
    fn fetch_orders_by_primary_name() {
        let conn = memory_db();
        insert_equipment(&conn, "b", "Stove", None, 1, 1);
        insert_equipment(&conn, "a", "Lantern", Some("فانوس"), 2, 4);

        let items = fetch_equipment(&conn).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name_en.as_str()).collect();
        assert_eq!(names, ["Lantern", "Stove"]);
        assert_eq!(items[0].name_ar.as_deref(), Some("فانوس"));
    }

    #[test]
    fn swap_only_applies_when_expected_matches() {
        let conn = memory_db();
        insert_equipment(&conn, "a", "Lantern", None, 2, 4);

        assert!(!swap_available_quantity(&conn, "a", 3, 1).unwrap());
        assert_eq!(fetch_stock(&conn, "a").unwrap(), Some((2, 4)));

        assert!(swap_available_quantity(&conn, "a", 2, 1).unwrap());
        assert_eq!(fetch_stock(&conn, "a").unwrap(), Some((1, 4)));
    }

    #[test]
    fn stock_of_missing_row_is_none() {
        let conn = memory_db();
        assert_eq!(fetch_stock(&conn, "ghost").unwrap(), None);
    }
}
