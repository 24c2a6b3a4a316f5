use anyhow::Result;
use rusqlite::Connection;

use crate::db::fetch_equipment;
use crate::models::Equipment;

/// In-memory copy of every equipment row. There is no staleness window: the
/// router refetches on every tab switch.
#[derive(Debug, Default)]
pub struct EquipmentDirectory {
    items: Vec<Equipment>,
}

impl EquipmentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached set with a fresh fetch ordered by primary name. On
    /// failure the previous set is kept as-is and the error is returned.
    pub fn refresh(&mut self, conn: &Connection) -> Result<&[Equipment]> {
        let items = fetch_equipment(conn)?;
        tracing::debug!(count = items.len(), "equipment directory refreshed");
        self.items = items;
        Ok(&self.items)
    }

    pub fn items(&self) -> &[Equipment] {
        &self.items
    }

    pub fn find(&self, id: &str) -> Option<&Equipment> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{insert_equipment, memory_db};

    #[test]
    fn refresh_replaces_cached_rows() {
        let conn = memory_db();
        insert_equipment(&conn, "a", "Tent", None, 1, 2);

        let mut directory = EquipmentDirectory::new();
        assert!(directory.is_empty());
        assert_eq!(directory.refresh(&conn).unwrap().len(), 1);

        insert_equipment(&conn, "b", "Axe", None, 1, 1);
        directory.refresh(&conn).unwrap();
        assert_eq!(directory.items()[0].name_en, "Axe");
        assert_eq!(directory.find("a").map(|i| i.name_en.as_str()), Some("Tent"));
    }

    #[test]
    fn failed_refresh_keeps_previous_rows() {
        let conn = memory_db();
        insert_equipment(&conn, "a", "Tent", None, 1, 2);

        let mut directory = EquipmentDirectory::new();
        directory.refresh(&conn).unwrap();

        conn.execute("DROP TABLE transactions", []).unwrap();
        conn.execute("DROP TABLE equipment", []).unwrap();
        assert!(directory.refresh(&conn).is_err());
        assert_eq!(directory.items().len(), 1);
    }
}
