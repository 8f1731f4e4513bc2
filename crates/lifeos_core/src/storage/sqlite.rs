//! SQLite-backed key-value slots.

use super::{KeyValueStorage, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value slots stored in the `kv_slots` table.
///
/// The connection must come from `db::open_db*` so the table exists.
pub struct SqliteKvStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStorage<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStorage for SqliteKvStorage<'_> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT slot_value FROM kv_slots WHERE slot_key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_slots (slot_key, slot_value)
             VALUES (?1, ?2)
             ON CONFLICT(slot_key) DO UPDATE SET
                slot_value = excluded.slot_value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_slots WHERE slot_key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKvStorage;
    use crate::db::open_db_in_memory;
    use crate::storage::KeyValueStorage;

    #[test]
    fn set_overwrites_and_remove_clears() {
        let conn = open_db_in_memory().expect("in-memory db should open");
        let storage = SqliteKvStorage::new(&conn);

        assert_eq!(storage.get("slot").expect("slot read should succeed"), None);
        storage.set("slot", "one").expect("slot write should succeed");
        storage.set("slot", "two").expect("slot write should succeed");
        assert_eq!(storage.get("slot").expect("slot read should succeed").as_deref(), Some("two"));

        storage.remove("slot").expect("slot write should succeed");
        assert_eq!(storage.get("slot").expect("slot read should succeed"), None);
    }
}
