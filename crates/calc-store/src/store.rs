use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use calc_core::{HistoryError, HistoryRecord, HistoryResult, HistoryStore};

use crate::schema::init_db;

pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    pub fn new(path: &Path) -> HistoryResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| HistoryError::Database(format!("cannot create db directory: {e}")))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| HistoryError::Database(format!("cannot open database: {e}")))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| HistoryError::Database(e.to_string()))?;
        init_db(&conn)?;
        debug!("history database opened at {}", path.display());
        Ok(Self { conn })
    }

    pub fn in_memory() -> HistoryResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| HistoryError::Database(format!("cannot open in-memory db: {e}")))?;
        init_db(&conn)?;
        Ok(Self { conn })
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        id: row.get(0)?,
        expression: row.get(1)?,
        result: row.get(2)?,
    })
}

const SELECT_COLS: &str = "id, expression, result";

// ---------------------------------------------------------------------------
// HistoryStore impl
// ---------------------------------------------------------------------------

impl HistoryStore for SqliteHistoryStore {
    fn insert(&self, expression: &str, result: &str) -> HistoryResult<i64> {
        self.conn
            .execute(
                "INSERT INTO history (expression, result) VALUES (?1, ?2)",
                params![expression, result],
            )
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let id = self.conn.last_insert_rowid();
        debug!("history record {id} stored: {expression} = {result}");
        Ok(id)
    }

    fn get(&self, id: i64) -> HistoryResult<Option<HistoryRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SELECT_COLS} FROM history WHERE id = ?1"))
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        stmt.query_row(params![id], row_to_record)
            .optional()
            .map_err(|e| HistoryError::Database(e.to_string()))
    }

    fn delete(&self, id: i64) -> HistoryResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM history WHERE id = ?1", params![id])
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        if changed == 0 {
            return Err(HistoryError::NotFound(id));
        }
        Ok(())
    }

    fn clear_all(&self) -> HistoryResult<usize> {
        self.conn
            .execute("DELETE FROM history", [])
            .map_err(|e| HistoryError::Database(e.to_string()))
    }

    fn latest(&self) -> HistoryResult<Option<HistoryRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SELECT_COLS} FROM history ORDER BY id DESC LIMIT 1"
            ))
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        stmt.query_row([], row_to_record)
            .optional()
            .map_err(|e| HistoryError::Database(e.to_string()))
    }

    fn list(&self, limit: Option<usize>) -> HistoryResult<Vec<HistoryRecord>> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map_or(-1, |n| n as i64);
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SELECT_COLS} FROM history ORDER BY id DESC LIMIT ?1"
            ))
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], row_to_record)
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| HistoryError::Database(e.to_string()))?);
        }
        Ok(results)
    }

    fn count(&self) -> HistoryResult<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM history", [], |row| {
                row.get::<_, usize>(0)
            })
            .map_err(|e| HistoryError::Database(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use calc_core::HistoryIntent;

    fn test_store() -> SqliteHistoryStore {
        SqliteHistoryStore::in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let store = test_store();
        let id = store.insert("7 + 3", "10").unwrap();

        let record = store.get(id).unwrap().unwrap();
        assert_eq!(record.expression, "7 + 3");
        assert_eq!(record.result, "10");
        assert_eq!(record.id, id);
    }

    #[test]
    fn test_get_not_found() {
        let store = test_store();
        assert!(store.get(42).unwrap().is_none());
    }

    #[test]
    fn test_ids_increase() {
        let store = test_store();
        let a = store.insert("1 + 1", "2").unwrap();
        let b = store.insert("2 + 2", "4").unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = test_store();
        let a = store.insert("1 + 1", "2").unwrap();
        store.delete(a).unwrap();
        let b = store.insert("1 + 1", "2").unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_list_newest_first() {
        let store = test_store();
        store.insert("1 + 1", "2").unwrap();
        store.insert("2 + 2", "4").unwrap();
        store.insert("3 + 3", "6").unwrap();

        let all = store.list(None).unwrap();
        let results: Vec<&str> = all.iter().map(|r| r.result.as_str()).collect();
        assert_eq!(results, vec!["6", "4", "2"]);

        let limited = store.list(Some(2)).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].result, "6");
    }

    #[test]
    fn test_latest() {
        let store = test_store();
        assert!(store.latest().unwrap().is_none());
        store.insert("1 + 1", "2").unwrap();
        store.insert("9 × 9", "81").unwrap();
        assert_eq!(store.latest().unwrap().unwrap().result, "81");
    }

    #[test]
    fn test_delete() {
        let store = test_store();
        let id = store.insert("5 - 1", "4").unwrap();
        store.delete(id).unwrap();
        assert!(store.get(id).unwrap().is_none());
    }

    #[test]
    fn test_delete_not_found() {
        let store = test_store();
        let result = store.delete(99);
        assert!(matches!(result, Err(HistoryError::NotFound(99))));
    }

    #[test]
    fn test_clear_all() {
        let store = test_store();
        store.insert("1 + 1", "2").unwrap();
        store.insert("2 + 2", "4").unwrap();
        assert_eq!(store.clear_all().unwrap(), 2);
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.clear_all().unwrap(), 0);
    }

    // === Recording rules ===

    #[test]
    fn test_record_deduplicates_consecutive() {
        let store = test_store();
        assert!(store.record("2 + 2", "4").unwrap().is_some());
        assert!(store.record("2 + 2", "4").unwrap().is_none());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_record_dedup_trims_and_ignores_case() {
        let store = test_store();
        store.record("2 + 2", "4").unwrap();
        assert!(store.record(" 2 + 2  ", "4 ").unwrap().is_none());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_record_allows_non_consecutive_repeat() {
        let store = test_store();
        store.record("2 + 2", "4").unwrap();
        store.record("3 + 3", "6").unwrap();
        store.record("2 + 2", "4").unwrap();
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_record_skips_error_sentinel() {
        let store = test_store();
        assert!(store.record("6 ÷ 0", "Error").unwrap().is_none());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_apply_intent() {
        let store = test_store();
        store
            .apply_intent(HistoryIntent::Record {
                expression: "7 + 3".into(),
                result: "10".into(),
            })
            .unwrap();
        let id = store.latest().unwrap().unwrap().id;

        store.apply_intent(HistoryIntent::Delete(id)).unwrap();
        assert_eq!(store.count().unwrap(), 0);

        store.insert("1 + 1", "2").unwrap();
        store.apply_intent(HistoryIntent::ClearAll).unwrap();
        assert_eq!(store.count().unwrap(), 0);

        let missing = store.apply_intent(HistoryIntent::Delete(id));
        assert!(matches!(missing, Err(HistoryError::NotFound(_))));
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");
        {
            let store = SqliteHistoryStore::new(&path).unwrap();
            store.insert("4 × 4", "16").unwrap();
        }
        let reopened = SqliteHistoryStore::new(&path).unwrap();
        assert_eq!(reopened.list(None).unwrap()[0].result, "16");
    }
}
