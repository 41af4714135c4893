//! Background persistence queue.
//!
//! The UI session hands [`HistoryIntent`]s to [`HistoryWriter::submit`] and
//! carries on; a single worker thread owns the store and applies them in
//! submission order. Failures are logged and dropped.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use calc_core::{HistoryIntent, HistoryStore};

use crate::store::SqliteHistoryStore;

pub struct HistoryWriter {
    tx: Option<Sender<HistoryIntent>>,
    worker: Option<JoinHandle<SqliteHistoryStore>>,
}

impl HistoryWriter {
    /// Move `store` onto a worker thread and start draining the queue.
    pub fn spawn(store: SqliteHistoryStore) -> Self {
        let (tx, rx) = mpsc::channel::<HistoryIntent>();
        let worker = thread::Builder::new()
            .name("history-writer".into())
            .spawn(move || {
                for intent in rx {
                    debug!("applying history intent: {intent:?}");
                    if let Err(e) = store.apply_intent(intent) {
                        warn!("history write failed: {e}");
                    }
                }
                store
            });

        match worker {
            Ok(handle) => Self {
                tx: Some(tx),
                worker: Some(handle),
            },
            Err(e) => {
                warn!("cannot start history writer, history disabled: {e}");
                Self {
                    tx: None,
                    worker: None,
                }
            }
        }
    }

    /// Queue an intent. Never blocks; a stopped worker only produces a warning.
    pub fn submit(&self, intent: HistoryIntent) {
        match &self.tx {
            Some(tx) => {
                if let Err(e) = tx.send(intent) {
                    warn!("history writer stopped, dropping {:?}", e.0);
                }
            }
            None => debug!("history writer disabled, dropping {intent:?}"),
        }
    }

    pub fn submit_all(&self, intents: impl IntoIterator<Item = HistoryIntent>) {
        for intent in intents {
            self.submit(intent);
        }
    }

    /// Close the queue, wait for pending writes and hand the store back.
    pub fn finish(mut self) -> Option<SqliteHistoryStore> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<SqliteHistoryStore> {
        drop(self.tx.take());
        let handle = self.worker.take()?;
        match handle.join() {
            Ok(store) => Some(store),
            Err(_) => {
                warn!("history writer panicked");
                None
            }
        }
    }
}

impl Drop for HistoryWriter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expression: &str, result: &str) -> HistoryIntent {
        HistoryIntent::Record {
            expression: expression.into(),
            result: result.into(),
        }
    }

    #[test]
    fn test_writes_apply_in_order() {
        let writer = HistoryWriter::spawn(SqliteHistoryStore::in_memory().unwrap());
        writer.submit(record("1 + 1", "2"));
        writer.submit(record("2 + 2", "4"));
        writer.submit(record("3 + 3", "6"));

        let store = writer.finish().unwrap();
        let results: Vec<String> = store
            .list(None)
            .unwrap()
            .into_iter()
            .map(|r| r.result)
            .collect();
        assert_eq!(results, vec!["6", "4", "2"]);
    }

    #[test]
    fn test_dedup_and_error_skip_through_queue() {
        let writer = HistoryWriter::spawn(SqliteHistoryStore::in_memory().unwrap());
        writer.submit_all([
            record("2 + 2", "4"),
            record("2 + 2", "4"),
            record("6 ÷ 0", "Error"),
        ]);
        let store = writer.finish().unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_clear_after_records() {
        let writer = HistoryWriter::spawn(SqliteHistoryStore::in_memory().unwrap());
        writer.submit(record("1 + 1", "2"));
        writer.submit(HistoryIntent::ClearAll);
        writer.submit(record("5 × 5", "25"));
        let store = writer.finish().unwrap();

        let all = store.list(None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].result, "25");
    }

    #[test]
    fn test_failed_delete_does_not_stop_worker() {
        let writer = HistoryWriter::spawn(SqliteHistoryStore::in_memory().unwrap());
        writer.submit(HistoryIntent::Delete(404));
        writer.submit(record("8 - 3", "5"));
        let store = writer.finish().unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_drop_flushes_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        {
            let writer = HistoryWriter::spawn(SqliteHistoryStore::new(&path).unwrap());
            writer.submit(record("9 × 9", "81"));
        }
        let store = SqliteHistoryStore::new(&path).unwrap();
        assert_eq!(store.latest().unwrap().unwrap().result, "81");
    }
}
