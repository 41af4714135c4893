use serde::{Deserialize, Serialize};

use crate::error::{is_sentinel, HistoryResult};

/// A completed calculation. Never mutated after it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub expression: String,
    pub result: String,
}

impl HistoryRecord {
    /// Same pair, compared case-insensitively after trimming whitespace.
    pub fn matches(&self, expression: &str, result: &str) -> bool {
        self.expression
            .trim()
            .eq_ignore_ascii_case(expression.trim())
            && self.result.trim().eq_ignore_ascii_case(result.trim())
    }
}

/// A persistence request emitted by the UI session. Applied in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryIntent {
    Record { expression: String, result: String },
    Delete(i64),
    ClearAll,
}

pub trait HistoryStore {
    // CRUD
    fn insert(&self, expression: &str, result: &str) -> HistoryResult<i64>;
    fn get(&self, id: i64) -> HistoryResult<Option<HistoryRecord>>;
    fn delete(&self, id: i64) -> HistoryResult<()>;
    fn clear_all(&self) -> HistoryResult<usize>;

    // Retrieval, newest first
    fn latest(&self) -> HistoryResult<Option<HistoryRecord>>;
    fn list(&self, limit: Option<usize>) -> HistoryResult<Vec<HistoryRecord>>;
    fn count(&self) -> HistoryResult<usize>;

    /// Store a finished calculation unless it failed or repeats the latest record.
    ///
    /// Returns the new id, or `None` when the pair was skipped.
    fn record(&self, expression: &str, result: &str) -> HistoryResult<Option<i64>> {
        if is_sentinel(result) {
            return Ok(None);
        }
        if let Some(last) = self.latest()? {
            if last.matches(expression, result) {
                return Ok(None);
            }
        }
        self.insert(expression, result).map(Some)
    }

    /// Apply one queued intent.
    fn apply_intent(&self, intent: HistoryIntent) -> HistoryResult<()> {
        match intent {
            HistoryIntent::Record { expression, result } => {
                self.record(&expression, &result)?;
            }
            HistoryIntent::Delete(id) => self.delete(id)?,
            HistoryIntent::ClearAll => {
                self.clear_all()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(expression: &str, result: &str) -> HistoryRecord {
        HistoryRecord {
            id: 1,
            expression: expression.into(),
            result: result.into(),
        }
    }

    #[test]
    fn test_matches_trims_and_ignores_case() {
        let r = rec("2 + 2", "4");
        assert!(r.matches("  2 + 2 ", "4\n"));
        assert!(!r.matches("2 + 3", "5"));
        assert!(!r.matches("2 + 2", "5"));
    }

    #[test]
    fn test_record_serializes_with_schema_fields() {
        let json = serde_json::to_value(rec("7 + 3", "10")).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["expression"], "7 + 3");
        assert_eq!(json["result"], "10");
    }
}
