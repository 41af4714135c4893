pub mod calculator;
pub mod engine;
pub mod error;
pub mod eval;
pub mod format;
pub mod history;
pub mod key;
pub mod token;

pub use calculator::Calculator;
pub use engine::{apply, apply_all, EngineState, Phase, Transition};
pub use error::{is_sentinel, CalcError, CalcResult, HistoryError, HistoryResult};
pub use eval::{evaluate, format_number};
pub use format::preview;
pub use history::{HistoryIntent, HistoryRecord, HistoryStore};
pub use key::{parse_keys, Key};
pub use token::{Operator, Token};
