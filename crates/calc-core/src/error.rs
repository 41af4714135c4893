use thiserror::Error;

/// Failures raised while evaluating or transforming an operand.
///
/// Every variant is shown to the user as the same sentinel, [`CalcError::SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric overflow")]
    NumericOverflow,

    #[error("malformed number: {0}")]
    ParseFailure(String),
}

impl CalcError {
    /// The single user-visible failure value.
    pub const SENTINEL: &'static str = "Error";
}

pub type CalcResult<T> = Result<T, CalcError>;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history record not found: {0}")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(String),
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// True when `text` is the failure sentinel (ignoring case and surrounding whitespace).
pub fn is_sentinel(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(CalcError::SENTINEL)
}
