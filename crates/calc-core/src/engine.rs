//! Keystroke accumulator.
//!
//! The token list holds everything typed so far; while an operand is open it
//! is the trailing [`Token::Operand`]. `current_input` mirrors the operand the
//! display should show, or the result/sentinel after `=`.

use crate::error::{is_sentinel, CalcError};
use crate::eval::{evaluate, transform_operand};
use crate::format::{preview, render_tokens};
use crate::history::HistoryIntent;
use crate::key::Key;
use crate::token::{split_expression, Operator, Token};

const ZERO: &str = "0";

/// Marker for a negative literal typed right after `×` or `÷`.
const PENDING_MINUS: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fresh,
    BuildingOperand,
    AfterOperator,
    JustEvaluated,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    tokens: Vec<Token>,
    current_input: String,
    just_evaluated: bool,
    error: Option<CalcError>,
}

/// Result of feeding one key to [`apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: EngineState,
    pub intent: Option<HistoryIntent>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            current_input: ZERO.to_string(),
            just_evaluated: false,
            error: None,
        }
    }
}

/// Feed one key to `state`, returning the next state and any history request.
pub fn apply(mut state: EngineState, key: Key) -> Transition {
    let intent = state.press(key);
    Transition { state, intent }
}

/// Feed a run of keys, dropping history requests.
pub fn apply_all(state: EngineState, keys: impl IntoIterator<Item = Key>) -> EngineState {
    keys.into_iter()
        .fold(state, |state, key| apply(state, key).state)
}

impl EngineState {
    /// State shown after restoring a stored calculation: the stored expression
    /// as preview, the stored result as current input, ready for a fresh entry.
    pub fn restored(expression: &str, result: &str) -> Self {
        let result = result.trim();
        let error = is_sentinel(result).then(|| CalcError::ParseFailure(result.to_string()));
        Self {
            tokens: split_expression(expression),
            current_input: result.to_string(),
            just_evaluated: true,
            error,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    pub fn expression(&self) -> String {
        preview(self)
    }

    pub fn is_just_evaluated(&self) -> bool {
        self.just_evaluated
    }

    pub fn error(&self) -> Option<&CalcError> {
        self.error.as_ref()
    }

    pub fn phase(&self) -> Phase {
        if self.error.is_some() {
            return Phase::Error;
        }
        if self.just_evaluated {
            return Phase::JustEvaluated;
        }
        match self.tokens.last() {
            None => Phase::Fresh,
            Some(Token::Operator(_)) => Phase::AfterOperator,
            Some(Token::Operand(_)) => Phase::BuildingOperand,
        }
    }

    /// Mutate in place for one key. Only `=` can produce a history request.
    pub fn press(&mut self, key: Key) -> Option<HistoryIntent> {
        match key {
            Key::Digit(d) => self.on_digit(d),
            Key::Decimal => self.on_decimal(),
            Key::Operator(op) => self.on_operator(op),
            Key::SignToggle => self.on_sign_toggle(),
            Key::Percent => self.on_percent(),
            Key::Backspace => self.on_backspace(),
            Key::Clear => self.on_clear(),
            Key::Equals => return self.on_equals(),
        }
        None
    }

    fn on_digit(&mut self, d: u8) {
        if d > 9 {
            return;
        }
        let digit = char::from(b'0' + d);
        self.start_fresh_if_done();
        match self.tokens.last_mut() {
            Some(Token::Operand(text)) => {
                if *text == ZERO {
                    *text = digit.to_string();
                } else if *text == "-0" {
                    *text = format!("-{digit}");
                } else {
                    text.push(digit);
                }
            }
            _ => self.tokens.push(Token::Operand(digit.to_string())),
        }
        self.sync_input();
    }

    fn on_decimal(&mut self) {
        self.start_fresh_if_done();
        match self.tokens.last_mut() {
            Some(Token::Operand(text)) => {
                if *text == PENDING_MINUS {
                    text.push_str("0.");
                } else if !text.contains('.') {
                    text.push('.');
                }
            }
            _ => self.tokens.push(Token::operand("0.")),
        }
        self.sync_input();
    }

    fn on_operator(&mut self, op: Operator) {
        if self.error.is_some() {
            self.tokens = vec![Token::operand(ZERO)];
        } else if self.just_evaluated {
            self.tokens = vec![Token::operand(self.current_input.clone())];
        }
        self.error = None;
        self.just_evaluated = false;

        match self.tokens.last() {
            None => {
                // Implicit leading zero, so "-" then "5" reads as 0 - 5.
                self.tokens.push(Token::operand(ZERO));
                self.tokens.push(Token::Operator(op));
            }
            Some(Token::Operator(prev)) => {
                if op == Operator::Subtract && prev.is_multiplicative() {
                    self.tokens.push(Token::operand(PENDING_MINUS));
                } else if let Some(last) = self.tokens.last_mut() {
                    *last = Token::Operator(op);
                }
            }
            Some(Token::Operand(text)) if text == PENDING_MINUS => {
                // A second operator confirms the minus was not a sign.
                self.tokens.pop();
                if let Some(last) = self.tokens.last_mut() {
                    *last = Token::Operator(op);
                }
            }
            Some(Token::Operand(_)) => {
                finalize_operand(&mut self.tokens);
                self.tokens.push(Token::Operator(op));
            }
        }
        self.sync_input();
    }

    fn on_backspace(&mut self) {
        if self.error.is_some() || (self.just_evaluated && self.current_input == ZERO) {
            return;
        }
        self.reopen_result();
        match self.tokens.last_mut() {
            None => return,
            Some(Token::Operator(_)) => {
                self.tokens.pop();
            }
            Some(Token::Operand(text)) => {
                if *text == PENDING_MINUS {
                    self.tokens.pop();
                } else if *text == ZERO {
                    return;
                } else {
                    text.pop();
                    if text.is_empty() || *text == PENDING_MINUS {
                        *text = ZERO.to_string();
                    }
                }
            }
        }
        self.sync_input();
    }

    fn on_clear(&mut self) {
        *self = Self::default();
    }

    fn on_sign_toggle(&mut self) {
        if self.pending_minus() {
            self.tokens.pop();
            self.sync_input();
            return;
        }
        self.transform_live(|v| -v);
    }

    fn on_percent(&mut self) {
        if self.pending_minus() {
            return;
        }
        self.transform_live(|v| v / 100.0);
    }

    fn on_equals(&mut self) -> Option<HistoryIntent> {
        if self.error.is_some() || self.just_evaluated {
            return None;
        }
        if self.tokens.last().map_or(true, Token::is_operator) {
            self.tokens.push(Token::operand(self.current_input.clone()));
        }
        finalize_operand(&mut self.tokens);
        self.just_evaluated = true;

        match evaluate(&self.tokens) {
            Ok(result) => {
                self.current_input = result.clone();
                Some(HistoryIntent::Record {
                    expression: render_tokens(&self.tokens),
                    result,
                })
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    fn transform_live(&mut self, transform: impl Fn(f64) -> f64) {
        if self.error.is_some() {
            return;
        }
        self.reopen_result();
        let Some(Token::Operand(text)) = self.tokens.last_mut() else {
            return;
        };
        match transform_operand(text, transform) {
            Ok(value) => {
                *text = value;
                self.sync_input();
            }
            Err(e) => self.fail(e),
        }
    }

    /// After `=`, the result becomes the only token and is editable again.
    fn reopen_result(&mut self) {
        if self.just_evaluated {
            self.tokens = vec![Token::operand(self.current_input.clone())];
            self.just_evaluated = false;
        }
    }

    fn pending_minus(&self) -> bool {
        !self.just_evaluated
            && matches!(self.tokens.last(), Some(Token::Operand(text)) if text == PENDING_MINUS)
    }

    /// After `=` or a failure, the next digit starts a new expression.
    fn start_fresh_if_done(&mut self) {
        if self.just_evaluated || self.error.is_some() {
            self.tokens.clear();
            self.just_evaluated = false;
            self.error = None;
        }
    }

    fn fail(&mut self, error: CalcError) {
        self.current_input = CalcError::SENTINEL.to_string();
        self.error = Some(error);
    }

    fn sync_input(&mut self) {
        self.current_input = self
            .tokens
            .iter()
            .rev()
            .find_map(Token::as_operand)
            .unwrap_or(ZERO)
            .to_string();
    }
}

/// Drop a dangling decimal point from the trailing operand ("5." becomes "5").
fn finalize_operand(tokens: &mut [Token]) {
    if let Some(Token::Operand(text)) = tokens.last_mut() {
        if text.len() > 1 && text.ends_with('.') {
            text.pop();
        }
    }
}
