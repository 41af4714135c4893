use std::collections::VecDeque;

use crate::engine::{EngineState, Phase};
use crate::history::{HistoryIntent, HistoryRecord};
use crate::key::Key;
use crate::token::Operator;

/// One UI session: an [`EngineState`] plus the history requests it has
/// produced but the caller has not yet forwarded.
#[derive(Debug, Default)]
pub struct Calculator {
    state: EngineState,
    outbox: VecDeque<HistoryIntent>,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn current_input(&self) -> &str {
        self.state.current_input()
    }

    pub fn expression(&self) -> String {
        self.state.expression()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn press(&mut self, key: Key) {
        if let Some(intent) = self.state.press(key) {
            self.outbox.push_back(intent);
        }
    }

    pub fn press_all(&mut self, keys: impl IntoIterator<Item = Key>) {
        for key in keys {
            self.press(key);
        }
    }

    pub fn on_digit(&mut self, d: u8) {
        if let Some(key) = Key::digit(d) {
            self.press(key);
        }
    }

    pub fn on_decimal(&mut self) {
        self.press(Key::Decimal);
    }

    pub fn on_operator(&mut self, op: Operator) {
        self.press(Key::Operator(op));
    }

    pub fn on_backspace(&mut self) {
        self.press(Key::Backspace);
    }

    pub fn on_clear(&mut self) {
        self.press(Key::Clear);
    }

    pub fn on_sign_toggle(&mut self) {
        self.press(Key::SignToggle);
    }

    pub fn on_percent(&mut self) {
        self.press(Key::Percent);
    }

    pub fn on_equals(&mut self) {
        self.press(Key::Equals);
    }

    /// Load a stored calculation into the display. The next digit starts fresh.
    pub fn restore(&mut self, record: &HistoryRecord) {
        self.state = EngineState::restored(&record.expression, &record.result);
    }

    pub fn pending_intents(&self) -> usize {
        self.outbox.len()
    }

    /// Take queued history requests, oldest first.
    pub fn drain_intents(&mut self) -> Vec<HistoryIntent> {
        self.outbox.drain(..).collect()
    }
}
