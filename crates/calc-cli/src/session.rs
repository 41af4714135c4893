//! Keypad session: one calculator wired to the background history writer.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use calc_core::{parse_keys, Calculator, HistoryIntent, HistoryRecord, HistoryStore, Key};
use calc_store::{HistoryWriter, SqliteHistoryStore};

pub struct Session {
    calc: Calculator,
    writer: Option<HistoryWriter>,
    show_preview: bool,
}

/// What the caller should do after a line of input.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl Session {
    /// `writer` is `None` when history forwarding is disabled.
    pub fn new(writer: Option<HistoryWriter>, show_preview: bool) -> Self {
        Self {
            calc: Calculator::new(),
            writer,
            show_preview,
        }
    }

    /// Feed keys and forward any finished calculations to the writer.
    pub fn press_all(&mut self, keys: impl IntoIterator<Item = Key>) {
        self.calc.press_all(keys);
        let intents = self.calc.drain_intents();
        self.forward(intents);
    }

    /// Reload a stored calculation as if it had just been evaluated.
    pub fn restore(&mut self, record: &HistoryRecord) {
        self.calc.restore(record);
    }

    pub fn forward(&self, intents: Vec<HistoryIntent>) {
        if let Some(writer) = &self.writer {
            writer.submit_all(intents);
        } else if !intents.is_empty() {
            debug!("history disabled, {} intents dropped", intents.len());
        }
    }

    /// Display lines: current input, then the preview when enabled and non-empty.
    pub fn display(&self) -> Vec<String> {
        let mut lines = vec![self.calc.current_input().to_string()];
        let expression = self.calc.expression();
        if self.show_preview && !expression.is_empty() {
            lines.push(format!("  {expression}"));
        }
        lines
    }

    /// Handle one input line: either a colon command or a run of keys.
    ///
    /// History reads go through `reader`, a second connection to the same
    /// database; writes always go through the queue.
    pub fn handle_line(
        &mut self,
        line: &str,
        reader: Option<&SqliteHistoryStore>,
        out: &mut impl Write,
    ) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        if let Some(command) = line.strip_prefix(':') {
            return self.handle_command(command, reader, out);
        }

        match parse_keys(line) {
            Ok(keys) => {
                self.press_all(keys);
                for l in self.display() {
                    writeln!(out, "{l}")?;
                }
            }
            Err(e) => writeln!(out, "{e}")?,
        }
        Ok(Flow::Continue)
    }

    fn handle_command(
        &mut self,
        command: &str,
        reader: Option<&SqliteHistoryStore>,
        out: &mut impl Write,
    ) -> Result<Flow> {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or("");
        let arg = parts.next();

        match (name, arg) {
            ("q" | "quit" | "exit", _) => return Ok(Flow::Quit),
            ("history", _) => match reader {
                // Separate connection: writes still queued may not show yet.
                Some(store) => {
                    let records = store.list(None)?;
                    if records.is_empty() {
                        writeln!(out, "No history yet.")?;
                    }
                    for r in &records {
                        writeln!(out, "{:>5}  {} = {}", r.id, r.expression, r.result)?;
                    }
                }
                None => writeln!(out, "History is disabled.")?,
            },
            ("restore", Some(id)) => {
                let id: i64 = id.parse().with_context(|| format!("invalid id: {id}"))?;
                match reader.map(|s| s.get(id)).transpose()?.flatten() {
                    Some(record) => {
                        self.restore(&record);
                        for l in self.display() {
                            writeln!(out, "{l}")?;
                        }
                    }
                    None => writeln!(out, "No history record {id}.")?,
                }
            }
            ("delete", Some(id)) => {
                let id: i64 = id.parse().with_context(|| format!("invalid id: {id}"))?;
                match reader.map(|s| s.get(id)).transpose()? {
                    Some(None) => writeln!(out, "No history record {id}.")?,
                    _ => {
                        self.forward(vec![HistoryIntent::Delete(id)]);
                        writeln!(out, "Delete queued: {id}")?;
                    }
                }
            }
            ("clear-history", _) => {
                self.forward(vec![HistoryIntent::ClearAll]);
                writeln!(out, "History cleared.")?;
            }
            _ => writeln!(
                out,
                "commands: :history, :restore <id>, :delete <id>, :clear-history, :quit"
            )?,
        }
        Ok(Flow::Continue)
    }

    /// Read lines from `input` until EOF or `:quit`.
    pub fn run(
        &mut self,
        input: impl BufRead,
        reader: Option<&SqliteHistoryStore>,
        out: &mut impl Write,
    ) -> Result<()> {
        for line in input.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("stdin read error: {e}");
                    break;
                }
            };
            match self.handle_line(&line, reader, out) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => writeln!(out, "error: {e:#}")?,
            }
            out.flush()?;
        }
        Ok(())
    }

    /// Stop the writer, waiting for queued writes. Returns the writer's store.
    pub fn finish(self) -> Option<SqliteHistoryStore> {
        self.writer.and_then(HistoryWriter::finish)
    }
}
