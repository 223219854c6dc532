// CodeViz - Algorithm Playground Core
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Terminal session: a bounded, tagged log of output lines plus the
//! pending-input prompt.

use chrono::{DateTime, Local};
use derive_more::Display;
use std::{collections::VecDeque, fmt};

/// Maximum number of lines kept when not configured
pub const DEFAULT_MAX_HISTORY: usize = 1000;

/// System line written at the start of every run
pub const RUNNING_LINE: &str = "Running code...";

/// System line written when input cannot be forwarded
pub const NOT_CONNECTED_LINE: &str = "Terminal not connected";

/// Prompt used when a program reads input without printing one
pub const DEFAULT_PROMPT: &str = ">>>";

const ERROR_PREFIX: &str = "Error: ";
const ECHO_PREFIX: &str = "> ";

/// Where a terminal line came from
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineOrigin {
    /// Status written by the client itself
    #[display("system")]
    System,
    /// Program output
    #[display("stdout")]
    Stdout,
    /// Failure report
    #[display("error")]
    Error,
    /// User input echoed back
    #[display("echoed-input")]
    EchoedInput,
}

/// One line of terminal output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    /// Line tag
    pub origin: LineOrigin,
    /// Text without its rendering prefix
    pub text: String,
    /// When the line was written
    pub timestamp: DateTime<Local>,
}

impl TerminalLine {
    fn new(origin: LineOrigin, text: impl Into<String>) -> Self {
        Self { origin, text: text.into(), timestamp: Local::now() }
    }
}

/// Error lines render as `Error: ...`, echoed input as `> ...`
impl fmt::Display for TerminalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            LineOrigin::Error => write!(f, "{ERROR_PREFIX}{}", self.text),
            LineOrigin::EchoedInput => write!(f, "{ECHO_PREFIX}{}", self.text),
            LineOrigin::System | LineOrigin::Stdout => f.write_str(&self.text),
        }
    }
}

/// Bounded terminal log with an optional pending-input prompt
///
/// The session awaits input exactly when a prompt is set.
#[derive(Debug, Clone)]
pub struct TerminalSession {
    lines: VecDeque<TerminalLine>,
    prompt: Option<String>,
    max_history: usize,
    written: u64,
}

impl Default for TerminalSession {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl TerminalSession {
    /// Create a session keeping at most `max_history` lines (at least one)
    pub fn new(max_history: usize) -> Self {
        Self { lines: VecDeque::new(), prompt: None, max_history: max_history.max(1), written: 0 }
    }

    /// Append a line, dropping the oldest one when full
    pub fn push(&mut self, origin: LineOrigin, text: impl Into<String>) {
        if self.lines.len() >= self.max_history {
            self.lines.pop_front();
        }
        self.lines.push_back(TerminalLine::new(origin, text));
        self.written += 1;
    }

    /// Append a system line
    pub fn push_system(&mut self, text: impl Into<String>) {
        self.push(LineOrigin::System, text);
    }

    /// Append program output, one line per text line
    pub fn push_stdout(&mut self, output: &str) {
        for line in output.lines() {
            self.push(LineOrigin::Stdout, line);
        }
    }

    /// Append an error line; an existing `Error:` prefix is not repeated
    pub fn push_error(&mut self, message: impl fmt::Display) {
        let message = message.to_string();
        let text = match message.strip_prefix(ERROR_PREFIX.trim_end()) {
            Some(rest) => rest.trim_start(),
            None => &message,
        };
        self.push(LineOrigin::Error, text);
    }

    /// Append echoed user input
    pub fn push_echo(&mut self, input: &str) {
        self.push(LineOrigin::EchoedInput, input);
    }

    /// Drop all lines and the prompt
    pub fn clear(&mut self) {
        self.lines.clear();
        self.prompt = None;
    }

    /// Lines from oldest to newest
    pub fn lines(&self) -> impl Iterator<Item = &TerminalLine> {
        self.lines.iter()
    }

    /// Rendered lines from oldest to newest
    pub fn rendered(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }

    /// Number of lines held
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the session holds no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines held with the given origin
    pub fn count(&self, origin: LineOrigin) -> usize {
        self.lines.iter().filter(|line| line.origin == origin).count()
    }

    /// Most recent line
    pub fn last(&self) -> Option<&TerminalLine> {
        self.lines.back()
    }

    /// Pending-input prompt
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Set or clear the prompt; an empty prompt clears it
    pub fn set_prompt(&mut self, prompt: Option<String>) {
        self.prompt = prompt.filter(|p| !p.is_empty());
    }

    /// Session is waiting for user input
    pub fn is_awaiting_input(&self) -> bool {
        self.prompt.is_some()
    }

    /// Position after the newest line ever written, for [`Self::lines_since`]
    pub fn cursor(&self) -> u64 {
        self.written
    }

    /// Lines written at or after `cursor` that are still held
    pub fn lines_since(&self, cursor: u64) -> impl Iterator<Item = &TerminalLine> {
        let first_held = self.written - self.lines.len() as u64;
        let skip = cursor.saturating_sub(first_held).min(self.lines.len() as u64);
        self.lines.iter().skip(skip as usize)
    }
}
