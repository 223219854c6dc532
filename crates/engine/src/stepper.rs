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

//! Cursor over an execution trace
//!
//! The controller is a two-state machine:
//!
//! ```text
//! Empty --reset(non-empty)--> At(0)
//! At(p) --next-->     At(min(p + 1, len - 1))
//! At(p) --previous--> At(max(p - 1, 0))
//! *     --reset([])-> Empty
//! ```
//!
//! Navigation saturates at both ends instead of failing.

use codeviz_common::{ExecutionStep, Trace};
use derive_more::Display;
use thiserror::Error;
use tracing::debug;

/// Observable state of a [`SteppingController`]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum StepperState {
    /// No trace loaded, or the loaded trace has no steps
    #[display("empty")]
    Empty,
    /// Positioned on a step
    #[display("at({_0})")]
    At(usize),
}

/// Errors from direct cursor placement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// Requested step does not exist
    #[error("step {index} out of bounds (total {len})")]
    OutOfBounds {
        /// Requested index
        index: usize,
        /// Number of steps in the trace
        len: usize,
    },
    /// Trace has no steps
    #[error("trace is empty")]
    EmptyTrace,
}

/// Bounds-checked cursor over a [`Trace`]
#[derive(Debug, Clone, Default)]
pub struct SteppingController {
    trace: Trace,
    position: Option<usize>,
}

impl SteppingController {
    /// Create a controller with no trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller positioned at the start of `trace`
    pub fn with_trace(trace: Trace) -> Self {
        let mut controller = Self::new();
        controller.reset(trace);
        controller
    }

    /// Replace the trace and move to its first step
    pub fn reset(&mut self, trace: Trace) {
        self.position = (!trace.is_empty()).then_some(0);
        self.trace = trace;
        debug!("Stepper reset with {} steps ({})", self.trace.len(), self.state());
    }

    /// Drop the trace
    pub fn clear(&mut self) {
        self.reset(Trace::new());
    }

    /// Advance one step, staying on the last step
    pub fn next(&mut self) -> Option<&ExecutionStep> {
        if let Some(pos) = self.position {
            self.position = Some((pos + 1).min(self.trace.len() - 1));
        }
        self.current_step()
    }

    /// Go back one step, staying on the first step
    pub fn previous(&mut self) -> Option<&ExecutionStep> {
        if let Some(pos) = self.position {
            self.position = Some(pos.saturating_sub(1));
        }
        self.current_step()
    }

    /// Jump to `index`; the position is unchanged on error
    pub fn goto(&mut self, index: usize) -> Result<&ExecutionStep, StepError> {
        if self.trace.is_empty() {
            return Err(StepError::EmptyTrace);
        }
        if index >= self.trace.len() {
            return Err(StepError::OutOfBounds { index, len: self.trace.len() });
        }

        self.position = Some(index);
        Ok(&self.trace[index])
    }

    /// Step under the cursor, `None` when the trace is empty
    pub fn current_step(&self) -> Option<&ExecutionStep> {
        self.position.and_then(|pos| self.trace.get(pos))
    }

    /// Cursor position, `None` when the trace is empty
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Current state
    pub fn state(&self) -> StepperState {
        self.position.map_or(StepperState::Empty, StepperState::At)
    }

    /// Loaded trace
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Number of steps in the loaded trace
    pub fn len(&self) -> usize {
        self.trace.len()
    }

    /// Check if the loaded trace is empty
    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }

    /// Positioned on the first step
    pub fn is_first(&self) -> bool {
        self.position == Some(0)
    }

    /// Positioned on the last step
    pub fn is_last(&self) -> bool {
        self.position.is_some_and(|pos| pos + 1 == self.trace.len())
    }
}
