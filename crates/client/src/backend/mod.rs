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

//! Execution backends
//!
//! Programs are never run locally. A backend forwards source text to an
//! execution service and returns its output, analysis and trace.
//! [`HttpBackend`] talks to a real service; [`MockBackend`] answers offline.

mod http;
mod mock;

pub use http::*;
pub use mock::*;

use codeviz_common::{CodeAnalysis, ExecutionResult, Language, Trace};
use thiserror::Error;

/// Failure to obtain a usable response from the execution service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure or timeout
    #[error("failed to reach {url}: {reason}")]
    Unreachable {
        /// Requested URL
        url: String,
        /// Underlying failure
        reason: String,
    },
    /// Non-success HTTP status
    #[error("{url} responded with HTTP status {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },
    /// Body could not be decoded
    #[error("malformed response from {url}: {reason}")]
    Malformed {
        /// Requested URL
        url: String,
        /// Decoding failure
        reason: String,
    },
    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

/// An execution service
///
/// Calls are independent; the orchestrator issues them one at a time.
pub trait ExecutionBackend: Send + Sync {
    /// Run a program and collect its output
    fn execute(
        &self,
        source: &str,
        language: Language,
    ) -> impl std::future::Future<Output = Result<ExecutionResult, TransportError>> + Send;

    /// Analyze a program's complexity
    fn analyze(
        &self,
        source: &str,
        language: Language,
    ) -> impl std::future::Future<Output = Result<CodeAnalysis, TransportError>> + Send;

    /// Record a step-by-step walkthrough of a program
    fn trace(
        &self,
        source: &str,
        language: Language,
    ) -> impl std::future::Future<Output = Result<Trace, TransportError>> + Send;
}
