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

// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
// SPDX-License-Identifier: AGPL-3.0
//! CodeViz execution client
//!
//! This crate connects the analysis engine to an execution service: it
//! runs programs remotely, keeps the terminal session, streams the live
//! terminal socket and orchestrates whole runs.

pub mod backend;
pub mod config;
pub mod continuation;
pub mod orchestrator;
pub mod socket;
pub mod terminal;

pub use backend::{ExecutionBackend, HttpBackend, MockBackend, TransportError};
pub use config::ClientConfig;
pub use orchestrator::{
    AnalysisSource, ExecutionOrchestrator, InputOutcome, RunOutcome, RunTicket, Session, View,
};
pub use socket::{
    ConnectionError, ConnectionState, ReconnectPolicy, SocketEvent, TerminalHandle,
    TerminalSocket, TerminalTransport, WsTransport,
};
pub use terminal::{LineOrigin, TerminalLine, TerminalSession};

/// Entry points for embedding the client
pub mod api {
    use super::*;
    use eyre::Result;
    use std::sync::Arc;
    use tracing::info;

    /// Open the live terminal socket described by `config` on a new task
    pub fn spawn_terminal(config: &ClientConfig) -> TerminalHandle {
        info!("Opening terminal socket at {}", config.endpoint.terminal_url);
        let transport = WsTransport::new(config.endpoint.terminal_url.clone());
        TerminalSocket::new(transport, config.reconnect_policy()).spawn()
    }

    /// Orchestrator talking to the configured execution service
    pub fn remote_orchestrator(
        config: &ClientConfig,
    ) -> Result<ExecutionOrchestrator<HttpBackend>> {
        let backend = HttpBackend::from_config(config)?;
        info!("Using execution service at {}", backend.base_url());
        Ok(ExecutionOrchestrator::new(Arc::new(backend), config))
    }

    /// Orchestrator that never leaves the machine
    pub fn offline_orchestrator(config: &ClientConfig) -> ExecutionOrchestrator<MockBackend> {
        info!("Using offline backend");
        ExecutionOrchestrator::new(Arc::new(MockBackend::new()), config)
    }
}
