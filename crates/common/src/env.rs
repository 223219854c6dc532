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

//! Environment variable name constants for CodeViz configuration.
//!
//! These constants are the single source of truth for the environment
//! variables read by CodeViz components.
//!
//! # Environment Variables
//!
//! - [`CODEVIZ_ENDPOINT`] - Base URL of the execution service
//! - [`CODEVIZ_TERMINAL_URL`] - WebSocket URL of the terminal stream
//! - [`CODEVIZ_CONFIG`] - Path of the configuration file

/// Environment variable overriding the base URL of the execution service.
///
/// When set, it replaces `endpoint.base_url` from the configuration file.
///
/// # Examples
///
/// ```bash
/// CODEVIZ_ENDPOINT=http://127.0.0.1:9000 codeviz run fib.py
/// ```
pub const CODEVIZ_ENDPOINT: &str = "CODEVIZ_ENDPOINT";

/// Environment variable overriding the WebSocket URL of the terminal stream.
///
/// When set, it replaces `endpoint.terminal_url` from the configuration file.
pub const CODEVIZ_TERMINAL_URL: &str = "CODEVIZ_TERMINAL_URL";

/// Environment variable pointing at an alternative configuration file.
///
/// # Default
///
/// When not set, `~/.codeviz.toml` is used.
pub const CODEVIZ_CONFIG: &str = "CODEVIZ_CONFIG";
