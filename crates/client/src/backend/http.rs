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

//! HTTP client for the execution service
//!
//! Every endpoint takes the same JSON body, `{code, language}`, and answers
//! with JSON. Non-success statuses and undecodable bodies are errors.

use codeviz_common::{CodeAnalysis, CodeRequest, ExecutionResult, Language, Trace, TraceResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use super::{ExecutionBackend, TransportError};
use crate::config::ClientConfig;

/// Execution service reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a new backend for the service at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

        debug!("Created HTTP backend for: {}", base_url);
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// Create a backend from the endpoint section of a configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(&config.endpoint.base_url, config.request_timeout())
    }

    /// Get service base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// POST a program to `path` and decode the JSON answer
    async fn post_code<T: DeserializeOwned>(
        &self,
        path: &str,
        source: &str,
        language: Language,
    ) -> Result<T, TransportError> {
        let url = self.endpoint(path);
        debug!("Making request: POST {} ({}, {} bytes)", url, language, source.len());

        let response = self
            .client
            .post(&url)
            .json(&CodeRequest { code: source, language })
            .send()
            .await
            .map_err(|e| {
                error!("POST {} failed: {}", url, e);
                TransportError::Unreachable { url: url.clone(), reason: e.to_string() }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("POST {} returned {}", url, status);
            return Err(TransportError::Status { url, status: status.as_u16() });
        }

        let body = response.bytes().await.map_err(|e| {
            error!("Reading response of {} failed: {}", url, e);
            TransportError::Unreachable { url: url.clone(), reason: e.to_string() }
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            error!("Decoding response of {} failed: {}", url, e);
            TransportError::Malformed { url, reason: e.to_string() }
        })
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<Value, TransportError> {
        let url = self.endpoint("health");
        debug!("Checking server health at {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            TransportError::Unreachable { url: url.clone(), reason: e.to_string() }
        })?;
        if !response.status().is_success() {
            return Err(TransportError::Status { url, status: response.status().as_u16() });
        }
        let health: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Malformed { url, reason: e.to_string() })?;

        debug!("Server health: {:?}", health);
        Ok(health)
    }
}

impl ExecutionBackend for HttpBackend {
    async fn execute(
        &self,
        source: &str,
        language: Language,
    ) -> Result<ExecutionResult, TransportError> {
        self.post_code("run", source, language).await
    }

    async fn analyze(
        &self,
        source: &str,
        language: Language,
    ) -> Result<CodeAnalysis, TransportError> {
        self.post_code("analyze", source, language).await
    }

    async fn trace(&self, source: &str, language: Language) -> Result<Trace, TransportError> {
        let response: TraceResponse = self.post_code("trace", source, language).await?;
        debug!("Received trace with {} steps", response.steps.len());
        Ok(response.into())
    }
}
