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

//! Test utilities for integration tests

/// Initialization utilities for tests
pub mod init {
    /// Initialize logging for a test
    pub fn init_test_environment() {
        codeviz_common::logging::ensure_test_logging(None);
    }
}

/// Programs used across tests
pub mod programs {
    /// Reads a count and prints that many Fibonacci numbers
    pub const FIBONACCI: &str = r#"# Fibonacci sequence
n = int(input("How many terms? "))
a, b = 0, 1
for _ in range(n):
    print(a, end=" ")
    a, b = b, a + b
"#;

    /// Sums a list without reading input
    pub const LINEAR_SUM: &str = "total = 0\nfor x in items:\n    total += x\nprint(total)\n";
}

/// Fake execution service built on wiremock
pub mod service {
    use codeviz_client::{ClientConfig, ExecutionOrchestrator, HttpBackend};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tracing::info;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    /// Start an empty service
    pub async fn start_service() -> MockServer {
        let server = MockServer::start().await;
        info!("Fake execution service at {}", server.uri());
        server
    }

    /// Answer `POST /<route>` with `response`
    pub async fn mount_response(server: &MockServer, route: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(format!("/{route}")))
            .respond_with(response)
            .mount(server)
            .await;
    }

    /// Answer `POST /<route>` with a JSON body
    pub async fn mount_json(server: &MockServer, route: &str, body: Value) {
        mount_response(server, route, ResponseTemplate::new(200).set_body_json(body)).await;
    }

    /// Fail the test if `POST /<route>` is ever called
    pub async fn mount_never_called(server: &MockServer, route: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/{route}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(server)
            .await;
    }

    /// Mount plain successful answers for all three endpoints
    pub async fn mount_defaults(server: &MockServer, output: &str) {
        mount_json(server, "run", json!({ "output": output })).await;
        mount_json(
            server,
            "analyze",
            json!({
                "complexity": "O(n)",
                "metrics": { "loops": 1, "variables": ["total", "x"] }
            }),
        )
        .await;
        mount_json(
            server,
            "trace",
            json!({
                "steps": [
                    { "line": 1, "description": "init", "variables": { "total": { "value": 0, "type": "int" } } },
                    { "line": 2, "description": "loop", "variables": {} },
                    { "line": 4, "description": "print", "variables": {}, "output": "6" }
                ]
            }),
        )
        .await;
    }

    /// Client configuration pointing at `server`
    pub fn client_config(server: &MockServer) -> ClientConfig {
        let mut config = ClientConfig::default();
        config.endpoint.base_url = server.uri();
        config.endpoint.request_timeout_secs = 5;
        config
    }

    /// Orchestrator talking to `server`
    pub fn orchestrator(server: &MockServer) -> ExecutionOrchestrator<HttpBackend> {
        let config = client_config(server);
        let backend = HttpBackend::from_config(&config).expect("valid backend config");
        ExecutionOrchestrator::new(Arc::new(backend), &config)
    }
}

/// Fake terminal server built on tokio-tungstenite
pub mod terminal {
    use futures::{SinkExt, StreamExt};
    use tokio::{net::TcpListener, task::JoinHandle};
    use tokio_tungstenite::{accept_async, tungstenite::Message};
    use tracing::{debug, info};

    /// Serve `sessions` connections one after another, then stop listening
    ///
    /// Each connection is greeted with `Welcome <index>`, every text line is
    /// answered with `echo: <line>` and `exit` closes the connection.
    pub async fn start_echo_terminal(sessions: usize) -> eyre::Result<(String, JoinHandle<()>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("ws://{}", listener.local_addr()?);
        info!("Fake terminal server at {}", url);

        let handle = tokio::spawn(async move {
            for index in 0..sessions {
                let Ok((tcp, _)) = listener.accept().await else {
                    return;
                };
                let Ok(mut ws) = accept_async(tcp).await else {
                    continue;
                };
                if ws.send(Message::text(format!("Welcome {index}"))).await.is_err() {
                    continue;
                }

                while let Some(Ok(message)) = ws.next().await {
                    match message {
                        Message::Text(text) if text.as_str() == "exit" => {
                            let _ = ws.close(None).await;
                            break;
                        }
                        Message::Text(text) => {
                            let reply = format!("echo: {}", text.as_str());
                            if ws.send(Message::text(reply)).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }
                debug!("Terminal session {} finished", index);
            }
        });

        Ok((url, handle))
    }
}
