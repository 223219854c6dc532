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

//! End-to-end tests of the live terminal socket over a real WebSocket

use codeviz_client::{
    api, config::ReconnectConfig, ClientConfig, ConnectionError, ConnectionState,
    ExecutionBackend, ExecutionOrchestrator, InputOutcome, SocketEvent, TerminalHandle,
};
use codeviz_integration_tests::test_utils::{init, terminal};
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;

const WAIT: Duration = Duration::from_secs(5);

fn config(url: String) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.endpoint.terminal_url = url;
    config.reconnect = ReconnectConfig { delay_ms: 200, max_attempts: 1 };
    config
}

/// Feed socket events to the orchestrator until `line` is the newest terminal line
async fn pump_until<B: ExecutionBackend>(
    orchestrator: &mut ExecutionOrchestrator<B>,
    handle: &mut TerminalHandle,
    line: &str,
) {
    let reached = timeout(WAIT, async {
        while orchestrator.session().terminal().last().map(|l| l.text.as_str()) != Some(line) {
            match handle.events.recv().await {
                Some(event) => orchestrator.handle_socket_event(event),
                None => return false,
            }
        }
        true
    })
    .await;
    assert_eq!(reached, Ok(true), "never saw terminal line {line:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_terminal_round_trip_and_reconnect() {
    init::init_test_environment();
    info!("Testing terminal socket against a live server");

    let (url, server) = terminal::start_echo_terminal(2).await.unwrap();
    let config = config(url);

    let mut orchestrator = api::offline_orchestrator(&config);
    let mut handle = api::spawn_terminal(&config);
    orchestrator.attach_terminal(handle.outbound.clone());

    pump_until(&mut orchestrator, &mut handle, "Welcome 0").await;
    assert_eq!(orchestrator.session().connection(), ConnectionState::Connected);

    assert_eq!(orchestrator.submit_input("ls"), InputOutcome::Forwarded);
    pump_until(&mut orchestrator, &mut handle, "echo: ls").await;

    // the server hangs up; one reconnect attempt is allowed
    orchestrator.submit_input("exit");
    pump_until(&mut orchestrator, &mut handle, "Welcome 1").await;
    assert_eq!(orchestrator.session().connection(), ConnectionState::Connected);

    // second hang-up: the server is gone, so reconnection gives up
    orchestrator.submit_input("exit");
    let drained = timeout(WAIT, async {
        while let Some(event) = handle.events.recv().await {
            orchestrator.handle_socket_event(event);
        }
    })
    .await;
    assert!(drained.is_ok());
    assert_eq!(orchestrator.session().connection(), ConnectionState::Disconnected);
    assert_eq!(orchestrator.submit_input("ls"), InputOutcome::NotConnected);

    let result = timeout(WAIT, handle.task).await.unwrap().unwrap();
    assert_eq!(result, Err(ConnectionError::ReconnectExhausted(1)));
    server.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_terminal_shutdown_by_client() {
    init::init_test_environment();
    info!("Testing client-side terminal shutdown");

    let (url, _server) = terminal::start_echo_terminal(1).await.unwrap();
    let config = config(url);
    let mut handle = api::spawn_terminal(&config);

    let mut states = Vec::new();
    loop {
        match timeout(WAIT, handle.events.recv()).await.unwrap() {
            Some(SocketEvent::State(state)) => states.push(state),
            Some(SocketEvent::Line(line)) => {
                assert_eq!(line, "Welcome 0");
                break;
            }
            None => panic!("socket stopped early"),
        }
    }
    assert_eq!(states, [ConnectionState::Connecting, ConnectionState::Connected]);

    drop(handle.outbound);
    let result = timeout(WAIT, handle.task).await.unwrap().unwrap();
    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn test_terminal_unreachable_gives_up() {
    init::init_test_environment();
    info!("Testing terminal socket without a server");

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);

    let handle = api::spawn_terminal(&config(url));
    let result = timeout(WAIT, handle.task).await.unwrap().unwrap();
    assert_eq!(result, Err(ConnectionError::ReconnectExhausted(1)));
}
