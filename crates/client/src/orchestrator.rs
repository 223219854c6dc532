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

//! Run orchestration
//!
//! The [`ExecutionOrchestrator`] is the single owner of the playground
//! session. A run goes through three steps:
//!
//! 1. [`ExecutionOrchestrator::begin_run`] resets the session and hands out
//!    a [`RunTicket`] stamped with a new run generation.
//! 2. [`RunTicket::perform`] calls the backend (execute, then analyze and
//!    trace unless execution failed). It does not touch the session, so it
//!    can run on another task.
//! 3. [`ExecutionOrchestrator::apply_run`] folds the [`RunOutcome`] into the
//!    session, unless a newer run was started in the meantime.
//!
//! No backend failure escapes: each one becomes an `Error:` terminal line.

use codeviz_common::{
    CodeAnalysis, Complexity, ComplexityClass, ExecutionResult, ExecutionStep, Language, Trace,
};
use codeviz_engine::{ComplexityClassifier, GrowthCurve, GrowthCurveGenerator, SteppingController};
use derive_more::Display;
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::{
    backend::{ExecutionBackend, TransportError},
    config::ClientConfig,
    continuation::{continue_program, input_prompt, InputError},
    socket::{ConnectionState, SocketEvent},
    terminal::{LineOrigin, TerminalSession, NOT_CONNECTED_LINE, RUNNING_LINE},
};

/// Panel the user should be looking at
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Terminal output
    #[display("terminal")]
    Terminal,
    /// Complexity chart and trace walkthrough
    #[display("visualization")]
    Visualization,
}

/// Where the current time class came from
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisSource {
    /// Local heuristic classifier
    #[default]
    #[display("local")]
    Local,
    /// Execution service analysis
    #[display("remote")]
    Remote,
}

/// Result of [`ExecutionOrchestrator::submit_input`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The pending program was finished with this many output lines
    Completed(usize),
    /// The input was not usable; the session still awaits input
    Rejected(InputError),
    /// The line was sent over the terminal stream
    Forwarded,
    /// Nothing awaits input and no terminal stream is attached
    NotConnected,
}

/// Everything the user sees and edits in one playground
#[derive(Debug, Clone)]
pub struct Session {
    source: String,
    language: Language,
    complexity: Complexity,
    analysis_source: AnalysisSource,
    metrics: Option<BTreeMap<String, f64>>,
    curve: GrowthCurve,
    terminal: TerminalSession,
    stepper: SteppingController,
    pending_program: Option<String>,
    generation: u64,
    running: bool,
    focus_request: Option<View>,
    connection: ConnectionState,
}

impl Session {
    /// Current source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Current display language
    pub fn language(&self) -> Language {
        self.language
    }

    /// Current time and space classes
    pub fn complexity(&self) -> Complexity {
        self.complexity
    }

    /// Origin of the time class
    pub fn analysis_source(&self) -> AnalysisSource {
        self.analysis_source
    }

    /// Metrics of the last remote analysis
    pub fn metrics(&self) -> Option<&BTreeMap<String, f64>> {
        self.metrics.as_ref()
    }

    /// Growth curve of the current time class
    pub fn curve(&self) -> &GrowthCurve {
        &self.curve
    }

    /// Terminal output
    pub fn terminal(&self) -> &TerminalSession {
        &self.terminal
    }

    /// Trace cursor
    pub fn stepper(&self) -> &SteppingController {
        &self.stepper
    }

    /// Generation of the latest run, zero before the first one
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A run was started and its outcome not applied yet
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Terminal socket state
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }
}

/// Claim on one run, handed out by [`ExecutionOrchestrator::begin_run`]
#[derive(Debug, Clone)]
pub struct RunTicket {
    generation: u64,
    source: String,
    language: Language,
}

/// Backend responses of one run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Generation of the run
    pub generation: u64,
    /// Program that was run
    pub source: String,
    /// Execution response
    pub execution: Result<ExecutionResult, TransportError>,
    /// Analysis response, `None` when execution failed
    pub analysis: Option<Result<CodeAnalysis, TransportError>>,
    /// Trace response, `None` when execution failed
    pub trace: Option<Result<Trace, TransportError>>,
}

impl RunTicket {
    /// Generation of the run
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Call the backend: execute, then analyze and trace
    ///
    /// A failed execution skips the remaining calls.
    pub async fn perform<B: ExecutionBackend>(self, backend: &B) -> RunOutcome {
        let Self { generation, source, language } = self;
        info!("Run {}: executing {} program", generation, language);

        let execution = backend.execute(&source, language).await;
        if let Err(e) = &execution {
            error!("Run {}: execution failed: {}", generation, e);
            return RunOutcome { generation, source, execution, analysis: None, trace: None };
        }

        let analysis = backend.analyze(&source, language).await;
        let trace = backend.trace(&source, language).await;
        debug!("Run {}: backend calls finished", generation);

        RunOutcome { generation, source, execution, analysis: Some(analysis), trace: Some(trace) }
    }
}

/// Coordinates runs against an [`ExecutionBackend`] and owns the [`Session`]
#[derive(Debug)]
pub struct ExecutionOrchestrator<B> {
    backend: Arc<B>,
    classifier: ComplexityClassifier,
    curve_generator: GrowthCurveGenerator,
    session: Session,
    outbound: Option<UnboundedSender<String>>,
}

impl<B: ExecutionBackend> ExecutionOrchestrator<B> {
    /// Create an orchestrator with the default example program loaded
    pub fn new(backend: Arc<B>, config: &ClientConfig) -> Self {
        let language = Language::default();
        let mut orchestrator = Self {
            backend,
            classifier: ComplexityClassifier::default(),
            curve_generator: GrowthCurveGenerator::new(config.curve.horizon),
            session: Session {
                source: String::new(),
                language,
                complexity: Complexity::default(),
                analysis_source: AnalysisSource::Local,
                metrics: None,
                curve: GrowthCurve::empty(ComplexityClass::Constant),
                terminal: TerminalSession::new(config.terminal.max_history),
                stepper: SteppingController::new(),
                pending_program: None,
                generation: 0,
                running: false,
                focus_request: None,
                connection: ConnectionState::Disconnected,
            },
            outbound: None,
        };
        orchestrator.set_source(language.example_program());
        orchestrator
    }

    /// Replace the classifier, e.g. to add custom rules
    pub fn with_classifier(mut self, classifier: ComplexityClassifier) -> Self {
        self.classifier = classifier;
        let source = std::mem::take(&mut self.session.source);
        self.set_source(&source);
        self
    }

    /// Session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Shared backend, for performing tickets on another task
    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    /// Replace the source text; classification and curve follow immediately
    pub fn set_source(&mut self, source: &str) {
        self.session.source = source.to_string();
        self.session.complexity = self.classifier.classify(source);
        self.session.analysis_source = AnalysisSource::Local;
        self.session.metrics = None;
        self.regenerate_curve();
        debug!(
            "Source updated: time {}, space {}",
            self.session.complexity.time, self.session.complexity.space
        );
    }

    /// Change the display language
    pub fn set_language(&mut self, language: Language) {
        self.session.language = language;
    }

    /// Switch language and load its example program
    pub fn load_example(&mut self, language: Language) {
        self.set_language(language);
        self.set_source(language.example_program());
    }

    fn regenerate_curve(&mut self) {
        self.session.curve = self.curve_generator.generate(self.session.complexity.time);
    }

    /// Start a run of the current source
    ///
    /// Clears the terminal, writes `Running code...`, asks for the terminal
    /// view, empties the trace and supersedes any earlier run.
    pub fn begin_run(&mut self) -> RunTicket {
        let session = &mut self.session;
        session.generation += 1;
        session.running = true;
        session.terminal.clear();
        session.terminal.push_system(RUNNING_LINE);
        session.focus_request = Some(View::Terminal);
        session.stepper.clear();
        session.pending_program = None;

        info!("Starting run {}", session.generation);
        RunTicket {
            generation: session.generation,
            source: session.source.clone(),
            language: session.language,
        }
    }

    /// Fold a run outcome into the session
    ///
    /// Returns `false` and changes nothing when a newer run has started.
    pub fn apply_run(&mut self, outcome: RunOutcome) -> bool {
        if outcome.generation != self.session.generation {
            debug!(
                "Discarding stale run {} (current run is {})",
                outcome.generation, self.session.generation
            );
            return false;
        }
        self.session.running = false;

        let result = match outcome.execution {
            Ok(result) => result,
            Err(e) => {
                self.session.terminal.push_error(e);
                return true;
            }
        };

        if let Some(output) = &result.output {
            self.session.terminal.push_stdout(output);
        }
        match &result.error {
            Some(message) => self.session.terminal.push_error(message),
            None => {
                let prompt = input_prompt(&outcome.source);
                if prompt.is_some() {
                    self.session.pending_program = Some(outcome.source.clone());
                }
                self.session.terminal.set_prompt(prompt);
            }
        }

        match outcome.analysis {
            Some(Ok(analysis)) => self.apply_analysis(analysis),
            Some(Err(e)) => {
                warn!("Analysis failed: {}", e);
                self.session.terminal.push_error(format!("Analysis failed: {e}"));
            }
            None => {}
        }

        match outcome.trace {
            Some(Ok(trace)) => self.session.stepper.reset(trace),
            Some(Err(e)) => {
                warn!("Trace failed: {}", e);
                self.session.terminal.push_error(format!("Trace failed: {e}"));
            }
            None => {}
        }

        true
    }

    fn apply_analysis(&mut self, analysis: CodeAnalysis) {
        if let Some(message) = analysis.error {
            warn!("Analysis reported an error: {}", message);
            self.session.terminal.push_error(format!("Analysis failed: {message}"));
            return;
        }

        match analysis.complexity.parse::<ComplexityClass>() {
            Ok(class) => {
                debug!("Remote analysis: {} (local {})", class, self.session.complexity.time);
                self.session.complexity.time = class;
                self.session.analysis_source = AnalysisSource::Remote;
                self.regenerate_curve();
            }
            Err(e) => debug!("Keeping local classification: {}", e),
        }
        if analysis.metrics.is_some() {
            self.session.metrics = analysis.metrics;
        }
    }

    /// Run `source` to completion
    ///
    /// Returns `false` if the outcome was superseded by a newer run.
    pub async fn run(&mut self, source: &str, language: Language) -> bool {
        self.set_language(language);
        self.set_source(source);
        let ticket = self.begin_run();
        let backend = Arc::clone(&self.backend);
        let outcome = ticket.perform(backend.as_ref()).await;
        self.apply_run(outcome)
    }

    /// Handle a line typed into the terminal
    ///
    /// While a program awaits input the line is its answer. Otherwise it is
    /// forwarded over the terminal stream when one is connected.
    pub fn submit_input(&mut self, line: &str) -> InputOutcome {
        let line = line.trim_end_matches(['\r', '\n']);

        if self.session.terminal.is_awaiting_input() {
            self.session.terminal.push_echo(line);
            let program = self.session.pending_program.as_deref().unwrap_or(&self.session.source);
            return match continue_program(program, line) {
                Ok(lines) => {
                    let count = lines.len();
                    for output in lines {
                        self.session.terminal.push(LineOrigin::Stdout, output);
                    }
                    self.session.terminal.set_prompt(None);
                    self.session.pending_program = None;
                    info!("Program finished locally with {} lines", count);
                    InputOutcome::Completed(count)
                }
                Err(e) => {
                    debug!("Rejected input {:?}: {}", line, e);
                    self.session.terminal.push_error(&e);
                    InputOutcome::Rejected(e)
                }
            };
        }

        let sent = self.session.connection == ConnectionState::Connected
            && self.outbound.as_ref().is_some_and(|tx| tx.send(line.to_string()).is_ok());
        if sent {
            self.session.terminal.push_echo(line);
            InputOutcome::Forwarded
        } else {
            self.session.terminal.push_system(NOT_CONNECTED_LINE);
            InputOutcome::NotConnected
        }
    }

    /// Route non-answer input to a terminal stream
    pub fn attach_terminal(&mut self, outbound: UnboundedSender<String>) {
        self.outbound = Some(outbound);
    }

    /// Stop routing input to the terminal stream; drops the sender
    pub fn detach_terminal(&mut self) {
        self.outbound = None;
        self.session.connection = ConnectionState::Disconnected;
    }

    /// Apply a terminal socket notification
    pub fn handle_socket_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::State(state) => {
                debug!("Terminal connection: {}", state);
                self.session.connection = state;
            }
            SocketEvent::Line(line) => self.session.terminal.push_stdout(&line),
        }
    }

    /// Take the pending view switch, if any
    pub fn take_focus_request(&mut self) -> Option<View> {
        self.session.focus_request.take()
    }

    /// Advance the trace cursor
    pub fn next_step(&mut self) -> Option<&ExecutionStep> {
        self.session.stepper.next()
    }

    /// Move the trace cursor back
    pub fn previous_step(&mut self) -> Option<&ExecutionStep> {
        self.session.stepper.previous()
    }

    /// Step under the trace cursor
    pub fn current_step(&self) -> Option<&ExecutionStep> {
        self.session.stepper.current_step()
    }

    /// Rewind the trace cursor to the first step
    pub fn rewind(&mut self) {
        let trace = self.session.stepper.trace().clone();
        self.session.stepper.reset(trace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use tokio::sync::mpsc;

    const FIBONACCI: &str = r#"# Fibonacci sequence
n = int(input("How many terms? "))
a, b = 0, 1
for _ in range(n):
    print(a, end=" ")
    a, b = b, a + b
"#;

    fn orchestrator() -> ExecutionOrchestrator<MockBackend> {
        ExecutionOrchestrator::new(Arc::new(MockBackend::new()), &ClientConfig::default())
    }

    #[test]
    fn test_initial_session() {
        let orchestrator = orchestrator();
        let session = orchestrator.session();
        assert_eq!(session.language(), Language::Python);
        assert_eq!(session.complexity().time, ComplexityClass::Quadratic);
        assert_eq!(session.curve().len(), 10);
        assert!(session.terminal().is_empty());
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_source_change_reclassifies() {
        let mut orchestrator = orchestrator();
        orchestrator.set_source("x = 1");
        assert_eq!(orchestrator.session().complexity().time, ComplexityClass::Constant);
        assert_eq!(orchestrator.session().curve().class(), ComplexityClass::Constant);
    }

    #[test]
    fn test_begin_run_resets_session() {
        let mut orchestrator = orchestrator();
        orchestrator.session.terminal.push_system("old");
        orchestrator.session.stepper.reset(crate::backend::mock_trace("range", Language::Python));

        let ticket = orchestrator.begin_run();
        assert_eq!(ticket.generation(), 1);
        assert_eq!(orchestrator.session().terminal().rendered(), [RUNNING_LINE]);
        assert!(orchestrator.session().stepper().is_empty());
        assert!(orchestrator.session().is_running());
        assert_eq!(orchestrator.take_focus_request(), Some(View::Terminal));
        assert_eq!(orchestrator.take_focus_request(), None);
    }

    #[tokio::test]
    async fn test_stale_outcome_is_discarded() {
        let mut orchestrator = orchestrator();
        let backend = orchestrator.backend();

        let first = orchestrator.begin_run();
        let second = orchestrator.begin_run();

        let late = first.perform(backend.as_ref()).await;
        assert!(!orchestrator.apply_run(late));
        assert!(orchestrator.session().is_running());
        assert!(orchestrator.session().stepper().is_empty());

        let current = second.perform(backend.as_ref()).await;
        assert!(orchestrator.apply_run(current));
        assert!(!orchestrator.session().is_running());
        assert_eq!(orchestrator.session().stepper().len(), 3);
    }

    #[tokio::test]
    async fn test_fibonacci_continuation() {
        let mut orchestrator = orchestrator();
        assert!(orchestrator.run(FIBONACCI, Language::Python).await);
        assert!(orchestrator.session().terminal().is_awaiting_input());
        assert_eq!(orchestrator.session().terminal().prompt(), Some("How many terms? "));

        assert_eq!(orchestrator.submit_input("abc"), InputOutcome::Rejected(
            InputError::NotAnInteger { input: "abc".to_string() }
        ));
        assert!(orchestrator.session().terminal().is_awaiting_input());
        let last = orchestrator.session().terminal().last().unwrap().to_string();
        assert!(last.starts_with("Error:"), "{last}");

        assert_eq!(orchestrator.submit_input("5\n"), InputOutcome::Completed(1));
        assert!(!orchestrator.session().terminal().is_awaiting_input());
        assert_eq!(orchestrator.session().terminal().last().unwrap().text, "0 1 1 2 3");
    }

    #[test]
    fn test_input_without_terminal() {
        let mut orchestrator = orchestrator();
        assert_eq!(orchestrator.submit_input("ls"), InputOutcome::NotConnected);
        assert_eq!(orchestrator.session().terminal().rendered(), [NOT_CONNECTED_LINE]);
    }

    #[test]
    fn test_input_forwarded_when_connected() {
        let mut orchestrator = orchestrator();
        let (tx, mut rx) = mpsc::unbounded_channel();
        orchestrator.attach_terminal(tx);

        // attached but not connected yet
        assert_eq!(orchestrator.submit_input("1"), InputOutcome::NotConnected);

        orchestrator.handle_socket_event(SocketEvent::State(ConnectionState::Connected));
        assert_eq!(orchestrator.submit_input("2"), InputOutcome::Forwarded);
        assert_eq!(rx.try_recv().unwrap(), "2");

        orchestrator.handle_socket_event(SocketEvent::Line("hello\nworld".to_string()));
        let rendered = orchestrator.session().terminal().rendered();
        assert_eq!(rendered[rendered.len() - 3..], ["> 2", "hello", "world"]);

        orchestrator.detach_terminal();
        assert_eq!(orchestrator.submit_input("3"), InputOutcome::NotConnected);
    }

    #[tokio::test]
    async fn test_stepping_passthrough() {
        let mut orchestrator = orchestrator();
        let example = Language::Python.example_program();
        orchestrator.run(example, Language::Python).await;

        assert_eq!(orchestrator.current_step().map(|s| s.line_number), Some(2));
        orchestrator.next_step();
        orchestrator.next_step();
        orchestrator.next_step();
        assert_eq!(orchestrator.current_step().map(|s| s.line_number), Some(6));
        orchestrator.previous_step();
        assert_eq!(orchestrator.current_step().map(|s| s.line_number), Some(4));
        orchestrator.rewind();
        assert_eq!(orchestrator.session().stepper().position(), Some(0));
    }
}
