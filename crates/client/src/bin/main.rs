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

//! CodeViz - Algorithm Playground
//!
//! Command line front end: classify programs, run them against an
//! execution service, answer their input and walk through their traces.

use clap::{Parser, Subcommand};
use codeviz_client::{
    api, ClientConfig, ExecutionBackend, ExecutionOrchestrator, HttpBackend, TerminalSession,
};
use codeviz_common::{logging, ComplexityClass, Language};
use codeviz_engine::{ComplexityClassifier, GrowthCurveGenerator};
use eyre::{eyre, Context, Result};
use itertools::Itertools;
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Level;

/// Command-line interface for CodeViz
#[derive(Debug, Parser)]
#[command(name = "codeviz")]
#[command(about = "Algorithm playground - complexity analysis, execution and step-by-step traces")]
#[command(version)]
struct Cli {
    /// Config file path (uses ~/.codeviz.toml if not specified)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to the console and to a log file
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify a program and print its growth curve
    Classify {
        /// Source file
        file: PathBuf,
    },
    /// Run a program and walk through its trace
    Run {
        /// Source file
        file: PathBuf,
        /// Display language (guessed from the file extension by default)
        #[arg(long)]
        language: Option<Language>,
        /// Use the offline backend instead of the execution service
        #[arg(long)]
        offline: bool,
        /// Execution service base URL
        #[arg(long, env = "CODEVIZ_ENDPOINT")]
        url: Option<String>,
        /// Print every trace step after the run
        #[arg(long)]
        steps: bool,
    },
    /// Print the bundled example program of a language
    Example {
        /// Language name
        language: Language,
    },
    /// Attach to the live terminal stream
    Terminal {
        /// Terminal WebSocket URL
        #[arg(long, env = "CODEVIZ_TERMINAL_URL")]
        url: Option<String>,
    },
    /// Check that the execution service is up
    Health {
        /// Execution service base URL
        #[arg(long, env = "CODEVIZ_ENDPOINT")]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if cli.verbose {
        if let Some(dir) = logging::init_logging("codeviz", true)? {
            eprintln!("CodeViz logs: {}", dir.display());
        }
    } else {
        logging::init_simple_logging(Level::WARN)?;
    }

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_from_path(path)?,
        None => ClientConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {}", e);
            ClientConfig::default()
        }),
    };
    config.apply_env_overrides();

    match cli.command {
        Commands::Classify { file } => classify(&file, &config),
        Commands::Run { file, language, offline, url, steps } => {
            if let Some(url) = url {
                config.endpoint.base_url = url;
            }
            let (source, language) = read_program(&file, language)?;
            if offline {
                run_program(api::offline_orchestrator(&config), &source, language, steps).await
            } else {
                run_program(api::remote_orchestrator(&config)?, &source, language, steps).await
            }
        }
        Commands::Example { language } => {
            println!("{}", language.example_program());
            Ok(())
        }
        Commands::Terminal { url } => {
            if let Some(url) = url {
                config.endpoint.terminal_url = url;
            }
            attach_terminal(&config).await
        }
        Commands::Health { url } => {
            if let Some(url) = url {
                config.endpoint.base_url = url;
            }
            let backend = HttpBackend::from_config(&config)?;
            let health = backend.health_check().await?;
            println!("{} is healthy: {}", backend.base_url(), health);
            Ok(())
        }
    }
}

fn read_program(file: &Path, language: Option<Language>) -> Result<(String, Language)> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read source file: {file:?}"))?;
    let language = language.or_else(|| Language::from_path(file)).unwrap_or_default();
    Ok((source, language))
}

fn classify(file: &Path, config: &ClientConfig) -> Result<()> {
    let (source, language) = read_program(file, None)?;
    let classifier = ComplexityClassifier::default();
    let classification = classifier.explain(&source);
    let metrics = classifier.metrics(&source);

    println!("Language: {}", language.display_name());
    println!(
        "Time:     {} ({})",
        classification.complexity.time,
        classification.time_rule.as_deref().unwrap_or("fallback")
    );
    println!(
        "Space:    {} ({})",
        classification.complexity.space,
        classification.space_rule.as_deref().unwrap_or("fallback")
    );
    println!(
        "Metrics:  {}",
        metrics.to_map().iter().map(|(name, value)| format!("{name}={value}")).join(", ")
    );

    let curve = GrowthCurveGenerator::new(config.curve.horizon)
        .generate(classification.complexity.time);
    println!();
    println!(
        "{:>4} {:>10} {}",
        "n",
        "actual",
        ComplexityClass::ALL.iter().map(|class| format!("{:>10}", class.label())).join(" ")
    );
    for point in curve.points() {
        println!(
            "{:>4} {:>10.2} {}",
            point.input_size,
            point.actual_operations,
            ComplexityClass::ALL
                .iter()
                .map(|class| format!("{:>10.2}", point.reference(*class).unwrap_or_default()))
                .join(" ")
        );
    }
    Ok(())
}

/// Print terminal lines written since `cursor` and advance it
fn flush_terminal(terminal: &TerminalSession, cursor: &mut u64) {
    for line in terminal.lines_since(*cursor) {
        println!("{line}");
    }
    *cursor = terminal.cursor();
}

fn show_prompt(terminal: &TerminalSession) -> Result<()> {
    if let Some(prompt) = terminal.prompt() {
        print!("{prompt}");
        std::io::stdout().flush()?;
    }
    Ok(())
}

async fn run_program<B: ExecutionBackend>(
    mut orchestrator: ExecutionOrchestrator<B>,
    source: &str,
    language: Language,
    steps: bool,
) -> Result<()> {
    let mut cursor = 0;
    orchestrator.run(source, language).await;

    let session = orchestrator.session();
    println!("Complexity: {} ({})", session.complexity().time, session.analysis_source());
    flush_terminal(session.terminal(), &mut cursor);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    while orchestrator.session().terminal().is_awaiting_input() {
        show_prompt(orchestrator.session().terminal())?;
        let Some(line) = stdin.next_line().await? else {
            break;
        };
        orchestrator.submit_input(&line);
        flush_terminal(orchestrator.session().terminal(), &mut cursor);
    }

    if steps {
        let total = orchestrator.session().stepper().len();
        let mut index = 0;
        while let Some(step) = orchestrator.current_step() {
            index += 1;
            println!();
            println!("Step {index}/{total} (line {}): {}", step.line_number, step.description);
            for (name, variable) in step.sorted_variables() {
                println!("  {name}: {} = {}", variable.ty, variable.value);
            }
            if let Some(output) = step.output.as_deref().filter(|o| !o.is_empty()) {
                println!("  output: {output}");
            }
            if orchestrator.session().stepper().is_last() {
                break;
            }
            orchestrator.next_step();
        }
    }

    Ok(())
}

async fn attach_terminal(config: &ClientConfig) -> Result<()> {
    let mut orchestrator = api::offline_orchestrator(config);
    let mut handle = api::spawn_terminal(config);
    orchestrator.attach_terminal(handle.outbound.clone());

    let mut cursor = 0;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = handle.events.recv() => {
                let Some(event) = event else { break };
                orchestrator.handle_socket_event(event);
            }
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                orchestrator.submit_input(&line);
            }
        }
        flush_terminal(orchestrator.session().terminal(), &mut cursor);
    }

    orchestrator.detach_terminal();
    drop(handle.outbound);
    handle.task.await.map_err(|e| eyre!("Terminal task failed: {e}"))??;
    Ok(())
}
