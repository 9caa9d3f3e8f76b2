//! CLI entrypoint for llm-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    CompositeEventSink, ConversationLogger, CouncilEventSink, NoConversationLogger,
    RunCouncilInput, RunCouncilUseCase,
};
use council_domain::{CouncilConfig, CouncilEvent, ExecutionMode, FeatureFlags, Question, WorkerId};
use council_infrastructure::{ConfigLoader, FileConfig, JsonlConversationLogger, OpenRouterGateway};
use council_presentation::{
    Cli, ConsoleFormatter, JsonLinesEventSink, OutputConfig, OutputFormatter, ProgressMode,
    ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        return show_config(&cli);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?
    };

    let log_file = cli.log_file.as_deref().or(config.logging.file.as_deref());
    let _guard = init_logging(cli.verbose, log_file)?;

    info!("Starting llm-council");

    check_config(&config)?;

    let output = OutputConfig::resolve(
        &cli,
        config.output.format,
        config.output.color,
        config.output.show_progress,
        std::io::stderr().is_terminal(),
    );
    if !output.color {
        colored::control::set_override(false);
    }

    let question = match cli.question.as_deref() {
        Some(q) => Question::new(q)?,
        None => bail!("Question is required."),
    };

    let features = FeatureFlags::none()
        .with_web_search(cli.web_search)
        .with_coding_mode(cli.coding);
    let council = council_config(&cli, &config, features);
    let mode = if cli.quorum || config.council.quorum {
        ExecutionMode::QuorumAccelerated
    } else {
        ExecutionMode::Batch
    };

    // === Dependency Injection ===
    let gateway = Arc::new(
        OpenRouterGateway::from_config(&config.openrouter)?
            .with_browse_capable(config.browse_capable()),
    );

    let logger: Arc<dyn ConversationLogger> = match config
        .logging
        .runs_path()
        .and_then(JsonlConversationLogger::open)
    {
        Some(logger) => Arc::new(logger),
        None => Arc::new(NoConversationLogger),
    };

    let use_case = RunCouncilUseCase::new(gateway)
        .with_timeouts(config.council.timeouts())
        .with_logger(logger);

    let input = RunCouncilInput::new(question, council)
        .with_mode(mode)
        .with_features(features)
        .with_title(cli.title);

    let events = event_sink(&output);
    let outcome = match use_case.execute_with_events(input, events.clone()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            events.emit(&CouncilEvent::Error {
                message: e.to_string(),
            });
            return Err(e.into());
        }
    };

    if !output.events {
        println!("{}", ConsoleFormatter.render(&outcome, output.format));
    }

    Ok(())
}

/// Initialize logging based on verbosity level, optionally teeing into a file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
            let file_name = path
                .file_name()
                .with_context(|| format!("invalid log file path {}", path.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Print every config issue; fail when any of them is an error.
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("{}: {}", issue.field, issue.message);
    }

    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| format!("  {}: {}", i.field, i.message))
        .collect();
    if !errors.is_empty() {
        bail!("invalid configuration:\n{}", errors.join("\n"));
    }
    Ok(())
}

/// Council snapshot from the file configuration with CLI overrides applied.
fn council_config(cli: &Cli, config: &FileConfig, features: FeatureFlags) -> CouncilConfig {
    let mut council = config.council_snapshot(features);
    if !cli.model.is_empty() {
        council.council = cli.model.iter().map(|m| WorkerId::new(m.trim())).collect();
    }
    if let Some(chairman) = &cli.chairman {
        council.chairman = WorkerId::new(chairman.trim());
    }
    council
}

fn event_sink(output: &OutputConfig) -> Arc<dyn CouncilEventSink> {
    let mut sink = CompositeEventSink::new();
    if output.events {
        sink = sink.with(Arc::new(JsonLinesEventSink::stdout()));
    }
    match output.progress {
        ProgressMode::Bars => sink = sink.with(Arc::new(ProgressReporter::new())),
        ProgressMode::Lines => sink = sink.with(Arc::new(SimpleProgress)),
        ProgressMode::Hidden => {}
    }
    Arc::new(sink)
}

fn show_config(cli: &Cli) -> Result<()> {
    println!("Configuration sources (lowest to highest priority):");
    for source in ConfigLoader::describe_sources(cli.config.as_deref()) {
        println!("  {}", source);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?
    };

    println!();
    println!("Effective configuration:");
    println!("{}", toml::to_string_pretty(&config)?);

    for issue in config.validate() {
        println!("{:?} {}: {}", issue.severity, issue.field, issue.message);
    }
    Ok(())
}
