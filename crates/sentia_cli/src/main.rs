mod commands;

use anyhow::Context;
use clap::Parser;
use commands::{format_history_line, format_summary, format_turn, Command, HELP};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sentia_core::{export, SentiaConfig};
use sentia_limbic::status_report;
use sentia_reasoning::{providers, Session};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "sentia.toml", env = "SENTIA_CONFIG")]
    config: PathBuf,

    /// Text generator: "openrouter" or "heuristic"
    #[arg(short, long)]
    provider: Option<String>,

    /// Model name passed to the HTTP generator
    #[arg(short, long)]
    model: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Run these turns non-interactively, print each record as JSON, and exit
    #[arg(long = "turn", value_name = "TEXT")]
    turns: Vec<String>,
}

fn init_logging(args: &Args) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "sentia.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            if args.log_json {
                registry.with(fmt::layer().json().with_writer(writer)).init();
            } else {
                registry
                    .with(fmt::layer().with_ansi(false).with_writer(writer))
                    .init();
            }
            Some(guard)
        }
        None => {
            if args.log_json {
                registry
                    .with(fmt::layer().json().with_writer(std::io::stderr))
                    .init();
            } else {
                registry.with(fmt::layer().with_writer(std::io::stderr)).init();
            }
            None
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<SentiaConfig> {
    let mut config = SentiaConfig::load_or_default(&args.config)
        .with_context(|| format!("Invalid config file {}", args.config.display()))?;
    if let Some(provider) = &args.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }
    Ok(config)
}

fn export_history(session: &Session, path: &Path) -> anyhow::Result<()> {
    let is_jsonl = path.extension().and_then(|e| e.to_str()) == Some("jsonl");
    let written = if is_jsonl {
        export::write_jsonl(path, session.history())
    } else {
        export::write_json(path, session.history())
    };
    written.with_context(|| format!("Failed to export history to {}", path.display()))
}

async fn run_turns(session: &mut Session, turns: &[String]) -> anyhow::Result<()> {
    for text in turns {
        let record = session.submit_turn(text).await?;
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}

async fn repl(session: &mut Session) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new().context("Failed to initialise line editor")?;
    println!("Sentia is listening. Type 'help' for commands, 'quit' to leave.");

    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        let command = Command::parse(&line);
        if !matches!(command, Command::Empty) {
            let _ = rl.add_history_entry(line.trim());
        }

        match command {
            Command::Quit => break,
            Command::Empty => {}
            Command::Help => println!("{}", HELP),
            Command::Reset => {
                session.reset();
                println!("History cleared; affect back at baseline.");
            }
            Command::History => {
                if session.history().is_empty() {
                    println!("No turns yet.");
                }
                for record in session.history() {
                    println!("{}", format_history_line(record));
                }
            }
            Command::Metrics => {
                let window = session.config().metrics_window;
                println!("{}", format_summary(&session.summary(window)));
            }
            Command::Status => {
                println!("{}", status_report(session.affect()));
                let attending: Vec<String> = session
                    .working_set()
                    .iter()
                    .map(|a| format!("{} ({:.2})", a.id(), a.effective_salience))
                    .collect();
                if attending.is_empty() {
                    println!("attending: nothing");
                } else {
                    println!("attending: {}", attending.join(", "));
                }
            }
            Command::ExportMissingPath => println!("Usage: export <path>"),
            Command::Export(path) => match export_history(session, &path) {
                Ok(()) => println!(
                    "Wrote {} turn(s) to {}",
                    session.history().len(),
                    path.display()
                ),
                Err(e) => {
                    error!("{:#}", e);
                    println!("Export failed: {:#}", e);
                }
            },
            Command::Turn(text) => match session.submit_turn(&text).await {
                Ok(record) => println!("\n{}\n", format_turn(&record)),
                Err(e) => {
                    error!("Turn failed: {}", e);
                    println!("\n[error] {}\n", e);
                }
            },
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_logging(&args);

    let config = load_config(&args)?;
    info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        "Starting Sentia"
    );

    let generator = providers::build_generator(&config.llm, config.session.generation_timeout())?;
    let classifier = providers::build_classifier();
    let mut session = Session::start(config.session, classifier, generator)
        .context("Failed to start session")?;

    if args.turns.is_empty() {
        repl(&mut session).await
    } else {
        run_turns(&mut session, &args.turns).await
    }
}
