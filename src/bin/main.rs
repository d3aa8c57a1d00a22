use anyhow::Result;
use conscript_core::protocol::{execute, Command, Response};
use conscript_core::{ConscriptEngine, EngineConfig};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// stdout carries protocol responses only; logs go to stderr.
fn init_logging(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let config = EngineConfig::load();
    init_logging(&config);
    tracing::info!(
        config = ?EngineConfig::path(),
        store = ?config.store_path,
        "conscript engine starting"
    );

    let mut engine = ConscriptEngine::from_config(&config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let input = line?;
        if input.trim().is_empty() {
            continue;
        }
        tracing::debug!(input = %input, "received command");

        let (response, exit) = match input.parse::<Command>() {
            Ok(Command::Exit) => (execute(&mut engine, Command::Exit), true),
            Ok(command) => (execute(&mut engine, command), false),
            Err(err) => (Response::failure(&err), false),
        };
        writeln!(stdout, "{}", response.to_line())?;
        stdout.flush()?;
        if exit {
            break;
        }
    }

    tracing::info!("saving lexicon and shutting down");
    if let Err(err) = engine.save() {
        tracing::error!(%err, "could not save lexicon");
    }
    Ok(())
}
