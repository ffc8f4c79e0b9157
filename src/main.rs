//! `gherkin-relay` binary.
//!
//! Replays an NDJSON envelope log through every built-in formatter that the
//! configuration enables.

mod cli;

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use cli::{Cli, IdStyleArg};
use gherkin_relay::{
    FormattersConfigProvider,
    IdGenerator,
    IdReconciler,
    IdStyle,
    MessageBroker,
    Replay,
    RuntimeOptions,
    config::{HostConfigResolver, ProcessEnvironment},
    formatters,
};
use tokio::{
    fs::File,
    io::{self, AsyncBufRead, BufReader},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "replay failed");
            ExitCode::FAILURE
        }
    }
}

/// Replay the log; `Ok(false)` when a formatter failed.
async fn run(cli: Cli) -> gherkin_relay::Result<bool> {
    let provider = Arc::new(FormattersConfigProvider::standard(
        Arc::new(ProcessEnvironment),
        cli.config,
        HostConfigResolver::default(),
    ));
    let mut broker = MessageBroker::new(provider, RuntimeOptions::default());
    for formatter in formatters::builtin() {
        broker.register_boxed(formatter);
    }

    let style = match cli.id_style {
        IdStyleArg::Uuid => IdStyle::Uuid,
        IdStyleArg::Incrementing => IdStyle::Incrementing,
    };
    let mut replay = Replay::new(IdReconciler::new(Arc::new(IdGenerator::for_style(style))));

    let input: Box<dyn AsyncBufRead + Unpin> = match cli.input {
        Some(path) => Box::new(BufReader::new(File::open(path).await?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let replayed = replay.run(input, &mut broker).await;

    let mut clean = true;
    for shutdown in broker.shutdown().await {
        if let Err(e) = shutdown.result {
            tracing::error!(formatter = %shutdown.formatter, error = %e, "formatter failed");
            clean = false;
        }
    }
    let published = replayed?;
    tracing::info!(published, "replay complete");
    Ok(clean)
}
