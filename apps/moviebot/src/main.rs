use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{render, HttpRemoteService, Locale, SessionController, SessionOptions};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    task::JoinSet,
};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod terminal;

use commands::{InputCommand, HELP};
use terminal::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(name = "moviebot", about = "Chat with the movie recommendation service")]
struct Args {
    /// TOML settings file (defaults to ./moviebot.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    backend_url: Option<String>,
    /// th or en
    #[arg(long)]
    locale: Option<Locale>,
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(url) = args.backend_url {
        settings.backend_url = url;
    }
    if let Some(locale) = args.locale {
        settings.locale = locale;
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout_secs = secs;
    }

    let api_base = settings.api_base()?;
    tracing::info!(%api_base, locale = %settings.locale, "moviebot: starting");

    let controller = SessionController::with_options(
        Arc::new(HttpRemoteService::new(api_base)),
        SessionOptions {
            locale: settings.locale,
            call_timeout: settings.request_timeout(),
        },
    );

    let snapshots = controller.snapshot_stream();
    let render_task = tokio::spawn(async move {
        let mut renderer = TerminalRenderer::new(std::io::stdout());
        render::run_renderers(snapshots, &mut renderer).await;
    });

    run_session(Arc::clone(&controller), BufReader::new(tokio::io::stdin())).await?;

    // The last controller handle closes the snapshot stream, letting the
    // renderer paint the final state and return.
    drop(controller);
    render_task.await.context("render task failed")?;
    Ok(())
}

/// Drives the controller from input lines until EOF or `/quit`, then waits
/// for any recommend still in flight.
async fn run_session<R>(controller: Arc<SessionController>, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut in_flight = JoinSet::new();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = InputCommand::parse(&line);
        tracing::debug!(command = command.name(), "moviebot: input");
        match command {
            InputCommand::Send(text) => {
                controller.update_pending_input(text.as_str());
                controller.submit(&text).await;
            }
            InputCommand::Recommend => {
                // Runs in the background so chat and reset stay available.
                let controller = Arc::clone(&controller);
                in_flight.spawn(async move { controller.recommend().await });
            }
            InputCommand::Reset => {
                controller.reset().await;
            }
            InputCommand::Help => println!("{HELP}"),
            InputCommand::Quit => break,
            InputCommand::Unknown(raw) => println!("unknown command {raw}, try /help"),
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        let outcome = joined.context("recommend task failed")?;
        tracing::debug!(?outcome, "moviebot: recommend settled after input closed");
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
