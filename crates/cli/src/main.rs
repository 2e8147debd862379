mod cli;
mod config;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use marquee_queue::{global, Scheduler};

use crate::cli::{CliArgs, Command};
use crate::terminal::TerminalSink;

/// Messages queued by `marquee demo`: one long and four short low-priority
/// messages against a 5 second budget.
const DEMO_MESSAGES: [(&str, u64); 5] = [
    ("first message timeout = 4 sec", 4000),
    ("second message timeout = 2 sec", 2000),
    ("3rd message timeout = 2 sec", 2000),
    ("4th message timeout = 2 sec", 2000),
    ("5th message timeout = 2 sec", 2000),
];

const DEMO_MAX_TIMEOUT: Duration = Duration::from_millis(5000);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let config = config::load(args.config.as_deref()).context("failed to load configuration")?;
    let config = config::apply_args(config, &args)?;

    let sink = TerminalSink::new();
    sink.print_banner(&config)?;

    let scheduler = Scheduler::new(config, Arc::new(sink)).context("failed to start scheduler")?;
    let scheduler = global::install(scheduler)?;

    match args.command {
        Command::Demo => {
            scheduler
                .set_max_timeout(DEMO_MAX_TIMEOUT)
                .context("failed to set demo budget")?;
            for (message, timeout_ms) in DEMO_MESSAGES {
                scheduler.enqueue_default(message, Duration::from_millis(timeout_ms));
            }
        }
        Command::Send {
            messages,
            duration_ms,
            priority,
        } => {
            for message in messages {
                let outcome =
                    scheduler.enqueue(message, Duration::from_millis(duration_ms), priority);
                info!(?outcome, "enqueued");
            }
        }
        Command::Now {
            message,
            duration_ms,
        } => {
            scheduler.show_now(message, Duration::from_millis(duration_ms));
        }
    }

    scheduler.idle().await;
    info!("all messages shown");
    Ok(())
}
