use clap::{Parser, Subcommand};

/// Terminal front end for the marquee message scheduler.
///
/// Messages are rendered one at a time; low-priority bursts are squeezed
/// into the configured time budget.
#[derive(Parser, Debug)]
#[command(name = "marquee", version, about = "Priority-aware status message queue")]
pub struct CliArgs {
    /// Path to config file (default: ~/.config/marquee/config.toml)
    #[arg(long, env = "MARQUEE_CONFIG")]
    pub config: Option<String>,

    /// Budget for combined low-priority display time, in milliseconds
    #[arg(long)]
    pub max_timeout_ms: Option<u64>,

    /// Queue a message even if identical text is already pending
    #[arg(long)]
    pub allow_duplicates: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Queue five low-priority messages against a 5 second budget
    Demo,

    /// Queue one or more messages and wait until they have been shown
    Send {
        /// Message text (repeat for several messages)
        #[arg(required = true)]
        messages: Vec<String>,

        /// Requested display time per message, in milliseconds
        #[arg(long, default_value_t = 2000)]
        duration_ms: u64,

        /// Higher values display first
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        priority: i64,
    },

    /// Show a message immediately, bypassing the queue
    Now {
        message: String,

        /// Display time in milliseconds
        #[arg(long, default_value_t = 2000)]
        duration_ms: u64,
    },
}
