use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};
use std::time::Duration;

use marquee_queue::{DisplaySink, SchedulerConfig};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const TIMESTAMP: Color = Color::DarkGrey;
    const MESSAGE: Color = Color::Cyan;
    const DURATION: Color = Color::Yellow;
    const HEADER: Color = Color::Magenta;
}

/// Renders each scheduled message as one line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

impl TerminalSink {
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner.
    pub fn print_banner(&self, config: &SchedulerConfig) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("marquee"),
            ResetColor,
            SetForegroundColor(Colors::TIMESTAMP),
            Print(format!(
                " budget={}ms threshold={} skip_duplicates={}\n",
                config.max_timeout_ms,
                config.low_priority_threshold,
                config.skip_duplicate_messages
            )),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    fn render(&self, message: &str, duration: Duration) -> io::Result<()> {
        let mut stdout = io::stdout();
        let now = chrono::Local::now().format("%H:%M:%S%.3f");
        execute!(
            stdout,
            SetForegroundColor(Colors::TIMESTAMP),
            Print(format!("{now} ")),
            SetForegroundColor(Colors::MESSAGE),
            Print(message),
            SetForegroundColor(Colors::DURATION),
            Print(format!(" ({}ms)\n", duration.as_millis())),
            ResetColor,
        )?;
        stdout.flush()
    }
}

impl DisplaySink for TerminalSink {
    fn display(&self, message: &str, duration: Duration) {
        if let Err(e) = self.render(message, duration) {
            tracing::warn!(error = %e, "failed to write message to terminal");
        }
    }
}
