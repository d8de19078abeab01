// Utility functions for CLI

use owo_colors::OwoColorize;
use solink_analyzer::{Severity, StatusOptions, StatusSink};

/// Output handler that respects quiet mode
pub struct OutputHandler {
    quiet: bool,
}

impl OutputHandler {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print explanatory text (suppressed in quiet mode)
    pub fn print_info(&self, text: &str) {
        if !self.quiet {
            println!("{text}");
        }
    }

    /// Print raw results (always shown)
    pub fn print_result(&self, text: &str) {
        println!("{text}");
    }

    /// Print to stderr (always shown)
    pub fn print_error(&self, text: &str) {
        eprintln!("{text}");
    }
}

/// Status sink that plays the panel's status bar: one line per notification
/// on stderr, colored when stderr is a terminal.
pub struct CliStatusSink {
    quiet: bool,
    color: bool,
}

impl CliStatusSink {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            color: isatty::stderr_isatty(),
        }
    }
}

impl StatusSink for CliStatusSink {
    fn notify(&self, message: &str, severity: Severity, _options: StatusOptions) {
        if self.quiet && severity != Severity::Error {
            return;
        }
        let tag = match severity {
            Severity::Info => "info",
            Severity::Success => "ok",
            Severity::Warning => "warn",
            Severity::Error => "error",
        };
        if self.color {
            let colored = match severity {
                Severity::Info => tag.blue().to_string(),
                Severity::Success => tag.green().to_string(),
                Severity::Warning => tag.yellow().to_string(),
                Severity::Error => tag.red().to_string(),
            };
            eprintln!("[{colored}] {message}");
        } else {
            eprintln!("[{tag}] {message}");
        }
    }
}
