//! Status notifications for the UI collaborator.
//!
//! The panel rendering the analysis owns presentation; this side only emits
//! `(message, severity, persist/ttl)` triples through a sink.

use std::time::Duration;

use log::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Presentation hints for one notification. Transient messages revert after
/// `ttl`; persistent ones stay until replaced.
#[derive(Debug, Clone, Copy)]
pub struct StatusOptions {
    pub persist: bool,
    pub ttl: Duration,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            persist: false,
            ttl: Duration::from_millis(2000),
        }
    }
}

impl StatusOptions {
    pub fn persistent() -> Self {
        Self {
            persist: true,
            ..Self::default()
        }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            persist: false,
            ttl,
        }
    }
}

/// Where analysis progress messages go.
pub trait StatusSink {
    fn notify(&self, message: &str, severity: Severity, options: StatusOptions);
}

/// Discards every notification.
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn notify(&self, _message: &str, _severity: Severity, _options: StatusOptions) {}
}

/// Routes notifications into the `log` facade.
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn notify(&self, message: &str, severity: Severity, _options: StatusOptions) {
        match severity {
            Severity::Info | Severity::Success => info!("{message}"),
            Severity::Warning => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }
    }
}
