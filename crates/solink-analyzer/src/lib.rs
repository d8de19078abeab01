//! # solink-analyzer
//!
//! Analysis orchestration: one entry point that chooses between the
//! out-of-process delegate bridge and the local traversal engine, and
//! normalizes both to the same descriptor tree.
//!
//! The delegate is preferred when configured, since its heavier reader sees
//! layer detail the host facade cannot. Any failure or empty answer falls
//! back silently to the local traversal; the caller only learns about it
//! through the status sink.

pub mod open;
pub mod status;

pub use open::{open_descriptor, open_smart_object_by_id};
pub use status::{LogStatusSink, NullStatusSink, Severity, StatusOptions, StatusSink};

use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use solink_bridge::{BridgeClient, PollOptions};
use solink_error::Result;
use solink_host::{DocumentRef, HostBridge};
use solink_tracer::{LayerDescriptor, SmartObjectTracer, TracerOptions};

/// Where the delegate's shared directory lives and how long to wait on it.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub dir: PathBuf,
    pub poll: PollOptions,
}

impl BridgeSettings {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            poll: PollOptions::default(),
        }
    }
}

/// Options for one analysis strategy selection.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Try the delegate first and keep the traversal engine as fallback.
    pub prefer_delegate: bool,
    pub tracer: TracerOptions,
    pub bridge: Option<BridgeSettings>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            prefer_delegate: true,
            tracer: TracerOptions::default(),
            bridge: None,
        }
    }
}

/// The analysis entry point used by the panel and the CLI.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    options: AnalysisOptions,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Analyze an entry document and return its smart-object tree.
    ///
    /// Whatever path produced it, the result has the same shape, and the
    /// host's open/active state is left as it was found. Only a failure of
    /// both paths surfaces, as a single error.
    pub fn analyze<H: HostBridge>(
        &self,
        host: &mut H,
        entry: &DocumentRef,
        status: &dyn StatusSink,
    ) -> Result<Vec<LayerDescriptor>> {
        if self.options.prefer_delegate {
            match &self.options.bridge {
                Some(bridge) => {
                    status.notify(
                        &format!("Analyzing {} via delegate", entry.name()),
                        Severity::Info,
                        StatusOptions::persistent(),
                    );
                    let client = BridgeClient::new(&bridge.dir).with_poll(bridge.poll);
                    match client.analyze(entry.path()) {
                        Ok(layers) if !layers.is_empty() => {
                            status.notify(
                                "Analysis complete",
                                Severity::Success,
                                StatusOptions::with_ttl(Duration::from_millis(1500)),
                            );
                            return Ok(layers);
                        }
                        Ok(_) => {
                            status.notify(
                                "Delegate returned an empty result, analyzing locally",
                                Severity::Warning,
                                StatusOptions::default(),
                            );
                        }
                        Err(e) => {
                            debug!("delegate analysis failed: {e}");
                            status.notify(
                                "Delegate unavailable, analyzing locally",
                                Severity::Warning,
                                StatusOptions::default(),
                            );
                        }
                    }
                }
                None => {
                    debug!("delegate preferred but no bridge directory configured");
                }
            }
        }

        let tracer = SmartObjectTracer::new().with_options(self.options.tracer);
        tracer.trace_entry(host, entry)
    }
}
