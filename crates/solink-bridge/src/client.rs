//! Caller side of the delegate bridge: write a request artifact, poll for a
//! matching result.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, trace, warn};
use solink_error::{DelegateErrorKind, Result, SolinkError};
use solink_tracer::LayerDescriptor;

use crate::io::write_json_atomic;
use crate::protocol::{BridgeRequest, BridgeResult, REQUEST_FILE, RESULT_FILE, normalize_layers};

/// Polling budget for one bridge call. The defaults give the delegate about
/// ten seconds to answer.
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            attempts: 50,
            delay: Duration::from_millis(200),
        }
    }
}

/// Client for the file-based analysis protocol.
pub struct BridgeClient {
    dir: PathBuf,
    poll: PollOptions,
}

impl BridgeClient {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            poll: PollOptions::default(),
        }
    }

    pub fn with_poll(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn request_path(&self) -> PathBuf {
        self.dir.join(REQUEST_FILE)
    }

    pub fn result_path(&self) -> PathBuf {
        self.dir.join(RESULT_FILE)
    }

    /// Ask the delegate to analyze `source` and wait for its answer.
    ///
    /// A result is only accepted once its echoed `source` matches the
    /// requested path; leftovers from earlier calls keep getting polled
    /// over until the budget runs out.
    pub fn analyze<P: AsRef<Path>>(&self, source: P) -> Result<Vec<LayerDescriptor>> {
        let source = source.as_ref();
        self.clear_stale_result();
        write_json_atomic(&self.dir, &self.request_path(), &BridgeRequest::analyze(source))?;
        debug!("bridge request written for {}", source.display());

        for attempt in 0..self.poll.attempts {
            if attempt > 0 {
                thread::sleep(self.poll.delay);
            }
            let Some(result) = self.try_read_result(source) else {
                continue;
            };
            if !result.ok {
                let message = result
                    .error
                    .unwrap_or_else(|| "delegate reported failure".to_string());
                return Err(SolinkError::delegate_with_source(
                    message,
                    DelegateErrorKind::Reported,
                    source,
                ));
            }
            debug!(
                "bridge result accepted after {} attempt(s), {} top-level layers",
                attempt + 1,
                result.layers.len()
            );
            return Ok(normalize_layers(result.layers));
        }

        Err(SolinkError::delegate_with_source(
            format!(
                "no valid result after {} attempts for {}",
                self.poll.attempts,
                source.display()
            ),
            DelegateErrorKind::Timeout,
            source,
        ))
    }

    /// Best effort: a missing artifact is fine, anything else is logged and
    /// the call proceeds.
    fn clear_stale_result(&self) {
        match fs::remove_file(self.result_path()) {
            Ok(()) => trace!("removed previous result artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("could not clear previous result artifact: {e}"),
        }
    }

    fn try_read_result(&self, source: &Path) -> Option<BridgeResult> {
        let path = self.result_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("result artifact unreadable: {e}");
                return None;
            }
        };
        let result: BridgeResult = match serde_json::from_str(&text) {
            Ok(result) => result,
            Err(e) => {
                // Possibly a partial write from the delegate; treated as
                // no-result until the budget is exhausted.
                let err = SolinkError::delegate(
                    format!("malformed result artifact: {e}"),
                    DelegateErrorKind::Protocol,
                );
                trace!("{err}");
                return None;
            }
        };
        if !result.answers(source) {
            let err = SolinkError::delegate(
                format!("result answers {:?}, not the current request", result.source),
                DelegateErrorKind::Stale,
            );
            debug!("{err}");
            return None;
        }
        Some(result)
    }
}
