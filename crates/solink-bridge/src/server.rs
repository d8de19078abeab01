//! Worker side of the delegate bridge: poll for a request artifact, answer
//! it, remove it.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use solink_error::{Result, SolinkError};

use crate::io::write_json_atomic;
use crate::protocol::{BridgeRequest, BridgeResult, REQUEST_FILE, RESULT_FILE, WireLayer};

/// The analysis a delegate performs on behalf of the bridge.
pub trait DelegateAnalyzer {
    fn analyze(&mut self, path: &Path) -> Result<Vec<WireLayer>>;
}

impl<F> DelegateAnalyzer for F
where
    F: FnMut(&Path) -> Result<Vec<WireLayer>>,
{
    fn analyze(&mut self, path: &Path) -> Result<Vec<WireLayer>> {
        self(path)
    }
}

/// Serves the file protocol from the delegate's side of the shared
/// directory.
pub struct BridgeServer<A> {
    dir: PathBuf,
    analyzer: A,
}

impl<A: DelegateAnalyzer> BridgeServer<A> {
    pub fn new<P: Into<PathBuf>>(dir: P, analyzer: A) -> Self {
        Self {
            dir: dir.into(),
            analyzer,
        }
    }

    pub fn request_path(&self) -> PathBuf {
        self.dir.join(REQUEST_FILE)
    }

    pub fn result_path(&self) -> PathBuf {
        self.dir.join(RESULT_FILE)
    }

    /// Handle at most one pending request. Returns whether one was handled.
    ///
    /// Analyzer failures are answered over the protocol (`ok = false`), not
    /// returned; only problems with the shared directory itself error out.
    pub fn poll_once(&mut self) -> Result<bool> {
        let request_path = self.request_path();
        let text = match fs::read_to_string(&request_path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(SolinkError::io_with_path(
                    format!("could not read request artifact: {e}"),
                    request_path,
                ));
            }
        };

        let result = match serde_json::from_str::<BridgeRequest>(&text) {
            Err(e) => BridgeResult::failure("", format!("malformed request: {e}")),
            Ok(request) if !request.is_analyze() => {
                let message = format!("unsupported command {:?}", request.cmd);
                BridgeResult::failure(request.path, message)
            }
            Ok(request) => {
                debug!("delegate analyzing {}", request.path);
                match self.analyzer.analyze(Path::new(&request.path)) {
                    Ok(layers) => BridgeResult::success(request.path, layers),
                    Err(e) => BridgeResult::failure(request.path, e.to_string()),
                }
            }
        };

        write_json_atomic(&self.dir, &self.result_path(), &result)?;
        if let Err(e) = fs::remove_file(&request_path) {
            warn!("could not remove handled request artifact: {e}");
        }
        Ok(true)
    }

    /// Poll until one request has been handled.
    pub fn serve_one(&mut self, interval: Duration) -> Result<()> {
        loop {
            if self.poll_once()? {
                return Ok(());
            }
            thread::sleep(interval);
        }
    }

    /// Poll forever. Only returns on an error with the shared directory.
    pub fn run(&mut self, interval: Duration) -> Result<()> {
        loop {
            if !self.poll_once()? {
                thread::sleep(interval);
            }
        }
    }
}
