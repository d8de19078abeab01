use std::path::{Path, PathBuf};
use std::time::Duration;

use solink_bridge::{BridgeServer, DelegateAnalyzer, REQUEST_FILE, WireLayer};
use solink_error::Result;
use solink_host::{DocumentManifest, DocumentRef, MemoryHost};
use solink_tracer::{SmartObjectTracer, TracerOptions};

use crate::util::OutputHandler;

/// Delegate worker backed by a document manifest: every request is answered
/// by a fresh traversal over its own host instance, so serving never
/// interferes with any other host state.
struct ManifestAnalyzer {
    manifest: DocumentManifest,
    options: TracerOptions,
}

impl DelegateAnalyzer for ManifestAnalyzer {
    fn analyze(&mut self, path: &Path) -> Result<Vec<WireLayer>> {
        let mut host = MemoryHost::new(self.manifest.clone());
        let tracer = SmartObjectTracer::new().with_options(self.options);
        let layers = tracer.trace_entry(&mut host, &DocumentRef::new(path))?;
        Ok(layers.iter().map(WireLayer::from_descriptor).collect())
    }
}

pub fn cmd_serve(
    manifest_path: PathBuf,
    bridge_dir: PathBuf,
    interval_ms: u64,
    once: bool,
    max_depth: Option<usize>,
    output: &OutputHandler,
) -> Result<()> {
    let manifest = DocumentManifest::load(&manifest_path)?;
    let mut options = TracerOptions::default();
    if let Some(depth) = max_depth {
        options.max_depth = depth;
    }

    output.print_info(&format!(
        "Delegate watching {} for {REQUEST_FILE}",
        bridge_dir.display()
    ));
    let mut server = BridgeServer::new(bridge_dir, ManifestAnalyzer { manifest, options });
    let interval = Duration::from_millis(interval_ms);
    if once {
        server.serve_one(interval)
    } else {
        server.run(interval)
    }
}
