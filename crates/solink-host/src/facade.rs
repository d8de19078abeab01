//! The capability interface onto the host image editor.
//!
//! The host owns all document and layer state; this module only defines the
//! handles and operations the traversal engine needs. Handles are plain ids
//! so that implementations stay free to manage their own storage.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use solink_error::Result;

/// Handle to an open document. Only meaningful to the host that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Handle to a layer within a document, stable for the lifetime of a host
/// session. Used to re-locate a layer for a later user-triggered open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// Reference to a document on disk, used to open it or find it among the
/// host's already-open documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    path: PathBuf,
}

impl DocumentRef {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name: the file name component, or the whole path as a fallback.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// Classification the host reports for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    SmartObject,
    Group,
    Pixel,
    Text,
    Adjustment,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayerKind::SmartObject => "smart_object",
            LayerKind::Group => "group",
            LayerKind::Pixel => "pixel",
            LayerKind::Text => "text",
            LayerKind::Adjustment => "adjustment",
        };
        f.write_str(name)
    }
}

/// Per-layer record returned by the host's layer capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    pub visible: bool,
}

/// The host document facade.
///
/// The "active document" is process-wide mutable state owned by the host.
/// Callers that change it are responsible for restoring it; see the context
/// manager in `solink-tracer`.
pub trait HostBridge {
    /// Open a document from disk. The newly opened document becomes active.
    fn open(&mut self, entry: &DocumentRef) -> Result<DocId>;

    /// Close an open document, optionally discarding unsaved changes.
    fn close(&mut self, doc: DocId, discard: bool) -> Result<()>;

    /// The currently active document, if any.
    fn active(&self) -> Option<DocId>;

    /// Make an already-open document active.
    fn set_active(&mut self, doc: DocId) -> Result<()>;

    /// Look for an already-open document matching the reference: full-path
    /// match after normalization, with a name-only fallback when the host
    /// cannot report a path for the document.
    fn find_open(&self, entry: &DocumentRef) -> Option<DocId>;

    /// On-disk path of an open document, when the host knows one.
    fn document_path(&self, doc: DocId) -> Option<PathBuf>;

    /// Top-level layers of a document, in the host's native order.
    fn layers(&self, doc: DocId) -> Result<Vec<LayerId>>;

    /// Name/kind/visibility record for one layer.
    fn layer_info(&self, doc: DocId, layer: LayerId) -> Result<LayerInfo>;

    /// Children of a group layer, in the host's native order.
    fn child_layers(&self, doc: DocId, layer: LayerId) -> Result<Vec<LayerId>>;

    /// Link target of a smart-object layer. `None` means the smart object is
    /// embedded and must be opened to inspect.
    fn smart_object_link(&self, doc: DocId, layer: LayerId) -> Result<Option<PathBuf>>;

    /// Materialize an embedded smart object as a new document. The new
    /// document becomes active; the caller owns closing it again.
    fn open_smart_object(&mut self, doc: DocId, layer: LayerId) -> Result<DocId>;
}

/// Normalized comparison key for document paths: forward slashes, no
/// trailing separator, case-folded. Hosts report paths inconsistently across
/// platforms, so every path equality check in the toolkit goes through this.
pub fn normalize_path_key<P: AsRef<Path>>(path: P) -> String {
    let mut key = path.as_ref().to_string_lossy().replace('\\', "/");
    while key.len() > 1 && key.ends_with('/') {
        key.pop();
    }
    key.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_keys_fold_separators_and_case() {
        assert_eq!(
            normalize_path_key("C:\\Assets\\Logo.PSD"),
            normalize_path_key("c:/assets/logo.psd"),
        );
    }

    #[test]
    fn path_keys_drop_trailing_separators() {
        assert_eq!(normalize_path_key("/work/scenes/"), "/work/scenes");
    }

    #[test]
    fn document_ref_name_is_file_name() {
        let entry = DocumentRef::new("/work/poster/Hero.psd");
        assert_eq!(entry.name(), "Hero.psd");
    }
}
