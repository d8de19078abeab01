//! In-memory host implementation backed by a JSON document manifest.
//!
//! `MemoryHost` stands in for the image editor: it keeps a library of
//! documents described by a [`DocumentManifest`], tracks which of them are
//! "open", and maintains the active-document state the same way the editor
//! does (closing a document exposes the one opened before it).
//!
//! Layer ids are assigned once, at manifest load, so re-opening the same
//! document always yields the same ids.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use solink_error::{HostErrorKind, Result, SolinkError};

use crate::facade::{
    DocId, DocumentRef, HostBridge, LayerId, LayerInfo, LayerKind, normalize_path_key,
};

/// Set of documents a `MemoryHost` can open, with their layer trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentManifest {
    pub documents: Vec<DocumentSpec>,
}

impl DocumentManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SolinkError::io(format!("invalid document manifest: {e}")))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())
            .map_err(|e| SolinkError::io_with_path(e.to_string(), path.as_ref()))?;
        Self::from_json(&text)
    }
}

/// One document in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub path: String,
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
}

/// One layer in a manifest document.
///
/// `kind` may be omitted: a layer with a `link` or an `embedded` payload is a
/// smart object, a layer with `children` is a group, anything else defaults
/// to a pixel layer. `broken` makes the layer's deeper capabilities (children,
/// link, open) fail, to model layers the host cannot read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<LayerKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Vec<LayerSpec>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayerSpec>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub broken: bool,
}

fn default_visible() -> bool {
    true
}

impl LayerSpec {
    fn resolved_kind(&self) -> LayerKind {
        if self.link.is_some() || self.embedded.is_some() {
            LayerKind::SmartObject
        } else if let Some(kind) = self.kind {
            kind
        } else if !self.children.is_empty() {
            LayerKind::Group
        } else {
            LayerKind::Pixel
        }
    }
}

/// Library form of a layer, with its session-stable id already assigned.
#[derive(Debug, Clone)]
struct StoredLayer {
    id: LayerId,
    name: String,
    kind: LayerKind,
    visible: bool,
    broken: bool,
    link: Option<PathBuf>,
    embedded: Option<Vec<StoredLayer>>,
    children: Vec<StoredLayer>,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    path: PathBuf,
    roots: Vec<StoredLayer>,
}

#[derive(Debug)]
struct OpenLayer {
    name: String,
    kind: LayerKind,
    visible: bool,
    broken: bool,
    link: Option<PathBuf>,
    embedded: Option<Vec<StoredLayer>>,
    children: Vec<LayerId>,
}

#[derive(Debug)]
struct OpenDocument {
    path: Option<PathBuf>,
    name: String,
    roots: Vec<LayerId>,
    layers: HashMap<LayerId, OpenLayer>,
}

/// Manifest-backed host.
pub struct MemoryHost {
    library: Vec<StoredDocument>,
    docs: HashMap<DocId, OpenDocument>,
    /// Open order; the last entry is what the host exposes when the active
    /// document is closed.
    order: Vec<DocId>,
    active: Option<DocId>,
    next_doc: u32,
    opens: usize,
    closes: usize,
}

impl MemoryHost {
    pub fn new(manifest: DocumentManifest) -> Self {
        let mut next_layer = 1u32;
        let library = manifest
            .documents
            .into_iter()
            .map(|doc| StoredDocument {
                path: PathBuf::from(doc.path),
                roots: store_layers(doc.layers, &mut next_layer),
            })
            .collect();
        Self {
            library,
            docs: HashMap::new(),
            order: Vec::new(),
            active: None,
            next_doc: 1,
            opens: 0,
            closes: 0,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(DocumentManifest::from_json(json)?))
    }

    /// Paths of the documents this host can open, in manifest order.
    pub fn library_paths(&self) -> Vec<PathBuf> {
        self.library.iter().map(|d| d.path.clone()).collect()
    }

    /// Number of documents currently open.
    pub fn documents_open(&self) -> usize {
        self.docs.len()
    }

    /// Total open operations performed (documents and embedded objects).
    pub fn opens_performed(&self) -> usize {
        self.opens
    }

    /// Total close operations performed.
    pub fn closes_performed(&self) -> usize {
        self.closes
    }

    fn materialize(&mut self, path: Option<PathBuf>, name: String, roots: &[StoredLayer]) -> DocId {
        let id = DocId(self.next_doc);
        self.next_doc += 1;
        let mut layers = HashMap::new();
        let root_ids = flatten_layers(roots, &mut layers);
        self.docs.insert(
            id,
            OpenDocument {
                path,
                name,
                roots: root_ids,
                layers,
            },
        );
        self.order.push(id);
        self.active = Some(id);
        self.opens += 1;
        id
    }

    fn doc(&self, doc: DocId) -> Result<&OpenDocument> {
        self.docs
            .get(&doc)
            .ok_or_else(|| SolinkError::host(format!("{doc} is not open"), HostErrorKind::DocumentNotFound))
    }

    fn layer(&self, doc: DocId, layer: LayerId) -> Result<&OpenLayer> {
        self.doc(doc)?.layers.get(&layer).ok_or_else(|| {
            SolinkError::host(
                format!("{layer} not found in {doc}"),
                HostErrorKind::LayerNotFound,
            )
        })
    }

    fn readable_layer(&self, doc: DocId, layer: LayerId) -> Result<&OpenLayer> {
        let found = self.layer(doc, layer)?;
        if found.broken {
            return Err(SolinkError::host(
                format!("host cannot read layer data for {layer}"),
                HostErrorKind::LayerUnreadable,
            )
            .with_layer(found.name.clone()));
        }
        Ok(found)
    }
}

fn store_layers(specs: Vec<LayerSpec>, next: &mut u32) -> Vec<StoredLayer> {
    specs
        .into_iter()
        .map(|spec| {
            let id = LayerId(*next);
            *next += 1;
            let kind = spec.resolved_kind();
            StoredLayer {
                id,
                name: spec.name,
                kind,
                visible: spec.visible,
                broken: spec.broken,
                link: spec.link.map(PathBuf::from),
                embedded: spec.embedded.map(|layers| store_layers(layers, next)),
                children: store_layers(spec.children, next),
            }
        })
        .collect()
}

fn flatten_layers(stored: &[StoredLayer], out: &mut HashMap<LayerId, OpenLayer>) -> Vec<LayerId> {
    stored
        .iter()
        .map(|layer| {
            let children = flatten_layers(&layer.children, out);
            out.insert(
                layer.id,
                OpenLayer {
                    name: layer.name.clone(),
                    kind: layer.kind,
                    visible: layer.visible,
                    broken: layer.broken,
                    link: layer.link.clone(),
                    embedded: layer.embedded.clone(),
                    children,
                },
            );
            layer.id
        })
        .collect()
}

impl HostBridge for MemoryHost {
    fn open(&mut self, entry: &DocumentRef) -> Result<DocId> {
        if let Some(existing) = self.find_open(entry) {
            debug!("{} already open as {existing}, activating", entry.name());
            self.active = Some(existing);
            return Ok(existing);
        }
        let key = normalize_path_key(entry.path());
        let stored = self
            .library
            .iter()
            .find(|doc| normalize_path_key(&doc.path) == key)
            .cloned()
            .ok_or_else(|| {
                SolinkError::host(
                    format!("no such document: {}", entry.path().display()),
                    HostErrorKind::DocumentNotFound,
                )
            })?;
        let name = entry.name();
        debug!("opening {name}");
        Ok(self.materialize(Some(stored.path.clone()), name, &stored.roots))
    }

    fn close(&mut self, doc: DocId, _discard: bool) -> Result<()> {
        if self.docs.remove(&doc).is_none() {
            return Err(SolinkError::host(
                format!("cannot close {doc}: not open"),
                HostErrorKind::CloseFailed,
            ));
        }
        self.order.retain(|open| *open != doc);
        if self.active == Some(doc) {
            self.active = self.order.last().copied();
        }
        self.closes += 1;
        trace!("closed {doc}, active now {:?}", self.active);
        Ok(())
    }

    fn active(&self) -> Option<DocId> {
        self.active
    }

    fn set_active(&mut self, doc: DocId) -> Result<()> {
        if !self.docs.contains_key(&doc) {
            return Err(SolinkError::host(
                format!("cannot activate {doc}: not open"),
                HostErrorKind::ActivationFailed,
            ));
        }
        self.active = Some(doc);
        Ok(())
    }

    fn find_open(&self, entry: &DocumentRef) -> Option<DocId> {
        let key = normalize_path_key(entry.path());
        for id in &self.order {
            let doc = &self.docs[id];
            if let Some(path) = &doc.path {
                if normalize_path_key(path) == key {
                    return Some(*id);
                }
            }
        }
        // Name-only fallback for documents without a reportable path
        let name = entry.name().to_lowercase();
        for id in &self.order {
            let doc = &self.docs[id];
            if doc.path.is_none() && doc.name.to_lowercase() == name {
                return Some(*id);
            }
        }
        None
    }

    fn document_path(&self, doc: DocId) -> Option<PathBuf> {
        self.docs.get(&doc).and_then(|d| d.path.clone())
    }

    fn layers(&self, doc: DocId) -> Result<Vec<LayerId>> {
        Ok(self.doc(doc)?.roots.clone())
    }

    fn layer_info(&self, doc: DocId, layer: LayerId) -> Result<LayerInfo> {
        let found = self.layer(doc, layer)?;
        Ok(LayerInfo {
            id: layer,
            name: found.name.clone(),
            kind: found.kind,
            visible: found.visible,
        })
    }

    fn child_layers(&self, doc: DocId, layer: LayerId) -> Result<Vec<LayerId>> {
        Ok(self.readable_layer(doc, layer)?.children.clone())
    }

    fn smart_object_link(&self, doc: DocId, layer: LayerId) -> Result<Option<PathBuf>> {
        let found = self.readable_layer(doc, layer)?;
        if found.kind != LayerKind::SmartObject {
            return Err(SolinkError::host(
                format!("{layer} is not a smart object"),
                HostErrorKind::NotASmartObject,
            )
            .with_layer(found.name.clone()));
        }
        Ok(found.link.clone())
    }

    fn open_smart_object(&mut self, doc: DocId, layer: LayerId) -> Result<DocId> {
        let found = self.readable_layer(doc, layer)?;
        if found.kind != LayerKind::SmartObject {
            return Err(SolinkError::host(
                format!("{layer} is not a smart object"),
                HostErrorKind::NotASmartObject,
            )
            .with_layer(found.name.clone()));
        }
        if let Some(embedded) = found.embedded.clone() {
            let name = format!("{}.psb", found.name);
            debug!("materializing embedded smart object {name}");
            return Ok(self.materialize(None, name, &embedded));
        }
        match found.link.clone() {
            Some(link) => self.open(&DocumentRef::new(link)),
            None => Err(SolinkError::host(
                format!("{layer} has no content to open"),
                HostErrorKind::LayerUnreadable,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "documents": [
            {
                "path": "/work/poster.psd",
                "layers": [
                    { "name": "Background" },
                    { "name": "Badge", "embedded": [ { "name": "Star" } ] },
                    { "name": "Logo.psd", "link": "/work/assets/logo.psd" }
                ]
            },
            {
                "path": "/work/assets/logo.psd",
                "layers": [ { "name": "Mark" } ]
            }
        ]
    }"#;

    fn host() -> MemoryHost {
        MemoryHost::from_json(MANIFEST).unwrap()
    }

    #[test]
    fn open_close_restores_exposed_document() {
        let mut host = host();
        let poster = host.open(&DocumentRef::new("/work/poster.psd")).unwrap();
        let logo = host.open(&DocumentRef::new("/work/assets/logo.psd")).unwrap();
        assert_eq!(host.active(), Some(logo));
        host.close(logo, true).unwrap();
        assert_eq!(host.active(), Some(poster));
    }

    #[test]
    fn find_open_matches_normalized_paths() {
        let mut host = host();
        let poster = host.open(&DocumentRef::new("/work/poster.psd")).unwrap();
        let found = host.find_open(&DocumentRef::new("\\work\\POSTER.PSD"));
        assert_eq!(found, Some(poster));
    }

    #[test]
    fn reopening_reuses_the_open_document() {
        let mut host = host();
        let first = host.open(&DocumentRef::new("/work/poster.psd")).unwrap();
        let second = host.open(&DocumentRef::new("/work/poster.psd")).unwrap();
        assert_eq!(first, second);
        assert_eq!(host.documents_open(), 1);
    }

    #[test]
    fn embedded_smart_object_materializes_with_stable_ids() {
        let mut host = host();
        let poster = host.open(&DocumentRef::new("/work/poster.psd")).unwrap();
        let badge = host
            .layers(poster)
            .unwrap()
            .into_iter()
            .find(|id| host.layer_info(poster, *id).unwrap().name == "Badge")
            .unwrap();

        let inner = host.open_smart_object(poster, badge).unwrap();
        assert_eq!(host.active(), Some(inner));
        let first_ids = host.layers(inner).unwrap();
        host.close(inner, true).unwrap();

        let inner_again = host.open_smart_object(poster, badge).unwrap();
        assert_eq!(host.layers(inner_again).unwrap(), first_ids);
    }

    #[test]
    fn unknown_document_is_reported() {
        let mut host = host();
        let err = host.open(&DocumentRef::new("/work/missing.psd")).unwrap_err();
        match err {
            SolinkError::Host { kind, .. } => assert_eq!(kind, HostErrorKind::DocumentNotFound),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
