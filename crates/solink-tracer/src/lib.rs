//! # solink-tracer
//!
//! Smart-object dependency tracing engine for composite image documents.
//!
//! The tracer walks a document's layer graph through the host facade and
//! produces a tree of [`LayerDescriptor`] records. Linked smart objects are
//! recorded by path and never opened; embedded smart objects are transiently
//! materialized, inspected, and discarded; groups are recursed in place.
//! Every mutation of the host's open/active state goes through the
//! [`context`] module so the caller's workspace is left as it was found.

pub mod context;
pub mod descriptor;
pub mod filter;

pub use context::{DocumentContext, discard_document};
pub use descriptor::{
    LayerContent, LayerDescriptor, find_by_id, smart_object_count, tree_depth,
};
pub use filter::{FilterRule, FilterSpec};

use log::{debug, trace, warn};
use solink_error::Result;
use solink_host::{DocId, DocumentRef, HostBridge, LayerId, LayerKind};

/// Options to control traversal limits and behavior.
#[derive(Debug, Clone, Copy)]
pub struct TracerOptions {
    /// Recursion bound over embedded smart objects and nested groups. Keeps
    /// traversal finite on cyclic or pathological nesting.
    pub max_depth: usize,
}

impl Default for TracerOptions {
    fn default() -> Self {
        Self { max_depth: 4 }
    }
}

/// Depth-bounded smart-object traversal over any [`HostBridge`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartObjectTracer {
    options: TracerOptions,
}

impl SmartObjectTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set tracer options (e.g., max_depth).
    pub fn with_options(mut self, options: TracerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> TracerOptions {
        self.options
    }

    /// Analyze an entry document from disk, leaving the host's open/active
    /// state exactly as it was before the call.
    pub fn trace_entry<H: HostBridge>(
        &self,
        host: &mut H,
        entry: &DocumentRef,
    ) -> Result<Vec<LayerDescriptor>> {
        debug!("tracing smart objects of {}", entry.name());
        let context = DocumentContext::enter(host, entry)?;
        let outcome = self.trace_document(host, context.target(), 0);
        context.restore(host);
        outcome
    }

    /// Walk one document's layer list at the given depth.
    ///
    /// Fails only when the document's layers cannot be enumerated at all;
    /// per-layer failures become `Error` descriptors and never abort the
    /// traversal of siblings.
    pub fn trace_document<H: HostBridge>(
        &self,
        host: &mut H,
        doc: DocId,
        depth: usize,
    ) -> Result<Vec<LayerDescriptor>> {
        if depth > self.options.max_depth {
            debug!("depth {depth} exceeds bound {}, stopping", self.options.max_depth);
            return Ok(Vec::new());
        }
        let roots = host.layers(doc)?;
        Ok(self.trace_layers(host, doc, &roots, depth))
    }

    fn trace_layers<H: HostBridge>(
        &self,
        host: &mut H,
        doc: DocId,
        layers: &[LayerId],
        depth: usize,
    ) -> Vec<LayerDescriptor> {
        if depth > self.options.max_depth {
            return Vec::new();
        }
        let mut result = Vec::with_capacity(layers.len());
        for &layer in layers {
            match self.classify(host, doc, layer, depth) {
                Ok(descriptor) => result.push(descriptor),
                Err(e) => {
                    let (name, visible) = match host.layer_info(doc, layer) {
                        Ok(info) => (info.name, info.visible),
                        Err(_) => (layer.to_string(), true),
                    };
                    warn!("analysis of layer {name:?} failed: {e}");
                    result.push(
                        LayerDescriptor::error(layer, name, e.to_string()).with_visible(visible),
                    );
                }
            }
        }
        result
    }

    fn classify<H: HostBridge>(
        &self,
        host: &mut H,
        doc: DocId,
        layer: LayerId,
        depth: usize,
    ) -> Result<LayerDescriptor> {
        let info = host.layer_info(doc, layer)?;
        match info.kind {
            LayerKind::SmartObject => {
                if let Some(link) = host.smart_object_link(doc, layer)? {
                    trace!("{}: linked smart object -> {}", info.name, link.display());
                    Ok(LayerDescriptor::linked(layer, info.name, link).with_visible(info.visible))
                } else {
                    trace!("{}: embedded smart object, opening", info.name);
                    let inner = host.open_smart_object(doc, layer)?;
                    let collected = self.trace_document(host, inner, depth + 1);
                    // The transient document is discarded before any error
                    // from its traversal is allowed to surface.
                    discard_document(host, inner);
                    Ok(LayerDescriptor::embedded(layer, info.name, collected?)
                        .with_visible(info.visible))
                }
            }
            LayerKind::Group => {
                let children_ids = host.child_layers(doc, layer)?;
                let children = self.trace_layers(host, doc, &children_ids, depth + 1);
                Ok(LayerDescriptor::group(layer, info.name, children).with_visible(info.visible))
            }
            _ => Ok(LayerDescriptor::leaf(layer, info.name).with_visible(info.visible)),
        }
    }
}
