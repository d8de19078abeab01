//! User-triggered opening of analyzed smart objects.
//!
//! The result tree keeps each layer's host id precisely so a later "open
//! this one" action can re-locate it: linked objects open by their external
//! path, embedded ones by asking the host to materialize the layer again.

use log::debug;
use solink_error::{HostErrorKind, Result, SolinkError};
use solink_host::{DocId, DocumentRef, HostBridge, LayerId, LayerKind};
use solink_tracer::{LayerContent, LayerDescriptor};

/// Open the document behind an analyzed smart-object node.
pub fn open_descriptor<H: HostBridge>(
    host: &mut H,
    doc: DocId,
    descriptor: &LayerDescriptor,
) -> Result<DocId> {
    match &descriptor.content {
        LayerContent::Smart {
            link: Some(link), ..
        } => {
            debug!("opening linked smart object {} from {}", descriptor.name, link.display());
            host.open(&DocumentRef::new(link))
        }
        LayerContent::Smart { link: None, .. } => {
            debug!("opening embedded smart object {} by id {}", descriptor.name, descriptor.id);
            host.open_smart_object(doc, descriptor.id)
        }
        _ => Err(SolinkError::host(
            format!("\"{}\" is not a smart object", descriptor.name),
            HostErrorKind::NotASmartObject,
        )
        .with_layer(descriptor.name.clone())),
    }
}

/// Open a smart object in the currently active document by its layer id.
pub fn open_smart_object_by_id<H: HostBridge>(host: &mut H, layer: LayerId) -> Result<DocId> {
    let doc = host.active().ok_or_else(|| {
        SolinkError::host(
            "no active document to open a smart object from",
            HostErrorKind::DocumentNotFound,
        )
    })?;
    let info = host.layer_info(doc, layer)?;
    if info.kind != LayerKind::SmartObject {
        return Err(SolinkError::host(
            format!("\"{}\" is not a smart object", info.name),
            HostErrorKind::NotASmartObject,
        )
        .with_layer(info.name));
    }
    host.open_smart_object(doc, layer)
}
