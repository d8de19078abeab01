use std::path::PathBuf;

use solink_error::SolinkError;
use solink_host::{DocumentManifest, LayerSpec};

use crate::util::OutputHandler;

pub fn cmd_info(manifest_path: PathBuf, output: &OutputHandler) -> Result<(), SolinkError> {
    let manifest = DocumentManifest::load(&manifest_path)?;
    output.print_info(&format!(
        "{} document(s) in {}:",
        manifest.documents.len(),
        manifest_path.display()
    ));
    for doc in &manifest.documents {
        let (layers, smart) = count_layers(&doc.layers);
        output.print_result(&format!(
            "  {}  ({layers} layer(s), {smart} smart object(s))",
            doc.path
        ));
    }
    Ok(())
}

/// Count layers and smart objects across groups and embedded sub-documents.
fn count_layers(layers: &[LayerSpec]) -> (usize, usize) {
    let mut total = 0;
    let mut smart = 0;
    for layer in layers {
        total += 1;
        if layer.link.is_some() || layer.embedded.is_some() {
            smart += 1;
        }
        if let Some(embedded) = &layer.embedded {
            let (inner_total, inner_smart) = count_layers(embedded);
            total += inner_total;
            smart += inner_smart;
        }
        let (child_total, child_smart) = count_layers(&layer.children);
        total += child_total;
        smart += child_smart;
    }
    (total, smart)
}
