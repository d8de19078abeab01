use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use solink_analyzer::{AnalysisOptions, Analyzer, BridgeSettings};
use solink_bridge::PollOptions;
use solink_error::{CliErrorKind, SolinkError};
use solink_host::{DocumentManifest, DocumentRef, MemoryHost};
use solink_tracer::{
    FilterSpec, LayerContent, LayerDescriptor, TracerOptions, smart_object_count, tree_depth,
};
use text_trees::{FormatCharacters, StringTreeNode, TreeFormatting};

use crate::util::{CliStatusSink, OutputHandler};

#[allow(clippy::too_many_arguments)]
pub fn cmd_analyze(
    manifest_path: PathBuf,
    entry: Option<PathBuf>,
    format: crate::OutputFormat,
    ascii: bool,
    max_depth: Option<usize>,
    bridge_dir: Option<PathBuf>,
    attempts: u32,
    delay_ms: u64,
    filters: Vec<String>,
    quiet: bool,
    output: &OutputHandler,
) -> Result<(), SolinkError> {
    let manifest = DocumentManifest::load(&manifest_path)?;
    debug!(
        "loaded manifest {} with {} document(s)",
        manifest_path.display(),
        manifest.documents.len()
    );
    let entry = match entry {
        Some(path) => DocumentRef::new(path),
        None => manifest
            .documents
            .first()
            .map(|doc| DocumentRef::new(&doc.path))
            .ok_or_else(|| {
                SolinkError::cli(
                    format!("manifest {} contains no documents", manifest_path.display()),
                    CliErrorKind::InvalidArguments,
                )
            })?,
    };
    let filter = FilterSpec::parse(&filters)?;

    let mut tracer_options = TracerOptions::default();
    if let Some(depth) = max_depth {
        tracer_options.max_depth = depth;
    }
    let options = AnalysisOptions {
        prefer_delegate: bridge_dir.is_some(),
        tracer: tracer_options,
        bridge: bridge_dir.map(|dir| BridgeSettings {
            dir,
            poll: PollOptions {
                attempts,
                delay: Duration::from_millis(delay_ms),
            },
        }),
    };

    let mut host = MemoryHost::new(manifest);
    let status = CliStatusSink::new(quiet);
    let layers = Analyzer::new()
        .with_options(options)
        .analyze(&mut host, &entry, &status)?;
    let layers = filter.apply(layers);

    match format {
        crate::OutputFormat::Flat => {
            output.print_info(&format!("Smart objects of {}:", entry.name()));
            let mut lines = Vec::new();
            collect_flat(&layers, 0, &mut lines);
            if lines.is_empty() {
                output.print_info("  No smart objects found");
            } else {
                for line in lines {
                    output.print_result(&line);
                }
            }
        }
        crate::OutputFormat::Tree => {
            output.print_info(&format!("Smart object tree of {}:", entry.name()));
            let format_chars = if ascii {
                FormatCharacters::ascii()
            } else {
                FormatCharacters::box_chars()
            };
            let formatting = TreeFormatting::dir_tree(format_chars);
            let tree = build_text_tree(&entry.name(), &layers);
            match tree.to_string_with_format(&formatting) {
                Ok(rendered) => output.print_result(&rendered),
                Err(e) => output.print_error(&format!("Error formatting tree: {e}")),
            }
            output.print_info("Summary:");
            output.print_info(&format!(
                "  Smart objects: {}",
                smart_object_count(&layers)
            ));
            output.print_info(&format!("  Maximum depth: {}", tree_depth(&layers)));
        }
        crate::OutputFormat::Json => match serde_json::to_string_pretty(&layers) {
            Ok(json) => output.print_result(&json),
            Err(e) => {
                return Err(SolinkError::cli(
                    format!("could not serialize result: {e}"),
                    CliErrorKind::OutputFormatError,
                ));
            }
        },
    }
    Ok(())
}

/// Indented flat listing of the smart-object nodes only.
fn collect_flat(layers: &[LayerDescriptor], indent: usize, out: &mut Vec<String>) {
    for layer in layers {
        match &layer.content {
            LayerContent::Smart { link, .. } => {
                let detail = match link {
                    Some(path) => format!("linked -> {}", path.display()),
                    None => "embedded".to_string(),
                };
                out.push(format!("{}{} ({detail})", "  ".repeat(indent + 1), layer.name));
                collect_flat(layer.children(), indent + 1, out);
            }
            LayerContent::Error { message } => {
                out.push(format!(
                    "{}{} (error: {message})",
                    "  ".repeat(indent + 1),
                    layer.name
                ));
            }
            _ => collect_flat(layer.children(), indent, out),
        }
    }
}

fn node_label(layer: &LayerDescriptor) -> String {
    let detail = match &layer.content {
        LayerContent::Smart {
            link: Some(path), ..
        } => format!("smart -> {}", path.display()),
        LayerContent::Smart { link: None, .. } => "smart, embedded".to_string(),
        LayerContent::Group { .. } => "group".to_string(),
        LayerContent::Leaf => "layer".to_string(),
        LayerContent::Error { message } => format!("error: {message}"),
    };
    let hidden = if layer.visible { "" } else { ", hidden" };
    format!("{} [{detail}{hidden}]", layer.name)
}

pub fn build_text_tree(root_label: &str, layers: &[LayerDescriptor]) -> StringTreeNode {
    StringTreeNode::with_child_nodes(
        root_label.to_string(),
        layers.iter().map(build_node).collect::<Vec<_>>().into_iter(),
    )
}

fn build_node(layer: &LayerDescriptor) -> StringTreeNode {
    if layer.children().is_empty() {
        StringTreeNode::new(node_label(layer))
    } else {
        let child_nodes: Vec<StringTreeNode> = layer.children().iter().map(build_node).collect();
        StringTreeNode::with_child_nodes(node_label(layer), child_nodes.into_iter())
    }
}
