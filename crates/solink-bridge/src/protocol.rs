//! File-resident records exchanged with the external delegate.
//!
//! The delegate is a separate process with no socket access to the host
//! sandbox; a designated writable directory is the only mutually reachable
//! medium. One request artifact and one result artifact live there, each
//! overwritten per call. The result echoes the requested source path so a
//! slow delegate's leftover answer from a previous call can be recognized
//! and ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use solink_host::{LayerId, normalize_path_key};
use solink_tracer::{LayerContent, LayerDescriptor};

/// File name of the request artifact.
pub const REQUEST_FILE: &str = "request.json";
/// File name of the result artifact.
pub const RESULT_FILE: &str = "result.json";
/// The only command the protocol knows.
pub const ANALYZE_COMMAND: &str = "analyze";

/// `request.json`: `{ "cmd": "analyze", "path": "<absolute source path>" }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub cmd: String,
    pub path: String,
}

impl BridgeRequest {
    pub fn analyze<P: AsRef<Path>>(path: P) -> Self {
        Self {
            cmd: ANALYZE_COMMAND.to_string(),
            path: path.as_ref().to_string_lossy().into_owned(),
        }
    }

    pub fn is_analyze(&self) -> bool {
        self.cmd == ANALYZE_COMMAND
    }
}

/// `result.json`: the delegate's answer, echoing the request's path in
/// `source`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeResult {
    pub ok: bool,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub layers: Vec<WireLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResult {
    pub fn success<S: Into<String>>(source: S, layers: Vec<WireLayer>) -> Self {
        Self {
            ok: true,
            source: source.into(),
            layers,
            error: None,
        }
    }

    pub fn failure<S: Into<String>, M: Into<String>>(source: S, message: M) -> Self {
        Self {
            ok: false,
            source: source.into(),
            layers: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Does this result answer a request for `source_path`? Path separators
    /// and case are normalized on both sides before comparing.
    pub fn answers<P: AsRef<Path>>(&self, source_path: P) -> bool {
        normalize_path_key(&self.source) == normalize_path_key(source_path.as_ref())
    }
}

fn wire_visible_default() -> bool {
    true
}

/// Flat per-layer record used on the wire, in the shape the delegate's
/// heavier reader emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LayerId>,
    pub name: String,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub is_smart_object: bool,
    #[serde(default)]
    pub is_embedded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_path: Option<String>,
    #[serde(default = "wire_visible_default")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<WireLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WireLayer {
    pub fn from_descriptor(descriptor: &LayerDescriptor) -> Self {
        let mut wire = WireLayer {
            id: Some(descriptor.id),
            name: descriptor.name.clone(),
            is_group: false,
            is_smart_object: false,
            is_embedded: false,
            linked_path: None,
            visible: descriptor.visible,
            children: Vec::new(),
            error: None,
        };
        match &descriptor.content {
            LayerContent::Smart {
                link,
                embedded,
                children,
            } => {
                wire.is_smart_object = true;
                wire.is_embedded = *embedded;
                wire.linked_path = link
                    .as_ref()
                    .map(|path| path.to_string_lossy().into_owned());
                wire.children = children.iter().map(Self::from_descriptor).collect();
            }
            LayerContent::Group { children } => {
                wire.is_group = true;
                wire.children = children.iter().map(Self::from_descriptor).collect();
            }
            LayerContent::Leaf => {}
            LayerContent::Error { message } => {
                wire.error = Some(message.clone());
            }
        }
        wire
    }
}

/// Convert a delegate result's layers into the uniform descriptor model.
///
/// The delegate may not know host layer ids; missing ids are synthesized
/// depth-first so identical results always map to identical trees.
pub fn normalize_layers(layers: Vec<WireLayer>) -> Vec<LayerDescriptor> {
    let mut next_id = 1u32;
    normalize_list(layers, &mut next_id)
}

fn normalize_list(layers: Vec<WireLayer>, next_id: &mut u32) -> Vec<LayerDescriptor> {
    layers
        .into_iter()
        .map(|layer| normalize_one(layer, next_id))
        .collect()
}

fn normalize_one(layer: WireLayer, next_id: &mut u32) -> LayerDescriptor {
    let id = layer.id.unwrap_or_else(|| {
        let id = LayerId(*next_id);
        *next_id += 1;
        id
    });
    let visible = layer.visible;
    let descriptor = if let Some(message) = layer.error {
        LayerDescriptor::error(id, layer.name, message)
    } else if layer.is_smart_object {
        match layer.linked_path {
            Some(path) => LayerDescriptor::linked(id, layer.name, path),
            None => LayerDescriptor::embedded(id, layer.name, normalize_list(layer.children, next_id)),
        }
    } else if layer.is_group {
        LayerDescriptor::group(id, layer.name, normalize_list(layer.children, next_id))
    } else {
        LayerDescriptor::leaf(id, layer.name)
    };
    descriptor.with_visible(visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_protocol_field_names() {
        let request = BridgeRequest::analyze("/work/poster.psd");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["cmd"], "analyze");
        assert_eq!(value["path"], "/work/poster.psd");
    }

    #[test]
    fn result_source_match_is_normalized() {
        let result = BridgeResult::success("C:\\Work\\Poster.PSD", Vec::new());
        assert!(result.answers("c:/work/poster.psd"));
        assert!(!result.answers("c:/work/other.psd"));
    }

    #[test]
    fn wire_layers_normalize_into_descriptors() {
        let json = r#"[
            { "name": "Logo.psd", "is_smart_object": true,
              "linked_path": "/assets/logo.psd" },
            { "name": "Badge", "is_smart_object": true, "is_embedded": true,
              "children": [ { "name": "Star" } ] },
            { "name": "Broken", "error": "unreadable" }
        ]"#;
        let wire: Vec<WireLayer> = serde_json::from_str(json).unwrap();
        let layers = normalize_layers(wire);

        assert_eq!(layers.len(), 3);
        assert_eq!(
            layers[0].link().map(|p| p.display().to_string()),
            Some("/assets/logo.psd".to_string())
        );
        assert_eq!(layers[1].children().len(), 1);
        assert_eq!(layers[2].kind_label(), "error");
    }

    #[test]
    fn synthesized_ids_are_deterministic() {
        let wire = || {
            vec![WireLayer {
                id: None,
                name: "Badge".into(),
                is_group: false,
                is_smart_object: true,
                is_embedded: true,
                linked_path: None,
                visible: true,
                children: vec![],
                error: None,
            }]
        };
        assert_eq!(normalize_layers(wire()), normalize_layers(wire()));
    }

    #[test]
    fn descriptor_round_trips_through_the_wire_shape() {
        let descriptor = LayerDescriptor::embedded(
            LayerId(5),
            "Badge",
            vec![LayerDescriptor::leaf(LayerId(6), "Star")],
        );
        let wire = WireLayer::from_descriptor(&descriptor);
        let back = normalize_layers(vec![wire]);
        assert_eq!(back, vec![descriptor]);
    }
}
