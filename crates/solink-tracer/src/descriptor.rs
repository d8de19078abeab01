//! Result tree produced by an analysis: one descriptor per layer.

use std::path::PathBuf;

use solink_host::LayerId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One node of the result tree.
///
/// The node's semantic role lives in [`LayerContent`]: a layer is exactly one
/// of linked smart object, embedded smart object, group, leaf, or error
/// marker. Error nodes are kept in place so the tree stays structurally
/// complete when a single layer cannot be read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerDescriptor {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub content: LayerContent,
}

/// Kind-specific payload of a [`LayerDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum LayerContent {
    /// A smart object. Linked objects carry the external path and are never
    /// recursed into; embedded objects carry the children found by opening
    /// them.
    Smart {
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
        link: Option<PathBuf>,
        embedded: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<LayerDescriptor>,
    },
    /// A group: structural container inside the same document.
    Group {
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<LayerDescriptor>,
    },
    /// A plain layer with no dependencies.
    Leaf,
    /// Analysis of this layer failed; siblings are unaffected.
    Error { message: String },
}

impl LayerDescriptor {
    pub fn linked<N: Into<String>, P: Into<PathBuf>>(id: LayerId, name: N, link: P) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            content: LayerContent::Smart {
                link: Some(link.into()),
                embedded: false,
                children: Vec::new(),
            },
        }
    }

    pub fn embedded<N: Into<String>>(id: LayerId, name: N, children: Vec<LayerDescriptor>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            content: LayerContent::Smart {
                link: None,
                embedded: true,
                children,
            },
        }
    }

    pub fn group<N: Into<String>>(id: LayerId, name: N, children: Vec<LayerDescriptor>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            content: LayerContent::Group { children },
        }
    }

    pub fn leaf<N: Into<String>>(id: LayerId, name: N) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            content: LayerContent::Leaf,
        }
    }

    pub fn error<N: Into<String>, M: Into<String>>(id: LayerId, name: N, message: M) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            content: LayerContent::Error {
                message: message.into(),
            },
        }
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn children(&self) -> &[LayerDescriptor] {
        match &self.content {
            LayerContent::Smart { children, .. } | LayerContent::Group { children } => children,
            LayerContent::Leaf | LayerContent::Error { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<LayerDescriptor>> {
        match &mut self.content {
            LayerContent::Smart { children, .. } | LayerContent::Group { children } => {
                Some(children)
            }
            LayerContent::Leaf | LayerContent::Error { .. } => None,
        }
    }

    pub fn is_smart(&self) -> bool {
        matches!(self.content, LayerContent::Smart { .. })
    }

    /// Link target, for linked smart objects.
    pub fn link(&self) -> Option<&PathBuf> {
        match &self.content {
            LayerContent::Smart { link, .. } => link.as_ref(),
            _ => None,
        }
    }

    /// Short role tag for display.
    pub fn kind_label(&self) -> &'static str {
        match &self.content {
            LayerContent::Smart { .. } => "smart",
            LayerContent::Group { .. } => "group",
            LayerContent::Leaf => "leaf",
            LayerContent::Error { .. } => "error",
        }
    }
}

/// Depth of the deepest node, counting the roots as depth 1. Empty input is 0.
pub fn tree_depth(layers: &[LayerDescriptor]) -> usize {
    layers
        .iter()
        .map(|layer| 1 + tree_depth(layer.children()))
        .max()
        .unwrap_or(0)
}

/// Number of smart-object nodes in the tree, linked and embedded alike.
pub fn smart_object_count(layers: &[LayerDescriptor]) -> usize {
    layers
        .iter()
        .map(|layer| {
            let own = usize::from(layer.is_smart());
            own + smart_object_count(layer.children())
        })
        .sum()
}

/// Find a node anywhere in the tree by its layer id.
pub fn find_by_id(layers: &[LayerDescriptor], id: LayerId) -> Option<&LayerDescriptor> {
    for layer in layers {
        if layer.id == id {
            return Some(layer);
        }
        if let Some(found) = find_by_id(layer.children(), id) {
            return Some(found);
        }
    }
    None
}
