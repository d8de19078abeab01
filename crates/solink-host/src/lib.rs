//! # solink-host
//!
//! The host document facade: the narrow capability interface through which
//! the rest of the toolkit drives an image editor, plus an in-memory host
//! used for tests and for running the toolchain without an editor.
//!
//! The real editor (documents, layers, open/close/activate primitives) is an
//! external collaborator; everything this workspace needs from it is the
//! [`HostBridge`] trait. [`MemoryHost`] implements the same trait over a JSON
//! [`DocumentManifest`], which makes the traversal and orchestration code
//! exercisable end to end.

pub mod facade;
pub mod memory;

pub use facade::{
    DocId, DocumentRef, HostBridge, LayerId, LayerInfo, LayerKind, normalize_path_key,
};
pub use memory::{DocumentManifest, DocumentSpec, LayerSpec, MemoryHost};

pub use solink_error::Result;
