//! # solink-error - Unified Error Handling
//!
//! This crate provides a unified error system for the solink toolkit:
//! - Consistent error types across all crates
//! - Rich contextual information (document paths, layer names, operation details)
//! - User-friendly messages for the CLI and detail for debugging
//!
//! Errors are organized by domain (Host, Traversal, Delegate, ...) and carry a
//! domain-specific `kind` so callers can branch on failure class without
//! string-matching messages.

mod conversions;

use std::path::PathBuf;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The main unified error type for the solink toolkit
#[derive(Error, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolinkError {
    /// File system and I/O related errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        file_path: Option<PathBuf>,
        // Note: We store the source error message instead of the error itself for cloneability
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        source_message: Option<String>,
    },

    /// Failures reported by the host document facade (open, close, activate,
    /// layer access)
    #[error("Host error: {message}")]
    Host {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        document: Option<String>,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        layer: Option<String>,
        kind: HostErrorKind,
    },

    /// Smart-object traversal errors
    #[error("Traversal error: {message}")]
    Traversal {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        layer: Option<String>,
        kind: TraversalErrorKind,
    },

    /// Failures while restoring the host's editing state after an analysis.
    /// These are logged and swallowed by the context manager, never fatal.
    #[error("Document state error: {message}")]
    DocumentState {
        message: String,
        kind: DocumentStateErrorKind,
    },

    /// Delegate bridge errors (file-protocol analysis channel)
    #[error("Delegate error: {message}")]
    Delegate {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        source_path: Option<PathBuf>,
        kind: DelegateErrorKind,
    },

    /// CLI and user interface errors
    #[error("CLI error: {message}")]
    Cli {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        command: Option<String>,
        kind: CliErrorKind,
    },
}

/// Specific kinds of host facade errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HostErrorKind {
    #[error("Document not found")]
    DocumentNotFound,
    #[error("Document open failed")]
    OpenFailed,
    #[error("Document close failed")]
    CloseFailed,
    #[error("Document activation failed")]
    ActivationFailed,
    #[error("Layer not found")]
    LayerNotFound,
    #[error("Layer data unreadable")]
    LayerUnreadable,
    #[error("Layer is not a smart object")]
    NotASmartObject,
}

/// Specific kinds of traversal errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TraversalErrorKind {
    #[error("Entry document unavailable")]
    EntryUnavailable,
    #[error("Node expansion failed")]
    NodeExpansionFailed,
    #[error("Invalid filter rule")]
    InvalidFilter,
}

/// Specific kinds of document state restoration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DocumentStateErrorKind {
    #[error("Temporary document close failed")]
    CloseFailed,
    #[error("Active document restore failed")]
    RestoreFailed,
}

/// Specific kinds of delegate bridge errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DelegateErrorKind {
    #[error("No valid result within the polling budget")]
    Timeout,
    #[error("Delegate reported failure")]
    Reported,
    #[error("Malformed result content")]
    Protocol,
    #[error("Result does not match the current request")]
    Stale,
}

/// Specific kinds of CLI errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CliErrorKind {
    #[error("Invalid command arguments")]
    InvalidArguments,
    #[error("Command execution failed")]
    ExecutionFailed,
    #[error("Output formatting failed")]
    OutputFormatError,
}

/// Convenient result type for solink operations
pub type Result<T> = std::result::Result<T, SolinkError>;

impl SolinkError {
    /// Create a new I/O error with optional context
    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io {
            message: message.into(),
            file_path: None,
            source_message: None,
        }
    }

    /// Create a new I/O error with file path context
    pub fn io_with_path<M: Into<String>, P: Into<PathBuf>>(message: M, path: P) -> Self {
        Self::Io {
            message: message.into(),
            file_path: Some(path.into()),
            source_message: None,
        }
    }

    /// Create a new host facade error
    pub fn host<M: Into<String>>(message: M, kind: HostErrorKind) -> Self {
        Self::Host {
            message: message.into(),
            document: None,
            layer: None,
            kind,
        }
    }

    /// Create a new host facade error with document/layer context
    pub fn host_with_context<M: Into<String>, D: Into<String>, L: Into<String>>(
        message: M,
        kind: HostErrorKind,
        document: Option<D>,
        layer: Option<L>,
    ) -> Self {
        Self::Host {
            message: message.into(),
            document: document.map(|d| d.into()),
            layer: layer.map(|l| l.into()),
            kind,
        }
    }

    /// Create a new traversal error
    pub fn traversal<M: Into<String>>(message: M, kind: TraversalErrorKind) -> Self {
        Self::Traversal {
            message: message.into(),
            layer: None,
            kind,
        }
    }

    /// Create a new document state error
    pub fn document_state<M: Into<String>>(message: M, kind: DocumentStateErrorKind) -> Self {
        Self::DocumentState {
            message: message.into(),
            kind,
        }
    }

    /// Create a new delegate bridge error
    pub fn delegate<M: Into<String>>(message: M, kind: DelegateErrorKind) -> Self {
        Self::Delegate {
            message: message.into(),
            source_path: None,
            kind,
        }
    }

    /// Create a new delegate bridge error with the requested source path
    pub fn delegate_with_source<M: Into<String>, P: Into<PathBuf>>(
        message: M,
        kind: DelegateErrorKind,
        source_path: P,
    ) -> Self {
        Self::Delegate {
            message: message.into(),
            source_path: Some(source_path.into()),
            kind,
        }
    }

    /// Create a new CLI error
    pub fn cli<M: Into<String>>(message: M, kind: CliErrorKind) -> Self {
        Self::Cli {
            message: message.into(),
            command: None,
            kind,
        }
    }

    /// Add layer context to host and traversal errors
    pub fn with_layer<L: Into<String>>(mut self, name: L) -> Self {
        match &mut self {
            Self::Host { layer, .. } => *layer = Some(name.into()),
            Self::Traversal { layer, .. } => *layer = Some(name.into()),
            _ => {}
        }
        self
    }

    /// Check if this error came from the delegate bridge
    pub fn is_delegate(&self) -> bool {
        matches!(self, Self::Delegate { .. })
    }

    /// Delegate failure kind, if this is a delegate error
    pub fn delegate_kind(&self) -> Option<&DelegateErrorKind> {
        match self {
            Self::Delegate { kind, .. } => Some(kind),
            _ => None,
        }
    }
}
