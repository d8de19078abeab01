//! Save/restore discipline for the host's active-document state.
//!
//! Every top-level analysis call goes through a [`DocumentContext`]: the
//! entry policy is decided once, before recursion begins, and the teardown
//! runs on success and failure alike. Teardown steps are independently
//! guarded (a failed close must not prevent the activation restore) and
//! failures are logged rather than escalated, because leaving the user's
//! workspace minimally disturbed matters more than surfacing a secondary
//! error.

use log::{debug, warn};
use solink_error::{DocumentStateErrorKind, Result, SolinkError};
use solink_host::{DocId, DocumentRef, HostBridge};

/// Records which host state changes one analysis call is responsible for
/// undoing.
#[derive(Debug)]
pub struct DocumentContext {
    previous_active: Option<DocId>,
    target: DocId,
    opened_temporarily: bool,
    switched_temporarily: bool,
}

impl DocumentContext {
    /// Prepare the entry document for traversal.
    ///
    /// Three cases: the document is not open anywhere (open it, remember to
    /// close it), it is open but another document is active (activate it,
    /// remember to switch back), or it is already active (nothing to undo).
    pub fn enter<H: HostBridge>(host: &mut H, entry: &DocumentRef) -> Result<Self> {
        let previous_active = host.active();
        match host.find_open(entry) {
            None => {
                let target = host.open(entry)?;
                debug!("opened {} temporarily as {target}", entry.name());
                Ok(Self {
                    previous_active,
                    target,
                    opened_temporarily: true,
                    switched_temporarily: false,
                })
            }
            Some(target) if previous_active == Some(target) => Ok(Self {
                previous_active,
                target,
                opened_temporarily: false,
                switched_temporarily: false,
            }),
            Some(target) => {
                host.set_active(target)?;
                debug!("switched activation to {target} temporarily");
                Ok(Self {
                    previous_active,
                    target,
                    opened_temporarily: false,
                    switched_temporarily: true,
                })
            }
        }
    }

    /// The document traversal should run over.
    pub fn target(&self) -> DocId {
        self.target
    }

    pub fn opened_temporarily(&self) -> bool {
        self.opened_temporarily
    }

    pub fn switched_temporarily(&self) -> bool {
        self.switched_temporarily
    }

    /// Undo whatever `enter` changed. Best effort: each step is guarded on
    /// its own and failures are logged, never returned.
    pub fn restore<H: HostBridge>(self, host: &mut H) {
        if self.opened_temporarily {
            if let Err(e) = host.close(self.target, true) {
                let err = SolinkError::document_state(
                    format!("could not close temporary {}: {e}", self.target),
                    DocumentStateErrorKind::CloseFailed,
                );
                warn!("{err}");
            }
        }
        if self.switched_temporarily {
            if let Some(previous) = self.previous_active {
                if let Err(e) = host.set_active(previous) {
                    let err = SolinkError::document_state(
                        format!("could not restore activation of {previous}: {e}"),
                        DocumentStateErrorKind::RestoreFailed,
                    );
                    warn!("{err}");
                }
            }
        }
    }
}

/// Close a transiently opened embedded smart-object document, discarding
/// changes. Failures are logged and swallowed, like every other teardown.
pub fn discard_document<H: HostBridge>(host: &mut H, doc: DocId) {
    if let Err(e) = host.close(doc, true) {
        let err = SolinkError::document_state(
            format!("could not close embedded document {doc}: {e}"),
            DocumentStateErrorKind::CloseFailed,
        );
        warn!("{err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solink_host::MemoryHost;

    const MANIFEST: &str = r#"{
        "documents": [
            { "path": "/work/a.psd", "layers": [ { "name": "A" } ] },
            { "path": "/work/b.psd", "layers": [ { "name": "B" } ] }
        ]
    }"#;

    #[test]
    fn unopened_entry_is_opened_and_closed_again() {
        let mut host = MemoryHost::from_json(MANIFEST).unwrap();
        let entry = DocumentRef::new("/work/a.psd");

        let context = DocumentContext::enter(&mut host, &entry).unwrap();
        assert!(context.opened_temporarily());
        assert_eq!(host.active(), Some(context.target()));

        context.restore(&mut host);
        assert_eq!(host.documents_open(), 0);
        assert_eq!(host.active(), None);
    }

    #[test]
    fn open_inactive_entry_is_switched_and_switched_back() {
        let mut host = MemoryHost::from_json(MANIFEST).unwrap();
        let a = host.open(&DocumentRef::new("/work/a.psd")).unwrap();
        let b = host.open(&DocumentRef::new("/work/b.psd")).unwrap();
        assert_eq!(host.active(), Some(b));

        let context = DocumentContext::enter(&mut host, &DocumentRef::new("/work/a.psd")).unwrap();
        assert!(context.switched_temporarily());
        assert!(!context.opened_temporarily());
        assert_eq!(context.target(), a);
        assert_eq!(host.active(), Some(a));

        context.restore(&mut host);
        assert_eq!(host.active(), Some(b));
        assert_eq!(host.documents_open(), 2);
    }

    #[test]
    fn active_entry_needs_no_teardown() {
        let mut host = MemoryHost::from_json(MANIFEST).unwrap();
        let a = host.open(&DocumentRef::new("/work/a.psd")).unwrap();

        let context = DocumentContext::enter(&mut host, &DocumentRef::new("/work/a.psd")).unwrap();
        assert!(!context.opened_temporarily());
        assert!(!context.switched_temporarily());
        assert_eq!(context.target(), a);

        context.restore(&mut host);
        assert_eq!(host.active(), Some(a));
    }
}
