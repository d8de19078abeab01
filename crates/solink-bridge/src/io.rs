//! Atomic artifact writes for the shared bridge directory.
//!
//! Artifacts are written to a temp file in the same directory and renamed
//! into place, so the other side never observes a half-written file.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use solink_error::{Result, SolinkError};

pub(crate) fn write_json_atomic<T: Serialize>(dir: &Path, target: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| SolinkError::io(format!("could not encode artifact: {e}")))?;
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| SolinkError::io_with_path(format!("could not create temp file: {e}"), dir))?;
    file.write_all(json.as_bytes())
        .and_then(|()| file.write_all(b"\n"))
        .map_err(|e| SolinkError::io_with_path(format!("could not write artifact: {e}"), target))?;
    file.persist(target)
        .map_err(|e| SolinkError::io_with_path(format!("could not persist artifact: {e}"), target))?;
    Ok(())
}
