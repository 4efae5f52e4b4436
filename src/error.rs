//! Error type shared by the library.
//!
//! Interactive edits that are defined as silent no-ops (an out-of-range
//! subdivision, an unknown node id) do not surface here; they report
//! through `bool`/`Option` return values instead.

use std::io;

/// Errors raised by persistence, export and settings loading.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown {kind}: {id}")]
    UnknownEntity { kind: &'static str, id: String },
    #[error("no symbol surface available for export")]
    NoSymbolSurface,
    #[error("document is empty")]
    EmptyDocument,
}

pub type Result<T> = std::result::Result<T, EditorError>;
