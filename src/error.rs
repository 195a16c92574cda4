//! Error types for a document export run.
//!
//! Only failures that end the whole run live here. Per-field and per-item
//! failures reported by an [`ItemTree`](crate::ItemTree) are recoverable: the
//! exporter turns them into [`Diagnostic`](crate::Diagnostic)s and keeps going.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: the output stream could not be written
//! - **Root Errors**: the tree provider could not hand out its root item
//! - **Cancellation**: the caller asked the run to stop between two items
//!
//! Misuse of the [`Writer`](crate::Writer) call sequence (closing a scope that
//! is not open, writing an object member without a key) is a programming
//! error and panics instead of producing malformed output.
//!
//! ## Examples
//!
//! ```rust
//! use pff_json::Error;
//!
//! let err = Error::root("file is not an archive");
//! assert!(err.to_string().contains("root item"));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents every failure that aborts an export run.
#[derive(Debug, Error)]
pub enum Error {
    /// The document stream could not be written
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The root of the item tree could not be opened
    #[error("cannot open root item: {0}")]
    Root(String),

    /// The cancellation flag was raised; `documents` complete documents were written
    #[error("export cancelled after {documents} documents")]
    Cancelled { documents: usize },
}

impl Error {
    /// Creates a root error from any displayable provider failure.
    pub fn root<T: fmt::Display>(msg: T) -> Self {
        Error::Root(msg.to_string())
    }

    /// Returns `true` if the run stopped because it was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
