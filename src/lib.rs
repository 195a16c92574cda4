//! # pff_json
//!
//! Streaming export of archive item trees (such as the folders, messages and
//! attachments of a personal-folder mail store) into a sequence of indented
//! JSON documents.
//!
//! ## What does it produce?
//!
//! One document per item, written to a single stream and separated by
//! newlines. Every document is complete on its own, so a consumer can parse
//! the stream while the export is still running:
//!
//! ```text
//! {
//!   "path" : "/",
//!   "item type" : 14,
//!   "item type name" : "folder",
//!   "number of sets" : 0,
//!   "entries per set" : 0
//! }
//! {
//!   "path" : "/0",
//!   ...
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Streaming**: the [`Writer`] holds only the stack of open scopes; no
//!   document tree is ever built in memory
//! - **Provider agnostic**: the tree is read through the [`ItemTree`] trait,
//!   so any archive decoder can be plugged in ([`MemoryTree`] ships for tests)
//! - **Fault tolerant**: an unreadable attribute or child is reported to the
//!   [`Diagnostics`] channel and the export carries on
//! - **Bounded**: the walk uses an explicit stack with a depth limit, so a
//!   corrupted archive cannot overflow the native stack
//! - **Exact**: raw bytes travel as padded base64, text escapes every control
//!   character
//!
//! ## Quick Start
//!
//! ```rust
//! use pff_json::{EntryInfo, ItemType, MemoryTree, Value};
//!
//! let mut tree = MemoryTree::new();
//! let root = tree.add_item(ItemType::Folder);
//! let mail = tree.add_item(ItemType::Email);
//! tree.item_mut(mail)
//!     .identifier(2097188)
//!     .entry(0, EntryInfo::new(0x0037, 0x001f).with_name("subject"), Value::from("Hello"));
//! tree.add_child(root, mail);
//! tree.set_root(root);
//!
//! let mut out = Vec::new();
//! let summary = pff_json::export(&tree, &mut out).unwrap();
//! assert_eq!(summary.documents, 2);
//!
//! let text = String::from_utf8(out).unwrap();
//! assert!(text.contains("\"path\" : \"/0\""));
//! assert!(text.contains("\"value\" : \"Hello\""));
//! ```
//!
//! ## Failure Model
//!
//! - Accessor failures of the tree provider are recoverable and become
//!   [`Diagnostic`]s located by item path
//! - An unreadable root, an unwritable output or a cancelled run end the
//!   export with an [`Error`]; every document written before that point is
//!   still complete
//! - Misusing the [`Writer`] call sequence is a bug and panics

pub mod diagnostics;
pub mod error;
pub mod export;
pub mod item;
pub mod options;
pub mod tree;
pub mod value;
pub mod writer;

pub use diagnostics::{Diagnostic, Diagnostics, FieldRef, StderrDiagnostics};
pub use error::{Error, Result};
pub use export::{ExportSummary, Exporter};
pub use item::{EntryInfo, ItemType};
pub use options::{ExportOptions, WriterOptions};
pub use tree::{Fault, ItemId, ItemTree, MemoryError, MemoryItem, MemoryTree};
pub use value::{DecodedValue, Scalar, Value};
pub use writer::Writer;

use std::io;

/// Exports a whole tree to `out` with default options.
///
/// Diagnostics go to standard error. The output is not flushed.
///
/// # Errors
///
/// Returns an error if the root item cannot be opened or writing fails.
pub fn export<T, W>(tree: T, out: W) -> Result<ExportSummary>
where
    T: ItemTree,
    W: io::Write,
{
    export_with_options(tree, out, StderrDiagnostics, ExportOptions::default())
}

/// Exports a whole tree to `out`, reporting to `diagnostics`.
///
/// # Examples
///
/// ```rust
/// use pff_json::{export_with_options, Diagnostic, ExportOptions, Fault, ItemType, MemoryTree};
///
/// let mut tree = MemoryTree::new();
/// let root = tree.add_item(ItemType::Folder);
/// tree.item_mut(root).fail(Fault::Identifier);
/// tree.set_root(root);
///
/// let mut diagnostics: Vec<Diagnostic> = Vec::new();
/// let summary =
///     export_with_options(&tree, Vec::new(), &mut diagnostics, ExportOptions::new()).unwrap();
/// assert_eq!(summary.diagnostics, 1);
/// assert_eq!(diagnostics[0].path, "/");
/// ```
///
/// # Errors
///
/// Returns an error if the root item cannot be opened, writing fails, or the
/// run is cancelled.
pub fn export_with_options<T, W, D>(
    tree: T,
    out: W,
    diagnostics: D,
    options: ExportOptions,
) -> Result<ExportSummary>
where
    T: ItemTree,
    W: io::Write,
    D: Diagnostics,
{
    Exporter::with_options(tree, out, diagnostics, options).export()
}

/// Exports a whole tree into a string, collecting diagnostics instead of
/// printing them.
///
/// # Errors
///
/// Returns an error if the root item cannot be opened.
pub fn to_string<T>(tree: T) -> Result<(String, Vec<Diagnostic>)>
where
    T: ItemTree,
{
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut exporter = Exporter::new(tree, Vec::new(), &mut diagnostics);
    exporter.export()?;
    let bytes = exporter.into_writer().into_inner();
    // the writer only emits UTF-8
    let text = String::from_utf8(bytes)
        .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    Ok((text, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> MemoryTree {
        let mut tree = MemoryTree::new();
        let root = tree.add_item(ItemType::Folder);
        let inbox = tree.add_item(ItemType::Folder);
        let mail = tree.add_item(ItemType::Email);
        tree.item_mut(inbox)
            .identifier(8354)
            .entry(0, EntryInfo::new(0x3001, 0x001f), Value::from("Inbox"));
        tree.add_child(root, inbox);
        tree.add_child(inbox, mail);
        tree.set_root(root);
        tree
    }

    #[test]
    fn test_to_string_document_per_item() {
        let (text, diagnostics) = to_string(&sample_tree()).unwrap();
        assert!(diagnostics.is_empty());
        let documents: Vec<serde_json::Value> = serde_json::Deserializer::from_str(&text)
            .into_iter::<serde_json::Value>()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        let paths: Vec<_> = documents
            .iter()
            .map(|doc| doc["path"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(paths, vec!["/", "/0", "/0/0"]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let tree = MemoryTree::new();
        let err = to_string(&tree).unwrap_err();
        assert!(matches!(err, Error::Root(_)));
    }

    #[test]
    fn test_export_to_writer() {
        let mut out = Vec::new();
        let summary = export(&sample_tree(), &mut out).unwrap();
        assert_eq!(summary, ExportSummary { documents: 3, diagnostics: 0 });
        assert!(out.ends_with(b"}\n"));
    }
}
