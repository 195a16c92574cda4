//! The diagnostics channel.
//!
//! Recoverable failures met during an export (an unreadable attribute, a
//! child that cannot be opened) are reported here, never in the document
//! stream. Each [`Diagnostic`] carries the path of the item it concerns and a
//! [`FieldRef`] naming what could not be read.
//!
//! ## Examples
//!
//! ```rust
//! use pff_json::{Diagnostic, FieldRef};
//!
//! let diagnostic = Diagnostic::new("/0/2", FieldRef::Value { set: 0, entry: 1 }, "corrupt record");
//! assert_eq!(diagnostic.to_string(), "/0/2: set 0 entry 1: value: corrupt record");
//! ```

use std::fmt;
use std::io::{self, Write};

/// What an export step failed to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRef {
    ItemType,
    Identifier,
    SetCount,
    EntriesPerSet,
    Entry { set: u32, entry: u32 },
    Value { set: u32, entry: u32 },
    ChildCount,
    Child { index: u32 },
    Secondary,
    /// The item lies beyond the configured depth limit.
    DepthLimit,
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::ItemType => f.write_str("item type"),
            FieldRef::Identifier => f.write_str("identifier"),
            FieldRef::SetCount => f.write_str("number of sets"),
            FieldRef::EntriesPerSet => f.write_str("entries per set"),
            FieldRef::Entry { set, entry } => write!(f, "set {} entry {}", set, entry),
            FieldRef::Value { set, entry } => write!(f, "set {} entry {}: value", set, entry),
            FieldRef::ChildCount => f.write_str("number of children"),
            FieldRef::Child { index } => write!(f, "child {}", index),
            FieldRef::Secondary => f.write_str("unknowns"),
            FieldRef::DepthLimit => f.write_str("depth limit"),
        }
    }
}

/// One recoverable failure, located by item path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: String,
    pub field: FieldRef,
    pub message: String,
}

impl Diagnostic {
    pub fn new<T: fmt::Display>(path: &str, field: FieldRef, message: T) -> Self {
        Diagnostic {
            path: path.to_string(),
            field,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.path, self.field, self.message)
    }
}

/// Receiver of diagnostics.
pub trait Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics in order.
impl Diagnostics for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Writes one line per diagnostic to standard error.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrDiagnostics;

impl Diagnostics for StderrDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        // a closed stderr must not end the export
        let _ = writeln!(io::stderr().lock(), "warning: {}", diagnostic);
    }
}
