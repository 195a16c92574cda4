//! Depth-first export of an item tree.
//!
//! The [`Exporter`] walks an [`ItemTree`] and writes one document per item:
//!
//! ```text
//! {
//!   "path" : "/0",
//!   "item type" : 14,
//!   "item type name" : "folder",
//!   "identifier" : 8354,
//!   "number of sets" : 1,
//!   "entries per set" : 1,
//!   "sets" : [
//!     [
//!       {
//!         "entry type" : 12289,
//!         "value type" : 31,
//!         "name" : "display name",
//!         "value" : "Inbox"
//!       }
//!     ]
//!   ]
//! }
//! ```
//!
//! Each document is sealed with [`Writer::reset`] before the item's children
//! are visited, so the stream is usable while the walk is still running.
//! Children are visited in provider order; container items then have their
//! side collection visited under `<path>/unknowns`.
//!
//! The walk keeps its own stack of pending items instead of recursing, so a
//! corrupted archive with absurd nesting cannot exhaust the native stack.
//! Items beyond [`ExportOptions::max_depth`] are skipped with a diagnostic.
//!
//! Any accessor failure is reported to the [`Diagnostics`] sink with the item
//! path, and the walk moves on to the next field, entry or child.

use crate::{
    DecodedValue, Diagnostic, Diagnostics, Error, ExportOptions, FieldRef, ItemTree, ItemType,
    Result, Writer,
};
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const ROOT_PATH: &str = "/";
const SECONDARY_SEGMENT: &str = "unknowns";

/// Totals of a finished export run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Documents written, one per visited item.
    pub documents: usize,
    /// Diagnostics reported.
    pub diagnostics: usize,
}

/// An item whose children are still being visited.
struct Pending<I> {
    item: I,
    path: String,
    depth: usize,
    next_child: u32,
    child_count: u32,
    secondary_pending: bool,
}

/// Drives a [`Writer`] over an [`ItemTree`].
///
/// # Examples
///
/// ```rust
/// use pff_json::{Diagnostic, Exporter, ItemType, MemoryTree};
///
/// let mut tree = MemoryTree::new();
/// let root = tree.add_item(ItemType::Folder);
/// tree.set_root(root);
///
/// let mut diagnostics: Vec<Diagnostic> = Vec::new();
/// let mut exporter = Exporter::new(&tree, Vec::new(), &mut diagnostics);
/// let summary = exporter.export().unwrap();
/// assert_eq!(summary.documents, 1);
///
/// let text = String::from_utf8(exporter.into_writer().into_inner()).unwrap();
/// assert!(text.starts_with("{\n  \"path\" : \"/\""));
/// ```
pub struct Exporter<T, W, D> {
    tree: T,
    writer: Writer<W>,
    diagnostics: D,
    options: ExportOptions,
    cancel: Option<Arc<AtomicBool>>,
    summary: ExportSummary,
}

impl<T, W, D> Exporter<T, W, D>
where
    T: ItemTree,
    W: Write,
    D: Diagnostics,
{
    pub fn new(tree: T, out: W, diagnostics: D) -> Self {
        Self::with_options(tree, out, diagnostics, ExportOptions::default())
    }

    pub fn with_options(tree: T, out: W, diagnostics: D, options: ExportOptions) -> Self {
        Exporter {
            tree,
            writer: Writer::with_options(out, options.writer.clone()),
            diagnostics,
            options,
            cancel: None,
            summary: ExportSummary::default(),
        }
    }

    /// Installs a flag checked before every item; raising it stops the run
    /// with [`Error::Cancelled`] after the last complete document.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Exports the whole tree, starting at the provider's root item.
    ///
    /// # Errors
    ///
    /// Fails when the root cannot be opened, the output cannot be written,
    /// or the run is cancelled.
    pub fn export(&mut self) -> Result<ExportSummary> {
        let root = self.tree.root().map_err(Error::root)?;
        self.export_item(root)
    }

    /// Exports the subtree below `item`, which gets the root path.
    ///
    /// # Errors
    ///
    /// Fails when the output cannot be written or the run is cancelled.
    pub fn export_item(&mut self, item: T::Item) -> Result<ExportSummary> {
        self.summary = ExportSummary::default();
        let max_depth = self.options.max_depth;

        let mut stack = vec![self.visit(item, ROOT_PATH.to_string(), 0)?];
        while let Some(parent) = stack.last_mut() {
            if parent.next_child < parent.child_count {
                let index = parent.next_child;
                parent.next_child += 1;
                let path = child_path(&parent.path, index);
                let depth = parent.depth + 1;
                if depth > max_depth {
                    self.report(&path, FieldRef::DepthLimit, DepthExceeded(max_depth));
                    continue;
                }
                match self.tree.child(&parent.item, index) {
                    Ok(child) => stack.push(self.visit(child, path, depth)?),
                    Err(e) => self.report(&parent.path, FieldRef::Child { index }, e),
                }
            } else if parent.secondary_pending {
                parent.secondary_pending = false;
                let path = child_path(&parent.path, SECONDARY_SEGMENT);
                let depth = parent.depth + 1;
                match self.tree.secondary_collection(&parent.item) {
                    Ok(Some(_)) if depth > max_depth => {
                        self.report(&path, FieldRef::DepthLimit, DepthExceeded(max_depth));
                    }
                    Ok(Some(collection)) => stack.push(self.visit(collection, path, depth)?),
                    Ok(None) => {}
                    Err(e) => self.report(&parent.path, FieldRef::Secondary, e),
                }
            } else {
                stack.pop();
            }
        }

        Ok(self.summary)
    }

    #[must_use]
    pub fn writer(&self) -> &Writer<W> {
        &self.writer
    }

    pub fn into_writer(self) -> Writer<W> {
        self.writer
    }

    pub fn into_parts(self) -> (Writer<W>, D) {
        (self.writer, self.diagnostics)
    }

    /// Writes the document for `item` and prepares its child walk.
    fn visit(&mut self, item: T::Item, path: String, depth: usize) -> Result<Pending<T::Item>> {
        if self.is_cancelled() {
            return Err(Error::Cancelled {
                documents: self.summary.documents,
            });
        }

        let item_type = self.write_document(&item, &path)?;

        let child_count = match self.tree.child_count(&item) {
            Ok(count) => count,
            Err(e) => {
                self.report(&path, FieldRef::ChildCount, e);
                0
            }
        };
        let secondary_pending =
            self.options.follow_secondary && item_type.map_or(false, ItemType::is_container);

        Ok(Pending {
            item,
            path,
            depth,
            next_child: 0,
            child_count,
            secondary_pending,
        })
    }

    fn write_document(&mut self, item: &T::Item, path: &str) -> Result<Option<ItemType>> {
        self.writer.open_object()?;
        self.writer.write_member("path", path)?;

        let item_type = match self.tree.item_type(item) {
            Ok(item_type) => {
                self.writer.write_member("item type", item_type.code())?;
                self.writer.write_member("item type name", item_type.name())?;
                Some(item_type)
            }
            Err(e) => {
                self.report(path, FieldRef::ItemType, e);
                None
            }
        };

        match self.tree.identifier(item) {
            Ok(Some(identifier)) => self.writer.write_member("identifier", identifier)?,
            Ok(None) => {}
            Err(e) => self.report(path, FieldRef::Identifier, e),
        }

        let sets = self.tree.set_count(item);
        let sets = self.write_count(path, FieldRef::SetCount, "number of sets", sets)?;
        let entries = self.tree.entries_per_set(item);
        let entries = self.write_count(path, FieldRef::EntriesPerSet, "entries per set", entries)?;

        if sets > 0 {
            self.writer.open_member_array("sets")?;
            for set in 0..sets {
                self.writer.open_array()?;
                for entry in 0..entries {
                    self.write_entry(item, path, set, entry)?;
                }
                self.writer.close_array()?;
            }
            self.writer.close_member_array()?;
        }

        self.writer.close_object()?;
        self.writer.reset()?;
        self.summary.documents += 1;
        Ok(item_type)
    }

    /// Writes a count member, or reports it and counts 0.
    fn write_count(
        &mut self,
        path: &str,
        field: FieldRef,
        key: &str,
        count: std::result::Result<u32, T::Error>,
    ) -> Result<u32> {
        match count {
            Ok(count) => {
                self.writer.write_member(key, count)?;
                Ok(count)
            }
            Err(e) => {
                self.report(path, field, e);
                Ok(0)
            }
        }
    }

    fn write_entry(&mut self, item: &T::Item, path: &str, set: u32, entry: u32) -> Result<()> {
        self.writer.open_object()?;

        match self.tree.entry(item, set, entry) {
            Ok(info) => {
                self.writer.write_member("entry type", info.entry_type)?;
                self.writer.write_member("value type", info.value_type)?;
                if let Some(name) = &info.name {
                    self.writer.write_member("name", name)?;
                }
                match self.tree.value(item, set, info.entry_type) {
                    Ok(DecodedValue::Single(value)) => {
                        self.writer.write_member("value", value.as_scalar())?;
                    }
                    Ok(DecodedValue::Multiple(values)) => {
                        self.writer.open_member_array("value")?;
                        for value in &values {
                            self.writer.write_element(value.as_scalar())?;
                        }
                        self.writer.close_member_array()?;
                    }
                    Err(e) => self.report(path, FieldRef::Value { set, entry }, e),
                }
            }
            Err(e) => self.report(path, FieldRef::Entry { set, entry }, e),
        }

        self.writer.close_object()
    }

    fn report<E: fmt::Display>(&mut self, path: &str, field: FieldRef, error: E) {
        self.diagnostics.report(Diagnostic::new(path, field, error));
        self.summary.diagnostics += 1;
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

struct DepthExceeded(usize);

impl fmt::Display for DepthExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item nested deeper than {} levels, skipped", self.0)
    }
}

/// Appends one segment to an item path.
fn child_path<S: fmt::Display>(parent: &str, segment: S) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, segment)
    } else {
        format!("{}/{}", parent, segment)
    }
}
