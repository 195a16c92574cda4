//! The item tree capability interface and an in-memory provider.
//!
//! The exporter never owns the tree it walks. It borrows an [`ItemTree`],
//! a narrow set of accessors over opaque item handles, so any archive
//! decoder can sit behind it. Every accessor returns its failure as a value;
//! the exporter decides what to log and where to continue.
//!
//! [`MemoryTree`] keeps items in an arena and answers the same accessors from
//! memory. Its attribute sets are [`IndexMap`]s keyed by entry type, which
//! keeps the provider's entry order while allowing lookups by entry type.
//! Individual accessors can be made to fail with [`Fault`]s.
//!
//! ## Examples
//!
//! ```rust
//! use pff_json::{EntryInfo, ItemTree, ItemType, MemoryTree, Value};
//!
//! let mut tree = MemoryTree::new();
//! let root = tree.add_item(ItemType::Folder);
//! let mail = tree.add_item(ItemType::Email);
//! tree.item_mut(mail)
//!     .identifier(42)
//!     .entry(0, EntryInfo::new(0x0037, 0x001f).with_name("subject"), Value::from("hi"));
//! tree.add_child(root, mail);
//! tree.set_root(root);
//!
//! let root = tree.root().unwrap();
//! assert_eq!(tree.child_count(&root).unwrap(), 1);
//! let mail = tree.child(&root, 0).unwrap();
//! assert_eq!(tree.identifier(&mail).unwrap(), Some(42));
//! assert_eq!(tree.set_count(&mail).unwrap(), 1);
//! ```

use crate::{DecodedValue, EntryInfo, ItemType};
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// Read access to a hierarchical item tree.
///
/// Indices are 0-based and follow the provider's own order.
pub trait ItemTree {
    /// Handle to one item; dropping it releases the item.
    type Item;
    type Error: fmt::Display;

    fn root(&self) -> Result<Self::Item, Self::Error>;

    fn item_type(&self, item: &Self::Item) -> Result<ItemType, Self::Error>;

    /// Numeric identifier, `None` when the item has none.
    fn identifier(&self, item: &Self::Item) -> Result<Option<u32>, Self::Error>;

    fn set_count(&self, item: &Self::Item) -> Result<u32, Self::Error>;

    fn entries_per_set(&self, item: &Self::Item) -> Result<u32, Self::Error>;

    fn entry(&self, item: &Self::Item, set: u32, entry: u32) -> Result<EntryInfo, Self::Error>;

    /// Decodes the value stored under `entry_type` in attribute set `set`.
    fn value(
        &self,
        item: &Self::Item,
        set: u32,
        entry_type: u32,
    ) -> Result<DecodedValue, Self::Error>;

    fn child_count(&self, item: &Self::Item) -> Result<u32, Self::Error>;

    fn child(&self, item: &Self::Item, index: u32) -> Result<Self::Item, Self::Error>;

    /// Side collection of a container item, unreachable through [`ItemTree::child`].
    fn secondary_collection(&self, item: &Self::Item) -> Result<Option<Self::Item>, Self::Error>;
}

impl<T: ItemTree + ?Sized> ItemTree for &T {
    type Item = T::Item;
    type Error = T::Error;

    fn root(&self) -> Result<Self::Item, Self::Error> {
        (**self).root()
    }

    fn item_type(&self, item: &Self::Item) -> Result<ItemType, Self::Error> {
        (**self).item_type(item)
    }

    fn identifier(&self, item: &Self::Item) -> Result<Option<u32>, Self::Error> {
        (**self).identifier(item)
    }

    fn set_count(&self, item: &Self::Item) -> Result<u32, Self::Error> {
        (**self).set_count(item)
    }

    fn entries_per_set(&self, item: &Self::Item) -> Result<u32, Self::Error> {
        (**self).entries_per_set(item)
    }

    fn entry(&self, item: &Self::Item, set: u32, entry: u32) -> Result<EntryInfo, Self::Error> {
        (**self).entry(item, set, entry)
    }

    fn value(
        &self,
        item: &Self::Item,
        set: u32,
        entry_type: u32,
    ) -> Result<DecodedValue, Self::Error> {
        (**self).value(item, set, entry_type)
    }

    fn child_count(&self, item: &Self::Item) -> Result<u32, Self::Error> {
        (**self).child_count(item)
    }

    fn child(&self, item: &Self::Item, index: u32) -> Result<Self::Item, Self::Error> {
        (**self).child(item, index)
    }

    fn secondary_collection(&self, item: &Self::Item) -> Result<Option<Self::Item>, Self::Error> {
        (**self).secondary_collection(item)
    }
}

/// Failure reported by a [`MemoryTree`] accessor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MemoryError(String);

impl MemoryError {
    fn new<T: fmt::Display>(msg: T) -> Self {
        MemoryError(msg.to_string())
    }
}

/// Handle to an item stored in a [`MemoryTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemId(usize);

/// An accessor that a [`MemoryItem`] should fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    ItemType,
    Identifier,
    SetCount,
    EntriesPerSet,
    Entry { set: u32, entry: u32 },
    /// Fails the value lookup of entry type `entry_type` in set `set`.
    Value { set: u32, entry_type: u32 },
    ChildCount,
    Child(u32),
    Secondary,
}

#[derive(Clone, Debug)]
struct MemoryEntry {
    value_type: u32,
    name: Option<String>,
    value: DecodedValue,
}

/// One item of a [`MemoryTree`], configured through builder-style methods.
#[derive(Clone, Debug, Default)]
pub struct MemoryItem {
    item_type: Option<ItemType>,
    identifier: Option<u32>,
    sets: Vec<IndexMap<u32, MemoryEntry>>,
    children: Vec<ItemId>,
    secondary: Option<ItemId>,
    faults: Vec<Fault>,
}

impl MemoryItem {
    pub fn identifier(&mut self, identifier: u32) -> &mut Self {
        self.identifier = Some(identifier);
        self
    }

    /// Appends an entry to attribute set `set`, creating empty sets up to it.
    ///
    /// An entry with the same entry type in the same set is replaced.
    pub fn entry<V>(&mut self, set: usize, info: EntryInfo, value: V) -> &mut Self
    where
        V: Into<DecodedValue>,
    {
        if self.sets.len() <= set {
            self.sets.resize_with(set + 1, IndexMap::new);
        }
        self.sets[set].insert(
            info.entry_type,
            MemoryEntry {
                value_type: info.value_type,
                name: info.name,
                value: value.into(),
            },
        );
        self
    }

    /// Appends an attribute set without entries.
    pub fn empty_set(&mut self) -> &mut Self {
        self.sets.push(IndexMap::new());
        self
    }

    pub fn fail(&mut self, fault: Fault) -> &mut Self {
        self.faults.push(fault);
        self
    }

    fn check(&self, fault: Fault) -> Result<(), MemoryError> {
        if self.faults.contains(&fault) {
            Err(MemoryError::new(format!("injected fault: {:?}", fault)))
        } else {
            Ok(())
        }
    }
}

/// An arena-backed [`ItemTree`].
#[derive(Clone, Debug, Default)]
pub struct MemoryTree {
    items: Vec<MemoryItem>,
    root: Option<ItemId>,
}

impl MemoryTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached item of the given type and returns its handle.
    pub fn add_item(&mut self, item_type: ItemType) -> ItemId {
        self.items.push(MemoryItem {
            item_type: Some(item_type),
            ..MemoryItem::default()
        });
        ItemId(self.items.len() - 1)
    }

    /// # Panics
    ///
    /// Panics if `id` was not created by this tree.
    pub fn item_mut(&mut self, id: ItemId) -> &mut MemoryItem {
        &mut self.items[id.0]
    }

    pub fn add_child(&mut self, parent: ItemId, child: ItemId) {
        self.items[parent.0].children.push(child);
    }

    pub fn set_secondary(&mut self, parent: ItemId, collection: ItemId) {
        self.items[parent.0].secondary = Some(collection);
    }

    pub fn set_root(&mut self, root: ItemId) {
        self.root = Some(root);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn get(&self, id: ItemId) -> Result<&MemoryItem, MemoryError> {
        self.items
            .get(id.0)
            .ok_or_else(|| MemoryError::new(format!("no item {}", id.0)))
    }

    fn stored_entry(
        &self,
        id: ItemId,
        set: u32,
        entry: u32,
    ) -> Result<(u32, &MemoryEntry), MemoryError> {
        let item = self.get(id)?;
        item.check(Fault::Entry { set, entry })?;
        item.sets
            .get(set as usize)
            .and_then(|entries| entries.get_index(entry as usize))
            .map(|(code, stored)| (*code, stored))
            .ok_or_else(|| MemoryError::new(format!("no entry {} in set {}", entry, set)))
    }
}

fn count(len: usize) -> Result<u32, MemoryError> {
    u32::try_from(len).map_err(MemoryError::new)
}

impl ItemTree for MemoryTree {
    type Item = ItemId;
    type Error = MemoryError;

    fn root(&self) -> Result<ItemId, MemoryError> {
        self.root.ok_or_else(|| MemoryError::new("tree has no root"))
    }

    fn item_type(&self, item: &ItemId) -> Result<ItemType, MemoryError> {
        let item = self.get(*item)?;
        item.check(Fault::ItemType)?;
        item.item_type
            .ok_or_else(|| MemoryError::new("item type not set"))
    }

    fn identifier(&self, item: &ItemId) -> Result<Option<u32>, MemoryError> {
        let item = self.get(*item)?;
        item.check(Fault::Identifier)?;
        Ok(item.identifier)
    }

    fn set_count(&self, item: &ItemId) -> Result<u32, MemoryError> {
        let item = self.get(*item)?;
        item.check(Fault::SetCount)?;
        count(item.sets.len())
    }

    fn entries_per_set(&self, item: &ItemId) -> Result<u32, MemoryError> {
        let item = self.get(*item)?;
        item.check(Fault::EntriesPerSet)?;
        count(item.sets.iter().map(IndexMap::len).max().unwrap_or(0))
    }

    fn entry(&self, item: &ItemId, set: u32, entry: u32) -> Result<EntryInfo, MemoryError> {
        let (entry_type, stored) = self.stored_entry(*item, set, entry)?;
        Ok(EntryInfo {
            entry_type,
            value_type: stored.value_type,
            name: stored.name.clone(),
        })
    }

    fn value(&self, item: &ItemId, set: u32, entry_type: u32) -> Result<DecodedValue, MemoryError> {
        let item = self.get(*item)?;
        item.check(Fault::Value { set, entry_type })?;
        item.sets
            .get(set as usize)
            .and_then(|entries| entries.get(&entry_type))
            .map(|stored| stored.value.clone())
            .ok_or_else(|| {
                MemoryError::new(format!(
                    "no value for entry type 0x{:04x} in set {}",
                    entry_type, set
                ))
            })
    }

    fn child_count(&self, item: &ItemId) -> Result<u32, MemoryError> {
        let item = self.get(*item)?;
        item.check(Fault::ChildCount)?;
        count(item.children.len())
    }

    fn child(&self, item: &ItemId, index: u32) -> Result<ItemId, MemoryError> {
        let item = self.get(*item)?;
        item.check(Fault::Child(index))?;
        item.children
            .get(index as usize)
            .copied()
            .ok_or_else(|| MemoryError::new(format!("no child {}", index)))
    }

    fn secondary_collection(&self, item: &ItemId) -> Result<Option<ItemId>, MemoryError> {
        let item = self.get(*item)?;
        item.check(Fault::Secondary)?;
        Ok(item.secondary)
    }
}
