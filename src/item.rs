//! Item type tags and attribute entry descriptors.
//!
//! [`ItemType`] pairs the raw item type code reported by an archive with its
//! human-readable name. Codes the table does not know are kept as
//! [`ItemType::Other`] so the raw value still reaches the output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;

/// The kind of an archive item.
///
/// `Other` holding a code from the known table behaves as that known kind:
/// it compares equal to it, and shares its name and container status.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum ItemType {
    Undefined,
    Activity,
    Appointment,
    Attachment,
    Attachments,
    Common,
    Configuration,
    ConflictMessage,
    Contact,
    DistributionList,
    Document,
    Email,
    EmailSmime,
    Fax,
    Folder,
    Meeting,
    Mms,
    Note,
    PostingNote,
    Recipients,
    RssFeed,
    Sharing,
    Sms,
    SubAssociatedContents,
    SubFolders,
    SubMessages,
    Task,
    TaskRequest,
    Voicemail,
    Unknown,
    /// A raw code, normally one outside the known table.
    Other(u8),
}

const KNOWN: [ItemType; 30] = [
    ItemType::Undefined,
    ItemType::Activity,
    ItemType::Appointment,
    ItemType::Attachment,
    ItemType::Attachments,
    ItemType::Common,
    ItemType::Configuration,
    ItemType::ConflictMessage,
    ItemType::Contact,
    ItemType::DistributionList,
    ItemType::Document,
    ItemType::Email,
    ItemType::EmailSmime,
    ItemType::Fax,
    ItemType::Folder,
    ItemType::Meeting,
    ItemType::Mms,
    ItemType::Note,
    ItemType::PostingNote,
    ItemType::Recipients,
    ItemType::RssFeed,
    ItemType::Sharing,
    ItemType::Sms,
    ItemType::SubAssociatedContents,
    ItemType::SubFolders,
    ItemType::SubMessages,
    ItemType::Task,
    ItemType::TaskRequest,
    ItemType::Voicemail,
    ItemType::Unknown,
];

impl ItemType {
    /// Resolves a raw type code.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pff_json::ItemType;
    ///
    /// assert_eq!(ItemType::from_code(14), ItemType::Folder);
    /// assert_eq!(ItemType::from_code(200), ItemType::Other(200));
    /// assert_eq!(ItemType::from_code(200).code(), 200);
    /// ```
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        KNOWN
            .get(usize::from(code))
            .copied()
            .unwrap_or(ItemType::Other(code))
    }

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            ItemType::Other(code) => code,
            known => KNOWN
                .iter()
                .position(|candidate| mem::discriminant(candidate) == mem::discriminant(&known))
                .map_or(u8::MAX, |index| index as u8),
        }
    }

    /// Maps `Other` holding a known code to the known variant.
    fn normalized(self) -> Self {
        match self {
            ItemType::Other(code) => ItemType::from_code(code),
            known => known,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self.normalized() {
            ItemType::Undefined => "undefined",
            ItemType::Activity => "activity",
            ItemType::Appointment => "appointment",
            ItemType::Attachment => "attachment",
            ItemType::Attachments => "attachments",
            ItemType::Common => "common",
            ItemType::Configuration => "configuration",
            ItemType::ConflictMessage => "conflict message",
            ItemType::Contact => "contact",
            ItemType::DistributionList => "distribution list",
            ItemType::Document => "document",
            ItemType::Email => "email",
            ItemType::EmailSmime => "SMIME email",
            ItemType::Fax => "fax",
            ItemType::Folder => "folder",
            ItemType::Meeting => "meeting",
            ItemType::Mms => "mms",
            ItemType::Note => "note",
            ItemType::PostingNote => "posting note",
            ItemType::Recipients => "recipients",
            ItemType::RssFeed => "RSS feed",
            ItemType::Sharing => "sharing",
            ItemType::Sms => "SMS",
            ItemType::SubAssociatedContents => "associated contents",
            ItemType::SubFolders => "folders",
            ItemType::SubMessages => "messages",
            ItemType::Task => "task",
            ItemType::TaskRequest => "request",
            ItemType::Voicemail => "voicemail",
            ItemType::Unknown => "unknown",
            ItemType::Other(_) => "unrecognised",
        }
    }

    /// Container items carry a side collection that plain child
    /// enumeration does not reach.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self.normalized(), ItemType::Folder)
    }
}

impl PartialEq for ItemType {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for ItemType {}

impl Hash for ItemType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code().hash(state);
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Describes one entry of an attribute set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryInfo {
    /// Code used to look the value up with [`ItemTree::value`](crate::ItemTree::value).
    pub entry_type: u32,
    pub value_type: u32,
    /// Symbolic name, when the provider can resolve one.
    pub name: Option<String>,
}

impl EntryInfo {
    #[must_use]
    pub fn new(entry_type: u32, value_type: u32) -> Self {
        EntryInfo {
            entry_type,
            value_type,
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}
