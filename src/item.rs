//! Item records and the value types used to create and change them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{invalid, DriveError};

pub type ItemId = u64;
pub type UserId = u64;

/// Kind of item. Slugs are unique per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    File,
    Folder,
}

impl ItemType {
    pub const fn as_str(self) -> &'static str {
        match self {
            ItemType::File => "file",
            ItemType::Folder => "folder",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Privacy flag gating visibility outside admin and owner contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    Public,
    #[default]
    Private,
}

impl Privacy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Privacy::Public),
            "private" => Ok(Privacy::Private),
            other => Err(invalid("privacy", format!("'{}' is not public or private", other))),
        }
    }
}

/// Stored part of an item. Privacy and guid live in the metadata table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ItemRecord {
    pub item_type: ItemType,
    pub owner: UserId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub mime_type: String,
    pub created_at: u64,
    pub modified_at: u64,
}

/// An uploaded file or folder as seen by callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub item_type: ItemType,
    pub owner: UserId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub mime_type: String,
    pub privacy: Privacy,
    /// Where the uploaded content lives
    pub guid: String,
    pub created_at: u64,
    pub modified_at: u64,
}

impl Item {
    pub(crate) fn from_record(id: ItemId, r: ItemRecord, privacy: Privacy, guid: String) -> Self {
        Item {
            id,
            item_type: r.item_type,
            owner: r.owner,
            title: r.title,
            slug: r.slug,
            content: r.content,
            mime_type: r.mime_type,
            privacy,
            guid,
            created_at: r.created_at,
            modified_at: r.modified_at,
        }
    }

    pub fn is_public(&self) -> bool {
        self.privacy == Privacy::Public
    }
}

/// Arguments for recording a new upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub item_type: ItemType,
    pub owner: UserId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub privacy: Privacy,
}

impl NewItem {
    pub fn file(owner: UserId, title: impl Into<String>) -> Self {
        NewItem { owner, title: title.into(), ..Default::default() }
    }

    pub fn folder(owner: UserId, title: impl Into<String>) -> Self {
        NewItem { item_type: ItemType::Folder, ..Self::file(owner, title) }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = guid.into();
        self
    }

    pub fn privacy(mut self, privacy: Privacy) -> Self {
        self.privacy = privacy;
        self
    }
}

/// Partial field map for an update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemChanges {
    #[serde(default)]
    pub owner: Option<UserId>,
    #[serde(default)]
    pub privacy: Option<Privacy>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl ItemChanges {
    pub fn owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn privacy(mut self, privacy: Privacy) -> Self {
        self.privacy = Some(privacy);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_none()
            && self.privacy.is_none()
            && self.title.is_none()
            && self.content.is_none()
            && self.mime_type.is_none()
    }
}
