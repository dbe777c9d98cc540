//! Item writes: recording uploads and applying partial updates

use tracing::{info, warn};

use crate::db::read;
use crate::error::{invalid, DriveError, Result};
use crate::item::{Item, ItemChanges, ItemId, NewItem};
use crate::read::load_item;
use crate::tx::{current_epoch, transact};

/// Record a new upload. Returns the new item id.
pub fn save_item(new: NewItem) -> Result<ItemId> {
    let id = transact(|tx| tx.insert_item(&new, current_epoch()))?;
    info!(id, owner = new.owner, item_type = %new.item_type, "item saved");
    Ok(id)
}

/// Apply `changes` to the stored copy of `item` and return the result.
///
/// Fields left as `None` are not touched. If the item no longer exists the
/// update fails with [`DriveError::UpdateFailed`] and nothing is written.
pub fn update_item(changes: &ItemChanges, item: &Item) -> Result<Item> {
    if changes.owner == Some(0) {
        return Err(invalid("owner", "an item needs an owner"));
    }
    if changes.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(invalid("title", "title cannot be empty"));
    }
    let id = item.id;
    let written = transact(|tx| {
        let Some(mut record) = tx.load(id)? else {
            return Ok(false);
        };
        if let Some(owner) = changes.owner {
            if owner != record.owner {
                tx.reassign(id, record.owner, owner)?;
                record.owner = owner;
            }
        }
        if let Some(title) = &changes.title {
            record.title = title.clone();
        }
        if let Some(content) = &changes.content {
            record.content = content.clone();
        }
        if let Some(mime_type) = &changes.mime_type {
            record.mime_type = mime_type.clone();
        }
        if let Some(privacy) = changes.privacy {
            tx.set_privacy(id, privacy)?;
        }
        record.modified_at = current_epoch().max(record.modified_at);
        tx.put_record(id, &record)?;
        Ok(true)
    })?;

    if !written {
        warn!(id, "update on missing item");
        return Err(DriveError::UpdateFailed(id));
    }
    info!(id, owner = ?changes.owner, privacy = ?changes.privacy, "item updated");
    read(|d, tx| load_item(d, tx, id))?.ok_or(DriveError::UpdateFailed(id))
}
