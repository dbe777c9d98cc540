//! Read operations (no visibility checks, direct LMDB access)

use heed::RoTxn;

use crate::constants::{META_GUID, META_PRIVACY};
use crate::db::{read, Dbs};
use crate::error::{err, Result};
use crate::item::{Item, ItemId, ItemRecord, ItemType, Privacy, UserId};
use crate::keys::{meta_key, meta_name, slug_key, split_key};

/// Assemble an item from its record and metadata
pub(crate) fn hydrate(d: &Dbs, tx: &RoTxn, id: ItemId, record: ItemRecord) -> Result<Item> {
    let privacy = d
        .item_meta
        .get(tx, &meta_key(id, META_PRIVACY))
        .map_err(err)?
        .and_then(|s| s.parse().ok())
        .unwrap_or(Privacy::Private);
    let guid = d
        .item_meta
        .get(tx, &meta_key(id, META_GUID))
        .map_err(err)?
        .map(str::to_string)
        .unwrap_or_default();
    Ok(Item::from_record(id, record, privacy, guid))
}

pub(crate) fn load_item(d: &Dbs, tx: &RoTxn, id: ItemId) -> Result<Option<Item>> {
    match d.items.get(tx, &id).map_err(err)? {
        Some(record) => hydrate(d, tx, id, record).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn slug_lookup(d: &Dbs, tx: &RoTxn, item_type: ItemType, slug: &str) -> Result<Option<ItemId>> {
    d.slugs.get(tx, &slug_key(item_type, slug)).map_err(err)
}

/// Item ids owned by a user, ascending
pub(crate) fn owned_ids(d: &Dbs, tx: &RoTxn, owner: UserId) -> Result<Vec<ItemId>> {
    let mut r = Vec::new();
    for entry in d.owners.prefix_iter(tx, &owner.to_be_bytes()).map_err(err)? {
        let (k, _) = entry.map_err(err)?;
        if let Some((_, id)) = split_key(k) {
            r.push(id);
        }
    }
    Ok(r)
}

/// Get a single item by id
pub fn get_item_by_id(id: ItemId) -> Result<Option<Item>> {
    read(|d, tx| load_item(d, tx, id))
}

/// Get a single item by its slug within an item type
pub fn get_item_by_slug(item_type: ItemType, slug: &str) -> Result<Option<Item>> {
    read(|d, tx| match slug_lookup(d, tx, item_type, slug)? {
        Some(id) => load_item(d, tx, id),
        None => Ok(None),
    })
}

/// Get one metadata value of an item
pub fn get_item_meta(id: ItemId, name: &str) -> Result<Option<String>> {
    read(|d, tx| Ok(d.item_meta.get(tx, &meta_key(id, name)).map_err(err)?.map(str::to_string)))
}

/// List all metadata of an item as (name, value) pairs
pub fn list_item_meta(id: ItemId) -> Result<Vec<(String, String)>> {
    read(|d, tx| {
        let mut r = Vec::new();
        for entry in d.item_meta.prefix_iter(tx, &id.to_be_bytes()).map_err(err)? {
            let (k, v) = entry.map_err(err)?;
            if let Some(name) = meta_name(k) {
                r.push((name.to_string(), v.to_string()));
            }
        }
        Ok(r)
    })
}

/// Number of items owned by a user, any type or privacy
pub fn count_for_owner(owner: UserId) -> Result<usize> {
    read(|d, tx| Ok(owned_ids(d, tx, owner)?.len()))
}
