//! Transaction wrapper for writes

use heed::RwTxn;

use crate::constants::{MAX_SLUG_SUFFIX, META_GUID, META_PRIVACY};
use crate::db::{dbs, env, Dbs};
use crate::error::{err, invalid, Result};
use crate::item::{ItemId, ItemRecord, ItemType, NewItem, Privacy, UserId};
use crate::keys::{key, meta_key, slug_key};
use crate::slugs;

/// Transaction wrapper for batched writes
pub struct Tx {
    txn: RwTxn<'static>,
    dbs: &'static Dbs,
}

impl Tx {
    #[inline]
    pub(crate) fn new() -> Result<Self> {
        Ok(Tx {
            txn: env()?.write_txn().map_err(err)?,
            dbs: dbs()?,
        })
    }

    #[inline]
    pub(crate) fn tx(&mut self) -> &mut RwTxn<'static> {
        &mut self.txn
    }

    #[inline]
    pub(crate) fn dbs(&self) -> &'static Dbs {
        self.dbs
    }

    #[inline]
    pub(crate) fn commit(self) -> Result<()> {
        self.txn.commit().map_err(err)
    }

    /// Record a new upload and return its id
    pub fn insert_item(&mut self, new: &NewItem, now: u64) -> Result<ItemId> {
        if new.owner == 0 {
            return Err(invalid("owner", "an item needs an owner"));
        }
        if new.title.trim().is_empty() {
            return Err(invalid("title", "title cannot be empty"));
        }
        let id = self.next_id()?;
        self.set_next_id(id + 1)?;
        let slug = self.unique_slug(new.item_type, &new.title, id)?;

        let record = ItemRecord {
            item_type: new.item_type,
            owner: new.owner,
            title: new.title.clone(),
            slug,
            content: new.content.clone(),
            mime_type: new.mime_type.clone(),
            created_at: now,
            modified_at: now,
        };
        let d = self.dbs;
        d.slugs.put(self.tx(), &slug_key(record.item_type, &record.slug), &id).map_err(err)?;
        d.owners.put(self.tx(), &key(record.owner, id), &id).map_err(err)?;
        self.put_record(id, &record)?;
        self.set_privacy(id, new.privacy)?;
        if !new.guid.is_empty() {
            self.set_meta(id, META_GUID, &new.guid)?;
        }
        Ok(id)
    }

    /// Load the stored record for an item
    pub(crate) fn load(&mut self, id: ItemId) -> Result<Option<ItemRecord>> {
        let d = self.dbs;
        d.items.get(self.tx(), &id).map_err(err)
    }

    pub(crate) fn put_record(&mut self, id: ItemId, record: &ItemRecord) -> Result<()> {
        let d = self.dbs;
        d.items.put(self.tx(), &id, record).map_err(err)
    }

    /// Move an item between owners in the author index
    pub fn reassign(&mut self, id: ItemId, from: UserId, to: UserId) -> Result<()> {
        let d = self.dbs;
        d.owners.delete(self.tx(), &key(from, id)).map_err(err)?;
        d.owners.put(self.tx(), &key(to, id), &id).map_err(err)
    }

    pub fn set_privacy(&mut self, id: ItemId, privacy: Privacy) -> Result<()> {
        self.set_meta(id, META_PRIVACY, privacy.as_str())
    }

    /// Set a metadata value on an item
    pub fn set_meta(&mut self, id: ItemId, name: &str, value: &str) -> Result<()> {
        let d = self.dbs;
        d.item_meta.put(self.tx(), &meta_key(id, name), value).map_err(err)
    }

    /// Replace a user's capability mask
    pub fn set_caps(&mut self, user: UserId, mask: u64) -> Result<()> {
        let d = self.dbs;
        if mask == 0 {
            d.caps.delete(self.tx(), &user).map_err(err)?;
            return Ok(());
        }
        d.caps.put(self.tx(), &user, &mask).map_err(err)
    }

    pub fn caps(&mut self, user: UserId) -> Result<u64> {
        let d = self.dbs;
        Ok(d.caps.get(self.tx(), &user).map_err(err)?.unwrap_or(0))
    }

    fn unique_slug(&mut self, item_type: ItemType, title: &str, id: ItemId) -> Result<String> {
        let mut base = slugs::slugify(title);
        if base.is_empty() {
            base = id.to_string();
        }
        let d = self.dbs;
        for candidate in slugs::candidates(&base, MAX_SLUG_SUFFIX) {
            if d.slugs.get(self.tx(), &slug_key(item_type, &candidate)).map_err(err)?.is_none() {
                return Ok(candidate);
            }
        }
        Err(invalid("title", format!("no free slug left for '{}'", base)))
    }

    pub(crate) fn next_id(&mut self) -> Result<u64> {
        let d = self.dbs;
        Ok(d.meta
            .get(self.tx(), "next_id")
            .map_err(err)?
            .and_then(|s| s.parse().ok())
            .unwrap_or(1u64))
    }

    pub(crate) fn set_next_id(&mut self, id: u64) -> Result<()> {
        let d = self.dbs;
        d.meta.put(self.tx(), "next_id", &id.to_string()).map_err(err)
    }
}

/// Run multiple operations in a single transaction
#[inline]
pub fn transact<T, F: FnOnce(&mut Tx) -> Result<T>>(f: F) -> Result<T> {
    let mut tx = Tx::new()?;
    let r = f(&mut tx)?;
    tx.commit()?;
    Ok(r)
}

pub(crate) fn current_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
