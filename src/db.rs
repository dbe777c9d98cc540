//! Database types and global state

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use heed::types::{Bytes, SerdeJson, Str, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use tracing::info;

use crate::config::Config;
use crate::constants::{DEFAULT_MAP_SIZE, MAX_DBS};
use crate::error::{err, DriveError, Result};
use crate::item::ItemRecord;

type BeU64 = U64<byteorder::BigEndian>;

/// All database handles
pub(crate) struct Dbs {
    /// item id -> record
    pub items: Database<BeU64, SerdeJson<ItemRecord>>,
    /// [item_type][slug] -> item id
    pub slugs: Database<Bytes, BeU64>,
    /// [owner][item id] -> item id
    pub owners: Database<Bytes, BeU64>,
    /// [item id][name] -> value
    pub item_meta: Database<Bytes, Str>,
    /// user id -> capability mask
    pub caps: Database<BeU64, BeU64>,
    /// store counters
    pub meta: Database<Str, Str>,
}

// Global state
static ENV: OnceLock<Env> = OnceLock::new();
static DBS: OnceLock<Dbs> = OnceLock::new();
static TEST_LOCK: Mutex<()> = Mutex::new(());
static INIT_PATH: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn dbs() -> Result<&'static Dbs> {
    DBS.get().ok_or(DriveError::NotInitialized)
}

#[inline]
pub(crate) fn env() -> Result<&'static Env> {
    ENV.get().ok_or(DriveError::NotInitialized)
}

/// Whether `init` has opened the store
pub fn is_initialized() -> bool {
    ENV.get().is_some()
}

/// Execute a read-only operation
#[inline]
pub(crate) fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(f: F) -> Result<T> {
    f(dbs()?, &env()?.read_txn().map_err(err)?)
}

/// Initialize the store at `path` with the default map size
pub fn init(path: &str) -> Result<()> {
    open(path, DEFAULT_MAP_SIZE)
}

/// Initialize the store described by a config
pub fn init_with(config: &Config) -> Result<()> {
    let path = config.db_path.to_str().ok_or_else(|| {
        DriveError::Config(format!("db_path is not valid UTF-8: {}", config.db_path.display()))
    })?;
    open(path, config.map_size)
}

fn open(path: &str, map_size: usize) -> Result<()> {
    if let Some(p) = INIT_PATH.get() {
        return if p == path {
            Ok(())
        } else {
            Err(DriveError::AlreadyInitialized(p.clone()))
        };
    }
    std::fs::create_dir_all(path).map_err(err)?;
    // SAFETY: LMDB requires no other processes access this path concurrently during open.
    let e = unsafe {
        EnvOpenOptions::new()
            .map_size(map_size)
            .max_dbs(MAX_DBS)
            .open(Path::new(path))
            .map_err(err)?
    };
    let mut tx = e.write_txn().map_err(err)?;
    let d = Dbs {
        items: e.create_database(&mut tx, Some("items")).map_err(err)?,
        slugs: e.create_database(&mut tx, Some("slugs")).map_err(err)?,
        owners: e.create_database(&mut tx, Some("owners")).map_err(err)?,
        item_meta: e.create_database(&mut tx, Some("item_meta")).map_err(err)?,
        caps: e.create_database(&mut tx, Some("caps")).map_err(err)?,
        meta: e.create_database(&mut tx, Some("meta")).map_err(err)?,
    };
    tx.commit().map_err(err)?;
    let _ = (ENV.set(e), DBS.set(d), INIT_PATH.set(path.to_string()));
    info!(path, map_size, "store opened");
    Ok(())
}

/// Clear all databases (for testing)
pub fn clear_all() -> Result<()> {
    crate::tx::transact(|tx| {
        let d = tx.dbs();
        d.items.clear(tx.tx()).map_err(err)?;
        d.slugs.clear(tx.tx()).map_err(err)?;
        d.owners.clear(tx.tx()).map_err(err)?;
        d.item_meta.clear(tx.tx()).map_err(err)?;
        d.caps.clear(tx.tx()).map_err(err)?;
        d.meta.clear(tx.tx()).map_err(err)
    })
}

/// Get the test lock (for single-threaded tests)
pub fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_init_with_rejects_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let config = Config {
            db_path: OsStr::from_bytes(b"/tmp/drive\xff").into(),
            ..Config::default()
        };
        assert!(matches!(init_with(&config), Err(DriveError::Config(_))));
    }
}
