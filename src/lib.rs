//! drivebit - file-sharing item store with scope-based visibility
//!
//! Items (uploaded files and folders) live in LMDB. Reads go through
//! [`get`], which resolves a [`Scope`] against an explicit
//! [`ViewerContext`] before touching the store. Writes go through
//! [`save_item`] and [`update_item`].

pub mod caps;
pub mod config;
pub mod constants;
pub mod context;
mod db;
pub mod error;
pub mod item;
pub mod keys;
#[cfg(feature = "server")]
pub mod logging;
pub mod mutate;
pub mod policy;
pub mod query;
mod read;
pub mod slugs;
mod tx;

pub use caps::{can_edit, check, grant_caps, is_moderator, revoke_caps, set_caps, user_caps};
pub use config::Config;
pub use constants::{caps_to_names, names_to_caps, EDIT_OTHERS, MODERATE, UPLOAD};
pub use context::{DisplayedProfile, ViewerContext};
pub use db::{clear_all, init, init_with, is_initialized, test_lock};
pub use error::{DriveError, Result};
pub use item::{Item, ItemChanges, ItemId, ItemType, NewItem, Privacy, UserId};
pub use mutate::{save_item, update_item};
pub use policy::{resolve, Scope, Visibility};
pub use query::{authorize, get, ItemQuery, Order, OrderBy, QueryPlan, ResultSet};
pub use read::{count_for_owner, get_item_by_id, get_item_by_slug, get_item_meta, list_item_meta};
pub use tx::{transact, Tx};
