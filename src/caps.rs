//! Per-user capability masks

use crate::constants::{EDIT_OTHERS, MODERATE};
use crate::context::ViewerContext;
use crate::db::read;
use crate::error::{err, Result};
use crate::item::{Item, UserId};
use crate::tx::transact;

/// Add capabilities to a user (OR with existing mask)
pub fn grant_caps(user: UserId, mask: u64) -> Result<()> {
    transact(|tx| {
        let v = tx.caps(user)? | mask;
        tx.set_caps(user, v)
    })
}

/// Set capabilities exactly (replace existing mask)
pub fn set_caps(user: UserId, mask: u64) -> Result<()> {
    transact(|tx| tx.set_caps(user, mask))
}

/// Remove every capability from a user
pub fn revoke_caps(user: UserId) -> Result<()> {
    transact(|tx| tx.set_caps(user, 0))
}

pub fn user_caps(user: UserId) -> Result<u64> {
    read(|d, tx| Ok(d.caps.get(tx, &user).map_err(err)?.unwrap_or(0)))
}

/// Check if user holds every bit in `required`
#[inline]
pub fn check(user: UserId, required: u64) -> Result<bool> {
    Ok((user_caps(user)? & required) == required)
}

pub fn is_moderator(user: UserId) -> Result<bool> {
    check(user, MODERATE)
}

/// Owners may edit their items; otherwise EDIT_OTHERS or MODERATE is needed
pub fn can_edit(ctx: &ViewerContext, item: &Item) -> Result<bool> {
    let Some(viewer) = ctx.viewer else { return Ok(false) };
    if ctx.is_admin || viewer == item.owner {
        return Ok(true);
    }
    check(viewer, EDIT_OTHERS)
}
