//! Visibility policy: maps a requested scope and viewer context to the
//! owner/privacy restriction a query must honour.
//!
//! | scope    | admin                  | owner of profile       | anyone else                    |
//! |----------|------------------------|------------------------|--------------------------------|
//! | `admin`  | all                    | all                    | all (trusted callers only)     |
//! | `files`  | owned by profile       | owned by profile       | public and owned by profile    |
//! | `public` | public, any owner      | public, any owner      | public, any owner              |
//! | none     | all                    | all                    | all                            |
//!
//! `admin` and none are unrestricted here; callers facing untrusted viewers
//! gate them with [`crate::query::authorize`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::context::ViewerContext;
use crate::error::DriveError;
use crate::item::{Item, Privacy, UserId};

/// Named visibility rule requested by a caller. Serialized as its keyword;
/// deserialization goes through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    /// Back-office listing: no owner or privacy filtering
    Admin,
    /// Profile listing of the displayed user
    Files,
    /// Public items of every user
    Public,
    #[default]
    None,
}

impl Scope {
    pub const fn as_str(self) -> &'static str {
        match self {
            Scope::Admin => "admin",
            Scope::Files => "files",
            Scope::Public => "public",
            Scope::None => "",
        }
    }
}

impl FromStr for Scope {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Scope::Admin),
            "files" => Ok(Scope::Files),
            "public" => Ok(Scope::Public),
            "" | "none" => Ok(Scope::None),
            other => Err(DriveError::UnknownScope(other.to_string())),
        }
    }
}

impl TryFrom<String> for Scope {
    type Error = DriveError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.as_str().to_string()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete restriction produced by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "owner")]
pub enum Visibility {
    All,
    OwnedBy(UserId),
    PublicOwnedBy(UserId),
    Public,
    Nothing,
}

impl Visibility {
    /// Owner filter, if any
    pub fn author(&self) -> Option<UserId> {
        match *self {
            Visibility::OwnedBy(u) | Visibility::PublicOwnedBy(u) => Some(u),
            _ => None,
        }
    }

    /// Privacy filter, if any
    pub fn privacy(&self) -> Option<Privacy> {
        match self {
            Visibility::PublicOwnedBy(_) | Visibility::Public => Some(Privacy::Public),
            _ => None,
        }
    }

    pub fn permits(&self, item: &Item) -> bool {
        match *self {
            Visibility::All => true,
            Visibility::OwnedBy(u) => item.owner == u,
            Visibility::PublicOwnedBy(u) => item.owner == u && item.is_public(),
            Visibility::Public => item.is_public(),
            Visibility::Nothing => false,
        }
    }
}

/// Decide what `ctx` may see under `scope`
pub fn resolve(scope: Scope, ctx: &ViewerContext) -> Visibility {
    match scope {
        Scope::Admin | Scope::None => Visibility::All,
        Scope::Public => Visibility::Public,
        Scope::Files => match ctx.profile() {
            None => Visibility::Nothing,
            Some(p) if ctx.is_admin || ctx.is_own_profile() => Visibility::OwnedBy(p),
            Some(p) => Visibility::PublicOwnedBy(p),
        },
    }
}
