//! Who is asking, and whose listing they are looking at

use serde::{Deserialize, Serialize};

use crate::caps;
use crate::error::Result;
use crate::item::UserId;

/// Supplies the displayed profile for a viewer, e.g. from the route of a
/// custom listing page.
pub trait DisplayedProfile {
    fn displayed_profile(&self, viewer: Option<UserId>) -> Option<UserId>;
}

impl<F> DisplayedProfile for F
where
    F: Fn(Option<UserId>) -> Option<UserId>,
{
    fn displayed_profile(&self, viewer: Option<UserId>) -> Option<UserId> {
        self(viewer)
    }
}

/// Explicit viewer context for one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerContext {
    /// Authenticated user, `None` for anonymous requests
    pub viewer: Option<UserId>,
    /// Bypasses owner and privacy checks where the policy allows it
    pub is_admin: bool,
    /// User whose profile listing is being rendered
    pub displayed_profile: Option<UserId>,
}

impl ViewerContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in, non-admin viewer
    pub fn user(id: UserId) -> Self {
        ViewerContext { viewer: Some(id), ..Self::default() }
    }

    pub fn admin(id: UserId) -> Self {
        ViewerContext { viewer: Some(id), is_admin: true, displayed_profile: None }
    }

    /// Build a context for a stored user; admin when they hold MODERATE
    pub fn for_user(id: UserId) -> Result<Self> {
        Ok(ViewerContext { is_admin: caps::is_moderator(id)?, ..Self::user(id) })
    }

    pub fn with_displayed_profile(mut self, profile: UserId) -> Self {
        self.displayed_profile = Some(profile);
        self
    }

    /// Let a strategy decide the displayed profile. A `None` answer keeps the
    /// current value.
    pub fn with_profile_from<P: DisplayedProfile + ?Sized>(mut self, source: &P) -> Self {
        if let Some(p) = source.displayed_profile(self.viewer) {
            self.displayed_profile = Some(p);
        }
        self
    }

    /// Displayed profile, falling back to the viewer's own
    pub fn profile(&self) -> Option<UserId> {
        self.displayed_profile.or(self.viewer)
    }

    /// Whether the viewer is looking at their own profile
    pub fn is_own_profile(&self) -> bool {
        matches!((self.viewer, self.profile()), (Some(v), Some(p)) if v == p)
    }
}
