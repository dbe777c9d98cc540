//! Item queries: a request descriptor is planned against the visibility
//! policy, then run against the store.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::ViewerContext;
use crate::db::read;
use crate::error::{err, DriveError, Result};
use crate::item::{Item, ItemId, ItemType, Privacy, UserId};
use crate::policy::{resolve, Scope, Visibility};
use crate::read::{hydrate, load_item, owned_ids, slug_lookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[default]
    Date,
    Title,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

fn first_page() -> usize {
    1
}

/// Request descriptor. Every filter given applies; none given lists the
/// whole item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuery {
    #[serde(default)]
    pub id: Option<ItemId>,
    /// Exact slug
    #[serde(default)]
    pub name: Option<String>,
    /// Exact owner
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default, rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub order_by: OrderBy,
    #[serde(default)]
    pub order: Order,
    /// 1-based
    #[serde(default = "first_page")]
    pub page: usize,
    /// `None` returns every match
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl Default for ItemQuery {
    fn default() -> Self {
        ItemQuery {
            id: None,
            name: None,
            user_id: None,
            scope: Scope::None,
            item_type: ItemType::File,
            order_by: OrderBy::Date,
            order: Order::Desc,
            page: 1,
            per_page: None,
        }
    }
}

impl ItemQuery {
    pub fn new(item_type: ItemType) -> Self {
        ItemQuery { item_type, ..Default::default() }
    }

    pub fn by_id(id: ItemId) -> Self {
        ItemQuery { id: Some(id), ..Default::default() }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        ItemQuery { name: Some(name.into()), ..Default::default() }
    }

    pub fn by_user(user: UserId) -> Self {
        ItemQuery { user_id: Some(user), ..Default::default() }
    }

    pub fn in_scope(scope: Scope) -> Self {
        ItemQuery { scope, ..Default::default() }
    }

    pub fn id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn user(mut self, user: UserId) -> Self {
        self.user_id = Some(user);
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn item_type(mut self, item_type: ItemType) -> Self {
        self.item_type = item_type;
        self
    }

    pub fn order_by(mut self, order_by: OrderBy, order: Order) -> Self {
        self.order_by = order_by;
        self.order = order;
        self
    }

    pub fn paged(mut self, page: usize, per_page: usize) -> Self {
        self.page = page;
        self.per_page = Some(per_page);
        self
    }

    /// Translate the descriptor into store filters for this viewer
    pub fn plan(&self, ctx: &ViewerContext) -> QueryPlan {
        let visibility = resolve(self.scope, ctx);
        let (author, conflict) = match (self.user_id, visibility.author()) {
            (Some(a), Some(b)) if a != b => (None, true),
            (a, b) => (a.or(b), false),
        };
        QueryPlan {
            item_type: self.item_type,
            id: self.id,
            slug: self.name.clone().filter(|n| !n.is_empty()),
            author,
            privacy: visibility.privacy(),
            matches_nothing: conflict || visibility == Visibility::Nothing,
            order_by: self.order_by,
            order: self.order,
            page: self.page.max(1),
            per_page: self.per_page,
        }
    }
}

/// Filter parameters handed to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    pub item_type: ItemType,
    pub id: Option<ItemId>,
    pub slug: Option<String>,
    pub author: Option<UserId>,
    pub privacy: Option<Privacy>,
    /// The filters contradict each other; the store is not consulted
    pub matches_nothing: bool,
    pub order_by: OrderBy,
    pub order: Order,
    pub page: usize,
    pub per_page: Option<usize>,
}

impl QueryPlan {
    pub fn matches(&self, item: &Item) -> bool {
        !self.matches_nothing
            && item.item_type == self.item_type
            && self.id.map_or(true, |id| item.id == id)
            && self.slug.as_deref().map_or(true, |s| item.slug == s)
            && self.author.map_or(true, |a| item.owner == a)
            && self.privacy.map_or(true, |p| item.privacy == p)
    }

    fn compare(&self, a: &Item, b: &Item) -> Ordering {
        let by_key = match self.order_by {
            OrderBy::Date => a.created_at.cmp(&b.created_at),
            OrderBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            OrderBy::Id => Ordering::Equal,
        };
        let ord = by_key.then(a.id.cmp(&b.id));
        match self.order {
            Order::Asc => ord,
            Order::Desc => ord.reverse(),
        }
    }

    /// Run the plan against the store
    pub fn execute(&self) -> Result<ResultSet> {
        if self.matches_nothing {
            return Ok(ResultSet::default());
        }
        let mut items = read(|d, tx| {
            let candidates: Vec<Item> = if let Some(id) = self.id {
                load_item(d, tx, id)?.into_iter().collect()
            } else if let Some(slug) = &self.slug {
                match slug_lookup(d, tx, self.item_type, slug)? {
                    Some(id) => load_item(d, tx, id)?.into_iter().collect(),
                    None => Vec::new(),
                }
            } else if let Some(author) = self.author {
                let mut r = Vec::new();
                for id in owned_ids(d, tx, author)? {
                    r.extend(load_item(d, tx, id)?);
                }
                r
            } else {
                let mut r = Vec::new();
                for entry in d.items.iter(tx).map_err(err)? {
                    let (id, record) = entry.map_err(err)?;
                    if record.item_type == self.item_type {
                        r.push(hydrate(d, tx, id, record)?);
                    }
                }
                r
            };
            Ok(candidates.into_iter().filter(|i| self.matches(i)).collect::<Vec<_>>())
        })?;

        items.sort_by(|a, b| self.compare(a, b));
        let found = items.len();
        if let Some(per_page) = self.per_page {
            let start = self.page.saturating_sub(1).saturating_mul(per_page);
            items = items.into_iter().skip(start).take(per_page).collect();
        }
        Ok(ResultSet { found, items })
    }
}

/// Matches of one query: total count and the requested page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Matches before paging
    pub found: usize,
    pub items: Vec<Item>,
}

impl ResultSet {
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|i| i.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.found == 0
    }

    pub fn first(&self) -> Option<&Item> {
        self.items.first()
    }
}

/// Check that `ctx` may run `query` at all. The `admin` scope and unscoped
/// queries see every private item, so only admin viewers may use them.
pub fn authorize(query: &ItemQuery, ctx: &ViewerContext) -> Result<()> {
    if ctx.is_admin {
        return Ok(());
    }
    match query.scope {
        Scope::Admin => Err(DriveError::Forbidden("admin scope requires moderate")),
        Scope::None => Err(DriveError::Forbidden("a scope is required")),
        Scope::Files | Scope::Public => Ok(()),
    }
}

/// Retrieve the items matching `query` that `ctx` may see
pub fn get(query: &ItemQuery, ctx: &ViewerContext) -> Result<ResultSet> {
    let plan = query.plan(ctx);
    let result = plan.execute()?;
    debug!(
        scope = %query.scope,
        viewer = ?ctx.viewer,
        author = ?plan.author,
        privacy = ?plan.privacy,
        found = result.found,
        "item query"
    );
    Ok(result)
}
