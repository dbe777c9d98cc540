//! drivebit REST API Server
//!
//! Run with: cargo run --features server --bin drivebit-server
//!
//! The viewer is taken from the `x-user-id` header, the displayed profile
//! from `x-displayed-user`. Both are optional.
//!
//! Endpoints:
//!   GET   /status           - Store status
//!   POST  /items            - Record an upload (UPLOAD)
//!   GET   /items/:id        - Fetch one visible item
//!   POST  /items/query      - Run an item query (`files` or `public` scope;
//!                             `admin` and unscoped need MODERATE)
//!   PATCH /items/:id        - Partial update (owner, EDIT_OTHERS or MODERATE)
//!   PUT   /users/:id/caps   - Replace a user's capabilities (MODERATE)

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use drivebit::logging::init_logging;
use drivebit::{
    authorize, can_edit, caps_to_names, check, get_item_by_id, grant_caps, init_with, is_initialized,
    names_to_caps, resolve, save_item, set_caps, update_item, Config, DriveError, Item,
    ItemChanges, ItemId, ItemQuery, ItemType, NewItem, Privacy, ResultSet, Scope, UserId,
    ViewerContext, EDIT_OTHERS, MODERATE, UPLOAD,
};

// ============================================================================
// State
// ============================================================================

struct AppState {
    config: Config,
}

type Shared = State<Arc<AppState>>;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
struct CreateItemReq {
    #[serde(default)]
    item_type: ItemType,
    /// Defaults to the viewer; only moderators may upload for someone else
    owner: Option<UserId>,
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    guid: String,
    #[serde(default)]
    privacy: Privacy,
}

#[derive(Deserialize)]
struct SetCapsReq {
    caps: Vec<String>,
}

#[derive(Serialize)]
struct CapsRes {
    user: UserId,
    mask: u64,
    caps: Vec<&'static str>,
}

#[derive(Serialize)]
struct StatusRes {
    ready: bool,
    per_page: usize,
}

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(msg.into()) }
    }
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn ok<T>(data: T) -> Reply<T> {
    (StatusCode::OK, Json(ApiResponse::ok(data)))
}

fn fail<T>(status: StatusCode, msg: impl Into<String>) -> Reply<T> {
    (status, Json(ApiResponse::err(msg)))
}

fn from_error<T>(e: DriveError) -> Reply<T> {
    let status = match &e {
        DriveError::InvalidField { .. } | DriveError::UnknownScope(_) => StatusCode::BAD_REQUEST,
        DriveError::Forbidden(_) => StatusCode::FORBIDDEN,
        DriveError::UpdateFailed(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    fail(status, e.to_string())
}

// ============================================================================
// Helpers
// ============================================================================

fn header_id(headers: &HeaderMap, name: &str) -> Result<Option<UserId>, String> {
    match headers.get(name) {
        None => Ok(None),
        Some(v) => v
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|id| *id != 0)
            .map(Some)
            .ok_or_else(|| format!("{} must be a user id", name)),
    }
}

fn viewer<T>(headers: &HeaderMap) -> Result<ViewerContext, Reply<T>> {
    let user = header_id(headers, "x-user-id").map_err(|m| fail(StatusCode::BAD_REQUEST, m))?;
    let profile = header_id(headers, "x-displayed-user").map_err(|m| fail(StatusCode::BAD_REQUEST, m))?;
    let ctx = match user {
        Some(u) => ViewerContext::for_user(u).map_err(from_error)?,
        None => ViewerContext::anonymous(),
    };
    Ok(match profile {
        Some(p) => ctx.with_displayed_profile(p),
        None => ctx,
    })
}

fn signed_in<T>(ctx: &ViewerContext) -> Result<UserId, Reply<T>> {
    ctx.viewer.ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "sign in required"))
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_status(State(state): Shared) -> Json<ApiResponse<StatusRes>> {
    Json(ApiResponse::ok(StatusRes { ready: is_initialized(), per_page: state.config.per_page }))
}

async fn post_item(headers: HeaderMap, Json(req): Json<CreateItemReq>) -> Reply<ItemId> {
    let ctx = match viewer(&headers) {
        Ok(c) => c,
        Err(r) => return r,
    };
    let user = match signed_in(&ctx) {
        Ok(u) => u,
        Err(r) => return r,
    };
    let owner = req.owner.unwrap_or(user);
    match check(user, UPLOAD) {
        Ok(true) => {}
        Ok(false) if !ctx.is_admin => return fail(StatusCode::FORBIDDEN, "upload not allowed"),
        Ok(false) => {}
        Err(e) => return from_error(e),
    }
    if owner != user && !ctx.is_admin {
        return fail(StatusCode::FORBIDDEN, "cannot upload for another user");
    }
    let new = NewItem {
        item_type: req.item_type,
        owner,
        title: req.title,
        content: req.content,
        mime_type: req.mime_type,
        guid: req.guid,
        privacy: req.privacy,
    };
    match save_item(new) {
        Ok(id) => (StatusCode::CREATED, Json(ApiResponse::ok(id))),
        Err(e) => from_error(e),
    }
}

async fn get_item(headers: HeaderMap, Path(id): Path<ItemId>) -> Reply<Item> {
    let ctx = match viewer(&headers) {
        Ok(c) => c,
        Err(r) => return r,
    };
    match get_item_by_id(id) {
        // same rule as the owner's profile listing
        Ok(Some(item))
            if resolve(Scope::Files, &ctx.with_displayed_profile(item.owner)).permits(&item) =>
        {
            ok(item)
        }
        Ok(_) => fail(StatusCode::NOT_FOUND, format!("item {} not found", id)),
        Err(e) => from_error(e),
    }
}

async fn post_query(
    State(state): Shared,
    headers: HeaderMap,
    body: Result<Json<ItemQuery>, JsonRejection>,
) -> Reply<ResultSet> {
    let ctx = match viewer(&headers) {
        Ok(c) => c,
        Err(r) => return r,
    };
    let mut query = match body {
        Ok(Json(q)) => q,
        Err(rejection) => return fail(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    if let Err(e) = authorize(&query, &ctx) {
        warn!(viewer = ?ctx.viewer, scope = %query.scope, "query refused");
        return from_error(e);
    }
    if query.per_page.is_none() {
        query.per_page = Some(state.config.per_page);
    }
    match drivebit::get(&query, &ctx) {
        Ok(rs) => ok(rs),
        Err(e) => from_error(e),
    }
}

async fn patch_item(
    headers: HeaderMap,
    Path(id): Path<ItemId>,
    Json(changes): Json<ItemChanges>,
) -> Reply<Item> {
    let ctx = match viewer(&headers) {
        Ok(c) => c,
        Err(r) => return r,
    };
    if let Err(r) = signed_in::<Item>(&ctx) {
        return r;
    }
    let item = match get_item_by_id(id) {
        Ok(Some(item)) => item,
        Ok(None) => return fail(StatusCode::NOT_FOUND, format!("item {} not found", id)),
        Err(e) => return from_error(e),
    };
    match can_edit(&ctx, &item) {
        Ok(true) => {}
        Ok(false) => return fail(StatusCode::FORBIDDEN, "cannot edit this item"),
        Err(e) => return from_error(e),
    }
    match update_item(&changes, &item) {
        Ok(updated) => ok(updated),
        Err(e) => from_error(e),
    }
}

async fn put_caps(
    headers: HeaderMap,
    Path(user): Path<UserId>,
    Json(req): Json<SetCapsReq>,
) -> Reply<CapsRes> {
    let ctx = match viewer(&headers) {
        Ok(c) => c,
        Err(r) => return r,
    };
    if !ctx.is_admin {
        return fail(StatusCode::FORBIDDEN, "moderate required");
    }
    let mask = names_to_caps(&req.caps);
    match set_caps(user, mask) {
        Ok(()) => ok(CapsRes { user, mask, caps: caps_to_names(mask) }),
        Err(e) => from_error(e),
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(std::env::var("DRIVEBIT_LOG_JSON").is_ok_and(|v| v == "1" || v == "true"));

    let config = match std::env::var("DRIVEBIT_CONFIG") {
        Ok(path) => Config::load(path)?,
        Err(_) => Config::from_env()?,
    };
    info!(db = %config.db_path.display(), "initializing store");
    init_with(&config)?;

    if let Some(admin) = config.admin {
        grant_caps(admin, UPLOAD | EDIT_OTHERS | MODERATE)?;
        info!(admin, "bootstrap admin granted");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let listen = config.listen.clone();
    let state = Arc::new(AppState { config });

    let app = Router::new()
        .route("/status", get(get_status))
        .route("/items", post(post_item))
        .route("/items/query", post(post_query))
        .route("/items/:id", get(get_item).patch(patch_item))
        .route("/users/:id/caps", put(put_caps))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!(%listen, "drivebit server running");
    axum::serve(listener, app).await?;
    Ok(())
}
