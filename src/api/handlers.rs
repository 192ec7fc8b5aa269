//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. They translate
//! between JSON and the cache's in-process API and hold no cache logic.

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::cache::{Cache, CacheExport};
use crate::error::{CacheError, Result};
use crate::models::requests::user_cache_key;
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, MessageResponse, SetRequest, SetResponse,
    StatsResponse, UserQuery, UserResponse,
};
use crate::source::{fetch_user, UserRecord};

/// TTL for user records loaded from the data source on a miss.
pub const FETCHED_USER_TTL: Duration = Duration::from_secs(30);
/// TTL for user records submitted through POST /user.
pub const SUBMITTED_USER_TTL: Duration = Duration::from_secs(60);

/// Header carrying `HIT` or `MISS` on GET /user.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across all handlers.
///
/// The cache handle is itself cheaply cloneable and internally synchronized.
#[derive(Clone)]
pub struct AppState {
    pub cache: Cache<Value>,
}

impl AppState {
    /// Creates a new AppState around an existing cache handle.
    pub fn new(cache: Cache<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState with a fresh cache built from the Config.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(Cache::new(config.cache_config()))
    }
}

/// Handler for GET /
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handler for GET /user?id=N
///
/// Cache-aside lookup: serves `user:N` from the cache, or loads it from the
/// data source and caches it.
pub async fn get_user_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Response> {
    let id = query.user_id().map_err(CacheError::InvalidRequest)?;
    let key = user_cache_key(id);

    if let Some(data) = state.cache.get(&key).await {
        info!("Cache HIT for user {}", id);
        let body = Json(UserResponse { data, cached: true });
        return Ok(([(CACHE_STATUS_HEADER, "HIT")], body).into_response());
    }

    info!("Cache MISS for user {}, querying data source", id);
    let data = serde_json::to_value(fetch_user(id).await)?;
    state
        .cache
        .set(key, data.clone(), Some(FETCHED_USER_TTL))
        .await;

    let body = Json(UserResponse {
        data,
        cached: false,
    });
    Ok(([(CACHE_STATUS_HEADER, "MISS")], body).into_response())
}

/// Handler for POST /user
///
/// Stores the submitted user record under `user:{id}`.
pub async fn set_user_handler(
    State(state): State<AppState>,
    Json(user): Json<UserRecord>,
) -> Result<Json<SetResponse>> {
    let key = user_cache_key(user.id);
    let data = serde_json::to_value(&user)?;
    state
        .cache
        .set(key.clone(), data, Some(SUBMITTED_USER_TTL))
        .await;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for DELETE /user?id=N
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<DeleteResponse>> {
    let id = query.user_id().map_err(CacheError::InvalidRequest)?;
    let key = user_cache_key(id);
    let deleted = state.cache.delete(&key).await;

    Ok(Json(DeleteResponse::new(key, deleted)))
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL in seconds.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl.map(Duration::from_secs);
    state.cache.set(req.key.clone(), req.value, ttl).await;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if state.cache.delete(&key).await {
        Ok(Json(DeleteResponse::new(key, true)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    let size = state.cache.size().await;

    Json(StatsResponse::new(stats, size))
}

/// Handler for POST /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.clear().await;
    Json(MessageResponse::new("Cache cleared"))
}

/// Handler for GET /export
///
/// Diagnostic dump of every entry and the counters.
pub async fn export_handler(State(state): State<AppState>) -> Json<CacheExport<Value>> {
    Json(state.cache.export().await)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>TTL Cache</title>
    <meta charset="UTF-8">
</head>
<body>
    <h1>TTL Cache</h1>
    <ul>
        <li><code>GET /user?id=123</code> - user lookup through the cache</li>
        <li><code>POST /user</code> - cache a user record, e.g. <code>{"id": 123, "name": "Ana", "email": "ana@example.com"}</code></li>
        <li><code>DELETE /user?id=123</code> - drop a cached user</li>
        <li><code>PUT /set</code>, <code>GET /get/:key</code>, <code>DELETE /del/:key</code> - raw key operations</li>
        <li><code>GET /stats</code> - hit, miss and sweep counters</li>
        <li><code>POST /clear</code> - empty the cache and reset counters</li>
        <li><code>GET /export</code> - diagnostic dump</li>
        <li><code>GET /health</code> - health check</li>
    </ul>
</body>
</html>"#;
