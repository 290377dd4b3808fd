//! # Sip-API
//!
//! The HTTP layer powered by Axum. One resource, `/drinks`, with the
//! classic CRUD verbs over the shared store.
//!
//! ## Endpoints
//!
//! - `POST /drinks` - Create a drink (name and description required)
//! - `GET /drinks` - List all drinks
//! - `GET /drinks/:id` - Get a drink by id
//! - `PUT /drinks/:id` - Replace a drink (missing description clears it)
//! - `PATCH /drinks/:id` - Apply only the provided fields
//! - `DELETE /drinks/:id` - Delete a drink
//! - `GET /health` - Health check
//!
//! Unmatched routes answer `404 {"error": "Resource not found"}`; bodies
//! that are not valid JSON answer `400 {"error": "Bad request"}`.

use crate::db::SipStore;
use crate::drink::DrinkPatch;
use crate::error::SipError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SipStore>,
}

impl AppState {
    pub fn new(store: Arc<SipStore>) -> Self {
        Self { store }
    }
}

/// POST /drinks request body; both fields must be present
#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// PUT /drinks/:id request body; a missing description clears the field
#[derive(Debug, Deserialize)]
pub struct ReplaceDrinkRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Creates the Axum router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/drinks", post(create_drink_handler))
        .route("/drinks", get(list_drinks_handler))
        .route("/drinks/:id", get(get_drink_handler))
        .route("/drinks/:id", put(replace_drink_handler))
        .route("/drinks/:id", patch(patch_drink_handler))
        .route("/drinks/:id", delete(delete_drink_handler))
        .route("/health", get(health_handler))
        .route("/", get(root_handler))
        .fallback(fallback_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root handler - API info
async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "name": "SipDB",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "create": "POST /drinks",
            "list": "GET /drinks",
            "get": "GET /drinks/:id",
            "replace": "PUT /drinks/:id",
            "patch": "PATCH /drinks/:id",
            "delete": "DELETE /drinks/:id",
            "health": "GET /health"
        }
    }))
}

/// Health check endpoint
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(_) => Json(json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(e) => Json(json!({
            "status": "unhealthy",
            "database": "disconnected",
            "error": e.to_string()
        })),
    }
}

/// Catch-all for unmatched routes
async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Resource not found" })),
    )
}

/// POST /drinks - Create a drink
async fn create_drink_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SipError> {
    let Json(payload) = payload.map_err(|_| SipError::BadRequest)?;

    let name = payload
        .name
        .ok_or_else(|| SipError::validation("name", "field is required"))?;
    let description = payload
        .description
        .ok_or_else(|| SipError::validation("description", "field is required"))?;

    let id = state.store.insert(&name, Some(&description)).await?;
    let drink = state.store.require(id).await?;

    info!("Created drink {} ({})", drink.id, drink.name);
    Ok((StatusCode::CREATED, Json(drink)))
}

/// GET /drinks - List all drinks
async fn list_drinks_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, SipError> {
    let drinks = state.store.list().await?;
    Ok(Json(drinks))
}

/// GET /drinks/:id - Get a drink by id
async fn get_drink_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, SipError> {
    debug!("Fetching drink {}", id);
    let drink = state.store.require(id).await?;
    Ok(Json(drink))
}

/// PUT /drinks/:id - Replace a drink in full
async fn replace_drink_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ReplaceDrinkRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SipError> {
    let Json(payload) = payload.map_err(|_| SipError::BadRequest)?;

    let name = payload
        .name
        .ok_or_else(|| SipError::validation("name", "field is required"))?;

    let drink = state
        .store
        .replace(id, &name, payload.description.as_deref())
        .await?;

    info!("Replaced drink {}", id);
    Ok(Json(drink))
}

/// PATCH /drinks/:id - Apply only the provided fields
async fn patch_drink_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<DrinkPatch>, JsonRejection>,
) -> Result<impl IntoResponse, SipError> {
    let Json(patch) = payload.map_err(|_| SipError::BadRequest)?;

    let drink = state.store.update(id, patch).await?;

    info!("Patched drink {}", id);
    Ok(Json(drink))
}

/// DELETE /drinks/:id - Delete a drink
async fn delete_drink_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, SipError> {
    state.store.delete(id).await?;

    info!("Deleted drink {}", id);
    Ok(Json(json!({
        "message": "Drink deleted",
        "id": id
    })))
}
