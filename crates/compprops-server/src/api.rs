//! HTTP routes for components and their properties.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use compprops::{ComponentId, Database, JsonRow, PropertiesPatch, PropsError, store};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across HTTP handlers
pub struct AppState<D> {
    pub db: Arc<D>,
}

impl<D> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

/// Build the API router over `db`.
pub fn router<D: Database + 'static>(db: Arc<D>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/components", get(list_components::<D>))
        .route(
            "/components/{id}/properties",
            get(get_properties::<D>).patch(patch_properties::<D>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { db })
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A failed request: status plus the message shown to the client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Map a library error. Client errors keep a specific message; anything
    /// else is logged and reported as `Failed to <action>.`
    pub fn from_props(err: PropsError, action: &str) -> Self {
        let (status, message) = match &err {
            PropsError::NoFieldsSpecified => {
                (StatusCode::BAD_REQUEST, "No properties to update.".to_string())
            }
            PropsError::InvalidIdentifier(_) => {
                (StatusCode::BAD_REQUEST, "Invalid component id.".to_string())
            }
            PropsError::InvalidBody(_) => {
                (StatusCode::BAD_REQUEST, "Invalid request body.".to_string())
            }
            _ => {
                tracing::error!(error = %err, "failed to {action}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to {action}."),
                )
            }
        };
        if err.is_client_error() {
            tracing::debug!(error = %err, "rejected request");
        }
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// A single row, or a 200 with an empty body when there is none.
fn optional_row(row: Option<JsonRow>) -> Response {
    match row {
        Some(row) => Json(row).into_response(),
        None => ([(CONTENT_TYPE, "application/json")], StatusCode::OK).into_response(),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_components<D: Database>(
    State(state): State<AppState<D>>,
) -> Result<Json<Vec<JsonRow>>, ApiError> {
    store::list_components(state.db.as_ref())
        .await
        .map(Json)
        .map_err(|e| ApiError::from_props(e, "fetch components"))
}

async fn get_properties<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let action = "fetch properties";
    let id: ComponentId = id.parse().map_err(|e| ApiError::from_props(e, action))?;
    store::find_properties(state.db.as_ref(), id)
        .await
        .map(optional_row)
        .map_err(|e| ApiError::from_props(e, action))
}

async fn patch_properties<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let action = "update properties";
    let id: ComponentId = id.parse().map_err(|e| ApiError::from_props(e, action))?;
    let patch = PropertiesPatch::from_json_slice(&body).map_err(|e| ApiError::from_props(e, action))?;
    store::update_properties(state.db.as_ref(), id, &patch)
        .await
        .map(optional_row)
        .map_err(|e| ApiError::from_props(e, action))
}
