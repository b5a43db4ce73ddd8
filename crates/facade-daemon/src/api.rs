//! REST API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use facade_core::{LoadTicket, SwapSnapshot, ThemeName};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::session::SessionError;
use crate::state::AppState;

/// API error response
#[derive(Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            SessionError::UnknownBuilding(_) => StatusCode::NOT_FOUND,
            SessionError::NothingToRetry => StatusCode::CONFLICT,
        };
        (status, Json(ApiError::new(self.to_string()))).into_response()
    }
}

/// Swap state plus session details
#[derive(Serialize)]
pub struct StateResponse {
    #[serde(flatten)]
    swap: SwapSnapshot,
    theme: ThemeName,
    started_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
pub struct ThemeBody {
    theme: ThemeName,
}

/// List selectable buildings
pub async fn list_buildings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.catalog().entries().to_vec())
}

/// Current swap state and active model summary
pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StateResponse {
        swap: state.session.snapshot().await,
        theme: state.session.theme().await,
        started_at: state.started_at,
    })
}

/// Composed scene for the active model and theme
pub async fn get_scene(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.session.scene().await {
        Some(scene) => Json(scene).into_response(),
        None => (StatusCode::NOT_FOUND, Json(ApiError::new("No model loaded"))).into_response(),
    }
}

/// Begin loading a building
pub async fn select_building(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<LoadTicket>), SessionError> {
    let load = state.session.select(&id).await?;
    Ok((StatusCode::ACCEPTED, Json(load.ticket)))
}

/// Retry the last failed load
pub async fn retry_load(State(state): State<Arc<AppState>>) -> Result<(StatusCode, Json<LoadTicket>), SessionError> {
    let load = state.session.retry().await?;
    info!(asset = %load.ticket.asset, "Retry requested");
    Ok((StatusCode::ACCEPTED, Json(load.ticket)))
}

pub async fn get_theme(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ThemeBody {
        theme: state.session.theme().await,
    })
}

pub async fn set_theme(State(state): State<Arc<AppState>>, Json(body): Json<ThemeBody>) -> impl IntoResponse {
    state.session.set_theme(body.theme).await;
    Json(body)
}
