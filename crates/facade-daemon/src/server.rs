//! Web server setup and routing

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::api;
use crate::state::AppState;
use crate::ws;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // API routes
        .route("/api/buildings", get(api::list_buildings))
        .route("/api/state", get(api::get_state))
        .route("/api/scene", get(api::get_scene))
        .route("/api/select/{id}", post(api::select_building))
        .route("/api/retry", post(api::retry_load))
        .route("/api/theme", get(api::get_theme).post(api::set_theme))
        // WebSocket for swap events
        .route("/ws", get(ws::websocket_handler))
        // Serve models
        .nest_service("/models", ServeDir::new(&state.config.viewer.models.path))
        // Static files (WASM frontend) - must be fallback for root
        .fallback_service(ServeDir::new(&state.config.daemon.web_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the web server until Ctrl-C, then close the session
pub async fn run(state: Arc<AppState>, bind: &str) -> Result<()> {
    let app = router(state.clone());

    // Show the first building right away
    if let Some(entry) = state.session.catalog().first() {
        state.session.select(&entry.id).await?;
    }

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(address = %bind, "Starting web server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await?;

    state.session.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state(dir: &TempDir) -> Arc<AppState> {
        let mut config = Config::default();
        config.viewer.models.path = dir.path().to_path_buf();
        config.daemon.web_dir = dir.path().join("web");
        AppState::new(config).unwrap()
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_buildings_and_idle_state() {
        let dir = TempDir::new().unwrap();
        let app = router(test_state(&dir));

        let (status, json) = call(app.clone(), "GET", "/api/buildings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(5));
        assert_eq!(json[0]["id"], "building_basic");

        let (status, json) = call(app.clone(), "GET", "/api/state").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["theme"], "night");

        let (status, _) = call(app, "GET", "/api/scene").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_select_and_retry_status_codes() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let app = router(state.clone());

        let (status, _) = call(app.clone(), "POST", "/api/retry").await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, json) = call(app.clone(), "POST", "/api/select/castle").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("castle"));

        // The models directory is empty, so this load fails with a fetch error
        let load = state.session.select("office_building").await.unwrap();
        load.outcome().await;
        let (status, json) = call(app.clone(), "GET", "/api/state").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["phase"], "error");

        let (status, json) = call(app, "POST", "/api/retry").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["asset"], "office_building.gltf");
    }
}
