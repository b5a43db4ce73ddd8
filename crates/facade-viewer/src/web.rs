//! Browser startup: URL parameters and the daemon's building catalog

use bevy::prelude::*;
use facade_core::{BuildingEntry, Catalog, ThemeName};
use facade_scene::{ActiveTheme, BuildingCatalog, ModelRequests};
use std::sync::{Arc, Mutex};
use wasm_bindgen::JsCast;

const CATALOG_URL: &str = "/api/buildings";

/// Plugin for browser-hosted startup
pub struct WebPlugin;

impl Plugin for WebPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingCatalog>()
            .add_systems(Startup, (check_url_parameters, fetch_catalog))
            .add_systems(Update, process_catalog_result);
    }
}

/// Catalog fetch in flight, plus the `?building=` requested by the page URL
#[derive(Resource, Default)]
pub struct PendingCatalog {
    result: Arc<Mutex<Option<Result<Vec<BuildingEntry>, String>>>>,
    requested: Option<String>,
    done: bool,
}

/// Read `?building=` and `?theme=` from the page URL
fn check_url_parameters(mut pending: ResMut<PendingCatalog>, mut theme: ResMut<ActiveTheme>) {
    let Some(window) = web_sys::window() else { return };
    let Ok(href) = window.location().href() else { return };
    let Ok(url) = web_sys::Url::new(&href) else { return };

    let params = url.search_params();
    if let Some(building) = params.get("building") {
        tracing::info!(building = %building, "Building requested by URL");
        pending.requested = Some(building);
    }
    if let Some(name) = params.get("theme") {
        match name.parse::<ThemeName>() {
            Ok(name) => theme.0 = name,
            Err(err) => tracing::warn!(theme = %name, error = %err, "Ignoring theme parameter"),
        }
    }
}

fn fetch_catalog(pending: Res<PendingCatalog>) {
    let slot = pending.result.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = fetch_entries(CATALOG_URL).await;
        if let Ok(mut pending) = slot.lock() {
            *pending = Some(result);
        }
    });
}

async fn fetch_entries(url: &str) -> Result<Vec<BuildingEntry>, String> {
    let window = web_sys::window().ok_or("No window")?;

    let resp = wasm_bindgen_futures::JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| format!("Fetch failed: {:?}", e))?;
    let resp: web_sys::Response = resp.dyn_into().map_err(|_| "Response cast failed")?;
    if !resp.ok() {
        return Err(format!("HTTP {}: {}", resp.status(), resp.status_text()));
    }

    let text = wasm_bindgen_futures::JsFuture::from(resp.text().map_err(|_| "Failed to get text")?)
        .await
        .map_err(|e| format!("Text extraction failed: {:?}", e))?;
    let text = text.as_string().ok_or("Not a string")?;

    serde_json::from_str(&text).map_err(|e| format!("Invalid catalog: {e}"))
}

/// Install the fetched catalog (or keep the built-in one) and queue the first load
fn process_catalog_result(
    mut pending: ResMut<PendingCatalog>,
    mut catalog: ResMut<BuildingCatalog>,
    mut requests: ResMut<ModelRequests>,
) {
    if pending.done {
        return;
    }
    // Take the result from the mutex (if any) - this drops the lock immediately
    let result = match pending.result.try_lock() {
        Ok(mut slot) => slot.take(),
        Err(_) => None,
    };
    let Some(result) = result else { return };
    pending.done = true;

    match result.map(Catalog::from_entries) {
        Ok(Ok(fetched)) => {
            tracing::info!(buildings = fetched.len(), "Catalog loaded from daemon");
            catalog.0 = fetched;
        }
        Ok(Err(err)) => tracing::warn!(error = %err, "Daemon catalog rejected, using built-in buildings"),
        Err(err) => tracing::warn!(error = %err, "Catalog unavailable, using built-in buildings"),
    }

    let requested = pending
        .requested
        .take()
        .filter(|id| catalog.0.find(id).is_some())
        .or_else(|| catalog.0.first().map(|entry| entry.id.clone()));
    if let Some(id) = requested {
        requests.select(id);
    }
}
