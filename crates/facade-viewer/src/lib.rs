//! Facade Viewer - Interactive 3D building viewer
//!
//! Shows one building at a time on a themed ground plane. The sidebar
//! switches buildings and themes; the orbit camera reframes itself on every
//! swap. Runs natively (see `main.rs`) or in the browser against a daemon.

mod app;
mod ui;
#[cfg(target_arch = "wasm32")]
mod web;

pub use app::{run, ViewerOptions};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::INFO)
            .build(),
    );

    // The daemon serving this page also serves the models and the catalog
    app::run(ViewerOptions {
        asset_root: "models".to_string(),
        log_level: None,
        ..ViewerOptions::default()
    });
}
