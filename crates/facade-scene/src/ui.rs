//! Shared UI components for building selection and model status

use bevy_egui::egui;
use facade_core::{SwapPhase, ThemeName};

use crate::types::*;

const ACTIVE_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 170, 255);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 80, 70);

/// Render the building list; clicking an entry queues a load
pub fn render_building_list(
    ui: &mut egui::Ui,
    catalog: &BuildingCatalog,
    selection: &BuildingSelection,
    requests: &mut ModelRequests,
    ui_layout: &UiLayout,
) {
    let displayed = selection.displayed.as_ref().map(|entry| entry.id.as_str());
    for entry in catalog.0.entries() {
        let is_displayed = displayed == Some(entry.id.as_str());
        let text = if is_displayed {
            egui::RichText::new(&entry.name).strong().color(ACTIVE_COLOR)
        } else {
            egui::RichText::new(&entry.name)
        };

        let button = egui::Button::new(text)
            .selected(is_displayed)
            .min_size(egui::vec2(ui.available_width(), if ui_layout.is_mobile { 36.0 } else { 0.0 }));
        let response = ui.add(button);
        let response = if entry.description.is_empty() {
            response
        } else {
            response.on_hover_text(&entry.description)
        };
        if response.clicked() && !is_displayed {
            requests.select(entry.id.clone());
        }
    }
}

/// Render the day/night toggle
pub fn render_theme_toggle(ui: &mut egui::Ui, theme: &mut ActiveTheme) {
    ui.horizontal(|ui| {
        ui.label("Theme:");
        for name in [ThemeName::Day, ThemeName::Night] {
            let label = match name {
                ThemeName::Day => "☀ Day",
                ThemeName::Night => "☾ Night",
            };
            if ui.selectable_label(theme.0 == name, label).clicked() && theme.0 != name {
                theme.0 = name;
                tracing::info!(theme = %name, "Theme selected");
            }
        }
    });
}

/// Render the loading/error indicator with a retry button
pub fn render_load_status(
    ui: &mut egui::Ui,
    swap: &SwapControl,
    catalog: &BuildingCatalog,
    requests: &mut ModelRequests,
) {
    let display_name = |asset: &str| {
        catalog
            .0
            .find_by_file(asset)
            .map(|entry| entry.name.clone())
            .unwrap_or_else(|| asset.to_string())
    };

    match swap.0.phase() {
        SwapPhase::Idle => {
            ui.label(egui::RichText::new("No building loaded").color(egui::Color32::GRAY));
        }
        SwapPhase::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                let name = swap.0.pending().map(|ticket| display_name(&ticket.asset));
                ui.label(format!("Loading {}...", name.unwrap_or_default()));
            });
        }
        SwapPhase::Ready => {
            if let Some(active) = swap.0.active() {
                ui.label(
                    egui::RichText::new(format!("Showing {}", display_name(&active.asset)))
                        .small()
                        .color(egui::Color32::GRAY),
                );
            }
        }
        SwapPhase::Error => {
            if let Some(err) = swap.0.last_error() {
                ui.colored_label(ERROR_COLOR, format!("Failed to load {}", display_name(err.asset())));
                ui.label(egui::RichText::new(err.to_string()).small().color(egui::Color32::GRAY));
            }
            if ui.button("Retry").clicked() {
                requests.retry();
            }
        }
    }
}

/// Render name and description of the building on screen
pub fn render_building_info(ui: &mut egui::Ui, selection: &BuildingSelection, swap: &SwapControl) {
    let Some(entry) = &selection.displayed else {
        ui.label(egui::RichText::new("Select a building").color(egui::Color32::GRAY));
        return;
    };

    ui.heading(&entry.name);
    if !entry.description.is_empty() {
        ui.label(&entry.description);
    }

    if let Some(active) = swap.0.active() {
        let size = active.bounds.size();
        ui.label(
            egui::RichText::new(format!("{:.1} × {:.1} × {:.1} m", size.x, size.y, size.z))
                .small()
                .color(egui::Color32::GRAY),
        );
    }
}

/// Render the navigation controls hint
pub fn render_controls_hint(ui: &mut egui::Ui, ui_layout: &UiLayout) {
    let lines: &[&str] = if ui_layout.is_mobile {
        &["Drag: rotate", "Pinch: zoom"]
    } else {
        &["Left drag: rotate", "Right drag: pan", "Wheel: zoom"]
    };
    for line in lines {
        ui.label(egui::RichText::new(*line).small().color(egui::Color32::LIGHT_GRAY));
    }
}
