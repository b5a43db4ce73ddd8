//! UI overlays using bevy_egui

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use facade_scene::ui::{
    render_building_info, render_building_list, render_controls_hint, render_load_status, render_theme_toggle,
};
use facade_scene::{ActiveTheme, BuildingCatalog, BuildingSelection, ModelRequests, SwapControl, UiLayout};

/// Grouped system parameters for the main UI system
#[derive(SystemParam)]
pub struct UiParams<'w, 's> {
    pub contexts: EguiContexts<'w, 's>,
    pub catalog: Res<'w, BuildingCatalog>,
    pub selection: Res<'w, BuildingSelection>,
    pub swap: Res<'w, SwapControl>,
    pub theme: ResMut<'w, ActiveTheme>,
    pub requests: ResMut<'w, ModelRequests>,
    pub ui_layout: ResMut<'w, UiLayout>,
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, update_ui_layout)
            // Main UI system runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

/// Track window size for the mobile layout
fn update_ui_layout(windows: Query<&Window, With<PrimaryWindow>>, mut ui_layout: ResMut<UiLayout>) {
    let Ok(window) = windows.single() else {
        return;
    };
    let (width, height) = (window.width(), window.height());
    if width != ui_layout.screen_width || height != ui_layout.screen_height {
        ui_layout.update_for_screen(width, height);
    }
}

fn ui_system(mut params: UiParams) {
    let is_mobile = params.ui_layout.is_mobile;
    let panel_width = params.ui_layout.panel_width();

    let Ok(ctx) = params.contexts.ctx_mut() else { return };

    // Mobile: toggle buttons at the bottom, away from curved screen edges
    if is_mobile {
        egui::TopBottomPanel::bottom("mobile_toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let menu_text = if params.ui_layout.show_left_panel { "☰ Buildings" } else { "☰" };
                if ui.button(menu_text).clicked() {
                    params.ui_layout.show_left_panel = !params.ui_layout.show_left_panel;
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let info_text = if params.ui_layout.show_info { "Info ✕" } else { "Info" };
                    if ui.button(info_text).clicked() {
                        params.ui_layout.show_info = !params.ui_layout.show_info;
                    }
                });
            });
        });
    }

    if !is_mobile || params.ui_layout.show_left_panel {
        egui::SidePanel::left("buildings_panel")
            .default_width(panel_width)
            .resizable(!is_mobile)
            .show(ctx, |ui| {
                ui.heading("Buildings");
                ui.separator();

                egui::ScrollArea::vertical().show(ui, |ui| {
                    render_building_list(
                        ui,
                        &params.catalog,
                        &params.selection,
                        &mut params.requests,
                        &params.ui_layout,
                    );

                    ui.add_space(8.0);
                    ui.separator();
                    render_load_status(ui, &params.swap, &params.catalog, &mut params.requests);

                    ui.add_space(8.0);
                    ui.separator();
                    render_theme_toggle(ui, &mut params.theme);
                });
            });
    }

    if params.ui_layout.show_info {
        egui::Window::new("building_info")
            .title_bar(false)
            .resizable(false)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
            .show(ctx, |ui| {
                ui.set_max_width(280.0);
                render_building_info(ui, &params.selection, &params.swap);
            });
    }

    egui::Area::new(egui::Id::new("controls_hint"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, if is_mobile { -50.0 } else { -10.0 }))
        .interactable(false)
        .show(ctx, |ui| {
            render_controls_hint(ui, &params.ui_layout);
        });
}
