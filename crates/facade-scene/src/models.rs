//! Building model loading and swapping
//!
//! Model requests from the UI start a load through the swap controller and
//! the asset server. Once the glTF asset and its dependencies resolve, the
//! result goes back through the controller; only an applied result spawns
//! an entity, and the entity it replaces is despawned in the same frame.

use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::gltf::{Gltf, GltfLoaderSettings, GltfMesh, GltfNode};
use bevy::prelude::*;
use facade_core::{LoadError, LoadTicket, SwapOutcome};

use crate::camera::OrbitCamera;
use crate::gltf_convert::{model_from_loaded_gltf, LoadedModel};
use crate::types::{BuildingCatalog, BuildingSelection, ModelRequest, ModelRequests, SwapControl};

/// A spawned building model
#[derive(Component, Debug)]
pub struct BuildingModel {
    pub asset: String,
    pub generation: u64,
}

/// The in-flight load, if any. Replacing it drops the previous handle.
#[derive(Resource, Default)]
pub struct PendingModel {
    load: Option<(LoadTicket, Handle<Gltf>)>,
}

impl PendingModel {
    pub fn ticket(&self) -> Option<&LoadTicket> {
        self.load.as_ref().map(|(ticket, _)| ticket)
    }
}

/// Plugin for model loading
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingModel>()
            .init_resource::<ModelRequests>()
            .init_resource::<BuildingSelection>()
            .add_systems(
                Update,
                (process_model_requests, poll_pending_model, drain_swap_events).chain(),
            );
    }
}

fn process_model_requests(
    mut requests: ResMut<ModelRequests>,
    mut swap: ResMut<SwapControl>,
    mut pending: ResMut<PendingModel>,
    mut selection: ResMut<BuildingSelection>,
    catalog: Res<BuildingCatalog>,
    asset_server: Res<AssetServer>,
) {
    if requests.queue.is_empty() {
        return;
    }

    for request in std::mem::take(&mut requests.queue) {
        let ticket = match request {
            ModelRequest::Select(id) => match catalog.0.find(&id) {
                Some(entry) => {
                    selection.requested = Some(entry.id.clone());
                    swap.0.begin_load(entry.file.clone())
                }
                None => {
                    warn!(building = %id, "Unknown building requested");
                    continue;
                }
            },
            ModelRequest::Retry => match swap.0.retry() {
                Some(ticket) => ticket,
                None => continue,
            },
        };

        let handle = asset_server.load_with_settings::<Gltf, GltfLoaderSettings>(
            ticket.asset.clone(),
            |settings: &mut GltfLoaderSettings| settings.include_source = true,
        );
        pending.load = Some((ticket, handle));
    }
}

#[allow(clippy::too_many_arguments)]
fn poll_pending_model(
    mut commands: Commands,
    mut pending: ResMut<PendingModel>,
    mut swap: ResMut<SwapControl>,
    mut selection: ResMut<BuildingSelection>,
    mut orbit: ResMut<OrbitCamera>,
    catalog: Res<BuildingCatalog>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    gltf_nodes: Res<Assets<GltfNode>>,
    gltf_meshes: Res<Assets<GltfMesh>>,
    meshes: Res<Assets<Mesh>>,
    spawned: Query<(Entity, &BuildingModel)>,
) {
    let Some((ticket, handle)) = pending.load.as_ref() else {
        return;
    };
    let Some(result) = resolve(&ticket.asset, handle, &asset_server, &gltfs, &gltf_nodes, &gltf_meshes, &meshes) else {
        return;
    };
    let (result, scene) = match result {
        Ok(LoadedModel { scene, root }) => (Ok(root), Some(scene)),
        Err(err) => (Err(err), None),
    };

    let Some((ticket, _handle)) = pending.load.take() else {
        return;
    };
    match swap.0.complete(&ticket, result) {
        SwapOutcome::Applied { retired } => {
            let Some(active) = swap.0.active() else {
                return;
            };
            if let Some(scene) = scene {
                let offset = Vec3::from_array(active.offset.to_array());
                commands.spawn((
                    SceneRoot(scene),
                    Transform::from_translation(offset),
                    BuildingModel {
                        asset: active.asset.clone(),
                        generation: active.generation,
                    },
                ));
            }
            orbit.apply_pose(&active.pose);
            selection.displayed = catalog.0.find_by_file(&active.asset).cloned();

            if let Some(old) = retired {
                for (entity, model) in &spawned {
                    if model.generation == old.generation {
                        commands.entity(entity).despawn();
                    }
                }
                debug!(asset = %old.asset, generation = old.generation, "Released retired model");
            }
        }
        SwapOutcome::Failed(err) => {
            warn!(asset = %ticket.asset, error = %err, "Keeping previous model");
        }
        SwapOutcome::Stale => {}
    }
}

/// Entities already reflect every transition; the event log is only traced
fn drain_swap_events(mut swap: ResMut<SwapControl>) {
    if !swap.is_changed() {
        return;
    }
    for event in swap.bypass_change_detection().0.drain_events() {
        debug!(?event, "Swap event");
    }
}

/// Poll the asset server; `None` while still loading
fn resolve(
    asset: &str,
    handle: &Handle<Gltf>,
    asset_server: &AssetServer,
    gltfs: &Assets<Gltf>,
    gltf_nodes: &Assets<GltfNode>,
    gltf_meshes: &Assets<GltfMesh>,
    meshes: &Assets<Mesh>,
) -> Option<Result<LoadedModel, LoadError>> {
    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        return Some(Err(LoadError::fetch(asset, err)));
    }
    match asset_server.get_recursive_dependency_load_state(handle) {
        Some(RecursiveDependencyLoadState::Loaded) => {}
        Some(RecursiveDependencyLoadState::Failed(err)) => return Some(Err(LoadError::fetch(asset, err))),
        _ => return None,
    }

    let gltf = gltfs.get(handle)?;
    Some(
        model_from_loaded_gltf(gltf, gltf_nodes, gltf_meshes, meshes)
            .map_err(|err| LoadError::parse(asset, err.message())),
    )
}
