//! Model swap state machine
//!
//! The controller is the only thing that mutates the active model. Loads are
//! identified by a monotonically increasing token; a completion whose token
//! is not the most recent request is dropped without any effect, so at most
//! one load result is ever applied per request cycle.
//!
//! ```text
//! Idle --begin_load--> Loading --complete(Ok)--> Ready
//!                         |  \--complete(Err)--> Error --retry--> Loading
//!                         \--begin_load (supersedes)--> Loading
//! ```

use chrono::{DateTime, Utc};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::framing::{frame_camera, CameraPose, FramingConfig, OrbitLimits};
use crate::geometry::BoundingVolume;
use crate::hierarchy::MeshNode;
use crate::normalize::normalize_model;
use crate::source::LoadError;

/// Identifies one load request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadTicket {
    pub token: u64,
    pub asset: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapPhase {
    Idle,
    Loading,
    Ready,
    Error,
}

/// The displayed model and everything derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveModelState {
    pub asset: String,
    /// Normalized (centered) hierarchy
    pub model: Arc<MeshNode>,
    pub source_bounds: BoundingVolume,
    pub bounds: BoundingVolume,
    pub offset: Vec3,
    pub pose: CameraPose,
    /// Increments on every applied load
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
}

impl ActiveModelState {
    pub fn summary(&self) -> ActiveModelSummary {
        ActiveModelSummary {
            asset: self.asset.clone(),
            generation: self.generation,
            bounds: self.bounds,
            offset: self.offset,
            pose: self.pose,
            node_count: self.model.node_count(),
            mesh_count: self.model.mesh_count(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Serializable view of an [`ActiveModelState`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveModelSummary {
    pub asset: String,
    pub generation: u64,
    pub bounds: BoundingVolume,
    pub offset: Vec3,
    pub pose: CameraPose,
    pub node_count: usize,
    pub mesh_count: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Observable transitions, drained by the UI collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SwapEvent {
    Loading { asset: String, token: u64 },
    Ready(ActiveModelSummary),
    Failed { asset: String, token: u64, kind: String, message: String },
    Retired { asset: String, generation: u64 },
}

/// What `complete` did with a result
#[derive(Debug)]
pub enum SwapOutcome {
    /// The result became the active model; the previous one (if any) is
    /// handed back for resource release
    Applied { retired: Option<ActiveModelState> },
    /// The load failed; the previous model stays displayed
    Failed(LoadError),
    /// A newer request superseded this one; nothing changed
    Stale,
}

/// Serializable snapshot of the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapSnapshot {
    pub phase: SwapPhase,
    pub pending: Option<LoadTicket>,
    pub active: Option<ActiveModelSummary>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct ModelSwapController {
    phase: SwapPhase,
    active: Option<ActiveModelState>,
    pending: Option<LoadTicket>,
    failed: Option<(String, LoadError)>,
    next_token: u64,
    generation: u64,
    framing: FramingConfig,
    limits: OrbitLimits,
    events: Vec<SwapEvent>,
}

impl Default for ModelSwapController {
    fn default() -> Self {
        Self::new(FramingConfig::default(), OrbitLimits::default())
    }
}

impl ModelSwapController {
    pub fn new(framing: FramingConfig, limits: OrbitLimits) -> Self {
        Self {
            phase: SwapPhase::Idle,
            active: None,
            pending: None,
            failed: None,
            next_token: 1,
            generation: 0,
            framing,
            limits,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> SwapPhase {
        self.phase
    }

    pub fn active(&self) -> Option<&ActiveModelState> {
        self.active.as_ref()
    }

    pub fn pending(&self) -> Option<&LoadTicket> {
        self.pending.as_ref()
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.failed.as_ref().map(|(_, err)| err)
    }

    pub fn limits(&self) -> &OrbitLimits {
        &self.limits
    }

    pub fn snapshot(&self) -> SwapSnapshot {
        SwapSnapshot {
            phase: self.phase,
            pending: self.pending.clone(),
            active: self.active.as_ref().map(ActiveModelState::summary),
            last_error: self.last_error().map(ToString::to_string),
        }
    }

    /// Start loading `asset`. Any in-flight request is superseded and its
    /// result will be discarded when it arrives. The active model keeps
    /// being displayed until the new one is ready.
    pub fn begin_load(&mut self, asset: impl Into<String>) -> LoadTicket {
        let ticket = LoadTicket {
            token: self.next_token,
            asset: asset.into(),
        };
        self.next_token += 1;

        if let Some(previous) = self.pending.replace(ticket.clone()) {
            debug!(
                asset = %previous.asset,
                token = previous.token,
                "Superseding in-flight load"
            );
        }
        self.phase = SwapPhase::Loading;
        self.events.push(SwapEvent::Loading {
            asset: ticket.asset.clone(),
            token: ticket.token,
        });
        info!(asset = %ticket.asset, token = ticket.token, "Loading model");
        ticket
    }

    /// Reload the asset whose last load failed
    pub fn retry(&mut self) -> Option<LoadTicket> {
        if self.phase != SwapPhase::Error {
            return None;
        }
        let asset = self.failed.as_ref().map(|(asset, _)| asset.clone())?;
        Some(self.begin_load(asset))
    }

    /// Apply the result of a load. Normalization and framing happen here,
    /// before anything is published.
    pub fn complete(&mut self, ticket: &LoadTicket, result: Result<MeshNode, LoadError>) -> SwapOutcome {
        if self.pending.as_ref().map(|p| p.token) != Some(ticket.token) {
            debug!(asset = %ticket.asset, token = ticket.token, "Discarding stale load result");
            return SwapOutcome::Stale;
        }
        self.pending = None;

        let source = match result {
            Ok(source) if source.has_geometry() => source,
            Ok(_) => {
                return self.fail(
                    ticket,
                    LoadError::EmptyModel {
                        asset: ticket.asset.clone(),
                    },
                )
            }
            Err(err) => return self.fail(ticket, err),
        };

        let normalized = normalize_model(&source);
        let pose = frame_camera(&normalized.bounds, &self.framing, &self.limits);
        self.generation += 1;

        let next = ActiveModelState {
            asset: ticket.asset.clone(),
            model: Arc::new(normalized.root),
            source_bounds: normalized.source_bounds,
            bounds: normalized.bounds,
            offset: normalized.offset,
            pose,
            generation: self.generation,
            loaded_at: Utc::now(),
        };
        info!(
            asset = %next.asset,
            generation = next.generation,
            distance = pose.distance,
            "Model ready"
        );
        self.events.push(SwapEvent::Ready(next.summary()));

        let retired = self.active.replace(next);
        if let Some(old) = &retired {
            self.push_retired(old);
        }
        self.phase = SwapPhase::Ready;
        self.failed = None;

        SwapOutcome::Applied { retired }
    }

    fn fail(&mut self, ticket: &LoadTicket, err: LoadError) -> SwapOutcome {
        warn!(asset = %ticket.asset, token = ticket.token, error = %err, "Model load failed");
        self.events.push(SwapEvent::Failed {
            asset: ticket.asset.clone(),
            token: ticket.token,
            kind: err.kind().to_string(),
            message: err.to_string(),
        });
        self.phase = SwapPhase::Error;
        self.failed = Some((ticket.asset.clone(), err.clone()));
        SwapOutcome::Failed(err)
    }

    fn push_retired(&mut self, old: &ActiveModelState) {
        debug!(asset = %old.asset, generation = old.generation, "Retiring model");
        self.events.push(SwapEvent::Retired {
            asset: old.asset.clone(),
            generation: old.generation,
        });
    }

    /// Change the framing policy and re-frame the active model in place
    pub fn set_framing(&mut self, framing: FramingConfig, limits: OrbitLimits) {
        self.framing = framing;
        self.limits = limits;
        if let Some(active) = &mut self.active {
            active.pose = frame_camera(&active.bounds, &self.framing, &self.limits);
        }
    }

    /// Take the transitions recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SwapEvent> {
        std::mem::take(&mut self.events)
    }

    /// End the session: cancel interest in any pending load and hand back
    /// the active model for release
    pub fn shutdown(&mut self) -> Option<ActiveModelState> {
        self.pending = None;
        self.failed = None;
        self.phase = SwapPhase::Idle;
        let retired = self.active.take();
        if let Some(old) = &retired {
            self.push_retired(old);
        }
        info!("Swap controller shut down");
        retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Geometry;

    fn building(min: Vec3, max: Vec3) -> MeshNode {
        MeshNode::group(Some("building".to_string())).with_child(MeshNode::mesh(
            None,
            Arc::new(Geometry::new(None, BoundingVolume::from_corners(min, max))),
        ))
    }

    fn cube() -> MeshNode {
        building(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0))
    }

    fn wide() -> MeshNode {
        building(Vec3::new(10.0, 0.0, 0.0), Vec3::new(30.0, 5.0, 8.0))
    }

    fn failed_count(events: &[SwapEvent]) -> usize {
        events.iter().filter(|e| matches!(e, SwapEvent::Failed { .. })).count()
    }

    #[test]
    fn test_first_load_becomes_ready() {
        let mut ctl = ModelSwapController::default();
        assert_eq!(ctl.phase(), SwapPhase::Idle);

        let ticket = ctl.begin_load("cube.gltf");
        assert_eq!(ctl.phase(), SwapPhase::Loading);
        assert!(ctl.active().is_none());

        match ctl.complete(&ticket, Ok(cube())) {
            SwapOutcome::Applied { retired } => assert!(retired.is_none()),
            other => panic!("unexpected outcome {other:?}"),
        }
        let active = ctl.active().unwrap();
        assert_eq!(ctl.phase(), SwapPhase::Ready);
        assert_eq!(active.asset, "cube.gltf");
        assert_eq!(active.generation, 1);
        // Clamped to the default minimum orbit distance
        assert_eq!(active.pose.distance, 5.0);
        assert_eq!(active.pose.target, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_latest_request_wins_when_older_resolves_first() {
        let mut ctl = ModelSwapController::default();
        let a = ctl.begin_load("a.gltf");
        let b = ctl.begin_load("b.gltf");

        assert!(matches!(ctl.complete(&a, Ok(cube())), SwapOutcome::Stale));
        assert!(ctl.active().is_none());
        assert_eq!(ctl.phase(), SwapPhase::Loading);

        assert!(matches!(ctl.complete(&b, Ok(wide())), SwapOutcome::Applied { .. }));
        assert_eq!(ctl.active().unwrap().asset, "b.gltf");
    }

    #[test]
    fn test_latest_request_wins_when_newer_resolves_first() {
        let mut ctl = ModelSwapController::default();
        let a = ctl.begin_load("a.gltf");
        let b = ctl.begin_load("b.gltf");

        assert!(matches!(ctl.complete(&b, Ok(wide())), SwapOutcome::Applied { .. }));
        assert!(matches!(ctl.complete(&a, Ok(cube())), SwapOutcome::Stale));

        let active = ctl.active().unwrap();
        assert_eq!(active.asset, "b.gltf");
        assert_eq!(active.generation, 1);
        let published: Vec<_> = ctl
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                SwapEvent::Ready(summary) => Some(summary.asset),
                _ => None,
            })
            .collect();
        assert_eq!(published, vec!["b.gltf".to_string()]);
    }

    #[test]
    fn test_stale_failure_is_silent() {
        let mut ctl = ModelSwapController::default();
        let a = ctl.begin_load("a.gltf");
        let _b = ctl.begin_load("b.gltf");
        ctl.drain_events();

        let outcome = ctl.complete(&a, Err(LoadError::fetch("a.gltf", "timeout")));
        assert!(matches!(outcome, SwapOutcome::Stale));
        assert_eq!(ctl.phase(), SwapPhase::Loading);
        assert!(ctl.drain_events().is_empty());
    }

    #[test]
    fn test_failure_preserves_previous_model_and_signals_once() {
        let mut ctl = ModelSwapController::default();
        let a = ctl.begin_load("a.gltf");
        ctl.complete(&a, Ok(cube()));
        let shown = ctl.active().unwrap().clone();
        ctl.drain_events();

        let b = ctl.begin_load("b.gltf");
        assert_eq!(ctl.active(), Some(&shown));
        let outcome = ctl.complete(&b, Err(LoadError::parse("b.gltf", "unexpected EOF")));
        assert!(matches!(outcome, SwapOutcome::Failed(LoadError::Parse { .. })));

        assert_eq!(ctl.phase(), SwapPhase::Error);
        assert_eq!(ctl.active(), Some(&shown));
        assert!(ctl.last_error().is_some());

        let events = ctl.drain_events();
        assert_eq!(failed_count(&events), 1);
        assert!(!events.iter().any(|e| matches!(e, SwapEvent::Retired { .. })));

        // A late duplicate completion for the same ticket changes nothing
        assert!(matches!(ctl.complete(&b, Ok(wide())), SwapOutcome::Stale));
        assert_eq!(failed_count(&ctl.drain_events()), 0);
        assert_eq!(ctl.active(), Some(&shown));
    }

    #[test]
    fn test_empty_model_is_an_error() {
        let mut ctl = ModelSwapController::default();
        let ticket = ctl.begin_load("empty.gltf");
        let empty = MeshNode::group(None).with_child(MeshNode::group(None));

        let outcome = ctl.complete(&ticket, Ok(empty));
        assert!(matches!(outcome, SwapOutcome::Failed(LoadError::EmptyModel { .. })));
        assert_eq!(ctl.phase(), SwapPhase::Error);
        assert!(ctl.active().is_none());
    }

    #[test]
    fn test_swap_hands_back_retired_model() {
        let mut ctl = ModelSwapController::default();
        let a = ctl.begin_load("a.gltf");
        ctl.complete(&a, Ok(cube()));
        let b = ctl.begin_load("b.gltf");

        match ctl.complete(&b, Ok(wide())) {
            SwapOutcome::Applied { retired: Some(old) } => {
                assert_eq!(old.asset, "a.gltf");
                assert_eq!(old.generation, 1);
            }
            other => panic!("expected a retired model, got {other:?}"),
        }
        let active = ctl.active().unwrap();
        assert_eq!(active.generation, 2);
        assert!(active.bounds.center().x.abs() < 1e-4);
        assert_eq!(active.offset, Vec3::new(-20.0, 0.0, -4.0));

        let events = ctl.drain_events();
        let ready_at = events.iter().rposition(|e| matches!(e, SwapEvent::Ready(_)));
        let retired_at = events.iter().position(|e| matches!(e, SwapEvent::Retired { .. }));
        assert!(ready_at < retired_at, "old model retired only after the new one is ready");
    }

    #[test]
    fn test_retry_reloads_failed_asset() {
        let mut ctl = ModelSwapController::default();
        assert!(ctl.retry().is_none());

        let t = ctl.begin_load("flaky.gltf");
        ctl.complete(&t, Err(LoadError::fetch("flaky.gltf", "503")));

        let retry = ctl.retry().unwrap();
        assert_eq!(retry.asset, "flaky.gltf");
        assert!(retry.token > t.token);
        assert_eq!(ctl.phase(), SwapPhase::Loading);

        ctl.complete(&retry, Ok(cube()));
        assert_eq!(ctl.phase(), SwapPhase::Ready);
        assert!(ctl.last_error().is_none());
    }

    #[test]
    fn test_shutdown_retires_active_and_ignores_pending() {
        let mut ctl = ModelSwapController::default();
        let a = ctl.begin_load("a.gltf");
        ctl.complete(&a, Ok(cube()));
        let b = ctl.begin_load("b.gltf");

        let retired = ctl.shutdown().unwrap();
        assert_eq!(retired.asset, "a.gltf");
        assert_eq!(ctl.phase(), SwapPhase::Idle);
        assert!(matches!(ctl.complete(&b, Ok(wide())), SwapOutcome::Stale));
        assert!(ctl.active().is_none());
    }

    #[test]
    fn test_set_framing_reframes_active() {
        let mut ctl = ModelSwapController::default();
        let a = ctl.begin_load("a.gltf");
        ctl.complete(&a, Ok(cube()));

        let loose = OrbitLimits {
            min_distance: 0.5,
            ..OrbitLimits::default()
        };
        ctl.set_framing(FramingConfig::default(), loose);
        assert!((ctl.active().unwrap().pose.distance - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut ctl = ModelSwapController::default();
        let a = ctl.begin_load("a.gltf");
        ctl.complete(&a, Ok(cube()));
        let json = serde_json::to_value(ctl.snapshot()).unwrap();
        assert_eq!(json["phase"], "ready");
        assert_eq!(json["active"]["asset"], "a.gltf");
        assert_eq!(json["active"]["mesh_count"], 1);
    }
}
