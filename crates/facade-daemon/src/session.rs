//! Viewing session: one swap controller, its fetch tasks, and the theme
//!
//! Loads run as independent tasks. Each finishes by handing its result to
//! the controller under the session lock, so completions are applied one at
//! a time and a superseded result can never overwrite a newer model.

use facade_core::{
    compose, AssetSource, BuildingEntry, Catalog, FramingConfig, LoadError, LoadTicket, MeshNode,
    ModelSwapController, OrbitLimits, RenderableScene, SwapEvent, SwapOutcome, SwapSnapshot, ThemeName,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Unknown building: {0}")]
    UnknownBuilding(String),
    #[error("No failed load to retry")]
    NothingToRetry,
}

/// Events published to WebSocket clients
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Swap(SwapEvent),
    ThemeChanged(ThemeName),
}

/// How a load task ended
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied { generation: u64 },
    Failed(LoadError),
    Stale,
}

/// A started load; await it to learn the outcome
pub struct LoadHandle {
    pub ticket: LoadTicket,
    task: JoinHandle<LoadOutcome>,
}

impl LoadHandle {
    pub async fn outcome(self) -> Option<LoadOutcome> {
        self.task.await.ok()
    }
}

pub struct Session<S: AssetSource> {
    source: Arc<S>,
    catalog: Catalog,
    controller: Mutex<ModelSwapController>,
    theme: RwLock<ThemeName>,
    events: broadcast::Sender<SessionEvent>,
}

impl<S: AssetSource> Session<S> {
    pub fn new(
        source: S,
        catalog: Catalog,
        framing: FramingConfig,
        limits: OrbitLimits,
        theme: ThemeName,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(100);
        Arc::new(Self {
            source: Arc::new(source),
            catalog,
            controller: Mutex::new(ModelSwapController::new(framing, limits)),
            theme: RwLock::new(theme),
            events,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SwapSnapshot {
        self.controller.lock().await.snapshot()
    }

    pub async fn theme(&self) -> ThemeName {
        *self.theme.read().await
    }

    /// Switch themes; the active model is left untouched
    pub async fn set_theme(&self, theme: ThemeName) {
        let mut current = self.theme.write().await;
        if *current == theme {
            return;
        }
        *current = theme;
        info!(theme = %theme, "Theme changed");
        let _ = self.events.send(SessionEvent::ThemeChanged(theme));
    }

    /// Scene for the active model under the current theme
    pub async fn scene(&self) -> Option<RenderableScene> {
        let model = {
            let controller = self.controller.lock().await;
            controller.active()?.model.clone()
        };
        let theme = self.theme().await;
        Some(compose(model, &theme.descriptor()))
    }

    /// Start loading a catalog building; supersedes any load in flight
    pub async fn select(self: &Arc<Self>, id: &str) -> Result<LoadHandle, SessionError> {
        let entry = self
            .catalog
            .find(id)
            .ok_or_else(|| SessionError::UnknownBuilding(id.to_string()))?;
        Ok(self.load(entry).await)
    }

    /// Reload the asset whose last load failed
    pub async fn retry(self: &Arc<Self>) -> Result<LoadHandle, SessionError> {
        let ticket = {
            let mut controller = self.controller.lock().await;
            let ticket = controller.retry().ok_or(SessionError::NothingToRetry)?;
            self.publish(&mut controller);
            ticket
        };
        Ok(self.spawn_fetch(ticket))
    }

    async fn load(self: &Arc<Self>, entry: &BuildingEntry) -> LoadHandle {
        let ticket = {
            let mut controller = self.controller.lock().await;
            let ticket = controller.begin_load(entry.file.clone());
            self.publish(&mut controller);
            ticket
        };
        info!(building = %entry.id, asset = %ticket.asset, token = ticket.token, "Building selected");
        self.spawn_fetch(ticket)
    }

    fn spawn_fetch(self: &Arc<Self>, ticket: LoadTicket) -> LoadHandle {
        let session = Arc::clone(self);
        let task_ticket = ticket.clone();
        let task = tokio::spawn(async move {
            let result = session.source.fetch(&task_ticket.asset).await;
            session.finish(&task_ticket, result).await
        });
        LoadHandle { ticket, task }
    }

    async fn finish(&self, ticket: &LoadTicket, result: Result<MeshNode, LoadError>) -> LoadOutcome {
        let (outcome, retired) = {
            let mut controller = self.controller.lock().await;
            let outcome = controller.complete(ticket, result);
            self.publish(&mut controller);
            match outcome {
                SwapOutcome::Applied { retired } => {
                    let generation = controller.active().map(|a| a.generation).unwrap_or_default();
                    (LoadOutcome::Applied { generation }, retired)
                }
                SwapOutcome::Failed(err) => (LoadOutcome::Failed(err), None),
                SwapOutcome::Stale => (LoadOutcome::Stale, None),
            }
        };

        // Release the previous model outside the lock
        if let Some(old) = retired {
            debug!(asset = %old.asset, generation = old.generation, "Released retired model");
        }
        outcome
    }

    fn publish(&self, controller: &mut ModelSwapController) {
        for event in controller.drain_events() {
            // No subscribers is fine
            let _ = self.events.send(SessionEvent::Swap(event));
        }
    }

    /// Tear down: in-flight loads become stale and the active model is released
    pub async fn shutdown(&self) {
        let retired = {
            let mut controller = self.controller.lock().await;
            let retired = controller.shutdown();
            self.publish(&mut controller);
            retired
        };
        if let Some(old) = retired {
            info!(asset = %old.asset, generation = old.generation, "Session closed");
        }
    }
}
