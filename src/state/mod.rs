/// Countdown engine.
pub mod countdown;
/// Lifecycle decision table and readiness rules.
pub mod lifecycle;

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    config::AppConfig,
    dao::backend::HackathonApi,
    dto::dashboard::DashboardSnapshot,
    services::status_service::StatusService,
    time_utils::{Clock, MonotonicClock},
};

use self::countdown::CountdownEngine;

/// Handle shared by handlers and the orchestrator.
pub type SharedState = Arc<AppState>;

/// Central application state shared by the HTTP handlers and the dashboard orchestrator.
pub struct AppState {
    config: AppConfig,
    api: Arc<dyn HackathonApi>,
    clock: Arc<dyn Clock>,
    countdown: CountdownEngine,
    dashboard: watch::Sender<DashboardSnapshot>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, api: Arc<dyn HackathonApi>) -> SharedState {
        Self::with_clock(config, api, Arc::new(MonotonicClock::new()))
    }

    /// Same as [`AppState::new`] with an explicit time source.
    pub fn with_clock(
        config: AppConfig,
        api: Arc<dyn HackathonApi>,
        clock: Arc<dyn Clock>,
    ) -> SharedState {
        let (dashboard, _rx) = watch::channel(DashboardSnapshot {
            loading: true,
            ..DashboardSnapshot::default()
        });
        Arc::new(Self {
            countdown: CountdownEngine::new(clock.clone()),
            config,
            api,
            clock,
            dashboard,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Backend client.
    pub fn api(&self) -> Arc<dyn HackathonApi> {
        self.api.clone()
    }

    /// Wall-clock source.
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// The single countdown shown by the dashboard.
    pub fn countdown(&self) -> &CountdownEngine {
        &self.countdown
    }

    /// Status accessor bound to the configured status record.
    pub fn status_service(&self) -> StatusService {
        StatusService::new(self.api.clone(), self.config.status_id)
    }

    /// Latest dashboard snapshot.
    pub fn dashboard(&self) -> DashboardSnapshot {
        self.dashboard.borrow().clone()
    }

    /// Replace the dashboard snapshot and notify watchers.
    pub fn publish_dashboard(&self, snapshot: DashboardSnapshot) {
        self.dashboard.send_replace(snapshot);
    }

    /// Subscribe to dashboard snapshot updates.
    pub fn dashboard_watcher(&self) -> watch::Receiver<DashboardSnapshot> {
        self.dashboard.subscribe()
    }
}
