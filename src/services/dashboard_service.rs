//! Dashboard orchestrator: loads the aggregate state, drives the countdown toward
//! the next boundary and runs the lifecycle transitions when boundaries are reached.
//!
//! All decisions are taken sequentially by a single task consuming
//! [`DashboardEvent`]s. Timers only enqueue events; they never touch state.

use std::{future::Future, time::Duration};

use time::OffsetDateTime;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, interval_at, sleep},
};
use tracing::{debug, error, info, warn};

use crate::{
    config::AppConfig,
    dao::{
        error::{ApiError, ApiResult},
        models::{HackathonRecord, HackathonState, JuryMember, Participant, Period, Subject, Team},
    },
    dto::{
        dashboard::{DashboardSnapshot, DashboardView, FETCH_ERROR_BANNER, FormattedPeriod, TeamSummary},
        subject::SubjectSummary,
    },
    services::{
        cleanup_service::delete_all_hackathon_data, transition_service::StatusTransitions,
    },
    state::{
        SharedState,
        countdown::DEFAULT_COUNTDOWN_TITLE,
        lifecycle::{LifecycleStep, LifecycleTrigger, is_ready_for_preparation, plan},
    },
    time_utils::days_since,
};

/// Countdown title while waiting for the period to start.
pub const PREPARATION_TITLE: &str = "The hackathon starts in";
/// Title shown between team generation and the end countdown.
pub const STARTED_TITLE: &str = "The hackathon has started";
/// Countdown title while the hackathon is running.
pub const RUNNING_TITLE: &str = "The hackathon ends in";
/// Countdown title once finished.
pub const CLEANUP_TITLE: &str = "Cleanup in";

/// Inputs of the orchestrator loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEvent {
    /// A countdown started by the orchestrator reached its target.
    CountdownEnded {
        /// Identifies the countdown; events of superseded countdowns are dropped.
        epoch: u64,
    },
    /// WAITING poll tick.
    StatusCheck,
    /// Cleanup check tick.
    CleanupDue,
    /// Re-fetch everything and resume the current phase.
    Reload,
}

/// Spawned timer aborted when replaced or dropped.
struct TimerHandle(JoinHandle<()>);

impl TimerHandle {
    fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self(tokio::spawn(future))
    }

    /// Enqueue `event` every `period`, first after one full period.
    fn repeat(
        period: Duration,
        events: mpsc::UnboundedSender<DashboardEvent>,
        event: DashboardEvent,
    ) -> Self {
        let period = period.max(Duration::from_millis(1));
        Self::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if events.send(event).is_err() {
                    break;
                }
            }
        })
    }

    /// Enqueue `event` once after `delay`.
    fn once(
        delay: Duration,
        events: mpsc::UnboundedSender<DashboardEvent>,
        event: DashboardEvent,
    ) -> Self {
        Self::spawn(async move {
            sleep(delay).await;
            let _ = events.send(event);
        })
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Everything the dashboard knows about the current cycle.
#[derive(Debug, Default)]
struct DashboardData {
    status: Option<HackathonState>,
    participants: Vec<Participant>,
    jury_members: Vec<JuryMember>,
    teams: Vec<Team>,
    period: Option<Period>,
    subject: Option<Subject>,
    current_hackathon_id: Option<u64>,
    cleanup_at: Option<OffsetDateTime>,
    loading: bool,
    error: Option<String>,
}

/// Single-task driver of the hackathon lifecycle.
pub struct DashboardOrchestrator {
    state: SharedState,
    transitions: StatusTransitions,
    events_tx: mpsc::UnboundedSender<DashboardEvent>,
    events_rx: mpsc::UnboundedReceiver<DashboardEvent>,
    data: DashboardData,
    countdown_epoch: u64,
    status_check: Option<TimerHandle>,
    cleanup_check: Option<TimerHandle>,
    reload: Option<TimerHandle>,
}

impl DashboardOrchestrator {
    /// Idle orchestrator over `state`; nothing happens until [`Self::run`].
    pub fn new(state: SharedState) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            transitions: StatusTransitions::new(state.status_service()),
            state,
            events_tx,
            events_rx,
            data: DashboardData::default(),
            countdown_epoch: 0,
            status_check: None,
            cleanup_check: None,
            reload: None,
        }
    }

    /// Load once, then process events until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        self.load().await;

        loop {
            let event = tokio::select! {
                _ = shutdown.wait_for(|stop| *stop) => break,
                event = self.events_rx.recv() => event,
            };
            let Some(event) = event else {
                break;
            };
            self.handle_event(event).await;
        }

        self.teardown();
        info!("dashboard orchestrator stopped");
    }

    fn config(&self) -> &AppConfig {
        self.state.config()
    }

    fn now(&self) -> OffsetDateTime {
        self.state.clock().now()
    }

    async fn handle_event(&mut self, event: DashboardEvent) {
        debug!(?event, status = ?self.data.status, "dashboard event");
        match event {
            DashboardEvent::Reload => {
                self.reload = None;
                self.load().await;
            }
            DashboardEvent::StatusCheck => {
                if self.status_check.is_none() {
                    return;
                }
                self.poll_status().await;
            }
            DashboardEvent::CountdownEnded { epoch } => {
                if epoch != self.countdown_epoch {
                    debug!(epoch, current = self.countdown_epoch, "ignoring stale countdown end");
                    return;
                }
                if let Some(state) = self.data.status {
                    self.dispatch(state, LifecycleTrigger::CountdownEnded).await;
                }
            }
            DashboardEvent::CleanupDue => {
                if self.cleanup_check.is_none() {
                    return;
                }
                let due = self
                    .data
                    .cleanup_at
                    .is_none_or(|cleanup_at| self.now() >= cleanup_at);
                if !due {
                    return;
                }
                self.cleanup_check = None;
                if let Some(state) = self.data.status {
                    self.dispatch(state, LifecycleTrigger::CleanupDue).await;
                }
            }
        }
        self.publish();
    }

    /// Fetch everything and resume whichever phase the backend reports.
    async fn load(&mut self) {
        self.status_check = None;
        self.cleanup_check = None;
        self.reload = None;
        self.data.loading = true;
        self.publish();

        self.fetch_all_data().await;
        self.data.loading = false;

        match self.data.status {
            Some(state) => self.dispatch(state, LifecycleTrigger::Loaded).await,
            None => {
                let retry = self.config().status_check_interval;
                warn!(retry_in = ?retry, "status unavailable; scheduling reload");
                self.schedule_reload(retry);
            }
        }
        self.publish();
    }

    /// Parallel fan-out of every aggregate read. Failures become placeholders.
    async fn fetch_all_data(&mut self) {
        let api = self.state.api();
        let config = self.config();
        let (status, period, participants, jury_members, teams) = tokio::join!(
            api.get_status(config.status_id),
            api.get_period(config.period_id),
            api.list_participants(),
            api.list_jury_members(),
            api.list_teams(),
        );

        self.data.period = or_placeholder(period, "period");
        self.data.participants = or_placeholder(participants, "participants");
        self.data.jury_members = or_placeholder(jury_members, "jury members");
        self.data.teams = or_placeholder(teams, "teams");

        match status {
            Ok(status) => {
                self.data.error = None;
                self.set_status(status.state);
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch status");
                self.data.status = None;
                self.data.error = Some(FETCH_ERROR_BANNER.to_string());
            }
        }
    }

    /// WAITING poll: refresh the counts and status, then re-evaluate readiness.
    async fn poll_status(&mut self) {
        let api = self.state.api();
        let status_id = self.config().status_id;
        let (participants, jury_members, status) = tokio::join!(
            api.list_participants(),
            api.list_jury_members(),
            api.get_status(status_id),
        );

        let (participants, jury_members, status) = match (participants, jury_members, status) {
            (Ok(participants), Ok(jury_members), Ok(status)) => (participants, jury_members, status),
            (participants, jury_members, status) => {
                let err = participants
                    .err()
                    .or(jury_members.err())
                    .or(status.err());
                if let Some(err) = err {
                    warn!(error = %err, "status check failed; keeping previous data");
                }
                return;
            }
        };

        self.data.participants = participants;
        self.data.jury_members = jury_members;
        self.set_status(status.state);
        self.dispatch(status.state, LifecycleTrigger::StatusCheck).await;
    }

    fn set_status(&mut self, state: HackathonState) {
        self.data.status = Some(state);
        if state != HackathonState::Waiting {
            self.status_check = None;
        }
    }

    async fn dispatch(&mut self, state: HackathonState, trigger: LifecycleTrigger) {
        let ready = is_ready_for_preparation(
            Some(state),
            self.data.participants.len(),
            self.data.jury_members.len(),
            self.data.period.as_ref(),
            &self.config().readiness,
            self.now(),
        );

        let step = match plan(state, trigger, ready) {
            Ok(step) => step,
            Err(err) => {
                warn!(error = %err, "ignoring lifecycle trigger");
                return;
            }
        };
        debug!(?step, %state, ?trigger, "lifecycle step");

        match step {
            LifecycleStep::Prepare => self.trigger_preparation().await,
            LifecycleStep::KeepPolling => {
                if trigger == LifecycleTrigger::Loaded && self.state.countdown().is_running() {
                    self.state.countdown().reset(DEFAULT_COUNTDOWN_TITLE);
                }
                self.ensure_status_check();
            }
            LifecycleStep::ResumePreparation => self.start_preparation_countdown(),
            LifecycleStep::StartRunning => self.trigger_running().await,
            LifecycleStep::ResumeRunning => self.load_hackathon_data().await,
            LifecycleStep::Finish => self.trigger_finished().await,
            LifecycleStep::ScheduleCleanup => self.schedule_cleanup(),
            LifecycleStep::Cleanup => self.perform_cleanup().await,
            LifecycleStep::Reload => {
                info!(%state, "status changed outside the dashboard; reloading");
                let _ = self.events_tx.send(DashboardEvent::Reload);
            }
        }
    }

    fn ensure_status_check(&mut self) {
        if self.status_check.is_none() {
            self.status_check = Some(TimerHandle::repeat(
                self.config().status_check_interval,
                self.events_tx.clone(),
                DashboardEvent::StatusCheck,
            ));
        }
    }

    fn schedule_reload(&mut self, delay: Duration) {
        self.reload = Some(TimerHandle::once(
            delay,
            self.events_tx.clone(),
            DashboardEvent::Reload,
        ));
    }

    /// Start the shared countdown. When `notify` is set, its end is fed back as an event.
    fn start_countdown(&mut self, target: OffsetDateTime, title: &str, notify: bool) {
        self.countdown_epoch = self.countdown_epoch.wrapping_add(1);
        let on_end = notify.then(|| {
            let events = self.events_tx.clone();
            let epoch = self.countdown_epoch;
            Box::new(move || {
                let _ = events.send(DashboardEvent::CountdownEnded { epoch });
            }) as Box<dyn FnOnce() + Send>
        });
        self.state.countdown().start(target, Some(title), on_end);
    }

    async fn trigger_preparation(&mut self) {
        self.status_check = None;

        match self.transitions.to_preparation().await {
            Ok(status) => self.set_status(status.state),
            Err(err) => {
                error!(error = %err, "failed to enter preparation; polling again");
                self.ensure_status_check();
                return;
            }
        }
        self.state.countdown().update_title(DEFAULT_COUNTDOWN_TITLE);

        let Some((start, end)) = self.config().period_window.next_window(self.now()) else {
            error!(window = ?self.config().period_window, "period window cannot be computed");
            return;
        };
        let period = Period {
            id: Some(self.config().period_id),
            start_date: Some(start),
            end_date: Some(end),
        };

        match self.save_period(period).await {
            Ok(saved) => {
                info!(start = %start, end = %end, "new period scheduled");
                self.data.period = Some(saved);
                self.start_preparation_countdown();
            }
            Err(err) => error!(error = %err, "failed to save the new period"),
        }
    }

    /// Update the configured period, creating it when the backend does not know it yet.
    async fn save_period(&self, period: Period) -> ApiResult<Period> {
        let api = self.state.api();
        match api.update_period(self.config().period_id, period.clone()).await {
            Err(err) if err.is_not_found() => {
                info!("period record missing; creating it");
                api.create_period(period).await
            }
            other => other,
        }
    }

    fn start_preparation_countdown(&mut self) {
        let Some(start) = self.data.period.as_ref().and_then(|period| period.start_date) else {
            warn!("period has no start date; preparation countdown not started");
            return;
        };
        self.start_countdown(start, PREPARATION_TITLE, true);
    }

    async fn trigger_running(&mut self) {
        match self.transitions.to_running().await {
            Ok(outcome) => {
                self.set_status(outcome.status.state);
                self.data.teams = outcome.teams;
                self.state.countdown().update_title(STARTED_TITLE);
                self.load_hackathon_data().await;
            }
            Err(err) => {
                error!(error = %err, "failed to start the hackathon; retrying after reload");
                self.schedule_reload(self.config().status_check_interval);
            }
        }
    }

    /// Resolve the current hackathon, load its teams and subject, then count down to the end.
    async fn load_hackathon_data(&mut self) {
        let api = self.state.api();

        match api.list_hackathons().await {
            Ok(records) => match records.first().and_then(HackathonRecord::hackathon_id) {
                Some(hackathon_id) => {
                    self.data.current_hackathon_id = Some(hackathon_id);
                    let (teams, subject) =
                        tokio::join!(api.list_teams(), api.hackathon_subject(hackathon_id));
                    match teams {
                        Ok(teams) => self.data.teams = teams,
                        Err(err) => warn!(error = %err, "failed to fetch teams"),
                    }
                    match subject {
                        Ok(subject) => self.data.subject = subject,
                        Err(err) => warn!(error = %err, hackathon_id, "failed to fetch subject"),
                    }
                }
                None if records.is_empty() => warn!("no current hackathon found"),
                None => error!("unable to extract the hackathon id from its jury member link"),
            },
            Err(err) => error!(error = %err, "failed to fetch the current hackathon"),
        }

        match self.data.period.as_ref().and_then(|period| period.end_date) {
            Some(end) => self.start_countdown(end, RUNNING_TITLE, true),
            None => warn!("period has no end date; end countdown not started"),
        }
    }

    async fn trigger_finished(&mut self) {
        match self.transitions.to_finished().await {
            Ok(status) => {
                self.set_status(status.state);
                self.state.countdown().update_title(CLEANUP_TITLE);
                self.schedule_cleanup();
            }
            Err(err) => {
                error!(error = %err, "failed to finish the hackathon; retrying after reload");
                self.schedule_reload(self.config().status_check_interval);
            }
        }
    }

    fn schedule_cleanup(&mut self) {
        let cleanup_at = self.now() + self.config().cleanup_delay;
        info!(%cleanup_at, "cleanup scheduled");
        self.data.cleanup_at = Some(cleanup_at);
        self.start_countdown(cleanup_at, CLEANUP_TITLE, false);
        self.cleanup_check = Some(TimerHandle::repeat(
            self.config().cleanup_check_interval,
            self.events_tx.clone(),
            DashboardEvent::CleanupDue,
        ));
    }

    /// Reset the status, wipe the cycle data and reload shortly after.
    async fn perform_cleanup(&mut self) {
        self.cleanup_check = None;

        match self.transitions.to_waiting().await {
            Ok(status) => {
                self.set_status(status.state);
                self.data.cleanup_at = None;
                self.state.countdown().reset(DEFAULT_COUNTDOWN_TITLE);
            }
            Err(err) => {
                error!(error = %err, "failed to reset the status; retrying after reload");
                self.schedule_reload(self.config().status_check_interval);
                return;
            }
        }

        let api = self.state.api();
        match delete_all_hackathon_data(api.as_ref()).await {
            Ok(()) => {
                self.data.teams.clear();
                self.data.jury_members.clear();
                self.data.participants.clear();
                self.data.subject = None;
                self.data.current_hackathon_id = None;
                info!("hackathon data deleted");
            }
            Err(err) => error!(
                collection = %err.collection,
                error = %err.source,
                "cleanup halted"
            ),
        }
        self.schedule_reload(self.config().data_reload_delay);
    }

    fn snapshot(&self) -> DashboardSnapshot {
        let data = &self.data;
        let now = self.now();
        DashboardSnapshot {
            status: data.status,
            participants_count: data.participants.len(),
            jury_count: data.jury_members.len(),
            teams: data.teams.iter().map(TeamSummary::from).collect(),
            period: data.period.clone(),
            formatted_period: data.period.as_ref().and_then(FormattedPeriod::from_period),
            days_since_last_hackathon: data
                .period
                .as_ref()
                .and_then(|period| period.end_date)
                .map(|end| days_since(end, now)),
            subject: data.subject.as_ref().map(SubjectSummary::from),
            current_hackathon_id: data.current_hackathon_id,
            project_visible: data.status.is_some_and(HackathonState::shows_project),
            cleanup_at: data.cleanup_at,
            loading: data.loading,
            error: data.error.clone(),
        }
    }

    fn publish(&self) {
        self.state.publish_dashboard(self.snapshot());
    }

    fn teardown(&mut self) {
        self.status_check = None;
        self.cleanup_check = None;
        self.reload = None;
        self.state.countdown().stop();
    }
}

/// Latest published snapshot together with the live countdown.
pub fn current_view(state: &SharedState) -> DashboardView {
    DashboardView {
        snapshot: state.dashboard(),
        countdown: state.countdown().current(),
    }
}

fn or_placeholder<T: Default>(result: ApiResult<T>, what: &'static str) -> T {
    result.unwrap_or_else(|err: ApiError| {
        warn!(error = %err, what, "fetch failed; using placeholder");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::backend::memory::{MemoryApi, jury_member, participant},
        state::{AppState, countdown::Countdown},
        time_utils::MonotonicClock,
    };
    use time::macros::datetime;

    const START: OffsetDateTime = datetime!(2026-03-18 12:00 UTC);

    fn orchestrator(api: &MemoryApi) -> DashboardOrchestrator {
        let clock = Arc::new(MonotonicClock::starting_at(START));
        let state = AppState::with_clock(AppConfig::default(), Arc::new(api.clone()), clock);
        DashboardOrchestrator::new(state)
    }

    fn seed_ready(api: &MemoryApi) {
        let mut backend = api.backend();
        backend.participants = vec![
            participant("Ada", "Lovelace"),
            participant("Alan", "Turing"),
            participant("Grace", "Hopper"),
            participant("Linus", "Torvalds"),
        ];
        backend.jury_members = vec![jury_member("Barbara", "Compilers")];
        backend.period = Some(Period {
            id: Some(1),
            start_date: Some(START - time::Duration::days(9)),
            end_date: Some(START - time::Duration::days(7)),
        });
        backend.hackathon_subject = Some(Subject {
            title: "Compilers".into(),
            ..Subject::default()
        });
    }

    /// Handle every event already queued, including those queued while handling.
    async fn drain(orchestrator: &mut DashboardOrchestrator) {
        while let Ok(event) = orchestrator.events_rx.try_recv() {
            orchestrator.handle_event(event).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn full_cycle_runs_every_transition_once() {
        let api = MemoryApi::new();
        seed_ready(&api);
        let mut orchestrator = orchestrator(&api);
        let state = orchestrator.state.clone();

        orchestrator.load().await;
        assert_eq!(api.backend().state, HackathonState::Preparing);
        assert_eq!(api.count("update_period"), 1);
        let countdown = state.countdown().current();
        assert_eq!(countdown.title, PREPARATION_TITLE);
        assert_eq!(countdown.minutes, 5);
        assert!(orchestrator.status_check.is_none());

        sleep(Duration::from_secs(5 * 60 + 2)).await;
        drain(&mut orchestrator).await;
        assert_eq!(api.backend().state, HackathonState::Running);
        let snapshot = state.dashboard();
        assert_eq!(snapshot.teams.len(), 2);
        assert_eq!(snapshot.current_hackathon_id, Some(1));
        assert_eq!(snapshot.subject.map(|subject| subject.title), Some("Compilers".into()));
        assert!(snapshot.project_visible);
        assert_eq!(state.countdown().current().title, RUNNING_TITLE);
        assert_eq!(api.count("hackathon_subject:1"), 1);

        sleep(Duration::from_secs(5 * 60)).await;
        drain(&mut orchestrator).await;
        assert_eq!(api.backend().state, HackathonState::Finished);
        assert_eq!(state.countdown().current().title, CLEANUP_TITLE);
        assert!(state.dashboard().cleanup_at.is_some());

        sleep(Duration::from_secs(5 * 60 + 1)).await;
        drain(&mut orchestrator).await;
        assert_eq!(api.backend().state, HackathonState::Waiting);
        assert_eq!(state.countdown().current(), Countdown::default());
        let deletes = api
            .calls()
            .into_iter()
            .filter(|call| call.starts_with("delete:"))
            .collect::<Vec<_>>();
        assert_eq!(
            deletes,
            [
                "delete:hackathons",
                "delete:teams",
                "delete:jury-members",
                "delete:participants",
            ]
        );
        let snapshot = state.dashboard();
        assert_eq!((snapshot.participants_count, snapshot.jury_count), (0, 0));
        assert!(orchestrator.reload.is_some());

        sleep(Duration::from_secs(2)).await;
        drain(&mut orchestrator).await;
        assert!(orchestrator.reload.is_none());
        assert!(orchestrator.status_check.is_some());
        for transition in ["PREPARING", "RUNNING", "FINISHED", "WAITING"] {
            assert_eq!(api.count(&format!("update_status:{transition}")), 1, "{transition}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn not_ready_keeps_polling() {
        let api = MemoryApi::new();
        api.backend().participants = vec![participant("Ada", "Lovelace")];
        let mut orchestrator = orchestrator(&api);

        orchestrator.load().await;
        assert!(orchestrator.status_check.is_some());
        assert_eq!(api.count("update_status"), 0);

        api.clear_calls();
        sleep(Duration::from_millis(5_500)).await;
        drain(&mut orchestrator).await;
        assert_eq!(api.count("get_status"), 1);
        assert_eq!(api.count("list_participants"), 1);
        assert!(orchestrator.status_check.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn poll_prepares_once_thresholds_are_met() {
        let api = MemoryApi::new();
        seed_ready(&api);
        let extra = api.backend().participants.split_off(1);
        let mut orchestrator = orchestrator(&api);

        orchestrator.load().await;
        assert_eq!(api.backend().state, HackathonState::Waiting);

        api.backend().participants.extend(extra);
        sleep(Duration::from_millis(5_500)).await;
        drain(&mut orchestrator).await;
        assert_eq!(api.backend().state, HackathonState::Preparing);
        assert!(orchestrator.status_check.is_none());
        assert_eq!(orchestrator.state.countdown().current().title, PREPARATION_TITLE);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_preparation_rearms_the_poll() {
        let api = MemoryApi::new();
        seed_ready(&api);
        api.fail_on("update_status:PREPARING");
        let mut orchestrator = orchestrator(&api);

        orchestrator.load().await;
        assert_eq!(api.backend().state, HackathonState::Waiting);
        assert_eq!(api.count("update_period"), 0);
        assert!(orchestrator.status_check.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_period_record_is_created() {
        let api = MemoryApi::new();
        seed_ready(&api);
        api.fail_with("update_period", 404);
        let mut orchestrator = orchestrator(&api);

        orchestrator.load().await;
        assert_eq!(api.count("create_period"), 1);
        let period = api.backend().period.clone().unwrap();
        assert_eq!(period.start_date, Some(START + Duration::from_secs(5 * 60)));
        assert_eq!(orchestrator.state.countdown().current().title, PREPARATION_TITLE);
    }

    #[tokio::test(start_paused = true)]
    async fn period_save_failure_leaves_countdown_idle() {
        let api = MemoryApi::new();
        seed_ready(&api);
        api.fail_on("update_period");
        let mut orchestrator = orchestrator(&api);

        orchestrator.load().await;
        assert_eq!(api.count("create_period"), 0);
        assert_eq!(api.backend().state, HackathonState::Preparing);
        assert!(!orchestrator.state.countdown().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn status_failure_shows_banner_and_retries() {
        let api = MemoryApi::new();
        api.backend().participants = vec![participant("Ada", "Lovelace")];
        api.fail_on("get_status");
        let mut orchestrator = orchestrator(&api);

        orchestrator.load().await;
        let snapshot = orchestrator.state.dashboard();
        assert_eq!(snapshot.error.as_deref(), Some(FETCH_ERROR_BANNER));
        assert_eq!(snapshot.status, None);
        assert_eq!(snapshot.participants_count, 1);
        assert!(orchestrator.reload.is_some());

        api.recover("get_status");
        sleep(Duration::from_secs(6)).await;
        drain(&mut orchestrator).await;
        let snapshot = orchestrator.state.dashboard();
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.status, Some(HackathonState::Waiting));
    }

    #[tokio::test(start_paused = true)]
    async fn external_state_change_during_poll_reloads() {
        let api = MemoryApi::new();
        let mut orchestrator = orchestrator(&api);
        orchestrator.load().await;
        assert!(orchestrator.status_check.is_some());

        {
            let mut backend = api.backend();
            backend.state = HackathonState::Running;
            backend.period = Some(Period {
                id: Some(1),
                start_date: Some(START - time::Duration::hours(1)),
                end_date: Some(START + time::Duration::hours(1)),
            });
        }
        sleep(Duration::from_millis(5_500)).await;
        drain(&mut orchestrator).await;

        assert!(orchestrator.status_check.is_none());
        assert_eq!(api.count("list_hackathons"), 1);
        assert_eq!(orchestrator.state.dashboard().status, Some(HackathonState::Running));
        assert_eq!(orchestrator.state.countdown().current().title, RUNNING_TITLE);
        assert_eq!(api.count("update_status"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn landing_in_preparation_resumes_without_transition() {
        let api = MemoryApi::new();
        {
            let mut backend = api.backend();
            backend.state = HackathonState::Preparing;
            backend.period = Some(Period {
                id: Some(1),
                start_date: Some(START + time::Duration::hours(2)),
                end_date: Some(START + time::Duration::hours(3)),
            });
        }
        let mut orchestrator = orchestrator(&api);

        orchestrator.load().await;
        let countdown = orchestrator.state.countdown().current();
        assert_eq!(countdown.title, PREPARATION_TITLE);
        assert_eq!(countdown.hours, 2);
        assert_eq!(api.count("update_status"), 0);
        assert!(orchestrator.status_check.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn landing_in_finished_schedules_cleanup() {
        let api = MemoryApi::new();
        api.backend().state = HackathonState::Finished;
        let mut orchestrator = orchestrator(&api);

        orchestrator.load().await;
        assert!(orchestrator.cleanup_check.is_some());
        assert_eq!(
            orchestrator.state.dashboard().cleanup_at,
            Some(START + Duration::from_secs(5 * 60))
        );
        assert_eq!(orchestrator.state.countdown().current().title, CLEANUP_TITLE);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_or_unarmed_events_are_ignored() {
        let api = MemoryApi::new();
        api.backend().state = HackathonState::Preparing;
        let mut orchestrator = orchestrator(&api);
        orchestrator.load().await;
        api.clear_calls();

        orchestrator
            .handle_event(DashboardEvent::CountdownEnded { epoch: 999 })
            .await;
        orchestrator.handle_event(DashboardEvent::StatusCheck).await;
        orchestrator.handle_event(DashboardEvent::CleanupDue).await;
        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_generation_keeps_preparing() {
        let api = MemoryApi::new();
        seed_ready(&api);
        api.fail_on("generate");
        let mut orchestrator = orchestrator(&api);

        orchestrator.load().await;
        sleep(Duration::from_secs(5 * 60 + 2)).await;
        drain(&mut orchestrator).await;
        assert_eq!(api.backend().state, HackathonState::Preparing);
        assert_eq!(api.count("update_status:RUNNING"), 0);
        assert_eq!(orchestrator.state.dashboard().status, Some(HackathonState::Preparing));
        assert!(orchestrator.reload.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_generation_is_retried_after_reload() {
        let api = MemoryApi::new();
        seed_ready(&api);
        api.fail_on("generate");
        let mut orchestrator = orchestrator(&api);

        orchestrator.load().await;
        sleep(Duration::from_secs(5 * 60 + 2)).await;
        drain(&mut orchestrator).await;
        assert_eq!(api.count("generate"), 1);

        api.recover("generate");
        sleep(Duration::from_secs(6)).await;
        drain(&mut orchestrator).await;
        assert_eq!(api.count("generate"), 2);
        assert_eq!(api.backend().state, HackathonState::Running);
        assert_eq!(orchestrator.state.countdown().current().title, RUNNING_TITLE);
        assert!(orchestrator.state.countdown().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_finish_is_retried_after_reload() {
        let api = MemoryApi::new();
        seed_ready(&api);
        api.backend().state = HackathonState::Running;
        api.fail_on("update_status:FINISHED");
        let mut orchestrator = orchestrator(&api);

        orchestrator.load().await;
        drain(&mut orchestrator).await;
        assert_eq!(api.backend().state, HackathonState::Running);
        assert!(orchestrator.reload.is_some());
        assert!(orchestrator.cleanup_check.is_none());

        api.recover("update_status:FINISHED");
        sleep(Duration::from_secs(6)).await;
        drain(&mut orchestrator).await;
        assert_eq!(api.backend().state, HackathonState::Finished);
        assert!(orchestrator.cleanup_check.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_every_timer() {
        let api = MemoryApi::new();
        api.backend().state = HackathonState::Finished;
        let mut orchestrator = orchestrator(&api);
        orchestrator.load().await;
        orchestrator.schedule_reload(Duration::from_secs(1));

        orchestrator.teardown();
        assert!(orchestrator.cleanup_check.is_none());
        assert!(orchestrator.reload.is_none());
        assert!(!orchestrator.state.countdown().is_running());

        sleep(Duration::from_secs(10)).await;
        assert!(orchestrator.events_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_shutdown() {
        let api = MemoryApi::new();
        let orchestrator = orchestrator(&api);
        let state = orchestrator.state.clone();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(orchestrator.run(shutdown_rx));
        sleep(Duration::from_millis(100)).await;
        assert_eq!(state.dashboard().status, Some(HackathonState::Waiting));

        shutdown_tx.send_replace(true);
        task.await.unwrap();
        assert!(!state.countdown().is_running());
    }
}
