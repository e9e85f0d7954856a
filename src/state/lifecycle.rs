//! Lifecycle decisions: which transition a trigger causes in a given state.

use thiserror::Error;
use time::OffsetDateTime;

use crate::{
    dao::models::{HackathonState, Period},
    time_utils::days_since,
};

/// Things that happen to the dashboard and may move the lifecycle forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleTrigger {
    /// Aggregate data has just been (re)loaded from the backend.
    Loaded,
    /// The periodic WAITING poll fetched fresh counts and status.
    StatusCheck,
    /// The boundary countdown of the current phase reached zero.
    CountdownEnded,
    /// The scheduled cleanup time has been reached.
    CleanupDue,
}

/// What the orchestrator must do in response to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStep {
    /// Move to PREPARING and open a new period.
    Prepare,
    /// Stay in WAITING and keep the poll armed.
    KeepPolling,
    /// Count down to the start of the current period.
    ResumePreparation,
    /// Generate teams and move to RUNNING.
    StartRunning,
    /// Load the running hackathon and count down to the end of the period.
    ResumeRunning,
    /// Move to FINISHED.
    Finish,
    /// Arm the cleanup countdown.
    ScheduleCleanup,
    /// Return to WAITING and wipe the hackathon data.
    Cleanup,
    /// The state changed externally; reload everything.
    Reload,
}

/// Error returned when a trigger has no meaning in the observed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{trigger:?} cannot be handled while {from}")]
pub struct InvalidTrigger {
    /// State observed when the trigger arrived.
    pub from: HackathonState,
    /// Trigger that cannot be applied.
    pub trigger: LifecycleTrigger,
}

/// Decide the next step for `trigger` observed in `state`.
///
/// `ready` is only consulted in WAITING and tells whether the preparation
/// preconditions hold (see [`is_ready_for_preparation`]).
pub fn plan(
    state: HackathonState,
    trigger: LifecycleTrigger,
    ready: bool,
) -> Result<LifecycleStep, InvalidTrigger> {
    use HackathonState::*;
    use LifecycleTrigger::*;

    let step = match (state, trigger) {
        (Waiting, Loaded | StatusCheck) if ready => LifecycleStep::Prepare,
        (Waiting, Loaded | StatusCheck) => LifecycleStep::KeepPolling,
        (_, StatusCheck) => LifecycleStep::Reload,
        (Preparing, Loaded) => LifecycleStep::ResumePreparation,
        (Preparing, CountdownEnded) => LifecycleStep::StartRunning,
        (Running, Loaded) => LifecycleStep::ResumeRunning,
        (Running, CountdownEnded) => LifecycleStep::Finish,
        (Finished, Loaded) => LifecycleStep::ScheduleCleanup,
        (Finished, CleanupDue) => LifecycleStep::Cleanup,
        (from, trigger) => return Err(InvalidTrigger { from, trigger }),
    };

    Ok(step)
}

/// Thresholds gating the WAITING -> PREPARING transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadinessRules {
    /// Participants needed before preparing.
    pub min_participants: usize,
    /// Jury members needed before preparing.
    pub min_jury: usize,
    /// Days that must have strictly elapsed since the end of the last period.
    pub min_days_between_periods: f64,
}

impl Default for ReadinessRules {
    fn default() -> Self {
        Self {
            min_participants: 3,
            min_jury: 1,
            min_days_between_periods: 6.0,
        }
    }
}

/// Whether a new hackathon may be prepared right now.
pub fn is_ready_for_preparation(
    status: Option<HackathonState>,
    participants_count: usize,
    jury_count: usize,
    period: Option<&Period>,
    rules: &ReadinessRules,
    now: OffsetDateTime,
) -> bool {
    if status != Some(HackathonState::Waiting) {
        return false;
    }
    if jury_count < rules.min_jury || participants_count < rules.min_participants {
        return false;
    }

    let Some(end_date) = period.and_then(|period| period.end_date) else {
        return false;
    };
    days_since(end_date, now) > rules.min_days_between_periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, macros::datetime};

    const NOW: OffsetDateTime = datetime!(2026-03-18 12:00 UTC);

    fn period_ended(days_ago: i64) -> Period {
        Period {
            id: Some(1),
            start_date: Some(NOW - Duration::days(days_ago + 1)),
            end_date: Some(NOW - Duration::days(days_ago)),
        }
    }

    fn ready(participants: usize, jury: usize, period: Option<&Period>) -> bool {
        is_ready_for_preparation(
            Some(HackathonState::Waiting),
            participants,
            jury,
            period,
            &ReadinessRules::default(),
            NOW,
        )
    }

    #[test]
    fn enough_people_and_old_period_is_ready() {
        let period = period_ended(7);
        assert!(ready(4, 1, Some(&period)));
        assert!(!ready(2, 1, Some(&period)));
    }

    #[test]
    fn missing_jury_is_not_ready() {
        assert!(!ready(10, 0, Some(&period_ended(30))));
    }

    #[test]
    fn days_threshold_is_strict() {
        assert!(!ready(3, 1, Some(&period_ended(6))));
        assert!(!ready(3, 1, Some(&period_ended(2))));
    }

    #[test]
    fn missing_period_or_end_date_is_not_ready() {
        assert!(!ready(3, 1, None));
        let open_ended = Period {
            end_date: None,
            ..period_ended(30)
        };
        assert!(!ready(3, 1, Some(&open_ended)));
    }

    #[test]
    fn only_waiting_can_be_ready() {
        let period = period_ended(30);
        for status in [
            None,
            Some(HackathonState::Preparing),
            Some(HackathonState::Running),
            Some(HackathonState::Finished),
        ] {
            assert!(!is_ready_for_preparation(
                status,
                10,
                3,
                Some(&period),
                &ReadinessRules::default(),
                NOW,
            ));
        }
    }

    #[test]
    fn waiting_prepares_only_when_ready() {
        use LifecycleTrigger::*;
        assert_eq!(plan(HackathonState::Waiting, Loaded, true), Ok(LifecycleStep::Prepare));
        assert_eq!(plan(HackathonState::Waiting, StatusCheck, true), Ok(LifecycleStep::Prepare));
        assert_eq!(
            plan(HackathonState::Waiting, StatusCheck, false),
            Ok(LifecycleStep::KeepPolling)
        );
    }

    #[test]
    fn loading_resumes_the_current_phase() {
        use LifecycleTrigger::Loaded;
        assert_eq!(
            plan(HackathonState::Preparing, Loaded, true),
            Ok(LifecycleStep::ResumePreparation)
        );
        assert_eq!(plan(HackathonState::Running, Loaded, false), Ok(LifecycleStep::ResumeRunning));
        assert_eq!(
            plan(HackathonState::Finished, Loaded, false),
            Ok(LifecycleStep::ScheduleCleanup)
        );
    }

    #[test]
    fn countdown_end_advances_the_running_phases() {
        use LifecycleTrigger::CountdownEnded;
        assert_eq!(
            plan(HackathonState::Preparing, CountdownEnded, false),
            Ok(LifecycleStep::StartRunning)
        );
        assert_eq!(plan(HackathonState::Running, CountdownEnded, false), Ok(LifecycleStep::Finish));
        assert_eq!(
            plan(HackathonState::Finished, LifecycleTrigger::CleanupDue, false),
            Ok(LifecycleStep::Cleanup)
        );
    }

    #[test]
    fn poll_outside_waiting_reloads() {
        for state in [HackathonState::Preparing, HackathonState::Running, HackathonState::Finished] {
            assert_eq!(
                plan(state, LifecycleTrigger::StatusCheck, true),
                Ok(LifecycleStep::Reload)
            );
        }
    }

    #[test]
    fn meaningless_triggers_are_rejected() {
        let err = plan(HackathonState::Waiting, LifecycleTrigger::CountdownEnded, true).unwrap_err();
        assert_eq!(err.from, HackathonState::Waiting);
        assert_eq!(err.trigger, LifecycleTrigger::CountdownEnded);

        assert!(plan(HackathonState::Finished, LifecycleTrigger::CountdownEnded, false).is_err());
        assert!(plan(HackathonState::Running, LifecycleTrigger::CleanupDue, false).is_err());
    }
}
