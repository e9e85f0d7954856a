//! Countdown engine owning the single one-second timer of the dashboard.

use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use utoipa::ToSchema;

use crate::time_utils::{Clock, calculate_time_components, millis_until};

/// Title shown while nothing is scheduled.
pub const DEFAULT_COUNTDOWN_TITLE: &str = "The hackathon starts soon";

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Time remaining until the current target, as displayed by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    /// Heading shown above the countdown.
    pub title: String,
    /// Whole days left.
    pub days: u64,
    /// Hours left after the days.
    pub hours: u64,
    /// Minutes left after the hours.
    pub minutes: u64,
    /// Seconds left after the minutes.
    pub seconds: u64,
    /// The target has been reached.
    pub had_ended: bool,
}

impl Countdown {
    /// All-zero countdown that has not ended.
    pub fn zeroed(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            had_ended: false,
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::zeroed(DEFAULT_COUNTDOWN_TITLE)
    }
}

/// Invoked once when a countdown reaches its target.
pub type CountdownCallback = Box<dyn FnOnce() + Send + 'static>;

/// Countdown publisher with at most one live timer.
///
/// Cloning yields another handle on the same engine. Every state change is
/// published synchronously on a [`watch`] channel.
#[derive(Clone)]
pub struct CountdownEngine {
    inner: Arc<Inner>,
}

struct Inner {
    clock: Arc<dyn Clock>,
    sender: watch::Sender<Countdown>,
    timer: Mutex<TimerSlot>,
}

#[derive(Default)]
struct TimerSlot {
    /// Bumped whenever the active run is replaced or cancelled so that ticks
    /// from a superseded task are discarded.
    generation: u64,
    run: Option<ActiveRun>,
}

struct ActiveRun {
    target: OffsetDateTime,
    on_end: Option<CountdownCallback>,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(run) = self.run.take() {
            if let Some(handle) = run.handle {
                handle.abort();
            }
        }
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl CountdownEngine {
    /// Create an idle engine publishing the default zeroed countdown.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (sender, _receiver) = watch::channel(Countdown::default());
        Self {
            inner: Arc::new(Inner {
                clock,
                sender,
                timer: Mutex::new(TimerSlot::default()),
            }),
        }
    }

    /// Count down to `target`, replacing any running countdown.
    ///
    /// The first tick is computed before returning; when `target` is already
    /// past, `on_end` runs before this call returns and no timer is armed.
    /// Must be called from within a Tokio runtime.
    pub fn start(
        &self,
        target: OffsetDateTime,
        title: Option<&str>,
        on_end: Option<CountdownCallback>,
    ) {
        let ended = {
            let mut slot = self.inner.lock_timer();
            slot.cancel();

            if let Some(title) = title {
                self.inner
                    .sender
                    .send_modify(|countdown| countdown.title = title.to_string());
            }

            slot.run = Some(ActiveRun {
                target,
                on_end,
                handle: None,
            });
            let ended = self.inner.tick(&mut slot);

            let generation = slot.generation;
            if let Some(run) = slot.run.as_mut() {
                let inner = Arc::downgrade(&self.inner);
                run.handle = Some(tokio::spawn(run_timer(inner, generation)));
            }
            ended
        };

        if let Some(on_end) = ended {
            on_end();
        }
    }

    /// Cancel the running countdown, if any. The published value is kept.
    pub fn stop(&self) {
        self.inner.lock_timer().cancel();
    }

    /// Stop and publish a zeroed countdown titled `title`.
    pub fn reset(&self, title: &str) {
        self.stop();
        self.inner.sender.send_replace(Countdown::zeroed(title));
    }

    /// Replace only the title of the published countdown.
    pub fn update_title(&self, title: &str) {
        self.inner
            .sender
            .send_modify(|countdown| countdown.title = title.to_string());
    }

    /// Latest published countdown.
    pub fn current(&self) -> Countdown {
        self.inner.sender.borrow().clone()
    }

    /// Subscribe to every subsequent publication.
    pub fn subscribe(&self) -> watch::Receiver<Countdown> {
        self.inner.sender.subscribe()
    }

    /// Whether a timer is currently armed.
    pub fn is_running(&self) -> bool {
        self.inner.lock_timer().run.is_some()
    }
}

impl Inner {
    fn lock_timer(&self) -> MutexGuard<'_, TimerSlot> {
        self.timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publish the countdown for the active run. Returns the end callback when
    /// the target has been reached, after disarming the run.
    fn tick(&self, slot: &mut TimerSlot) -> Option<CountdownCallback> {
        let target = slot.run.as_ref()?.target;
        let distance = millis_until(target, self.clock.now());

        if distance < 0 {
            self.sender.send_modify(|countdown| {
                countdown.days = 0;
                countdown.hours = 0;
                countdown.minutes = 0;
                countdown.seconds = 0;
                countdown.had_ended = true;
            });

            let mut run = slot.run.take()?;
            slot.generation = slot.generation.wrapping_add(1);
            if let Some(handle) = run.handle.take() {
                handle.abort();
            }
            return run.on_end.take();
        }

        let components = calculate_time_components(distance);
        self.sender.send_modify(|countdown| {
            countdown.days = components.days;
            countdown.hours = components.hours;
            countdown.minutes = components.minutes;
            countdown.seconds = components.seconds;
            countdown.had_ended = false;
        });
        None
    }
}

async fn run_timer(inner: Weak<Inner>, generation: u64) {
    let mut ticker = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };

        let (ended, finished) = {
            let mut slot = inner.lock_timer();
            if slot.generation != generation {
                break;
            }
            let ended = inner.tick(&mut slot);
            (ended, slot.run.is_none())
        };

        if let Some(on_end) = ended {
            on_end();
        }
        if finished {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::time_utils::MonotonicClock;
    use time::macros::datetime;
    use tokio::time::sleep;

    fn engine() -> (CountdownEngine, Arc<MonotonicClock>) {
        let clock = Arc::new(MonotonicClock::starting_at(datetime!(2026-03-11 12:00 UTC)));
        (CountdownEngine::new(clock.clone()), clock)
    }

    fn counter() -> (Arc<AtomicUsize>, CountdownCallback) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = calls.clone();
        (
            calls,
            Box::new(move || {
                handle.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_immediate() {
        let (engine, clock) = engine();
        engine.start(
            clock.now() + time::Duration::milliseconds(90_061_000),
            Some("The hackathon ends in"),
            None,
        );

        assert_eq!(
            engine.current(),
            Countdown {
                title: "The hackathon ends in".into(),
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1,
                had_ended: false,
            }
        );
        assert!(engine.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second() {
        let (engine, clock) = engine();
        engine.start(clock.now() + time::Duration::minutes(1), None, None);
        assert_eq!(engine.current().seconds, 0);
        assert_eq!(engine.current().minutes, 1);

        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(engine.current().seconds, 59);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(engine.current().seconds, 58);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_supersedes_previous_timer() {
        let (engine, clock) = engine();
        let (first_calls, first_end) = counter();
        engine.start(
            clock.now() + time::Duration::seconds(2),
            Some("first"),
            Some(first_end),
        );
        engine.start(clock.now() + time::Duration::hours(1), Some("second"), None);

        sleep(Duration::from_millis(500)).await;
        for elapsed in 1..=4u64 {
            sleep(Duration::from_secs(1)).await;
            let current = engine.current();
            assert_eq!(current.title, "second");
            assert!(!current.had_ended);
            let remaining = current.hours * 3_600 + current.minutes * 60 + current.seconds;
            assert_eq!(remaining, 3_600 - elapsed);
        }
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_leaves_a_single_ticking_timer() {
        let (engine, clock) = engine();
        let (first_calls, first_end) = counter();
        engine.start(
            clock.now() + time::Duration::hours(2),
            Some("first"),
            Some(first_end),
        );

        // offset the second run so stray ticks of the first land on distinct instants
        sleep(Duration::from_millis(300)).await;
        let mut receiver = engine.subscribe();
        engine.start(clock.now() + time::Duration::hours(1), Some("second"), None);
        receiver.borrow_and_update();

        let notifications = Arc::new(AtomicUsize::new(0));
        let seen = notifications.clone();
        tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        sleep(Duration::from_millis(3_200)).await;
        assert_eq!(notifications.load(Ordering::SeqCst), 3);
        assert_eq!(engine.current().title, "second");
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn past_target_ends_on_first_tick_and_calls_back_once() {
        let (engine, clock) = engine();
        let (calls, on_end) = counter();
        engine.start(
            clock.now() - time::Duration::seconds(1),
            Some("Cleanup in"),
            Some(on_end),
        );

        let current = engine.current();
        assert!(current.had_ended);
        assert_eq!((current.days, current.hours, current.minutes, current.seconds), (0, 0, 0, 0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!engine.is_running());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reaching_target_stops_the_timer() {
        let (engine, clock) = engine();
        let (calls, on_end) = counter();
        engine.start(clock.now() + time::Duration::seconds(2), None, Some(on_end));

        sleep(Duration::from_millis(3_500)).await;
        assert!(engine.current().had_ended);
        assert!(!engine.is_running());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_drops_callback() {
        let (engine, clock) = engine();
        engine.stop();

        let (calls, on_end) = counter();
        engine.start(clock.now() + time::Duration::seconds(1), None, Some(on_end));
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());

        sleep(Duration::from_secs(3)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!engine.current().had_ended);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_and_update_title_publish() {
        let (engine, clock) = engine();
        let mut receiver = engine.subscribe();
        engine.start(clock.now() + time::Duration::minutes(5), None, None);
        assert!(receiver.has_changed().unwrap());
        receiver.borrow_and_update();

        engine.update_title("The hackathon has started");
        assert!(receiver.has_changed().unwrap());
        let current = receiver.borrow_and_update().clone();
        assert_eq!(current.title, "The hackathon has started");
        assert_eq!(current.minutes, 5);
        assert!(engine.is_running());

        engine.reset("The hackathon starts soon");
        assert!(!engine.is_running());
        assert_eq!(engine.current(), Countdown::zeroed("The hackathon starts soon"));
    }
}
