//! Rest countdown and workout duration.
//!
//! Both timers run as tokio tasks owned through their `JoinHandle`. Aborting the handle is the
//! only way a timer stops ticking early, and dropping a timer aborts its task.

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use log::debug;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Instant},
};

use crate::{
    clock::Clock,
    notification::{self, Notifier, Signal},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RestStatus {
    #[default]
    Idle,
    Resting,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RestTimerState {
    pub remaining_seconds: u32,
    pub status: RestStatus,
}

impl RestTimerState {
    #[must_use]
    pub fn resting(remaining_seconds: u32) -> Self {
        Self {
            remaining_seconds,
            status: RestStatus::Resting,
        }
    }

    #[must_use]
    pub fn is_resting(&self) -> bool {
        self.status == RestStatus::Resting
    }
}

pub struct RestTimer {
    tick: Duration,
    state: Arc<watch::Sender<RestTimerState>>,
    activation: Arc<AtomicU64>,
    countdown: Mutex<Option<JoinHandle<()>>>,
    notifier: Arc<dyn Notifier>,
}

impl RestTimer {
    #[must_use]
    pub fn new(tick: Duration, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(RestTimerState::default());
        Self {
            tick,
            state: Arc::new(state),
            activation: Arc::new(AtomicU64::new(0)),
            countdown: Mutex::new(None),
            notifier,
        }
    }

    /// Replaces any running countdown by a new one of `seconds`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, seconds: u32) {
        let mut countdown = self.lock_countdown();
        let activation = self.cancel(&mut countdown);

        if seconds == 0 {
            self.state.send_replace(RestTimerState::default());
            return;
        }

        self.state.send_replace(RestTimerState::resting(seconds));
        notification::emit(self.notifier.as_ref(), Signal::RestStarted);

        let tick = self.tick;
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.activation);
        let notifier = Arc::clone(&self.notifier);

        *countdown = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + tick, tick);
            loop {
                interval.tick().await;
                if current.load(Ordering::SeqCst) != activation {
                    break;
                }
                let mut finished = false;
                state.send_modify(|state| {
                    state.remaining_seconds = state.remaining_seconds.saturating_sub(1);
                    if state.remaining_seconds == 0 {
                        state.status = RestStatus::Idle;
                        finished = true;
                    }
                });
                if finished {
                    debug!("rest complete");
                    notification::emit(notifier.as_ref(), Signal::RestCompleted);
                    break;
                }
            }
        }));
    }

    pub fn stop(&self) {
        let mut countdown = self.lock_countdown();
        self.cancel(&mut countdown);
        self.state.send_replace(RestTimerState::default());
    }

    #[must_use]
    pub fn state(&self) -> RestTimerState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RestTimerState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn is_counting_down(&self) -> bool {
        self.lock_countdown()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Invalidates the current activation and returns the identity of the next one.
    fn cancel(&self, countdown: &mut Option<JoinHandle<()>>) -> u64 {
        let next = self.activation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(handle) = countdown.take() {
            handle.abort();
        }
        next
    }

    fn lock_countdown(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.countdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RestTimer {
    fn drop(&mut self) {
        let mut countdown = self.lock_countdown();
        self.cancel(&mut countdown);
    }
}

struct Run {
    started_at: DateTime<Utc>,
    stopped_at: Option<DateTime<Utc>>,
    ticker: Option<JoinHandle<()>>,
}

/// Elapsed time of a workout, always computed as `now - started_at`.
pub struct DurationTimer {
    tick: Duration,
    clock: Arc<dyn Clock>,
    elapsed: Arc<watch::Sender<u32>>,
    run: Mutex<Option<Run>>,
}

impl DurationTimer {
    #[must_use]
    pub fn new(tick: Duration, clock: Arc<dyn Clock>) -> Self {
        let (elapsed, _) = watch::channel(0);
        Self {
            tick,
            clock,
            elapsed: Arc::new(elapsed),
            run: Mutex::new(None),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn start(&self, started_at: DateTime<Utc>) {
        let mut run = self.lock_run();
        if let Some(handle) = run.take().and_then(|r| r.ticker) {
            handle.abort();
        }

        self.elapsed
            .send_replace(seconds_between(started_at, self.clock.now()));

        let tick = self.tick;
        let clock = Arc::clone(&self.clock);
        let elapsed = Arc::clone(&self.elapsed);

        *run = Some(Run {
            started_at,
            stopped_at: None,
            ticker: Some(tokio::spawn(async move {
                let mut interval = time::interval_at(Instant::now() + tick, tick);
                loop {
                    interval.tick().await;
                    elapsed.send_replace(seconds_between(started_at, clock.now()));
                }
            })),
        });
    }

    /// Stops ticking for good and freezes the elapsed time.
    pub fn stop(&self) {
        let mut run = self.lock_run();
        if let Some(run) = run.as_mut() {
            if let Some(handle) = run.ticker.take() {
                handle.abort();
            }
            if run.stopped_at.is_none() {
                let now = self.clock.now();
                run.stopped_at = Some(now);
                self.elapsed
                    .send_replace(seconds_between(run.started_at, now));
            }
        }
    }

    pub fn clear(&self) {
        if let Some(handle) = self.lock_run().take().and_then(|r| r.ticker) {
            handle.abort();
        }
        self.elapsed.send_replace(0);
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u32 {
        match self.lock_run().as_ref() {
            Some(run) => seconds_between(
                run.started_at,
                run.stopped_at.unwrap_or_else(|| self.clock.now()),
            ),
            None => 0,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.lock_run().as_ref().map(|run| run.started_at)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_run()
            .as_ref()
            .is_some_and(|run| run.ticker.as_ref().is_some_and(|h| !h.is_finished()))
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.elapsed.subscribe()
    }

    fn lock_run(&self) -> std::sync::MutexGuard<'_, Option<Run>> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DurationTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_run().as_mut().and_then(|r| r.ticker.take()) {
            handle.abort();
        }
    }
}

pub struct TimerScheduler {
    rest: RestTimer,
    duration: DurationTimer,
}

impl TimerScheduler {
    #[must_use]
    pub fn new(tick: Duration, clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            rest: RestTimer::new(tick, notifier),
            duration: DurationTimer::new(tick, clock),
        }
    }

    #[must_use]
    pub fn rest(&self) -> &RestTimer {
        &self.rest
    }

    #[must_use]
    pub fn duration(&self) -> &DurationTimer {
        &self.duration
    }

    /// Cancels both timers, leaving no scheduled work behind.
    pub fn cancel_all(&self) {
        self.rest.stop();
        self.duration.stop();
    }
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    u32::try_from((to - from).num_seconds().max(0)).unwrap_or(u32::MAX)
}

/// Formats seconds as `m:ss`, minutes are not wrapped into hours.
#[must_use]
pub fn format_seconds(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{clock::ManualClock, notification::SignalRecorder};

    use super::*;

    const TICK: Duration = Duration::from_secs(1);

    fn rest_timer() -> (RestTimer, Arc<SignalRecorder>) {
        let recorder = Arc::new(SignalRecorder::new());
        (RestTimer::new(TICK, recorder.clone()), recorder)
    }

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap()
    }

    async fn sleep_millis(millis: u64) {
        time::sleep(Duration::from_millis(millis)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rest_timer_counts_down() {
        let (timer, recorder) = rest_timer();
        assert_eq!(timer.state(), RestTimerState::default());

        timer.start(90);
        assert_eq!(timer.state(), RestTimerState::resting(90));
        assert!(timer.is_counting_down());

        sleep_millis(1_500).await;
        assert_eq!(timer.state(), RestTimerState::resting(89));

        sleep_millis(10_000).await;
        assert_eq!(timer.state(), RestTimerState::resting(79));
        assert_eq!(recorder.take(), vec![Signal::RestStarted]);

        sleep_millis(80_000).await;
        assert_eq!(
            timer.state(),
            RestTimerState {
                remaining_seconds: 0,
                status: RestStatus::Idle
            }
        );
        assert!(!timer.is_counting_down());
        assert_eq!(recorder.take(), vec![Signal::RestCompleted]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rest_timer_stop() {
        let (timer, recorder) = rest_timer();

        timer.start(90);
        sleep_millis(2_500).await;
        timer.stop();
        assert_eq!(timer.state(), RestTimerState::default());
        assert!(!timer.is_counting_down());

        sleep_millis(100_000).await;
        assert_eq!(timer.state(), RestTimerState::default());
        assert_eq!(recorder.take(), vec![Signal::RestStarted]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rest_timer_restart_replaces_countdown() {
        let (timer, recorder) = rest_timer();

        timer.start(90);
        sleep_millis(1_500).await;
        timer.start(30);
        assert_eq!(timer.state(), RestTimerState::resting(30));

        sleep_millis(1_500).await;
        assert_eq!(timer.state(), RestTimerState::resting(29));

        sleep_millis(10_000).await;
        assert_eq!(timer.state(), RestTimerState::resting(19));

        sleep_millis(100_000).await;
        assert_eq!(timer.state(), RestTimerState::default());
        assert_eq!(
            recorder.take(),
            vec![
                Signal::RestStarted,
                Signal::RestStarted,
                Signal::RestCompleted
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rest_timer_start_zero() {
        let (timer, recorder) = rest_timer();

        timer.start(60);
        timer.start(0);
        assert_eq!(timer.state(), RestTimerState::default());
        assert!(!timer.is_counting_down());

        sleep_millis(5_000).await;
        assert_eq!(recorder.take(), vec![Signal::RestStarted]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rest_timer_subscribe() {
        let (timer, _) = rest_timer();
        let mut receiver = timer.subscribe();

        timer.start(2);
        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow_and_update(), RestTimerState::resting(2));

        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow_and_update(), RestTimerState::resting(1));

        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow_and_update(), RestTimerState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rest_timer_drop_aborts_countdown() {
        let recorder = Arc::new(SignalRecorder::new());
        let timer = RestTimer::new(TICK, recorder.clone());
        let receiver = timer.subscribe();

        timer.start(3);
        drop(timer);
        sleep_millis(10_000).await;

        assert_eq!(*receiver.borrow(), RestTimerState::resting(3));
        assert_eq!(recorder.take(), vec![Signal::RestStarted]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_timer_elapsed_ignores_ticks() {
        let clock = ManualClock::new(start_time());
        let timer = DurationTimer::new(TICK, Arc::new(clock.clone()));

        timer.start(start_time() - chrono::Duration::seconds(30));
        assert_eq!(timer.elapsed_seconds(), 30);
        assert!(timer.is_running());

        sleep_millis(5_500).await;
        assert_eq!(timer.elapsed_seconds(), 30);
        assert_eq!(*timer.subscribe().borrow(), 30);

        clock.advance(chrono::Duration::seconds(600));
        assert_eq!(timer.elapsed_seconds(), 630);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_timer_publishes_elapsed() {
        let clock = ManualClock::new(start_time());
        let timer = DurationTimer::new(TICK, Arc::new(clock.clone()));
        let mut receiver = timer.subscribe();

        timer.start(start_time());
        clock.advance(chrono::Duration::seconds(42));
        sleep_millis(1_500).await;

        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_timer_stop() {
        let clock = ManualClock::new(start_time());
        let timer = DurationTimer::new(TICK, Arc::new(clock.clone()));

        timer.start(start_time());
        clock.advance(chrono::Duration::seconds(600));
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_seconds(), 600);

        clock.advance(chrono::Duration::seconds(60));
        sleep_millis(5_000).await;
        assert_eq!(timer.elapsed_seconds(), 600);
        assert_eq!(*timer.subscribe().borrow(), 600);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_timer_start_in_future() {
        let clock = ManualClock::new(start_time());
        let timer = DurationTimer::new(TICK, Arc::new(clock));

        timer.start(start_time() + chrono::Duration::seconds(5));
        assert_eq!(timer.elapsed_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_scheduler_cancel_all() {
        let clock = ManualClock::new(start_time());
        let scheduler = TimerScheduler::new(TICK, Arc::new(clock), Arc::new(SignalRecorder::new()));

        scheduler.duration().start(start_time());
        scheduler.rest().start(90);
        scheduler.cancel_all();

        assert!(!scheduler.duration().is_running());
        assert!(!scheduler.rest().is_counting_down());
        assert_eq!(scheduler.rest().state(), RestTimerState::default());
    }

    #[rstest]
    #[case(0, "0:00")]
    #[case(9, "0:09")]
    #[case(90, "1:30")]
    #[case(600, "10:00")]
    #[case(4_523, "75:23")]
    fn test_format_seconds(#[case] seconds: u32, #[case] expected: &str) {
        assert_eq!(format_seconds(seconds), expected);
    }
}
