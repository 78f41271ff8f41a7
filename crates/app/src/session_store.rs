use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use ironlog_domain::{
    ExerciseEntry, ExerciseEntryID, ExerciseID, NewExerciseEntry, NewSet, Phase, SetChanges, SetID,
    User, ValidationError, WorkoutID, WorkoutSeed, WorkoutService, WorkoutSession,
};
use log::{debug, info};
use tokio::sync::{Mutex, watch};

use crate::{
    OngoingWorkout, RestTimerState, SessionError, Settings, TimerScheduler,
    clock::{Clock, SystemClock},
    notification::{self, Navigator, Notifier, Signal, Silent},
};

/// Owner of the workout currently shown to the user.
///
/// Every mutation is sent to the gateway first. The session it answers with replaces the local
/// snapshot as a whole, so the snapshot never holds a state the gateway has not confirmed.
/// Mutations on the same store run one after another in call order. An operation still waiting
/// for the gateway when the view is left is discarded on return.
pub struct SessionStore<S> {
    service: S,
    user: User,
    settings: Settings,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    navigator: Option<Box<dyn Navigator>>,
    snapshot: watch::Sender<Option<WorkoutSession>>,
    transaction: Mutex<()>,
    view: AtomicU64,
    timers: TimerScheduler,
}

impl<S> SessionStore<S> {
    pub fn new(service: S, user: User, settings: Settings) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let notifier: Arc<dyn Notifier> = Arc::new(Silent);
        let (snapshot, _) = watch::channel(None);
        Self {
            timers: TimerScheduler::new(settings.tick(), clock.clone(), notifier.clone()),
            service,
            user,
            settings,
            clock,
            notifier,
            navigator: None,
            snapshot,
            transaction: Mutex::new(()),
            view: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self.rebuild_timers();
        self
    }

    /// Signals are dropped when notifications are disabled in the settings.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        if self.settings.notifications {
            self.notifier = notifier;
            self.rebuild_timers();
        }
        self
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: Box<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    fn rebuild_timers(&mut self) {
        self.timers = TimerScheduler::new(
            self.settings.tick(),
            self.clock.clone(),
            self.notifier.clone(),
        );
    }

    #[must_use]
    pub fn session(&self) -> Option<WorkoutSession> {
        self.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<WorkoutSession>> {
        self.snapshot.subscribe()
    }

    #[must_use]
    pub fn rest_timer(&self) -> RestTimerState {
        self.timers.rest().state()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u32 {
        self.timers.duration().elapsed_seconds()
    }

    #[must_use]
    pub fn timers(&self) -> &TimerScheduler {
        &self.timers
    }

    /// Pointer to the active workout, to be persisted for resuming it later.
    #[must_use]
    pub fn ongoing(&self) -> Option<OngoingWorkout> {
        self.snapshot
            .borrow()
            .as_ref()
            .filter(|session| session.is_active())
            .map(OngoingWorkout::from)
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Starts a rest countdown of `seconds`, replacing any running one.
    pub fn start_rest(&self, seconds: u32) -> Result<(), SessionError> {
        self.with_active(|_| Ok(()))?;
        self.timers.rest().start(seconds);
        Ok(())
    }

    pub fn stop_rest(&self) {
        self.timers.rest().stop();
    }

    /// Leaves the workout view, cancelling both timers.
    pub fn leave(&self) {
        self.view.fetch_add(1, Ordering::SeqCst);
        self.timers.rest().stop();
        self.timers.duration().clear();
        self.snapshot.send_replace(None);
    }

    fn view(&self) -> u64 {
        self.view.load(Ordering::SeqCst)
    }

    /// Fails if the view was left since `view` was taken.
    fn still_shown(&self, view: u64) -> Result<(), SessionError> {
        if self.view() == view {
            Ok(())
        } else {
            debug!("discarded gateway response after leaving the workout view");
            Err(SessionError::NoActiveSession)
        }
    }

    fn with_active<T>(
        &self,
        f: impl FnOnce(&WorkoutSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        match &*self.snapshot.borrow() {
            Some(session) if session.is_active() => f(session),
            Some(_) => Err(SessionError::SessionClosed),
            None => Err(SessionError::NoActiveSession),
        }
    }

    /// Shows `session` in place of the current one.
    fn show(&self, session: WorkoutSession) -> WorkoutSession {
        self.timers.rest().stop();
        if session.is_active() {
            self.timers.duration().start(session.started_at);
        } else {
            self.timers.duration().clear();
        }
        self.replace(session)
    }

    fn replace(&self, session: WorkoutSession) -> WorkoutSession {
        debug!(
            "reconciled workout {} ({} sets)",
            *session.id,
            session.set_count()
        );
        self.snapshot.send_replace(Some(session.clone()));
        session
    }

    fn emit(&self, signal: Signal) {
        notification::emit(self.notifier.as_ref(), signal);
    }
}

impl<S: WorkoutService> SessionStore<S> {
    pub async fn create(&self, seed: WorkoutSeed) -> Result<WorkoutSession, SessionError> {
        if self.user.id.is_nil() {
            return Err(ValidationError::Missing("user".to_string()).into());
        }
        let view = self.view();
        let _transaction = self.transaction.lock().await;
        let session = self
            .service
            .create_workout(self.user.id, self.clock.now(), seed)
            .await?;
        self.still_shown(view)?;
        info!("started workout {}", *session.id);
        Ok(self.show(session))
    }

    pub async fn load(&self, id: WorkoutID) -> Result<WorkoutSession, SessionError> {
        let view = self.view();
        let _transaction = self.transaction.lock().await;
        let session = self.service.get_workout(id).await?;
        self.still_shown(view)?;
        info!("loaded workout {}", *session.id);
        Ok(self.show(session))
    }

    /// Fetches the shown workout again without touching the timers.
    pub async fn refresh(&self) -> Result<WorkoutSession, SessionError> {
        let view = self.view();
        let _transaction = self.transaction.lock().await;
        let id = self
            .snapshot
            .borrow()
            .as_ref()
            .map(|session| session.id)
            .ok_or(SessionError::NoActiveSession)?;
        let session = self.service.get_workout(id).await?;
        self.still_shown(view)?;
        Ok(self.replace(session))
    }

    pub async fn add_exercise_entry(
        &self,
        exercise_id: ExerciseID,
        phase: Phase,
    ) -> Result<WorkoutSession, SessionError> {
        let view = self.view();
        let _transaction = self.transaction.lock().await;
        let (workout_id, order) = self.with_active(|s| Ok((s.id, s.next_order(phase))))?;
        let session = self
            .service
            .add_exercise_entry(
                workout_id,
                NewExerciseEntry {
                    exercise_id,
                    order,
                    phase,
                },
            )
            .await?;
        self.still_shown(view)?;
        Ok(self.replace(session))
    }

    /// Appends a set to an entry. Reps and weight are copied from `seed` if given.
    pub async fn add_set(
        &self,
        entry_id: ExerciseEntryID,
        seed: Option<SetID>,
    ) -> Result<WorkoutSession, SessionError> {
        self.append_set(entry_id, |_| seed).await
    }

    /// Appends a set to an entry with the reps and weight of its last set.
    pub async fn repeat_last_set(
        &self,
        entry_id: ExerciseEntryID,
    ) -> Result<WorkoutSession, SessionError> {
        self.append_set(entry_id, |entry| entry.last_set().map(|set| set.id)).await
    }

    async fn append_set(
        &self,
        entry_id: ExerciseEntryID,
        seed: impl FnOnce(&ExerciseEntry) -> Option<SetID>,
    ) -> Result<WorkoutSession, SessionError> {
        let view = self.view();
        let _transaction = self.transaction.lock().await;
        let set = self.with_active(|s| {
            let entry = s.entry(entry_id).ok_or(SessionError::NotFound)?;
            let seed = match seed(entry) {
                Some(id) => Some(s.set(id).ok_or(SessionError::NotFound)?),
                None => None,
            };
            Ok(NewSet::new(entry.next_set_number(), seed))
        })?;
        let session = self.service.add_set(entry_id, set).await?;
        self.still_shown(view)?;
        self.emit(Signal::SetAdded);
        Ok(self.replace(session))
    }

    pub async fn update_set(
        &self,
        set_id: SetID,
        changes: SetChanges,
    ) -> Result<WorkoutSession, SessionError> {
        let view = self.view();
        let _transaction = self.transaction.lock().await;
        let current = self.with_active(|s| {
            s.set(set_id).ok_or(SessionError::NotFound)?;
            Ok(changes.is_empty().then(|| s.clone()))
        })?;
        if let Some(session) = current {
            return Ok(session);
        }
        let session = self.service.modify_set(set_id, changes).await?;
        self.still_shown(view)?;
        Ok(self.replace(session))
    }

    pub async fn delete_set(&self, set_id: SetID) -> Result<WorkoutSession, SessionError> {
        let view = self.view();
        let _transaction = self.transaction.lock().await;
        self.with_active(|s| s.set(set_id).map(|_| ()).ok_or(SessionError::NotFound))?;
        let session = self.service.delete_set(set_id).await?;
        self.still_shown(view)?;
        self.emit(Signal::SetDeleted);
        Ok(self.replace(session))
    }

    /// Flips the completion of a set. Completing a set starts the configured rest.
    pub async fn toggle_set_completion(
        &self,
        set_id: SetID,
    ) -> Result<WorkoutSession, SessionError> {
        let view = self.view();
        let _transaction = self.transaction.lock().await;
        let completed = self.with_active(|s| {
            s.set(set_id)
                .map(|set| !set.is_completed)
                .ok_or(SessionError::NotFound)
        })?;
        let session = self
            .service
            .modify_set(set_id, SetChanges::default().completed(completed))
            .await?;
        self.still_shown(view)?;
        let session = self.replace(session);
        if completed {
            self.timers.rest().start(self.settings.rest_seconds);
        }
        Ok(session)
    }

    /// Completes the workout with the given duration and leaves the workout view.
    pub async fn finish(&self, duration_seconds: u32) -> Result<WorkoutSession, SessionError> {
        let view = self.view();
        let _transaction = self.transaction.lock().await;
        let id = self.with_active(|s| Ok(s.id))?;
        let session = self
            .service
            .finish_workout(id, self.clock.now(), duration_seconds)
            .await?;
        self.still_shown(view)?;
        self.timers.cancel_all();
        info!("finished workout {} after {duration_seconds} s", *session.id);
        self.emit(Signal::WorkoutFinished);
        let session = self.replace(session);
        if let Some(navigator) = &self.navigator {
            navigator.leave_session_view();
        }
        Ok(session)
    }

    /// Completes the workout with the elapsed time of the duration timer.
    pub async fn finish_now(&self) -> Result<WorkoutSession, SessionError> {
        let duration_seconds = self.timers.duration().elapsed_seconds();
        self.finish(duration_seconds).await
    }
}
