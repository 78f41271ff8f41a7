use std::sync::{Mutex, PoisonError};

use log::debug;

/// Fire-and-forget events for sound, vibration or system notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Signal {
    RestStarted,
    RestCompleted,
    SetAdded,
    SetDeleted,
    WorkoutFinished,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct NotifyError(pub String);

pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, signal: Signal) -> Result<(), NotifyError>;
}

pub struct Silent;

impl Notifier for Silent {
    fn notify(&self, _: Signal) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Keeps every signal, for clients that poll instead of reacting immediately.
#[derive(Default)]
pub struct SignalRecorder {
    signals: Mutex<Vec<Signal>>,
}

impl SignalRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Signal> {
        std::mem::take(&mut *self.signals.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for SignalRecorder {
    fn notify(&self, signal: Signal) -> Result<(), NotifyError> {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signal);
        Ok(())
    }
}

/// Leaves the workout view once the workout is finished.
pub trait Navigator {
    fn leave_session_view(&self);
}

pub(crate) fn emit(notifier: &dyn Notifier, signal: Signal) {
    if let Err(err) = notifier.notify(signal) {
        debug!("failed to emit {signal} signal: {err}");
    }
}
