use std::collections::VecDeque;

use log::{debug, error};

use crate::{
    OngoingWorkout, OngoingWorkoutRepository, OngoingWorkoutService, Settings, SettingsRepository,
    SettingsService, log as app_log,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R: app_log::Repository> app_log::Service for Service<R> {
    fn get_log_entries(&self) -> Result<VecDeque<app_log::Entry>, app_log::Error> {
        self.repository.read_entries()
    }

    fn add_log_entry(&self, entry: app_log::Entry) -> Result<(), app_log::Error> {
        self.repository.write_entry(entry)
    }
}

impl<R: SettingsRepository> SettingsService for Service<R> {
    async fn get_settings(&self) -> Result<Settings, String> {
        let result = self.repository.read_settings().await;
        if let Err(ref err) = result {
            debug!("failed to read settings, using defaults: {err}");
        }
        result
    }

    async fn set_settings(&self, settings: Settings) -> Result<(), String> {
        let result = self.repository.write_settings(settings).await;
        if let Err(ref err) = result {
            error!("failed to write settings: {err}");
        }
        result
    }
}

impl<R: OngoingWorkoutRepository> OngoingWorkoutService for Service<R> {
    async fn get_ongoing_workout(&self) -> Result<Option<OngoingWorkout>, String> {
        self.repository.read_ongoing_workout().await
    }

    async fn set_ongoing_workout(
        &self,
        ongoing_workout: Option<OngoingWorkout>,
    ) -> Result<(), String> {
        let result = self.repository.write_ongoing_workout(ongoing_workout).await;
        if let Err(ref err) = result {
            error!("failed to write ongoing workout: {err}");
        }
        result
    }
}
