use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::{
    CreateError, DeleteError, Exercise, ExerciseEntryID, ExerciseRepository, ExerciseService,
    NewExerciseEntry, NewSet, ReadError, SetChanges, SetID, UpdateError, UserID, WorkoutID,
    WorkoutRepository, WorkoutSeed, WorkoutService, WorkoutSession,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }
}

impl<R: WorkoutRepository> WorkoutService for Service<R> {
    async fn create_workout(
        &self,
        user_id: UserID,
        started_at: DateTime<Utc>,
        seed: WorkoutSeed,
    ) -> Result<WorkoutSession, CreateError> {
        log_on_error!(
            self.repository.create_workout(user_id, started_at, seed),
            CreateError,
            "create",
            "workout"
        )
    }

    async fn get_workout(&self, id: WorkoutID) -> Result<WorkoutSession, ReadError> {
        log_on_error!(
            self.repository.read_workout(id),
            ReadError,
            "get",
            "workout"
        )
    }

    async fn add_exercise_entry(
        &self,
        workout_id: WorkoutID,
        entry: NewExerciseEntry,
    ) -> Result<WorkoutSession, CreateError> {
        log_on_error!(
            self.repository.add_exercise_entry(workout_id, entry),
            CreateError,
            "add",
            "exercise entry"
        )
    }

    async fn add_set(
        &self,
        entry_id: ExerciseEntryID,
        set: NewSet,
    ) -> Result<WorkoutSession, CreateError> {
        log_on_error!(
            self.repository.add_set(entry_id, set),
            CreateError,
            "add",
            "set"
        )
    }

    async fn modify_set(
        &self,
        set_id: SetID,
        changes: SetChanges,
    ) -> Result<WorkoutSession, UpdateError> {
        log_on_error!(
            self.repository.modify_set(set_id, changes),
            UpdateError,
            "modify",
            "set"
        )
    }

    async fn delete_set(&self, set_id: SetID) -> Result<WorkoutSession, DeleteError> {
        log_on_error!(
            self.repository.delete_set(set_id),
            DeleteError,
            "delete",
            "set"
        )
    }

    async fn finish_workout(
        &self,
        id: WorkoutID,
        completed_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> Result<WorkoutSession, UpdateError> {
        log_on_error!(
            self.repository
                .finish_workout(id, completed_at, duration_seconds),
            UpdateError,
            "finish",
            "workout"
        )
    }
}
