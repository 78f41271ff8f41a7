use chrono::{DateTime, Utc};
use ironlog_domain::{WorkoutID, WorkoutSession};

#[allow(async_fn_in_trait)]
pub trait OngoingWorkoutService {
    async fn get_ongoing_workout(&self) -> Result<Option<OngoingWorkout>, String>;
    async fn set_ongoing_workout(
        &self,
        ongoing_workout: Option<OngoingWorkout>,
    ) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait OngoingWorkoutRepository {
    async fn read_ongoing_workout(&self) -> Result<Option<OngoingWorkout>, String>;
    async fn write_ongoing_workout(
        &self,
        ongoing_workout: Option<OngoingWorkout>,
    ) -> Result<(), String>;
}

/// Marker of the workout in progress, kept locally to resume it after a restart.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OngoingWorkout {
    pub workout_id: u128,
    pub started_at: DateTime<Utc>,
}

impl OngoingWorkout {
    #[must_use]
    pub fn workout_id(&self) -> WorkoutID {
        WorkoutID::from(self.workout_id)
    }
}

impl From<&WorkoutSession> for OngoingWorkout {
    fn from(session: &WorkoutSession) -> Self {
        Self {
            workout_id: session.id.as_u128(),
            started_at: session.started_at,
        }
    }
}
