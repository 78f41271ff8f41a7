use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use derive_more::Deref;
use uuid::Uuid;

use crate::{
    CreateError, DeleteError, ExerciseID, Name, Phase, RPE, ReadError, Reps, RepsError,
    UpdateError, UserID, ValidationError, Weight, WeightError,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    async fn create_workout(
        &self,
        user_id: UserID,
        started_at: DateTime<Utc>,
        seed: WorkoutSeed,
    ) -> Result<WorkoutSession, CreateError>;
    async fn get_workout(&self, id: WorkoutID) -> Result<WorkoutSession, ReadError>;
    async fn add_exercise_entry(
        &self,
        workout_id: WorkoutID,
        entry: NewExerciseEntry,
    ) -> Result<WorkoutSession, CreateError>;
    async fn add_set(
        &self,
        entry_id: ExerciseEntryID,
        set: NewSet,
    ) -> Result<WorkoutSession, CreateError>;
    async fn modify_set(
        &self,
        set_id: SetID,
        changes: SetChanges,
    ) -> Result<WorkoutSession, UpdateError>;
    async fn delete_set(&self, set_id: SetID) -> Result<WorkoutSession, DeleteError>;
    async fn finish_workout(
        &self,
        id: WorkoutID,
        completed_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> Result<WorkoutSession, UpdateError>;
}

/// Gateway to the remote service holding the authoritative workout records.
///
/// Every mutation answers with the complete workout as stored after the mutation. Callers
/// replace their local copy with that answer instead of patching it.
#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn create_workout(
        &self,
        user_id: UserID,
        started_at: DateTime<Utc>,
        seed: WorkoutSeed,
    ) -> Result<WorkoutSession, CreateError>;
    async fn read_workout(&self, id: WorkoutID) -> Result<WorkoutSession, ReadError>;
    async fn add_exercise_entry(
        &self,
        workout_id: WorkoutID,
        entry: NewExerciseEntry,
    ) -> Result<WorkoutSession, CreateError>;
    async fn add_set(
        &self,
        entry_id: ExerciseEntryID,
        set: NewSet,
    ) -> Result<WorkoutSession, CreateError>;
    async fn modify_set(
        &self,
        set_id: SetID,
        changes: SetChanges,
    ) -> Result<WorkoutSession, UpdateError>;
    async fn delete_set(&self, set_id: SetID) -> Result<WorkoutSession, DeleteError>;
    async fn finish_workout(
        &self,
        id: WorkoutID,
        completed_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> Result<WorkoutSession, UpdateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub id: WorkoutID,
    pub user_id: UserID,
    pub name: Option<Name>,
    pub notes: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<u32>,
    pub entries: Vec<ExerciseEntry>,
}

impl WorkoutSession {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.completed_at.is_none()
    }

    #[must_use]
    pub fn entry(&self, id: ExerciseEntryID) -> Option<&ExerciseEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn set(&self, id: SetID) -> Option<&SetEntry> {
        self.entries
            .iter()
            .flat_map(|e| e.sets.iter())
            .find(|s| s.id == id)
    }

    #[must_use]
    pub fn sets(&self) -> impl Iterator<Item = &SetEntry> {
        self.entries.iter().flat_map(|e| e.sets.iter())
    }

    #[must_use]
    pub fn exercises(&self) -> BTreeSet<ExerciseID> {
        self.entries
            .iter()
            .map(|e| e.exercise_id)
            .collect::<BTreeSet<_>>()
    }

    #[must_use]
    pub fn next_order(&self, phase: Phase) -> u32 {
        let count = self.entries.iter().filter(|e| e.phase == phase).count();
        u32::try_from(count).unwrap_or(u32::MAX).saturating_add(1)
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutID(Uuid);

impl WorkoutID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for WorkoutID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseEntry {
    pub id: ExerciseEntryID,
    pub exercise_id: ExerciseID,
    pub phase: Phase,
    pub order: u32,
    pub notes: Option<String>,
    pub sets: Vec<SetEntry>,
}

impl ExerciseEntry {
    /// Set numbers are never reused while a set still carries them, so a gap left by a
    /// deleted set in the middle does not lead to a duplicate.
    #[must_use]
    pub fn next_set_number(&self) -> u32 {
        let count = u32::try_from(self.sets.len()).unwrap_or(u32::MAX);
        let highest = self.sets.iter().map(|s| s.set_number).max().unwrap_or(0);
        count.max(highest).saturating_add(1)
    }

    /// The set with the highest number.
    #[must_use]
    pub fn last_set(&self) -> Option<&SetEntry> {
        self.sets.iter().max_by_key(|s| s.set_number)
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseEntryID(Uuid);

impl From<Uuid> for ExerciseEntryID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseEntryID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetEntry {
    pub id: SetID,
    pub set_number: u32,
    pub reps: Option<Reps>,
    pub weight: Option<Weight>,
    pub rpe: Option<RPE>,
    pub is_warmup: bool,
    pub is_completed: bool,
}

impl SetEntry {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn volume(&self) -> Option<f32> {
        match (self.reps, self.weight) {
            (Some(reps), Some(weight)) => Some(u32::from(reps) as f32 * f32::from(weight)),
            _ => None,
        }
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SetID(Uuid);

impl From<Uuid> for SetID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SetID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Initial content of a new workout, typically the expansion of a template.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorkoutSeed {
    pub name: Option<Name>,
    pub notes: String,
    pub entries: Vec<SeedEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedEntry {
    pub exercise_id: ExerciseID,
    pub phase: Phase,
    pub sets: Vec<NewSet>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExerciseEntry {
    pub exercise_id: ExerciseID,
    pub order: u32,
    pub phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewSet {
    pub set_number: u32,
    pub reps: Option<Reps>,
    pub weight: Option<Weight>,
    pub is_warmup: bool,
    pub is_completed: bool,
}

impl NewSet {
    /// Takes reps and weight over from `seed`, usually the previous set of the same entry.
    #[must_use]
    pub fn new(set_number: u32, seed: Option<&SetEntry>) -> Self {
        Self {
            set_number,
            reps: seed.and_then(|s| s.reps),
            weight: seed.and_then(|s| s.weight),
            is_warmup: false,
            is_completed: false,
        }
    }
}

/// Partial update of a set. `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SetChanges {
    pub reps: Option<Option<Reps>>,
    pub weight: Option<Option<Weight>>,
    pub rpe: Option<Option<RPE>>,
    pub is_warmup: Option<bool>,
    pub is_completed: Option<bool>,
}

impl SetChanges {
    #[must_use]
    pub fn reps(mut self, reps: Option<Reps>) -> Self {
        self.reps = Some(reps);
        self
    }

    #[must_use]
    pub fn weight(mut self, weight: Option<Weight>) -> Self {
        self.weight = Some(weight);
        self
    }

    #[must_use]
    pub fn rpe(mut self, rpe: Option<RPE>) -> Self {
        self.rpe = Some(rpe);
        self
    }

    #[must_use]
    pub fn warmup(mut self, is_warmup: bool) -> Self {
        self.is_warmup = Some(is_warmup);
        self
    }

    #[must_use]
    pub fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = Some(is_completed);
        self
    }

    /// Reps as typed into a form field. An empty field clears the value.
    pub fn reps_from_input(input: &str) -> Result<Self, ValidationError> {
        if input.trim().is_empty() {
            return Ok(Self::default().reps(None));
        }
        Reps::try_from(input)
            .map(|reps| Self::default().reps(Some(reps)))
            .map_err(|err: RepsError| ValidationError::Other(err.into()))
    }

    /// Weight as typed into a form field. An empty field clears the value.
    pub fn weight_from_input(input: &str) -> Result<Self, ValidationError> {
        if input.trim().is_empty() {
            return Ok(Self::default().weight(None));
        }
        Weight::try_from(input)
            .map(|weight| Self::default().weight(Some(weight)))
            .map_err(|err: WeightError| ValidationError::Other(err.into()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, set: &mut SetEntry) {
        if let Some(reps) = self.reps {
            set.reps = reps;
        }
        if let Some(weight) = self.weight {
            set.weight = weight;
        }
        if let Some(rpe) = self.rpe {
            set.rpe = rpe;
        }
        if let Some(is_warmup) = self.is_warmup {
            set.is_warmup = is_warmup;
        }
        if let Some(is_completed) = self.is_completed {
            set.is_completed = is_completed;
        }
    }
}
