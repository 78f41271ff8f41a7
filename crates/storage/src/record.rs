//! Records as exchanged with the remote service.

use chrono::{DateTime, Utc};
use ironlog_domain as domain;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub exercise_id: Uuid,
    /// Records written before phases existed carry no phase.
    #[serde(default)]
    pub phase: Option<String>,
    pub order: u32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutSet {
    pub id: Uuid,
    pub set_number: u32,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub rpe: Option<f32>,
    #[serde(default)]
    pub is_warmup: bool,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    #[error("invalid phase: {0}")]
    Phase(String),
    #[error(transparent)]
    Name(#[from] domain::NameError),
    #[error(transparent)]
    Reps(#[from] domain::RepsError),
    #[error(transparent)]
    Weight(#[from] domain::WeightError),
    #[error(transparent)]
    RPE(#[from] domain::RPEError),
}

impl From<&domain::WorkoutSession> for Workout {
    fn from(value: &domain::WorkoutSession) -> Self {
        Self {
            id: *value.id,
            user_id: *value.user_id,
            name: value.name.as_ref().map(ToString::to_string),
            notes: value.notes.clone(),
            started_at: value.started_at,
            completed_at: value.completed_at,
            duration_seconds: value.duration_seconds,
            exercises: value.entries.iter().map(WorkoutExercise::from).collect(),
        }
    }
}

impl TryFrom<Workout> for domain::WorkoutSession {
    type Error = RecordError;

    fn try_from(value: Workout) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            user_id: value.user_id.into(),
            name: value
                .name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .map(domain::Name::new)
                .transpose()?,
            notes: value.notes,
            started_at: value.started_at,
            completed_at: value.completed_at,
            duration_seconds: value.duration_seconds,
            entries: value
                .exercises
                .into_iter()
                .map(domain::ExerciseEntry::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl From<&domain::ExerciseEntry> for WorkoutExercise {
    fn from(value: &domain::ExerciseEntry) -> Self {
        Self {
            id: *value.id,
            exercise_id: *value.exercise_id,
            phase: Some(value.phase.to_string()),
            order: value.order,
            notes: value.notes.clone(),
            sets: value.sets.iter().map(WorkoutSet::from).collect(),
        }
    }
}

impl TryFrom<WorkoutExercise> for domain::ExerciseEntry {
    type Error = RecordError;

    fn try_from(value: WorkoutExercise) -> Result<Self, Self::Error> {
        let phase = value
            .phase
            .as_deref()
            .map(|phase| {
                phase
                    .parse::<domain::Phase>()
                    .map_err(|_| RecordError::Phase(phase.to_string()))
            })
            .transpose()?;
        Ok(Self {
            id: value.id.into(),
            exercise_id: value.exercise_id.into(),
            phase: domain::Phase::classify(phase),
            order: value.order,
            notes: value.notes,
            sets: value
                .sets
                .into_iter()
                .map(domain::SetEntry::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl From<&domain::SetEntry> for WorkoutSet {
    fn from(value: &domain::SetEntry) -> Self {
        Self {
            id: *value.id,
            set_number: value.set_number,
            reps: value.reps.map(u32::from),
            weight: value.weight.map(f32::from),
            rpe: value.rpe.map(f32::from),
            is_warmup: value.is_warmup,
            is_completed: value.is_completed,
        }
    }
}

impl TryFrom<WorkoutSet> for domain::SetEntry {
    type Error = RecordError;

    fn try_from(value: WorkoutSet) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            set_number: value.set_number,
            reps: value.reps.map(domain::Reps::new).transpose()?,
            weight: value.weight.map(domain::Weight::new).transpose()?,
            rpe: value.rpe.map(domain::RPE::new).transpose()?,
            is_warmup: value.is_warmup,
            is_completed: value.is_completed,
        })
    }
}

impl From<&domain::Exercise> for Exercise {
    fn from(value: &domain::Exercise) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            category: value.category.clone(),
            muscle_groups: value.muscle_groups.clone(),
        }
    }
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = RecordError;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            category: value.category,
            muscle_groups: value.muscle_groups,
        })
    }
}
