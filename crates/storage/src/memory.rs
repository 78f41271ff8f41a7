//! In-process stand-in for the remote service.
//!
//! Holds the authoritative workout records and answers every mutation with the complete
//! workout. Clones share the same records, so one clone can be handed to a `Service` while
//! another is used to inspect or disturb the remote.

use std::{cell::RefCell, rc::Rc, time::Duration};

use anyhow::Context;
use chrono::{DateTime, Utc};
use ironlog_domain as domain;
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{self, RecordError};

#[derive(Clone, Default)]
pub struct InMemory {
    remote: Rc<RefCell<Remote>>,
}

#[derive(Default)]
struct Remote {
    records: Records,
    disconnected: bool,
    latency: Option<Duration>,
}

#[derive(Serialize, Deserialize, Default)]
struct Records {
    #[serde(default)]
    workouts: Vec<record::Workout>,
    #[serde(default)]
    exercises: Vec<record::Exercise>,
}

impl InMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_exercises(self, exercises: &[domain::Exercise]) -> Self {
        self.remote.borrow_mut().records.exercises =
            exercises.iter().map(record::Exercise::from).collect();
        self
    }

    #[must_use]
    pub fn with_workouts(self, workouts: &[domain::WorkoutSession]) -> Self {
        self.remote.borrow_mut().records.workouts =
            workouts.iter().map(record::Workout::from).collect();
        self
    }

    /// Delays every request, as a round trip over the network would.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.remote.borrow_mut().latency = Some(latency);
        self
    }

    /// While disconnected, every request fails with `StorageError::NoConnection`.
    pub fn set_connected(&self, connected: bool) {
        self.remote.borrow_mut().disconnected = !connected;
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let records: Records =
            serde_json::from_str(json).context("failed to parse remote records")?;
        Ok(Self {
            remote: Rc::new(RefCell::new(Remote {
                records,
                ..Remote::default()
            })),
        })
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(&self.remote.borrow().records)
            .context("failed to serialize remote records")
    }

    async fn request(&self) -> Result<(), domain::StorageError> {
        let latency = self.remote.borrow().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.remote.borrow().disconnected {
            debug!("remote unreachable");
            return Err(domain::StorageError::NoConnection);
        }
        Ok(())
    }

    fn workout(&self, id: Uuid) -> Result<domain::WorkoutSession, domain::ReadError> {
        self.remote
            .borrow()
            .records
            .workouts
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or(domain::ReadError::NotFound)
            .and_then(|w| to_domain(w).map_err(domain::ReadError::Other))
    }

    /// Applies `mutate` to the open workout selected by `select` and returns its id.
    fn mutate_open<E: From<ClosedOr>>(
        &self,
        select: impl Fn(&record::Workout) -> bool,
        mutate: impl FnOnce(&mut record::Workout) -> Result<(), ClosedOr>,
    ) -> Result<Uuid, E> {
        let mut remote = self.remote.borrow_mut();
        let workout = remote
            .records
            .workouts
            .iter_mut()
            .find(|w| select(w))
            .ok_or(ClosedOr::NotFound)?;
        if workout.completed_at.is_some() {
            return Err(ClosedOr::Closed.into());
        }
        mutate(workout)?;
        Ok(workout.id)
    }
}

fn to_domain(
    workout: record::Workout,
) -> Result<domain::WorkoutSession, Box<dyn std::error::Error>> {
    domain::WorkoutSession::try_from(workout).map_err(|err: RecordError| err.into())
}

fn has_entry(workout: &record::Workout, entry_id: Uuid) -> bool {
    workout.exercises.iter().any(|e| e.id == entry_id)
}

fn has_set(workout: &record::Workout, set_id: Uuid) -> bool {
    workout
        .exercises
        .iter()
        .any(|e| e.sets.iter().any(|s| s.id == set_id))
}

fn find_set(workout: &mut record::Workout, set_id: Uuid) -> Option<&mut record::WorkoutSet> {
    workout
        .exercises
        .iter_mut()
        .flat_map(|e| e.sets.iter_mut())
        .find(|s| s.id == set_id)
}

fn new_set(set: &domain::NewSet) -> record::WorkoutSet {
    record::WorkoutSet {
        id: Uuid::new_v4(),
        set_number: set.set_number,
        reps: set.reps.map(u32::from),
        weight: set.weight.map(f32::from),
        rpe: None,
        is_warmup: set.is_warmup,
        is_completed: set.is_completed,
    }
}

enum ClosedOr {
    NotFound,
    Closed,
}

impl From<ClosedOr> for domain::CreateError {
    fn from(value: ClosedOr) -> Self {
        match value {
            ClosedOr::NotFound => domain::CreateError::NotFound,
            ClosedOr::Closed => domain::CreateError::Closed,
        }
    }
}

impl From<ClosedOr> for domain::UpdateError {
    fn from(value: ClosedOr) -> Self {
        match value {
            ClosedOr::NotFound => domain::UpdateError::NotFound,
            ClosedOr::Closed => domain::UpdateError::Closed,
        }
    }
}

impl From<ClosedOr> for domain::DeleteError {
    fn from(value: ClosedOr) -> Self {
        match value {
            ClosedOr::NotFound => domain::DeleteError::NotFound,
            ClosedOr::Closed => domain::DeleteError::Closed,
        }
    }
}

impl domain::ExerciseRepository for InMemory {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        self.request().await?;
        self.remote
            .borrow()
            .records
            .exercises
            .iter()
            .cloned()
            .map(|e| {
                domain::Exercise::try_from(e).map_err(|err| domain::ReadError::Other(err.into()))
            })
            .collect()
    }
}

impl domain::WorkoutRepository for InMemory {
    async fn create_workout(
        &self,
        user_id: domain::UserID,
        started_at: DateTime<Utc>,
        seed: domain::WorkoutSeed,
    ) -> Result<domain::WorkoutSession, domain::CreateError> {
        self.request().await?;
        if user_id.is_nil() {
            return Err(domain::ValidationError::Missing("user".to_string()).into());
        }

        let mut workout = record::Workout {
            id: Uuid::new_v4(),
            user_id: *user_id,
            name: seed.name.map(|name| name.to_string()),
            notes: seed.notes,
            started_at,
            completed_at: None,
            duration_seconds: None,
            exercises: vec![],
        };
        for entry in seed.entries {
            let phase = entry.phase.to_string();
            let order = workout
                .exercises
                .iter()
                .filter(|e| e.phase.as_deref() == Some(phase.as_str()))
                .count();
            workout.exercises.push(record::WorkoutExercise {
                id: Uuid::new_v4(),
                exercise_id: *entry.exercise_id,
                phase: Some(phase),
                order: u32::try_from(order).unwrap_or(u32::MAX).saturating_add(1),
                notes: None,
                sets: entry.sets.iter().map(new_set).collect(),
            });
        }

        let id = workout.id;
        self.remote.borrow_mut().records.workouts.push(workout);
        Ok(self.workout(id)?)
    }

    async fn read_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::WorkoutSession, domain::ReadError> {
        self.request().await?;
        self.workout(*id)
    }

    async fn add_exercise_entry(
        &self,
        workout_id: domain::WorkoutID,
        entry: domain::NewExerciseEntry,
    ) -> Result<domain::WorkoutSession, domain::CreateError> {
        self.request().await?;
        let id = self.mutate_open::<domain::CreateError>(
            |w| w.id == *workout_id,
            |w| {
                w.exercises.push(record::WorkoutExercise {
                    id: Uuid::new_v4(),
                    exercise_id: *entry.exercise_id,
                    phase: Some(entry.phase.to_string()),
                    order: entry.order,
                    notes: None,
                    sets: vec![],
                });
                Ok(())
            },
        )?;
        Ok(self.workout(id)?)
    }

    async fn add_set(
        &self,
        entry_id: domain::ExerciseEntryID,
        set: domain::NewSet,
    ) -> Result<domain::WorkoutSession, domain::CreateError> {
        self.request().await?;
        let id = self.mutate_open::<domain::CreateError>(
            |w| has_entry(w, *entry_id),
            |w| {
                let entry = w
                    .exercises
                    .iter_mut()
                    .find(|e| e.id == *entry_id)
                    .ok_or(ClosedOr::NotFound)?;
                entry.sets.push(new_set(&set));
                Ok(())
            },
        )?;
        Ok(self.workout(id)?)
    }

    async fn modify_set(
        &self,
        set_id: domain::SetID,
        changes: domain::SetChanges,
    ) -> Result<domain::WorkoutSession, domain::UpdateError> {
        self.request().await?;
        let id = self.mutate_open::<domain::UpdateError>(
            |w| has_set(w, *set_id),
            |w| {
                let set = find_set(w, *set_id).ok_or(ClosedOr::NotFound)?;
                if let Some(reps) = changes.reps {
                    set.reps = reps.map(u32::from);
                }
                if let Some(weight) = changes.weight {
                    set.weight = weight.map(f32::from);
                }
                if let Some(rpe) = changes.rpe {
                    set.rpe = rpe.map(f32::from);
                }
                if let Some(is_warmup) = changes.is_warmup {
                    set.is_warmup = is_warmup;
                }
                if let Some(is_completed) = changes.is_completed {
                    set.is_completed = is_completed;
                }
                Ok(())
            },
        )?;
        Ok(self.workout(id)?)
    }

    async fn delete_set(
        &self,
        set_id: domain::SetID,
    ) -> Result<domain::WorkoutSession, domain::DeleteError> {
        self.request().await?;
        let id = self.mutate_open::<domain::DeleteError>(
            |w| has_set(w, *set_id),
            |w| {
                for entry in &mut w.exercises {
                    entry.sets.retain(|s| s.id != *set_id);
                }
                Ok(())
            },
        )?;
        Ok(self.workout(id)?)
    }

    async fn finish_workout(
        &self,
        id: domain::WorkoutID,
        completed_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> Result<domain::WorkoutSession, domain::UpdateError> {
        self.request().await?;
        let id = self.mutate_open::<domain::UpdateError>(
            |w| w.id == *id,
            |w| {
                w.completed_at = Some(completed_at);
                w.duration_seconds = Some(duration_seconds);
                Ok(())
            },
        )?;
        Ok(self.workout(id)?)
    }
}

#[cfg(test)]
mod tests {
    use ironlog_domain::{ExerciseRepository, WorkoutRepository};
    use pretty_assertions::assert_eq;

    use crate::tests::data::{EXERCISES, SET, STARTED_AT, USER, WORKOUT};

    use super::*;

    #[tokio::test]
    async fn test_read_workout() {
        let remote = InMemory::new().with_workouts(&[WORKOUT.clone()]);
        assert_eq!(remote.read_workout(WORKOUT.id).await.unwrap(), *WORKOUT);
        assert!(matches!(
            remote.read_workout(domain::WorkoutID::from(999)).await,
            Err(domain::ReadError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_read_exercises() {
        let remote = InMemory::new().with_exercises(&EXERCISES);
        assert_eq!(remote.read_exercises().await.unwrap(), *EXERCISES);
    }

    #[tokio::test]
    async fn test_create_seeded_workout() {
        let remote = InMemory::new();
        let seed = domain::WorkoutSeed {
            name: Some(domain::Name::new("Push day").unwrap()),
            notes: String::new(),
            entries: vec![
                domain::SeedEntry {
                    exercise_id: 1.into(),
                    phase: domain::Phase::Warmup,
                    sets: vec![domain::NewSet::new(1, None)],
                },
                domain::SeedEntry {
                    exercise_id: 2.into(),
                    phase: domain::Phase::Main,
                    sets: vec![],
                },
                domain::SeedEntry {
                    exercise_id: 3.into(),
                    phase: domain::Phase::Main,
                    sets: vec![],
                },
            ],
        };

        let workout = remote
            .create_workout(USER.id, *STARTED_AT, seed)
            .await
            .unwrap();

        assert_eq!(workout.user_id, USER.id);
        assert_eq!(workout.started_at, *STARTED_AT);
        assert!(workout.is_active());
        assert_eq!(
            workout
                .entries
                .iter()
                .map(|e| (e.phase, e.order, e.sets.len()))
                .collect::<Vec<_>>(),
            vec![
                (domain::Phase::Warmup, 1, 1),
                (domain::Phase::Main, 1, 0),
                (domain::Phase::Main, 2, 0)
            ]
        );
        assert_eq!(remote.read_workout(workout.id).await.unwrap(), workout);
    }

    #[tokio::test]
    async fn test_create_workout_without_user() {
        assert!(matches!(
            InMemory::new()
                .create_workout(
                    domain::UserID::nil(),
                    *STARTED_AT,
                    domain::WorkoutSeed::default()
                )
                .await,
            Err(domain::CreateError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_modify_and_delete_set() {
        let remote = InMemory::new().with_workouts(&[WORKOUT.clone()]);

        let workout = remote
            .modify_set(
                SET.id,
                domain::SetChanges::default()
                    .reps(None)
                    .rpe(Some(domain::RPE::EIGHT)),
            )
            .await
            .unwrap();
        let set = workout.set(SET.id).unwrap();
        assert_eq!(set.reps, None);
        assert_eq!(set.weight, SET.weight);
        assert_eq!(set.rpe, Some(domain::RPE::EIGHT));

        let workout = remote.delete_set(SET.id).await.unwrap();
        assert_eq!(workout.set(SET.id), None);
        assert!(matches!(
            remote.delete_set(SET.id).await,
            Err(domain::DeleteError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_finished_workout_is_closed() {
        let remote = InMemory::new().with_workouts(&[WORKOUT.clone()]);
        let workout = remote
            .finish_workout(WORKOUT.id, *STARTED_AT, 600)
            .await
            .unwrap();
        assert_eq!(workout.completed_at, Some(*STARTED_AT));
        assert_eq!(workout.duration_seconds, Some(600));

        assert!(matches!(
            remote
                .modify_set(SET.id, domain::SetChanges::default().completed(true))
                .await,
            Err(domain::UpdateError::Closed)
        ));
        assert!(matches!(
            remote.delete_set(SET.id).await,
            Err(domain::DeleteError::Closed)
        ));
        assert!(matches!(
            remote.finish_workout(WORKOUT.id, *STARTED_AT, 700).await,
            Err(domain::UpdateError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_disconnected() {
        let remote = InMemory::new().with_workouts(&[WORKOUT.clone()]);
        remote.set_connected(false);
        assert!(matches!(
            remote.read_workout(WORKOUT.id).await,
            Err(domain::ReadError::Storage(domain::StorageError::NoConnection))
        ));
        assert!(matches!(
            remote.delete_set(SET.id).await,
            Err(domain::DeleteError::Storage(domain::StorageError::NoConnection))
        ));

        remote.set_connected(true);
        assert!(remote.read_workout(WORKOUT.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_json_export_and_import() {
        let remote = InMemory::new()
            .with_workouts(&[WORKOUT.clone()])
            .with_exercises(&EXERCISES);
        let imported = InMemory::from_json(&remote.to_json().unwrap()).unwrap();
        assert_eq!(imported.read_workout(WORKOUT.id).await.unwrap(), *WORKOUT);
        assert_eq!(imported.read_exercises().await.unwrap(), *EXERCISES);
    }

    #[tokio::test]
    async fn test_json_import_legacy_workout() {
        let remote = InMemory::from_json(
            r#"{
                "workouts": [{
                    "id": "00000000-0000-0000-0000-000000000001",
                    "user_id": "00000000-0000-0000-0000-000000000001",
                    "started_at": "2024-03-01T18:00:00Z",
                    "exercises": [{
                        "id": "00000000-0000-0000-0000-000000000002",
                        "exercise_id": "00000000-0000-0000-0000-000000000065",
                        "order": 1
                    }]
                }]
            }"#,
        )
        .unwrap();
        let workout = remote.read_workout(1.into()).await.unwrap();
        assert_eq!(workout.entries[0].phase, domain::Phase::Main);
        assert_eq!(workout.entries_in(domain::Phase::Main).len(), 1);
    }

    #[test]
    fn test_json_import_invalid() {
        assert!(InMemory::from_json("{\"workouts\": 1}").is_err());
    }
}
