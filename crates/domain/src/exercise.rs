use derive_more::Deref;
use uuid::Uuid;

use crate::{Name, ReadError};

/// Read-only access to the exercise catalog.
#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;

    async fn get_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError> {
        self.get_exercises()
            .await?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or(ReadError::NotFound)
    }

    async fn search_exercises(&self, query: &str) -> Result<Vec<Exercise>, ReadError> {
        let exercises = self.get_exercises().await?;
        Ok(filter_exercises(&exercises, query)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub category: String,
    pub muscle_groups: Vec<String>,
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Exercises whose name or category contains the query, ignoring case.
#[must_use]
pub fn filter_exercises<'a>(exercises: &'a [Exercise], query: &str) -> Vec<&'a Exercise> {
    let query = query.trim().to_lowercase();
    exercises
        .iter()
        .filter(|e| {
            e.name.as_ref().to_lowercase().contains(&query)
                || e.category.to_lowercase().contains(&query)
        })
        .collect()
}
