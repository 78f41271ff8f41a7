use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use ironlog_domain as domain;

pub static STARTED_AT: LazyLock<DateTime<Utc>> =
    LazyLock::new(|| Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap());

pub static USER: LazyLock<domain::User> = LazyLock::new(|| domain::User {
    id: 1.into(),
    name: domain::Name::new("Alice").unwrap(),
    weight_unit: domain::WeightUnit::Kilogram,
});

pub static EXERCISES: LazyLock<Vec<domain::Exercise>> =
    LazyLock::new(|| vec![EXERCISE.clone(), EXERCISE_2.clone()]);

pub static EXERCISE: LazyLock<domain::Exercise> = LazyLock::new(|| domain::Exercise {
    id: 101.into(),
    name: domain::Name::new("Bench Press").unwrap(),
    category: "Chest".to_string(),
    muscle_groups: vec!["chest".to_string(), "triceps".to_string()],
});

pub static EXERCISE_2: LazyLock<domain::Exercise> = LazyLock::new(|| domain::Exercise {
    id: 102.into(),
    name: domain::Name::new("Squat").unwrap(),
    category: "Legs".to_string(),
    muscle_groups: vec!["quadriceps".to_string()],
});

pub static SET: LazyLock<domain::SetEntry> = LazyLock::new(|| domain::SetEntry {
    id: 11.into(),
    set_number: 1,
    reps: Some(domain::Reps::new(10).unwrap()),
    weight: Some(domain::Weight::new(50.0).unwrap()),
    rpe: None,
    is_warmup: false,
    is_completed: true,
});

pub static SET_2: LazyLock<domain::SetEntry> = LazyLock::new(|| domain::SetEntry {
    id: 12.into(),
    set_number: 2,
    reps: Some(domain::Reps::new(8).unwrap()),
    weight: Some(domain::Weight::new(52.5).unwrap()),
    rpe: Some(domain::RPE::EIGHT),
    is_warmup: false,
    is_completed: false,
});

pub static ENTRY: LazyLock<domain::ExerciseEntry> = LazyLock::new(|| domain::ExerciseEntry {
    id: 10.into(),
    exercise_id: EXERCISE.id,
    phase: domain::Phase::Main,
    order: 1,
    notes: None,
    sets: vec![SET.clone(), SET_2.clone()],
});

pub static WORKOUT: LazyLock<domain::WorkoutSession> =
    LazyLock::new(|| domain::WorkoutSession {
        id: 1.into(),
        user_id: USER.id,
        name: Some(domain::Name::new("Push day").unwrap()),
        notes: String::new(),
        started_at: *STARTED_AT,
        completed_at: None,
        duration_seconds: None,
        entries: vec![ENTRY.clone()],
    });
