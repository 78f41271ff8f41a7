use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{ExerciseEntry, Progress, WorkoutSession};

/// Grouping of the exercises of a workout, in the order they are performed.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Warmup,
    #[default]
    Main,
    Cooldown,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Warmup, Phase::Main, Phase::Cooldown];

    /// Workouts recorded before phases existed have no phase and count as main work.
    #[must_use]
    pub fn classify(phase: Option<Phase>) -> Phase {
        phase.unwrap_or_default()
    }
}

impl WorkoutSession {
    /// Entries of the given phase sorted by their position in the phase.
    #[must_use]
    pub fn entries_in(&self, phase: Phase) -> Vec<&ExerciseEntry> {
        let mut entries = self
            .entries
            .iter()
            .filter(|e| e.phase == phase)
            .collect::<Vec<_>>();
        entries.sort_by_key(|e| e.order);
        entries
    }

    #[must_use]
    pub fn phase_stats(&self, phase: Phase) -> Progress {
        Progress::of(
            self.entries
                .iter()
                .filter(|e| e.phase == phase)
                .flat_map(|e| e.sets.iter()),
        )
    }

    /// Phases that contain at least one entry, in workout order.
    #[must_use]
    pub fn phases(&self) -> Vec<Phase> {
        Phase::iter()
            .filter(|phase| self.entries.iter().any(|e| e.phase == *phase))
            .collect()
    }
}
