use crate::{Phase, SetEntry, WorkoutSession};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: u32,
    pub total: u32,
}

impl Progress {
    pub fn of<'a>(sets: impl Iterator<Item = &'a SetEntry>) -> Self {
        sets.fold(Progress::default(), |mut progress, set| {
            progress.total += 1;
            if set.is_completed {
                progress.completed += 1;
            }
            progress
        })
    }

    /// Completed sets in percent, rounded half away from zero.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percentage = (f64::from(self.completed) / f64::from(self.total) * 100.0).round() as u8;
        percentage
    }
}

impl WorkoutSession {
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::of(self.sets())
    }

    #[must_use]
    pub fn phase_percentage(&self, phase: Phase) -> u8 {
        self.phase_stats(phase).percentage()
    }

    #[must_use]
    pub fn exercise_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn set_count(&self) -> usize {
        self.sets().count()
    }

    /// Sum of reps times weight over all sets that have both.
    #[must_use]
    pub fn total_volume(&self) -> f32 {
        self.sets().filter_map(SetEntry::volume).sum()
    }
}
