use std::rc::Rc;
use uuid::Uuid;

use crate::clock::{Clock, DayKey};
use crate::database::{BlobStore, Database};
use crate::error::AquaError;
use crate::habits::HabitStore;
use crate::models::{AquariumState, Habit};
use crate::rewards::{CompletionEvent, PlantGrowth, RewardEngine, RewardOutcome};

/// What a toggle did, with the numbers the UI shows afterwards
#[derive(Debug)]
pub struct ToggleReport {
    pub completed_now: bool,
    pub progress: f64,
    pub streak: u32,
    /// Present only when the toggle was a new completion
    pub reward: Option<RewardOutcome>,
    /// First write failure, if any. The toggle and reward above still hold
    /// in memory for the rest of the session.
    pub persist_error: Option<AquaError>,
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub today: DayKey,
    pub completed_today: usize,
    pub habits: Vec<Habit>,
    pub progress: f64,
    pub streak: u32,
    pub plants: PlantGrowth,
    pub aquarium: AquariumState,
}

/// Application context: owns the habit list, the aquarium and their storage
pub struct Session {
    clock: Rc<dyn Clock>,
    habits: HabitStore,
    rewards: RewardEngine,
}

impl Session {
    pub fn open(database: Database, clock: Rc<dyn Clock>) -> Self {
        Self::with_store(Rc::new(database), clock)
    }

    /// Build a session over any blob store
    pub fn with_store(store: Rc<dyn BlobStore>, clock: Rc<dyn Clock>) -> Self {
        let habits = HabitStore::load(store.clone(), clock.clone());
        let rewards = RewardEngine::load(store, clock.as_ref());
        Self {
            clock,
            habits,
            rewards,
        }
    }

    pub fn habits(&self) -> &HabitStore {
        &self.habits
    }

    pub fn rewards(&self) -> &RewardEngine {
        &self.rewards
    }

    pub fn add_habit(&mut self, title: &str) -> Result<Habit, AquaError> {
        self.habits.add(title)
    }

    /// Returns whether a habit was removed
    pub fn delete_habit(&mut self, id: Uuid) -> Result<bool, AquaError> {
        self.habits.delete(id)
    }

    /// Toggle today's mark and, on a new completion, hand the reward engine
    /// the current day, progress and streak.
    ///
    /// Fails only for an unknown id. Write failures come back in
    /// [`ToggleReport::persist_error`] after both steps have run.
    pub fn toggle_habit(&mut self, id: Uuid) -> Result<ToggleReport, AquaError> {
        let toggle = self.habits.toggle_in_memory(id)?;
        let mut persist_error = self.habits.persist().err();

        let progress = self.habits.daily_progress();
        let streak = self.habits.streak();

        let reward = toggle.completed_now.then(|| {
            self.rewards.record_completion(CompletionEvent {
                day_key: self.clock.today(),
                progress,
                streak,
            })
        });
        // Also retries anything a previous write left pending
        if let Err(e) = self.rewards.persist() {
            persist_error = persist_error.or(Some(e));
        }

        Ok(ToggleReport {
            completed_now: toggle.completed_now,
            progress,
            streak,
            reward,
            persist_error,
        })
    }

    pub fn summary(&self) -> Summary {
        let today = self.clock.today();
        let progress = self.habits.daily_progress();
        Summary {
            today,
            completed_today: self
                .habits
                .habits()
                .iter()
                .filter(|h| h.is_completed_on(today))
                .count(),
            habits: self.habits.habits().to_vec(),
            progress,
            streak: self.habits.streak(),
            plants: self.rewards.plant_growth(progress),
            aquarium: self.rewards.state().clone(),
        }
    }
}
