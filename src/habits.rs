//! Habit list with per-day completion marks.
//!
//! Everything derived from the list (today's progress, the streak) is
//! recomputed on demand from `completed_day_keys`; nothing derived is stored.

use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::rc::Rc;
use uuid::Uuid;

use crate::clock::{Clock, DayKey};
use crate::database::{self, BlobStore, HABITS_KEY};
use crate::error::AquaError;
use crate::models::Habit;

/// Result of flipping a habit for today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub completed_now: bool,
}

pub struct HabitStore {
    habits: Vec<Habit>,
    clock: Rc<dyn Clock>,
    store: Rc<dyn BlobStore>,
}

impl HabitStore {
    /// Load the persisted habit list, starting empty if it is missing or unreadable
    pub fn load(store: Rc<dyn BlobStore>, clock: Rc<dyn Clock>) -> Self {
        let habits = match database::load_json::<Vec<Habit>>(store.as_ref(), HABITS_KEY) {
            Ok(Some(habits)) => habits,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("event=habits_load module=habits status=fallback error={}", e);
                Vec::new()
            }
        };
        debug!("event=habits_load module=habits status=ok count={}", habits.len());

        Self {
            habits,
            clock,
            store,
        }
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: Uuid) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn today(&self) -> DayKey {
        self.clock.today()
    }

    pub fn is_completed_today(&self, id: Uuid) -> bool {
        let today = self.today();
        self.get(id).is_some_and(|h| h.is_completed_on(today))
    }

    /// Append a new habit with no completions
    pub fn add(&mut self, title: &str) -> Result<Habit, AquaError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AquaError::InvalidInput(
                "habit title cannot be empty".to_string(),
            ));
        }

        let habit = Habit::new(title.to_string());
        self.habits.push(habit.clone());
        info!("event=habit_added module=habits id={}", habit.id);
        self.persist()?;

        Ok(habit)
    }

    /// Mark the habit done today, or undo today's mark if it is already there
    pub fn toggle(&mut self, id: Uuid) -> Result<Toggle, AquaError> {
        let toggle = self.toggle_in_memory(id)?;
        self.persist()?;
        Ok(toggle)
    }

    /// Flip today's mark without writing it. Follow with [`persist`](Self::persist).
    pub fn toggle_in_memory(&mut self, id: Uuid) -> Result<Toggle, AquaError> {
        let today = self.today();
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(AquaError::NotFound(id))?;

        let completed_now = if habit.completed_day_keys.remove(&today) {
            false
        } else {
            habit.completed_day_keys.insert(today);
            true
        };
        info!(
            "event=habit_toggled module=habits id={} day={} completed={}",
            id, today, completed_now
        );

        Ok(Toggle { completed_now })
    }

    /// Remove the habit if it exists. Deleting an unknown id is not an error.
    /// Returns whether a habit was removed.
    pub fn delete(&mut self, id: Uuid) -> Result<bool, AquaError> {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != id);
        if self.habits.len() == before {
            debug!("event=habit_deleted module=habits id={} status=absent", id);
            return Ok(false);
        }
        info!("event=habit_deleted module=habits id={}", id);
        self.persist()?;
        Ok(true)
    }

    /// Fraction of habits completed today, `0.0` when there are none
    pub fn daily_progress(&self) -> f64 {
        if self.habits.is_empty() {
            return 0.0;
        }
        let today = self.today();
        let completed = self
            .habits
            .iter()
            .filter(|h| h.is_completed_on(today))
            .count();
        completed as f64 / self.habits.len() as f64
    }

    /// Consecutive days with at least one completion, ending today or yesterday
    pub fn streak(&self) -> u32 {
        let days: HashSet<DayKey> = self
            .habits
            .iter()
            .flat_map(|h| h.completed_day_keys.iter().copied())
            .collect();
        streak_ending_at(&days, self.today())
    }

    /// Write the whole habit list
    pub fn persist(&self) -> Result<(), AquaError> {
        database::save_json(self.store.as_ref(), HABITS_KEY, &self.habits).map_err(|e| {
            error!("event=habits_save module=habits status=error error={}", e);
            AquaError::from(e)
        })
    }
}

/// Length of the run of days in `days` that ends at `today`, or at yesterday
/// when today has nothing yet.
pub fn streak_ending_at(days: &HashSet<DayKey>, today: DayKey) -> u32 {
    let mut cursor = if days.contains(&today) {
        today
    } else {
        let yesterday = today.previous();
        if !days.contains(&yesterday) {
            return 0;
        }
        yesterday
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        let prev = cursor.previous();
        if prev == cursor {
            break;
        }
        cursor = prev;
    }
    streak
}
