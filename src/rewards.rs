//! Aquarium reward engine.
//!
//! Reacts to new completions only. Fish are capped per day and in total;
//! decorations unlock from the streak milestone table and are equipped in
//! unlock order while slots remain.

use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::rc::Rc;

use crate::clock::{Clock, DayKey};
use crate::database::{self, AQUARIUM_KEY, BlobStore};
use crate::error::AquaError;
use crate::models::{
    AquariumState, DECOR_SLOT_COUNT, DecorId, Fish, MAX_DAILY_SPAWNS, MAX_TOTAL_FISH, MILESTONES,
};

/// Progress at which plants count as fully grown
pub const GROWN_THRESHOLD: f64 = 0.8;

/// What the presentation layer hands over after a habit flips to done
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionEvent {
    pub day_key: DayKey,
    pub progress: f64,
    pub streak: u32,
}

/// Signals the presentation layer can react to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardOutcome {
    pub fish_spawned: bool,
    pub unlocked: Vec<DecorId>,
}

impl RewardOutcome {
    pub fn is_empty(&self) -> bool {
        !self.fish_spawned && self.unlocked.is_empty()
    }
}

/// Plant sizes derived from today's progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantGrowth {
    pub progress: f64,
    pub grown: bool,
}

impl PlantGrowth {
    pub fn from_progress(progress: f64) -> Self {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        Self {
            progress,
            grown: progress >= GROWN_THRESHOLD,
        }
    }

    /// Height in points of the plant at `index`, later plants are taller
    pub fn height(&self, index: usize) -> f64 {
        let base = 30.0 + index as f64 * 5.0;
        let max = 120.0 + index as f64 * 10.0;
        base + (max - base) * self.progress
    }
}

pub struct RewardEngine {
    state: AquariumState,
    rng: StdRng,
    store: Rc<dyn BlobStore>,
    /// In-memory changes not yet written
    dirty: bool,
}

impl RewardEngine {
    pub fn load(store: Rc<dyn BlobStore>, clock: &dyn Clock) -> Self {
        Self::load_with_rng(store, clock, StdRng::from_entropy())
    }

    /// Load with a caller-chosen random source for fish generation
    pub fn load_with_rng(store: Rc<dyn BlobStore>, clock: &dyn Clock, mut rng: StdRng) -> Self {
        let mut normalized = false;
        let state = match database::load_json::<AquariumState>(store.as_ref(), AQUARIUM_KEY) {
            Ok(Some(mut state)) => {
                normalized = state.normalize();
                if normalized {
                    warn!("event=aquarium_load module=rewards status=normalized");
                }
                state
            }
            Ok(None) => AquariumState::initial(&mut rng),
            Err(e) => {
                warn!("event=aquarium_load module=rewards status=fallback error={}", e);
                AquariumState::initial(&mut rng)
            }
        };

        let mut engine = Self {
            state,
            rng,
            store,
            dirty: normalized,
        };
        // The reset stays in memory and is written by the next successful persist.
        if let Err(e) = engine.check_day_rollover(clock.today()) {
            error!("event=aquarium_rollover module=rewards status=unsaved error={}", e);
        }
        engine
    }

    pub fn state(&self) -> &AquariumState {
        &self.state
    }

    /// Whether there are changes the last write did not store
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Start a new daily spawn quota when the day has changed, and persist it.
    /// Returns whether a rollover happened.
    pub fn check_day_rollover(&mut self, today: DayKey) -> Result<bool, AquaError> {
        let rolled = self.roll_over(today);
        self.persist()?;
        Ok(rolled)
    }

    /// Apply the fish and decor rules for one new completion, then persist
    pub fn apply_completion(&mut self, event: CompletionEvent) -> Result<RewardOutcome, AquaError> {
        let outcome = self.record_completion(event);
        self.persist()?;
        Ok(outcome)
    }

    /// Apply a completion to the in-memory state only.
    ///
    /// The outcome is final even if the following [`persist`](Self::persist)
    /// fails; the memory copy is authoritative for the session.
    pub fn record_completion(&mut self, event: CompletionEvent) -> RewardOutcome {
        self.roll_over(event.day_key);

        let mut outcome = RewardOutcome::default();

        if self.state.daily_fish_spawns < MAX_DAILY_SPAWNS
            && self.state.fishes.len() < MAX_TOTAL_FISH
        {
            self.state.fishes.push(Fish::random(&mut self.rng));
            self.state.daily_fish_spawns += 1;
            outcome.fish_spawned = true;
        }

        for milestone in MILESTONES {
            if event.streak >= milestone.day && !self.state.is_unlocked(milestone.decor) {
                self.unlock(milestone.decor);
                outcome.unlocked.push(milestone.decor);
            }
        }

        info!(
            "event=completion_reward module=rewards day={} streak={} fish_spawned={} unlocked={}",
            event.day_key,
            event.streak,
            outcome.fish_spawned,
            outcome.unlocked.len()
        );

        if !outcome.is_empty() {
            self.dirty = true;
        }
        outcome
    }

    /// Write pending changes. A failed write keeps them pending for the next call.
    pub fn persist(&mut self) -> Result<(), AquaError> {
        if !self.dirty {
            return Ok(());
        }
        database::save_json(self.store.as_ref(), AQUARIUM_KEY, &self.state).map_err(|e| {
            error!("event=aquarium_save module=rewards status=error error={}", e);
            AquaError::from(e)
        })?;
        self.dirty = false;
        Ok(())
    }

    pub fn plant_growth(&self, progress: f64) -> PlantGrowth {
        PlantGrowth::from_progress(progress)
    }

    fn roll_over(&mut self, today: DayKey) -> bool {
        if self.state.last_day_key == Some(today) {
            return false;
        }
        debug!(
            "event=aquarium_rollover module=rewards from={:?} to={}",
            self.state.last_day_key.map(|d| d.to_string()),
            today
        );
        self.state.last_day_key = Some(today);
        self.state.daily_fish_spawns = 0;
        self.dirty = true;
        true
    }

    fn unlock(&mut self, decor: DecorId) {
        self.state.unlocked_decor.push(decor);
        if self.state.decor_slots.len() < DECOR_SLOT_COUNT {
            self.state.decor_slots.push(decor);
        }
    }
}
