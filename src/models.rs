use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use crate::clock::DayKey;

/// Most fish the tank will ever hold
pub const MAX_TOTAL_FISH: usize = 12;
/// Fish that completions may spawn on a single day
pub const MAX_DAILY_SPAWNS: u32 = 2;
/// Decorations on display at once
pub const DECOR_SLOT_COUNT: usize = 3;
/// Ambient fish a brand new tank starts with
pub const INITIAL_FISH: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub title: String,
    pub completed_day_keys: BTreeSet<DayKey>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            completed_day_keys: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_completed_on(&self, day: DayKey) -> bool {
        self.completed_day_keys.contains(&day)
    }
}

/// A decorative swimmer. Only the renderer cares about its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fish {
    pub id: Uuid,
    pub seed: u32,
    pub lane: f64,
    pub speed: f64,
    pub direction: f64,
}

impl Fish {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            id: Uuid::new_v4(),
            seed: rng.gen_range(0..=1000),
            // keep clear of the surface and the gravel
            lane: rng.gen_range(0.1..0.8),
            speed: rng.gen_range(15.0..30.0),
            direction: if rng.gen_bool(0.5) { 1.0 } else { -1.0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorId {
    RockSmall,
    Driftwood,
    Shell,
}

impl DecorId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecorId::RockSmall => "rock_small",
            DecorId::Driftwood => "driftwood",
            DecorId::Shell => "shell",
        }
    }
}

impl fmt::Display for DecorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Streak length that unlocks a decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub day: u32,
    pub decor: DecorId,
}

/// Ascending by `day`
pub const MILESTONES: [Milestone; 3] = [
    Milestone { day: 7, decor: DecorId::RockSmall },
    Milestone { day: 14, decor: DecorId::Driftwood },
    Milestone { day: 30, decor: DecorId::Shell },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AquariumState {
    pub fishes: Vec<Fish>,
    pub daily_fish_spawns: u32,
    #[serde(default)]
    pub last_day_key: Option<DayKey>,
    #[serde(default)]
    pub unlocked_decor: Vec<DecorId>,
    #[serde(default)]
    pub decor_slots: Vec<DecorId>,
}

impl AquariumState {
    /// A fresh tank with a few ambient fish and nothing unlocked
    pub fn initial<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            fishes: (0..INITIAL_FISH).map(|_| Fish::random(rng)).collect(),
            daily_fish_spawns: 0,
            last_day_key: None,
            unlocked_decor: Vec::new(),
            decor_slots: Vec::new(),
        }
    }

    pub fn is_unlocked(&self, decor: DecorId) -> bool {
        self.unlocked_decor.contains(&decor)
    }

    /// Bring a stored state back within the tank's limits: unique unlocks,
    /// slots drawn from unlocks without repeats, capped fish and spawns.
    /// Returns whether anything changed.
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();

        let mut seen = Vec::with_capacity(self.unlocked_decor.len());
        self.unlocked_decor.retain(|d| {
            if seen.contains(d) {
                false
            } else {
                seen.push(*d);
                true
            }
        });

        let mut equipped = Vec::with_capacity(DECOR_SLOT_COUNT);
        for decor in &self.decor_slots {
            if seen.contains(decor) && !equipped.contains(decor) {
                equipped.push(*decor);
            }
        }
        equipped.truncate(DECOR_SLOT_COUNT);
        self.decor_slots = equipped;

        self.fishes.truncate(MAX_TOTAL_FISH);
        self.daily_fish_spawns = self.daily_fish_spawns.min(MAX_DAILY_SPAWNS);

        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn fish_fields_stay_in_visual_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let fish = Fish::random(&mut rng);
            assert!(fish.seed <= 1000);
            assert!((0.1..0.8).contains(&fish.lane));
            assert!((15.0..30.0).contains(&fish.speed));
            assert!(fish.direction == 1.0 || fish.direction == -1.0);
        }
    }

    #[test]
    fn decor_ids_serialize_snake_case() {
        let json = serde_json::to_string(&vec![DecorId::RockSmall, DecorId::Shell]).unwrap();
        assert_eq!(json, r#"["rock_small","shell"]"#);
    }

    #[test]
    fn milestones_are_ascending() {
        assert!(MILESTONES.windows(2).all(|pair| pair[0].day < pair[1].day));
    }

    #[test]
    fn normalize_restores_tank_limits() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = AquariumState {
            fishes: (0..MAX_TOTAL_FISH + 4).map(|_| Fish::random(&mut rng)).collect(),
            daily_fish_spawns: 9,
            last_day_key: None,
            unlocked_decor: vec![DecorId::Shell, DecorId::RockSmall, DecorId::Shell],
            decor_slots: vec![
                DecorId::Shell,
                DecorId::Shell,
                DecorId::Driftwood,
                DecorId::RockSmall,
            ],
        };

        assert!(state.normalize());
        assert_eq!(state.fishes.len(), MAX_TOTAL_FISH);
        assert_eq!(state.daily_fish_spawns, MAX_DAILY_SPAWNS);
        assert_eq!(state.unlocked_decor, vec![DecorId::Shell, DecorId::RockSmall]);
        assert_eq!(state.decor_slots, vec![DecorId::Shell, DecorId::RockSmall]);
    }

    #[test]
    fn normalize_leaves_valid_state_alone() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut state = AquariumState::initial(&mut rng);
        state.unlocked_decor = vec![DecorId::RockSmall];
        state.decor_slots = vec![DecorId::RockSmall];
        assert!(!state.normalize());
    }

    #[test]
    fn initial_tank_has_ambient_fish_only() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = AquariumState::initial(&mut rng);
        assert_eq!(state.fishes.len(), INITIAL_FISH);
        assert_eq!(state.daily_fish_spawns, 0);
        assert!(state.last_day_key.is_none());
        assert!(state.unlocked_decor.is_empty());
        assert!(state.decor_slots.is_empty());
    }
}
