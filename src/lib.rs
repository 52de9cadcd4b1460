pub mod cli;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod habits;
pub mod logging;
pub mod models;
pub mod rewards;
pub mod session;
pub mod utils;

pub use clock::{Clock, DayKey, FixedClock, SystemClock};
pub use config::Config;
pub use database::{BlobStore, Database};
pub use error::AquaError;
pub use habits::{HabitStore, Toggle};
pub use models::{AquariumState, DecorId, Fish, Habit};
pub use rewards::{CompletionEvent, PlantGrowth, RewardEngine, RewardOutcome};
pub use session::{Session, Summary, ToggleReport};
pub use utils::Profile;
