use thiserror::Error;
use uuid::Uuid;

use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum AquaError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Habit not found: {0}")]
    NotFound(Uuid),
    #[error("Failed to persist state: {0}")]
    PersistenceFailure(#[from] DatabaseError),
}
