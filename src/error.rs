use thiserror::Error;

use crate::models::WorkoutId;

/// Rejected user input. State is left untouched when one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Workout name is required.")]
    EmptyName,
    #[error("Select a workout to assign.")]
    NoWorkoutSelected,
    #[error("Selected workout no longer exists.")]
    UnknownWorkout(WorkoutId),
    #[error("{field} must be a whole number of zero or more (got \"{value}\").")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage quota exceeded for key {key}: {size} bytes > {quota} bytes")]
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to persist planner state: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to serialize planner state: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook payload could not be built: {0}")]
    Serialize(#[from] serde_json::Error),
}
