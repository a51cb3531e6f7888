use rail_motion::MotionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error(transparent)]
    Motion(#[from] MotionError),

    #[error("No route `{key}` for train {train}")]
    MissingRoute { train: String, key: String },

    #[error("Duplicate train id: {0}")]
    DuplicateTrain(String),

    #[error("Default locomotive not found: {0}")]
    DefaultLocomotive(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FleetError>;
