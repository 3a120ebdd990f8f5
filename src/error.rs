use crate::classifiers::proximity_tree::checkpoint::CheckpointError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("split score is not finite: {0}")]
    NonFiniteScore(f64),

    #[error("split build cursor is exhausted")]
    Exhausted,

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

impl From<strum::ParseError> for TreeError {
    fn from(err: strum::ParseError) -> Self {
        TreeError::Configuration(err.to_string())
    }
}

/// Rejects NaN and infinite scores.
pub(crate) fn ensure_finite(score: f64) -> Result<f64, TreeError> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(TreeError::NonFiniteScore(score))
    }
}
