use crate::classifiers::proximity_tree::checkpoint::BuildState;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("checkpoint could not be moved into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Persists build progress between growth calls or processes.
pub trait Checkpointer: Debug {
    /// Saves `state` when a save is due, or unconditionally when `force` is
    /// set. Returns whether anything was written.
    fn save(&mut self, state: &BuildState, force: bool) -> Result<bool, CheckpointError>;

    /// Whether an unforced save would write now. Callers skip assembling
    /// the state when it would not.
    fn is_save_due(&self) -> bool {
        true
    }

    /// The most recently saved state, if there is one and loading is enabled.
    fn load(&mut self) -> Result<Option<BuildState>, CheckpointError>;
}
