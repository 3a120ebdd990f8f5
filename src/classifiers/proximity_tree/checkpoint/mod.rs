mod build_state;
mod checkpointer;
mod json_file_checkpointer;

pub use build_state::BuildState;
pub use checkpointer::{CheckpointError, Checkpointer};
pub use json_file_checkpointer::JsonFileCheckpointer;
