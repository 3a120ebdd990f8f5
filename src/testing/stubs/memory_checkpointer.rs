use crate::classifiers::proximity_tree::checkpoint::{BuildState, CheckpointError, Checkpointer};
use std::cell::RefCell;
use std::rc::Rc;

/// Keeps every saved state in memory, shared with the test through `saves`.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointer {
    saves: Rc<RefCell<Vec<(BuildState, bool)>>>,
    to_load: Option<BuildState>,
    forced_only: bool,
}

impl MemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A checkpointer whose first load returns `state`.
    pub fn load_from(state: BuildState) -> Self {
        Self {
            to_load: Some(state),
            ..Self::default()
        }
    }

    /// A checkpointer that never has an unforced save due.
    pub fn forced_only() -> Self {
        Self {
            forced_only: true,
            ..Self::default()
        }
    }

    /// Saved states with whether each save was forced.
    pub fn saves(&self) -> Rc<RefCell<Vec<(BuildState, bool)>>> {
        Rc::clone(&self.saves)
    }
}

impl Checkpointer for MemoryCheckpointer {
    fn save(&mut self, state: &BuildState, force: bool) -> Result<bool, CheckpointError> {
        if !force && self.forced_only {
            return Ok(false);
        }
        self.saves.borrow_mut().push((state.clone(), force));
        Ok(true)
    }

    fn is_save_due(&self) -> bool {
        !self.forced_only
    }

    fn load(&mut self) -> Result<Option<BuildState>, CheckpointError> {
        Ok(self.to_load.take())
    }
}
