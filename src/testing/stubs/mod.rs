pub mod class_match_criterion;
pub mod memory_checkpointer;
pub mod step_clock;

pub use class_match_criterion::ClassMatchCriterion;
pub use memory_checkpointer::MemoryCheckpointer;
pub use step_clock::StepClock;
