mod build_cursor;
mod candidate_pool;
mod partition;
mod partition_counts;
mod split;
mod split_builder;
mod split_options;

pub use build_cursor::SplitBuildCursor;
pub use candidate_pool::CandidatePool;
pub use partition::{Exemplar, Partition};
pub use partition_counts::PartitionCounts;
pub use split::{Split, SplitSettings, SplitState};
pub use split_builder::{SplitSelection, select_best_split};
pub use split_options::SplitOptions;
