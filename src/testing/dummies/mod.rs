mod datasets;

pub use datasets::{
    alternating_line, four_instance_dataset, multivariate_dataset, pure_dataset, root_split,
    separable_dataset,
};
