pub mod build;
pub mod choices;
pub mod classifiers;
pub mod core;
pub mod distances;
pub mod error;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::TreeError;
