mod error;
mod learners;

pub use error::BuildError;
