use crate::error::TreeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Tree(TreeError),
}

impl From<TreeError> for BuildError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NotImplemented(what) => BuildError::NotImplemented(what),
            TreeError::Configuration(msg) => BuildError::InvalidParameter(msg),
            other => BuildError::Tree(other),
        }
    }
}
