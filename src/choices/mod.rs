mod loader;
mod proximity_tree_choice;

pub use loader::load_params;
pub use proximity_tree_choice::*;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Empty parameter object so tagged choices still carry "params".
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct NoParams {}
