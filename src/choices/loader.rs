use crate::choices::ProximityTreeParams;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads proximity tree parameters from a JSON file; missing fields take
/// their defaults.
pub fn load_params(path: impl AsRef<Path>) -> Result<ProximityTreeParams> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open params file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse params file {}", path.display()))
}
