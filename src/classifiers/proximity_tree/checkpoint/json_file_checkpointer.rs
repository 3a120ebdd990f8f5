use crate::classifiers::proximity_tree::checkpoint::{BuildState, CheckpointError, Checkpointer};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

pub const DEFAULT_CHECKPOINT_FILE_NAME: &str = "checkpoint.json";

#[derive(Serialize, Deserialize)]
struct CheckpointFile<S> {
    saved_at: DateTime<Utc>,
    state: S,
}

/// Writes the build state as JSON, replacing the file atomically.
///
/// Non-forced saves are skipped until `interval` has passed since the last
/// save made by this checkpointer.
#[derive(Debug)]
pub struct JsonFileCheckpointer {
    path: PathBuf,
    interval: Duration,
    loading_enabled: bool,
    last_saved: Option<Instant>,
    last_saved_at: Option<DateTime<Utc>>,
}

impl JsonFileCheckpointer {
    /// `path` may name a directory, in which case the default file name is used.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let path = if path.is_dir() {
            path.join(DEFAULT_CHECKPOINT_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        Self {
            path,
            interval: Duration::ZERO,
            loading_enabled: true,
            last_saved: None,
            last_saved_at: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_loading_enabled(mut self, enabled: bool) -> Self {
        self.loading_enabled = enabled;
        self
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }

    pub fn get_interval(&self) -> Duration {
        self.interval
    }

    pub fn is_loading_enabled(&self) -> bool {
        self.loading_enabled
    }

    /// Wall-clock time of the last save or successful load.
    pub fn get_last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }
}

impl Checkpointer for JsonFileCheckpointer {
    fn is_save_due(&self) -> bool {
        self.last_saved
            .is_none_or(|last| last.elapsed() >= self.interval)
    }

    fn save(&mut self, state: &BuildState, force: bool) -> Result<bool, CheckpointError> {
        if !force && !self.is_save_due() {
            return Ok(false);
        }
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let saved_at = Utc::now();
        let tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, &CheckpointFile { saved_at, state })?;
            writer.flush()?;
        }
        tmp.persist(&self.path)?;

        self.last_saved = Some(Instant::now());
        self.last_saved_at = Some(saved_at);
        info!("checkpoint written to {}", self.path.display());
        Ok(true)
    }

    fn load(&mut self) -> Result<Option<BuildState>, CheckpointError> {
        if !self.loading_enabled || !self.path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let file: CheckpointFile<BuildState> = serde_json::from_reader(reader)?;
        debug!(
            "loaded checkpoint from {} saved at {}",
            self.path.display(),
            file.saved_at.to_rfc3339()
        );
        self.last_saved_at = Some(file.saved_at);
        Ok(Some(file.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::proximity_tree::split::Split;
    use crate::classifiers::proximity_tree::tree::{NodeId, Tree};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::VecDeque;

    fn state() -> BuildState {
        BuildState {
            tree: Tree::new(Split::new(vec![0, 1, 2], vec![0, 1, 1], 2)),
            queue: VecDeque::from([NodeId::ROOT]),
            longest_time_per_instance: Duration::from_micros(250),
            run_time: Duration::from_millis(40),
            checkpoint_time: Duration::from_millis(2),
            rng: ChaCha8Rng::seed_from_u64(17),
            num_classes: 2,
        }
    }

    #[test]
    fn round_trips_through_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut checkpointer = JsonFileCheckpointer::new(dir.path());
        assert_eq!(
            checkpointer.get_path(),
            dir.path().join(DEFAULT_CHECKPOINT_FILE_NAME)
        );
        assert!(checkpointer.load().unwrap().is_none());

        assert!(checkpointer.save(&state(), false).unwrap());
        assert!(checkpointer.get_last_saved_at().is_some());

        let mut reader = JsonFileCheckpointer::new(dir.path());
        assert_eq!(reader.load().unwrap(), Some(state()));
    }

    #[test]
    fn skips_saves_inside_the_interval_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pt.json");
        let mut checkpointer =
            JsonFileCheckpointer::new(&path).with_interval(Duration::from_secs(3600));
        assert!(checkpointer.is_save_due());
        assert!(checkpointer.save(&state(), false).unwrap());
        assert!(!checkpointer.is_save_due());
        assert!(!checkpointer.save(&state(), false).unwrap());
        assert!(checkpointer.save(&state(), true).unwrap());
        assert!(path.exists());
    }

    #[test]
    fn disabled_loading_ignores_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = JsonFileCheckpointer::new(dir.path());
        writer.save(&state(), true).unwrap();
        let mut reader = JsonFileCheckpointer::new(dir.path()).with_loading_enabled(false);
        assert!(reader.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_a_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let mut checkpointer = JsonFileCheckpointer::new(&path);
        assert!(matches!(
            checkpointer.load(),
            Err(CheckpointError::Serde(_))
        ));
    }
}
