use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::error::{DatasetError, Result};

pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_NUM_DISTRACTORS: usize = 3;

pub const TRAIN_FILE: &str = "train_set.csv";
pub const TEST_FILE: &str = "test_set.csv";
pub const VALID_FILE: &str = "valid_set.csv";

pub const CONTEXT_HEADER: &str = "Context";
pub const UTTERANCE_HEADER: &str = "Utterance";
pub const LABEL_HEADER: &str = "Label";
pub const DISTRACTOR_HEADER_PREFIX: &str = "Distractor_";

/// Settings for `generate_data_sets`.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub output_dir: PathBuf,
    pub num_distractors: usize,
    /// Fixed seed for a reproducible run; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            num_distractors: DEFAULT_NUM_DISTRACTORS,
            seed: None,
        }
    }
}

impl DatasetConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_distractors == 0 {
            return Err(DatasetError::InvalidConfig(
                "num_distractors must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The seed this run will use. An unset seed is drawn once here so it can
    /// be logged and replayed.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| rand::rngs::OsRng.next_u64())
    }

    pub fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    pub fn train_path(&self) -> PathBuf {
        self.output_dir.join(TRAIN_FILE)
    }

    pub fn test_path(&self) -> PathBuf {
        self.output_dir.join(TEST_FILE)
    }

    pub fn valid_path(&self) -> PathBuf {
        self.output_dir.join(VALID_FILE)
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
}

/// `Distractor_0 .. Distractor_{n-1}`
pub fn distractor_headers(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("{DISTRACTOR_HEADER_PREFIX}{i}"))
        .collect()
}
