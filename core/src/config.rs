use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{error::EngineError, priors::PriorParams, solvers::DEFAULT_TOP_K};

pub const ALLOWED_WORDS_FILE_NAME: &str = "valid-wordle-words.txt";
pub const ANSWERS_FILE_NAME: &str = "wordle-answers.txt";
pub const FREQUENCY_FILE_NAME: &str = "word-frequencies.txt";
pub const FREQUENCY_CACHE_FILE_NAME: &str = "freq_map.json";
pub const PATTERN_MATRIX_FILE_NAME: &str = "pattern_matrix.bin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub allowed_words: PathBuf,
    pub answers: PathBuf,
    pub frequencies: PathBuf,
    pub frequency_cache: PathBuf,
    pub pattern_matrix: PathBuf,
    pub priors: PriorParams,
    /// Side of the square tiles the pattern matrix is computed in.
    pub block_size: usize,
    pub top_k: usize,
    pub max_turns: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::in_dir("data")
    }
}

impl EngineConfig {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            allowed_words: dir.join(ALLOWED_WORDS_FILE_NAME),
            answers: dir.join(ANSWERS_FILE_NAME),
            frequencies: dir.join(FREQUENCY_FILE_NAME),
            frequency_cache: dir.join(FREQUENCY_CACHE_FILE_NAME),
            pattern_matrix: dir.join(PATTERN_MATRIX_FILE_NAME),
            priors: PriorParams::default(),
            block_size: 500,
            top_k: DEFAULT_TOP_K,
            max_turns: 6,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
