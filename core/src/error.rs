use std::{io, path::PathBuf};

use thiserror::Error;

use crate::structs::WordError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unable to read word list {}", path.display())]
    CorpusLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed word list {} at line {line}", path.display())]
    MalformedCorpus {
        path: PathBuf,
        line: usize,
        #[source]
        source: WordError,
    },
    #[error("Word list {} contains no words", .0.display())]
    EmptyCorpus(PathBuf),
    #[error(transparent)]
    InvalidWord(#[from] WordError),
    #[error("Word \"{0}\" is not in the word list")]
    UnknownWord(String),
    #[error("Pattern matrix {} does not match the current word lists: {reason}", path.display())]
    CacheInconsistency { path: PathBuf, reason: String },
    #[error("No possible answers remain after {guess} with hints {pattern}, the feedback is contradictory")]
    EmptyPossibilitySet { guess: String, pattern: String },
    #[error("No possible answers are left to choose from")]
    NoPossibleAnswers,
    #[error("The allowed guess list is empty")]
    NoAllowedGuesses,
    #[error("The game has no hidden answer, hints have to be supplied")]
    MissingAnswer,
    #[error("Malformed frequency entry at line {line}: \"{text}\"")]
    MalformedFrequency { line: usize, text: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
