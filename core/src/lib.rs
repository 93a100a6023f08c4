pub mod algo;
pub mod config;
pub mod data;
pub mod entropy;
pub mod error;
pub mod pattern_matrix;
pub mod priors;
pub mod session;
pub mod solvers;
pub mod structs;

pub use config::EngineConfig;
pub use error::EngineError;
pub use fxhash::FxHashMap;
pub use session::{Engine, Session, TurnOutcome};

pub const WORD_LENGTH: usize = 5;

pub type Word = structs::WordN<WORD_LENGTH>;
pub type Hints = structs::HintsN<WORD_LENGTH>;
