use core::fmt;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WordError {
    #[error("Expected word of length: {expected_length}. Found word \"{word}\" of length {}", word.chars().count())]
    IncorrectLength {
        word: String,
        expected_length: usize,
    },
    #[error("Word \"{word}\" contains '{character}', only letters A-Z are allowed")]
    InvalidCharacter { word: String, character: char },
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordN<const N: usize>(#[serde_as(as = "[_; N]")] pub [u8; N]);

impl<const N: usize> fmt::Display for WordN<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &c in self.0.iter() {
            write!(f, "{}", c as char)?;
        }
        Ok(())
    }
}

impl<const N: usize> WordN<N> {
    pub fn letters(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> TryFrom<&str> for WordN<N> {
    type Error = WordError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if let Some(character) = trimmed.chars().find(|c| !c.is_ascii_alphabetic()) {
            return Err(WordError::InvalidCharacter {
                word: trimmed.to_string(),
                character,
            });
        }

        let array = trimmed
            .bytes()
            .map(|b| b.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_: Vec<_>| WordError::IncorrectLength {
                word: trimmed.to_string(),
                expected_length: N,
            })?;

        Ok(Self(array))
    }
}

impl<const N: usize> FromStr for WordN<N> {
    type Err = WordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}
