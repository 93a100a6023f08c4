#[cfg(feature = "terminal")]
use colored::Colorize;
use core::fmt;
use serde::{
    de::{self, Visitor},
    Deserializer, Serializer,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hint {
    Wrong = 0,
    OutOfPlace = 1,
    Correct = 2,
}

impl Hint {
    fn from_digit(digit: u8) -> Self {
        match digit {
            0 => Hint::Wrong,
            1 => Hint::OutOfPlace,
            _ => Hint::Correct,
        }
    }

    fn letter(self) -> char {
        match self {
            Hint::Wrong => 'w',
            Hint::OutOfPlace => 'o',
            Hint::Correct => 'c',
        }
    }
}

impl FromStr for Hint {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.chars().next().map(|x| x.to_ascii_lowercase()) {
            Some('w') => Ok(Hint::Wrong),
            Some('o') => Ok(Hint::OutOfPlace),
            Some('c') => Ok(Hint::Correct),
            _ => Err("Wrong character"),
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Base-3 encoding of a whole [`HintsN`], first letter in the least significant digit.
///
/// Values only come out of the pattern engine or from converting parsed hints,
/// so they are always below `3^N` for the word length they were made for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pattern(u8);

impl Pattern {
    pub fn count<const N: usize>() -> usize {
        3usize.pow(N as u32)
    }

    pub fn all_correct<const N: usize>() -> Self {
        (&HintsN::<N>::correct()).into()
    }

    pub(crate) fn from_raw(value: u8) -> Self {
        Self(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HintsN<const N: usize>(pub [Hint; N]);

impl<const N: usize> HintsN<N> {
    const FITS_IN_BYTE: () = assert!(N <= 5, "patterns longer than 5 letters do not fit in a byte");

    pub fn correct() -> Self {
        Self([Hint::Correct; N])
    }

    pub fn wrong() -> Self {
        Self([Hint::Wrong; N])
    }

    pub fn to_pattern(&self) -> Pattern {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS_IN_BYTE;
        let value = self
            .0
            .iter()
            .rev()
            .fold(0u8, |acc, &hint| acc * 3 + hint as u8);
        Pattern(value)
    }

    pub fn from_pattern(pattern: Pattern) -> Self {
        let mut hints = Self::wrong();
        let mut rest = pattern.0;
        for hint in hints.0.iter_mut() {
            *hint = Hint::from_digit(rest % 3);
            rest /= 3;
        }
        hints
    }

    pub fn is_correct(&self) -> bool {
        self.0.iter().all(|&h| h == Hint::Correct)
    }

    pub fn to_letters(&self) -> String {
        self.0.iter().map(|h| h.letter()).collect()
    }
}

impl<const N: usize> From<&HintsN<N>> for Pattern {
    fn from(hints: &HintsN<N>) -> Self {
        hints.to_pattern()
    }
}

impl<const N: usize> Serialize for HintsN<N> {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_letters())
    }
}

struct HintsNVisitor<const N: usize>;

impl<'de, const N: usize> Visitor<'de> for HintsNVisitor<N> {
    type Value = HintsN<N>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "hints of length {}", N)
    }

    #[inline]
    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        HintsN::<N>::from_str(value).map_err(de::Error::custom)
    }
}

impl<'de, const N: usize> Deserialize<'de> for HintsN<N> {
    fn deserialize<D>(deserializer: D) -> Result<HintsN<N>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(HintsNVisitor::<N>)
    }
}

impl<const N: usize> FromStr for HintsN<N> {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .chars()
            .map(|c| match c.to_ascii_lowercase() {
                'w' => Ok(Hint::Wrong),
                'o' => Ok(Hint::OutOfPlace),
                'c' => Ok(Hint::Correct),
                _ => Err("Wrong character"),
            })
            .collect::<Result<Vec<_>, _>>()?
            .try_into()
    }
}

#[cfg(feature = "terminal")]
impl<const N: usize> fmt::Display for HintsN<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &hint in self.0.iter() {
            let square = match hint {
                Hint::Wrong => "■".bright_black(),
                Hint::OutOfPlace => "■".yellow(),
                Hint::Correct => "■".green(),
            };

            write!(f, "{}", square)?;
        }
        Ok(())
    }
}

#[cfg(not(feature = "terminal"))]
impl<const N: usize> fmt::Display for HintsN<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_letters().to_uppercase())
    }
}

impl<const N: usize> TryFrom<Vec<Hint>> for HintsN<N> {
    type Error = &'static str;

    fn try_from(value: Vec<Hint>) -> Result<Self, Self::Error> {
        let hints: [Hint; N] = value.try_into().map_err(|_| "Wrong size!")?;
        Ok(Self(hints))
    }
}
