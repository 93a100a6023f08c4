pub mod hints;
pub mod word;

use std::hash::{Hash, Hasher};

use fxhash::{FxHashMap, FxHasher};
use serde::Serialize;

use crate::algo;
use crate::error::EngineError;
use crate::pattern_matrix::PatternMatrix;
pub use hints::{Hint, HintsN, Pattern};
pub use word::{WordError, WordN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus<const N: usize> {
    guesses: Vec<WordN<N>>,
    answers: Vec<WordN<N>>,
    guess_index: FxHashMap<WordN<N>, usize>,
    answer_index: FxHashMap<WordN<N>, usize>,
}

impl<const N: usize> Corpus<N> {
    pub fn new(guesses: Vec<WordN<N>>, answers: Vec<WordN<N>>) -> Self {
        let (guesses, guess_index) = dedup_indexed(guesses);
        let (answers, answer_index) = dedup_indexed(answers);

        Self {
            guesses,
            answers,
            guess_index,
            answer_index,
        }
    }

    pub fn guesses(&self) -> &[WordN<N>] {
        &self.guesses
    }

    pub fn answers(&self) -> &[WordN<N>] {
        &self.answers
    }

    pub fn guess_index(&self, word: &WordN<N>) -> Option<usize> {
        self.guess_index.get(word).copied()
    }

    pub fn answer_index(&self, word: &WordN<N>) -> Option<usize> {
        self.answer_index.get(word).copied()
    }

    pub fn find_guess(&self, word: &str) -> Result<(usize, WordN<N>), EngineError> {
        let word = WordN::<N>::try_from(word)?;
        let i = self
            .guess_index(&word)
            .ok_or_else(|| EngineError::UnknownWord(word.to_string()))?;
        Ok((i, word))
    }

    pub fn find_answer(&self, word: &str) -> Result<(usize, WordN<N>), EngineError> {
        let word = WordN::<N>::try_from(word)?;
        let i = self
            .answer_index(&word)
            .ok_or_else(|| EngineError::UnknownWord(word.to_string()))?;
        Ok((i, word))
    }

    /// Hash of both word orderings. A pattern matrix is only valid for the
    /// corpus whose fingerprint it carries.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        N.hash(&mut hasher);
        self.guesses.hash(&mut hasher);
        self.answers.hash(&mut hasher);
        hasher.finish()
    }
}

fn dedup_indexed<const N: usize>(
    words: Vec<WordN<N>>,
) -> (Vec<WordN<N>>, FxHashMap<WordN<N>, usize>) {
    let mut index = FxHashMap::default();
    let mut unique = Vec::with_capacity(words.len());
    for word in words {
        if !index.contains_key(&word) {
            index.insert(word, unique.len());
            unique.push(word);
        }
    }
    (unique, index)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ScoredGuess<const N: usize> {
    pub word: WordN<N>,
    pub entropy: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GuessRecommendation<const N: usize> {
    pub best: WordN<N>,
    pub alternatives: Vec<ScoredGuess<N>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PlayHistory(Vec<(usize, Pattern)>);

impl PlayHistory {
    pub fn push(&mut self, guess: usize, pattern: Pattern) {
        self.0.push((guess, pattern));
    }

    pub fn turns(&self) -> &[(usize, Pattern)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PossibilitySet(Vec<usize>);

impl PossibilitySet {
    pub fn new(answers: Vec<usize>) -> Self {
        Self(answers)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, answer: usize) -> bool {
        self.0.contains(&answer)
    }

    pub fn words<'a, const N: usize>(
        &'a self,
        corpus: &'a Corpus<N>,
    ) -> impl Iterator<Item = &'a WordN<N>> + 'a {
        self.0.iter().map(move |&i| &corpus.answers()[i])
    }

    pub fn narrow<const N: usize>(
        &mut self,
        corpus: &Corpus<N>,
        matrix: &PatternMatrix,
        guess: usize,
        pattern: Pattern,
    ) -> Result<(), EngineError> {
        let narrowed = algo::reduce(matrix, &self.0, guess, pattern);
        if narrowed.is_empty() {
            return Err(EngineError::EmptyPossibilitySet {
                guess: corpus.guesses()[guess].to_string(),
                pattern: HintsN::<N>::from_pattern(pattern).to_letters(),
            });
        }
        self.0 = narrowed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Word = WordN<5>;

    fn words(list: &[&str]) -> Vec<Word> {
        list.iter().map(|w| Word::try_from(*w).unwrap()).collect()
    }

    #[test]
    fn duplicates_keep_first_index() {
        let corpus = Corpus::new(
            words(&["crane", "slate", "CRANE", "trace"]),
            words(&["trace", "trace"]),
        );
        assert_eq!(corpus.guesses().len(), 3);
        assert_eq!(corpus.guess_index(&"TRACE".parse().unwrap()), Some(2));
        assert_eq!(corpus.answers().len(), 1);
    }

    #[test]
    fn unknown_guess_is_reported() {
        let corpus = Corpus::new(words(&["crane"]), words(&["crane"]));
        assert!(matches!(
            corpus.find_guess("slate"),
            Err(EngineError::UnknownWord(w)) if w == "SLATE"
        ));
        assert!(matches!(
            corpus.find_guess("sl"),
            Err(EngineError::InvalidWord(_))
        ));
    }

    #[test]
    fn fingerprint_depends_on_order() {
        let a = Corpus::new(words(&["crane", "slate"]), words(&["crane"]));
        let b = Corpus::new(words(&["slate", "crane"]), words(&["crane"]));
        let c = Corpus::new(words(&["crane", "slate"]), words(&["crane"]));
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), c.fingerprint());
    }
}
