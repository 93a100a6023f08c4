use std::{cmp::Ordering::Equal, sync::Arc};

use fxhash::FxHashMap;
use log::debug;

use crate::{
    entropy::calculate_entropies,
    error::EngineError,
    pattern_matrix::PatternMatrix,
    priors::PriorWeights,
    structs::{Corpus, GuessRecommendation, PlayHistory, ScoredGuess},
};

pub const DEFAULT_TOP_K: usize = 10;

/// Picks the allowed guess with the highest entropy against `possibilities`.
///
/// Guesses are ranked by entropy, highest first; equal entropies keep the
/// order of the guess list. A single remaining possibility is returned as is.
pub fn best_guess<const N: usize>(
    corpus: &Corpus<N>,
    matrix: &PatternMatrix,
    possibilities: &[usize],
    priors: &PriorWeights<N>,
    top_k: usize,
) -> Result<GuessRecommendation<N>, EngineError> {
    match possibilities {
        [] => Err(EngineError::NoPossibleAnswers),
        &[only] => {
            let word = corpus.answers()[only];
            Ok(GuessRecommendation {
                best: word,
                alternatives: vec![ScoredGuess { word, entropy: 0. }],
            })
        }
        _ => {
            let weights = priors.normalized(corpus.answers(), possibilities);
            let entropies = calculate_entropies::<N>(matrix, possibilities, &weights);

            let mut ranked = entropies.into_iter().enumerate().collect::<Vec<_>>();
            ranked.sort_by(|&(_, e1), &(_, e2)| e2.partial_cmp(&e1).unwrap_or(Equal));

            let alternatives = ranked
                .into_iter()
                .take(top_k.max(1))
                .map(|(i, entropy)| ScoredGuess {
                    word: corpus.guesses()[i],
                    entropy,
                })
                .collect::<Vec<_>>();
            let best = alternatives
                .first()
                .map(|scored| scored.word)
                .ok_or(EngineError::NoAllowedGuesses)?;

            Ok(GuessRecommendation { best, alternatives })
        }
    }
}

#[derive(Debug, Clone)]
pub struct GuessSelector<const N: usize> {
    memo: FxHashMap<PlayHistory, Arc<GuessRecommendation<N>>>,
    top_k: usize,
    computations: usize,
}

impl<const N: usize> Default for GuessSelector<N> {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl<const N: usize> GuessSelector<N> {
    pub fn new(top_k: usize) -> Self {
        Self {
            memo: FxHashMap::default(),
            top_k,
            computations: 0,
        }
    }

    pub fn computations(&self) -> usize {
        self.computations
    }

    pub fn clear(&mut self) {
        self.memo.clear();
    }

    pub fn best_guess(
        &mut self,
        corpus: &Corpus<N>,
        matrix: &PatternMatrix,
        history: &PlayHistory,
        possibilities: &[usize],
        priors: &PriorWeights<N>,
    ) -> Result<Arc<GuessRecommendation<N>>, EngineError> {
        if let Some(recommendation) = self.memo.get(history) {
            debug!("Reusing recommendation after {} guesses", history.len());
            return Ok(Arc::clone(recommendation));
        }

        let recommendation = Arc::new(best_guess(
            corpus,
            matrix,
            possibilities,
            priors,
            self.top_k,
        )?);
        self.computations += 1;
        self.memo
            .insert(history.clone(), Arc::clone(&recommendation));

        Ok(recommendation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::WordN;

    type Word = WordN<5>;

    fn words(list: &[&str]) -> Vec<Word> {
        list.iter().map(|w| Word::try_from(*w).unwrap()).collect()
    }

    fn setup(guesses: &[&str], answers: &[&str]) -> (Corpus<5>, PatternMatrix, PriorWeights<5>) {
        let corpus = Corpus::new(words(guesses), words(answers));
        let matrix = PatternMatrix::build(&corpus, 8);
        let priors = PriorWeights::membership(corpus.answers());
        (corpus, matrix, priors)
    }

    #[test]
    fn single_possibility_is_returned_directly() {
        let (corpus, matrix, _) = setup(&["crane", "slate"], &["trace", "crate"]);
        // no weight at all, the shortcut must not care
        let priors = PriorWeights::default();
        let recommendation = best_guess(&corpus, &matrix, &[1], &priors, 10).unwrap();
        assert_eq!(recommendation.best, corpus.answers()[1]);
        assert_eq!(recommendation.alternatives.len(), 1);
    }

    #[test]
    fn empty_possibilities_fail() {
        let (corpus, matrix, priors) = setup(&["crane"], &["crane"]);
        let err = best_guess(&corpus, &matrix, &[], &priors, 10).unwrap_err();
        assert!(matches!(err, EngineError::NoPossibleAnswers));
        assert_eq!(err.to_string(), "No possible answers are left to choose from");
    }

    #[test]
    fn empty_guess_list_fails() {
        let (corpus, matrix, priors) = setup(&[], &["crane", "slate"]);
        assert!(matches!(
            best_guess(&corpus, &matrix, &[0, 1], &priors, 10),
            Err(EngineError::NoAllowedGuesses)
        ));
    }

    #[test]
    fn picks_the_most_informative_guess() {
        // "biddy" shares no letter with any answer, "crane" tells all three apart
        let (corpus, matrix, priors) =
            setup(&["biddy", "crane", "slate"], &["crane", "slate", "trace"]);
        let recommendation = best_guess(&corpus, &matrix, &[0, 1, 2], &priors, 10).unwrap();
        assert_eq!(recommendation.best.to_string(), "CRANE");
        assert_eq!(recommendation.alternatives.len(), 3);
        assert!((recommendation.alternatives[0].entropy - 3f64.log2()).abs() < 1e-12);
        assert_eq!(recommendation.alternatives[2].word.to_string(), "BIDDY");
        assert_eq!(recommendation.alternatives[2].entropy, 0.);
        for pair in recommendation.alternatives.windows(2) {
            assert!(pair[0].entropy >= pair[1].entropy);
        }
    }

    #[test]
    fn ties_keep_guess_order() {
        let (corpus, matrix, priors) = setup(&["biddy", "dumpy", "crane"], &["crane", "slate"]);
        let recommendation = best_guess(&corpus, &matrix, &[0, 1], &priors, 2).unwrap();
        assert_eq!(recommendation.best.to_string(), "CRANE");
        assert_eq!(recommendation.alternatives.len(), 2);
        assert_eq!(recommendation.alternatives[1].word.to_string(), "BIDDY");
    }

    #[test]
    fn memo_avoids_recomputation() {
        let (corpus, matrix, priors) =
            setup(&["crane", "slate", "trace"], &["crane", "slate", "trace"]);
        let mut selector = GuessSelector::new(10);
        let history = PlayHistory::default();

        let first = selector
            .best_guess(&corpus, &matrix, &history, &[0, 1, 2], &priors)
            .unwrap();
        let second = selector
            .best_guess(&corpus, &matrix, &history, &[0, 1, 2], &priors)
            .unwrap();
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(selector.computations(), 1);

        let mut longer = history.clone();
        longer.push(0, matrix.get(0, 2));
        selector
            .best_guess(&corpus, &matrix, &longer, &[2], &priors)
            .unwrap();
        assert_eq!(selector.computations(), 2);
    }
}
