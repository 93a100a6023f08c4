use std::{path::Path, sync::Arc};

use log::{debug, info};
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::{
    config::EngineConfig,
    data,
    error::EngineError,
    pattern_matrix::{PatternMatrix, PatternStore},
    priors::{self, PriorWeights},
    solvers::{GuessSelector, DEFAULT_TOP_K},
    structs::{
        Corpus, GuessRecommendation, HintsN, Pattern, PlayHistory, PossibilitySet, WordN,
    },
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TurnOutcome<const N: usize> {
    pub guess: WordN<N>,
    pub hints: HintsN<N>,
    pub pattern: Pattern,
    pub remaining: usize,
    pub recommendation: Arc<GuessRecommendation<N>>,
    pub solved: bool,
}

#[derive(Debug, Clone)]
pub struct Session<const N: usize> {
    priors: Arc<PriorWeights<N>>,
    answer: Option<usize>,
    possibilities: PossibilitySet,
    history: PlayHistory,
    selector: GuessSelector<N>,
}

impl<const N: usize> Session<N> {
    pub fn possibilities(&self) -> &PossibilitySet {
        &self.possibilities
    }

    pub fn history(&self) -> &PlayHistory {
        &self.history
    }

    pub fn answer(&self) -> Option<usize> {
        self.answer
    }

    pub fn priors(&self) -> &PriorWeights<N> {
        &self.priors
    }

    pub fn computations(&self) -> usize {
        self.selector.computations()
    }
}

#[derive(Debug, Clone)]
pub struct Engine<const N: usize> {
    corpus: Arc<Corpus<N>>,
    matrix: Arc<PatternMatrix>,
    top_k: usize,
    max_turns: usize,
}

impl<const N: usize> Engine<N> {
    pub fn new(corpus: Arc<Corpus<N>>, matrix: Arc<PatternMatrix>) -> Result<Self, EngineError> {
        matrix.check(&corpus, Path::new("<pattern matrix>"))?;
        Ok(Self {
            corpus,
            matrix,
            top_k: DEFAULT_TOP_K,
            max_turns: 6,
        })
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn load(config: &EngineConfig, store: &PatternStore) -> Result<Self, EngineError> {
        let guesses = data::load_words::<_, N>(&config.allowed_words)?;
        let answers = data::load_words::<_, N>(&config.answers)?;
        let corpus = Corpus::new(guesses, answers);
        info!(
            "Corpus has {} allowed guesses and {} possible answers",
            corpus.guesses().len(),
            corpus.answers().len()
        );

        let matrix = store.get(&corpus)?;
        Ok(Self::new(Arc::new(corpus), matrix)?
            .with_top_k(config.top_k)
            .with_max_turns(config.max_turns))
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let store = PatternStore::new(&config.pattern_matrix, config.block_size);
        Self::load(config, &store)
    }

    pub fn priors_from_config(config: &EngineConfig) -> Result<PriorWeights<N>, EngineError> {
        let frequencies = data::load_frequencies(&config.frequencies, &config.frequency_cache)?;
        Ok(priors::priors(&frequencies, config.priors))
    }

    pub fn corpus(&self) -> &Corpus<N> {
        &self.corpus
    }

    pub fn matrix(&self) -> &PatternMatrix {
        &self.matrix
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    fn initial_possibilities(&self, priors: &PriorWeights<N>) -> PossibilitySet {
        PossibilitySet::new(
            self.corpus
                .answers()
                .iter()
                .enumerate()
                .filter(|(_, word)| priors.get(word) > 0.)
                .map(|(i, _)| i)
                .collect(),
        )
    }

    fn session(&self, priors: Arc<PriorWeights<N>>, answer: Option<usize>) -> Session<N> {
        let possibilities = self.initial_possibilities(&priors);
        Session {
            priors,
            answer,
            possibilities,
            history: PlayHistory::default(),
            selector: GuessSelector::new(self.top_k),
        }
    }

    fn random_answer(possibilities: &PossibilitySet) -> Result<usize, EngineError> {
        possibilities
            .indices()
            .choose(&mut rand::thread_rng())
            .copied()
            .ok_or(EngineError::NoPossibleAnswers)
    }

    pub fn start_game(&self, priors: Arc<PriorWeights<N>>) -> Result<Session<N>, EngineError> {
        let mut session = self.session(priors, None);
        session.answer = Some(Self::random_answer(&session.possibilities)?);
        Ok(session)
    }

    pub fn start_game_with_answer(
        &self,
        priors: Arc<PriorWeights<N>>,
        answer: &str,
    ) -> Result<Session<N>, EngineError> {
        let (i, word) = self.corpus.find_answer(answer)?;
        let session = self.session(priors, Some(i));
        if !session.possibilities.contains(i) {
            return Err(EngineError::UnknownWord(word.to_string()));
        }
        Ok(session)
    }

    pub fn start_assisted(&self, priors: Arc<PriorWeights<N>>) -> Session<N> {
        self.session(priors, None)
    }

    pub fn recommend(
        &self,
        session: &mut Session<N>,
    ) -> Result<Arc<GuessRecommendation<N>>, EngineError> {
        session.selector.best_guess(
            &self.corpus,
            &self.matrix,
            &session.history,
            session.possibilities.indices(),
            &session.priors,
        )
    }

    pub fn submit_guess(
        &self,
        session: &mut Session<N>,
        guess: &str,
    ) -> Result<TurnOutcome<N>, EngineError> {
        let (i, _) = self.corpus.find_guess(guess)?;
        let answer = session.answer.ok_or(EngineError::MissingAnswer)?;
        let pattern = self.matrix.get(i, answer);
        self.observe(session, i, pattern)
    }

    pub fn submit_feedback(
        &self,
        session: &mut Session<N>,
        guess: &str,
        hints: &HintsN<N>,
    ) -> Result<TurnOutcome<N>, EngineError> {
        let (i, _) = self.corpus.find_guess(guess)?;
        self.observe(session, i, hints.to_pattern())
    }

    fn observe(
        &self,
        session: &mut Session<N>,
        guess: usize,
        pattern: Pattern,
    ) -> Result<TurnOutcome<N>, EngineError> {
        let before = session.possibilities.len();
        session
            .possibilities
            .narrow(&self.corpus, &self.matrix, guess, pattern)?;
        session.history.push(guess, pattern);

        let word = self.corpus.guesses()[guess];
        let hints = HintsN::<N>::from_pattern(pattern);
        debug!(
            "{word} {}: {before} -> {} possibilities",
            hints.to_letters(),
            session.possibilities.len()
        );

        let recommendation = self.recommend(session)?;
        Ok(TurnOutcome {
            guess: word,
            hints,
            pattern,
            remaining: session.possibilities.len(),
            recommendation,
            solved: pattern == Pattern::all_correct::<N>(),
        })
    }

    /// Starts over with the same priors. Recommendations already computed
    /// for a history are kept.
    pub fn reset(&self, session: &mut Session<N>) -> Result<(), EngineError> {
        session.possibilities = self.initial_possibilities(&session.priors);
        session.history.clear();
        if session.answer.is_some() {
            session.answer = Some(Self::random_answer(&session.possibilities)?);
        }
        Ok(())
    }

    pub fn solve(
        &self,
        priors: Arc<PriorWeights<N>>,
        answer: &str,
    ) -> Result<Vec<TurnOutcome<N>>, EngineError> {
        let mut session = self.start_game_with_answer(priors, answer)?;
        let mut turns = vec![];
        let mut next = self.recommend(&mut session)?.best;

        while turns.len() < self.max_turns {
            let outcome = self.submit_guess(&mut session, &next.to_string())?;
            next = outcome.recommendation.best;
            let solved = outcome.solved;
            turns.push(outcome);
            if solved {
                break;
            }
        }

        Ok(turns)
    }
}
