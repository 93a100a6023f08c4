use crate::pattern_matrix::PatternMatrix;
use crate::structs::{
    hints::{Hint, HintsN, Pattern},
    word::WordN,
};

/// Colours `guess` against `answer`. Exact matches are claimed first, then
/// every remaining guess letter claims the first unclaimed equal letter of the
/// answer, so repeated letters are never counted more often than they occur.
pub fn get_hints<const N: usize>(guess: &WordN<N>, answer: &WordN<N>) -> HintsN<N> {
    let mut hints = HintsN::<N>::wrong();
    let mut claimed = [false; N];

    for i in 0..N {
        if guess.0[i] == answer.0[i] {
            hints.0[i] = Hint::Correct;
            claimed[i] = true;
        }
    }

    for i in 0..N {
        if hints.0[i] == Hint::Correct {
            continue;
        }
        if let Some(j) = (0..N).find(|&j| !claimed[j] && guess.0[i] == answer.0[j]) {
            claimed[j] = true;
            hints.0[i] = Hint::OutOfPlace;
        }
    }

    hints
}

pub fn pattern_of<const N: usize>(guess: &WordN<N>, answer: &WordN<N>) -> Pattern {
    get_hints(guess, answer).to_pattern()
}

pub fn reduce(
    matrix: &PatternMatrix,
    possibilities: &[usize],
    guess: usize,
    pattern: Pattern,
) -> Vec<usize> {
    possibilities
        .iter()
        .copied()
        .filter(|&answer| matrix.get(guess, answer) == pattern)
        .collect()
}

pub fn reduce_words<const N: usize>(
    possibilities: &[WordN<N>],
    guess: &WordN<N>,
    pattern: Pattern,
) -> Vec<WordN<N>> {
    possibilities
        .iter()
        .filter(|candidate| pattern_of(guess, candidate) == pattern)
        .copied()
        .collect()
}
