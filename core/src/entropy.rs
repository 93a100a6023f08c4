use ndarray::{Array1, ArrayView1};
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    algo,
    pattern_matrix::PatternMatrix,
    structs::{Pattern, WordN},
};

pub fn entropy(arr: Array1<f64>) -> f64 {
    let total = arr.sum();
    if total <= 0. {
        return 0.;
    }

    let arr = arr
        .into_iter()
        .filter(|&x| x > 0.)
        .map(|x| x / total)
        .collect::<Array1<f64>>();

    let arr_log = {
        let mut arr_log = arr.clone();
        arr_log.mapv_inplace(|x| x.log2());
        arr_log
    };

    (-1. * (arr * arr_log).sum()).max(0.)
}

pub fn pattern_distribution<const N: usize>(
    row: ArrayView1<u8>,
    possibilities: &[usize],
    weights: &[f64],
) -> Array1<f64> {
    let mut buckets = Array1::<f64>::zeros(Pattern::count::<N>());
    for (&answer, &weight) in possibilities.iter().zip(weights) {
        buckets[row[answer] as usize] += weight;
    }
    buckets
}

pub fn entropy_of_guess<const N: usize>(
    matrix: &PatternMatrix,
    guess: usize,
    possibilities: &[usize],
    weights: &[f64],
) -> f64 {
    entropy(pattern_distribution::<N>(
        matrix.row(guess),
        possibilities,
        weights,
    ))
}

pub fn word_entropy<const N: usize>(
    guess: &WordN<N>,
    possibilities: &[WordN<N>],
    weights: &[f64],
) -> f64 {
    let mut buckets = Array1::<f64>::zeros(Pattern::count::<N>());
    for (answer, &weight) in possibilities.iter().zip(weights) {
        buckets[algo::pattern_of(guess, answer).index()] += weight;
    }
    entropy(buckets)
}

pub fn calculate_entropies<const N: usize>(
    matrix: &PatternMatrix,
    possibilities: &[usize],
    weights: &[f64],
) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    let (guesses, _) = matrix.dim();
    if total <= 0. {
        return vec![0.; guesses];
    }

    #[cfg(feature = "parallel")]
    let guess_iter = (0..guesses).into_par_iter();

    #[cfg(not(feature = "parallel"))]
    let guess_iter = 0..guesses;

    guess_iter
        .map(|guess| entropy_of_guess::<N>(matrix, guess, possibilities, weights))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::Corpus;
    use ndarray::array;
    use rstest::rstest;

    type Word = WordN<5>;

    fn words(list: &[&str]) -> Vec<Word> {
        list.iter().map(|w| Word::try_from(*w).unwrap()).collect()
    }

    #[rstest]
    #[case(array![1., 1.], 1.)]
    #[case(array![0.25, 0.25, 0.25, 0.25], 2.)]
    #[case(array![3., 0., 0.], 0.)]
    #[case(array![0., 0.], 0.)]
    #[case(array![2., 2., 0., 4.], 1.5)]
    fn entropy_values(#[case] arr: Array1<f64>, #[case] expected: f64) {
        assert!((entropy(arr) - expected).abs() < 1e-12);
    }

    #[test]
    fn single_pattern_has_no_information() {
        // none of these share a letter with the guess
        let possibilities = words(&["fluty", "dumpy", "kiosk"]);
        let e = word_entropy(&Word::try_from("crane").unwrap(), &possibilities, &[0.2, 0.3, 0.5]);
        assert_eq!(e, 0.);
    }

    #[test]
    fn zero_weight_possibilities_do_not_count() {
        let possibilities = words(&["crane", "slate", "trace"]);
        let guess = Word::try_from("crane").unwrap();
        assert_eq!(word_entropy(&guess, &possibilities, &[0., 0., 0.]), 0.);
        assert_eq!(word_entropy(&guess, &possibilities, &[0., 1., 0.]), 0.);
        let e = word_entropy(&guess, &possibilities, &[0., 0.5, 0.5]);
        assert!((e - 1.).abs() < 1e-12);
    }

    #[test]
    fn matrix_entropies_match_word_entropies() {
        let list = ["crane", "slate", "trace", "crate", "react", "speed", "erase"];
        let corpus = Corpus::new(words(&list), words(&list[..5]));
        let matrix = PatternMatrix::build(&corpus, 3);
        let possibilities = vec![0, 2, 3, 4];
        let weights = vec![0.1, 0.2, 0.3, 0.4];
        let answers = possibilities
            .iter()
            .map(|&i| corpus.answers()[i])
            .collect::<Vec<_>>();

        let entropies = calculate_entropies::<5>(&matrix, &possibilities, &weights);
        assert_eq!(entropies.len(), list.len());
        for (guess, &e) in corpus.guesses().iter().zip(&entropies) {
            assert!(e >= 0.);
            assert!((e - word_entropy(guess, &answers, &weights)).abs() < 1e-12);
        }
    }
}
