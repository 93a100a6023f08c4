use std::collections::BTreeMap;

use fxhash::FxHashMap;
use log::debug;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::structs::WordN;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorParams {
    pub n_common: usize,
    pub width: f64,
}

impl Default for PriorParams {
    fn default() -> Self {
        Self {
            n_common: 3000,
            width: 10.,
        }
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1. / (1. + (-x).exp())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriorWeights<const N: usize> {
    weights: FxHashMap<WordN<N>, f64>,
}

impl<const N: usize> PriorWeights<N> {
    pub fn get(&self, word: &WordN<N>) -> f64 {
        self.weights.get(word).copied().unwrap_or(0.)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn membership<'a>(words: impl IntoIterator<Item = &'a WordN<N>>) -> Self {
        Self {
            weights: words.into_iter().map(|&w| (w, 1.)).collect(),
        }
    }

    pub fn normalized(&self, words: &[WordN<N>], indices: &[usize]) -> Vec<f64> {
        let raw = indices
            .iter()
            .map(|&i| self.get(&words[i]))
            .collect::<Vec<_>>();
        let total: f64 = raw.iter().sum();
        if total == 0. {
            return vec![0.; raw.len()];
        }
        raw.into_iter().map(|w| w / total).collect()
    }
}

impl<const N: usize> FromIterator<(WordN<N>, f64)> for PriorWeights<N> {
    fn from_iter<I: IntoIterator<Item = (WordN<N>, f64)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}

/// Turns mean usage frequencies into priors.
///
/// Words are sorted from rarest to most common and spread evenly over
/// `params.width` units of the number line, shifted so that exactly the
/// `params.n_common` most common words land right of zero, then passed
/// through a sigmoid. Entries that are not valid words are ignored.
pub fn priors<const N: usize>(
    frequencies: &BTreeMap<String, f64>,
    params: PriorParams,
) -> PriorWeights<N> {
    let mut ranked = frequencies
        .iter()
        .filter_map(|(word, &freq)| WordN::<N>::try_from(word.as_str()).ok().map(|w| (w, freq)))
        .collect::<Vec<_>>();
    let skipped = frequencies.len() - ranked.len();
    if skipped > 0 {
        debug!("Skipped {skipped} frequency entries that are not {N}-letter words");
    }

    ranked.sort_by(|(w1, f1), (w2, f2)| f1.total_cmp(f2).then_with(|| w1.cmp(w2)));

    let n = ranked.len();
    if n == 0 {
        return PriorWeights::default();
    }
    let width = params.width;
    let center = width * (params.n_common as f64 / n as f64 - 0.5);

    ranked
        .into_iter()
        .zip(Array1::linspace(center - width / 2., center + width / 2., n).into_iter())
        .map(|((word, _), x)| (word, sigmoid(x)))
        .collect()
}
