use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use itertools::iproduct;
use log::{info, warn};
use ndarray::{s, Array2, Array3, Array4, ArrayView1, Axis, Zip};
use once_cell::sync::OnceCell;
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::EngineError;
use crate::structs::{Corpus, Pattern, WordN};

const MAGIC: &[u8; 4] = b"CPM1";
const HEADER_LEN: usize = 4 + 3 * 8;

const EXACT: u8 = 2;
const MISPLACED: u8 = 1;

/// Patterns of every guess against every answer of one block of words.
///
/// Works on the whole block at once: `equal[[g, a, i, j]]` records whether
/// letter `i` of guess `g` equals letter `j` of answer `a`, and letters are
/// claimed by clearing their row (guess side) and column (answer side).
pub fn pattern_matrix<const N: usize>(guesses: &[WordN<N>], answers: &[WordN<N>]) -> Array2<u8> {
    let (ng, na) = (guesses.len(), answers.len());

    let mut equal = Array4::from_shape_fn((ng, na, N, N), |(g, a, i, j)| {
        guesses[g].0[i] == answers[a].0[j]
    });
    let mut colors = Array3::<u8>::zeros((ng, na, N));

    for i in 0..N {
        let matches = equal.slice(s![.., .., i, i]).to_owned();
        mark(&mut colors, &matches, i, EXACT);
        for k in 0..N {
            clear(&mut equal, &matches, k, i);
            clear(&mut equal, &matches, i, k);
        }
    }

    for (i, j) in iproduct!(0..N, 0..N) {
        let matches = equal.slice(s![.., .., i, j]).to_owned();
        mark(&mut colors, &matches, i, MISPLACED);
        for k in 0..N {
            clear(&mut equal, &matches, k, j);
            clear(&mut equal, &matches, i, k);
        }
    }

    let mut patterns = Array2::<u8>::zeros((ng, na));
    Zip::from(&mut patterns)
        .and(colors.lanes(Axis(2)))
        .for_each(|pattern, lane| {
            *pattern = lane.iter().rev().fold(0u8, |acc, &color| acc * 3 + color);
        });

    patterns
}

fn mark(colors: &mut Array3<u8>, matches: &Array2<bool>, position: usize, color: u8) {
    Zip::from(colors.slice_mut(s![.., .., position]))
        .and(matches)
        .for_each(|c, &m| {
            if m {
                *c = color;
            }
        });
}

fn clear(equal: &mut Array4<bool>, matches: &Array2<bool>, i: usize, j: usize) {
    Zip::from(equal.slice_mut(s![.., .., i, j]))
        .and(matches)
        .for_each(|e, &m| {
            if m {
                *e = false;
            }
        });
}

pub fn pattern_matrix_in_blocks<const N: usize>(
    guesses: &[WordN<N>],
    answers: &[WordN<N>],
    block: usize,
) -> Array2<u8> {
    let block = block.max(1);
    let tiles = iproduct!(
        (0..guesses.len()).step_by(block),
        (0..answers.len()).step_by(block)
    )
    .collect::<Vec<_>>();

    #[cfg(feature = "parallel")]
    let tiles_iter = tiles.into_par_iter();

    #[cfg(not(feature = "parallel"))]
    let tiles_iter = tiles.into_iter();

    let computed = tiles_iter
        .map(|(g0, a0)| {
            let g1 = (g0 + block).min(guesses.len());
            let a1 = (a0 + block).min(answers.len());
            (g0, a0, pattern_matrix(&guesses[g0..g1], &answers[a0..a1]))
        })
        .collect::<Vec<_>>();

    let mut full = Array2::<u8>::zeros((guesses.len(), answers.len()));
    for (g0, a0, tile) in computed {
        let (rows, cols) = tile.dim();
        full.slice_mut(s![g0..g0 + rows, a0..a0 + cols])
            .assign(&tile);
    }

    full
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatrix {
    // rows are guesses, columns are answers
    patterns: Array2<u8>,
    fingerprint: u64,
}

impl PatternMatrix {
    pub fn build<const N: usize>(corpus: &Corpus<N>, block: usize) -> Self {
        let patterns = pattern_matrix_in_blocks(corpus.guesses(), corpus.answers(), block);
        Self {
            patterns,
            fingerprint: corpus.fingerprint(),
        }
    }

    pub fn get(&self, guess: usize, answer: usize) -> Pattern {
        Pattern::from_raw(self.patterns[[guess, answer]])
    }

    pub fn row(&self, guess: usize) -> ArrayView1<u8> {
        self.patterns.row(guess)
    }

    pub fn dim(&self) -> (usize, usize) {
        self.patterns.dim()
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn check<const N: usize>(&self, corpus: &Corpus<N>, path: &Path) -> Result<(), EngineError> {
        let expected = (corpus.guesses().len(), corpus.answers().len());
        if self.dim() != expected {
            return Err(inconsistent(
                path,
                format!("shape {:?}, expected {:?}", self.dim(), expected),
            ));
        }
        if self.fingerprint != corpus.fingerprint() {
            return Err(inconsistent(path, "word order changed".to_string()));
        }
        Ok(())
    }

    /// Writes to a temporary file next to `path` and renames it into place,
    /// so readers never see a partially written matrix.
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension(format!("tmp{}", std::process::id()));
        let (rows, cols) = self.dim();

        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            writer.write_all(MAGIC)?;
            writer.write_all(&(rows as u64).to_le_bytes())?;
            writer.write_all(&(cols as u64).to_le_bytes())?;
            writer.write_all(&self.fingerprint.to_le_bytes())?;
            let bytes = self.patterns.iter().copied().collect::<Vec<_>>();
            writer.write_all(&bytes)?;
            writer.flush()?;
        }

        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn load<const N: usize>(path: &Path, corpus: &Corpus<N>) -> Result<Self, EngineError> {
        let bytes = fs::read(path)?;
        if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
            return Err(inconsistent(path, "not a pattern matrix file".to_string()));
        }

        let read_u64 = |offset: usize| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[offset..offset + 8]);
            u64::from_le_bytes(buf)
        };
        let rows = read_u64(4) as usize;
        let cols = read_u64(12) as usize;
        let fingerprint = read_u64(20);

        let data = bytes[HEADER_LEN..].to_vec();
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(inconsistent(
                path,
                format!("{} bytes of data for shape ({rows}, {cols})", data.len()),
            ));
        }
        let count = Pattern::count::<N>();
        if data.iter().any(|&p| p as usize >= count) {
            return Err(inconsistent(path, "pattern out of range".to_string()));
        }

        let patterns = Array2::from_shape_vec((rows, cols), data)
            .map_err(|err| inconsistent(path, err.to_string()))?;
        let matrix = Self {
            patterns,
            fingerprint,
        };
        matrix.check(corpus, path)?;

        Ok(matrix)
    }

    pub fn load_or_build<const N: usize>(
        path: &Path,
        corpus: &Corpus<N>,
        block: usize,
    ) -> Result<Self, EngineError> {
        if path.exists() {
            match Self::load(path, corpus) {
                Ok(matrix) => {
                    info!("Loaded pattern matrix from {}", path.display());
                    return Ok(matrix);
                }
                Err(err @ EngineError::CacheInconsistency { .. }) => {
                    warn!("{err}, regenerating");
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            "Generating {}x{} pattern matrix, this only happens once",
            corpus.guesses().len(),
            corpus.answers().len()
        );
        let matrix = Self::build(corpus, block);
        matrix.save(path)?;
        info!("Saved pattern matrix to {}", path.display());

        Ok(matrix)
    }
}

fn inconsistent(path: &Path, reason: String) -> EngineError {
    EngineError::CacheInconsistency {
        path: path.to_path_buf(),
        reason,
    }
}

#[derive(Debug)]
pub struct PatternStore {
    path: PathBuf,
    block: usize,
    cell: OnceCell<Arc<PatternMatrix>>,
    loads: AtomicUsize,
}

impl PatternStore {
    pub fn new(path: impl Into<PathBuf>, block: usize) -> Self {
        Self {
            path: path.into(),
            block,
            cell: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn get<const N: usize>(&self, corpus: &Corpus<N>) -> Result<Arc<PatternMatrix>, EngineError> {
        let matrix = self.cell.get_or_try_init(|| {
            self.loads.fetch_add(1, Ordering::SeqCst);
            PatternMatrix::load_or_build(&self.path, corpus, self.block).map(Arc::new)
        })?;
        Ok(Arc::clone(matrix))
    }
}
