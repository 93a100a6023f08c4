use crate::error::EngineError;
use crate::structs::{WordError, WordN};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

pub const FREQUENCY_SAMPLES: usize = 5;

pub fn load_words<P, const N: usize>(filename: P) -> Result<Vec<WordN<N>>, EngineError>
where
    P: AsRef<Path>,
{
    let path = filename.as_ref();
    let file = File::open(path).map_err(|source| EngineError::CorpusLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let mut words = vec![];
    for (i, line) in io::BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| EngineError::CorpusLoad {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let word = WordN::<N>::try_from(line.as_str()).map_err(|source| {
            EngineError::MalformedCorpus {
                path: path.to_path_buf(),
                line: i + 1,
                source,
            }
        })?;
        words.push(word);
    }

    if words.is_empty() {
        return Err(EngineError::EmptyCorpus(path.to_path_buf()));
    }
    debug!("Loaded {} words from {}", words.len(), path.display());

    Ok(words)
}

pub fn parse_words<'a, I, const N: usize>(lines: I) -> Result<Vec<WordN<N>>, WordError>
where
    I: Iterator<Item = &'a str>,
{
    lines
        .filter(|l| !l.trim().is_empty())
        .map(|l| WordN::<N>::try_from(l))
        .collect()
}

pub fn parse_frequencies<R: BufRead>(reader: R) -> Result<BTreeMap<String, f64>, EngineError> {
    let mut frequencies = BTreeMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let mut pieces = line.split_whitespace();
        let word = match pieces.next() {
            Some(word) => word.to_uppercase(),
            None => continue,
        };

        let malformed = || EngineError::MalformedFrequency {
            line: i + 1,
            text: line.clone(),
        };
        let samples = pieces
            .map(|piece| {
                piece
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .ok_or_else(malformed)
            })
            .collect::<Result<Vec<_>, _>>()?;
        if samples.is_empty() {
            return Err(malformed());
        }

        let recent = &samples[samples.len().saturating_sub(FREQUENCY_SAMPLES)..];
        let mean = recent.iter().sum::<f64>() / recent.len() as f64;
        frequencies.insert(word, mean);
    }

    Ok(frequencies)
}

pub fn load_frequencies<P, Q>(source: P, cache: Q) -> Result<BTreeMap<String, f64>, EngineError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let cache = cache.as_ref();
    if cache.exists() {
        let frequencies: BTreeMap<String, f64> =
            serde_json::from_reader(io::BufReader::new(File::open(cache)?))?;
        debug!("Read {} frequencies from {}", frequencies.len(), cache.display());
        return Ok(frequencies);
    }

    let source = source.as_ref();
    let frequencies = parse_frequencies(io::BufReader::new(File::open(source)?))?;
    info!(
        "Parsed {} frequencies from {}, caching to {}",
        frequencies.len(),
        source.display(),
        cache.display()
    );

    if let Some(parent) = cache.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = cache.with_extension(format!("tmp{}", std::process::id()));
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, &frequencies)?;
        writer.flush()?;
    }
    fs::rename(&tmp, cache)?;

    Ok(frequencies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cheatdle-data-{}-{name}", std::process::id()))
    }

    #[test]
    fn words_are_normalized() {
        let words = parse_words::<_, 5>("crane\nSlate\n\n trace \n".lines()).unwrap();
        let words = words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        assert_eq!(words, vec!["CRANE", "SLATE", "TRACE"]);
    }

    #[test]
    fn wrong_length_is_rejected_at_load() {
        let path = temp_path("words.txt");
        fs::write(&path, "crane\nslate\ntraces\n").unwrap();
        let err = load_words::<_, 5>(&path).unwrap_err();
        assert!(matches!(err, EngineError::MalformedCorpus { line: 3, .. }));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_word_list() {
        let err = load_words::<_, 5>(temp_path("does-not-exist.txt")).unwrap_err();
        assert!(matches!(err, EngineError::CorpusLoad { .. }));
    }

    #[test]
    fn frequencies_use_last_samples() {
        let text = "crane 100 1 2 3 4 5\nslate 2 4\n\nTRACE 7\n";
        let freqs = parse_frequencies(text.as_bytes()).unwrap();
        assert_eq!(freqs["CRANE"], 3.);
        assert_eq!(freqs["SLATE"], 3.);
        assert_eq!(freqs["TRACE"], 7.);
        assert_eq!(freqs.len(), 3);
    }

    #[rstest]
    #[case("crane 1 2\nslate x\n", 2)]
    #[case("crane\n", 1)]
    #[case("crane 1 nan\nslate 2 3\n", 1)]
    #[case("slate 2 3\ncrane inf\n", 2)]
    #[case("crane -inf 1\n", 1)]
    fn malformed_frequency_line(#[case] text: &str, #[case] expected: usize) {
        let err = parse_frequencies(text.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::MalformedFrequency { line, .. } if line == expected));
    }

    #[test]
    fn non_finite_frequencies_are_not_cached() {
        let source = temp_path("nan-freq.txt");
        let cache = temp_path("nan-freq.json");
        let _ = fs::remove_file(&cache);
        fs::write(&source, "crane 1 nan\nslate 2 3\n").unwrap();

        assert!(matches!(
            load_frequencies(&source, &cache),
            Err(EngineError::MalformedFrequency { line: 1, .. })
        ));
        assert!(!cache.exists());

        fs::write(&source, "crane 1 2\nslate 2 3\n").unwrap();
        let freqs = load_frequencies(&source, &cache).unwrap();
        assert_eq!(freqs["SLATE"], 2.5);

        fs::remove_file(&source).unwrap();
        fs::remove_file(&cache).unwrap();
    }

    #[test]
    fn frequency_cache_is_reused() {
        let source = temp_path("freq.txt");
        let cache = temp_path("freq.json");
        let _ = fs::remove_file(&cache);
        fs::write(&source, "crane 1 2 3\n").unwrap();

        let first = load_frequencies(&source, &cache).unwrap();
        assert!(cache.exists());

        // the cache wins over a changed source
        fs::write(&source, "crane 10\n").unwrap();
        let second = load_frequencies(&source, &cache).unwrap();
        assert_eq!(first, second);
        assert_eq!(second["CRANE"], 2.);

        fs::remove_file(&source).unwrap();
        fs::remove_file(&cache).unwrap();
    }
}
