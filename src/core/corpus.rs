// File: src/core/corpus.rs
use crate::core::types::WordFrequencyRecord;
use crate::error::CorpusError;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Lowercased set of words eligible for sampling.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    words: HashSet<String>,
}

impl AllowList {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Reads an allow-list file with one word per line. Blank lines are ignored.
pub fn load_allow_list(path: &Path) -> Result<AllowList, CorpusError> {
    let raw = fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let allow = AllowList::from_words(raw.lines());
    info!(path = %path.display(), words = allow.len(), "loaded allow-list");
    Ok(allow)
}

/// Reads a delimited corpus with a header row holding `word` and `count` columns.
/// Rows with a non-alphabetic word, an unparsable count or bytes that are not
/// UTF-8 are skipped. Only I/O failures abort the load.
pub fn load_frequencies(path: &Path, delimiter: u8) -> Result<Vec<WordFrequencyRecord>, CorpusError> {
    let csv_err = |source| CorpusError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or(CorpusError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
    };
    let word_col = column("word")?;
    let count_col = column("count")?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.byte_records() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(csv_err(e)),
            Err(e) => {
                debug!(error = %e, "skipping undecodable corpus row");
                skipped += 1;
                continue;
            }
        };
        let field = |col: usize| row.get(col).and_then(|f| std::str::from_utf8(f).ok());
        let word = field(word_col).map(|w| w.trim().to_lowercase());
        let count = field(count_col).and_then(|c| c.trim().parse::<u64>().ok());
        match (word, count) {
            (Some(word), Some(count)) if !word.is_empty() && word.chars().all(char::is_alphabetic) => {
                records.push(WordFrequencyRecord::new(word, count));
            }
            _ => skipped += 1,
        }
    }

    info!(path = %path.display(), records = records.len(), skipped, "loaded frequency corpus");
    Ok(records)
}

/// Frequency-sorted words of a single length, restricted to the allow-list.
/// Counts are non-increasing from index 0; built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct CorpusView {
    word_length: usize,
    records: Vec<WordFrequencyRecord>,
}

impl CorpusView {
    /// Filters `records` down to `word_length` characters and allow-listed words.
    /// A word listed more than once keeps its highest count.
    /// Complexity: O(n log n) in the number of matching records.
    pub fn build(records: &[WordFrequencyRecord], allow: &AllowList, word_length: usize) -> Self {
        let mut best: HashMap<String, u64> = HashMap::new();
        for record in records {
            let word = record.word.to_lowercase();
            if word.chars().count() != word_length || !allow.contains(&word) {
                continue;
            }
            let entry = best.entry(word).or_insert(0);
            *entry = (*entry).max(record.frequency);
        }

        let mut records: Vec<WordFrequencyRecord> = best
            .into_iter()
            .map(|(word, frequency)| WordFrequencyRecord { word, frequency })
            .collect();
        records.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.word.cmp(&b.word)));

        debug!(word_length, words = records.len(), "built corpus view");
        Self { word_length, records }
    }

    pub fn word_length(&self) -> usize {
        self.word_length
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[WordFrequencyRecord] {
        &self.records
    }

    /// The `k` words whose count is closest to `frequency`, nearest first.
    pub fn nearest(&self, frequency: f64, k: usize) -> Vec<WordFrequencyRecord> {
        let mut ranked: Vec<&WordFrequencyRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| {
            let da = (a.frequency as f64 - frequency).abs();
            let db = (b.frequency as f64 - frequency).abs();
            da.total_cmp(&db)
        });
        ranked.into_iter().take(k).cloned().collect()
    }
}
