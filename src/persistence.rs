// File: src/persistence.rs
use crate::core::types::{SessionResult, WordFrequencyRecord};
use crate::error::PersistenceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Integer bounds as written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceBounds {
    pub lower: u64,
    pub upper: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleWord {
    pub word: String,
    pub frequency: u64,
}

impl From<&WordFrequencyRecord> for ExampleWord {
    fn from(record: &WordFrequencyRecord) -> Self {
        Self {
            word: record.word.clone(),
            frequency: record.frequency,
        }
    }
}

/// The persisted summary of one word length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthReport {
    pub breakpoint: u64,
    pub confidence: ConfidenceBounds,
    pub examples: Vec<ExampleWord>,
    pub samples: usize,
    #[serde(default)]
    pub all_acceptable: bool,
    #[serde(default)]
    pub stopped_early: bool,
}

impl From<&SessionResult> for LengthReport {
    fn from(result: &SessionResult) -> Self {
        let round = |v: f64| if v.is_finite() && v > 0.0 { v.round() as u64 } else { 0 };
        Self {
            breakpoint: round(result.model.threshold),
            confidence: ConfidenceBounds {
                lower: round(result.model.confidence.lower),
                upper: round(result.model.confidence.upper),
            },
            examples: result.examples.iter().map(ExampleWord::from).collect(),
            samples: result.samples,
            all_acceptable: result.model.all_acceptable,
            stopped_early: result.stopped_early,
        }
    }
}

/// Everything a full run produces, keyed by word length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsRecord {
    pub generated_at: DateTime<Utc>,
    pub lengths: BTreeMap<usize, LengthReport>,
}

impl ResultsRecord {
    pub fn from_results(results: &[SessionResult]) -> Self {
        Self {
            generated_at: Utc::now(),
            lengths: results
                .iter()
                .map(|r| (r.word_length, LengthReport::from(r)))
                .collect(),
        }
    }
}

/// Writes the record as pretty JSON. The file is replaced atomically.
pub fn save_results(record: &ResultsRecord, path: &Path) -> Result<(), PersistenceError> {
    let io_err = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(io_err)?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, record)?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }

    temp_file.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

pub fn load_results(path: &Path) -> Result<ResultsRecord, PersistenceError> {
    let file = File::open(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}
