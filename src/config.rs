use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::estimator::EstimatorConfig;
use crate::core::sampling::AdaptiveCutoffs;
use crate::core::session::SessionConfig;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub estimator: EstimatorSettings,
    #[serde(default)]
    pub run: RunConfig,
}

impl AppConfig {
    /// Loads from `explicit`, else `$WORD_THRESHOLD_CONFIG`, else the user config dir.
    /// A missing file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = explicit.map(Path::to_path_buf).or_else(resolve_config_path);
        match config_path {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(AppConfig::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let parsed: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("failed to parse TOML from {}", path.display()))?;
        Ok(parsed)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            sample_count: self.session.sample_count,
            cluster_size: self.session.cluster_size,
            checkpoint_min_samples: self.session.checkpoint_min_samples,
            confidence_ratio: self.session.confidence_ratio,
            example_count: self.session.example_count,
            cutoffs: AdaptiveCutoffs {
                mostly_accepted: self.estimator.mostly_accepted,
                mostly_rejected: self.estimator.mostly_rejected,
            },
            estimator: EstimatorConfig {
                all_acceptable_cutoff: self.estimator.all_acceptable_cutoff,
            },
        }
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("WORD_THRESHOLD_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|base| base.join("word-threshold").join("config.toml"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_path")]
    pub path: PathBuf,
    #[serde(default = "default_allow_list_path")]
    pub allow_list: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
            allow_list: default_allow_list_path(),
            delimiter: default_delimiter(),
        }
    }
}

impl CorpusConfig {
    /// The delimiter as the single byte the csv reader wants. Non-ASCII falls back to a comma.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("data/word_frequencies.csv")
}

fn default_allow_list_path() -> PathBuf {
    PathBuf::from("data/allowed_words.txt")
}

fn default_delimiter() -> char {
    ','
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    #[serde(default = "default_cluster_size")]
    pub cluster_size: usize,
    #[serde(default = "default_checkpoint_min_samples")]
    pub checkpoint_min_samples: usize,
    #[serde(default = "default_confidence_ratio")]
    pub confidence_ratio: f64,
    #[serde(default = "default_example_count")]
    pub example_count: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            cluster_size: default_cluster_size(),
            checkpoint_min_samples: default_checkpoint_min_samples(),
            confidence_ratio: default_confidence_ratio(),
            example_count: default_example_count(),
            seed: None,
        }
    }
}

fn default_sample_count() -> usize {
    10
}

fn default_cluster_size() -> usize {
    10
}

fn default_checkpoint_min_samples() -> usize {
    5
}

fn default_confidence_ratio() -> f64 {
    3.0
}

fn default_example_count() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct EstimatorSettings {
    #[serde(default = "default_all_acceptable_cutoff")]
    pub all_acceptable_cutoff: f64,
    #[serde(default = "default_mostly_accepted")]
    pub mostly_accepted: f64,
    #[serde(default = "default_mostly_rejected")]
    pub mostly_rejected: f64,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            all_acceptable_cutoff: default_all_acceptable_cutoff(),
            mostly_accepted: default_mostly_accepted(),
            mostly_rejected: default_mostly_rejected(),
        }
    }
}

fn default_all_acceptable_cutoff() -> f64 {
    0.7
}

fn default_mostly_accepted() -> f64 {
    0.7
}

fn default_mostly_rejected() -> f64 {
    0.3
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_word_lengths")]
    pub word_lengths: Vec<usize>,
    #[serde(default = "default_min_eligible_words")]
    pub min_eligible_words: usize,
    #[serde(default = "default_output_path")]
    pub output: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            word_lengths: default_word_lengths(),
            min_eligible_words: default_min_eligible_words(),
            output: default_output_path(),
        }
    }
}

fn default_word_lengths() -> Vec<usize> {
    vec![4, 5, 6, 7]
}

fn default_min_eligible_words() -> usize {
    20
}

fn default_output_path() -> PathBuf {
    PathBuf::from("frequency_thresholds.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.run.word_lengths, vec![4, 5, 6, 7]);
        assert_eq!(config.run.min_eligible_words, 20);
        assert_eq!(config.session_config(), SessionConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [corpus]
            delimiter = "\t"

            [session]
            sample_count = 14
            seed = 42

            [estimator]
            all_acceptable_cutoff = 0.8
            "#,
        )
        .unwrap();
        assert_eq!(config.corpus.delimiter_byte(), b'\t');
        assert_eq!(config.corpus.path, default_corpus_path());
        assert_eq!(config.session.sample_count, 14);
        assert_eq!(config.session.cluster_size, 10);
        assert_eq!(config.session.seed, Some(42));
        let session = config.session_config();
        assert_eq!(session.estimator.all_acceptable_cutoff, 0.8);
        assert_eq!(session.cutoffs.mostly_rejected, 0.3);
    }

    #[test]
    fn explicit_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config.session.sample_count, 10);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[session]\nsample_count = \"many\"\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }
}
