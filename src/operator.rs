// File: src/operator.rs
use crate::core::sampling::SamplingStrategy;
use crate::core::types::{ThresholdModel, WordFrequencyRecord};
use std::collections::VecDeque;
use std::io;

/// What the operator is shown before judging a cluster.
#[derive(Debug, Clone, Copy)]
pub struct SamplePresentation<'a> {
    pub word_length: usize,
    /// 1-based.
    pub sample_number: usize,
    pub sample_count: usize,
    pub strategy: SamplingStrategy,
    pub center_index: usize,
    pub words: &'a [WordFrequencyRecord],
    /// Fit over everything collected before this sample.
    pub model: Option<&'a ThresholdModel>,
}

/// The human side of a session. `ask` blocks until a full line is available.
pub trait Operator {
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    fn present(&mut self, _sample: &SamplePresentation<'_>) {}

    /// Called after each refit.
    fn report_model(&mut self, _model: &ThresholdModel) {}
}

/// Answers prompts from a fixed queue. An exhausted queue answers with an empty line.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub presented: usize,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            presented: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Operator for ScriptedOperator {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }

    fn present(&mut self, _sample: &SamplePresentation<'_>) {
        self.presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_operator_replays_then_goes_quiet() {
        let mut op = ScriptedOperator::new(["2", "y"]);
        assert_eq!(op.ask("first").unwrap(), "2");
        assert_eq!(op.ask("second").unwrap(), "y");
        assert_eq!(op.ask("third").unwrap(), "");
        assert_eq!(op.prompts, vec!["first", "second", "third"]);
        assert_eq!(op.remaining(), 0);
    }
}
