// File: src/run.rs
use crate::core::corpus::{AllowList, CorpusView};
use crate::core::session::{SessionConfig, SessionDriver};
use crate::core::types::{SessionResult, WordFrequencyRecord};
use crate::error::SessionError;
use crate::judgment::is_affirmative;
use crate::operator::Operator;
use rand::Rng;
use tracing::{info, warn};

/// Parameters of a full multi-length run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub word_lengths: Vec<usize>,
    pub min_eligible_words: usize,
    pub session: SessionConfig,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            word_lengths: vec![4, 5, 6, 7],
            min_eligible_words: 20,
            session: SessionConfig::default(),
        }
    }
}

/// How each planned length ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LengthOutcome {
    Completed(SessionResult),
    Skipped { word_length: usize, eligible: usize },
}

/// Runs one session per word length in plan order.
///
/// Lengths with too few eligible words are skipped. Between lengths the
/// operator is asked whether to go on; anything but yes ends the run early.
pub fn run_all<R, O>(
    records: &[WordFrequencyRecord],
    allow: &AllowList,
    plan: &RunPlan,
    rng: &mut R,
    operator: &mut O,
) -> Result<Vec<LengthOutcome>, SessionError>
where
    R: Rng + ?Sized,
    O: Operator + ?Sized,
{
    let mut outcomes = Vec::with_capacity(plan.word_lengths.len());

    for (i, &word_length) in plan.word_lengths.iter().enumerate() {
        let view = CorpusView::build(records, allow, word_length);
        info!(word_length, eligible = view.len(), "starting word length");

        if view.len() < plan.min_eligible_words.max(2) {
            warn!(
                word_length,
                eligible = view.len(),
                required = plan.min_eligible_words,
                "too few eligible words, skipping length"
            );
            outcomes.push(LengthOutcome::Skipped {
                word_length,
                eligible: view.len(),
            });
        } else {
            let result = SessionDriver::new(&view, plan.session)?.run(rng, operator)?;
            info!(
                word_length,
                threshold = result.model.threshold,
                lower = result.model.confidence.lower,
                upper = result.model.confidence.upper,
                samples = result.samples,
                "finished word length"
            );
            outcomes.push(LengthOutcome::Completed(result));
        }

        if let Some(next) = plan.word_lengths.get(i + 1) {
            let reply = operator.ask(&format!("Proceed to {next}-letter words? [y/N]: "))?;
            if !is_affirmative(&reply) {
                info!(stopped_before = *next, "operator ended the run");
                break;
            }
        }
    }

    Ok(outcomes)
}

/// The completed sessions of a run, in plan order.
pub fn completed(outcomes: &[LengthOutcome]) -> Vec<SessionResult> {
    outcomes
        .iter()
        .filter_map(|o| match o {
            LengthOutcome::Completed(r) => Some(r.clone()),
            LengthOutcome::Skipped { .. } => None,
        })
        .collect()
}
