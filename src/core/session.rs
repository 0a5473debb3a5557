use crate::core::cluster::cluster;
use crate::core::corpus::CorpusView;
use crate::core::estimator::{EstimatorConfig, ThresholdEstimator};
use crate::core::sampling::{choose_strategy, position, AdaptiveCutoffs, SamplingStrategy};
use crate::core::types::{ClusterObservation, SessionResult, ThresholdModel};
use crate::error::SessionError;
use crate::judgment::{is_affirmative, parse_bad_count};
use crate::operator::{Operator, SamplePresentation};
use rand::Rng;
use tracing::{debug, info};

/// Fixed parameters of one per-length session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub sample_count: usize,
    pub cluster_size: usize,
    /// Early termination is never offered with fewer observations than this.
    pub checkpoint_min_samples: usize,
    /// Early termination is offered while `upper / lower` is below this.
    pub confidence_ratio: f64,
    pub example_count: usize,
    pub cutoffs: AdaptiveCutoffs,
    pub estimator: EstimatorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_count: 10,
            cluster_size: 10,
            checkpoint_min_samples: 5,
            confidence_ratio: 3.0,
            example_count: 5,
            cutoffs: AdaptiveCutoffs::default(),
            estimator: EstimatorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Sampling,
    ConfidentCheckpoint,
    Done,
}

/// Drives one word length from the first sample to a result.
///
/// Owns the observation list; the model is refit from scratch after every
/// observation and never updated in place.
pub struct SessionDriver<'v> {
    view: &'v CorpusView,
    config: SessionConfig,
    estimator: ThresholdEstimator,
    observations: Vec<ClusterObservation>,
    model: Option<ThresholdModel>,
    state: SessionState,
    stopped_early: bool,
}

impl<'v> SessionDriver<'v> {
    pub fn new(view: &'v CorpusView, mut config: SessionConfig) -> Result<Self, SessionError> {
        // A window never reaches the last word, so two words is the least that yields a cluster.
        if view.len() < 2 {
            return Err(SessionError::InsufficientWords {
                word_length: view.word_length(),
                required: 2,
                actual: view.len(),
            });
        }
        config.sample_count = config.sample_count.max(1);
        // Below two, a draw at the last index yields an empty window.
        config.cluster_size = config.cluster_size.max(2);

        Ok(Self {
            view,
            estimator: ThresholdEstimator::new(config.estimator),
            config,
            observations: Vec::with_capacity(config.sample_count),
            model: None,
            state: SessionState::Sampling,
            stopped_early: false,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn observations(&self) -> &[ClusterObservation] {
        &self.observations
    }

    pub fn model(&self) -> Option<&ThresholdModel> {
        self.model.as_ref()
    }

    pub fn next_strategy(&self) -> SamplingStrategy {
        choose_strategy(self.observations.len(), &self.observations, self.config.cutoffs)
    }

    /// True when enough observations exist and the current interval is narrow.
    /// Evaluated on the live model each time; narrowing is not monotone.
    pub fn checkpoint_reached(&self) -> bool {
        self.observations.len() >= self.config.checkpoint_min_samples
            && self
                .model
                .map(|m| m.confidence.ratio() < self.config.confidence_ratio)
                .unwrap_or(false)
    }

    /// Appends an observation, refits and moves the state machine.
    pub fn record(&mut self, observation: ClusterObservation) -> Option<&ThresholdModel> {
        self.observations.push(observation);
        self.model = self.estimator.estimate(&self.observations);

        if let Some(model) = &self.model {
            debug!(
                samples = self.observations.len(),
                threshold = model.threshold,
                lower = model.confidence.lower,
                upper = model.confidence.upper,
                all_acceptable = model.all_acceptable,
                "refit threshold model"
            );
        }

        self.state = if self.observations.len() >= self.config.sample_count {
            SessionState::Done
        } else if self.checkpoint_reached() {
            SessionState::ConfidentCheckpoint
        } else {
            SessionState::Sampling
        };
        self.model.as_ref()
    }

    /// Runs the session to completion against `operator`.
    pub fn run<R, O>(mut self, rng: &mut R, operator: &mut O) -> Result<SessionResult, SessionError>
    where
        R: Rng + ?Sized,
        O: Operator + ?Sized,
    {
        loop {
            match self.state {
                SessionState::Sampling => self.sample_once(rng, operator)?,
                SessionState::ConfidentCheckpoint => self.offer_early_stop(operator)?,
                SessionState::Done => break,
            }
        }
        self.finish()
    }

    fn sample_once<R, O>(&mut self, rng: &mut R, operator: &mut O) -> Result<(), SessionError>
    where
        R: Rng + ?Sized,
        O: Operator + ?Sized,
    {
        let strategy = self.next_strategy();
        let center = position(self.view.len(), strategy, rng);
        let words = cluster(self.view.records(), center, self.config.cluster_size);

        operator.present(&SamplePresentation {
            word_length: self.view.word_length(),
            sample_number: self.observations.len() + 1,
            sample_count: self.config.sample_count,
            strategy,
            center_index: center,
            words,
            model: self.model.as_ref(),
        });

        let reply = operator.ask(&format!(
            "How many of these {} words are too obscure? (0-{}): ",
            words.len(),
            words.len()
        ))?;
        let bad_count = parse_bad_count(&reply, words.len());
        let observation = ClusterObservation::new(words.to_vec(), center, bad_count);
        debug!(
            %strategy,
            center,
            bad_count,
            ratio = observation.acceptance_ratio,
            avg_frequency = observation.avg_frequency,
            "recorded observation"
        );

        if let Some(model) = self.record(observation).copied() {
            operator.report_model(&model);
        }
        Ok(())
    }

    fn offer_early_stop<O>(&mut self, operator: &mut O) -> Result<(), SessionError>
    where
        O: Operator + ?Sized,
    {
        let prompt = match &self.model {
            Some(m) => format!(
                "Estimate is stable at ~{:.0} ({:.0}-{:.0}). Keep sampling? [y/N]: ",
                m.threshold, m.confidence.lower, m.confidence.upper
            ),
            None => "Keep sampling? [y/N]: ".to_string(),
        };

        if is_affirmative(&operator.ask(&prompt)?) {
            self.state = SessionState::Sampling;
        } else {
            info!(
                word_length = self.view.word_length(),
                samples = self.observations.len(),
                "operator accepted early termination"
            );
            self.stopped_early = true;
            self.state = SessionState::Done;
        }
        Ok(())
    }

    /// Packages the final model with nearby example words from the same view.
    pub fn finish(self) -> Result<SessionResult, SessionError> {
        let model = self.model.ok_or(SessionError::NoObservations {
            word_length: self.view.word_length(),
        })?;
        Ok(SessionResult {
            word_length: self.view.word_length(),
            examples: self.view.nearest(model.threshold, self.config.example_count),
            model,
            samples: self.observations.len(),
            stopped_early: self.stopped_early,
        })
    }
}
