use serde::{Deserialize, Serialize};
use store::{ImageKind, Record};
use thiserror::Error;

/// Candidate retrieval strategy for a search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Restrict candidates to the query's bucket and its neighbors.
    #[default]
    Bucketed,
    /// Compare against every enrolled record.
    FullScan,
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::Bucketed => "bucketed",
            SearchStrategy::FullScan => "full_scan",
        }
    }
}

/// Tuning knobs for the match engine.
///
/// `EngineConfig` is cheap to clone and serde-friendly so it can be embedded
/// in higher-level configs or loaded from the environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// A candidate matches when its Hamming distance is strictly below this.
    #[serde(default = "EngineConfig::default_threshold")]
    pub threshold: u32,
    /// How many buckets on each side of the query's bucket to include.
    #[serde(default = "EngineConfig::default_radius")]
    pub radius: u32,
    /// Candidate retrieval strategy.
    #[serde(default)]
    pub strategy: SearchStrategy,
    /// Score candidates on a rayon thread pool instead of serially.
    #[serde(default)]
    pub use_parallel: bool,
}

impl EngineConfig {
    pub(crate) fn default_threshold() -> u32 {
        10
    }

    pub(crate) fn default_radius() -> u32 {
        1
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.threshold == 0 {
            return Err(MatchError::InvalidConfig(
                "threshold must be greater than zero".into(),
            ));
        }
        if self.threshold > phash::FINGERPRINT_BITS as u32 {
            return Err(MatchError::InvalidConfig(format!(
                "threshold must not exceed {}",
                phash::FINGERPRINT_BITS
            )));
        }
        Ok(())
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
            radius: Self::default_radius(),
            strategy: SearchStrategy::default(),
            use_parallel: false,
        }
    }
}

/// A single search request: raw image bytes plus which capture they are.
#[derive(Debug, Clone)]
pub struct MatchQuery {
    pub image: Vec<u8>,
    pub kind: ImageKind,
}

impl MatchQuery {
    pub fn new(image: Vec<u8>, kind: ImageKind) -> Self {
        Self { image, kind }
    }
}

/// Outcome of one search.
///
/// `record` and `distance` name the closest candidate whether or not it
/// cleared the threshold; `matched` is the decision. An empty candidate set
/// leaves both unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchOutcome {
    pub matched: bool,
    pub record: Option<Record>,
    pub distance: Option<u32>,
}

impl MatchOutcome {
    pub fn no_match() -> Self {
        Self {
            matched: false,
            record: None,
            distance: None,
        }
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid engine configuration.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
    /// Query image could not be decoded or fingerprinted.
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] phash::HashError),
}
