//! Verity Generative Classification Client
//!
//! Wraps an external generative-language capability behind the
//! `GenerativeClassifier` trait from `verity-domain`.
//!
//! # Architecture
//!
//! - [`prompt`]: builds the structured-output prompts (standard vs deep)
//! - [`gemini`]: the Gemini REST provider with bounded retry
//! - [`parser`]: strips formatting wrappers, parses the model's JSON, and
//!   normalizes every field into the documented ranges and defaults
//! - [`MockClassifier`]: deterministic provider for tests
//!
//! # Examples
//!
//! ```
//! use verity_llm::MockClassifier;
//! use verity_domain::Classification;
//!
//! let provider = MockClassifier::succeeding(Classification::Authentic);
//! assert_eq!(provider.call_count(), 0);
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod parser;
pub mod prompt;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use verity_domain::{
    AnalysisDepth, AnalysisPath, Classification, ClassificationResult, ClassifyError, Confidence,
    Features, GenerativeClassifier, Metadata, Prediction, Verification,
};

pub use gemini::GeminiClassifier;
pub use parser::parse_analysis;
pub use prompt::PromptBuilder;

/// Nominal processing time reported for quick and real-time analyses.
/// A declarative label for downstream display, not a measured latency.
pub const NOMINAL_PROCESSING_TIME_QUICK: f64 = 2.5;

/// Nominal processing time reported for deep analyses
pub const NOMINAL_PROCESSING_TIME_DEEP: f64 = 4.0;

/// How a [`MockClassifier`] should behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockBehavior {
    /// Always succeed with the configured classification
    Succeed,
    /// Always fail with an upstream error
    FailUpstream,
    /// Always fail with a parse error
    FailParse,
}

/// Deterministic generative provider for tests.
///
/// Counts calls and can be scripted to fail a fixed number of times before
/// succeeding, which is how the pipeline's cascade tests verify attempt
/// counts.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    classification: Classification,
    behavior: MockBehavior,
    failures_before_success: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl MockClassifier {
    /// A provider that always succeeds with the given classification
    pub fn succeeding(classification: Classification) -> Self {
        Self {
            classification,
            behavior: MockBehavior::Succeed,
            failures_before_success: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider that always fails with an upstream error
    pub fn failing() -> Self {
        Self {
            classification: Classification::Unknown,
            behavior: MockBehavior::FailUpstream,
            failures_before_success: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider that always fails with a parse error
    pub fn failing_parse() -> Self {
        Self {
            behavior: MockBehavior::FailParse,
            ..Self::failing()
        }
    }

    /// A provider that fails `n` times (upstream), then succeeds
    pub fn failing_times(n: usize, classification: Classification) -> Self {
        Self {
            classification,
            behavior: MockBehavior::Succeed,
            failures_before_success: Arc::new(AtomicUsize::new(n)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times `classify` was called (shared across clones)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn canned_result(
        &self,
        source_url: Option<&str>,
        depth: AnalysisDepth,
    ) -> ClassificationResult {
        let processing_time = if depth.is_deep() {
            NOMINAL_PROCESSING_TIME_DEEP
        } else {
            NOMINAL_PROCESSING_TIME_QUICK
        };
        ClassificationResult {
            prediction: Prediction {
                classification: self.classification,
                confidence: Confidence::clamped(0.9),
                reasoning: "Mock analysis".to_string(),
                model_version: "mock".to_string(),
            },
            features: Features {
                source_credibility: Confidence::default(),
                language_patterns: vec!["analyzed".to_string()],
                emotional_tone: "neutral".to_string(),
                risk_factors: Vec::new(),
                bias_indicators: None,
                linguistic_features: None,
            },
            verification: Verification::minimal(source_url),
            metadata: Metadata::new("mock", processing_time, AnalysisPath::GenerativePrimary),
        }
    }
}

#[async_trait]
impl GenerativeClassifier for MockClassifier {
    async fn classify(
        &self,
        _content: &str,
        source_url: Option<&str>,
        depth: AnalysisDepth,
    ) -> Result<ClassificationResult, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::FailUpstream => {
                return Err(ClassifyError::Upstream("mock upstream failure".to_string()))
            }
            MockBehavior::FailParse => {
                return Err(ClassifyError::Parse("mock parse failure".to_string()))
            }
            MockBehavior::Succeed => {}
        }

        // Scripted failures burn down before the first success
        let remaining = self.failures_before_success.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_before_success
                .store(remaining - 1, Ordering::SeqCst);
            return Err(ClassifyError::Upstream("mock upstream failure".to_string()));
        }

        Ok(self.canned_result(source_url, depth))
    }
}
