//! Keyword-pattern fallback classifier
//!
//! A total function: every input produces a result. This is a stand-in for
//! when the generative tiers are unavailable, not a quality classifier -
//! its output is policy-defined, and tests assert the policy (label choice,
//! confidence ranges, fixed tag sets) rather than correctness.

use rand::Rng;
use verity_domain::{
    AnalysisPath, Classification, ClassificationResult, Confidence, Features, Metadata,
    Prediction, Verification,
};

/// Nominal processing time reported for heuristic results
pub const HEURISTIC_PROCESSING_TIME: f64 = 0.5;

/// Model identifier stamped on heuristic results
pub const HEURISTIC_MODEL_VERSION: &str = "fallback-heuristic";

/// High-signal phrases associated with misinformation
const MISINFORMATION_MARKERS: &[&str] = &[
    "shocking",
    "urgent",
    "conspiracy",
    "secret",
    "doctors hate",
    "miracle cure",
    "won't believe",
    "exposed",
];

/// Keyword-based classifier used as the cascade's terminal fallback
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    /// Create a heuristic classifier
    pub fn new() -> Self {
        Self
    }

    /// Classify content. Never fails.
    ///
    /// Label selection is deterministic: any marker phrase present (case
    /// insensitive) means misinformation. Confidence is sampled within a
    /// fixed range per branch and always capped below 0.99.
    pub fn classify(&self, content: &str, source_url: Option<&str>) -> ClassificationResult {
        let lowered = content.to_lowercase();
        let matched = MISINFORMATION_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker));

        let mut rng = rand::rng();
        let confidence: f64 = if matched {
            // Strictly below 0.99: a heuristic answer never reads as
            // near-certain
            rng.random_range(0.7..0.99)
        } else {
            rng.random_range(0.5..0.8)
        };
        let confidence = Confidence::clamped(confidence);

        let source_credibility = match source_url {
            Some(_) => Confidence::clamped(rng.random_range(0.3..0.8)),
            None => Confidence::default(),
        };

        let (classification, reasoning, patterns, tone, risks) = if matched {
            (
                Classification::Misinformation,
                "Content contains sensational language patterns commonly associated \
                 with misinformation",
                vec!["sensational", "emotional", "urgent"],
                "highly emotional",
                vec!["sensational language", "unverifiable claims"],
            )
        } else {
            (
                Classification::Authentic,
                "Content appears to follow factual reporting patterns",
                vec!["factual", "neutral", "measured"],
                "neutral",
                Vec::new(),
            )
        };

        ClassificationResult {
            prediction: Prediction {
                classification,
                confidence,
                reasoning: reasoning.to_string(),
                model_version: HEURISTIC_MODEL_VERSION.to_string(),
            },
            features: Features {
                source_credibility,
                language_patterns: patterns.into_iter().map(String::from).collect(),
                emotional_tone: tone.to_string(),
                risk_factors: risks.into_iter().map(String::from).collect(),
                bias_indicators: None,
                linguistic_features: None,
            },
            verification: Verification::minimal(source_url),
            metadata: Metadata::new(
                HEURISTIC_MODEL_VERSION,
                HEURISTIC_PROCESSING_TIME,
                AnalysisPath::HeuristicFallback,
            ),
        }
    }
}
