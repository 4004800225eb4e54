//! Normalized classification results
//!
//! Every execution path - generative primary, quick-depth generative
//! fallback, keyword heuristic - produces this same shape, so downstream
//! consumers never branch on where a result came from. The provenance
//! lives in [`Metadata::path`] instead.

use crate::classification::Classification;
use crate::confidence::Confidence;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Which tier of the fallback cascade produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisPath {
    /// First generative attempt at the requested depth succeeded
    GenerativePrimary,
    /// Deep attempt failed; the quick-depth generative retry succeeded
    GenerativeQuickFallback,
    /// All generative attempts failed; the keyword heuristic answered
    HeuristicFallback,
}

impl fmt::Display for AnalysisPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::GenerativePrimary => "generative-primary",
            Self::GenerativeQuickFallback => "generative-quick-fallback",
            Self::HeuristicFallback => "heuristic-fallback",
        };
        f.write_str(s)
    }
}

/// The verdict itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Classification label
    pub classification: Classification,
    /// Clamped confidence in the label
    pub confidence: Confidence,
    /// Model-provided explanation of the assessment
    pub reasoning: String,
    /// Which model produced the verdict
    pub model_version: String,
}

/// Linguistic sub-scores, only produced by deep analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinguisticScores {
    /// Sentiment in [-1, 1]
    pub sentiment_score: f64,
    /// Readability in [0, 1]
    pub readability_score: f64,
    /// Formality in [0, 1]
    pub formality_score: f64,
    /// Complexity in [0, 1]
    pub complexity_score: f64,
}

impl Default for LinguisticScores {
    fn default() -> Self {
        Self {
            sentiment_score: 0.0,
            readability_score: 0.5,
            formality_score: 0.5,
            complexity_score: 0.5,
        }
    }
}

/// Signals extracted from the content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    /// Credibility of the content's source in [0, 1]
    pub source_credibility: Confidence,
    /// Detected language patterns, in detection order
    pub language_patterns: Vec<String>,
    /// Overall emotional tone label
    pub emotional_tone: String,
    /// Risk factor tags
    pub risk_factors: Vec<String>,
    /// Bias indicator tags (deep analysis only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bias_indicators: Option<Vec<String>>,
    /// Linguistic sub-scores (deep analysis only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linguistic_features: Option<LinguisticScores>,
}

/// A single fact-check lookup result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactCheck {
    /// Name of the fact-checking source
    pub source: String,
    /// Verdict: "true", "false", or "mixed"
    pub result: String,
    /// Confidence in the verdict
    pub confidence: Confidence,
}

/// Cross-referencing and recommendation bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Related sources found during analysis
    pub cross_references: Vec<String>,
    /// Sources consulted, including the request's own source URL
    pub sources_checked: Vec<String>,
    /// Fact-check lookups (deep analysis only, may be empty)
    pub fact_check_results: Vec<FactCheck>,
    /// What the reader should do with this information
    pub recommendations: String,
}

impl Verification {
    /// Verification with no lookups and the stock recommendation
    pub fn minimal(source_url: Option<&str>) -> Self {
        Self {
            cross_references: Vec::new(),
            sources_checked: source_url.map(String::from).into_iter().collect(),
            fact_check_results: Vec::new(),
            recommendations: "Verify information from multiple credible sources".to_string(),
        }
    }
}

/// Bookkeeping about the analysis itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// When the analysis finished, in unix epoch milliseconds
    pub analyzed_at: u64,
    /// Nominal processing time in seconds. A reporting label tied to the
    /// execution path, not a measured latency.
    pub processing_time: f64,
    /// Which model (or heuristic) produced the result
    pub model_version: String,
    /// Provenance: which fallback tier answered
    pub path: AnalysisPath,
}

impl Metadata {
    /// Stamp metadata with the current time
    pub fn new(model_version: impl Into<String>, processing_time: f64, path: AnalysisPath) -> Self {
        Self {
            analyzed_at: now_millis(),
            processing_time,
            model_version: model_version.into(),
            path,
        }
    }
}

/// The complete, normalized output of a classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// The verdict
    pub prediction: Prediction,
    /// Extracted signals
    pub features: Features,
    /// Cross-referencing bundle
    pub verification: Verification,
    /// Analysis bookkeeping
    pub metadata: Metadata,
}

/// Current time in unix epoch milliseconds
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
