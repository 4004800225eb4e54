//! Parse and normalize the model's structured response
//!
//! The model is instructed to return bare JSON, but in practice responses
//! arrive wrapped in markdown code fences or with stray whitespace. Parsing
//! is two-stage: strip incidental formatting, then deserialize into a
//! lenient shape where every field is optional. Normalization substitutes
//! the documented default for anything missing and clamps every numeric
//! field, so a partially-usable response still yields a complete result.

use serde::Deserialize;
use tracing::warn;
use verity_domain::{
    AnalysisDepth, AnalysisPath, Classification, ClassificationResult, ClassifyError, Confidence,
    FactCheck, Features, LinguisticScores, Metadata, Prediction, Verification,
};

use crate::{NOMINAL_PROCESSING_TIME_DEEP, NOMINAL_PROCESSING_TIME_QUICK};

/// Raw response shape: every field optional, normalized afterwards
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    classification: Option<String>,
    confidence: Option<f64>,
    reasoning: Option<String>,
    language_patterns: Option<Vec<String>>,
    emotional_tone: Option<String>,
    source_credibility: Option<f64>,
    risk_factors: Option<Vec<String>>,
    bias_indicators: Option<Vec<String>>,
    fact_check_results: Option<Vec<RawFactCheck>>,
    cross_references: Option<Vec<String>>,
    recommendations: Option<String>,
    linguistic_features: Option<RawLinguistic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFactCheck {
    source: Option<String>,
    result: Option<String>,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLinguistic {
    sentiment_score: Option<f64>,
    readability_score: Option<f64>,
    formality_score: Option<f64>,
    complexity_score: Option<f64>,
}

/// Parse a raw model response into a normalized [`ClassificationResult`].
///
/// # Errors
///
/// Returns [`ClassifyError::Parse`] when the response (after fence
/// stripping) is not valid JSON of the expected object shape. Missing
/// fields are not errors; they take documented defaults.
pub fn parse_analysis(
    response: &str,
    depth: AnalysisDepth,
    source_url: Option<&str>,
    model_version: &str,
) -> Result<ClassificationResult, ClassifyError> {
    let json_str = strip_fences(response);

    let raw: RawAnalysis = serde_json::from_str(&json_str)
        .map_err(|e| ClassifyError::Parse(format!("JSON parse error: {e}")))?;

    Ok(normalize(raw, depth, source_url, model_version))
}

/// Strip markdown code fences the model sometimes wraps its JSON in
fn strip_fences(response: &str) -> String {
    let trimmed = response.trim();
    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return String::new();
        }
        // Skip the opening fence (``` or ```json) and the closing fence
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        lines[1..end].join("\n")
    } else {
        trimmed.to_string()
    }
}

fn normalize(
    raw: RawAnalysis,
    depth: AnalysisDepth,
    source_url: Option<&str>,
    model_version: &str,
) -> ClassificationResult {
    let classification = match raw.classification.as_deref() {
        Some(label) => Classification::from_label(label),
        None => {
            warn!("response missing classification, defaulting to unknown");
            Classification::Unknown
        }
    };

    let (bias_indicators, linguistic_features, processing_time) = if depth.is_deep() {
        let linguistic = raw
            .linguistic_features
            .map(|l| LinguisticScores {
                sentiment_score: l.sentiment_score.unwrap_or(0.0).clamp(-1.0, 1.0),
                readability_score: l.readability_score.unwrap_or(0.5).clamp(0.0, 1.0),
                formality_score: l.formality_score.unwrap_or(0.5).clamp(0.0, 1.0),
                complexity_score: l.complexity_score.unwrap_or(0.5).clamp(0.0, 1.0),
            })
            .unwrap_or_default();
        (
            Some(raw.bias_indicators.unwrap_or_default()),
            Some(linguistic),
            NOMINAL_PROCESSING_TIME_DEEP,
        )
    } else {
        (None, None, NOMINAL_PROCESSING_TIME_QUICK)
    };

    let fact_check_results = raw
        .fact_check_results
        .unwrap_or_default()
        .into_iter()
        .map(|fc| FactCheck {
            source: fc.source.unwrap_or_else(|| "unknown".to_string()),
            result: fc.result.unwrap_or_else(|| "mixed".to_string()),
            confidence: Confidence::clamped(fc.confidence.unwrap_or(0.5)),
        })
        .collect();

    let sources_checked: Vec<String> = source_url.map(String::from).into_iter().collect();

    ClassificationResult {
        prediction: Prediction {
            classification,
            confidence: Confidence::clamped(raw.confidence.unwrap_or(0.5)),
            reasoning: raw
                .reasoning
                .unwrap_or_else(|| "Analysis completed".to_string()),
            model_version: model_version.to_string(),
        },
        features: Features {
            source_credibility: Confidence::clamped(raw.source_credibility.unwrap_or(0.5)),
            language_patterns: raw
                .language_patterns
                .unwrap_or_else(|| vec!["analyzed".to_string()]),
            emotional_tone: raw.emotional_tone.unwrap_or_else(|| "neutral".to_string()),
            risk_factors: raw.risk_factors.unwrap_or_default(),
            bias_indicators,
            linguistic_features,
        },
        verification: Verification {
            cross_references: raw.cross_references.unwrap_or_default(),
            sources_checked,
            fact_check_results,
            recommendations: raw.recommendations.unwrap_or_else(|| {
                "Verify information from multiple credible sources".to_string()
            }),
        },
        metadata: Metadata::new(model_version, processing_time, AnalysisPath::GenerativePrimary),
    }
}
