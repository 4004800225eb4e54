//! Analysis depth requested by the caller

use serde::{Deserialize, Serialize};
use std::fmt;

/// How thorough a classification should be.
///
/// `RealTime` is the monitoring feed's depth; it prompts and falls back
/// exactly like `Quick`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisDepth {
    /// Single-pass analysis with the standard prompt
    #[default]
    Quick,
    /// Comprehensive analysis: bias indicators, fact checks, linguistic scores
    Deep,
    /// Streaming analysis for monitoring sessions; treated as quick
    RealTime,
}

impl AnalysisDepth {
    /// Whether this depth uses the comprehensive prompt and result shape
    pub fn is_deep(&self) -> bool {
        matches!(self, Self::Deep)
    }

    /// String representation matching the wire format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Deep => "deep",
            Self::RealTime => "real-time",
        }
    }
}

impl fmt::Display for AnalysisDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
