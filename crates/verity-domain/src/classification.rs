//! The closed classification label set

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification verdict for a piece of content.
///
/// The set is closed: every analysis resolves to one of these labels.
/// Labels the upstream model invents map to [`Classification::Unknown`]
/// rather than surfacing a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Content appears to follow factual reporting patterns
    Authentic,
    /// Content shows strong misinformation markers
    Misinformation,
    /// Content is questionable but not conclusively misinformation
    Suspicious,
    /// Content is satirical rather than deceptive
    Satire,
    /// The model gave no usable verdict
    Unknown,
}

impl Classification {
    /// Parse a label string, degrading anything unrecognized to `Unknown`.
    ///
    /// This is total by design: the pipeline guarantees a label for every
    /// result, so an unexpected upstream string must not become an error.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "authentic" => Self::Authentic,
            "misinformation" => Self::Misinformation,
            "suspicious" => Self::Suspicious,
            "satire" => Self::Satire,
            _ => Self::Unknown,
        }
    }

    /// String representation matching the wire format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentic => "authentic",
            Self::Misinformation => "misinformation",
            Self::Suspicious => "suspicious",
            Self::Satire => "satire",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
