//! Clamped confidence scores

use serde::{Deserialize, Serialize};

/// A confidence score guaranteed to lie in [0, 1].
///
/// Upstream models occasionally return scores outside the documented range.
/// The invariant here is clamp-not-reject: any input produces a valid score,
/// so a malformed confidence can never fail an otherwise usable result.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Create a confidence, clamping the value into [0, 1].
    ///
    /// NaN maps to the documented default of 0.5.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.5);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// The raw score
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Confidence {
    /// The documented default when upstream omits a confidence
    fn default() -> Self {
        Self(0.5)
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::clamped(value)
    }
}
