//! Verity Domain Layer
//!
//! This crate contains the core data model for Verity's misinformation
//! classification pipeline. It defines the fundamental value objects and the
//! trait seam that infrastructure layers implement.
//!
//! ## Key Concepts
//!
//! - **ClassificationRequest**: An immutable, length-validated piece of
//!   content to analyze
//! - **Classification**: The closed label set every analysis resolves to;
//!   unrecognized upstream labels degrade to `Unknown`, never to an error
//! - **Confidence**: A score clamped into [0, 1] regardless of what the
//!   upstream model returned
//! - **ClassificationResult**: The normalized analysis shape (prediction,
//!   features, verification, metadata) shared by every execution path
//! - **AnalysisPath**: Provenance tag marking which fallback tier produced
//!   a result
//!
//! Infrastructure implementations (the generative provider, the pipeline,
//! the realtime service) live in other crates and depend on this one.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classification;
pub mod confidence;
pub mod depth;
pub mod request;
pub mod result;
pub mod traits;

// Re-exports for convenience
pub use classification::Classification;
pub use confidence::Confidence;
pub use depth::AnalysisDepth;
pub use request::{ClassificationRequest, RequestError, MAX_CONTENT_CHARS, MIN_CONTENT_CHARS};
pub use result::{
    AnalysisPath, ClassificationResult, FactCheck, Features, LinguisticScores, Metadata,
    Prediction, Verification,
};
pub use traits::{ClassifyError, GenerativeClassifier};
