//! Trait seam between the pipeline and the generative infrastructure
//!
//! The pipeline holds its provider as `Arc<dyn GenerativeClassifier>`, so
//! the error type is fixed here rather than left as an associated type.

use crate::depth::AnalysisDepth;
use crate::result::ClassificationResult;
use async_trait::async_trait;
use thiserror::Error;

/// Failures a generative provider can report.
///
/// Both variants are recoverable by contract: the pipeline converts them
/// into a fallback execution path and never surfaces them to its caller.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The external capability was unreachable or returned an error
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The model responded, but not in the expected structured shape
    #[error("parse error: {0}")]
    Parse(String),
}

/// A classifier backed by an external generative model.
///
/// Implemented by `verity-llm`; mocked in tests.
#[async_trait]
pub trait GenerativeClassifier: Send + Sync {
    /// Classify content at the given depth.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Upstream`] on transport or availability
    /// failure and [`ClassifyError::Parse`] when the response cannot be
    /// interpreted as the expected structured shape.
    async fn classify(
        &self,
        content: &str,
        source_url: Option<&str>,
        depth: AnalysisDepth,
    ) -> Result<ClassificationResult, ClassifyError>;
}
