//! Inbound classification requests

use crate::depth::AnalysisDepth;
use thiserror::Error;

/// Minimum content length in characters
pub const MIN_CONTENT_CHARS: usize = 10;

/// Maximum content length in characters
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Request construction error
#[derive(Debug, Error)]
pub enum RequestError {
    /// Content length is outside the accepted bounds
    #[error(
        "content length {0} outside allowed range \
         {MIN_CONTENT_CHARS}..={MAX_CONTENT_CHARS} characters"
    )]
    ContentLength(usize),
}

/// A validated request to classify a piece of content.
///
/// Immutable once created: fields are private and there are no mutators.
/// Length validation happens at construction so the pipeline can assume
/// well-formed input.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    content: String,
    source_url: Option<String>,
    depth: AnalysisDepth,
}

impl ClassificationRequest {
    /// Create a request, validating the content length in characters
    pub fn new(
        content: impl Into<String>,
        source_url: Option<String>,
        depth: AnalysisDepth,
    ) -> Result<Self, RequestError> {
        let content = content.into();
        let chars = content.chars().count();
        if !(MIN_CONTENT_CHARS..=MAX_CONTENT_CHARS).contains(&chars) {
            return Err(RequestError::ContentLength(chars));
        }
        Ok(Self {
            content,
            source_url,
            depth,
        })
    }

    /// The content to classify
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Optional source reference for the content
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Requested analysis depth
    pub fn depth(&self) -> AnalysisDepth {
        self.depth
    }
}
