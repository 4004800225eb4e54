//! The cascading classification pipeline

use crate::heuristic::HeuristicClassifier;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;
use verity_domain::{
    AnalysisDepth, AnalysisPath, ClassificationResult, ClassifyError, GenerativeClassifier,
};

/// Default bound on a single generative attempt
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Classification pipeline with cascading fallback.
///
/// The core guarantee: [`ClassificationPipeline::analyze`] is infallible.
/// Generative failures (unreachable API, malformed response, timeout) are
/// converted into fallback execution paths, and the result's metadata
/// records which tier answered.
pub struct ClassificationPipeline {
    provider: Arc<dyn GenerativeClassifier>,
    heuristic: HeuristicClassifier,
    upstream_timeout: Duration,
}

impl ClassificationPipeline {
    /// Create a pipeline around the given generative provider
    pub fn new(provider: Arc<dyn GenerativeClassifier>) -> Self {
        Self {
            provider,
            heuristic: HeuristicClassifier::new(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }

    /// Bound each generative attempt; an elapsed timeout falls back like
    /// any other upstream failure
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Classify content. Never fails.
    ///
    /// Cascade: generative at the requested depth, then - for deep
    /// requests only - one generative retry at quick depth, then the
    /// heuristic. Results carry a provenance tag in `metadata.path`.
    pub async fn analyze(
        &self,
        content: &str,
        source_url: Option<&str>,
        depth: AnalysisDepth,
    ) -> ClassificationResult {
        match self.attempt(content, source_url, depth).await {
            Ok(result) => result,
            Err(primary_err) => {
                warn!(%depth, error = %primary_err, "generative classification failed, falling back");

                if depth.is_deep() {
                    match self.attempt(content, source_url, AnalysisDepth::Quick).await {
                        Ok(mut result) => {
                            result.metadata.path = AnalysisPath::GenerativeQuickFallback;
                            return result;
                        }
                        Err(quick_err) => {
                            warn!(error = %quick_err, "quick-depth retry failed, using heuristic");
                        }
                    }
                }

                self.heuristic.classify(content, source_url)
            }
        }
    }

    async fn attempt(
        &self,
        content: &str,
        source_url: Option<&str>,
        depth: AnalysisDepth,
    ) -> Result<ClassificationResult, ClassifyError> {
        match timeout(
            self.upstream_timeout,
            self.provider.classify(content, source_url, depth),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ClassifyError::Upstream(format!(
                "classification timed out after {:?}",
                self.upstream_timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use verity_domain::Classification;
    use verity_llm::MockClassifier;

    const CONTENT: &str = "Breaking news about an important local development";

    #[tokio::test]
    async fn test_primary_success_keeps_primary_path() {
        let provider = MockClassifier::succeeding(Classification::Authentic);
        let pipeline = ClassificationPipeline::new(Arc::new(provider.clone()));

        let result = pipeline.analyze(CONTENT, None, AnalysisDepth::Quick).await;
        assert_eq!(result.metadata.path, AnalysisPath::GenerativePrimary);
        assert_eq!(result.prediction.classification, Classification::Authentic);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_quick_failure_falls_back_to_heuristic() {
        let provider = MockClassifier::failing();
        let pipeline = ClassificationPipeline::new(Arc::new(provider.clone()));

        let result = pipeline.analyze(CONTENT, None, AnalysisDepth::Quick).await;
        assert_eq!(result.metadata.path, AnalysisPath::HeuristicFallback);
        // Quick depth goes straight to the heuristic: one upstream attempt
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_real_time_failure_falls_back_like_quick() {
        let provider = MockClassifier::failing();
        let pipeline = ClassificationPipeline::new(Arc::new(provider.clone()));

        let result = pipeline
            .analyze(CONTENT, None, AnalysisDepth::RealTime)
            .await;
        assert_eq!(result.metadata.path, AnalysisPath::HeuristicFallback);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_deep_failure_attempts_quick_before_heuristic() {
        let provider = MockClassifier::failing();
        let pipeline = ClassificationPipeline::new(Arc::new(provider.clone()));

        let result = pipeline.analyze(CONTENT, None, AnalysisDepth::Deep).await;
        assert_eq!(result.metadata.path, AnalysisPath::HeuristicFallback);
        // Deep makes exactly two upstream attempts before the heuristic
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_deep_fallback_to_quick_generative_is_tagged() {
        let provider = MockClassifier::failing_times(1, Classification::Suspicious);
        let pipeline = ClassificationPipeline::new(Arc::new(provider.clone()));

        let result = pipeline.analyze(CONTENT, None, AnalysisDepth::Deep).await;
        assert_eq!(result.metadata.path, AnalysisPath::GenerativeQuickFallback);
        assert_eq!(result.prediction.classification, Classification::Suspicious);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_parse_failure_also_falls_back() {
        let provider = MockClassifier::failing_parse();
        let pipeline = ClassificationPipeline::new(Arc::new(provider));

        let result = pipeline.analyze(CONTENT, None, AnalysisDepth::Quick).await;
        assert_eq!(result.metadata.path, AnalysisPath::HeuristicFallback);
    }

    #[tokio::test]
    async fn test_analyze_never_fails_and_respects_invariants() {
        let providers: Vec<MockClassifier> = vec![
            MockClassifier::succeeding(Classification::Misinformation),
            MockClassifier::failing(),
            MockClassifier::failing_parse(),
        ];
        let contents = [
            CONTENT,
            "URGENT: miracle cure doctors hate!",
            "",
        ];

        for provider in providers {
            let pipeline = ClassificationPipeline::new(Arc::new(provider));
            for depth in [AnalysisDepth::Quick, AnalysisDepth::Deep, AnalysisDepth::RealTime] {
                for content in contents {
                    let result = pipeline.analyze(content, None, depth).await;
                    let confidence = result.prediction.confidence.value();
                    assert!((0.0..=1.0).contains(&confidence));
                }
            }
        }
    }

    // Provider whose classify never completes; the timeout converts it to
    // an upstream failure.
    struct HangingClassifier;

    #[async_trait]
    impl GenerativeClassifier for HangingClassifier {
        async fn classify(
            &self,
            _content: &str,
            _source_url: Option<&str>,
            _depth: AnalysisDepth,
        ) -> Result<ClassificationResult, ClassifyError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_upstream_times_out_into_fallback() {
        let pipeline = ClassificationPipeline::new(Arc::new(HangingClassifier))
            .with_upstream_timeout(Duration::from_millis(100));

        let result = pipeline.analyze(CONTENT, None, AnalysisDepth::Quick).await;
        assert_eq!(result.metadata.path, AnalysisPath::HeuristicFallback);
    }

    #[tokio::test]
    async fn test_source_url_propagates_to_heuristic_fallback() {
        let provider = MockClassifier::failing();
        let pipeline = ClassificationPipeline::new(Arc::new(provider));

        let result = pipeline
            .analyze(CONTENT, Some("https://example.com/post"), AnalysisDepth::Quick)
            .await;
        assert_eq!(
            result.verification.sources_checked,
            vec!["https://example.com/post"]
        );
    }
}
