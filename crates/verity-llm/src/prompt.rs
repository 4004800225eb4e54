//! Prompt engineering for structured classification output

use verity_domain::AnalysisDepth;

/// Builds the classification prompts sent to the generative model.
///
/// Two templates exist: the standard one for quick and real-time analysis,
/// and a comprehensive one for deep analysis that additionally requests
/// bias indicators, fact-check lookups, cross references, and linguistic
/// sub-scores.
pub struct PromptBuilder<'a> {
    content: &'a str,
    source_url: Option<&'a str>,
    depth: AnalysisDepth,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt builder for the given content
    pub fn new(content: &'a str, source_url: Option<&'a str>, depth: AnalysisDepth) -> Self {
        Self {
            content,
            source_url,
            depth,
        }
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        if self.depth.is_deep() {
            prompt.push_str(DEEP_INSTRUCTIONS);
            prompt.push_str("\n\n");
            prompt.push_str(&format!("Content: \"{}\"\n", self.content));
            prompt.push_str(&format!(
                "Source URL: {}\n\n",
                self.source_url.unwrap_or("Not provided")
            ));
            prompt.push_str(DEEP_FOCUS_AREAS);
            prompt.push_str("\n\n");
            prompt.push_str(DEEP_OUTPUT_FORMAT);
        } else {
            prompt.push_str(STANDARD_INSTRUCTIONS);
            prompt.push_str("\n\n");
            prompt.push_str(&format!("Content to analyze: \"{}\"\n\n", self.content));
            prompt.push_str(STANDARD_OUTPUT_FORMAT);
            prompt.push_str("\n\n");
            prompt.push_str(STANDARD_FOCUS_AREAS);
        }

        prompt.push_str("\n\nRespond only with valid JSON, no additional text.\n");
        prompt
    }
}

const STANDARD_INSTRUCTIONS: &str = "You are an expert misinformation detection system. \
Analyze the following content for potential misinformation and provide a detailed assessment.";

const STANDARD_OUTPUT_FORMAT: &str = r#"Provide your analysis in the following JSON format:
{
    "classification": "authentic" or "misinformation" or "suspicious" or "satire",
    "confidence": 0.0-1.0,
    "reasoning": "Detailed explanation of your assessment",
    "languagePatterns": ["array", "of", "detected", "patterns"],
    "emotionalTone": "neutral/emotional/sensational/manipulative",
    "sourceCredibility": 0.0-1.0,
    "riskFactors": ["array", "of", "potential", "risks"],
    "recommendations": "What readers should do with this information"
}"#;

const STANDARD_FOCUS_AREAS: &str = r#"Focus on:
1. Sensational or misleading language
2. Unverifiable claims
3. Emotional manipulation tactics
4. Lack of credible sources
5. Conspiracy theory indicators
6. Clickbait patterns
7. Factual accuracy indicators"#;

const DEEP_INSTRUCTIONS: &str = "You are an expert misinformation detection system performing \
a comprehensive deep analysis. Analyze the following content with enhanced scrutiny.";

const DEEP_FOCUS_AREAS: &str = r#"Perform a comprehensive analysis including:
1. Fact-checking against known information
2. Source credibility assessment
3. Linguistic pattern analysis
4. Emotional manipulation detection
5. Cross-reference verification
6. Bias detection
7. Conspiracy theory indicators"#;

const DEEP_OUTPUT_FORMAT: &str = r#"Provide your analysis in this JSON format:
{
    "classification": "authentic" or "misinformation" or "suspicious" or "satire",
    "confidence": 0.0-1.0,
    "reasoning": "Comprehensive explanation",
    "languagePatterns": ["detailed", "patterns"],
    "emotionalTone": "assessment",
    "sourceCredibility": 0.0-1.0,
    "riskFactors": ["comprehensive", "risks"],
    "biasIndicators": ["bias", "indicators"],
    "factCheckResults": [{"source": "name", "result": "true/false/mixed", "confidence": 0.0-1.0}],
    "crossReferences": ["relevant", "sources"],
    "recommendations": "Detailed recommendations",
    "linguisticFeatures": {
        "sentimentScore": -1.0 to 1.0,
        "readabilityScore": 0.0-1.0,
        "formalityScore": 0.0-1.0,
        "complexityScore": 0.0-1.0
    }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_prompt_contains_content_and_schema() {
        let prompt = PromptBuilder::new("some claim", None, AnalysisDepth::Quick).build();
        assert!(prompt.contains("Content to analyze: \"some claim\""));
        assert!(prompt.contains("\"languagePatterns\""));
        assert!(prompt.contains("Respond only with valid JSON"));
        // Deep-only fields must not leak into the standard schema
        assert!(!prompt.contains("biasIndicators"));
        assert!(!prompt.contains("linguisticFeatures"));
    }

    #[test]
    fn test_real_time_uses_standard_template() {
        let quick = PromptBuilder::new("claim text", None, AnalysisDepth::Quick).build();
        let realtime = PromptBuilder::new("claim text", None, AnalysisDepth::RealTime).build();
        assert_eq!(quick, realtime);
    }

    #[test]
    fn test_deep_prompt_requests_extended_schema() {
        let prompt = PromptBuilder::new(
            "some claim",
            Some("https://example.com/post"),
            AnalysisDepth::Deep,
        )
        .build();
        assert!(prompt.contains("comprehensive deep analysis"));
        assert!(prompt.contains("Source URL: https://example.com/post"));
        assert!(prompt.contains("biasIndicators"));
        assert!(prompt.contains("factCheckResults"));
        assert!(prompt.contains("linguisticFeatures"));
    }

    #[test]
    fn test_deep_prompt_without_source_url() {
        let prompt = PromptBuilder::new("some claim", None, AnalysisDepth::Deep).build();
        assert!(prompt.contains("Source URL: Not provided"));
    }
}
