//! Echo Chamber — the always-available fallback expert.
//!
//! Handles every prompt at a constant low score, so it wins selection only
//! when no other expert scores above 0. The registry refuses to unregister
//! it.

use async_trait::async_trait;

use super::{Expert, ExpertError, ECHO_EXPERT_NAME};
use crate::config::defaults;
use crate::types::{ExpertResult, ResultDetail};

/// Echo Chamber fallback expert.
pub struct EchoExpert;

#[async_trait]
impl Expert for EchoExpert {
    fn name(&self) -> &str {
        ECHO_EXPERT_NAME
    }

    fn specialty(&self) -> &str {
        "Reliable response generation and fallback handling"
    }

    fn can_handle(&self, _prompt: &str) -> bool {
        true
    }

    fn calculate_score(&self, _prompt: &str) -> Result<f64, ExpertError> {
        Ok(defaults::ECHO_FALLBACK_SCORE)
    }

    async fn process(&self, prompt: &str) -> Result<ExpertResult, ExpertError> {
        let preview: String = prompt.chars().take(defaults::ECHO_PREVIEW_CHARS).collect();
        let ellipsis = if prompt.chars().count() > defaults::ECHO_PREVIEW_CHARS {
            "..."
        } else {
            ""
        };

        Ok(ExpertResult {
            expert: self.name().to_string(),
            analysis: "🔄 Echo Response Generated".to_string(),
            detail: ResultDetail::Echo {
                response: format!("Acknowledged: \"{preview}{ellipsis}\""),
                suggestions: vec![
                    "💡 Try being more specific about what you need".to_string(),
                    "🧬 For code analysis, mention DNA or genetic terms".to_string(),
                    "🐛 For debugging help, mention error or bug details".to_string(),
                ],
            },
            confidence: self.calculate_score(prompt)?,
            metadata: None,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_anything_at_constant_score() {
        assert!(EchoExpert.can_handle("banana"));
        assert!(EchoExpert.can_handle(""));
        assert_eq!(EchoExpert.calculate_score("banana").unwrap(), 0.1);
        assert_eq!(EchoExpert.calculate_score("").unwrap(), 0.1);
    }

    #[tokio::test]
    async fn test_short_prompts_echo_verbatim() {
        let result = EchoExpert.process("banana").await.unwrap();
        match result.detail {
            ResultDetail::Echo { response, suggestions } => {
                assert_eq!(response, "Acknowledged: \"banana\"");
                assert_eq!(suggestions.len(), 3);
            }
            _ => panic!("expected echo detail"),
        }
    }

    #[tokio::test]
    async fn test_long_prompts_are_truncated() {
        let prompt = "x".repeat(150);
        let result = EchoExpert.process(&prompt).await.unwrap();
        match result.detail {
            ResultDetail::Echo { response, .. } => {
                assert!(response.ends_with("...\""));
                // 100 chars of prompt survive the cut
                assert!(response.contains(&"x".repeat(100)));
                assert!(!response.contains(&"x".repeat(101)));
            }
            _ => panic!("expected echo detail"),
        }
    }
}
