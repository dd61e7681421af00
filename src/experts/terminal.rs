//! Terminal Command Specialist — shell command suggestions.

use async_trait::async_trait;

use super::{Expert, ExpertError};
use crate::types::{ExpertResult, ResultDetail};

const KEYWORDS: [&str; 7] = [
    "command", "terminal", "shell", "bash", "cli", "script", "run",
];

/// Terminal Command Specialist.
pub struct TerminalExpert;

#[async_trait]
impl Expert for TerminalExpert {
    fn name(&self) -> &str {
        "Terminal Command Specialist"
    }

    fn specialty(&self) -> &str {
        "Shell commands and terminal operations"
    }

    fn can_handle(&self, prompt: &str) -> bool {
        let lower = prompt.to_lowercase();
        KEYWORDS.iter().any(|keyword| lower.contains(keyword))
    }

    fn calculate_score(&self, prompt: &str) -> Result<f64, ExpertError> {
        if !self.can_handle(prompt) {
            return Ok(0.0);
        }

        let lower = prompt.to_lowercase();
        let mut score: f64 = 0.3;

        if lower.contains("terminal") {
            score += 0.4;
        }
        if lower.contains("command") {
            score += 0.3;
        }
        if lower.contains("shell") {
            score += 0.3;
        }
        if lower.contains("script") {
            score += 0.2;
        }

        Ok(score.min(1.0))
    }

    async fn process(&self, prompt: &str) -> Result<ExpertResult, ExpertError> {
        Ok(ExpertResult {
            expert: self.name().to_string(),
            analysis: "🌐 Terminal Command Analysis".to_string(),
            detail: ResultDetail::Terminal {
                suggestions: vec![
                    "📁 Use `ls -la` to list files with details".to_string(),
                    "🔍 Use `grep` to search file contents".to_string(),
                    "⚡ Use `&&` to chain commands".to_string(),
                    "🚀 Use `nohup` for background processes".to_string(),
                ],
                safety: "Always review commands before execution".to_string(),
            },
            confidence: self.calculate_score(prompt)?,
            metadata: None,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
