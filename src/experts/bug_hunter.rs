//! Bug Hunter Detective — canned debugging analysis.
//!
//! The "diagnosis" is deterministic flavor: the first byte of the prompt's
//! MD5 digest indexes a fixed catalog of bug archetypes.

use async_trait::async_trait;
use tracing::debug;

use super::{Expert, ExpertError};
use crate::types::{BugSeverity, ExpertResult, ResultDetail};

const KEYWORDS: [&str; 8] = [
    "error", "bug", "debug", "fix", "problem", "issue", "crash", "fail",
];

/// One canned bug archetype.
struct BugType {
    kind: &'static str,
    severity: BugSeverity,
    solution: &'static str,
    prevention: &'static str,
}

/// Catalog of archetypes the detective can "find".
const BUG_TYPES: [BugType; 4] = [
    BugType {
        kind: "Null Pointer Exception",
        severity: BugSeverity::High,
        solution: "Add null checks before accessing object properties",
        prevention: "Use optional chaining (?.) and nullish coalescing (??)",
    },
    BugType {
        kind: "Memory Leak",
        severity: BugSeverity::Medium,
        solution: "Remove event listeners and clear intervals/timeouts",
        prevention: "Use proper cleanup in useEffect or component unmount",
    },
    BugType {
        kind: "Race Condition",
        severity: BugSeverity::High,
        solution: "Implement proper async/await patterns or locks",
        prevention: "Avoid shared state mutations, use atomic operations",
    },
    BugType {
        kind: "Logic Error",
        severity: BugSeverity::Medium,
        solution: "Review conditional statements and loop boundaries",
        prevention: "Write comprehensive unit tests and code reviews",
    },
];

/// Bug Hunter Detective.
pub struct BugHunterExpert;

#[async_trait]
impl Expert for BugHunterExpert {
    fn name(&self) -> &str {
        "Bug Hunter Detective"
    }

    fn specialty(&self) -> &str {
        "Code debugging and error analysis"
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
        let mut score: f64 = 0.4;

        if lower.contains("error") {
            score += 0.3;
        }
        if lower.contains("debug") {
            score += 0.4;
        }
        if lower.contains("crash") {
            score += 0.5;
        }
        if lower.contains("exception") {
            score += 0.4;
        }

        Ok(score.min(1.0))
    }

    async fn process(&self, prompt: &str) -> Result<ExpertResult, ExpertError> {
        debug!("🐛 Bug hunter on the case");

        let bug = select_bug(prompt);

        Ok(ExpertResult {
            expert: self.name().to_string(),
            analysis: format!("🐛 Bug Analysis: {}", bug.kind),
            detail: ResultDetail::Bug {
                severity: bug.severity,
                solution: bug.solution.to_string(),
                prevention: bug.prevention.to_string(),
            },
            confidence: self.calculate_score(prompt)?,
            metadata: None,
        })
    }
}

/// Deterministic archetype selection: first digest byte mod catalog size.
fn select_bug(prompt: &str) -> &'static BugType {
    let digest = md5::compute(prompt.as_bytes());
    &BUG_TYPES[digest.0[0] as usize % BUG_TYPES.len()]
}

// ============================================================================
// Tests
// ============================================================================
