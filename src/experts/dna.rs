//! DNA Transcription Specialist — genetic visualization of code-like input.
//!
//! Cosmetic flavor with a deterministic contract: the MD5 of the extracted
//! code tokens selects the A/T/G/C strand, so the same prompt always yields
//! the same sequence. No real bioinformatics is attempted.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::{Expert, ExpertError};
use crate::types::{ExpertResult, ResultDetail};

const KEYWORDS: [&str; 7] = [
    "dna", "gene", "genetic", "sequence", "base", "transcribe", "atgc",
];

/// Maximum strand length in bases.
const MAX_STRAND_LEN: usize = 16;

/// Code-like tokens worth transcribing (declaration keyword + identifier).
fn code_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:function|class|const|import|var|let)\s+\w+")
            .expect("static code-token pattern is valid")
    })
}

/// DNA Transcription Specialist.
pub struct DnaExpert;

#[async_trait]
impl Expert for DnaExpert {
    fn name(&self) -> &str {
        "DNA Transcription Specialist"
    }

    fn specialty(&self) -> &str {
        "Genetic code visualization and analysis"
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

        if lower.contains("transcribe") {
            score += 0.4;
        }
        if lower.contains("sequence") {
            score += 0.3;
        }
        if lower.contains("base pair") {
            score += 0.4;
        }
        if lower.contains("genetic") {
            score += 0.2;
        }

        Ok(score.min(1.0))
    }

    async fn process(&self, prompt: &str) -> Result<ExpertResult, ExpertError> {
        debug!("🧬 Processing genetic transcription");

        let sequence = transcribe_to_genetic_bases(&extract_code_sequence(prompt));

        Ok(ExpertResult {
            expert: self.name().to_string(),
            analysis: "🧬 Genetic Analysis Complete".to_string(),
            detail: ResultDetail::Dna {
                base_pairs: generate_base_pairs(&sequence),
                visualization: dna_visualization(&sequence),
                sequence,
            },
            confidence: self.calculate_score(prompt)?,
            metadata: None,
        })
    }
}

/// Pull code-like declarations out of the prompt for hashing.
fn extract_code_sequence(prompt: &str) -> String {
    code_token_pattern()
        .find_iter(prompt)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map the MD5 digest of the code tokens onto an A/T/G/C strand.
///
/// Hex digits are dropped, letters A-D map to the four bases, and E/F
/// collapse to adenine, giving at most [`MAX_STRAND_LEN`] bases.
fn transcribe_to_genetic_bases(code_sequence: &str) -> String {
    let digest = format!("{:x}", md5::compute(code_sequence.as_bytes()));
    digest
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(MAX_STRAND_LEN)
        .map(|c| match c {
            'A' => 'A',
            'B' => 'T',
            'C' => 'G',
            'D' => 'C',
            _ => 'A',
        })
        .collect()
}

/// Watson-Crick complement of a base.
fn complement(base: char) -> char {
    match base {
        'A' => 'T',
        'T' => 'A',
        'G' => 'C',
        _ => 'G',
    }
}

/// Render each base with its complement, e.g. `A↔T`.
fn generate_base_pairs(sequence: &str) -> Vec<String> {
    sequence
        .chars()
        .map(|base| format!("{base}↔{}", complement(base)))
        .collect()
}

/// Emoji strand: one colored circle per base.
fn dna_visualization(sequence: &str) -> String {
    sequence
        .chars()
        .map(|base| match base {
            'A' => "🔴",
            'T' => "🟢",
            'G' => "🔵",
            'C' => "🟣",
            _ => "⚪",
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
