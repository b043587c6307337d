//! Prompt complexity heuristic
//!
//! Scores a prompt by length and technical vocabulary density. This is a cheap
//! textual approximation, not semantic analysis: the score is
//! `ceil(line_count / 10)` plus one point per occurrence of a fixed technical
//! term, case-insensitive. Thresholds map to fixed numeric bounds.

use serde::{Deserialize, Serialize};

/// Fixed vocabulary of technical terms that raise the complexity score.
/// Each occurrence counts once, so repeated terms accumulate.
pub const TECHNICAL_TERMS: &[&str] = &[
    "architecture",
    "performance",
    "concurrent",
    "security",
    "refactor",
    "database",
    "distributed",
    "optimization",
    "scalability",
    "algorithm",
    "infrastructure",
    "migration",
    "integration",
    "asynchronous",
    "transaction",
    "encryption",
    "deployment",
    "benchmark",
    "protocol",
    "latency",
];

/// Complexity threshold selected by a `Complexity` matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityThreshold {
    Low,
    Medium,
    High,
}

impl ComplexityThreshold {
    /// Numeric bound the heuristic score is compared against
    pub fn bound(self) -> u32 {
        match self {
            ComplexityThreshold::Low => 2,
            ComplexityThreshold::Medium => 5,
            ComplexityThreshold::High => 10,
        }
    }
}

/// Compute the heuristic complexity score for a prompt
pub fn complexity_score(prompt: &str) -> u32 {
    let line_count = prompt.lines().count() as u32;
    let length_score = line_count.div_ceil(10);

    let lowered = prompt.to_lowercase();
    let term_score: u32 = TECHNICAL_TERMS
        .iter()
        .map(|term| lowered.matches(term).count() as u32)
        .sum();

    length_score + term_score
}

/// True when the prompt's score reaches the threshold's bound
pub fn meets_threshold(prompt: &str, threshold: ComplexityThreshold) -> bool {
    complexity_score(prompt) >= threshold.bound()
}
