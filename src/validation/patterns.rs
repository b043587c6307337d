//! Regex flag and pattern-safety analysis
//!
//! The flags check is exact: every character of a declared flags string must
//! belong to the conventional modifier letters. The performance analysis is a
//! fixed battery of heuristics; false positives and false negatives are both
//! acceptable since the result is advisory and never blocks validity.

use once_cell::sync::Lazy;
use regex::Regex;

/// The conventional regex modifier letters. Duplicates are accepted.
pub const ALLOWED_REGEX_FLAGS: &str = "dgimsuvy";

/// Characters of `flags` that fall outside the allowed set, in order
pub fn invalid_flag_chars(flags: &str) -> Vec<char> {
    flags
        .chars()
        .filter(|c| !ALLOWED_REGEX_FLAGS.contains(*c))
        .collect()
}

static NESTED_QUANTIFIER: Lazy<Regex> = Lazy::new(|| {
    // a quantified group that is itself quantified, e.g. (a+)+ or (\d*)* or (x+){2,}
    Regex::new(r"\([^()]*[+*][^()]*\)\s*[+*{]").expect("static pattern")
});

static MATCH_ANYTHING: Lazy<Regex> = Lazy::new(|| {
    // unbounded .* / .+ at either end of the pattern, or doubled mid-pattern
    Regex::new(r"^\.[*+]|\.[*+]\$?$|\.[*+]\.[*+]").expect("static pattern")
});

static LARGE_CLASS_REPETITION: Lazy<Regex> = Lazy::new(|| {
    // bounded repetition on a character class, e.g. [a-z]{500,} or \w{1000}
    Regex::new(r"(\[[^\]]*\]|\\[wds])\{(\d+)").expect("static pattern")
});

static LOOKAROUND_WITH_QUANTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\?<?[=!][^)]*[+*]").expect("static pattern")
});

static BACKREFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[1-9]").expect("static pattern"));

/// Repetition counts at or above this are flagged as excessive
const LARGE_REPETITION_BOUND: u32 = 100;

/// Alternations with more branches than this are flagged
const MAX_ALTERNATION_BRANCHES: usize = 8;

/// Run the heuristic battery against a pattern, returning the reason of the
/// first heuristic that fires, or `None` when the pattern looks harmless.
pub fn performance_risk(pattern: &str) -> Option<&'static str> {
    if NESTED_QUANTIFIER.is_match(pattern) {
        return Some("nested quantifiers may cause catastrophic backtracking");
    }

    let branches = top_level_branches(pattern);
    if has_overlapping_branches(&branches) {
        return Some("alternation branches overlap (one is a prefix of another), which backtracks inefficiently");
    }

    if MATCH_ANYTHING.is_match(pattern) {
        return Some("unbounded '.*' or '.+' at the pattern boundary or doubled mid-pattern can scan excessively");
    }

    if let Some(caps) = LARGE_CLASS_REPETITION.captures(pattern) {
        let count: u32 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        if count >= LARGE_REPETITION_BOUND {
            return Some("large bounded repetition on a character class risks excessive backtracking");
        }
    }

    if LOOKAROUND_WITH_QUANTIFIER.is_match(pattern) {
        return Some("lookaround assertions containing quantifiers evaluate slowly");
    }

    if BACKREFERENCE.is_match(pattern) {
        return Some("backreferences force slow, non-regular matching");
    }

    if branches.len() > MAX_ALTERNATION_BRANCHES {
        return Some("more than eight alternation branches cause excessive branching");
    }

    None
}

/// Split a pattern on top-level `|`, ignoring escaped pipes and pipes nested
/// inside groups or character classes.
fn top_level_branches(pattern: &str) -> Vec<String> {
    let mut branches = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_class = false;
    let mut escaped = false;

    for c in pattern.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            '[' if !in_class => {
                current.push(c);
                in_class = true;
            }
            ']' if in_class => {
                current.push(c);
                in_class = false;
            }
            '(' if !in_class => {
                current.push(c);
                depth += 1;
            }
            ')' if !in_class && depth > 0 => {
                current.push(c);
                depth -= 1;
            }
            '|' if !in_class && depth == 0 => {
                branches.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    branches.push(current);
    branches
}

/// True when one branch is a proper prefix of another, in either direction
fn has_overlapping_branches(branches: &[String]) -> bool {
    if branches.len() < 2 {
        return false;
    }
    for (i, a) in branches.iter().enumerate() {
        for b in branches.iter().skip(i + 1) {
            if a.is_empty() || b.is_empty() {
                continue;
            }
            if (a.len() != b.len()) && (a.starts_with(b.as_str()) || b.starts_with(a.as_str())) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_flags_pass() {
        assert!(invalid_flag_chars("gi").is_empty());
        assert!(invalid_flag_chars("gg").is_empty());
        assert!(invalid_flag_chars("dgimsuvy").is_empty());
        assert!(invalid_flag_chars("").is_empty());
    }

    #[test]
    fn test_disallowed_flags_reported() {
        assert_eq!(invalid_flag_chars("x"), vec!['x']);
        assert_eq!(invalid_flag_chars("gxi!"), vec!['x', '!']);
    }

    #[test]
    fn test_nested_quantifier_flagged() {
        let reason = performance_risk("(a+)+").unwrap();
        assert!(reason.contains("catastrophic backtracking"));
        assert!(performance_risk("(\\d*)*").is_some());
    }

    #[test]
    fn test_simple_alternation_is_clean() {
        assert!(performance_risk("test|example").is_none());
    }

    #[test]
    fn test_overlapping_alternation_flagged() {
        let reason = performance_risk("abc|abcdef").unwrap();
        assert!(reason.contains("prefix"));
    }

    #[test]
    fn test_doubled_match_anything_flagged() {
        assert!(performance_risk("foo.*.*bar").is_some());
        assert!(performance_risk(".*leading").is_some());
        assert!(performance_risk("trailing.+").is_some());
    }

    #[test]
    fn test_large_class_repetition_flagged() {
        assert!(performance_risk("[a-z]{500,}").is_some());
        assert!(performance_risk("\\w{1000}").is_some());
        assert!(performance_risk("[a-z]{3}").is_none());
    }

    #[test]
    fn test_lookaround_with_quantifier_flagged() {
        assert!(performance_risk("(?=a+b)").is_some());
        assert!(performance_risk("(?<=x*)").is_some());
        assert!(performance_risk("(?=abc)").is_none());
    }

    #[test]
    fn test_backreference_flagged() {
        let reason = performance_risk("(a)\\1").unwrap();
        assert!(reason.contains("backreference"));
    }

    #[test]
    fn test_many_alternation_branches_flagged() {
        assert!(performance_risk("a|b|c|d|e|f|g|h|i").is_some());
        assert!(performance_risk("a|b|c|d|e|f|g|h").is_none());
    }

    #[test]
    fn test_first_matching_heuristic_wins() {
        // nested quantifier is checked before the alternation heuristics
        let reason = performance_risk("(a+)+|ab|abc").unwrap();
        assert!(reason.contains("catastrophic backtracking"));
    }

    #[test]
    fn test_nested_pipes_not_counted_as_branches() {
        assert!(performance_risk("(a|b|c|d|e|f|g|h|i)").is_none());
    }
}
