//! Code standards evaluator: a deterministic, line-oriented scorer that
//! grades a snippet against configurable rules and collects improvement
//! suggestions.
//!
//! This is a shallow heuristic, not static analysis. Two measures are
//! deliberately approximate and must stay that way — downstream
//! suggestion text is calibrated to them:
//! - function length is the remaining-lines suffix from a signature to
//!   the end of the snippet, not the function's true body;
//! - disallowed keywords match as substrings, so "eval" also flags
//!   "evaluate".

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Rule thresholds, loaded once at startup and shared read-only by all
/// evaluations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardsConfig {
    pub max_function_length: usize,
    pub min_comments: usize,
    pub max_line_length: usize,
    pub disallowed_keywords: Vec<String>,
}

impl StandardsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read standards file {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Malformed standards file {}", path.display()))
    }
}

/// Outcome of one evaluation. Suggestions are a deduplicated,
/// order-insensitive collection; compare as a set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub alignment_percentage: f64,
    pub suggestions: BTreeSet<String>,
}

/// Score a snippet against the standards.
///
/// Five rule groups accumulate into a running `score` out of
/// `total_criteria`; every criterion counts toward the total, satisfied
/// ones also count toward the score. Pure and deterministic: identical
/// input always yields identical output.
pub fn evaluate(snippet: &str, standards: &StandardsConfig) -> EvaluationResult {
    let mut score = 0usize;
    let mut total_criteria = 0usize;
    let mut suggestions = BTreeSet::new();

    let lines: Vec<&str> = snippet.lines().collect();
    let signatures: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| function_signature_name(line).map(|name| (i, name)))
        .collect();

    // Naming convention: one criterion per function found. An
    // underscore in the name passes the snake_case proxy check.
    for &(_, name) in &signatures {
        if name.contains('_') {
            score += 1;
        } else {
            suggestions.insert(
                "Ensure function and variable names follow snake_case convention.".to_string(),
            );
        }
        total_criteria += 1;
    }

    // Function length: measured as the remaining lines from the
    // signature to the end of the snippet.
    for &(i, _) in &signatures {
        if lines.len() - i <= standards.max_function_length {
            score += 1;
        } else {
            suggestions.insert(format!(
                "Consider breaking down functions longer than {} lines into smaller ones.",
                standards.max_function_length
            ));
        }
        total_criteria += 1;
    }

    // Comment density: a single criterion over the whole snippet.
    if comment_marker_count(snippet) >= standards.min_comments {
        score += 1;
    } else {
        suggestions.insert(format!(
            "Add at least {} comments to explain your code.",
            standards.min_comments
        ));
    }
    total_criteria += 1;

    // Line length: one criterion per physical line, at most one
    // suggestion no matter how many lines run over.
    let mut any_line_over = false;
    for line in &lines {
        if line.chars().count() <= standards.max_line_length {
            score += 1;
        } else {
            any_line_over = true;
        }
        total_criteria += 1;
    }
    if any_line_over {
        suggestions.insert(format!(
            "Keep lines under {} characters long.",
            standards.max_line_length
        ));
    }

    // Disallowed keywords: literal substring match per configured entry.
    for keyword in &standards.disallowed_keywords {
        if snippet.contains(keyword.as_str()) {
            suggestions.insert(format!(
                "Avoid using disallowed keywords: {}.",
                standards.disallowed_keywords.join(", ")
            ));
        } else {
            score += 1;
        }
        total_criteria += 1;
    }

    let alignment_percentage = if total_criteria == 0 {
        0.0
    } else {
        100.0 * score as f64 / total_criteria as f64
    };

    EvaluationResult {
        alignment_percentage,
        suggestions,
    }
}

/// The function name on a signature line, if the line opens a function
/// definition. Understands `def` (Python), `fn` (Rust) and `function`
/// (JavaScript/TypeScript) heads, with leading qualifiers stripped.
fn function_signature_name(line: &str) -> Option<&str> {
    let mut rest = line.trim_start();
    loop {
        let stripped = ["pub ", "pub(crate) ", "async ", "unsafe ", "const ", "export "]
            .iter()
            .find_map(|q| rest.strip_prefix(q));
        match stripped {
            Some(s) => rest = s.trim_start(),
            None => break,
        }
    }

    let rest = rest
        .strip_prefix("def ")
        .or_else(|| rest.strip_prefix("fn "))
        .or_else(|| rest.strip_prefix("function "))?;

    let name = rest
        .trim_start()
        .split(|c: char| c == '(' || c == '<' || c == ':' || c.is_whitespace())
        .next()
        .unwrap_or("");

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Total comment markers in the snippet: `#` characters plus `//`
/// sequences, counted anywhere in the text.
fn comment_marker_count(snippet: &str) -> usize {
    snippet.matches('#').count() + snippet.matches("//").count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standards() -> StandardsConfig {
        StandardsConfig {
            max_function_length: 50,
            min_comments: 1,
            max_line_length: 120,
            disallowed_keywords: vec!["eval".to_string(), "exec".to_string()],
        }
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let snippet = "def process_data(x):\n    # normalize\n    return x * 2\n";
        let s = standards();
        let first = evaluate(snippet, &s);
        for _ in 0..20 {
            assert_eq!(evaluate(snippet, &s), first);
        }
    }

    #[test]
    fn test_alignment_always_within_bounds() {
        let s = standards();
        let long = "a".repeat(500);
        let snippets = [
            "",
            "x",
            "def f(): pass",
            "def bad(): eval('x')\nexec('y')",
            long.as_str(),
        ];
        for snippet in snippets {
            let result = evaluate(snippet, &s);
            assert!(
                (0.0..=100.0).contains(&result.alignment_percentage),
                "out of bounds for {snippet:?}: {}",
                result.alignment_percentage
            );
        }
    }

    #[test]
    fn test_clean_snippet_scores_full_marks() {
        let snippet = "def add_numbers(a, b):\n    # sum the inputs\n    return a + b\n";
        let result = evaluate(snippet, &standards());
        assert_eq!(result.alignment_percentage, 100.0);
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_naming_without_underscore_flagged() {
        let snippet = "def process(x):\n    # work\n    return x\n";
        let result = evaluate(snippet, &standards());
        assert!(result
            .suggestions
            .contains("Ensure function and variable names follow snake_case convention."));
        assert!(result.alignment_percentage < 100.0);
    }

    #[test]
    fn test_disallowed_keyword_substring_match_is_intentional() {
        // "evaluate_model" contains the literal substring "eval", so the
        // rule fires even though no eval() call exists. Substring
        // matching is the documented behavior, not a bug.
        let snippet = "def evaluate_model(m):\n    # score it\n    return m.score()\n";
        let result = evaluate(snippet, &standards());
        assert!(result
            .suggestions
            .contains("Avoid using disallowed keywords: eval, exec."));
    }

    #[test]
    fn test_line_length_suggestion_added_once() {
        let long_a = format!("x = {}", "a".repeat(130));
        let long_b = format!("y = {}", "b".repeat(140));
        let snippet = format!("# two long lines\n{long_a}\n{long_b}\n");
        let result = evaluate(&snippet, &standards());
        let line_suggestions = result
            .suggestions
            .iter()
            .filter(|s| s.contains("Keep lines under"))
            .count();
        assert_eq!(line_suggestions, 1);
    }

    #[test]
    fn test_single_line_over_limit_yields_suggestion() {
        let snippet = "a".repeat(121);
        let result = evaluate(&snippet, &standards());
        assert!(result
            .suggestions
            .contains("Keep lines under 120 characters long."));
    }

    #[test]
    fn test_function_length_uses_suffix_measure() {
        // 4 lines follow the signature (inclusive of it, 5 total), so a
        // max of 3 trips the rule even though the "function" itself is
        // short. The suffix measure is the documented behavior.
        let snippet = "def short_one():\n    return 1\n\n# trailing\n# comments\n";
        let tight = StandardsConfig {
            max_function_length: 3,
            min_comments: 0,
            max_line_length: 120,
            disallowed_keywords: vec![],
        };
        let result = evaluate(snippet, &tight);
        assert!(result
            .suggestions
            .contains("Consider breaking down functions longer than 3 lines into smaller ones."));
    }

    #[test]
    fn test_comment_density_unsatisfied() {
        let snippet = "def do_work(x):\n    return x\n";
        let demanding = StandardsConfig {
            min_comments: 3,
            ..standards()
        };
        let result = evaluate(snippet, &demanding);
        assert!(result
            .suggestions
            .contains("Add at least 3 comments to explain your code."));
    }

    #[test]
    fn test_comment_markers_count_both_styles() {
        assert_eq!(comment_marker_count("# one\n// two\n"), 2);
        assert_eq!(comment_marker_count("no comments here"), 0);
        assert_eq!(comment_marker_count("### heading"), 3);
    }

    #[test]
    fn test_rust_and_js_signatures_recognized() {
        assert_eq!(function_signature_name("pub fn do_thing() {"), Some("do_thing"));
        assert_eq!(
            function_signature_name("    pub async fn fetch_all(&self) {"),
            Some("fetch_all")
        );
        assert_eq!(
            function_signature_name("function renderPage() {"),
            Some("renderPage")
        );
        assert_eq!(function_signature_name("fn generic<T>(x: T) {"), Some("generic"));
        assert_eq!(function_signature_name("let x = 5;"), None);
        assert_eq!(function_signature_name("define(x)"), None);
    }

    #[test]
    fn test_empty_snippet_has_comment_criterion_only_plus_keywords() {
        // No lines, no functions: group 3 contributes one criterion and
        // each disallowed keyword one more.
        let s = standards();
        let result = evaluate("", &s);
        // min_comments=1 unsatisfied, both keywords absent: 2 of 3.
        assert!((result.alignment_percentage - 100.0 * 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_comment_rule_always_contributes_a_criterion() {
        let s = StandardsConfig {
            max_function_length: 50,
            min_comments: 0,
            max_line_length: 120,
            disallowed_keywords: vec![],
        };
        // Empty snippet: the comment criterion is still evaluated (and
        // satisfied with 0 >= 0), so alignment is 100 here.
        let result = evaluate("", &s);
        assert_eq!(result.alignment_percentage, 100.0);
        assert!(result.suggestions.is_empty());
    }
}
