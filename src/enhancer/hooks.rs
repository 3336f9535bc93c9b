//! Extraction of exactly three hooks from free-form model output
//!
//! The JSON array the prompt asks for is tried first. When the model ignores
//! the format, each line is cleaned of list markers and quotes instead.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::EngineError;

/// Number of hooks returned by every successful parse
pub const HOOK_COUNT: usize = 3;

static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*•]\s+").unwrap());
static NUMBERING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+[).\]]\s+").unwrap());
static LEADING_QUOTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^["'“”]+"#).unwrap());
static TRAILING_QUOTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["'“”]+$"#).unwrap());

/// Parse raw output into exactly three hooks
pub fn parse_hooks(raw: &str) -> Result<[String; HOOK_COUNT], EngineError> {
    let content = raw.trim();

    let hooks = match parse_hooks_json(content) {
        Some(hooks) => hooks,
        None => {
            debug!("Hooks response is not a usable JSON array, falling back to lines");
            fallback_extract_hooks(content)
        }
    };

    hooks.try_into().map_err(|_| EngineError::UnparseableHooks)
}

/// Structured path: a JSON array made only of strings with at least three
/// non-blank entries
pub fn parse_hooks_json(content: &str) -> Option<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    let items = value.as_array()?;

    let mut hooks = Vec::with_capacity(items.len());
    for item in items {
        let text = item.as_str()?.trim();
        if !text.is_empty() {
            hooks.push(text.to_string());
        }
    }

    if hooks.len() < HOOK_COUNT {
        return None;
    }

    hooks.truncate(HOOK_COUNT);
    Some(hooks)
}

/// Heuristic path: the first three non-blank lines after cleanup. May
/// return fewer than three.
pub fn fallback_extract_hooks(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .take(HOOK_COUNT)
        .collect()
}

/// Strip a leading bullet or numeral marker and surrounding quote marks
pub fn clean_line(line: &str) -> String {
    let line = BULLET_RE.replace(line, "");
    let line = NUMBERING_RE.replace(&line, "");
    let line = LEADING_QUOTES_RE.replace(&line, "");
    let line = TRAILING_QUOTES_RE.replace(&line, "");
    line.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_line_markers() {
        assert_eq!(clean_line("1) First"), "First");
        assert_eq!(clean_line("2. Second"), "Second");
        assert_eq!(clean_line("3] Third"), "Third");
        assert_eq!(clean_line("- Dash"), "Dash");
        assert_eq!(clean_line("* Star"), "Star");
        assert_eq!(clean_line("• Bullet"), "Bullet");
    }

    #[test]
    fn test_clean_line_quotes() {
        assert_eq!(clean_line("\"Quoted\""), "Quoted");
        assert_eq!(clean_line("“Curly”"), "Curly");
        assert_eq!(clean_line("1. 'Both'"), "Both");
    }

    #[test]
    fn test_clean_line_keeps_inner_text() {
        // A marker needs trailing whitespace to count as one
        assert_eq!(clean_line("2024 was odd"), "2024 was odd");
        assert_eq!(clean_line("-5% churn surprised us"), "-5% churn surprised us");
    }

    #[test]
    fn test_json_rejects_mixed_types() {
        assert_eq!(parse_hooks_json(r#"["a", "b", 3, "d"]"#), None);
    }

    #[test]
    fn test_json_rejects_objects() {
        assert_eq!(parse_hooks_json(r#"{"hooks": ["a", "b", "c"]}"#), None);
    }

    #[test]
    fn test_json_skips_blank_entries() {
        assert_eq!(
            parse_hooks_json(r#"["a", "  ", "b", "c"]"#),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }
}
