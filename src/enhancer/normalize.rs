//! Post-processing of generated posts

use std::sync::LazyLock;

use regex::Regex;

use crate::error::EngineError;

/// Hard ceiling on the length of an enhanced post, in characters
pub const MAX_POST_CHARS: usize = 1300;

/// Characters kept before the ellipsis when a post is too long
const TRUNCATE_AT_CHARS: usize = 1290;

pub const ELLIPSIS: char = '…';

static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Trim, unify line endings to `\n` and collapse runs of three or more
/// newlines into a single blank line
pub fn normalize_spacing(text: &str) -> String {
    let unified = text.trim().replace("\r\n", "\n").replace('\r', "\n");
    BLANK_RUN_RE
        .replace_all(&unified, "\n\n")
        .trim()
        .to_string()
}

/// Clamp to [`MAX_POST_CHARS`], ending a cut post with a single ellipsis
pub fn clamp_to_limit(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_POST_CHARS {
        return trimmed.to_string();
    }

    let head: String = trimmed.chars().take(TRUNCATE_AT_CHARS).collect();
    let mut clamped = head.trim_end().to_string();
    clamped.push(ELLIPSIS);
    clamped
}

/// Full enhance-path normalization: spacing first, then the length clamp
pub fn normalize_post(text: &str) -> String {
    clamp_to_limit(&normalize_spacing(text))
}

/// Normalize raw generator output, rejecting missing or blank content
pub fn normalize_generation(raw: Option<&str>) -> Result<String, EngineError> {
    match raw.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(normalize_post(text)),
        _ => Err(EngineError::EmptyGeneration),
    }
}
