//! HTTP Request Logger
//!
//! Appends every generation request and its response to a file when enabled
//! via environment variable. Set `POSTCRAFT_HTTP_LOG=1` or
//! `POSTCRAFT_HTTP_LOG=true` to enable. API keys are masked.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use chrono::Local;
use tracing::warn;
use uuid::Uuid;

/// Environment variable to control HTTP logging
pub const ENV_HTTP_LOG: &str = "POSTCRAFT_HTTP_LOG";

/// Directory holding the log, relative to the working directory
const LOG_DIR_NAME: &str = ".postcraft";

/// Log file name
const LOG_FILE_NAME: &str = "http_requests.log";

/// Maximum body size to log (10KB)
const MAX_BODY_SIZE: usize = 10000;

/// Sensitive headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "x-api-key",
    "x-goog-api-key",
    "proxy-authorization",
    "set-cookie",
    "cookie",
];

/// Global mutex for thread-safe log writing
static LOG_MUTEX: Mutex<()> = Mutex::new(());

/// Check if HTTP logging is enabled
pub fn is_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        std::env::var(ENV_HTTP_LOG)
            .map(|v| is_truthy(&v))
            .unwrap_or(false)
    })
}

fn is_truthy(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "1" || v == "true" || v == "yes" || v == "on"
}

fn get_log_file_path() -> PathBuf {
    let dir = PathBuf::from(LOG_DIR_NAME);
    if !dir.exists() {
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("Failed to create {} directory: {}", LOG_DIR_NAME, e);
        }
    }
    dir.join(LOG_FILE_NAME)
}

/// Outgoing request as it will be logged
pub struct HttpRequestLog {
    pub request_id: String,
    pub provider: String,
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Response as it will be logged
pub struct HttpResponseLog {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Build a request log entry, or `None` when logging is disabled so callers
/// skip serializing anything
pub fn request_log_if_enabled(
    provider: &str,
    method: &str,
    url: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> Option<HttpRequestLog> {
    if !is_enabled() {
        return None;
    }

    Some(HttpRequestLog {
        request_id: Uuid::new_v4().to_string(),
        provider: provider.to_string(),
        method: method.to_string(),
        url: url.to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        body: body.map(|s| s.to_string()),
    })
}

/// Extract headers from a reqwest Response
pub fn extract_response_headers(response: &reqwest::Response) -> Vec<(String, String)> {
    response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            )
        })
        .collect()
}

/// Log an HTTP request and its response or error
pub fn log_exchange(
    request: &HttpRequestLog,
    response: Option<&HttpResponseLog>,
    duration_ms: u64,
    error: Option<&str>,
) {
    if !is_enabled() {
        return;
    }

    let content = format_exchange(request, response, duration_ms, error);
    if let Err(e) = write_log(&get_log_file_path(), &content) {
        warn!("Failed to write HTTP log: {}", e);
    }
}

/// Render one exchange as a log block
pub fn format_exchange(
    request: &HttpRequestLog,
    response: Option<&HttpResponseLog>,
    duration_ms: u64,
    error: Option<&str>,
) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let separator = "=".repeat(80);

    let mut log_content = String::new();
    log_content.push_str(&format!(
        "\n{}\n[{}] [{}] {} {} (request {})\n{}\n",
        separator,
        timestamp,
        request.provider,
        request.method,
        request.url,
        request.request_id,
        separator
    ));

    log_content.push_str("\n--- Request Headers ---\n");
    for (name, value) in &request.headers {
        log_content.push_str(&format!("{}: {}\n", name, mask_sensitive_header(name, value)));
    }

    if let Some(body) = &request.body {
        log_content.push_str("\n--- Request Body ---\n");
        log_content.push_str(&format_body(body));
        log_content.push('\n');
    }

    if let Some(resp) = response {
        log_content.push_str(&format!("\n--- Response ({}ms) ---\n", duration_ms));
        log_content.push_str(&format!("Status: {}\n", resp.status));

        log_content.push_str("\n--- Response Headers ---\n");
        for (name, value) in &resp.headers {
            log_content.push_str(&format!("{}: {}\n", name, mask_sensitive_header(name, value)));
        }

        if let Some(body) = &resp.body {
            log_content.push_str("\n--- Response Body ---\n");
            log_content.push_str(&format_body(body));
            log_content.push('\n');
        }
    }

    if let Some(err) = error {
        log_content.push_str(&format!("\n--- Error ({}ms) ---\n", duration_ms));
        log_content.push_str(err);
        log_content.push('\n');
    }

    log_content.push_str(&format!("\n{}\n", separator));
    log_content
}

/// Write log content to file (thread-safe)
fn write_log(path: &Path, content: &str) -> std::io::Result<()> {
    // Concurrent requests must not interleave their blocks
    let _guard = LOG_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Check if a header is sensitive and should be masked
pub fn is_sensitive_header(name: &str) -> bool {
    let name_lower = name.to_lowercase();
    SENSITIVE_HEADERS.iter().any(|h| name_lower == *h)
}

fn mask_sensitive_header(name: &str, value: &str) -> String {
    if is_sensitive_header(name) {
        mask_token(value)
    } else {
        value.to_string()
    }
}

/// Mask a token, keeping the first and last four characters when long enough
pub fn mask_token(value: &str) -> String {
    let (prefix, token) = match value.strip_prefix("Bearer ") {
        Some(token) => ("Bearer ", token),
        None => ("", value),
    };

    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}...{}", prefix, head, tail)
    } else {
        format!("{}****", prefix)
    }
}

/// Format body for logging with truncation (UTF-8 safe)
fn format_body(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let pretty = serde_json::to_string_pretty(&json).unwrap_or_else(|_| body.to_string());
        truncate_utf8_safe(&pretty, MAX_BODY_SIZE)
    } else {
        truncate_utf8_safe(body, MAX_BODY_SIZE)
    }
}

/// Truncate string at UTF-8 character boundary (safe for multi-byte chars)
pub fn truncate_utf8_safe(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...\n[truncated, total {} bytes]", &s[..end], s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" TRUE "));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn test_format_exchange_masks_keys() {
        let request = HttpRequestLog {
            request_id: "req-1".to_string(),
            provider: "openai".to_string(),
            method: "POST".to_string(),
            url: "https://api.openai.com/v1/chat/completions".to_string(),
            headers: vec![
                ("Authorization".to_string(), "Bearer sk-1234567890abcdef".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: Some(r#"{"model":"gpt-4o-mini"}"#.to_string()),
        };
        let response = HttpResponseLog {
            status: 429,
            headers: vec![],
            body: Some("slow down".to_string()),
        };

        let log = format_exchange(&request, Some(&response), 12, None);

        assert!(log.contains("Bearer sk-1...cdef"));
        assert!(!log.contains("sk-1234567890abcdef"));
        assert!(log.contains("Status: 429"));
        assert!(log.contains("\"model\": \"gpt-4o-mini\""));
        assert!(log.contains("request req-1"));
    }

    #[test]
    fn test_format_exchange_with_error() {
        let request = HttpRequestLog {
            request_id: "req-2".to_string(),
            provider: "claude".to_string(),
            method: "POST".to_string(),
            url: "https://api.anthropic.com/v1/messages".to_string(),
            headers: vec![],
            body: None,
        };

        let log = format_exchange(&request, None, 5, Some("connection refused"));

        assert!(log.contains("--- Error (5ms) ---"));
        assert!(log.contains("connection refused"));
        assert!(!log.contains("--- Response"));
    }
}
