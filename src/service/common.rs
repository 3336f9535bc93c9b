//! Request plumbing shared by the provider transports

use std::time::Instant;

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{TransportError, TransportErrorKind};
use crate::http_logger::{self, HttpResponseLog};

/// Classify an HTTP status; `None` for success
pub fn classify_status(status: u16) -> Option<TransportErrorKind> {
    match status {
        200..=299 => None,
        401 | 403 => Some(TransportErrorKind::Auth),
        429 => Some(TransportErrorKind::RateLimit),
        _ => Some(TransportErrorKind::Other),
    }
}

/// Pull a human readable message out of a provider error body.
///
/// Handles `{"error": {"message": ".."}}` (OpenAI, Claude, Gemini) and
/// `{"error": ".."}`.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;

    let message = match error {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(obj) => obj.get("message")?.as_str()?.to_string(),
        _ => return None,
    };

    let message = message.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

fn status_error(provider: &str, status: u16, body: &str) -> Option<TransportError> {
    let kind = classify_status(status)?;
    let detail = extract_error_message(body).unwrap_or_else(|| body.trim().to_string());

    let message = match (kind, status) {
        (TransportErrorKind::Auth, 401) => format!("{} API key invalid or expired", provider),
        (TransportErrorKind::Auth, _) => {
            format!("{} access denied, API key may be disabled", provider)
        }
        (TransportErrorKind::RateLimit, _) => format!("{} rate limit exceeded", provider),
        _ => format!("{} API failed: {}", provider, status),
    };

    let message = if detail.is_empty() {
        message
    } else {
        format!("{} - {}", message, detail)
    };

    Some(TransportError::new(kind, message))
}

fn send_error(provider: &str, err: &reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::other(format!("{} request could not be built: {}", provider, err))
    } else {
        TransportError::network(format!("{} API request failed: {}", provider, err))
    }
}

/// POST a JSON payload and return the raw success body.
///
/// Non-2xx statuses and send failures are mapped to a classified
/// [`TransportError`]. Exactly one attempt is made.
pub(crate) async fn post_json<T: Serialize>(
    client: &Client,
    provider: &str,
    url: &str,
    headers: &[(&str, &str)],
    payload: &T,
) -> Result<String, TransportError> {
    let body = serde_json::to_string(payload).map_err(|e| {
        TransportError::other(format!("Failed to encode {} request: {}", provider, e))
    })?;

    let request_log =
        http_logger::request_log_if_enabled(provider, "POST", url, headers, Some(body.as_str()));

    let mut builder = client
        .post(url)
        .header("Content-Type", "application/json")
        .body(body);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let start_time = Instant::now();
    info!("Calling {} API: {}", provider, url);

    let response = builder.send().await;
    let duration_ms = start_time.elapsed().as_millis() as u64;
    info!("{} API call completed in {}ms", provider, duration_ms);

    let resp = match response {
        Ok(resp) => resp,
        Err(e) => {
            let err = send_error(provider, &e);
            if let Some(log) = &request_log {
                http_logger::log_exchange(log, None, duration_ms, Some(&err.message));
            }
            return Err(err);
        }
    };

    let status = resp.status().as_u16();
    let response_headers = request_log
        .as_ref()
        .map(|_| http_logger::extract_response_headers(&resp));

    let body_text = match resp.text().await {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read {} response body: {}", provider, e);
            return Err(TransportError::network(format!(
                "Failed to read {} response: {}",
                provider, e
            )));
        }
    };

    if let (Some(log), Some(headers)) = (&request_log, response_headers) {
        http_logger::log_exchange(
            log,
            Some(&HttpResponseLog {
                status,
                headers,
                body: Some(body_text.clone()),
            }),
            duration_ms,
            None,
        );
    }

    if let Some(err) = status_error(provider, status, &body_text) {
        return Err(err);
    }

    Ok(body_text)
}

/// Decode a success body into a provider response type.
///
/// An undecodable body means the service answered without usable content,
/// so it yields `None` rather than a transport error.
pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(
    provider: &str,
    body: &str,
) -> Option<T> {
    match serde_json::from_str(body) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(
                "Failed to parse {} response: {} - {}",
                provider,
                e,
                http_logger::truncate_utf8_safe(body, 500)
            );
            None
        }
    }
}

/// Treat blank text as no content
pub(crate) fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
