//! Claude API service

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::common::{non_blank, parse_body, post_json};
use super::{CompletionRequest, Transport};
use crate::error::TransportError;

const PROVIDER: &str = "Claude";

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude API request structure
#[derive(Debug, Serialize)]
struct ClaudeApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Claude API response structure
#[derive(Debug, Deserialize)]
struct ClaudeApiResponse {
    #[serde(default)]
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

fn build_claude_url(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let base_url = base_url.strip_suffix("/v1").unwrap_or(base_url);
    format!("{}/v1/messages", base_url)
}

/// Anthropic messages transport
#[derive(Debug, Clone)]
pub struct ClaudeTransport {
    client: Client,
    url: String,
}

impl ClaudeTransport {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: build_claude_url(base_url),
        }
    }
}

#[async_trait]
impl Transport for ClaudeTransport {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<Option<String>, TransportError> {
        let payload = ClaudeApiRequest {
            model: request.model,
            max_tokens: request.sampling.max_output_tokens,
            temperature: request.sampling.temperature,
            system: request.system_prompt,
            messages: vec![ClaudeMessage {
                role: "user",
                content: request.user_text,
            }],
        };

        let body = post_json(
            &self.client,
            PROVIDER,
            &self.url,
            &[
                ("x-api-key", request.credential.expose()),
                ("anthropic-version", ANTHROPIC_VERSION),
            ],
            &payload,
        )
        .await?;

        let Some(api_response) = parse_body::<ClaudeApiResponse>(PROVIDER, &body) else {
            return Ok(None);
        };

        let text = api_response
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(non_blank(text))
    }
}
