//! Gemini API service

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::common::{non_blank, parse_body, post_json};
use super::{CompletionRequest, Transport};
use crate::error::TransportError;

const PROVIDER: &str = "Gemini";

/// Gemini API request structure
#[derive(Debug, Serialize)]
struct GeminiApiRequest<'a> {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent<'a>>,
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiApiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

fn build_gemini_url(base_url: &str, model: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let base_url = base_url.strip_suffix("/v1beta").unwrap_or(base_url);
    format!("{}/v1beta/models/{}:generateContent", base_url, model)
}

/// generateContent transport
#[derive(Debug, Clone)]
pub struct GeminiTransport {
    client: Client,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<Option<String>, TransportError> {
        let payload = GeminiApiRequest {
            system_instruction: request.system_prompt.map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text }],
            }),
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart {
                    text: request.user_text,
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.sampling.temperature,
                max_output_tokens: request.sampling.max_output_tokens,
            },
        };

        // The model is part of the path, so the URL is built per request
        let url = build_gemini_url(&self.base_url, request.model);
        let body = post_json(
            &self.client,
            PROVIDER,
            &url,
            &[("x-goog-api-key", request.credential.expose())],
            &payload,
        )
        .await?;

        let Some(api_response) = parse_body::<GeminiApiResponse>(PROVIDER, &body) else {
            return Ok(None);
        };

        let text = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(non_blank(text))
    }
}
