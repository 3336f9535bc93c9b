//! OpenAI API service

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::common::{non_blank, parse_body, post_json};
use super::{CompletionRequest, Transport};
use crate::error::TransportError;

const PROVIDER: &str = "OpenAI";

/// OpenAI API request structure
#[derive(Debug, Serialize)]
struct OpenAIApiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// OpenAI API response structure
#[derive(Debug, Deserialize)]
struct OpenAIApiResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

fn build_openai_url(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let base_url = base_url.strip_suffix("/v1").unwrap_or(base_url);
    format!("{}/v1/chat/completions", base_url)
}

/// Chat completions transport
#[derive(Debug, Clone)]
pub struct OpenAITransport {
    client: Client,
    url: String,
}

impl OpenAITransport {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: build_openai_url(base_url),
        }
    }
}

#[async_trait]
impl Transport for OpenAITransport {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<Option<String>, TransportError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt {
            messages.push(OpenAIMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(OpenAIMessage {
            role: "user",
            content: request.user_text,
        });

        let payload = OpenAIApiRequest {
            model: request.model,
            messages,
            temperature: request.sampling.temperature,
            max_tokens: request.sampling.max_output_tokens,
        };

        let auth = format!("Bearer {}", request.credential.expose());
        let body = post_json(
            &self.client,
            PROVIDER,
            &self.url,
            &[("Authorization", auth.as_str())],
            &payload,
        )
        .await?;

        let Some(api_response) = parse_body::<OpenAIApiResponse>(PROVIDER, &body) else {
            return Ok(None);
        };

        Ok(api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .and_then(non_blank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_openai_url() {
        assert_eq!(
            build_openai_url("https://api.openai.com"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            build_openai_url("https://api.openai.com/"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            build_openai_url("https://api.openai.com/v1"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            build_openai_url("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_omits_missing_system_message() {
        let payload = OpenAIApiRequest {
            model: "gpt-4o-mini",
            messages: vec![OpenAIMessage {
                role: "user",
                content: "Reply with: OK",
            }],
            temperature: 0.0,
            max_tokens: 5,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 5);
    }
}
