//! Transports for the different generation providers

pub mod common;
pub(crate) mod claude;
pub(crate) mod gemini;
pub(crate) mod openai;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use crate::config::{Config, Provider};
use crate::credentials::Credential;
use crate::error::TransportError;

pub use claude::ClaudeTransport;
pub use common::{classify_status, extract_error_message};
pub use gemini::GeminiTransport;
pub use openai::OpenAITransport;

/// Sampling parameters for one request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Everything a transport needs for a single completion
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub credential: &'a Credential,
    pub system_prompt: Option<&'a str>,
    pub user_text: &'a str,
    pub sampling: SamplingConfig,
}

/// One request/response round trip against the generation service.
///
/// `Ok(None)` means the service answered successfully but without any text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<Option<String>, TransportError>;
}

/// Build the transport matching the configured provider
pub fn build_transport(config: &Config) -> Result<Arc<dyn Transport>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let transport: Arc<dyn Transport> = match config.provider {
        Provider::OpenAI => Arc::new(OpenAITransport::new(client, &config.base_url)),
        Provider::Claude => Arc::new(ClaudeTransport::new(client, &config.base_url)),
        Provider::Gemini => Arc::new(GeminiTransport::new(client, &config.base_url)),
    };

    Ok(transport)
}
