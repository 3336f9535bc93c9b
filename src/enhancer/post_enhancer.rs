//! Post Enhancer - core request/response logic
//!
//! Three operations share one dispatch path:
//! - `enhance`: rewrite a draft by tone or advanced context
//! - `generate_hooks`: propose three opening lines
//! - `verify_key`: check that a credential works
//!
//! Each operation makes exactly one transport call and never retries.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::credentials::{Credential, KeyProvider};
use crate::error::{EngineError, TransportError};
use crate::service::{CompletionRequest, SamplingConfig, Transport};

use super::hooks::{parse_hooks, HOOK_COUNT};
use super::normalize::normalize_generation;
use super::prompts::{build_enhance_prompt, build_hooks_prompt, VERIFY_ACK_TOKEN, VERIFY_PROMPT};
use super::types::{EnhanceRequest, KeyVerification, VerificationFailure};

/// Operation being dispatched; fixes the sampling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Enhance,
    Hooks,
    Verify,
}

impl Operation {
    pub fn sampling(&self) -> SamplingConfig {
        match self {
            Self::Enhance => SamplingConfig {
                temperature: 0.7,
                max_output_tokens: 550,
            },
            Self::Hooks => SamplingConfig {
                temperature: 0.9,
                max_output_tokens: 250,
            },
            Self::Verify => SamplingConfig {
                temperature: 0.0,
                max_output_tokens: 5,
            },
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enhance => write!(f, "enhance"),
            Self::Hooks => write!(f, "hooks"),
            Self::Verify => write!(f, "verify"),
        }
    }
}

/// Post Enhancer
pub struct PostEnhancer {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    keys: Arc<dyn KeyProvider>,
}

impl PostEnhancer {
    pub fn new(
        config: Arc<Config>,
        transport: Arc<dyn Transport>,
        keys: Arc<dyn KeyProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            keys,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rewrite a draft post.
    ///
    /// The result is trimmed, has at most one blank line between paragraphs
    /// and is at most 1300 characters long.
    pub async fn enhance(&self, request: &EnhanceRequest) -> Result<String, EngineError> {
        let draft = require_draft(&request.draft_text)?;
        let credential = self.resolve_credential(None).await?;

        info!(
            "Starting post enhancement ({})",
            match request.active_advanced() {
                Some(_) => "advanced".to_string(),
                None => format!("tone: {}", request.tone.unwrap_or_default()),
            }
        );

        let system_prompt = build_enhance_prompt(request);
        let raw = self
            .dispatch(Operation::Enhance, &credential, Some(&system_prompt), draft)
            .await?;

        let enhanced = normalize_generation(raw.as_deref())?;
        info!("Enhancement complete ({} chars)", enhanced.chars().count());
        Ok(enhanced)
    }

    /// Generate exactly three candidate hooks for a draft
    pub async fn generate_hooks(
        &self,
        draft_text: &str,
    ) -> Result<[String; HOOK_COUNT], EngineError> {
        let draft = require_draft(draft_text)?;
        let credential = self.resolve_credential(None).await?;

        info!("Generating hooks...");
        let raw = self
            .dispatch(Operation::Hooks, &credential, Some(build_hooks_prompt()), draft)
            .await?;

        let content = match raw.as_deref().map(str::trim) {
            Some(content) if !content.is_empty() => content,
            _ => return Err(EngineError::EmptyGeneration),
        };

        parse_hooks(content)
    }

    /// Verify a credential with a trivial round trip.
    ///
    /// An explicit non-blank key is tested as-is; otherwise the key provider
    /// is asked. Only a missing credential is returned as an error, every
    /// other failure is reported through [`KeyVerification`].
    pub async fn verify_key(
        &self,
        explicit_key: Option<&str>,
    ) -> Result<KeyVerification, EngineError> {
        let explicit = explicit_key.and_then(Credential::new);
        let credential = self.resolve_credential(explicit).await?;

        info!("Verifying API key...");
        let outcome = self
            .dispatch(Operation::Verify, &credential, None, VERIFY_PROMPT)
            .await;

        let verification = match outcome {
            Ok(raw) => {
                let reply = raw.as_deref().unwrap_or("").trim();
                if reply.to_lowercase().contains(VERIFY_ACK_TOKEN) {
                    KeyVerification::success()
                } else {
                    KeyVerification::failed(
                        VerificationFailure::UnexpectedReply,
                        format!("Unexpected verification reply: {:?}", reply),
                    )
                }
            }
            Err(e) => KeyVerification::failed(VerificationFailure::Transport(e.kind), e.message),
        };

        if verification.ok {
            info!("API key verified");
        } else {
            warn!(
                "API key verification failed: {}",
                verification.error.as_deref().unwrap_or("")
            );
        }

        Ok(verification)
    }

    async fn resolve_credential(
        &self,
        explicit: Option<Credential>,
    ) -> Result<Credential, EngineError> {
        if let Some(credential) = explicit {
            return Ok(credential);
        }

        self.keys
            .get_credential()
            .await
            .ok_or(EngineError::MissingCredential)
    }

    /// Single transport call for one operation
    async fn dispatch(
        &self,
        operation: Operation,
        credential: &Credential,
        system_prompt: Option<&str>,
        user_text: &str,
    ) -> Result<Option<String>, TransportError> {
        let request = CompletionRequest {
            model: &self.config.model,
            credential,
            system_prompt,
            user_text,
            sampling: operation.sampling(),
        };

        info!(
            "Dispatching {} request to {} (model {})",
            operation, self.config.provider, self.config.model
        );

        let result = self.transport.complete(&request).await;
        if let Err(e) = &result {
            warn!("{} request failed ({}): {}", operation, e.kind, e.message);
        }
        result
    }
}

/// Trim the draft, rejecting blank input before any network work
fn require_draft(draft_text: &str) -> Result<&str, EngineError> {
    let draft = draft_text.trim();
    if draft.is_empty() {
        Err(EngineError::EmptyInput)
    } else {
        Ok(draft)
    }
}
