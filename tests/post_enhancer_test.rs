//! Tests for the PostEnhancer operations using a scripted transport

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use postcraft::config::{Config, ConfigOptions};
use postcraft::credentials::{Credential, StaticKeyProvider};
use postcraft::enhancer::prompts::{HOOKS_SYSTEM_PROMPT, STYLE_GUARDRAILS, VERIFY_PROMPT};
use postcraft::enhancer::{
    AdvancedContext, EnhanceRequest, PostEnhancer, Tone, VerificationFailure, MAX_POST_CHARS,
};
use postcraft::error::{EngineError, TransportError, TransportErrorKind};
use postcraft::service::{CompletionRequest, Transport};

/// Owned copy of a request seen by the stub
#[derive(Debug, Clone)]
struct Recorded {
    model: String,
    credential: String,
    system_prompt: Option<String>,
    user_text: String,
    temperature: f32,
    max_output_tokens: u32,
}

/// Transport returning a fixed reply and recording every call
struct StubTransport {
    reply: Result<Option<String>, TransportError>,
    calls: Mutex<Vec<Recorded>>,
}

impl StubTransport {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(Some(text.to_string())),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn empty() -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(err: TransportError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(err),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_call(&self) -> Recorded {
        self.calls.lock().unwrap().last().cloned().expect("no calls")
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<Option<String>, TransportError> {
        self.calls.lock().unwrap().push(Recorded {
            model: request.model.to_string(),
            credential: request.credential.expose().to_string(),
            system_prompt: request.system_prompt.map(str::to_string),
            user_text: request.user_text.to_string(),
            temperature: request.sampling.temperature,
            max_output_tokens: request.sampling.max_output_tokens,
        });
        self.reply.clone()
    }
}

fn enhancer_with(transport: Arc<StubTransport>, key: Option<&str>) -> PostEnhancer {
    let config = Config::new(ConfigOptions::default()).unwrap();
    let keys = StaticKeyProvider::new(key.and_then(Credential::new));
    PostEnhancer::new(config, transport, Arc::new(keys))
}

// ============================================================================
// Guards
// ============================================================================

#[tokio::test]
async fn test_enhance_empty_input_makes_no_call() {
    let transport = StubTransport::replying("unused");
    let enhancer = enhancer_with(transport.clone(), Some("sk-test"));

    for draft in ["", "   ", "\n\t \n"] {
        let result = enhancer.enhance(&EnhanceRequest::new(draft)).await;
        assert_eq!(result, Err(EngineError::EmptyInput));
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_hooks_empty_input_makes_no_call() {
    let transport = StubTransport::replying("unused");
    let enhancer = enhancer_with(transport.clone(), Some("sk-test"));

    let result = enhancer.generate_hooks("  \n ").await;

    assert_eq!(result, Err(EngineError::EmptyInput));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_empty_input_checked_before_credential() {
    let transport = StubTransport::replying("unused");
    let enhancer = enhancer_with(transport.clone(), None);

    let result = enhancer.enhance(&EnhanceRequest::new(" ")).await;

    assert_eq!(result, Err(EngineError::EmptyInput));
}

#[tokio::test]
async fn test_enhance_missing_credential_makes_no_call() {
    let transport = StubTransport::replying("unused");
    let enhancer = enhancer_with(transport.clone(), None);

    let result = enhancer.enhance(&EnhanceRequest::new("My draft")).await;

    assert_eq!(result, Err(EngineError::MissingCredential));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_hooks_missing_credential_makes_no_call() {
    let transport = StubTransport::replying(r#"["a", "b", "c"]"#);
    let enhancer = enhancer_with(transport.clone(), None);

    let result = enhancer.generate_hooks("My draft").await;

    assert_eq!(result, Err(EngineError::MissingCredential));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_verify_missing_credential_makes_no_call() {
    let transport = StubTransport::replying("OK");
    let enhancer = enhancer_with(transport.clone(), None);

    let result = enhancer.verify_key(None).await;

    assert_eq!(result, Err(EngineError::MissingCredential));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_verify_blank_explicit_key_counts_as_absent() {
    let transport = StubTransport::replying("OK");
    let enhancer = enhancer_with(transport.clone(), None);

    let result = enhancer.verify_key(Some("   ")).await;

    assert_eq!(result, Err(EngineError::MissingCredential));
    assert_eq!(transport.call_count(), 0);
}

// ============================================================================
// Enhance
// ============================================================================

#[tokio::test]
async fn test_enhance_sends_tone_prompt_and_trimmed_draft() {
    let transport = StubTransport::replying("Better post.\n\n\n\nWhat do you think?");
    let enhancer = enhancer_with(transport.clone(), Some("sk-test"));

    let request = EnhanceRequest::new("  my rough draft \n").with_tone(Tone::Story);
    let result = enhancer.enhance(&request).await.unwrap();

    assert_eq!(result, "Better post.\n\nWhat do you think?");
    assert_eq!(transport.call_count(), 1);

    let call = transport.last_call();
    assert_eq!(call.model, "gpt-4o-mini");
    assert_eq!(call.credential, "sk-test");
    assert_eq!(call.user_text, "my rough draft");
    assert_eq!(call.temperature, 0.7);
    assert_eq!(call.max_output_tokens, 550);

    let system = call.system_prompt.unwrap();
    assert!(system.contains(STYLE_GUARDRAILS));
    assert!(system.contains("Tell it like a short real story"));
}

#[tokio::test]
async fn test_enhance_advanced_context_wins() {
    let transport = StubTransport::replying("Rewritten");
    let enhancer = enhancer_with(transport.clone(), Some("sk-test"));

    let request = EnhanceRequest::new("draft")
        .with_tone(Tone::Excited)
        .with_advanced(AdvancedContext {
            role: "Backend engineer".to_string(),
            motive: "Hiring".to_string(),
            style_context: "Dry humor".to_string(),
        });
    enhancer.enhance(&request).await.unwrap();

    let system = transport.last_call().system_prompt.unwrap();
    assert!(system.contains("- Who I am: Backend engineer"));
    assert!(!system.contains("Tone brief:"));
    assert!(!system.contains("Write with high energy"));
}

#[tokio::test]
async fn test_enhance_clamps_long_output() {
    let long = "word ".repeat(400);
    let transport = StubTransport::replying(&long);
    let enhancer = enhancer_with(transport, Some("sk-test"));

    let result = enhancer.enhance(&EnhanceRequest::new("draft")).await.unwrap();

    assert!(result.chars().count() <= MAX_POST_CHARS);
    assert!(result.ends_with('…'));
    assert!(!result.trim_end_matches('…').ends_with(char::is_whitespace));
}

#[tokio::test]
async fn test_enhance_empty_generation_is_an_error() {
    for transport in [StubTransport::empty(), StubTransport::replying("  \n ")] {
        let enhancer = enhancer_with(transport, Some("sk-test"));
        let result = enhancer.enhance(&EnhanceRequest::new("my draft")).await;
        assert_eq!(result, Err(EngineError::EmptyGeneration));
    }
}

#[tokio::test]
async fn test_enhance_transport_failures_keep_their_kind() {
    let kinds = [
        TransportErrorKind::Network,
        TransportErrorKind::Auth,
        TransportErrorKind::RateLimit,
        TransportErrorKind::Other,
    ];

    for kind in kinds {
        let transport = StubTransport::failing(TransportError::new(kind, "boom"));
        let enhancer = enhancer_with(transport.clone(), Some("sk-test"));

        let err = enhancer
            .enhance(&EnhanceRequest::new("my draft"))
            .await
            .unwrap_err();

        assert_eq!(err.transport_kind(), Some(kind));
        assert_eq!(transport.call_count(), 1);
    }
}

// ============================================================================
// Hooks
// ============================================================================

#[tokio::test]
async fn test_hooks_from_json() {
    let transport = StubTransport::replying(
        r#"["Most advice about hiring is backwards", "Last Tuesday our deploy took down payroll", "One checklist cut our review time in half"]"#,
    );
    let enhancer = enhancer_with(transport.clone(), Some("sk-test"));

    let hooks = enhancer.generate_hooks("draft").await.unwrap();

    assert_eq!(hooks[0], "Most advice about hiring is backwards");
    assert_eq!(hooks[2], "One checklist cut our review time in half");

    let call = transport.last_call();
    assert_eq!(call.system_prompt.as_deref(), Some(HOOKS_SYSTEM_PROMPT));
    assert_eq!(call.temperature, 0.9);
    assert_eq!(call.max_output_tokens, 250);
}

#[tokio::test]
async fn test_hooks_from_fallback_lines() {
    let transport = StubTransport::replying("1) First hook\n- Second hook\n\"Third hook\"");
    let enhancer = enhancer_with(transport, Some("sk-test"));

    let hooks = enhancer.generate_hooks("draft").await.unwrap();

    assert_eq!(hooks, ["First hook", "Second hook", "Third hook"]);
}

#[tokio::test]
async fn test_hooks_too_few_fails() {
    let transport = StubTransport::replying("Only one hook here");
    let enhancer = enhancer_with(transport, Some("sk-test"));

    let result = enhancer.generate_hooks("draft").await;

    assert_eq!(result, Err(EngineError::UnparseableHooks));
}

#[tokio::test]
async fn test_hooks_empty_generation() {
    let enhancer = enhancer_with(StubTransport::empty(), Some("sk-test"));

    let result = enhancer.generate_hooks("draft").await;

    assert_eq!(result, Err(EngineError::EmptyGeneration));
}

// ============================================================================
// Verify
// ============================================================================

#[tokio::test]
async fn test_verify_accepts_ack_in_any_case() {
    for reply in ["OK", "ok", "  Ok \n", "OK."] {
        let transport = StubTransport::replying(reply);
        let enhancer = enhancer_with(transport.clone(), Some("sk-stored"));

        let verification = enhancer.verify_key(None).await.unwrap();

        assert!(verification.ok, "reply {:?} should verify", reply);
        assert!(verification.error.is_none());
    }
}

#[tokio::test]
async fn test_verify_sends_fixed_prompt() {
    let transport = StubTransport::replying("OK");
    let enhancer = enhancer_with(transport.clone(), Some("sk-stored"));

    enhancer.verify_key(None).await.unwrap();

    let call = transport.last_call();
    assert_eq!(call.user_text, VERIFY_PROMPT);
    assert_eq!(call.system_prompt, None);
    assert_eq!(call.temperature, 0.0);
    assert_eq!(call.max_output_tokens, 5);
}

#[tokio::test]
async fn test_verify_unrelated_reply_is_not_ok() {
    let transport = StubTransport::replying("Hello there");
    let enhancer = enhancer_with(transport, Some("sk-stored"));

    let verification = enhancer.verify_key(None).await.unwrap();

    assert!(!verification.ok);
    assert_eq!(verification.failure, Some(VerificationFailure::UnexpectedReply));
    assert!(verification.error.unwrap().contains("Hello there"));
}

#[tokio::test]
async fn test_verify_transport_failure_is_captured() {
    let transport = StubTransport::failing(TransportError::auth("OpenAI API key invalid or expired"));
    let enhancer = enhancer_with(transport, Some("sk-stored"));

    let verification = enhancer.verify_key(None).await.unwrap();

    assert!(!verification.ok);
    assert_eq!(
        verification.failure,
        Some(VerificationFailure::Transport(TransportErrorKind::Auth))
    );
    assert_eq!(
        verification.error.as_deref(),
        Some("OpenAI API key invalid or expired")
    );
}

#[tokio::test]
async fn test_verify_explicit_key_bypasses_provider() {
    let transport = StubTransport::replying("OK");
    let enhancer = enhancer_with(transport.clone(), Some("sk-stored"));

    enhancer.verify_key(Some("sk-candidate")).await.unwrap();

    assert_eq!(transport.last_call().credential, "sk-candidate");
}

#[tokio::test]
async fn test_verify_into_result() {
    let enhancer = enhancer_with(StubTransport::replying("nope"), Some("sk-stored"));

    let err = enhancer
        .verify_key(None)
        .await
        .unwrap()
        .into_result()
        .unwrap_err();

    assert!(matches!(err, EngineError::VerificationFailed { .. }));
}
