//! Request and result types for the enhancer

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, TransportErrorKind};

/// Style preset for an enhancement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Default,
    Excited,
    Story,
    Professional,
    Casual,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Default,
        Tone::Excited,
        Tone::Story,
        Tone::Professional,
        Tone::Casual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Excited => "excited",
            Self::Story => "story",
            Self::Professional => "professional",
            Self::Casual => "casual",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Tone::ALL
            .into_iter()
            .find(|tone| tone.as_str() == wanted)
            .ok_or_else(|| format!("unknown tone '{}'", s))
    }
}

/// Free-form context that overrides the tone when fully filled in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedContext {
    pub role: String,
    pub motive: String,
    pub style_context: String,
}

impl AdvancedContext {
    /// True only when role, motive and style context are all non-blank
    pub fn is_complete(&self) -> bool {
        !self.role.trim().is_empty()
            && !self.motive.trim().is_empty()
            && !self.style_context.trim().is_empty()
    }
}

/// Input of the enhance operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceRequest {
    pub draft_text: String,
    #[serde(default)]
    pub tone: Option<Tone>,
    #[serde(default)]
    pub advanced: Option<AdvancedContext>,
}

impl EnhanceRequest {
    pub fn new(draft_text: impl Into<String>) -> Self {
        Self {
            draft_text: draft_text.into(),
            tone: None,
            advanced: None,
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn with_advanced(mut self, advanced: AdvancedContext) -> Self {
        self.advanced = Some(advanced);
        self
    }

    /// The advanced context, if it is complete enough to take precedence
    pub fn active_advanced(&self) -> Option<&AdvancedContext> {
        self.advanced.as_ref().filter(|ctx| ctx.is_complete())
    }
}

/// Why a verification did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    /// The single call failed
    Transport(TransportErrorKind),
    /// The call succeeded but the reply did not contain the acknowledgment
    UnexpectedReply,
}

/// Outcome of a key verification round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVerification {
    pub ok: bool,
    pub error: Option<String>,
    pub failure: Option<VerificationFailure>,
}

impl KeyVerification {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
            failure: None,
        }
    }

    pub fn failed(failure: VerificationFailure, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            failure: Some(failure),
        }
    }

    /// Turn a failed verification into [`EngineError::VerificationFailed`]
    pub fn into_result(self) -> Result<(), EngineError> {
        if self.ok {
            Ok(())
        } else {
            Err(EngineError::VerificationFailed {
                reason: self
                    .error
                    .unwrap_or_else(|| "Verification failed.".to_string()),
            })
        }
    }
}
