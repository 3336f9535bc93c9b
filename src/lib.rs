//! postcraft library - LLM-assisted rewriting of social posts

pub mod config;
pub mod credentials;
pub mod enhancer;
pub mod error;
pub mod http_logger;
pub mod service;

// Re-export commonly used types
pub use config::{Config, ConfigOptions, Provider};
pub use credentials::{Credential, KeyProvider, KeyStore};
pub use enhancer::{EnhanceRequest, KeyVerification, PostEnhancer, Tone};
pub use error::{EngineError, TransportError, TransportErrorKind};
pub use service::{build_transport, Transport};
