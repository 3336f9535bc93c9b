//! Post Enhancer module
//! Builds prompts, calls the generation service and shapes its output

pub mod hooks;
pub mod normalize;
pub mod post_enhancer;
pub mod prompts;
pub mod types;

pub use hooks::{parse_hooks, HOOK_COUNT};
pub use normalize::{normalize_post, MAX_POST_CHARS};
pub use post_enhancer::{Operation, PostEnhancer};
pub use prompts::{build_enhance_prompt, build_hooks_prompt};
pub use types::{AdvancedContext, EnhanceRequest, KeyVerification, Tone, VerificationFailure};
