//! Chatform connects small chat demos to hosted language models and turns
//! their free-form replies into validated, typed records.
//!
//! # Overview
//! The crate covers the glue a structured-reply demo needs, end to end:
//!
//! - Chat requests against hosted endpoints (Hugging Face router) or a
//!   local Ollama server
//! - Prompt templates with named placeholders and pre-bound variables
//! - Field schemas that drive prompt instructions, wire schemas and
//!   validation from one declaration
//! - Reply extraction: control-marker stripping, tolerant code-fence
//!   unwrapping, JSON decoding and field validation with precise failure
//!   reporting
//!
//! Extraction never retries and never loses the raw reply; callers decide
//! what to show when a model goes off script.

// Re-export for convenience
pub use async_trait::async_trait;

/// Backend implementations for supported chat endpoints
pub mod backends;

/// Builder pattern for configuring and instantiating chat providers
pub mod builder;

/// Chat messages, replies and the provider trait
pub mod chat;

/// Error types and handling
pub mod error;

/// Turning raw replies into validated records
pub mod extract;

/// Bounded in-run conversation transcript
pub mod memory;

/// Prompt templates with named placeholders
pub mod prompt;

/// Field schemas, format instructions and wire schemas
pub mod schema;

/// Secret store for API keys and other sensitive information
pub mod secret_store;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
