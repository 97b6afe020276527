//! Builder module for configuring and instantiating chat backends.
//!
//! This module provides a fluent builder for selecting a backend and
//! setting model, sampling and schema options before constructing a
//! [`ChatProvider`].

use crate::{chat::ChatProvider, error::ChatError, schema::Schema};

/// Supported chat backends.
#[derive(Debug, Clone)]
pub enum ChatBackend {
    /// Hosted models behind the Hugging Face Inference Providers router
    HuggingFace,
    /// Ollama server for locally hosted models
    Ollama,
}

/// Implements string parsing for ChatBackend enum.
///
/// The parsing is case-insensitive.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use chatform::builder::ChatBackend;
///
/// let backend = ChatBackend::from_str("ollama").unwrap();
/// assert!(matches!(backend, ChatBackend::Ollama));
///
/// let err = ChatBackend::from_str("petals").unwrap_err();
/// assert!(err.to_string().contains("Unknown chat backend"));
/// ```
impl std::str::FromStr for ChatBackend {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "huggingface" => Ok(ChatBackend::HuggingFace),
            "ollama" => Ok(ChatBackend::Ollama),
            _ => Err(ChatError::InvalidRequest(format!(
                "Unknown chat backend: {}",
                s
            ))),
        }
    }
}

/// Builder for configuring and instantiating chat providers.
///
/// Provides a fluent interface for setting the backend, credentials, model
/// and sampling options. Credentials always arrive here explicitly; nothing
/// is read from process globals.
#[derive(Default)]
pub struct ChatBuilder {
    /// Selected backend
    backend: Option<ChatBackend>,
    /// API key sent to hosted backends
    api_key: Option<String>,
    /// Endpoint base URL, e.g. the address of an Ollama server
    base_url: Option<String>,
    /// Model to query
    model: Option<String>,
    /// Cap on tokens a reply may use
    max_tokens: Option<u32>,
    /// Sampling temperature (0.0-1.0)
    temperature: Option<f32>,
    /// Nucleus sampling cutoff
    top_p: Option<f32>,
    /// Penalty against repeating tokens (1.0 disables it)
    repetition_penalty: Option<f32>,
    /// System prompt prepended to every request
    system: Option<String>,
    /// Bound on request duration, in seconds
    timeout_seconds: Option<u64>,
    /// Reply schema forwarded to backends with native structured output
    schema: Option<Schema>,
}

impl ChatBuilder {
    /// Creates a new empty builder instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend to use.
    pub fn backend(mut self, backend: ChatBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the API key sent to hosted backends.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the endpoint base URL, e.g. the address of an Ollama server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model to query.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Caps how many tokens a reply may use.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature (0.0-1.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the nucleus sampling cutoff.
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets the repetition penalty (1.0 disables it).
    pub fn repetition_penalty(mut self, repetition_penalty: f32) -> Self {
        self.repetition_penalty = Some(repetition_penalty);
        self
    }

    /// Sets the system prompt prepended to every request.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Bounds how long a single request may take, in seconds.
    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Sets the reply schema. Backends with native structured output send
    /// it along with the request; validation still happens locally through
    /// [`extract`](crate::extract::extract).
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Builds and returns a configured chat provider instance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No backend is specified
    /// - Required backend feature is not enabled
    /// - Required configuration like API keys are missing
    pub fn build(self) -> Result<Box<dyn ChatProvider>, ChatError> {
        let backend = self
            .backend
            .ok_or_else(|| ChatError::InvalidRequest("No backend specified".to_string()))?;

        #[allow(unused_variables)]
        let provider: Box<dyn ChatProvider> = match backend {
            ChatBackend::HuggingFace => {
                #[cfg(not(feature = "huggingface"))]
                return Err(ChatError::InvalidRequest(
                    "HuggingFace feature not enabled".to_string(),
                ));

                #[cfg(feature = "huggingface")]
                {
                    let key = self.api_key.ok_or_else(|| {
                        ChatError::InvalidRequest(
                            "No API key provided for HuggingFace".to_string(),
                        )
                    })?;
                    Box::new(crate::backends::huggingface::HuggingFace::new(
                        key,
                        self.base_url,
                        self.model,
                        self.max_tokens,
                        self.temperature,
                        self.top_p,
                        self.repetition_penalty,
                        self.timeout_seconds,
                        self.system,
                        self.schema,
                    ))
                }
            }
            ChatBackend::Ollama => {
                #[cfg(not(feature = "ollama"))]
                return Err(ChatError::InvalidRequest(
                    "Ollama feature not enabled".to_string(),
                ));

                #[cfg(feature = "ollama")]
                {
                    let url = self
                        .base_url
                        .unwrap_or("http://localhost:11434".to_string());
                    Box::new(crate::backends::ollama::Ollama::new(
                        url,
                        self.model,
                        self.max_tokens,
                        self.temperature,
                        self.top_p,
                        self.repetition_penalty,
                        self.timeout_seconds,
                        self.system,
                        self.schema,
                    ))
                }
            }
        };

        Ok(provider)
    }
}
