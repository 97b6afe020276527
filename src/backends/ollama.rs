//! Ollama API client implementation for chat functionality.
//!
//! This module provides integration with Ollama's local LLM server through
//! its API, for running the same demos without a hosted endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    chat::{ChatMessage, ChatProvider, ChatResponse, Usage},
    error::ChatError,
    schema::Schema,
};

const DEFAULT_MODEL: &str = "gemma2:2b";

/// Client for a local Ollama server.
#[derive(Debug)]
pub struct Ollama {
    pub base_url: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub repeat_penalty: Option<f32>,
    pub system: Option<String>,
    pub timeout_seconds: Option<u64>,
    /// Reply schema sent as the `format` field when present
    pub schema: Option<Schema>,
    client: Client,
}

/// Wire request for the /api/chat endpoint.
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaChatMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<Value>,
}

#[derive(Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repeat_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// One message of the outgoing transcript.
#[derive(Serialize)]
struct OllamaChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Reply from the /api/chat endpoint. The eval counts double as token
/// usage.
#[derive(Deserialize, Debug)]
struct OllamaResponse {
    message: Option<OllamaChatResponseMessage>,
    response: Option<String>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct OllamaChatResponseMessage {
    content: String,
}

impl ChatResponse for OllamaResponse {
    fn text(&self) -> Option<String> {
        self.message
            .as_ref()
            .map(|m| m.content.clone())
            .or_else(|| self.response.clone())
    }

    fn usage(&self) -> Option<Usage> {
        match (self.prompt_eval_count, self.eval_count) {
            (Some(prompt), Some(completion)) => Some(Usage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }),
            _ => None,
        }
    }
}

impl std::fmt::Display for OllamaResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text().unwrap_or_default())
    }
}

impl Ollama {
    /// Creates a client for the server at `base_url`.
    ///
    /// `model` defaults to "gemma2:2b". Optional sampling knobs are
    /// forwarded to the server only when set.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_url: impl Into<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        top_p: Option<f32>,
        repeat_penalty: Option<f32>,
        timeout_seconds: Option<u64>,
        system: Option<String>,
        schema: Option<Schema>,
    ) -> Self {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(sec));
        }
        Self {
            base_url: base_url.into(),
            model: model.unwrap_or(DEFAULT_MODEL.to_string()),
            max_tokens,
            temperature,
            top_p,
            repeat_penalty,
            system,
            timeout_seconds,
            schema,
            client: builder.build().expect("Failed to build reqwest Client"),
        }
    }
}

#[async_trait]
impl ChatProvider for Ollama {
    /// Sends the transcript to the Ollama server and decodes its reply.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, ChatError> {
        if self.base_url.is_empty() {
            return Err(ChatError::InvalidRequest("Missing base_url".to_string()));
        }

        let mut chat_messages: Vec<OllamaChatMessage> = messages
            .iter()
            .map(|msg| OllamaChatMessage {
                role: msg.role.wire_name(),
                content: &msg.content,
            })
            .collect();

        if let Some(system) = &self.system {
            chat_messages.insert(
                0,
                OllamaChatMessage {
                    role: "system",
                    content: system,
                },
            );
        }

        // Ollama takes the bare JSON schema as its format field
        let format = self.schema.as_ref().map(|schema| schema.json_schema());

        let req_body = OllamaChatRequest {
            model: &self.model,
            messages: chat_messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                top_p: self.top_p,
                repeat_penalty: self.repeat_penalty,
                num_predict: self.max_tokens,
            },
            format,
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&req_body) {
                log::trace!("Ollama request payload: {}", json);
            }
        }

        let url = format!("{}/api/chat", self.base_url);

        let mut request = self.client.post(&url).json(&req_body);

        if let Some(timeout) = self.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        let resp = request.send().await?;

        log::debug!("Ollama HTTP status: {}", resp.status());

        let resp = resp.error_for_status()?;
        let json_resp: OllamaResponse = resp.json().await?;
        Ok(Box::new(json_resp))
    }
}
