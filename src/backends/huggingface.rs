//! Hugging Face Inference Providers API client implementation for chat
//! functionality.
//!
//! https://huggingface.co/docs/inference-providers
//!
//! Talks to hosted models through the router's OpenAI-compatible chat
//! completions surface.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    chat::{ChatMessage, ChatProvider, ChatResponse, Usage},
    error::ChatError,
    schema::Schema,
};

const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/v1/";
const DEFAULT_MODEL: &str = "google/gemma-2-2b-it";

/// Client for hosted chat models behind the Hugging Face router.
#[derive(Debug)]
pub struct HuggingFace {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub repetition_penalty: Option<f32>,
    pub system: Option<String>,
    pub timeout_seconds: Option<u64>,
    /// Reply schema sent as `response_format` when present
    pub schema: Option<Schema>,
    client: Client,
}

/// Request payload for the router's chat completions endpoint.
#[derive(Serialize)]
struct HuggingFaceChatRequest<'a> {
    model: &'a str,
    messages: Vec<HuggingFaceChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repetition_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<HuggingFaceResponseFormat>,
    stream: bool,
}

/// One message of the outgoing transcript.
#[derive(Serialize)]
struct HuggingFaceChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct HuggingFaceResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: HuggingFaceJsonSchema,
}

#[derive(Serialize)]
struct HuggingFaceJsonSchema {
    name: String,
    schema: Value,
    strict: bool,
}

/// Response from the router's chat completions endpoint.
#[derive(Deserialize, Debug)]
struct HuggingFaceChatResponse {
    choices: Vec<HuggingFaceChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct HuggingFaceChatChoice {
    message: HuggingFaceChatMsg,
}

#[derive(Deserialize, Debug)]
struct HuggingFaceChatMsg {
    content: Option<String>,
}

impl ChatResponse for HuggingFaceChatResponse {
    fn text(&self) -> Option<String> {
        self.choices.first().and_then(|c| c.message.content.clone())
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.clone()
    }
}

impl std::fmt::Display for HuggingFaceChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text().unwrap_or_default())
    }
}

impl HuggingFace {
    /// Creates a router client from the given configuration.
    ///
    /// `base_url` defaults to the public router and `model` to
    /// "google/gemma-2-2b-it". Optional sampling knobs are forwarded
    /// only when set.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        top_p: Option<f32>,
        repetition_penalty: Option<f32>,
        timeout_seconds: Option<u64>,
        system: Option<String>,
        schema: Option<Schema>,
    ) -> Self {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(sec));
        }
        Self {
            api_key: api_key.into(),
            base_url: Url::parse(&base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()))
                .expect("Failed to parse base URL"),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
            temperature,
            top_p,
            repetition_penalty,
            system,
            timeout_seconds,
            schema,
            client: builder.build().expect("Failed to build reqwest Client"),
        }
    }
}

#[async_trait]
impl ChatProvider for HuggingFace {
    /// Sends the transcript to the router and decodes its reply.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, ChatError> {
        if self.api_key.is_empty() {
            return Err(ChatError::AuthError(
                "Missing Hugging Face API key".to_string(),
            ));
        }

        let mut chat_messages: Vec<HuggingFaceChatMessage> = messages
            .iter()
            .map(|msg| HuggingFaceChatMessage {
                role: msg.role.wire_name(),
                content: &msg.content,
            })
            .collect();

        if let Some(system) = &self.system {
            chat_messages.insert(
                0,
                HuggingFaceChatMessage {
                    role: "system",
                    content: system,
                },
            );
        }

        let response_format = self.schema.as_ref().map(|schema| HuggingFaceResponseFormat {
            format_type: "json_schema",
            json_schema: HuggingFaceJsonSchema {
                name: schema.name().to_string(),
                schema: schema.json_schema(),
                strict: true,
            },
        });

        let body = HuggingFaceChatRequest {
            model: &self.model,
            messages: chat_messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            repetition_penalty: self.repetition_penalty,
            response_format,
            stream: false,
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("Hugging Face request payload: {}", json);
            }
        }

        let url = self
            .base_url
            .join("chat/completions")
            .map_err(|e| ChatError::HttpError(e.to_string()))?;

        let mut request = self.client.post(url).bearer_auth(&self.api_key).json(&body);

        if let Some(timeout) = self.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        let response = request.send().await?;

        log::debug!("Hugging Face HTTP status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(ChatError::ResponseFormatError {
                message: format!("Hugging Face API returned error status: {status}"),
                raw_response: error_text,
            });
        }

        let resp_text = response.text().await?;
        match serde_json::from_str::<HuggingFaceChatResponse>(&resp_text) {
            Ok(resp) => Ok(Box::new(resp)),
            Err(e) => Err(ChatError::ResponseFormatError {
                message: format!("Failed to decode Hugging Face API response: {e}"),
                raw_response: resp_text,
            }),
        }
    }
}
