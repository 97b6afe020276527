use std::fmt;

/// Error types that can occur when talking to a chat endpoint.
#[derive(Debug)]
pub enum ChatError {
    /// HTTP request/response errors
    HttpError(String),
    /// Authentication and authorization errors
    AuthError(String),
    /// Invalid request parameters or configuration
    InvalidRequest(String),
    /// Errors reported by the model endpoint
    ProviderError(String),
    /// Endpoint payloads that could not be decoded; keeps the raw body
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::HttpError(e) => write!(f, "HTTP Error: {}", e),
            ChatError::AuthError(e) => write!(f, "Auth Error: {}", e),
            ChatError::InvalidRequest(e) => write!(f, "Invalid Request: {}", e),
            ChatError::ProviderError(e) => write!(f, "Provider Error: {}", e),
            ChatError::ResponseFormatError {
                message,
                raw_response,
            } => {
                write!(f, "Response Format Error: {}. Raw response: {}", message, raw_response)
            }
        }
    }
}

impl std::error::Error for ChatError {}

/// Converts reqwest HTTP errors into ChatErrors
impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::HttpError(err.to_string())
    }
}

/// A single schema field that failed validation, with the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Name of the offending field
    pub field: String,
    /// Why the field was rejected
    pub reason: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Failure from reply extraction. Either the cleaned reply never decoded to
/// a single JSON object, or it decoded but did not satisfy the schema. The
/// unmodified raw reply is carried in both cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The cleaned reply is not a single JSON object
    Decode {
        /// The reply exactly as the model produced it
        raw: String,
        /// The reply after marker stripping and fence unwrapping
        cleaned: String,
        /// Parser diagnostic, or what the top-level value was instead
        detail: String,
    },
    /// The object decoded but one or more fields are missing or mistyped
    Validation {
        /// The reply exactly as the model produced it
        raw: String,
        /// Every offending field, each with its reason
        issues: Vec<FieldIssue>,
    },
}

impl ExtractError {
    /// The reply exactly as the model produced it, whichever stage failed.
    pub fn raw(&self) -> &str {
        match self {
            ExtractError::Decode { raw, .. } => raw,
            ExtractError::Validation { raw, .. } => raw,
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Decode { raw, detail, .. } => {
                write!(f, "JSON Decode Error: {}. Raw response: {}", detail, raw)
            }
            ExtractError::Validation { raw, issues } => {
                let reasons = issues
                    .iter()
                    .map(|issue| issue.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "Validation Error: {}. Raw response: {}", reasons, raw)
            }
        }
    }
}

impl std::error::Error for ExtractError {}
