//! JSON request/response boundary for `organize`.
//!
//! Accepts `{"text": "..."}` and answers with a status code plus either
//! `{"blocks": [...]}` or `{"error": "..."}`. Validation happens here, before
//! the parser sees the text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use chatblocks_categorizer::Categorizer;
use chatblocks_shared::{ChatBlocksError, Result, SemanticBlock};

use crate::pipeline::{SilentProgress, organize};

/// Fallback message for errors that display as an empty string.
const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// A validated `organize` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizeRequest {
    pub text: String,
}

impl OrganizeRequest {
    /// Validate a decoded JSON body.
    pub fn from_json(body: &Value) -> Result<Self> {
        let Some(object) = body.as_object() else {
            return Err(ChatBlocksError::invalid_input("Invalid request body"));
        };

        let Some(text) = object.get("text").and_then(Value::as_str) else {
            return Err(ChatBlocksError::invalid_input(
                "Missing or invalid 'text' field",
            ));
        };

        if text.trim().is_empty() {
            return Err(ChatBlocksError::invalid_input("Text cannot be empty"));
        }

        Ok(Self {
            text: text.to_string(),
        })
    }
}

/// Response body: exactly one of `blocks` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrganizeResponse {
    Blocks { blocks: Vec<SemanticBlock> },
    Error { error: String },
}

impl OrganizeResponse {
    /// Error body carrying the error's display message.
    pub fn from_error(err: &ChatBlocksError) -> Self {
        let message = err.to_string();
        let error = if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        };
        Self::Error { error }
    }

    /// Whether this is an `{"error": ...}` body.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Validate `body`, run the pipeline, and map the outcome to a status code
/// and response body. Never fails; every error becomes an error body.
#[instrument(skip_all, fields(categorizer = categorizer.name()))]
pub async fn handle_organize<C: Categorizer>(
    body: &Value,
    categorizer: &C,
) -> (u16, OrganizeResponse) {
    let outcome = match OrganizeRequest::from_json(body) {
        Ok(request) => organize(&request.text, categorizer, &SilentProgress).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => (
            200,
            OrganizeResponse::Blocks {
                blocks: result.blocks,
            },
        ),
        Err(e) => {
            let status = e.status_code();
            if e.is_client_error() {
                debug!(status, error = %e, "organize request rejected");
            } else {
                warn!(status, error = %e, "organize request failed");
            }
            (status, OrganizeResponse::from_error(&e))
        }
    }
}

/// Like [`handle_organize`], starting from raw bytes. Bytes that are not
/// JSON are an invalid body.
pub async fn handle_organize_raw<C: Categorizer>(
    raw: &[u8],
    categorizer: &C,
) -> (u16, OrganizeResponse) {
    match serde_json::from_slice::<Value>(raw) {
        Ok(body) => handle_organize(&body, categorizer).await,
        Err(_) => {
            let err = ChatBlocksError::invalid_input("Invalid request body");
            (err.status_code(), OrganizeResponse::from_error(&err))
        }
    }
}
