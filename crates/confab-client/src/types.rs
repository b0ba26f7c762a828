//! Wire types for the generation endpoint

use serde::{Deserialize, Serialize};

/// Request body for the generation endpoint.
///
/// Serialized as a flat JSON object with a single `prompt` field,
/// e.g. `{"prompt": "What is the best car?"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The user's prompt text
    pub prompt: String,
}

impl GenerationRequest {
    /// Create a request from a prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Response body from the generation endpoint.
///
/// Serialized as a flat JSON object with a single `text` field,
/// e.g. `{"text": "This is a response."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReply {
    /// The generated reply text
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_flat() {
        let request = GenerationRequest::new("best car?");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"prompt": "best car?"}));
    }

    #[test]
    fn test_reply_deserializes_flat() {
        let reply: GenerationReply = serde_json::from_str(r#"{"text": "The Civic."}"#).unwrap();
        assert_eq!(reply.text, "The Civic.");
    }

    #[test]
    fn test_reply_rejects_missing_field() {
        let result = serde_json::from_str::<GenerationReply>(r#"{"reply": "nope"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_reply_rejects_non_object_body() {
        assert!(serde_json::from_str::<GenerationReply>("\"just a string\"").is_err());
        assert!(serde_json::from_str::<GenerationReply>("[]").is_err());
    }
}
