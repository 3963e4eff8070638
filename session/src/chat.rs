//! Chat envelope exchanged over the data channel: UTF-8 JSON
//! `{"from": string, "text": string, "ts": number}`.

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

/// Sender name used when the local participant has neither name nor identity.
pub const DEFAULT_SENDER: &str = "Você";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub from: String,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("payload has no usable `{0}` field")]
    MissingField(&'static str),
}

impl ChatMessage {
    pub fn new(from: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            text: text.into(),
            ts: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ChatError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a received payload. Invalid UTF-8 is replaced rather than
    /// rejected; `from` and `text` must be non-empty strings, `ts` is optional.
    pub fn decode(payload: &[u8]) -> Result<Self, ChatError> {
        let text = String::from_utf8_lossy(payload);
        let value: Value = serde_json::from_str(&text)?;
        let Value::Object(object) = value else {
            return Err(ChatError::NotAnObject);
        };

        let field = |name: &'static str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or(ChatError::MissingField(name))
        };

        let text = field("text")?;
        let from = field("from")?;
        let ts = object
            .get("ts")
            .and_then(|ts| ts.as_i64().or_else(|| ts.as_f64().map(|ts| ts as i64)))
            .unwrap_or_default();

        Ok(Self { from, text, ts })
    }
}

/// Pick the name to sign outgoing messages with: the participant name, then
/// the identity, then [`DEFAULT_SENDER`].
pub fn sender_name(name: Option<&str>, identity: Option<&str>) -> String {
    [name, identity]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or(DEFAULT_SENDER)
        .to_string()
}
