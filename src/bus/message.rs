//! Messages exchanged between entities.

use serde::{Deserialize, Serialize};

/// A typed message: the event name plus an optional payload.
///
/// Serializes with a `type` field, e.g. `{"type":"ping","payload":{"n":1}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message<P = serde_json::Value> {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<P>,
}

impl<P> Message<P> {
    /// A message without payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    pub fn with_payload(kind: impl Into<String>, payload: P) -> Self {
        Self {
            kind: kind.into(),
            payload: Some(payload),
        }
    }
}

/// A message together with the id of the entity that sent it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<P = serde_json::Value> {
    pub sender: String,
    pub message: Message<P>,
}

/// A message addressed to another entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outbound<P = serde_json::Value> {
    pub recipient: String,
    pub message: Message<P>,
}

impl<P> Outbound<P> {
    pub fn new(recipient: impl Into<String>, message: Message<P>) -> Self {
        Self {
            recipient: recipient.into(),
            message,
        }
    }
}
