use crate::error::{Error, Result};

/// Payload that tells a consumer to stop
pub const DONE: &str = "DONE";

/// A decoded transport payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// A value to be aggregated
    Value(i64),
    /// End-of-stream sentinel
    Done,
}

impl Message {
    /// Decodes a payload
    ///
    /// The payload must be exactly [DONE] or a decimal integer (surrounding whitespace is
    /// ignored). Anything else is a [Error::MalformedPayload].
    pub fn parse(payload: &str) -> Result<Self> {
        if payload == DONE {
            return Ok(Message::Done);
        }
        payload
            .trim()
            .parse::<i64>()
            .map(Message::Value)
            .map_err(|_| Error::MalformedPayload {
                payload: payload.to_string(),
            })
    }

    /// Encodes the message into a payload
    pub fn encode(&self) -> String {
        match self {
            Message::Value(v) => v.to_string(),
            Message::Done => DONE.to_string(),
        }
    }
}
