//! Wire messages.
//!
//! Every message in either direction is a JSON object
//! `{"type": "...", "payload": {...}}`. Inbound messages are decoded in two
//! steps: the envelope first, so an unknown `type` can be told apart from a
//! malformed payload, then the payload for that type.

use crate::state::{
    GameOver, GameStart, PlayerJoined, PlayerLeft, Position, ReadyUpdate, RoomCreated,
    SettingsUpdate, WordClaimed,
};
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    CreateRoom,
    JoinRoom,
    NameChange,
    SetReady,
    SelectWord,
    SetWordCount,
    SetGridSize,
    LeaveRoom,
    Ping,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: MessageKind,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateRoom {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinRoom {
    pub join_code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NameChange {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SetReady {
    pub ready: bool,
}

/// A straight-line selection between two cells, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SelectWord {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SetWordCount {
    pub word_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SetGridSize {
    pub grid_size: i64,
}

/// A decoded client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    CreateRoom(CreateRoom),
    JoinRoom(JoinRoom),
    NameChange(NameChange),
    SetReady(SetReady),
    SelectWord(SelectWord),
    SetWordCount(SetWordCount),
    SetGridSize(SetGridSize),
    LeaveRoom,
    Ping,
}

impl ClientMessage {
    /// Decode one inbound text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text).map_err(|e| {
            debug!("Malformed envelope: {}", e);
            ProtocolError::InvalidPayload
        })?;

        let payload = envelope.payload;
        let message = match envelope.kind {
            MessageKind::CreateRoom => Self::CreateRoom(payload_as(payload)?),
            MessageKind::JoinRoom => Self::JoinRoom(payload_as(payload)?),
            MessageKind::NameChange => Self::NameChange(payload_as(payload)?),
            MessageKind::SetReady => Self::SetReady(payload_as(payload)?),
            MessageKind::SelectWord => Self::SelectWord(payload_as(payload)?),
            MessageKind::SetWordCount => Self::SetWordCount(payload_as(payload)?),
            MessageKind::SetGridSize => Self::SetGridSize(payload_as(payload)?),
            MessageKind::LeaveRoom => Self::LeaveRoom,
            MessageKind::Ping => Self::Ping,
            MessageKind::Unknown => return Err(ProtocolError::UnknownType),
        };
        Ok(message)
    }
}

fn payload_as<T: DeserializeOwned>(payload: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(payload).map_err(|e| {
        debug!("Malformed payload: {}", e);
        ProtocolError::InvalidPayload
    })
}

/// Payload of an `error` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Everything the server sends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated(RoomCreated),
    PlayerJoined(PlayerJoined),
    ReadyUpdate(ReadyUpdate),
    GameSettings(SettingsUpdate),
    GameStart(GameStart),
    WordClaimed(WordClaimed),
    GameOver(GameOver),
    PlayerLeft(PlayerLeft),
    NameChangeAccepted { name: String },
    Pong,
    Error(ErrorPayload),
}

impl ServerMessage {
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::Error(ErrorPayload {
            message: message.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Inbound decoding errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    InvalidPayload,
    UnknownType,
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPayload => write!(f, "invalid payload"),
            Self::UnknownType => write!(f, "unknown message type"),
        }
    }
}

impl std::error::Error for ProtocolError {}
