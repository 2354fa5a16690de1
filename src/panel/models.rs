//! Panel data models
//!
//! Defines conversations, messages, control modes, pending requests, and
//! cached client profiles. Wire field names follow the backend's JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    /// End user of the chatbot
    Client,
    /// Automated agent
    Bot,
    /// Human operator on the panel
    Operator,
}

impl MessageOrigin {
    /// Wire representation of the origin
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageOrigin::Client => "cliente",
            MessageOrigin::Bot => "bot",
            MessageOrigin::Operator => "operador",
        }
    }
}

impl From<&str> for MessageOrigin {
    fn from(s: &str) -> Self {
        match s {
            "bot" => MessageOrigin::Bot,
            "operador" => MessageOrigin::Operator,
            // Unknown origins render as client messages
            _ => MessageOrigin::Client,
        }
    }
}

impl Serialize for MessageOrigin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageOrigin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(MessageOrigin::from(s.as_str()))
    }
}

/// Owner of a conversation's response generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// The automated agent answers
    Bot,
    /// A human operator answers
    Human,
}

impl ControlMode {
    /// Whether a human operator owns the conversation
    pub fn is_human(self) -> bool {
        matches!(self, ControlMode::Human)
    }

    /// Map the backend's `modoHumano` flag to a control mode
    pub fn from_human_flag(human: bool) -> Self {
        if human {
            ControlMode::Human
        } else {
            ControlMode::Bot
        }
    }
}

/// A single message in a conversation
///
/// Immutable once created: messages are only appended, never edited, and
/// deleted only in bulk with their conversation (backend-owned).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for the message
    pub id: String,
    /// Text body, absent for file-only messages
    #[serde(default)]
    pub text: Option<String>,
    /// URL of an attached file, if any
    #[serde(rename = "fileUrl", default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Kind of the attached file ("image", "audio", ...)
    #[serde(rename = "fileType", default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// Who produced the message
    #[serde(rename = "origen")]
    pub origin: MessageOrigin,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
    /// Phone key of the conversation this message belongs to
    ///
    /// The live feed carries it as `user`; per-conversation history fetches
    /// omit it and the gateway fills it in.
    #[serde(rename = "user", default)]
    pub phone: String,
}

impl Message {
    /// Short preview of the message for listings
    pub fn preview(&self) -> &str {
        match &self.text {
            Some(text) if !text.is_empty() => text,
            _ if self.file_url.is_some() => "[file]",
            _ => "",
        }
    }
}

/// Summary of an active conversation from the backend listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Phone/user key identifying the conversation
    pub phone: String,
    /// Whether a human operator currently owns the conversation
    #[serde(rename = "modoHumano", default)]
    pub human_mode: bool,
    /// Backend conversation state label, if any
    #[serde(rename = "estadoActual", default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<String>,
    /// Product the conversation is currently about, if any
    #[serde(
        rename = "productoActual",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_product: Option<String>,
    /// Backend-reported unread count (the panel recomputes its own)
    #[serde(rename = "unreadCount", default)]
    pub unread_count: u32,
    /// Timestamp of the last activity in the conversation
    #[serde(
        rename = "lastActivity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_activity: Option<DateTime<Utc>>,
    /// Whether the conversation is flagged as awaiting human attention
    #[serde(rename = "needsAttention", default)]
    pub needs_attention: bool,
}

/// A conversation flagged as awaiting human attention
///
/// Removed from the panel once attended or finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// Phone key of the waiting conversation
    pub phone: String,
    /// When the request was raised, if known
    pub requested_at: Option<DateTime<Utc>>,
}

/// Cached display metadata for a client, keyed by phone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProfile {
    /// Phone key of the client
    pub phone: String,
    /// Display name
    pub name: String,
    /// Avatar URL, if known
    pub avatar_url: Option<String>,
}

impl ClientProfile {
    /// Fallback profile showing the raw identifier
    pub fn fallback(phone: &str) -> Self {
        Self {
            phone: phone.to_string(),
            name: phone.to_string(),
            avatar_url: None,
        }
    }
}
