//! Agent test harness
//!
//! Local scratch conversation against the AI agent, used to exercise the
//! backend without touching real customer conversations. Keeps its own
//! transcript and forwards the accumulated history with every message.

use crate::api::agent::HistoryEntry;
use crate::api::ApiClient;
use crate::error::PanelError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptRole {
    /// Operator driving the harness
    User,
    /// Agent reply
    Assistant,
    /// Failed exchange, kept so the transcript shows what happened
    Error,
}

impl TranscriptRole {
    /// Wire representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptRole::User => "user",
            TranscriptRole::Assistant => "assistant",
            TranscriptRole::Error => "error",
        }
    }
}

/// One entry in the harness transcript
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    /// Unique identifier for the entry
    pub id: String,
    /// Who produced the entry
    pub role: TranscriptRole,
    /// Entry content (reply text or error message)
    pub content: String,
    /// When the entry was recorded
    pub timestamp: DateTime<Utc>,
    /// Backend-measured latency, for assistant entries
    pub latency_ms: Option<u64>,
    /// Tools the agent invoked, for assistant entries
    pub tool_calls: Vec<Value>,
}

impl TranscriptEntry {
    fn new(role: TranscriptRole, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now(),
            latency_ms: None,
            tool_calls: Vec::new(),
        }
    }
}

/// Test conversation with the AI agent
pub struct AgentHarness {
    api: Arc<ApiClient>,
    phone: String,
    transcript: Vec<TranscriptEntry>,
}

impl AgentHarness {
    /// Create a harness conversing as the given test phone number
    pub fn new(api: Arc<ApiClient>, phone: impl Into<String>) -> Self {
        Self {
            api,
            phone: phone.into(),
            transcript: Vec::new(),
        }
    }

    /// Phone number the harness converses as
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Accumulated transcript
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Clear the transcript and start over
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Send a message to the agent with the accumulated history
    ///
    /// The user entry is recorded before the call; the reply (or an
    /// error-role entry) is appended after, so a failed exchange is never
    /// lost from the transcript.
    pub async fn send(&mut self, message: &str) -> Result<&TranscriptEntry, PanelError> {
        // History excludes the message being sent and failed exchanges
        let history: Vec<HistoryEntry> = self
            .transcript
            .iter()
            .filter(|e| e.role != TranscriptRole::Error)
            .map(|e| HistoryEntry {
                role: e.role.as_str().to_string(),
                content: e.content.clone(),
            })
            .collect();

        self.transcript
            .push(TranscriptEntry::new(TranscriptRole::User, message.to_string()));

        match self.api.chat_advanced(&self.phone, message, &history).await {
            Ok(reply) => {
                debug!(
                    phone = %self.phone,
                    latency_ms = ?reply.latency_ms,
                    "Harness exchange completed"
                );
                let mut entry = TranscriptEntry::new(TranscriptRole::Assistant, reply.text);
                entry.latency_ms = reply.latency_ms;
                entry.tool_calls = reply.tool_calls;
                self.transcript.push(entry);
                Ok(self.transcript.last().expect("entry just pushed"))
            }
            Err(e) => {
                self.transcript
                    .push(TranscriptEntry::new(TranscriptRole::Error, e.to_string()));
                Err(e)
            }
        }
    }
}
