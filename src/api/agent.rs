//! Agent endpoint surface
//!
//! Direct access to the AI agent: advanced chat with history, health probe,
//! tool listing, per-user history/state, and the agent prompt configuration.

use crate::api::client::ApiClient;
use crate::error::PanelError;
use crate::panel::models::Message;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// One turn of history forwarded to the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// "user" or "assistant"
    pub role: String,
    /// Message content
    pub content: String,
}

/// `data` payload of `POST /api/agent/chat-advanced`
#[derive(Debug, Clone, Deserialize)]
pub struct AgentReply {
    /// Agent response text
    #[serde(default)]
    pub text: String,
    /// Tools the agent invoked while answering
    #[serde(rename = "toolCalls", default)]
    pub tool_calls: Vec<Value>,
    /// Backend-measured latency in milliseconds
    #[serde(rename = "latencyMs", default)]
    pub latency_ms: Option<u64>,
}

/// Response of `GET /api/agent/health` (no envelope)
#[derive(Debug, Clone, Deserialize)]
pub struct AgentHealth {
    /// Overall status label ("healthy", "degraded", ...)
    pub status: String,
    /// Probe timestamp, if reported
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Per-dependency check results
    #[serde(default)]
    pub checks: Value,
}

/// `data` payload of `GET /api/agent/tools`
#[derive(Debug, Clone, Deserialize)]
struct ToolsPage {
    #[serde(default)]
    tools: Vec<Value>,
}

/// `data` payload of `GET /api/agent/state/:phone`
#[derive(Debug, Clone, Deserialize)]
pub struct AgentState {
    /// Whether the backend holds state for this user
    #[serde(default)]
    pub exists: bool,
    /// Opaque state document
    #[serde(default)]
    pub state: Value,
}

/// Agent prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPrompt {
    /// Base training prompt
    #[serde(rename = "entrenamiento_base", default)]
    pub base_prompt: String,
    /// Sampling temperature
    #[serde(rename = "temperatura", default)]
    pub temperature: Option<f64>,
    /// Response token cap
    #[serde(rename = "max_tokens", default)]
    pub max_tokens: Option<u32>,
    /// Keyword that closes a conversation
    #[serde(rename = "palabra_cierre", default)]
    pub close_word: Option<String>,
}

impl ApiClient {
    /// Send a message to the agent along with accumulated history
    pub async fn chat_advanced(
        &self,
        phone: &str,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<AgentReply, PanelError> {
        let value = self
            .post(
                "/api/agent/chat-advanced",
                Some(json!({
                    "phone": phone,
                    "message": message,
                    "conversationHistory": history,
                })),
            )
            .await?;
        let reply: AgentReply = Self::data(value)?;
        debug!(
            phone = %phone,
            latency_ms = ?reply.latency_ms,
            tool_calls = reply.tool_calls.len(),
            "Agent replied"
        );
        Ok(reply)
    }

    /// Probe agent health
    pub async fn agent_health(&self) -> Result<AgentHealth, PanelError> {
        let value = self.get("/api/agent/health").await?;
        serde_json::from_value(value)
            .map_err(|e| PanelError::InvalidResponse(format!("Unexpected health shape: {}", e)))
    }

    /// List tools the agent can call
    pub async fn agent_tools(&self) -> Result<Vec<Value>, PanelError> {
        let value = self.get("/api/agent/tools").await?;
        let page: ToolsPage = Self::data(value)?;
        Ok(page.tools)
    }

    /// Fetch a user's conversation history as seen by the agent
    pub async fn agent_history(
        &self,
        phone: &str,
        limit: usize,
    ) -> Result<Vec<Message>, PanelError> {
        let value = self
            .get(&format!("/api/agent/history/{}?limit={}", phone, limit))
            .await?;
        #[derive(Deserialize)]
        struct HistoryPage {
            #[serde(default)]
            messages: Vec<Message>,
        }
        let page: HistoryPage = Self::data(value)?;
        Ok(page.messages)
    }

    /// Fetch a user's agent-side conversation state
    pub async fn agent_state(&self, phone: &str) -> Result<AgentState, PanelError> {
        let value = self.get(&format!("/api/agent/state/{}", phone)).await?;
        Self::data(value)
    }

    /// Reset a user's agent-side conversation state
    pub async fn reset_agent_state(&self, phone: &str) -> Result<(), PanelError> {
        self.delete(&format!("/api/agent/state/{}", phone)).await?;
        Ok(())
    }

    /// Fetch the agent prompt configuration
    pub async fn agent_prompt(&self) -> Result<AgentPrompt, PanelError> {
        let value = self.get("/api/agent/prompt").await?;
        Self::data(value)
    }

    /// Replace the agent's base training prompt
    pub async fn update_agent_prompt(&self, base_prompt: &str) -> Result<(), PanelError> {
        self.put(
            "/api/agent/prompt",
            json!({ "entrenamiento_base": base_prompt }),
        )
        .await?;
        Ok(())
    }
}
