//! Panel endpoint surface
//!
//! Conversation listing, human takeover/release, operator message relay,
//! message history, and authoritative conversation status.

use crate::api::client::ApiClient;
use crate::error::PanelError;
use crate::panel::models::{ConversationSummary, Message};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// `data` payload of `GET /panel/conversations`
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationsPage {
    /// Active conversation summaries
    pub conversations: Vec<ConversationSummary>,
    /// Total number of active conversations on the backend
    #[serde(default)]
    pub total: usize,
}

/// `data` payload of `GET /panel/messages/:phone`
#[derive(Debug, Clone, Deserialize)]
struct MessagesPage {
    #[serde(default)]
    messages: Vec<Message>,
}

/// `data` payload of `GET /panel/status/:phone`
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationStatus {
    /// Whether a human operator owns the conversation
    #[serde(rename = "modoHumano", default)]
    pub human_mode: bool,
    /// Backend conversation state label, if any
    #[serde(rename = "estadoActual", default)]
    pub current_state: Option<String>,
    /// Product the conversation is currently about, if any
    #[serde(rename = "productoActual", default)]
    pub current_product: Option<String>,
}

impl ApiClient {
    /// List active conversations with their control state
    pub async fn active_conversations(
        &self,
        limit: usize,
    ) -> Result<Vec<ConversationSummary>, PanelError> {
        let value = self
            .get(&format!("/panel/conversations?limit={}", limit))
            .await?;
        let page: ConversationsPage = Self::data(value)?;
        debug!(
            count = page.conversations.len(),
            total = page.total,
            "Fetched active conversations"
        );
        Ok(page.conversations)
    }

    /// Assume human control of a conversation
    pub async fn takeover(&self, phone: &str) -> Result<(), PanelError> {
        self.post(&format!("/panel/takeover/{}", phone), None)
            .await?;
        Ok(())
    }

    /// Return a conversation to the automated agent
    pub async fn release(&self, phone: &str) -> Result<(), PanelError> {
        self.post(&format!("/panel/release/{}", phone), None).await?;
        Ok(())
    }

    /// Relay an operator text message (requires prior takeover server-side)
    pub async fn send_message(&self, phone: &str, text: &str) -> Result<(), PanelError> {
        self.post("/panel/send", Some(json!({ "phone": phone, "text": text })))
            .await?;
        Ok(())
    }

    /// Fetch a conversation's message history, ascending by timestamp
    pub async fn conversation_messages(
        &self,
        phone: &str,
        limit: usize,
    ) -> Result<Vec<Message>, PanelError> {
        let value = self
            .get(&format!("/panel/messages/{}?limit={}", phone, limit))
            .await?;
        let page: MessagesPage = Self::data(value)?;
        let mut messages = page.messages;
        // History fetches omit the conversation key on each message
        for message in &mut messages {
            if message.phone.is_empty() {
                message.phone = phone.to_string();
            }
        }
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    /// Fetch the authoritative control/conversation state
    pub async fn conversation_status(
        &self,
        phone: &str,
    ) -> Result<ConversationStatus, PanelError> {
        let value = self.get(&format!("/panel/status/{}", phone)).await?;
        Self::data(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn test_active_conversations() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/panel/conversations")
            .match_query(Matcher::UrlEncoded("limit".into(), "50".into()))
            .with_status(200)
            .with_body(
                r#"{
                    "success": true,
                    "data": {
                        "conversations": [
                            {"phone": "51911111111", "modoHumano": true, "estadoActual": "compra"},
                            {"phone": "51922222222"}
                        ],
                        "total": 2
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), "key");
        let conversations = client.active_conversations(50).await.unwrap();

        mock.assert_async().await;
        assert_eq!(conversations.len(), 2);
        assert!(conversations[0].human_mode);
        assert_eq!(conversations[0].current_state.as_deref(), Some("compra"));
        assert!(!conversations[1].human_mode);
    }

    #[tokio::test]
    #[serial]
    async fn test_send_message_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/panel/send")
            .match_body(Matcher::Json(
                serde_json::json!({"phone": "51911111111", "text": "hola"}),
            ))
            .with_status(200)
            .with_body(r#"{"success": true, "message": "sent"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), "key");
        client.send_message("51911111111", "hola").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn test_conversation_messages_tagged_and_sorted() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/panel/messages/51911111111")
            .match_query(Matcher::UrlEncoded("limit".into(), "100".into()))
            .with_status(200)
            .with_body(
                r#"{
                    "success": true,
                    "data": {
                        "messages": [
                            {"id": "m2", "text": "segundo", "origen": "bot", "timestamp": "2024-05-01T12:01:00Z"},
                            {"id": "m1", "text": "primero", "origen": "cliente", "timestamp": "2024-05-01T12:00:00Z"}
                        ],
                        "count": 2
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), "key");
        let messages = client
            .conversation_messages("51911111111", 100)
            .await
            .unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "m1");
        assert_eq!(messages[1].id, "m2");
        assert!(messages.iter().all(|m| m.phone == "51911111111"));
    }

    #[tokio::test]
    #[serial]
    async fn test_conversation_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/panel/status/51911111111")
            .with_status(200)
            .with_body(
                r#"{"success": true, "data": {"modoHumano": true, "productoActual": "plan-pro"}}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), "key");
        let status = client.conversation_status("51911111111").await.unwrap();
        assert!(status.human_mode);
        assert_eq!(status.current_product.as_deref(), Some("plan-pro"));
    }

    #[tokio::test]
    #[serial]
    async fn test_takeover_failure_propagates() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/panel/takeover/51911111111")
            .with_status(409)
            .with_body(r#"{"success": false, "error": "Already taken"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), "key");
        let result = client.takeover("51911111111").await;
        match result {
            Err(PanelError::Backend(message)) => assert_eq!(message, "Already taken"),
            other => panic!("Expected backend error, got {:?}", other),
        }
    }
}
