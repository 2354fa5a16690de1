//! Control state tracker
//!
//! Records which side (bot or human operator) owns each conversation's
//! response generation, and synchronizes that record with the backend on
//! takeover, release, and status reconciliation. Every operation is a
//! single attempt; the operator re-triggers on failure.

use crate::api::panel::ConversationStatus;
use crate::api::ApiClient;
use crate::error::PanelError;
use crate::panel::models::{ControlMode, ConversationSummary};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Per-conversation control state, synchronized with the backend
pub struct ControlTracker {
    client: Arc<ApiClient>,
    modes: HashMap<String, ControlMode>,
}

impl ControlTracker {
    /// Create a tracker over the given backend client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            modes: HashMap::new(),
        }
    }

    /// Current control mode for a conversation, defaulting to bot-owned
    pub fn mode(&self, phone: &str) -> ControlMode {
        self.modes.get(phone).copied().unwrap_or(ControlMode::Bot)
    }

    /// Assume human control of a conversation
    ///
    /// The local mode flips to human only after the backend call succeeds;
    /// on failure the state is left unchanged and the error propagates.
    /// Safe to retry.
    pub async fn takeover(&mut self, phone: &str) -> Result<(), PanelError> {
        self.client.takeover(phone).await?;
        self.modes.insert(phone.to_string(), ControlMode::Human);
        info!(phone = %phone, "Took human control of conversation");
        Ok(())
    }

    /// Return a conversation to the automated agent
    pub async fn release(&mut self, phone: &str) -> Result<(), PanelError> {
        self.client.release(phone).await?;
        self.modes.insert(phone.to_string(), ControlMode::Bot);
        info!(phone = %phone, "Released conversation to bot");
        Ok(())
    }

    /// Reconcile the local guess with the authoritative backend state
    pub async fn reconcile(&mut self, phone: &str) -> Result<ConversationStatus, PanelError> {
        let status = self.client.conversation_status(phone).await?;
        self.modes.insert(
            phone.to_string(),
            ControlMode::from_human_flag(status.human_mode),
        );
        Ok(status)
    }

    /// Overwrite local modes from a backend conversation listing
    pub fn sync_from_listing(&mut self, conversations: &[ConversationSummary]) {
        for conversation in conversations {
            self.modes.insert(
                conversation.phone.clone(),
                ControlMode::from_human_flag(conversation.human_mode),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn test_takeover_success_sets_human_mode() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/panel/takeover/51911111111")
            .with_status(200)
            .with_body(r#"{"success": true, "phone": "51911111111", "modoHumano": true}"#)
            .create_async()
            .await;

        let client = Arc::new(ApiClient::new(server.url(), "key"));
        let mut tracker = ControlTracker::new(client);
        assert_eq!(tracker.mode("51911111111"), ControlMode::Bot);

        tracker.takeover("51911111111").await.unwrap();
        assert_eq!(tracker.mode("51911111111"), ControlMode::Human);
    }

    #[tokio::test]
    #[serial]
    async fn test_takeover_failure_leaves_mode_unchanged() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/panel/takeover/51911111111")
            .with_status(500)
            .with_body(r#"{"success": false, "error": "State store offline"}"#)
            .create_async()
            .await;

        let client = Arc::new(ApiClient::new(server.url(), "key"));
        let mut tracker = ControlTracker::new(client);

        let result = tracker.takeover("51911111111").await;
        assert!(matches!(result, Err(PanelError::Backend(_))));
        assert_eq!(tracker.mode("51911111111"), ControlMode::Bot);
    }

    #[tokio::test]
    #[serial]
    async fn test_release_returns_to_bot() {
        let mut server = Server::new_async().await;
        let _takeover = server
            .mock("POST", "/panel/takeover/51911111111")
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;
        let _release = server
            .mock("POST", "/panel/release/51911111111")
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let client = Arc::new(ApiClient::new(server.url(), "key"));
        let mut tracker = ControlTracker::new(client);

        tracker.takeover("51911111111").await.unwrap();
        tracker.release("51911111111").await.unwrap();
        assert_eq!(tracker.mode("51911111111"), ControlMode::Bot);
    }

    #[tokio::test]
    #[serial]
    async fn test_reconcile_overwrites_local_guess() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/panel/status/51911111111")
            .with_status(200)
            .with_body(r#"{"success": true, "data": {"modoHumano": true}}"#)
            .create_async()
            .await;

        let client = Arc::new(ApiClient::new(server.url(), "key"));
        let mut tracker = ControlTracker::new(client);
        assert_eq!(tracker.mode("51911111111"), ControlMode::Bot);

        let status = tracker.reconcile("51911111111").await.unwrap();
        assert!(status.human_mode);
        assert_eq!(tracker.mode("51911111111"), ControlMode::Human);
    }

    #[test]
    fn test_sync_from_listing() {
        let client = Arc::new(ApiClient::new("http://localhost:0", "key"));
        let mut tracker = ControlTracker::new(client);
        let conversations = vec![
            ConversationSummary {
                phone: "a".to_string(),
                human_mode: true,
                current_state: None,
                current_product: None,
                unread_count: 0,
                last_activity: None,
                needs_attention: false,
            },
            ConversationSummary {
                phone: "b".to_string(),
                human_mode: false,
                current_state: None,
                current_product: None,
                unread_count: 0,
                last_activity: None,
                needs_attention: false,
            },
        ];
        tracker.sync_from_listing(&conversations);
        assert_eq!(tracker.mode("a"), ControlMode::Human);
        assert_eq!(tracker.mode("b"), ControlMode::Bot);
    }
}
