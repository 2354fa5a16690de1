//! Conversation store listener
//!
//! Keeps a `PanelSnapshot` continuously synchronized with the backend by
//! polling on a fixed interval. The `SnapshotSource` trait is the seam
//! between the reconciliation path and the transport, so tests can feed
//! synthetic snapshots without a live backend.

use crate::api::ApiClient;
use crate::error::PanelError;
use crate::panel::models::{ConversationSummary, Message, PendingRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One consistent view of the panel's remote state
#[derive(Debug, Clone)]
pub struct PanelSnapshot {
    /// Active conversation summaries
    pub conversations: Vec<ConversationSummary>,
    /// Raw message feed across all conversations, ascending by timestamp
    pub messages: Vec<Message>,
    /// Conversations awaiting human attention
    pub pending: Vec<PendingRequest>,
    /// When this snapshot was produced
    pub fetched_at: DateTime<Utc>,
}

impl PanelSnapshot {
    /// Snapshot with no data, used before the first refresh completes
    pub fn empty() -> Self {
        Self {
            conversations: Vec::new(),
            messages: Vec::new(),
            pending: Vec::new(),
            fetched_at: Utc::now(),
        }
    }
}

/// Source of panel snapshots
///
/// Production uses [`BackendSource`]; tests implement this trait to drive
/// the same reconciliation path with synthetic data.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Produce one consistent snapshot of the remote state
    async fn fetch(&self) -> Result<PanelSnapshot, PanelError>;
}

/// Snapshot source that polls the backend panel API
pub struct BackendSource {
    client: Arc<ApiClient>,
    conversation_limit: usize,
    message_limit: usize,
}

impl BackendSource {
    /// Create a source over the given client and fetch limits
    pub fn new(client: Arc<ApiClient>, conversation_limit: usize, message_limit: usize) -> Self {
        Self {
            client,
            conversation_limit,
            message_limit,
        }
    }
}

#[async_trait]
impl SnapshotSource for BackendSource {
    async fn fetch(&self) -> Result<PanelSnapshot, PanelError> {
        let conversations = self
            .client
            .active_conversations(self.conversation_limit)
            .await?;

        let mut messages = Vec::new();
        for conversation in &conversations {
            match self
                .client
                .conversation_messages(&conversation.phone, self.message_limit)
                .await
            {
                Ok(mut batch) => messages.append(&mut batch),
                // One conversation's history failing should not drop the
                // whole refresh cycle
                Err(e) => warn!(
                    phone = %conversation.phone,
                    error = %e,
                    "Failed to fetch conversation history"
                ),
            }
        }
        messages.sort_by_key(|m| m.timestamp);

        let pending = conversations
            .iter()
            .filter(|c| c.needs_attention)
            .map(|c| PendingRequest {
                phone: c.phone.clone(),
                requested_at: c.last_activity,
            })
            .collect();

        Ok(PanelSnapshot {
            conversations,
            messages,
            pending,
            fetched_at: Utc::now(),
        })
    }
}

/// Handle owning the background refresh task
///
/// Dropping the handle aborts the task, so teardown is guaranteed on every
/// exit path of the owning scope.
pub struct Listener {
    handle: JoinHandle<()>,
    rx: watch::Receiver<PanelSnapshot>,
}

impl Listener {
    /// Spawn the refresh loop, polling `source` on the given interval
    ///
    /// A failed refresh cycle logs a warning and retains the last known
    /// snapshot rather than clearing the view.
    pub fn spawn(source: Arc<dyn SnapshotSource>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(PanelSnapshot::empty());
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match source.fetch().await {
                    Ok(snapshot) => {
                        debug!(
                            conversations = snapshot.conversations.len(),
                            messages = snapshot.messages.len(),
                            pending = snapshot.pending.len(),
                            "Refreshed panel snapshot"
                        );
                        if tx.send(snapshot).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Snapshot refresh failed, retaining last known state");
                    }
                }
            }
        });
        Self { handle, rx }
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<PanelSnapshot> {
        self.rx.clone()
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
