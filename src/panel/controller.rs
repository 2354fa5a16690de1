//! Conversation panel controller
//!
//! Composes the view, the control tracker, and the gateway into the
//! operator workflow: selecting conversations, taking and releasing
//! control, relaying messages, and handling pending attention requests.

use crate::api::panel::ConversationStatus;
use crate::api::ApiClient;
use crate::error::PanelError;
use crate::panel::control::ControlTracker;
use crate::panel::listener::PanelSnapshot;
use crate::panel::models::{ControlMode, Message, PendingRequest};
use crate::panel::view::ConversationView;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Drives the live takeover workflow for one operator session
pub struct PanelController {
    api: Arc<ApiClient>,
    view: ConversationView,
    tracker: ControlTracker,
    draft: String,
    attachment: Option<String>,
}

impl PanelController {
    /// Create a controller over the given backend client
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            tracker: ControlTracker::new(api.clone()),
            api,
            view: ConversationView::new(),
            draft: String::new(),
            attachment: None,
        }
    }

    /// Feed a fresh snapshot into the view and control tracker
    ///
    /// The single reconciliation path for both the polling listener and
    /// synthetic updates.
    pub fn apply_snapshot(&mut self, snapshot: PanelSnapshot) {
        self.tracker.sync_from_listing(&snapshot.conversations);
        self.view.apply_snapshot(snapshot);
    }

    /// Select a conversation and reconcile its control state
    ///
    /// The selection takes effect even when the status call fails; the
    /// error is surfaced so the operator can retry.
    pub async fn select(&mut self, phone: &str) -> Result<ConversationStatus, PanelError> {
        self.view.select(phone);
        self.tracker.reconcile(phone).await
    }

    /// Clear the active conversation
    pub fn deselect(&mut self) {
        self.view.deselect();
    }

    /// Replace the draft input text
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Current draft input text
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Stage a file attachment for the next send
    pub fn attach(&mut self, name: impl Into<String>) {
        self.attachment = Some(name.into());
    }

    /// Send the draft to the active conversation
    ///
    /// Requires human control, checked locally before any network call (a
    /// UX guard; the backend revalidates ownership). The draft is cleared
    /// optimistically and restored unmodified if the backend rejects the
    /// send. One attempt per call, no retry.
    pub async fn send(&mut self) -> Result<(), PanelError> {
        let phone = self
            .view
            .selected()
            .ok_or(PanelError::NoSelection)?
            .to_string();

        let text = self.draft.trim().to_string();
        if text.is_empty() && self.attachment.is_none() {
            return Ok(());
        }

        if !self.tracker.mode(&phone).is_human() {
            return Err(PanelError::ControlRequired(phone));
        }

        if let Some(attachment) = self.attachment.take() {
            warn!(
                attachment = %attachment,
                "File attachments are not supported on the relay path, sending text only"
            );
        }
        if text.is_empty() {
            return Ok(());
        }

        self.draft.clear();
        match self.api.send_message(&phone, &text).await {
            Ok(()) => {
                info!(phone = %phone, "Operator message relayed");
                Ok(())
            }
            Err(e) => {
                // Give the operator their text back
                self.draft = text;
                Err(e)
            }
        }
    }

    /// Assume human control of a conversation
    pub async fn takeover(&mut self, phone: &str) -> Result<(), PanelError> {
        self.tracker.takeover(phone).await?;
        // Best-effort reconciliation with the authoritative state
        if let Err(e) = self.tracker.reconcile(phone).await {
            warn!(phone = %phone, error = %e, "Status reconciliation after takeover failed");
        }
        Ok(())
    }

    /// Return a conversation to the automated agent
    pub async fn release(&mut self, phone: &str) -> Result<(), PanelError> {
        self.tracker.release(phone).await?;
        if let Err(e) = self.tracker.reconcile(phone).await {
            warn!(phone = %phone, error = %e, "Status reconciliation after release failed");
        }
        Ok(())
    }

    /// Accept a pending attention request
    ///
    /// Removes it from the pending list, selects the conversation, and
    /// takes human control.
    pub async fn attend(&mut self, phone: &str) -> Result<(), PanelError> {
        self.view.remove_pending(phone);
        self.view.select(phone);
        self.takeover(phone).await
    }

    /// Close a conversation: drop its pending request and selection
    pub fn finalize(&mut self, phone: &str) {
        self.view.remove_pending(phone);
        if self.view.selected() == Some(phone) {
            self.view.deselect();
        }
        info!(phone = %phone, "Conversation finalized");
    }

    /// Current control mode for a conversation
    pub fn mode(&self, phone: &str) -> ControlMode {
        self.tracker.mode(phone)
    }

    /// Messages of the active conversation, ascending by timestamp
    pub fn selected_messages(&self) -> Vec<&Message> {
        self.view.selected_messages()
    }

    /// Recent un-responded message count for a conversation
    pub fn unread_count(&self, phone: &str) -> usize {
        self.view.unread_count(phone, Utc::now())
    }

    /// Conversations awaiting human attention
    pub fn pending(&self) -> &[PendingRequest] {
        self.view.pending()
    }

    /// Read access to the underlying view
    pub fn view(&self) -> &ConversationView {
        &self.view
    }
}
