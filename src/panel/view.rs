//! Conversation view model
//!
//! A single reconciliation point for remote state: every update, whether
//! from the polling listener or a synthetic test feed, lands through
//! `apply_snapshot`. Unread counts, last messages, and per-conversation
//! grouping are derived on demand and never persisted.

use crate::panel::listener::PanelSnapshot;
use crate::panel::models::{ClientProfile, ConversationSummary, Message, PendingRequest};
use crate::panel::unread;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Operator-facing view of the panel state
pub struct ConversationView {
    snapshot: PanelSnapshot,
    selected: Option<String>,
    profiles: HashMap<String, ClientProfile>,
}

impl Default for ConversationView {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationView {
    /// Empty view, populated by the first snapshot
    pub fn new() -> Self {
        Self {
            snapshot: PanelSnapshot::empty(),
            selected: None,
            profiles: HashMap::new(),
        }
    }

    /// Replace the view's state with a fresh snapshot
    ///
    /// Selection survives a refresh even if the conversation dropped out of
    /// the listing; it is cleared only by `finalize` or an explicit
    /// deselect.
    pub fn apply_snapshot(&mut self, snapshot: PanelSnapshot) {
        self.snapshot = snapshot;
    }

    /// Active conversation summaries in backend listing order
    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.snapshot.conversations
    }

    /// Conversations awaiting human attention
    pub fn pending(&self) -> &[PendingRequest] {
        &self.snapshot.pending
    }

    /// Remove a pending request locally (attended or finalized)
    pub fn remove_pending(&mut self, phone: &str) {
        self.snapshot.pending.retain(|p| p.phone != phone);
    }

    /// When the current snapshot was produced
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.snapshot.fetched_at
    }

    /// Select the active conversation
    pub fn select(&mut self, phone: &str) {
        self.selected = Some(phone.to_string());
    }

    /// Clear the active conversation
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Phone of the active conversation, if any
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Messages of one conversation, ascending by timestamp
    pub fn messages_for<'a, 'b>(
        &'a self,
        phone: &'b str,
    ) -> impl DoubleEndedIterator<Item = &'a Message> + use<'a, 'b> {
        self.snapshot
            .messages
            .iter()
            .filter(move |m| m.phone == phone)
    }

    /// Messages of the active conversation, ascending by timestamp
    pub fn selected_messages(&self) -> Vec<&Message> {
        match &self.selected {
            Some(phone) => self.messages_for(phone).collect(),
            None => Vec::new(),
        }
    }

    /// Most recent message of a conversation
    pub fn last_message(&self, phone: &str) -> Option<&Message> {
        self.messages_for(phone).next_back()
    }

    /// Recent un-responded message count for a conversation
    pub fn unread_count(&self, phone: &str, now: DateTime<Utc>) -> usize {
        unread::recent_unread(self.messages_for(phone), now)
    }

    /// Display profile for a client, falling back to the raw identifier
    pub fn profile(&self, phone: &str) -> ClientProfile {
        self.profiles
            .get(phone)
            .cloned()
            .unwrap_or_else(|| ClientProfile::fallback(phone))
    }

    /// Cache a resolved client profile
    pub fn insert_profile(&mut self, profile: ClientProfile) {
        self.profiles.insert(profile.phone.clone(), profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::models::MessageOrigin;
    use chrono::Duration;

    fn message(id: &str, phone: &str, origin: MessageOrigin, minutes_ago: i64) -> Message {
        Message {
            id: id.to_string(),
            text: Some(format!("mensaje {}", id)),
            file_url: None,
            file_type: None,
            origin,
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            phone: phone.to_string(),
        }
    }

    fn snapshot(messages: Vec<Message>) -> PanelSnapshot {
        PanelSnapshot {
            conversations: Vec::new(),
            messages,
            pending: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_selected_messages_filter_and_order() {
        let mut view = ConversationView::new();
        view.apply_snapshot(snapshot(vec![
            message("a1", "phone-a", MessageOrigin::Client, 30),
            message("b1", "phone-b", MessageOrigin::Client, 25),
            message("a2", "phone-a", MessageOrigin::Bot, 20),
            message("b2", "phone-b", MessageOrigin::Operator, 15),
            message("a3", "phone-a", MessageOrigin::Client, 10),
        ]));

        view.select("phone-a");
        let messages = view.selected_messages();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);

        // Switching conversations resets the message view to exactly the
        // other conversation's messages
        view.select("phone-b");
        let ids: Vec<&str> = view
            .selected_messages()
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b1", "b2"]);
    }

    #[test]
    fn test_no_selection_has_no_messages() {
        let mut view = ConversationView::new();
        view.apply_snapshot(snapshot(vec![message(
            "a1",
            "phone-a",
            MessageOrigin::Client,
            5,
        )]));
        assert!(view.selected_messages().is_empty());
    }

    #[test]
    fn test_unread_and_last_message_are_derived() {
        let mut view = ConversationView::new();
        let now = Utc::now();
        view.apply_snapshot(snapshot(vec![
            message("a1", "phone-a", MessageOrigin::Client, 10),
            message("a2", "phone-a", MessageOrigin::Client, 5),
        ]));
        assert_eq!(view.unread_count("phone-a", now), 2);
        assert_eq!(view.last_message("phone-a").unwrap().id, "a2");

        // A fresh snapshot recomputes from scratch
        view.apply_snapshot(snapshot(vec![
            message("a1", "phone-a", MessageOrigin::Client, 10),
            message("a2", "phone-a", MessageOrigin::Client, 5),
            message("a3", "phone-a", MessageOrigin::Operator, 1),
        ]));
        assert_eq!(view.unread_count("phone-a", now), 0);
        assert_eq!(view.last_message("phone-a").unwrap().id, "a3");
    }

    #[test]
    fn test_selection_survives_refresh() {
        let mut view = ConversationView::new();
        view.select("phone-a");
        view.apply_snapshot(snapshot(Vec::new()));
        assert_eq!(view.selected(), Some("phone-a"));
    }

    #[test]
    fn test_profile_cache_and_fallback() {
        let mut view = ConversationView::new();
        assert_eq!(view.profile("51911111111").name, "51911111111");

        view.insert_profile(ClientProfile {
            phone: "51911111111".to_string(),
            name: "María".to_string(),
            avatar_url: None,
        });
        assert_eq!(view.profile("51911111111").name, "María");
    }

    #[test]
    fn test_remove_pending() {
        let mut view = ConversationView::new();
        let mut snap = snapshot(Vec::new());
        snap.pending = vec![
            PendingRequest {
                phone: "phone-a".to_string(),
                requested_at: None,
            },
            PendingRequest {
                phone: "phone-b".to_string(),
                requested_at: None,
            },
        ];
        view.apply_snapshot(snap);

        view.remove_pending("phone-a");
        assert_eq!(view.pending().len(), 1);
        assert_eq!(view.pending()[0].phone, "phone-b");
    }
}
