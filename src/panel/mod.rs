//! Conversation panel
//!
//! The live takeover workflow: a listener keeps a snapshot of active
//! conversations synchronized with the backend, a control tracker records
//! which side owns each conversation, and the controller composes both into
//! the operator-facing view.

pub mod control;
pub mod controller;
pub mod listener;
pub mod models;
pub mod unread;
pub mod view;

pub use control::ControlTracker;
pub use controller::PanelController;
pub use listener::{BackendSource, Listener, PanelSnapshot, SnapshotSource};
pub use view::ConversationView;
