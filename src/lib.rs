//! Chatbot Console Library
//!
//! Operator console for a live-chat AI agent backend. Exposes the remote
//! data gateway, the conversation panel (listener, control tracker,
//! controller), and the agent test harness. The interactive binary is in
//! `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
pub mod harness;
/// Conversation panel: data model, listener, control tracking, and the
/// controller that composes them into a live takeover workflow.
pub mod panel;
