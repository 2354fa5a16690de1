//! Remote data gateway
//!
//! Wraps HTTP calls to the agent backend with uniform error surfacing.
//! `client` holds the shared HTTP client and envelope handling; `panel`,
//! `agent`, and `training` add the typed endpoint surfaces.

pub mod agent;
pub mod client;
pub mod panel;
pub mod training;

pub use client::ApiClient;
