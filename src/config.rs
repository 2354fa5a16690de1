//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend connection configuration
    pub backend: BackendConfig,
    /// Panel behavior configuration
    pub panel: PanelConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the agent backend
    pub base_url: String,
    /// API key sent in the `X-Api-Key` header
    pub api_key: String,
}

/// Panel behavior configuration
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Seconds between conversation list refreshes
    pub poll_interval_secs: u64,
    /// Maximum number of conversations fetched per refresh
    pub conversation_limit: usize,
    /// Maximum number of messages fetched per conversation
    pub message_limit: usize,
    /// Phone number used by the agent test harness
    pub test_phone: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            backend: BackendConfig {
                base_url: env::var("API_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:3008".to_string()),
                api_key: env::var("API_KEY").unwrap_or_default(),
            },
            panel: PanelConfig {
                poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                conversation_limit: env::var("CONVERSATION_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(50),
                message_limit: env::var("MESSAGE_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(100),
                test_phone: env::var("TEST_PHONE")
                    .unwrap_or_else(|_| "51987654321".to_string()),
            },
        }
    }
}
