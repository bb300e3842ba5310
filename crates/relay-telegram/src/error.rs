//! Error types for the Telegram transport.

use relay_core::RelayError;
use thiserror::Error;

/// Errors that can occur while configuring or running the bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set BOT_TOKEN environment variable.")]
    NoToken,

    /// A configuration value is missing or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Webhook registration failed.
    #[error("Failed to register webhook: {0}")]
    WebhookFailed(String),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Error from the relay core.
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
