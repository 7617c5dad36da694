//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Lumia WebSocket connection errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to connect to {url}: {message}")]
    ConnectFailed { url: String, message: String },

    #[error("Connection timeout")]
    Timeout,

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Discord-related errors.
#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("Discord rejected the bot token: {message}")]
    AuthFailed { message: String },

    #[error("Failed to connect to Discord: {message}")]
    ConnectionFailed { message: String },

    #[error("Failed to send message: {message}")]
    SendFailed { message: String },

    #[error("Serenity error: {0}")]
    Serenity(#[from] serenity::Error),
}

/// Errors from relaying a command to Lumia.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Lumia socket is not open")]
    NotConnected,

    #[error("Lumia socket worker has exited")]
    ChannelClosed,

    #[error("Failed to serialize command: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for connection operations.
pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;

/// Result type alias for Discord operations.
pub type DiscordResult<T> = std::result::Result<T, DiscordError>;

/// Result type alias for relay sends.
pub type SendResult<T> = std::result::Result<T, SendError>;
