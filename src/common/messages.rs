//! Canonical message types for bridge communication.
//!
//! Every value that crosses a task boundary (connection worker -> bridge,
//! bridge -> observer) is defined here.

use std::fmt;

use chrono::{DateTime, Local, Utc};

/// A relayable command extracted from a monitored Discord message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCommand {
    /// Message text with the trigger prefix removed.
    pub payload: String,
    /// The full message text as posted, prefix included.
    pub original: String,
    /// When Discord says the message was posted.
    pub timestamp: DateTime<Utc>,
}

/// Events produced by the Discord connection.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// Gateway login completed.
    Ready { user: String },
    /// A command was posted in the monitored channel.
    Command(ChatCommand),
    /// Discord rejected the token. Terminal for this connection.
    AuthFailed(String),
    /// An acknowledgment post was rejected.
    AckFailed(String),
    /// The gateway session finished, with the error if it failed.
    SessionEnded(Option<String>),
}

/// Events produced by the Lumia WebSocket worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LumiaEvent {
    Opened,
    Closed,
    Message(String),
    Error(String),
}

/// Anything a connection reports back to the bridge.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    Chat(ChatEvent),
    Lumia(LumiaEvent),
}

impl From<ChatEvent> for BridgeEvent {
    fn from(event: ChatEvent) -> Self {
        Self::Chat(event)
    }
}

impl From<LumiaEvent> for BridgeEvent {
    fn from(event: LumiaEvent) -> Self {
        Self::Lumia(event)
    }
}

/// Severity of an observer log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Debug,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A log line delivered to the observer, oldest first.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Point-in-time view of both connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub chat_connected: bool,
    pub chat_status_text: String,
    pub automation_connected: bool,
    pub automation_status_text: String,
}

impl StatusSnapshot {
    /// Snapshot for a bridge with no live connections.
    pub fn not_running() -> Self {
        Self {
            chat_connected: false,
            chat_status_text: "Not Running".to_string(),
            automation_connected: false,
            automation_status_text: "Not Running".to_string(),
        }
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Discord: {} | Lumia: {}",
            self.chat_status_text, self.automation_status_text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_display_has_clock_prefix() {
        let event = LogEvent::new(LogLevel::Info, "Lumia Connected");
        let rendered = event.to_string();
        assert!(rendered.ends_with(" - Lumia Connected"));
        // HH:MM:SS
        assert_eq!(rendered.find(" - "), Some(8));
    }

    #[test]
    fn test_not_running_snapshot() {
        let status = StatusSnapshot::not_running();
        assert!(!status.chat_connected);
        assert!(!status.automation_connected);
        assert_eq!(status.to_string(), "Discord: Not Running | Lumia: Not Running");
    }
}
