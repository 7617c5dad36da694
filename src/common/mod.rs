//! Common utilities and types shared across the application.

pub mod error;
pub mod messages;
pub mod types;

pub use messages::{
    BridgeEvent, ChatCommand, ChatEvent, LogEvent, LogLevel, LumiaEvent, StatusSnapshot,
};
pub use types::{ConnectionState, SharedConnectionState};
