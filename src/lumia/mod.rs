//! LumiaStream API integration.
//!
//! This module provides the WebSocket connection that receives relayed
//! chat commands.

pub mod client;
pub mod protocol;

pub use client::LumiaConnection;
pub use protocol::LumiaEndpoint;
