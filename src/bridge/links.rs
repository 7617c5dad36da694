//! Connection seams used by the bridge.
//!
//! The bridge talks to both endpoints only through these traits, so it
//! composes the Discord and Lumia adapters instead of reaching into them.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::common::error::{DiscordResult, SendResult};
use crate::common::BridgeEvent;
use crate::discord::DiscordConnection;
use crate::lumia::LumiaConnection;

/// The chat side: receives commands, posts acknowledgments.
#[async_trait]
pub trait ChatLink: Send + Sync {
    async fn start(&mut self, events_tx: mpsc::UnboundedSender<BridgeEvent>) -> DiscordResult<()>;
    fn is_logged_in(&self) -> bool;
    fn is_ready(&self) -> bool;
    /// Queue an acknowledgment post without waiting for Discord.
    fn send_ack(&self, text: &str) -> DiscordResult<()>;
    /// Fire-and-forget shutdown request.
    fn close(&mut self);
}

/// The automation side: accepts relayed commands.
#[async_trait]
pub trait AutomationLink: Send + Sync {
    /// Issue one connection attempt, replacing any previous one.
    fn start(&mut self, events_tx: mpsc::UnboundedSender<BridgeEvent>);
    fn send_command(&self, command: &str) -> SendResult<()>;
    fn is_connected(&self) -> bool;
    /// Close and wait for the socket worker to exit.
    async fn stop(&mut self);
}

#[async_trait]
impl ChatLink for DiscordConnection {
    async fn start(&mut self, events_tx: mpsc::UnboundedSender<BridgeEvent>) -> DiscordResult<()> {
        DiscordConnection::start(self, events_tx).await
    }

    fn is_logged_in(&self) -> bool {
        DiscordConnection::is_logged_in(self)
    }

    fn is_ready(&self) -> bool {
        DiscordConnection::is_ready(self)
    }

    fn send_ack(&self, text: &str) -> DiscordResult<()> {
        DiscordConnection::send_ack(self, text)
    }

    fn close(&mut self) {
        DiscordConnection::close(self)
    }
}

#[async_trait]
impl AutomationLink for LumiaConnection {
    fn start(&mut self, events_tx: mpsc::UnboundedSender<BridgeEvent>) {
        LumiaConnection::start(self, events_tx)
    }

    fn send_command(&self, command: &str) -> SendResult<()> {
        LumiaConnection::send_command(self, command)
    }

    fn is_connected(&self) -> bool {
        LumiaConnection::is_connected(self)
    }

    async fn stop(&mut self) {
        LumiaConnection::stop(self).await
    }
}
