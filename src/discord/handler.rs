//! Discord gateway event handling.
//!
//! Commands are read from a serenity message collector. The shard runner
//! feeds collectors synchronously, before it spawns the per-event handler
//! tasks, so the collector stream preserves gateway order where handler
//! tasks would race each other. The `message` handler only covers messages
//! that arrived before the collector was attached.

use std::pin::pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serenity::async_trait;
use serenity::collector::MessageCollector;
use serenity::gateway::{ConnectionStage, ShardStageUpdateEvent};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, GuildId};
use serenity::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::common::{BridgeEvent, ChatCommand, ChatEvent, ConnectionState, SharedConnectionState};

/// Leading character that marks a message as a relayable command.
pub const TRIGGER_PREFIX: char = '!';

/// Extract the command payload from a message, if it qualifies.
///
/// Messages outside the monitored channel or without the trigger prefix
/// return `None`.
pub fn parse_command(monitored_channel: u64, channel_id: u64, content: &str) -> Option<&str> {
    if channel_id != monitored_channel {
        return None;
    }
    content.strip_prefix(TRIGGER_PREFIX)
}

/// The parts of a Discord message the relay looks at.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: u64,
    pub channel_id: u64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for IncomingMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.get(),
            channel_id: message.channel_id.get(),
            content: message.content.clone(),
            timestamp: message_time(message),
        }
    }
}

impl IncomingMessage {
    pub fn command(&self, monitored_channel: u64) -> Option<ChatCommand> {
        parse_command(monitored_channel, self.channel_id, &self.content).map(|payload| ChatCommand {
            payload: payload.to_string(),
            original: self.content.clone(),
            timestamp: self.timestamp,
        })
    }
}

/// Forward the commands found in an ordered message stream, in order.
///
/// Ends with the stream, or as soon as the bridge stops listening.
pub async fn relay_commands<S>(
    messages: S,
    monitored_channel: u64,
    events_tx: &mpsc::UnboundedSender<BridgeEvent>,
) where
    S: Stream<Item = IncomingMessage>,
{
    let mut messages = pin!(messages);
    while let Some(message) = messages.next().await {
        let Some(command) = message.command(monitored_channel) else {
            continue;
        };
        debug!("Discord command: {}", command.payload);
        if events_tx.send(ChatEvent::Command(command).into()).is_err() {
            debug!("Bridge event channel closed, stopping command relay");
            break;
        }
    }
}

/// Which messages belong to the attached collector.
///
/// Snowflake ids grow in gateway order, so everything at or after the
/// first collected id is delivered by the collector.
#[derive(Debug, Default)]
pub struct CommandFeed {
    attached: AtomicBool,
    /// First message id seen by the current collector, 0 before any.
    first_collected: AtomicU64,
}

impl CommandFeed {
    /// Claim the collector slot; false when one is already attached.
    fn try_attach(&self) -> bool {
        !self.attached.swap(true, Ordering::AcqRel)
    }

    fn detach(&self) {
        self.first_collected.store(0, Ordering::Release);
        self.attached.store(false, Ordering::Release);
    }

    fn mark_collected(&self, id: u64) {
        let _ = self
            .first_collected
            .compare_exchange(0, id, Ordering::AcqRel, Ordering::Acquire);
    }

    fn is_collected(&self, id: u64) -> bool {
        let first = self.first_collected.load(Ordering::Acquire);
        first != 0 && id >= first
    }
}

/// Session flags shared between the gateway handler and status readers.
#[derive(Debug, Default)]
pub struct SessionFlags {
    /// Connected while the shard is delivering events.
    pub state: SharedConnectionState,
    /// Gateway login completed.
    pub logged_in: AtomicBool,
}

impl SessionFlags {
    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::Acquire)
    }

    pub fn is_ready(&self) -> bool {
        self.is_logged_in() && self.state.is_connected()
    }

    pub fn reset(&self) {
        self.logged_in.store(false, Ordering::Release);
        self.state.set(ConnectionState::Disconnected);
    }
}

/// Feeds monitored-channel commands and session changes to the bridge.
pub struct RelayHandler {
    channel_id: u64,
    flags: Arc<SessionFlags>,
    feed: Arc<CommandFeed>,
    events_tx: mpsc::UnboundedSender<BridgeEvent>,
}

impl RelayHandler {
    pub fn new(
        channel_id: u64,
        flags: Arc<SessionFlags>,
        events_tx: mpsc::UnboundedSender<BridgeEvent>,
    ) -> Self {
        Self {
            channel_id,
            flags,
            feed: Arc::new(CommandFeed::default()),
            events_tx,
        }
    }

    fn forward(&self, event: ChatEvent) {
        if let Err(error) = self.events_tx.send(event.into()) {
            warn!("Failed to process discord event: {:?}", error.0);
        }
    }

    /// Start the ordered command stream for this shard, once.
    fn attach_collector(&self, context: &Context) {
        if !self.feed.try_attach() {
            return;
        }

        let feed = self.feed.clone();
        let messages = MessageCollector::new(&context.shard)
            .channel_id(ChannelId::new(self.channel_id))
            .filter(move |message: &Message| {
                feed.mark_collected(message.id.get());
                true
            })
            .stream();

        let feed = self.feed.clone();
        let events_tx = self.events_tx.clone();
        let channel_id = self.channel_id;
        tokio::spawn(async move {
            let messages = messages.map(|message| IncomingMessage::from(&message));
            relay_commands(messages, channel_id, &events_tx).await;
            feed.detach();
            debug!("Discord message collector ended");
        });
        debug!("Discord message collector attached");
    }
}

#[async_trait]
impl EventHandler for RelayHandler {
    async fn message(&self, context: Context, message: Message) {
        self.attach_collector(&context);
        if self.feed.is_collected(message.id.get()) {
            return;
        }

        // Arrived before the collector existed.
        if let Some(command) = IncomingMessage::from(&message).command(self.channel_id) {
            debug!("Command from {}: {}", message.author.name, command.payload);
            self.forward(ChatEvent::Command(command));
        }
    }

    async fn ready(&self, context: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);
        self.attach_collector(&context);
        self.flags.logged_in.store(true, Ordering::Release);
        self.flags.state.set(ConnectionState::Connected);
        self.forward(ChatEvent::Ready {
            user: ready.user.name.clone(),
        });
    }

    async fn cache_ready(&self, context: Context, guilds: Vec<GuildId>) {
        debug!("Discord cache ready ({} guilds)", guilds.len());
        self.attach_collector(&context);
    }

    async fn shard_stage_update(&self, _context: Context, event: ShardStageUpdateEvent) {
        debug!("Discord shard stage {:?} -> {:?}", event.old, event.new);
        if self.flags.state.get() == ConnectionState::Closing {
            return;
        }
        let state = if matches!(event.new, ConnectionStage::Connected) {
            ConnectionState::Connected
        } else {
            ConnectionState::Connecting
        };
        self.flags.state.set(state);
    }
}

/// Discord's own timestamp for the message, falling back to receive time.
fn message_time(message: &Message) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&message.timestamp.to_string())
        .map(|time| time.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
