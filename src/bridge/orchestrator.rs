//! Bridge orchestrator that ties Discord and Lumia together.
//!
//! Owns both connections and the acknowledgment debouncer, relays chat
//! commands to Lumia, reports everything to the observer log stream, and
//! reconnects Lumia when the health check finds it down.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::bridge::ack::AckDebouncer;
use crate::bridge::channels::BridgeChannels;
use crate::bridge::links::{AutomationLink, ChatLink};
use crate::bridge::state::BridgePhase;
use crate::common::{
    BridgeEvent, ChatCommand, ChatEvent, LogEvent, LogLevel, LumiaEvent, StatusSnapshot,
};
use crate::config::Credentials;
use crate::discord::DiscordConnection;
use crate::lumia::LumiaConnection;

/// Where the chat session stands, as far as the bridge has been told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatSession {
    NotStarted,
    Started,
    Ended,
}

/// The main bridge that orchestrates message flow.
pub struct Bridge<C = DiscordConnection, A = LumiaConnection> {
    chat: C,
    lumia: A,
    debouncer: AckDebouncer,
    channels: BridgeChannels,
    phase: BridgePhase,
    chat_session: ChatSession,
    lumia_started: bool,
    reconnect_attempts: u32,
}

impl Bridge {
    /// Create a bridge for the given credentials.
    pub fn new(credentials: Credentials, ack_interval: Duration, channels: BridgeChannels) -> Self {
        let chat = DiscordConnection::new(credentials.discord_token, credentials.channel_id);
        let lumia = LumiaConnection::new(credentials.lumia);
        Self::with_links(chat, lumia, ack_interval, channels)
    }
}

impl<C: ChatLink, A: AutomationLink> Bridge<C, A> {
    pub fn with_links(chat: C, lumia: A, ack_interval: Duration, channels: BridgeChannels) -> Self {
        Self {
            chat,
            lumia,
            debouncer: AckDebouncer::new(ack_interval),
            channels,
            phase: BridgePhase::Idle,
            chat_session: ChatSession::NotStarted,
            lumia_started: false,
            reconnect_attempts: 0,
        }
    }

    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    /// Connect Lumia, then Discord.
    ///
    /// A Discord start failure is logged; the bridge keeps running so the
    /// Lumia side stays supervised.
    pub async fn start(&mut self) {
        if self.phase != BridgePhase::Idle {
            warn!("Bridge start ignored in phase {:?}", self.phase);
            return;
        }
        self.phase = BridgePhase::Starting;

        self.log(LogLevel::Info, "Connecting to LumiaStream");
        self.start_lumia();

        match self.chat.start(self.channels.events_tx.clone()).await {
            Ok(()) => {
                self.chat_session = ChatSession::Started;
                self.log(LogLevel::Info, "Discord bot started");
            }
            Err(e) => {
                self.chat_session = ChatSession::Ended;
                self.log(LogLevel::Error, format!("Failed to start Discord bot: {}", e));
            }
        }

        self.phase = BridgePhase::Running;
    }

    fn start_lumia(&mut self) {
        self.lumia.start(self.channels.events_tx.clone());
        self.lumia_started = true;
    }

    /// Apply one event reported by a connection.
    pub fn handle_event(&mut self, event: BridgeEvent) {
        if self.phase.is_stopped() {
            debug!("Dropping event after stop: {:?}", event);
            return;
        }

        match event {
            BridgeEvent::Chat(event) => self.handle_chat_event(event),
            BridgeEvent::Lumia(event) => self.handle_lumia_event(event),
        }
    }

    fn handle_chat_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Command(command) => self.on_chat_command(command),
            ChatEvent::AckFailed(reason) => {
                self.log(LogLevel::Error, format!("Failed to acknowledge command: {}", reason));
            }
            ChatEvent::Ready { user } => {
                self.log(LogLevel::Info, format!("Discord bot logged in as {}", user));
            }
            ChatEvent::AuthFailed(reason) => {
                self.chat_session = ChatSession::Ended;
                self.log(
                    LogLevel::Error,
                    format!("Discord login rejected: {}. Update the bot token to retry.", reason),
                );
            }
            ChatEvent::SessionEnded(None) => {
                self.chat_session = ChatSession::Ended;
                self.log(LogLevel::Info, "Discord session ended");
            }
            ChatEvent::SessionEnded(Some(reason)) => {
                self.chat_session = ChatSession::Ended;
                self.log(LogLevel::Error, format!("Discord session ended: {}", reason));
            }
        }
    }

    fn handle_lumia_event(&mut self, event: LumiaEvent) {
        match event {
            LumiaEvent::Opened => {
                self.reconnect_attempts = 0;
                self.log(LogLevel::Info, "Lumia Connected");
            }
            LumiaEvent::Closed => self.log(LogLevel::Info, "Lumia Disconnected"),
            LumiaEvent::Message(text) => self.log(LogLevel::Debug, format!("Lumia Msg: {}", text)),
            LumiaEvent::Error(text) => self.log(LogLevel::Error, format!("Lumia Error: {}", text)),
        }
    }

    /// Relay a chat command to Lumia and acknowledge it in Discord.
    ///
    /// Send and acknowledgment failures are logged and swallowed. Nothing
    /// here waits on the network.
    pub fn on_chat_command(&mut self, command: ChatCommand) {
        if !self.phase.is_live() {
            debug!("Dropping command outside running phase: {}", command.payload);
            return;
        }

        if self.lumia_started {
            if let Err(e) = self.lumia.send_command(&command.payload) {
                self.log(LogLevel::Error, format!("Failed to send command to Lumia: {}", e));
            }
        }
        self.log(LogLevel::Debug, format!("Discord Msg: {}", command.payload));

        match self.debouncer.register(&command.original, command.timestamp) {
            Some(ack) => {
                if let Err(e) = self.chat.send_ack(&ack) {
                    self.log(LogLevel::Error, format!("Failed to acknowledge command: {}", e));
                }
            }
            None => debug!(
                "Acknowledgment suppressed ({} pending)",
                self.debouncer.suppressed()
            ),
        }
    }

    /// Health check: report status and reconnect Lumia if it is down.
    ///
    /// Every call that finds Lumia disconnected issues exactly one new
    /// connection attempt. Discord is only inspected, never restarted.
    pub fn check_status(&mut self) -> StatusSnapshot {
        if !self.phase.is_live() {
            return StatusSnapshot::not_running();
        }

        let logged_in = self.chat.is_logged_in();
        let ready = self.chat.is_ready();
        self.log(
            LogLevel::Debug,
            format!("DiscordBot Status: LoggedIn[{}] Ready[{}]", logged_in, ready),
        );

        let snapshot = self.status();
        self.log(
            LogLevel::Debug,
            format!("Lumia WebSocket: Connected = {}", snapshot.automation_connected),
        );

        if !snapshot.automation_connected {
            self.reconnect_attempts = self.reconnect_attempts.saturating_add(1);
            self.log(
                LogLevel::Info,
                format!(
                    "Attempting to reconnect to LumiaStream Websocket (attempt {})",
                    self.reconnect_attempts
                ),
            );
            self.start_lumia();
        }

        snapshot
    }

    /// Current status of both connections, read from the live objects.
    pub fn status(&self) -> StatusSnapshot {
        if !self.phase.is_live() {
            return StatusSnapshot::not_running();
        }

        let chat_connected = self.chat_session == ChatSession::Started && self.chat.is_ready();
        let chat_status_text = match self.chat_session {
            ChatSession::NotStarted => "Not Running",
            ChatSession::Ended => "Disconnected",
            ChatSession::Started if chat_connected => "Logged In",
            ChatSession::Started if self.chat.is_logged_in() => "Reconnecting",
            ChatSession::Started => "Connecting",
        };

        let automation_connected = self.lumia_started && self.lumia.is_connected();
        let automation_status_text = if automation_connected {
            "Connected"
        } else {
            "Not Connected"
        };

        StatusSnapshot {
            chat_connected,
            chat_status_text: chat_status_text.to_string(),
            automation_connected,
            automation_status_text: automation_status_text.to_string(),
        }
    }

    /// Stop Lumia (waiting for its worker) and ask Discord to shut down.
    ///
    /// Discord teardown may still be in progress when this returns.
    pub async fn close(&mut self) {
        if matches!(self.phase, BridgePhase::Closing | BridgePhase::Stopped) {
            return;
        }

        self.log(LogLevel::Info, "Closing connections");
        self.phase = BridgePhase::Closing;

        self.lumia.stop().await;
        self.chat.close();

        self.phase = BridgePhase::Stopped;
        info!("Bridge stopped");
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        if self.phase.is_stopped() {
            return;
        }
        if let Err(e) = self.channels.log_tx.send(LogEvent::new(level, message)) {
            debug!("Observer log channel closed: {}", e.0.message);
        }
    }
}
