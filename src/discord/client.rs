//! Discord bot client abstraction.
//!
//! Provides a high-level interface for starting the gateway session and
//! posting acknowledgments, hiding serenity implementation details from
//! the rest of the application.

use std::sync::Arc;
use std::time::Duration;

use serenity::gateway::{GatewayError, ShardManager};
use serenity::http::{Http, HttpBuilder, HttpError};
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::common::error::{DiscordError, DiscordResult};
use crate::common::{BridgeEvent, ChatEvent, ConnectionState};
use crate::discord::handler::{RelayHandler, SessionFlags};

async fn build_client(token: &str, handler: RelayHandler) -> anyhow::Result<Client> {
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILDS;

    // Build a custom reqwest client with timeout settings
    let reqwest_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let http = HttpBuilder::new(token).client(reqwest_client).build();

    let client = serenity::client::ClientBuilder::new_with_http(http, intents)
        .event_handler(handler)
        .await?;
    Ok(client)
}

/// Classify the error a gateway session ended with.
fn session_error(error: serenity::Error) -> DiscordError {
    if is_auth_failure(&error) {
        DiscordError::AuthFailed {
            message: error.to_string(),
        }
    } else {
        DiscordError::Serenity(error)
    }
}

/// Whether a gateway failure means the token was rejected.
fn is_auth_failure(error: &serenity::Error) -> bool {
    match error {
        serenity::Error::Gateway(GatewayError::InvalidAuthentication) => true,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            response.status_code.as_u16() == 401
        }
        _ => false,
    }
}

/// Gateway session for the monitored channel.
pub struct DiscordConnection {
    token: String,
    channel_id: ChannelId,
    flags: Arc<SessionFlags>,
    http: Option<Arc<Http>>,
    events_tx: Option<mpsc::UnboundedSender<BridgeEvent>>,
    shard_manager: Option<Arc<ShardManager>>,
    task: Option<JoinHandle<()>>,
}

impl DiscordConnection {
    pub fn new(token: String, channel_id: u64) -> Self {
        Self {
            token,
            channel_id: ChannelId::new(channel_id),
            flags: Arc::new(SessionFlags::default()),
            http: None,
            events_tx: None,
            shard_manager: None,
            task: None,
        }
    }

    /// Build the client and run the gateway session in a background task.
    ///
    /// A rejected token is reported as `ChatEvent::AuthFailed` once the
    /// gateway answers; the session is not retried.
    pub async fn start(&mut self, events_tx: mpsc::UnboundedSender<BridgeEvent>) -> DiscordResult<()> {
        if self.task.is_some() {
            debug!("Discord session already started");
            return Ok(());
        }

        info!("Connecting to Discord...");
        self.flags.state.set(ConnectionState::Connecting);

        let handler = RelayHandler::new(self.channel_id.get(), self.flags.clone(), events_tx.clone());
        let mut client = match build_client(&self.token, handler).await {
            Ok(client) => client,
            Err(e) => {
                self.flags.state.set(ConnectionState::Disconnected);
                return Err(DiscordError::ConnectionFailed {
                    message: e.to_string(),
                });
            }
        };

        self.http = Some(client.http.clone());
        self.events_tx = Some(events_tx.clone());
        self.shard_manager = Some(client.shard_manager.clone());

        let flags = self.flags.clone();
        self.task = Some(tokio::spawn(async move {
            let ended = match client.start().await.map_err(session_error) {
                Ok(()) => {
                    info!("Discord client disconnected normally");
                    ChatEvent::SessionEnded(None)
                }
                Err(e @ DiscordError::AuthFailed { .. }) => {
                    error!("{}", e);
                    ChatEvent::AuthFailed(e.to_string())
                }
                Err(e) => {
                    error!("Discord client error: {}", e);
                    ChatEvent::SessionEnded(Some(e.to_string()))
                }
            };

            flags.reset();
            if let Err(error) = events_tx.send(ended.into()) {
                debug!("Bridge gone before Discord session ended: {:?}", error.0);
            }
        }));

        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.flags.is_logged_in()
    }

    /// Logged in and currently receiving gateway events.
    pub fn is_ready(&self) -> bool {
        self.flags.is_ready()
    }

    /// Post text to the monitored channel in the background.
    ///
    /// Returns once the post is queued; a failed post comes back to the
    /// bridge as `ChatEvent::AckFailed`.
    pub fn send_ack(&self, text: &str) -> DiscordResult<()> {
        let (Some(http), Some(events_tx)) = (self.http.clone(), self.events_tx.clone()) else {
            return Err(DiscordError::SendFailed {
                message: "Discord session not started".to_string(),
            });
        };

        let channel_id = self.channel_id;
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = channel_id.say(&http, text).await {
                let failure = DiscordError::SendFailed {
                    message: e.to_string(),
                };
                if let Err(error) = events_tx.send(ChatEvent::AckFailed(failure.to_string()).into()) {
                    debug!("Bridge gone before ack failure was reported: {:?}", error.0);
                }
            }
        });
        Ok(())
    }

    /// Request gateway shutdown without waiting for it to finish.
    pub fn close(&mut self) {
        let Some(manager) = self.shard_manager.take() else {
            return;
        };

        self.flags.state.set(ConnectionState::Closing);
        // The session task observes the shutdown and finishes on its own.
        self.task.take();
        tokio::spawn(async move {
            info!("Initiating graceful Discord shutdown...");
            manager.shutdown_all().await;
            info!("Discord shutdown complete");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_authentication_is_terminal() {
        let error = serenity::Error::Gateway(GatewayError::InvalidAuthentication);
        assert!(is_auth_failure(&error));
        assert!(matches!(session_error(error), DiscordError::AuthFailed { .. }));

        let error = serenity::Error::Gateway(GatewayError::ReconnectFailure);
        assert!(!is_auth_failure(&error));
        assert!(matches!(session_error(error), DiscordError::Serenity(_)));
    }

    #[tokio::test]
    async fn test_never_started() {
        let mut connection = DiscordConnection::new("token".to_string(), 42);
        assert!(!connection.is_logged_in());
        assert!(!connection.is_ready());

        let result = connection.send_ack("Sent to Lumia: !lights");
        assert!(matches!(result, Err(DiscordError::SendFailed { .. })));

        // Safe when never started, and idempotent.
        connection.close();
        connection.close();
        assert!(!connection.is_ready());
    }
}
