//! Immutable credentials handed to the bridge.

use std::fmt;

use crate::common::error::ConfigError;
use crate::config::types::Config;
use crate::lumia::LumiaEndpoint;

/// Everything the bridge needs to reach both endpoints.
///
/// Built once; a credential change means building a new bridge.
#[derive(Clone)]
pub struct Credentials {
    pub discord_token: String,
    pub channel_id: u64,
    pub lumia: LumiaEndpoint,
}

impl Credentials {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let channel_id = parse_channel_id(&config.discord.channel_id)?;

        Ok(Self {
            discord_token: config.discord.token.clone(),
            channel_id,
            lumia: LumiaEndpoint {
                token: config.lumia.token.clone(),
                host: config.lumia.host.clone(),
                port: config.lumia.port,
            },
        })
    }
}

/// Parse a Discord channel snowflake; zero is not a valid channel.
pub fn parse_channel_id(raw: &str) -> Result<u64, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        field: "discord.channel_id".to_string(),
        message,
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(invalid("must be non-zero".to_string())),
        Ok(id) => Ok(id),
        Err(_) => Err(invalid(format!("must be a numeric channel ID (got '{}')", raw))),
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("channel_id", &self.channel_id)
            .field("lumia_host", &self.lumia.host)
            .field("lumia_port", &self.lumia.port)
            .finish_non_exhaustive()
    }
}
