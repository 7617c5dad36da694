//! Configuration type definitions.

use serde::{Deserialize, Deserializer};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    pub lumia: LumiaConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    /// Channel ID (not name) to monitor for commands.
    #[serde(deserialize_with = "string_or_number")]
    pub channel_id: String,
}

/// LumiaStream API endpoint (LumiaStream > Settings > API).
#[derive(Debug, Clone, Deserialize)]
pub struct LumiaConfig {
    pub token: String,
    #[serde(default = "default_lumia_host")]
    pub host: String,
    pub port: u16,
}

/// Runner tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Seconds between health checks.
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,
    /// Minimum seconds between two acknowledgments posted to Discord.
    #[serde(default = "default_ack_interval")]
    pub ack_interval_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            status_interval_secs: default_status_interval(),
            ack_interval_secs: default_ack_interval(),
        }
    }
}

fn default_lumia_host() -> String {
    "localhost".to_string()
}

fn default_status_interval() -> u64 {
    5
}

fn default_ack_interval() -> u64 {
    10
}

/// Discord snowflakes are often written unquoted; accept both forms.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
