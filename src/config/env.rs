//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `LUMIA_RELAY_DISCORD_TOKEN` - Discord bot token
//! - `LUMIA_RELAY_DISCORD_CHANNEL_ID` - Monitored channel ID
//! - `LUMIA_RELAY_LUMIA_TOKEN` - LumiaStream API token
//! - `LUMIA_RELAY_LUMIA_HOST` - LumiaStream API host
//! - `LUMIA_RELAY_LUMIA_PORT` - LumiaStream API port

use std::env;

use tracing::warn;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "LUMIA_RELAY";

/// Apply environment variable overrides to a config.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        config.discord.token = token;
    }
    if let Ok(channel_id) = env::var(format!("{}_DISCORD_CHANNEL_ID", ENV_PREFIX)) {
        config.discord.channel_id = channel_id;
    }

    if let Ok(token) = env::var(format!("{}_LUMIA_TOKEN", ENV_PREFIX)) {
        config.lumia.token = token;
    }
    if let Ok(host) = env::var(format!("{}_LUMIA_HOST", ENV_PREFIX)) {
        config.lumia.host = host;
    }
    if let Ok(port) = env::var(format!("{}_LUMIA_PORT", ENV_PREFIX)) {
        match port.parse() {
            Ok(port) => config.lumia.port = port,
            Err(_) => warn!("Ignoring {}_LUMIA_PORT='{}': not a port number", ENV_PREFIX, port),
        }
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `LUMIA_RELAY_CONFIG`, otherwise returns "lumia-relay.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "lumia-relay.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn make_test_config() -> Config {
        Config {
            discord: DiscordConfig {
                token: "original_token".to_string(),
                channel_id: "1234".to_string(),
            },
            lumia: LumiaConfig {
                token: "lumia".to_string(),
                host: "localhost".to_string(),
                port: 39231,
            },
            bridge: BridgeConfig::default(),
        }
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "LUMIA_RELAY");
    }

    // Single test so parallel test threads never race on the same variables.
    #[test]
    fn test_env_overrides() {
        env::remove_var("LUMIA_RELAY_CONFIG");
        assert_eq!(get_config_path(), "lumia-relay.conf");

        env::remove_var("LUMIA_RELAY_DISCORD_TOKEN");
        env::remove_var("LUMIA_RELAY_DISCORD_CHANNEL_ID");
        env::remove_var("LUMIA_RELAY_LUMIA_TOKEN");
        env::remove_var("LUMIA_RELAY_LUMIA_HOST");
        env::remove_var("LUMIA_RELAY_LUMIA_PORT");
        let result = apply_env_overrides(make_test_config());
        assert_eq!(result.discord.token, "original_token");
        assert_eq!(result.lumia.port, 39231);

        env::set_var("LUMIA_RELAY_LUMIA_HOST", "10.0.0.5");
        env::set_var("LUMIA_RELAY_LUMIA_PORT", "not-a-port");
        let result = apply_env_overrides(make_test_config());
        assert_eq!(result.lumia.host, "10.0.0.5");
        assert_eq!(result.lumia.port, 39231);

        env::set_var("LUMIA_RELAY_LUMIA_PORT", "40000");
        let result = apply_env_overrides(make_test_config());
        assert_eq!(result.lumia.port, 40000);

        env::remove_var("LUMIA_RELAY_LUMIA_HOST");
        env::remove_var("LUMIA_RELAY_LUMIA_PORT");
    }
}
