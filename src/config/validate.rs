//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::credentials::parse_channel_id;
use crate::config::types::Config;

const TOKEN_PLACEHOLDERS: [&str; 2] = ["YOUR_DISCORD_TOKEN_HERE", "YOUR_LUMIA_TOKEN_HERE"];

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.discord.token.is_empty() {
        errors.push("discord.token is required".to_string());
    }
    if TOKEN_PLACEHOLDERS.contains(&config.discord.token.as_str()) {
        errors.push("discord.token has not been configured (still using placeholder)".to_string());
    }
    if let Err(e) = parse_channel_id(&config.discord.channel_id) {
        errors.push(e.to_string());
    }

    if config.lumia.token.is_empty() {
        errors.push("lumia.token is required".to_string());
    }
    if TOKEN_PLACEHOLDERS.contains(&config.lumia.token.as_str()) {
        errors.push("lumia.token has not been configured (still using placeholder)".to_string());
    }
    if config.lumia.host.is_empty() {
        errors.push("lumia.host is required".to_string());
    }
    if config.lumia.port == 0 {
        errors.push("lumia.port must be non-zero".to_string());
    }

    if config.bridge.status_interval_secs == 0 {
        errors.push("bridge.status_interval_secs must be non-zero".to_string());
    }
    if config.bridge.ack_interval_secs == 0 {
        errors.push("bridge.ack_interval_secs must be non-zero".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn make_valid_config() -> Config {
        Config {
            discord: DiscordConfig {
                token: "valid_token_here".to_string(),
                channel_id: "987654321".to_string(),
            },
            lumia: LumiaConfig {
                token: "lumia_token".to_string(),
                host: "localhost".to_string(),
                port: 39231,
            },
            bridge: BridgeConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let config = make_valid_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_token_fails() {
        let mut config = make_valid_config();
        config.discord.token = String::new();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("discord.token"));
    }

    #[test]
    fn test_placeholder_token_fails() {
        let mut config = make_valid_config();
        config.lumia.token = "YOUR_LUMIA_TOKEN_HERE".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("placeholder"));
    }

    #[test]
    fn test_channel_name_instead_of_id_fails() {
        let mut config = make_valid_config();
        config.discord.channel_id = "general".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("numeric channel ID"));
    }

    #[test]
    fn test_zero_channel_id_fails() {
        let mut config = make_valid_config();
        config.discord.channel_id = "0".to_string();

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("discord.channel_id"));
        assert!(message.contains("non-zero"));
    }

    #[test]
    fn test_errors_are_collected() {
        let mut config = make_valid_config();
        config.lumia.host = String::new();
        config.lumia.port = 0;
        config.bridge.ack_interval_secs = 0;

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("lumia.host"));
        assert!(message.contains("lumia.port"));
        assert!(message.contains("bridge.ack_interval_secs"));
    }
}
