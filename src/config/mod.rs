//! Configuration loading, overrides and validation.
//!
//! The file is HOCON; every credential can be overridden from the
//! environment (see `env`).

pub mod credentials;
pub mod env;
pub mod types;
pub mod validate;

use std::fs;
use std::path::Path;

use hocon::HoconLoader;

use crate::common::error::ConfigError;

pub use credentials::Credentials;
pub use types::*;

/// Read and parse a config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content)
}

/// Parse HOCON text into a `Config`.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let parse_error = |e: hocon::Error| ConfigError::ParseError {
        message: e.to_string(),
    };
    HoconLoader::new()
        .load_str(content)
        .map_err(parse_error)?
        .resolve()
        .map_err(parse_error)
}

/// Load the config file, apply environment overrides, then validate.
pub fn load_and_validate(path: &str) -> Result<Config, ConfigError> {
    let config = env::apply_env_overrides(load_config(path)?);
    validate::validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            discord {
                token = "abc.def.ghi"
                channel_id = "123456789012345678"
            }
            lumia {
                token = "lumia-token"
                host = "127.0.0.1"
                port = 39231
            }
            bridge {
                status_interval_secs = 3
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.discord.channel_id, "123456789012345678");
        assert_eq!(config.lumia.host, "127.0.0.1");
        assert_eq!(config.lumia.port, 39231);
        assert_eq!(config.bridge.status_interval_secs, 3);
        assert_eq!(config.bridge.ack_interval_secs, 10);
    }

    #[test]
    fn test_bridge_section_is_optional() {
        let config = parse_config(
            r#"
            discord { token = "t", channel_id = "42" }
            lumia { token = "l", port = 39231 }
            "#,
        )
        .unwrap();

        assert_eq!(config.lumia.host, "localhost");
        assert_eq!(config.bridge.status_interval_secs, 5);
        assert_eq!(config.bridge.ack_interval_secs, 10);
    }

    #[test]
    fn test_missing_lumia_section_fails() {
        let result = parse_config(r#"discord { token = "t", channel_id = "42" }"#);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config("/nonexistent/lumia-relay.conf");
        match result {
            Err(ConfigError::IoError { path, source }) => {
                assert_eq!(path, "/nonexistent/lumia-relay.conf");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected IoError, got {:?}", other.map(|_| ())),
        }
    }
}
