//! LumiaStream WebSocket API frames.

use serde::Serialize;

/// Address of a LumiaStream API endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumiaEndpoint {
    pub token: String,
    pub host: String,
    pub port: u16,
}

impl LumiaEndpoint {
    /// WebSocket URL including the auth token.
    pub fn url(&self) -> String {
        format!("ws://{}:{}/api?token={}", self.host, self.port, self.token)
    }

    /// URL safe to print.
    pub fn display_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Outbound frame accepted by the Lumia API.
#[derive(Debug, Clone, Serialize)]
pub struct LumiaCommand<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub params: CommandParams<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandParams<'a> {
    pub value: &'a str,
}

impl<'a> LumiaCommand<'a> {
    pub fn chat_command(value: &'a str) -> Self {
        Self {
            kind: "chat-command",
            params: CommandParams { value },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_url() {
        let endpoint = LumiaEndpoint {
            token: "abc123".to_string(),
            host: "localhost".to_string(),
            port: 39231,
        };
        assert_eq!(endpoint.url(), "ws://localhost:39231/api?token=abc123");
        assert_eq!(endpoint.display_address(), "localhost:39231");
    }

    #[test]
    fn test_chat_command_frame() {
        let frame = LumiaCommand::chat_command("lights red").to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            value,
            json!({"type": "chat-command", "params": {"value": "lights red"}})
        );
    }

    #[test]
    fn test_chat_command_escapes_quotes() {
        let frame = LumiaCommand::chat_command(r#"say "hi""#).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["params"]["value"], r#"say "hi""#);
    }
}
