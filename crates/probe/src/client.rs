//! JSON API client for the switch management endpoint.
//!
//! Commands are posted to the `json-login` launch script together with the
//! credentials; the switch answers with a JSON document whose `data` member
//! holds the command output. Uses [`reqwest`].

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::ConnectionConfig;

/// Path and query of the JSON API entry point.
pub const JSON_API_PATH: &str =
    "/admin/launch?script=rh&template=json-request&action=json-login";

/// Errors from the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The switch returned a non-2xx status code.
    #[error("switch API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    #[error("switch returned an empty response")]
    EmptyResponse,

    #[error("switch returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Anything that can run a CLI command on the switch and return its JSON
/// response.
#[async_trait]
pub trait SwitchApi: Send + Sync {
    async fn execute(&self, command: &str) -> Result<Value, TransportError>;
}

/// Request body. A single command goes in `cmd`, a batch in `commands`.
#[derive(Debug, Serialize)]
struct CommandRequest<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(flatten)]
    payload: CommandPayload<'a>,
}

#[derive(Debug, Serialize)]
enum CommandPayload<'a> {
    #[serde(rename = "cmd")]
    Single(&'a str),
    #[serde(rename = "commands")]
    Batch(&'a [&'a str]),
}

/// HTTP client for one switch.
pub struct SwitchClient {
    client: reqwest::Client,
    url: String,
    user: String,
    password: String,
}

impl SwitchClient {
    /// Build a client for `https://<host>` from the connection settings.
    pub fn new(config: &ConnectionConfig) -> Result<Self, TransportError> {
        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(!config.verify_tls);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_client(
            builder.build()?,
            format!("https://{}", config.host),
            config.user.clone(),
            config.password.clone(),
        ))
    }

    /// Create a client reusing an existing [`reqwest::Client`] against an
    /// arbitrary base URL, e.g. `http://127.0.0.1:8080`.
    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        user: String,
        password: String,
    ) -> Self {
        Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), JSON_API_PATH),
            user,
            password,
        }
    }

    /// Run several commands in one request.
    pub async fn execute_commands(&self, commands: &[&str]) -> Result<Value, TransportError> {
        self.post(CommandPayload::Batch(commands)).await
    }

    // ---- private helpers ----

    async fn post(&self, payload: CommandPayload<'_>) -> Result<Value, TransportError> {
        let body = CommandRequest {
            username: &self.user,
            password: &self.password,
            payload,
        };

        tracing::debug!(url = %self.url, user = %self.user, payload = ?body.payload, "Sending switch request");

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::ApiError {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Err(TransportError::EmptyResponse);
        }

        tracing::debug!(status = status.as_u16(), bytes = text.len(), "Switch responded");
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl SwitchApi for SwitchClient {
    async fn execute(&self, command: &str) -> Result<Value, TransportError> {
        self.post(CommandPayload::Single(command)).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn single_command_body() {
        let body = CommandRequest {
            username: "admin",
            password: "pw",
            payload: CommandPayload::Single("show version"),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "username": "admin", "password": "pw", "cmd": "show version" })
        );
    }

    #[test]
    fn batch_command_body() {
        let commands = ["show version", "show module"];
        let body = CommandRequest {
            username: "admin",
            password: "pw",
            payload: CommandPayload::Batch(&commands),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "username": "admin",
                "password": "pw",
                "commands": ["show version", "show module"]
            })
        );
    }

    #[test]
    fn url_is_built_from_base() {
        let client = SwitchClient::with_client(
            reqwest::Client::new(),
            "http://127.0.0.1:9/".into(),
            "admin".into(),
            String::new(),
        );
        assert_eq!(
            client.url,
            "http://127.0.0.1:9/admin/launch?script=rh&template=json-request&action=json-login"
        );
    }
}
