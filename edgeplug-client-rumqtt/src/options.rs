use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("missing required configuration property '{0}'")]
    Missing(&'static str),
    #[error("invalid server url '{0}'")]
    InvalidServerUrl(String),
}

/// Connection options for the rumqtt transport.
///
/// `server_url` accepts `tcp://host:port`, `mqtt://host:port` or a bare
/// `host[:port]`; the port defaults to 1883.
pub struct MqttOptions {
    pub server_url: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub keep_alive: Duration,
}

impl MqttOptions {
    pub fn new<S1, S2, S3, S4>(client_id: S1, server_url: S2, username: S3, password: S4) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
        S4: Into<String>,
    {
        Self {
            server_url: server_url.into(),
            client_id: client_id.into(),
            username: username.into(),
            password: password.into(),
            keep_alive: Duration::from_secs(5),
        }
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), OptionsError> {
        if self.client_id.is_empty() {
            return Err(OptionsError::Missing("clientId"));
        }
        if self.username.is_empty() {
            return Err(OptionsError::Missing("username"));
        }
        if self.server_url.is_empty() {
            return Err(OptionsError::Missing("serverUrl"));
        }
        Ok(())
    }

    pub(crate) fn broker_address(&self) -> Result<(String, u16), OptionsError> {
        let trimmed = self
            .server_url
            .strip_prefix("tcp://")
            .or_else(|| self.server_url.strip_prefix("mqtt://"))
            .unwrap_or(&self.server_url);
        let (host, port) = match trimmed.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| OptionsError::InvalidServerUrl(self.server_url.clone()))?;
                (host, port)
            }
            None => (trimmed, 1883),
        };
        if host.is_empty() {
            return Err(OptionsError::InvalidServerUrl(self.server_url.clone()));
        }
        Ok((host.to_string(), port))
    }
}
