use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::constants::{env, server};
use crate::error::ConfigError;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    server::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    server::DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AuthConfig {
    /// Shared secret the webhook credential is compared against. When unset,
    /// any non-empty credential is accepted.
    pub webhook_secret: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load `config.yaml` (or `$SIGNAL_DESK_CONFIG`) and apply environment
    /// overrides. A missing file means built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(env::CONFIG_PATH)
            .unwrap_or_else(|_| server::DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))?.with_overrides(|var| std::env::var(var).ok())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from `lookup`, normally the process environment.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup(env::HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(env::PORT) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: env::PORT.to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(secret) = lookup(env::WEBHOOK_SECRET) {
            self.auth.webhook_secret = Some(secret);
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Configured secret, ignoring a blank value. The webhook compares tokens
    /// against it with plain `==`, which is not constant-time.
    pub fn webhook_secret(&self) -> Option<&str> {
        self.auth
            .webhook_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}
