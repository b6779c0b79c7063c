//! Layered application configuration.
//!
//! Priority: CLI flag > CLI env var > `ASKUNO_` env vars > config file > defaults.

use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::widget::WidgetOptions;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the chat backend
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Seconds to wait for a backend reply (0 waits indefinitely)
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub widget: WidgetConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory served under `/static`.
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub chat_path: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub assistant_name: String,
    pub session_idle_secs: u64,
    /// Render ops buffered per session for slow event subscribers.
    pub event_buffer: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub json: bool,
}

impl BackendConfig {
    /// `None` when the timeout is disabled.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.static_dir", "static")?
            .set_default("backend.base_url", "http://127.0.0.1:5000")?
            .set_default("backend.chat_path", "/api/chat")?
            .set_default("backend.request_timeout_secs", 30)?
            .set_default("widget.assistant_name", "Askuno")?
            .set_default("widget.session_idle_secs", 30 * 60)?
            .set_default("widget.event_buffer", 64)?
            .set_default("logging.json", false)?;

        // 2. Config file: explicit path, else ./config.{yaml,toml,json} if present
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // 3. Environment variables, e.g. ASKUNO_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("ASKUNO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI overrides (clap already folded in their env fallbacks)
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(url) = cli.backend_url {
            builder = builder.set_override("backend.base_url", url)?;
        }
        if let Some(secs) = cli.request_timeout_secs {
            builder = builder.set_override("backend.request_timeout_secs", secs)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("logging.json", json)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Options for each session's widget.
    #[must_use]
    pub fn widget_options(&self) -> WidgetOptions {
        WidgetOptions {
            assistant_name: self.widget.assistant_name.clone(),
            request_timeout: self.backend.request_timeout(),
        }
    }

    #[must_use]
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.widget.session_idle_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(secs: u64) -> BackendConfig {
        BackendConfig {
            base_url: "http://127.0.0.1:5000".to_string(),
            chat_path: "/api/chat".to_string(),
            request_timeout_secs: secs,
        }
    }

    #[test]
    fn test_request_timeout() {
        assert_eq!(backend(0).request_timeout(), None);
        assert_eq!(backend(5).request_timeout(), Some(Duration::from_secs(5)));
    }
}
