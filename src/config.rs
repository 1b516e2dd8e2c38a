use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::render::RawHtmlPolicy;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "chat-widget.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to serve the widget on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the chat backend
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Where the session identifier is persisted
    #[arg(long)]
    pub session_file: Option<String>,

    /// Pass raw HTML in answers through unescaped
    #[arg(long)]
    pub trust_html: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub end_marker: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub session_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    pub raw_html: RawHtmlPolicy,
}

impl WidgetConfig {
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

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("backend.base_url", "http://127.0.0.1:5000")?
            .set_default("backend.end_marker", "[DONE]")?
            .set_default("storage.session_file", ".chat-widget/session.json")?
            .set_default("render.raw_html", "escape")?;

        // Explicit file must exist; the cwd fallback is optional.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
        }

        // E.g. CHAT_WIDGET__BACKEND__BASE_URL=http://localhost:8000
        builder = builder.add_source(
            Environment::with_prefix("CHAT_WIDGET")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        // Priority: CLI flag > CLI env var > prefixed env > config file > defaults.
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = cli.backend_url {
            builder = builder.set_override("backend.base_url", url)?;
        }
        if let Some(path) = cli.session_file {
            builder = builder.set_override("storage.session_file", path)?;
        }
        if cli.trust_html {
            builder = builder.set_override("render.raw_html", "trust")?;
        }

        builder.build()?.try_deserialize()
    }

    /// Socket address string the widget host binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
