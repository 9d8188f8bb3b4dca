use std::env;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::V0Error;

pub const DEFAULT_BASE_URL: &str = "https://api.v0.dev/v1";
pub const DEFAULT_MODEL: &str = "v0-1.5-md";

/// Every request default the client applies. Operations read these instead
/// of re-deriving them at each call site.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub stream: bool,
    pub max_attempts: u32,
    /// Linear backoff unit: attempt N waits N × this before the next try.
    pub backoff_step: Duration,
    /// Response-length cap for the connectivity probe.
    pub probe_max_tokens: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            stream: false,
            max_attempts: 3,
            backoff_step: Duration::from_millis(1000),
            probe_max_tokens: 1,
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// Chat-completion endpoint derived from the base URL.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

pub struct Config {
    pub api_key: String,
    pub client: ClientSettings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("client", &self.client)
            .finish()
    }
}

/// Optional TOML overrides, pointed at by `V0_MCP_CONFIG`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub client: ClientOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientOverrides {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_attempts: Option<u32>,
    pub backoff_ms: Option<u64>,
    pub probe_max_tokens: Option<u32>,
}

impl ClientOverrides {
    fn apply(self, settings: &mut ClientSettings) {
        if let Some(url) = self.base_url {
            settings.base_url = url;
        }
        if let Some(model) = self.model {
            settings.model = model;
        }
        if let Some(t) = self.temperature {
            if t.is_finite() && (0.0..=2.0).contains(&t) {
                settings.temperature = t;
            } else {
                tracing::warn!("ignoring configured temperature {t}: must be between 0.0 and 2.0");
            }
        }
        if let Some(n) = self.max_attempts {
            settings.max_attempts = n.max(1);
        }
        if let Some(ms) = self.backoff_ms {
            settings.backoff_step = Duration::from_millis(ms);
        }
        if let Some(n) = self.probe_max_tokens {
            settings.probe_max_tokens = n.max(1);
        }
    }
}

impl Config {
    /// Build from environment plus the optional TOML file.
    /// `.env` loading happens in `main` before this is called.
    pub fn load() -> Result<Self, V0Error> {
        let mut config = Self::from_env()?;

        if let Ok(path) = env::var("V0_MCP_CONFIG") {
            let overrides = load_file(Path::new(&path))?;
            overrides.client.apply(&mut config.client);
            tracing::info!("loaded client overrides from {path}");
        }

        Ok(config)
    }

    pub fn from_env() -> Result<Self, V0Error> {
        let api_key = env::var("V0_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                V0Error::Config(
                    "V0_API_KEY is not set. Add it to the environment or a .env file next to the binary."
                        .to_string(),
                )
            })?;

        let mut client = ClientSettings::default();
        if let Ok(url) = env::var("V0_BASE_URL")
            && !url.trim().is_empty()
        {
            client.base_url = url;
        }
        if let Ok(model) = env::var("V0_MODEL")
            && !model.trim().is_empty()
        {
            client.model = model;
        }

        Ok(Self { api_key, client })
    }
}

pub fn load_file(path: &Path) -> Result<FileConfig, V0Error> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        V0Error::Config(format!(
            "Cannot read config file {}: {e}. Fix the path in V0_MCP_CONFIG or unset it.",
            path.display()
        ))
    })?;
    parse_file(&raw)
}

pub fn parse_file(raw: &str) -> Result<FileConfig, V0Error> {
    toml::from_str(raw).map_err(|e| {
        V0Error::Config(format!(
            "Invalid config file: {e}. Only a [client] table with base_url, model, temperature, max_attempts, backoff_ms and probe_max_tokens is supported."
        ))
    })
}

impl FileConfig {
    pub fn into_settings(self) -> ClientSettings {
        let mut settings = ClientSettings::default();
        self.client.apply(&mut settings);
        settings
    }
}
