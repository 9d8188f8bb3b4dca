use schemars::JsonSchema;
use serde::Deserialize;

use super::default_true;

#[derive(Deserialize, JsonSchema)]
pub struct ConfigureRequest {
    /// Optional API key to test. Used for this call only, never stored.
    #[serde(alias = "apiKey")]
    pub api_key: Option<String>,
    /// Whether to test the connection (default true).
    #[serde(default = "default_true", alias = "testConnection")]
    pub test_connection: bool,
}

impl std::fmt::Debug for ConfigureRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigureRequest")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("test_connection", &self.test_connection)
            .finish()
    }
}
