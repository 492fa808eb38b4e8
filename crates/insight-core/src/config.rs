use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix of environment overrides, e.g. `INSIGHT__DATABASE__URL`.
pub const ENV_PREFIX: &str = "INSIGHT";

/// Conventional variable holding the Gemini key. Used as the default for
/// `llm.api_key`; an explicit `INSIGHT__LLM__API_KEY` still wins.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub nlp: NlpConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_env(ENV_PREFIX)
    }

    /// Load configuration from environment with custom prefix
    pub fn load_from_env(prefix: &str) -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(environment(prefix))
            .build()?;
        config.try_deserialize()
    }

    /// Load configuration from file with environment overrides
    ///
    /// The format follows the file extension (`.toml`, `.yaml`, `.json`).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(File::from(path.as_ref()))
            .add_source(environment(ENV_PREFIX))
            .build()?;
        config.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let gemini_key = std::env::var(GEMINI_API_KEY_VAR).unwrap_or_default();

        Config::builder()
            .set_default("database.url", "postgres://localhost/insightflow")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout_seconds", 10)?
            .set_default("llm.provider", "gemini")?
            .set_default("llm.model", "gemini-1.5-flash")?
            .set_default("llm.api_key", gemini_key)?
            .set_default("llm.max_tokens", 1024)?
            .set_default("llm.temperature", 0.7)?
            .set_default("llm.timeout_seconds", 60)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5001)
    }
}

fn environment(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .separator("__")
        .try_parsing(true)
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

impl DatabaseConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }

    pub fn with_pool_size(mut self, min: u32, max: u32) -> Self {
        self.min_connections = min;
        self.max_connections = max;
        self
    }

    pub fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout_seconds = seconds;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl LlmConfig {
    pub fn new(provider: String, model: String, api_key: String) -> Self {
        Self {
            provider,
            model,
            api_key,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_seconds: default_llm_timeout_seconds(),
            base_url: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// A narrative engine can only be built with a key.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_timeout_seconds() -> u64 {
    60
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }

    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

/// Classifier configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NlpConfig {
    /// YAML file replacing the built-in countries, cities and glossary.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_database_config_creation() {
        let config = DatabaseConfig::new("postgres://localhost".to_string())
            .with_pool_size(2, 20)
            .with_connect_timeout(3);

        assert_eq!(config.url, "postgres://localhost");
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.connect_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_llm_config_creation() {
        let config = LlmConfig::new(
            "gemini".to_string(),
            "gemini-1.5-flash".to_string(),
            "key-123".to_string(),
        )
        .with_max_tokens(2048)
        .with_temperature(0.5)
        .with_base_url("http://localhost:9000".to_string());

        assert_eq!(config.provider, "gemini");
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000"));
        assert!(config.has_api_key());
    }

    #[test]
    fn test_llm_config_blank_key() {
        let config = LlmConfig::new("gemini".to_string(), "m".to_string(), "  ".to_string());
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5001);
        assert_eq!(config.address(), "0.0.0.0:5001");
    }

    #[test]
    fn test_load_defaults() {
        // A prefix nothing in the test environment sets.
        let config = AppConfig::load_from_env("INSIGHT_CONFIG_TEST_UNSET").unwrap();

        assert_eq!(config.database.url, "postgres://localhost/insightflow");
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.server.port, 5001);
        assert!(config.nlp.catalog_path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[database]
url = "postgres://db.internal/analytics"
max_connections = 12

[llm]
provider = "gemini"
model = "gemini-1.5-pro"

[server]
port = 8088

[nlp]
catalog_path = "/etc/insightflow/catalog.yaml"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.database.url, "postgres://db.internal/analytics");
        assert_eq!(config.database.max_connections, 12);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.nlp.catalog_path,
            Some(PathBuf::from("/etc/insightflow/catalog.yaml"))
        );
    }
}
