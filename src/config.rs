//! Roadtrip configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion endpoint
    pub llm: LlmConfig,

    /// Conversation loop
    pub chat: ChatConfig,

    /// Tool interpretation
    pub tools: ToolsConfig,

    /// Route segment fetching
    pub route: RouteConfig,

    /// Nearby places search
    pub places: PlacesConfig,

    /// Persisted trip
    pub storage: StorageConfig,

    /// System prompt
    pub prompt: PromptConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(|name| std::env::var(name).ok())
    }

    /// Validate, reading environment variables through `env`
    pub fn validate_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if self.llm.api_key_from(env).is_none() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if self.chat.max_rounds == 0 {
            return Err(eyre::eyre!("chat.max-rounds must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .roadtrip.yml
        let local_config = PathBuf::from(".roadtrip.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/roadtrip/roadtrip.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("roadtrip").join("roadtrip.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (only "anthropic" is supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Bound on opening the stream, in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Option<String> {
        self.api_key_from(|name| std::env::var(name).ok())
    }

    pub fn api_key_from(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        env(&self.api_key_env).filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Conversation loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum request/response rounds per user message
    #[serde(rename = "max-rounds")]
    pub max_rounds: u32,

    /// Minimum spacing between visible text commits
    #[serde(rename = "commit-interval-ms")]
    pub commit_interval_ms: u64,

    /// Requests allowed per window
    #[serde(rename = "rate-limit")]
    pub rate_limit: u32,

    #[serde(rename = "rate-window-ms")]
    pub rate_window_ms: u64,

    /// Reply language ("English" needs no extra instruction)
    pub language: String,

    /// Currency all costs are quoted in
    pub currency: String,

    /// Free-text location offered as the first starting point suggestion
    #[serde(rename = "user-location")]
    pub user_location: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            commit_interval_ms: 16,
            rate_limit: 30,
            rate_window_ms: 60_000,
            language: "English".to_string(),
            currency: "EUR".to_string(),
            user_location: None,
        }
    }
}

impl ChatConfig {
    pub fn commit_interval(&self) -> Duration {
        Duration::from_millis(self.commit_interval_ms)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_window_ms)
    }
}

/// Tool interpretation options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Reject a whole recommendation call when any stop name is unknown
    #[serde(rename = "strict-recommendations")]
    pub strict_recommendations: bool,
}

/// Route segment fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub enabled: bool,

    /// Directions API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the routing token
    #[serde(rename = "token-env")]
    pub token_env: String,

    /// Quiet period after a stop-list change before fetching
    #[serde(rename = "debounce-ms")]
    pub debounce_ms: u64,

    /// Spacing between consecutive directions requests
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.mapbox.com".to_string(),
            token_env: "MAPBOX_TOKEN".to_string(),
            debounce_ms: 300,
            request_delay_ms: 100,
            timeout_ms: 15_000,
        }
    }
}

impl RouteConfig {
    pub fn get_token(&self) -> Option<String> {
        std::env::var(&self.token_env).ok().filter(|t| !t.trim().is_empty())
    }
}

/// Nearby places search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Places rated below this are dropped
    #[serde(rename = "min-rating")]
    pub min_rating: f64,

    #[serde(rename = "radius-m")]
    pub radius_m: u32,

    /// Keyword used when no query is given
    #[serde(rename = "default-query")]
    pub default_query: String,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            api_key_env: "GOOGLE_PLACES_API_KEY".to_string(),
            min_rating: 4.5,
            radius_m: 5000,
            default_query: "burger restaurant".to_string(),
        }
    }
}

impl PlacesConfig {
    pub fn get_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.trim().is_empty())
    }
}

/// Persisted trip configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the trip state file
    #[serde(rename = "state-file")]
    pub state_file: PathBuf,

    /// Write delay after the last change
    #[serde(rename = "autosave-ms")]
    pub autosave_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // XDG data directory (~/.local/share/roadtrip on Linux)
        let state_file = dirs::data_dir()
            .map(|d| d.join("roadtrip"))
            .unwrap_or_else(|| PathBuf::from(".roadtrip"))
            .join("trip.json");

        Self {
            state_file,
            autosave_ms: 500,
        }
    }
}

impl StorageConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_ms)
    }
}

/// System prompt configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Handlebars template replacing the embedded one
    #[serde(rename = "template-file")]
    pub template_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.chat.max_rounds, 10);
        assert_eq!(config.chat.commit_interval_ms, 16);
        assert_eq!(config.route.debounce_ms, 300);
        assert_eq!(config.places.min_rating, 4.5);
        assert_eq!(config.storage.autosave_ms, 500);
        assert!(!config.tools.strict_recommendations);
        assert!(config.storage.state_file.ends_with("trip.json"));
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  model: claude-opus-4
  api-key-env: MY_API_KEY
  max-tokens: 8192

chat:
  max-rounds: 4
  currency: SEK
  user-location: Stockholm, Sweden

tools:
  strict-recommendations: true

route:
  enabled: false
  request-delay-ms: 250
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "claude-opus-4");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 8192);
        assert_eq!(config.chat.max_rounds, 4);
        assert_eq!(config.chat.currency, "SEK");
        assert_eq!(config.chat.user_location.as_deref(), Some("Stockholm, Sweden"));
        assert!(config.tools.strict_recommendations);
        assert!(!config.route.enabled);
        assert_eq!(config.route.request_delay_ms, 250);
        // Untouched sections keep their defaults
        assert_eq!(config.places.radius_m, 5000);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("roadtrip.yml");
        fs::write(&path, "chat:\n  language: Swedish\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.chat.language, "Swedish");
    }

    #[test]
    fn test_load_missing_explicit_path_errors() {
        let path = PathBuf::from("/nonexistent/roadtrip.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_validate_requires_api_key() {
        let mut config = Config::default();
        config.llm.api_key_env = "ROADTRIP_KEY".to_string();
        fn env(key: Option<&'static str>) -> impl Fn(&str) -> Option<String> {
            move |name| if name == "ROADTRIP_KEY" { key.map(String::from) } else { None }
        }

        assert!(config.validate_with(env(None)).is_err());
        assert!(config.validate_with(env(Some("  "))).is_err());
        assert!(config.validate_with(env(Some("sk-test"))).is_ok());
        assert_eq!(config.llm.api_key_from(env(Some("sk-test"))).as_deref(), Some("sk-test"));

        config.chat.max_rounds = 0;
        assert!(config.validate_with(env(Some("sk-test"))).is_err());
    }
}
