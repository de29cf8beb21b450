mod env_manager;

use crate::error::{CopilotError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use env_manager::{get_env_value, ApiKeys};

const GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_LLM_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_LLM_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_ASSISTANT_BASE: &str = "https://openrouter.ai/api/v1";
const DEFAULT_ASSISTANT_MODEL: &str = "deepseek/deepseek-r1-0528:free";

/// Main configuration struct for the application
///
/// Loaded from `<config dir>/gitorbit/config.toml` when present, then overridden by
/// environment variables. Every section has a usable default, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub API access
    pub github: GitHubConfig,
    /// Where and how much application state is kept
    pub storage: StorageConfig,
    /// Caps applied during ingestion and prompt assembly
    pub limits: Limits,
    /// Model used by the repository flows
    pub llm: LlmConfig,
    /// Model used by the assistant widget
    pub assistant: LlmConfig,
}

/// GitHub API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base URL of the REST API
    pub api_base: String,
    /// Token from config or `GITHUB_TOKEN`; a PAT saved with `gitorbit token set` wins
    pub token: Option<String>,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Local persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `storage.json`
    pub data_dir: PathBuf,
    /// Maximum total size of keys and values, in bytes
    pub quota_bytes: usize,
}

/// Caps applied during ingestion and prompt assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Files fetched per repository load
    pub max_files: usize,
    /// Commits fetched per repository load or refresh
    pub commit_count: usize,
    /// Entries kept in the repository history
    pub history_size: usize,
    /// Files included in a chat context
    pub chat_max_files: usize,
    /// Commit subjects included in a chat context
    pub chat_commit_lines: usize,
    /// Leading characters of each file scanned for question words
    pub chat_scan_chars: usize,
    /// Characters of a commit diff sent for explanation
    pub commit_diff_chars: usize,
    /// Seconds a health snapshot stays fresh
    pub health_ttl_secs: u64,
    /// Largest token estimate accepted by the health flow
    pub token_ceiling: usize,
    /// Trailing messages sent to the assistant
    pub assistant_history: usize,
}

/// An OpenAI-compatible chat completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended
    pub api_base: String,
    /// Bearer key
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Sampling temperature, when the provider should not use its default
    pub temperature: Option<f32>,
}

impl Config {
    /// Creates a configuration that keeps its state under `data_dir`
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            storage: StorageConfig {
                data_dir,
                ..StorageConfig::default()
            },
            ..Self::default()
        }
    }

    /// Loads the configuration file (if any) and applies environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(&ApiKeys::from_env());
        Ok(config)
    }

    /// Parses a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CopilotError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gitorbit").join("config.toml"))
    }

    /// Applies environment overrides on top of file values
    pub fn apply_env(&mut self, keys: &ApiKeys) {
        if let Some(token) = &keys.github_token {
            self.github.token = Some(token.clone());
        }
        if let Some(key) = &keys.llm_api_key {
            self.llm.api_key = Some(key.clone());
        }
        if let Some(key) = &keys.assistant_api_key {
            self.assistant.api_key = Some(key.clone());
        }
        if let Some(base) = get_env_value("GITHUB_API_BASE_URL") {
            self.github.api_base = base;
        }
        if let Some(home) = get_env_value("GITORBIT_HOME") {
            self.storage.data_dir = PathBuf::from(home);
        }
        if let Some(base) = get_env_value("LLM_API_BASE") {
            self.llm.api_base = base;
        }
        if let Some(model) = get_env_value("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(base) = get_env_value("ASSISTANT_API_BASE") {
            self.assistant.api_base = base;
        }
        if let Some(model) = get_env_value("ASSISTANT_MODEL") {
            self.assistant.model = model;
        }
    }

    /// Rejects empty tokens and zero-valued limits
    pub fn validate(&self) -> Result<()> {
        if let Some(token) = &self.github.token {
            if token.trim().is_empty() {
                return Err(CopilotError::Config("GitHub token is empty".into()));
            }
        }
        if self.storage.quota_bytes == 0 {
            return Err(CopilotError::Config("storage.quota_bytes must be positive".into()));
        }
        let limits = &self.limits;
        let zero = [
            ("max_files", limits.max_files),
            ("commit_count", limits.commit_count),
            ("history_size", limits.history_size),
            ("chat_max_files", limits.chat_max_files),
            ("commit_diff_chars", limits.commit_diff_chars),
            ("token_ceiling", limits.token_ceiling),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);
        if let Some((name, _)) = zero {
            return Err(CopilotError::Config(format!("limits.{} must be positive", name)));
        }
        Ok(())
    }

    /// Ensures the data directory exists
    pub fn ensure_directories_exist(&self) -> Result<()> {
        fs::create_dir_all(&self.storage.data_dir)?;
        Ok(())
    }
}

impl Limits {
    /// How long a health snapshot is served from cache
    pub fn health_ttl(&self) -> Duration {
        Duration::from_secs(self.health_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            storage: StorageConfig::default(),
            limits: Limits::default(),
            llm: LlmConfig::default(),
            assistant: LlmConfig::assistant_default(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            token: None,
            user_agent: format!("gitorbit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_local_dir()
                .map(|dir| dir.join("gitorbit"))
                .unwrap_or_else(|| PathBuf::from(".gitorbit")),
            quota_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_files: 100,
            commit_count: 30,
            history_size: 5,
            chat_max_files: 10,
            chat_commit_lines: 10,
            chat_scan_chars: 2000,
            commit_diff_chars: 20_000,
            health_ttl_secs: 3600,
            token_ceiling: 1_048_575,
            assistant_history: 6,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_LLM_BASE.to_string(),
            api_key: None,
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: None,
        }
    }
}

impl LlmConfig {
    /// Defaults for the assistant widget endpoint
    pub fn assistant_default() -> Self {
        Self {
            api_base: DEFAULT_ASSISTANT_BASE.to_string(),
            model: DEFAULT_ASSISTANT_MODEL.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_ingestion_caps() {
        let config = Config::default();
        assert_eq!(config.limits.max_files, 100);
        assert_eq!(config.limits.commit_count, 30);
        assert_eq!(config.limits.history_size, 5);
        assert_eq!(config.limits.health_ttl(), Duration::from_secs(3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[limits]\nmax_files = 20\n\n[llm]\nmodel = \"local-model\"\n",
        )?;

        let config = Config::from_file(&path)?;
        assert_eq!(config.limits.max_files, 20);
        assert_eq!(config.limits.commit_count, 30);
        assert_eq!(config.llm.model, "local-model");
        assert_eq!(config.github.api_base, GITHUB_API_BASE);
        Ok(())
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let mut config = Config::default();
        config.github.token = Some("  ".into());
        assert!(matches!(config.validate(), Err(CopilotError::Config(_))));
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let mut config = Config::default();
        config.limits.max_files = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_files"));
    }

    #[test]
    fn test_env_keys_override_file_values() {
        let mut config = Config::default();
        config.apply_env(&ApiKeys {
            github_token: Some("ghp_env".into()),
            llm_api_key: Some("llm-key".into()),
            assistant_api_key: None,
        });
        assert_eq!(config.github.token.as_deref(), Some("ghp_env"));
        assert_eq!(config.llm.api_key.as_deref(), Some("llm-key"));
        assert_eq!(config.assistant.api_key, None);
    }
}
