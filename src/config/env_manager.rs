use serde::{Deserialize, Serialize};

/// Credentials picked up from the environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    /// GitHub Personal Access Token
    pub github_token: Option<String>,
    /// Key for the model used by the repository flows
    pub llm_api_key: Option<String>,
    /// Key for the assistant widget endpoint
    pub assistant_api_key: Option<String>,
}

impl ApiKeys {
    /// Reads every known key from the process environment.
    ///
    /// The flow key falls back through the provider-specific variables in order.
    pub fn from_env() -> Self {
        Self {
            github_token: get_env_value("GITHUB_TOKEN"),
            llm_api_key: first_env_value(&["LLM_API_KEY", "GEMINI_API_KEY", "OPENAI_API_KEY"]),
            assistant_api_key: get_env_value("OPENROUTER_API_KEY"),
        }
    }
}

/// Returns the variable's value, treating empty values as unset
pub fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn first_env_value(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| get_env_value(key))
}
