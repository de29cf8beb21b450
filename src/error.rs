use std::io;
use thiserror::Error;

/// Custom result type alias for the application
pub type Result<T> = std::result::Result<T, CopilotError>;

/// Errors that can occur while loading, storing or analysing a repository
#[derive(Debug, Error)]
pub enum CopilotError {
    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Base64 payloads that could not be decoded
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Config file parse errors
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The input is not a `github.com/<owner>/<repo>` URL
    #[error("Invalid GitHub repository URL format: {0}. Please use a URL like https://github.com/owner/repo.")]
    InvalidRepoUrl(String),

    /// Repository metadata returned 404
    #[error("Repository not found: {0}. Please check the URL. It might be private or contain a typo.")]
    RepoNotFound(String),

    /// GitHub returned 403
    #[error("GitHub refused the request ({0}). You may have hit the API rate limit; add a Personal Access Token to raise it.")]
    RateLimited(String),

    /// Any other non-success status from GitHub
    #[error("GitHub API error (HTTP {status}): {message}")]
    GitHubApi {
        /// HTTP status code
        status: u16,
        /// Message returned by GitHub or a description of the failed call
        message: String,
    },

    /// GitHub is still computing repository statistics (HTTP 202)
    #[error("GitHub is generating statistics for this repository. Try again in a moment.")]
    StatsPending,

    /// Language model provider failures and malformed responses
    #[error("LLM error: {0}")]
    Llm(String),

    /// Non-success status from a language model provider
    #[error("LLM request failed with status {status}: {body}")]
    LlmStatus {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// A store write would exceed the storage quota and was rolled back
    #[error("Storage limit exceeded: writing `{key}` needs {needed} bytes but the quota is {quota} bytes")]
    StorageQuota {
        /// Key whose write was rejected
        key: String,
        /// Total size the store would have had after the write
        needed: usize,
        /// Configured quota
        quota: usize,
    },

    /// Input-size estimate exceeded before calling the model
    #[error("Input exceeds token limit: {estimated} tokens (limit {limit}). Reduce the input or use a shorter time range.")]
    TokenBudget {
        /// Estimated tokens
        estimated: usize,
        /// Allowed ceiling
        limit: usize,
    },

    /// An operation needs a loaded repository
    #[error("No repository loaded. Run `gitorbit load <url>` first.")]
    NoRepoLoaded,

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl CopilotError {
    /// Creates a validation error with the specified message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the user can fix this by supplying a GitHub token
    pub fn is_user_actionable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::RepoNotFound(_))
    }

    /// Checks if this error came from a transient condition.
    ///
    /// Nothing in the crate retries on its own; callers use this to word the message.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::StatsPending | Self::RateLimited(_) | Self::IO(_)
        ) || matches!(self, Self::LlmStatus { status, .. } if *status >= 500 || *status == 429)
    }
}
