#![doc = include_str!("../README.md")]
#![warn(clippy::all)]

//! GitOrbit - a terminal co-pilot for GitHub repositories
//!
//! The library loads a public repository through the GitHub REST API, keeps it in a small
//! JSON key-value store and builds prompts from it for a language model.
//!
//! ## Features
//! - Repository ingestion with a binary-file filter and a file cap
//! - Chat over the loaded files and commits
//! - Commit explanations, repository notes and meeting transcript summaries
//! - Cached repository health reports
//! - Collaborator management and publishing of staged projects
//!
//! ## Usage
//! ```rust,ignore
//! use gitorbit::{features, Config, GitHubClient, Workspace};
//!
//! async fn example() -> gitorbit::Result<()> {
//!     let config = Config::load()?;
//!     let mut workspace = Workspace::open(&config)?;
//!     let github = GitHubClient::new(&config.github, workspace.effective_token(&config))?;
//!     features::repository::load(&mut workspace, &github, &config.limits, "https://github.com/octocat/Hello-World").await?;
//!     Ok(())
//! }
//! ```

/// Configuration module for the application
pub mod config;
/// Timestamped values with a time-to-live
pub mod cache;
/// Error handling types and utilities
pub mod error;
/// Logging configuration and utilities
pub mod logging;
/// Binary-file filter applied during ingestion
pub mod filter;
/// GitHub REST client
pub mod github;
/// JSON key-value persistence
pub mod store;
/// Records kept in the store
pub mod models;
/// Typed access to application state
pub mod workspace;
/// Repository ingestion
pub mod ingest;
/// Prompt context assembly
pub mod context;
/// Language model client, prompts and flows
pub mod llm;
/// Repository health snapshots
pub mod health;
/// Operations behind each command
pub mod features;

#[cfg(test)]
mod testing;

// Re-export common types
pub use config::Config;
pub use error::{CopilotError, Result};
pub use github::GitHubClient;
pub use llm::{ChatModel, LlmClient};
pub use workspace::Workspace;
