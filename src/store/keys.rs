//! Names of every key the application writes.

/// Prefix shared by every key; export, import and erase only touch keys carrying it
pub const NAMESPACE: &str = "gitorbit_";

/// Reference of the repository currently loaded
pub const LOADED_REPO: &str = "gitorbit_loaded_repo";
/// Most-recent-first list of loaded repositories
pub const REPO_HISTORY: &str = "gitorbit_repo_history";
/// Personal access token entered through the settings
pub const GITHUB_PAT: &str = "gitorbit_github_pat";
/// Raw commit records of the loaded repository
pub const COMMITS: &str = "gitorbit_commits";
/// Text files of the loaded repository
pub const REPO_FILES: &str = "gitorbit_repo_files";
/// Last generated repository note
pub const GENERATED_NOTE: &str = "gitorbit_generated_note";
/// Chat history with the loaded repository
pub const CHAT_MESSAGES: &str = "gitorbit_chat_messages";
/// User notes
pub const NOTES: &str = "gitorbit_notes";
/// Summarised meeting transcripts
pub const TRANSCRIPTS: &str = "gitorbit_transcripts";
/// Project staged for publishing
pub const LOCAL_PROJECT: &str = "gitorbit_local_project";
/// Commit explanations keyed by SHA
pub const COMMIT_EXPLANATIONS: &str = "gitorbit_commit_explanations";

/// Cache key of a health snapshot for `repo_url` over `range_days`
pub fn health(repo_url: &str, range_days: u32) -> String {
    format!("{}health_{}_{}", NAMESPACE, repo_url, range_days)
}

/// Whether `key` belongs to the application
pub fn is_namespaced(key: &str) -> bool {
    key.starts_with(NAMESPACE)
}
