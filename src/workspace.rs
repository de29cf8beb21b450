use crate::config::Config;
use crate::error::{CopilotError, Result};
use crate::github::CommitRecord;
use crate::ingest::IngestedRepository;
use crate::models::{
    ChatMessage, CommitExplanation, LoadedRepoInfo, LocalProject, Note, RepoFile, Transcript,
};
use crate::store::{keys, LocalStore};
use log::{info, warn};
use std::collections::HashMap;

/// Typed view of the application state kept in the [`LocalStore`]
#[derive(Debug)]
pub struct Workspace {
    store: LocalStore,
    history_size: usize,
}

impl Workspace {
    /// Wraps an opened store
    pub fn new(store: LocalStore, history_size: usize) -> Self {
        Self {
            store,
            history_size,
        }
    }

    /// Opens the store configured in `config`
    pub fn open(config: &Config) -> Result<Self> {
        let store = LocalStore::open(&config.storage.data_dir, config.storage.quota_bytes)?;
        Ok(Self::new(store, config.limits.history_size))
    }

    /// Underlying store
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Underlying store, mutably
    pub fn store_mut(&mut self) -> &mut LocalStore {
        &mut self.store
    }

    pub fn loaded_repo(&self) -> Option<LoadedRepoInfo> {
        self.store.get(keys::LOADED_REPO)
    }

    /// The loaded repository, or [`CopilotError::NoRepoLoaded`]
    pub fn require_repo(&self) -> Result<LoadedRepoInfo> {
        self.loaded_repo().ok_or(CopilotError::NoRepoLoaded)
    }

    /// Previously loaded repositories, most recent first
    pub fn history(&self) -> Vec<LoadedRepoInfo> {
        self.store.get_or(keys::REPO_HISTORY, Vec::new())
    }

    pub fn files(&self) -> Vec<RepoFile> {
        self.store.get_or(keys::REPO_FILES, Vec::new())
    }

    /// Looks up a loaded file by its exact path
    pub fn file(&self, path: &str) -> Option<RepoFile> {
        self.files().into_iter().find(|f| f.path == path)
    }

    pub fn commits(&self) -> Vec<CommitRecord> {
        self.store.get_or(keys::COMMITS, Vec::new())
    }

    pub fn set_commits(&mut self, commits: &[CommitRecord]) -> Result<()> {
        self.store.set(keys::COMMITS, commits)
    }

    /// Last generated repository note; empty when none
    pub fn generated_note(&self) -> String {
        self.store.get_or(keys::GENERATED_NOTE, String::new())
    }

    pub fn set_generated_note(&mut self, note: &str) -> Result<()> {
        self.store.set(keys::GENERATED_NOTE, note)
    }

    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        self.store.get_or(keys::CHAT_MESSAGES, Vec::new())
    }

    pub fn set_chat_messages(&mut self, messages: &[ChatMessage]) -> Result<()> {
        self.store.set(keys::CHAT_MESSAGES, messages)
    }

    /// User notes, newest first
    pub fn notes(&self) -> Vec<Note> {
        self.store.get_or(keys::NOTES, Vec::new())
    }

    pub fn set_notes(&mut self, notes: &[Note]) -> Result<()> {
        self.store.set(keys::NOTES, notes)
    }

    /// Summarised transcripts, newest first
    pub fn transcripts(&self) -> Vec<Transcript> {
        self.store.get_or(keys::TRANSCRIPTS, Vec::new())
    }

    pub fn set_transcripts(&mut self, transcripts: &[Transcript]) -> Result<()> {
        self.store.set(keys::TRANSCRIPTS, transcripts)
    }

    /// Memoised commit explanations keyed by SHA
    pub fn commit_explanations(&self) -> HashMap<String, CommitExplanation> {
        self.store.get_or(keys::COMMIT_EXPLANATIONS, HashMap::new())
    }

    pub fn save_commit_explanation(&mut self, sha: &str, explanation: CommitExplanation) -> Result<()> {
        let mut all = self.commit_explanations();
        all.insert(sha.to_string(), explanation);
        self.store.set(keys::COMMIT_EXPLANATIONS, &all)
    }

    /// Project staged for publishing
    pub fn local_project(&self) -> Option<LocalProject> {
        self.store.get(keys::LOCAL_PROJECT)
    }

    pub fn set_local_project(&mut self, project: &LocalProject) -> Result<()> {
        self.store.set(keys::LOCAL_PROJECT, project)
    }

    pub fn clear_local_project(&mut self) -> Result<bool> {
        self.store.remove(keys::LOCAL_PROJECT)
    }

    /// Token saved through the settings
    pub fn stored_token(&self) -> Option<String> {
        self.store
            .get::<String>(keys::GITHUB_PAT)
            .filter(|t| !t.trim().is_empty())
    }

    pub fn set_token(&mut self, token: &str) -> Result<()> {
        self.store.set(keys::GITHUB_PAT, token.trim())
    }

    pub fn clear_token(&mut self) -> Result<bool> {
        self.store.remove(keys::GITHUB_PAT)
    }

    /// Token for GitHub calls: the stored one first, then the configured one
    pub fn effective_token(&self, config: &Config) -> Option<String> {
        self.stored_token().or_else(|| config.github.token.clone())
    }

    /// Persists the result of a successful ingestion.
    ///
    /// Files, reference, commits, the cleared chat and note, and the updated history are written
    /// as one batch. If the batch does not fit the quota, nothing from the new repository is kept:
    /// the file list is reset to empty, the rest stays as it was and
    /// [`CopilotError::StorageQuota`] is returned.
    pub fn record_load(&mut self, ingested: &IngestedRepository) -> Result<()> {
        let history = self.history_with(ingested.reference.clone());
        let batch = vec![
            (keys::REPO_FILES, serde_json::to_string(&ingested.files)?),
            (keys::LOADED_REPO, serde_json::to_string(&ingested.reference)?),
            (keys::COMMITS, serde_json::to_string(&ingested.commits)?),
            (keys::GENERATED_NOTE, serde_json::to_string("")?),
            (keys::CHAT_MESSAGES, serde_json::to_string(&Vec::<ChatMessage>::new())?),
            (keys::REPO_HISTORY, serde_json::to_string(&history)?),
        ];

        if let Err(e) = self.store.set_batch(batch) {
            if matches!(e, CopilotError::StorageQuota { .. }) {
                warn!("Repository {} is too large to store", ingested.reference.full_name());
                self.store.set(keys::REPO_FILES, &Vec::<RepoFile>::new())?;
            }
            return Err(e);
        }

        info!(
            "Recorded {} with {} files and {} commits",
            ingested.reference.full_name(),
            ingested.files.len(),
            ingested.commits.len()
        );
        Ok(())
    }

    /// History with `reference` moved to the front, dropping entries with the same URL
    fn history_with(&self, reference: LoadedRepoInfo) -> Vec<LoadedRepoInfo> {
        let mut history = self.history();
        history.retain(|r| r.url != reference.url);
        history.insert(0, reference);
        history.truncate(self.history_size);
        history
    }
}
