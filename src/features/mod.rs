//! Operations behind each command, composed from the workspace, GitHub and the model.

pub mod chat;
pub mod collaborators;
pub mod commits;
pub mod editor;
pub mod notes;
pub mod publish;
pub mod repository;
pub mod settings;
pub mod transcripts;
pub mod visualize;
