//! Test doubles shared by unit tests.

use crate::error::{CopilotError, Result};
use crate::llm::{ChatModel, OutputFormat, PromptMessage};
use async_trait::async_trait;
use std::sync::Mutex;

/// Replies with a canned answer (or failure) and records every request
pub struct ScriptedModel {
    reply: std::result::Result<String, String>,
    pub requests: Mutex<Vec<(Vec<PromptMessage>, OutputFormat)>>,
}

impl ScriptedModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Content of the final message of the latest request
    pub fn last_prompt(&self) -> String {
        let requests = self.requests.lock().unwrap();
        requests.last().unwrap().0.last().unwrap().content.clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: &[PromptMessage], format: OutputFormat) -> Result<String> {
        self.requests.lock().unwrap().push((messages.to_vec(), format));
        self.reply.clone().map_err(CopilotError::Llm)
    }
}
