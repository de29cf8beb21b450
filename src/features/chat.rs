use crate::config::Limits;
use crate::context::chat_context;
use crate::error::{CopilotError, Result};
use crate::llm::{flows, ChatModel};
use crate::models::{ChatMessage, Role};
use crate::workspace::Workspace;
use log::error;

/// Stored in place of an answer when the model call fails
pub const APOLOGY: &str = "Sorry, I encountered an error. Please check the logs for details.";

/// Asks a question about the loaded repository.
///
/// The question and the answer are appended to the chat history. When the model fails, an
/// apology is recorded as the answer and the error is returned.
pub async fn ask(
    workspace: &mut Workspace,
    model: &dyn ChatModel,
    limits: &Limits,
    question: &str,
) -> Result<ChatMessage> {
    let question = question.trim();
    if question.is_empty() {
        return Err(CopilotError::validation("Question cannot be empty"));
    }
    let reference = workspace.require_repo()?;

    let context = chat_context(question, &workspace.files(), &workspace.commits(), limits);
    let outcome = flows::chat_with_repo(model, &reference.url, question, &context).await;

    let mut messages = workspace.chat_messages();
    messages.push(ChatMessage::new(Role::User, question, 0));
    let reply = match &outcome {
        Ok(answer) => ChatMessage::new(Role::Assistant, answer.as_str(), 1),
        Err(e) => {
            error!("Chat request failed: {}", e);
            ChatMessage::new(Role::Assistant, APOLOGY, 1)
        }
    };
    messages.push(reply.clone());
    workspace.set_chat_messages(&messages)?;

    outcome.map(|_| reply)
}

/// Forgets the chat history
pub fn clear(workspace: &mut Workspace) -> Result<()> {
    workspace.set_chat_messages(&[])
}
