//! One function per model-backed feature. Each makes exactly one request.

use super::prompts::{self, render};
use super::{ChatModel, OutputFormat, PromptMessage};
use crate::context::{ensure_within_budget, estimate_tokens, HealthMetrics};
use crate::error::{CopilotError, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

static FENCED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[\w+.-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").expect("fence pattern compiles")
});

/// Result of a code edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedCode {
    pub edited_code: String,
}

/// Structured summary of a meeting transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSummary {
    pub summary: String,
    pub action_items: String,
}

/// One file of a generated project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// A generated project, as a flat list of files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedProject {
    pub files: Vec<GeneratedFile>,
}

async fn ask_text(model: &dyn ChatModel, prompt: String) -> Result<String> {
    model
        .complete(&[PromptMessage::user(prompt)], OutputFormat::Text)
        .await
}

async fn ask_json<T: DeserializeOwned>(model: &dyn ChatModel, prompt: String) -> Result<T> {
    let reply = model
        .complete(&[PromptMessage::user(prompt)], OutputFormat::Json)
        .await?;
    parse_structured(&reply)
}

/// Parses a JSON reply, tolerating a surrounding code fence
pub fn parse_structured<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let body = strip_code_fence(reply);
    serde_json::from_str(&body).map_err(|e| {
        debug!("Unparseable structured reply: {}", reply);
        CopilotError::Llm(format!("The model response did not match the expected shape: {}", e))
    })
}

/// Removes one markdown code fence wrapping the whole of `text`
pub fn strip_code_fence(text: &str) -> String {
    match FENCED.captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().to_string(),
        None => text.trim().to_string(),
    }
}

/// Truncates to at most `max_chars` characters
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Answers a question about the loaded repository from the assembled context
pub async fn chat_with_repo(
    model: &dyn ChatModel,
    repo_url: &str,
    question: &str,
    context: &str,
) -> Result<String> {
    debug!("Chat about {} with {} chars of context", repo_url, context.len());
    let prompt = render(
        prompts::CHAT_WITH_REPO,
        &[("context", context), ("question", question)],
    );
    ask_text(model, prompt).await
}

/// Explains a unified diff; only the first `max_chars` characters are sent
pub async fn explain_commit(model: &dyn ChatModel, diff: &str, max_chars: usize) -> Result<String> {
    let limited = truncate_chars(diff, max_chars);
    if limited.len() < diff.len() {
        debug!("Diff truncated from {} to {} bytes", diff.len(), limited.len());
    }
    ask_text(model, render(prompts::EXPLAIN_COMMIT, &[("diff", limited)])).await
}

/// Writes a markdown onboarding note for the repository
pub async fn generate_repo_note(model: &dyn ChatModel, repo_url: &str, context: &str) -> Result<String> {
    let prompt = render(
        prompts::REPO_NOTE,
        &[("repo_url", repo_url), ("context", context)],
    );
    ask_text(model, prompt).await
}

/// Writes a markdown health report.
///
/// The token estimate is checked against `token_ceiling` before anything is sent.
pub async fn analyze_repo_health(
    model: &dyn ChatModel,
    repo_url: &str,
    metrics: &HealthMetrics,
    token_ceiling: usize,
) -> Result<String> {
    let metrics_json = serde_json::to_string(metrics)?;
    ensure_within_budget(estimate_tokens(&[repo_url, metrics_json.as_str()]), token_ceiling)?;

    let prompt = render(
        prompts::REPO_HEALTH,
        &[("repo_url", repo_url), ("metrics", metrics_json.as_str())],
    );
    ask_text(model, prompt).await
}

/// Rewrites `code` following `instruction`
pub async fn edit_code(model: &dyn ChatModel, code: &str, instruction: &str) -> Result<EditedCode> {
    let mut prompt = render(prompts::EDIT_CODE, &[("prompt", instruction), ("code", code)]);
    prompt.push_str(prompts::JSON_REPLY_EDIT_CODE);

    let mut edited: EditedCode = ask_json(model, prompt).await?;
    edited.edited_code = strip_code_fence(&edited.edited_code);
    Ok(edited)
}

/// Explains `code`, optionally focusing on `question`
pub async fn explain_code(model: &dyn ChatModel, code: &str, question: Option<&str>) -> Result<String> {
    let question_block = match question.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => render(prompts::EXPLAIN_CODE_QUESTION, &[("question", q)]),
        None => String::new(),
    };
    let prompt = render(
        prompts::EXPLAIN_CODE,
        &[("question_block", question_block.as_str()), ("code", code)],
    );
    ask_text(model, prompt).await
}

/// Summarises a meeting transcript into discussion points and action items
pub async fn summarize_transcript(model: &dyn ChatModel, transcript: &str) -> Result<TranscriptSummary> {
    let mut prompt = render(prompts::SUMMARIZE_TRANSCRIPT, &[("transcript", transcript)]);
    prompt.push_str(prompts::JSON_REPLY_TRANSCRIPT);
    ask_json(model, prompt).await
}

/// Generates a complete project from a description
pub async fn generate_project(model: &dyn ChatModel, description: &str) -> Result<GeneratedProject> {
    let prompt = render(prompts::GENERATE_PROJECT, &[("prompt", description)]);
    let project: GeneratedProject = ask_json(model, prompt).await?;
    if project.files.is_empty() {
        return Err(CopilotError::Llm(
            "AI failed to generate project files. Please try a different prompt.".into(),
        ));
    }
    Ok(project)
}

/// Answers questions about the application itself.
///
/// The FAQ system prompt is followed by at most the last `history` messages.
pub async fn ask_assistant(
    model: &dyn ChatModel,
    messages: &[PromptMessage],
    history: usize,
) -> Result<String> {
    let skip = messages.len().saturating_sub(history);
    let mut request = Vec::with_capacity(history + 1);
    request.push(PromptMessage::system(prompts::ASSISTANT_FAQ));
    request.extend(messages[skip..].iter().cloned());
    model.complete(&request, OutputFormat::Text).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StateCounts;
    use crate::models::Role;
    use crate::testing::ScriptedModel;
    use test_case::test_case;

    #[tokio::test]
    async fn test_explain_commit_truncates_diff() {
        let model = ScriptedModel::new("summary");
        let diff = format!("{}{}", "a".repeat(20_000), "TAIL");
        explain_commit(&model, &diff, 20_000).await.unwrap();

        let prompt = model.last_prompt();
        assert!(!prompt.contains("TAIL"));
        assert!(prompt.ends_with(&"a".repeat(100)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test_case("```rust\nfn main() {}\n```", "fn main() {}"; "language tag")]
    #[test_case("  ```\r\nplain\r\n```  ", "plain"; "crlf and padding")]
    #[test_case("```c++\nint x;```", "int x;"; "closing fence on last line")]
    #[test_case("  no fence here ", "no fence here"; "unfenced text is trimmed")]
    #[test_case("see ```a``` inline", "see ```a``` inline"; "inline fence is kept")]
    fn test_strip_code_fence(input: &str, expected: &str) {
        assert_eq!(strip_code_fence(input), expected);
    }

    #[tokio::test]
    async fn test_chat_prompt_interpolates_verbatim() {
        let model = ScriptedModel::new("It lives in src/main.rs");
        let answer = chat_with_repo(&model, "https://github.com/o/r", "Where is main?", "CTX {{question}}")
            .await
            .unwrap();
        assert_eq!(answer, "It lives in src/main.rs");

        let prompt = model.last_prompt();
        assert!(prompt.contains("Context from the repository:\nCTX {{question}}\n"));
        assert!(prompt.contains("User's Question:\nWhere is main?\n"));
    }

    #[tokio::test]
    async fn test_edit_code_strips_fences() {
        let model = ScriptedModel::new(r#"{"editedCode": "```rust\nfn main() {}\n```"}"#);
        let edited = edit_code(&model, "fn main(){}", "format it").await.unwrap();
        assert_eq!(edited.edited_code, "fn main() {}");

        let requests = model.requests.lock().unwrap();
        assert_eq!(requests[0].1, OutputFormat::Json);
    }

    #[tokio::test]
    async fn test_structured_mismatch_is_llm_error() {
        let model = ScriptedModel::new(r#"{"summary": "ok"}"#);
        let err = summarize_transcript(&model, "Alice: ship it").await.unwrap_err();
        assert!(matches!(err, CopilotError::Llm(_)));
    }

    #[tokio::test]
    async fn test_summarize_transcript_accepts_fenced_json() {
        let model = ScriptedModel::new("```json\n{\"summary\": \"Shipped\", \"actionItems\": \"- Bob: deploy\"}\n```");
        let summary = summarize_transcript(&model, "Bob: I'll deploy").await.unwrap();
        assert_eq!(summary.action_items, "- Bob: deploy");
    }

    #[tokio::test]
    async fn test_empty_project_is_rejected() {
        let model = ScriptedModel::new(r#"{"files": []}"#);
        let err = generate_project(&model, "a todo app").await.unwrap_err();
        assert!(err.to_string().contains("failed to generate project files"));
    }

    #[tokio::test]
    async fn test_health_budget_checked_before_call() {
        let model = ScriptedModel::new("report");
        let metrics = HealthMetrics {
            commit_activity: vec![],
            contributors: vec![],
            issues: StateCounts::default(),
            pulls: StateCounts::default(),
        };

        let err = analyze_repo_health(&model, "https://github.com/o/r", &metrics, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, CopilotError::TokenBudget { .. }));
        assert!(model.requests.lock().unwrap().is_empty());

        let report = analyze_repo_health(&model, "https://github.com/o/r", &metrics, 1_048_575)
            .await
            .unwrap();
        assert_eq!(report, "report");
        assert!(model.last_prompt().contains(r#""issues":{"open":0,"closed":0}"#));
    }

    #[tokio::test]
    async fn test_explain_code_optional_question() {
        let model = ScriptedModel::new("explained");
        explain_code(&model, "x = 1", None).await.unwrap();
        assert!(!model.last_prompt().contains("specific question"));

        explain_code(&model, "x = 1", Some("why one?")).await.unwrap();
        assert!(model.last_prompt().contains("The user has a specific question: \"why one?\""));
    }

    #[tokio::test]
    async fn test_assistant_sends_system_prompt_and_last_six() {
        let model = ScriptedModel::new("Hi!");
        let history: Vec<PromptMessage> = (0..9)
            .map(|i| {
                if i % 2 == 0 {
                    PromptMessage::user(format!("q{}", i))
                } else {
                    PromptMessage::assistant(format!("a{}", i))
                }
            })
            .collect();

        ask_assistant(&model, &history, 6).await.unwrap();

        let requests = model.requests.lock().unwrap();
        let sent = &requests[0].0;
        assert_eq!(sent.len(), 7);
        assert_eq!(sent[0].role, Role::System);
        assert!(sent[0].content.starts_with("You are GitOrbot"));
        assert_eq!(sent[1].content, "a3");
        assert_eq!(sent[6].content, "q8");
    }
}
