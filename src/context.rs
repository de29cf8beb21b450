//! Builds the text blocks handed to the model, and the size checks done before sending them.

use crate::config::Limits;
use crate::error::{CopilotError, Result};
use crate::github::{Author, CommitRecord, ContributorStats, IssueState, WeeklyActivity};
use crate::models::RepoFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Paths whose contents go into the repository-note context
pub const KEY_FILE_MARKERS: &[&str] = &[
    "package.json",
    "next.config.ts",
    "tailwind.config.ts",
    "src/app/layout.tsx",
    "src/app/page.tsx",
    "README.md",
];

/// Characters added to every estimate for the fixed prompt text
const PROMPT_OVERHEAD_CHARS: usize = 500;

const WEEKS_KEPT: usize = 12;
const TOP_CONTRIBUTORS: usize = 10;

/// Words of `question` longer than three characters, lower-cased
pub fn keywords(question: &str) -> BTreeSet<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .map(str::to_string)
        .collect()
}

/// Files whose path or leading content mentions one of the question's keywords.
///
/// Only the first `limits.chat_scan_chars` characters of each file are searched and at most
/// `limits.chat_max_files` files are returned, in their original order.
pub fn relevant_files<'a>(question: &str, files: &'a [RepoFile], limits: &Limits) -> Vec<&'a RepoFile> {
    let words = keywords(question);
    if words.is_empty() {
        return Vec::new();
    }

    files
        .iter()
        .filter(|file| {
            let path = file.path.to_lowercase();
            let head: String = file.content.chars().take(limits.chat_scan_chars).collect();
            let head = head.to_lowercase();
            words.iter().any(|w| path.contains(w.as_str()) || head.contains(w.as_str()))
        })
        .take(limits.chat_max_files)
        .collect()
}

/// `Recent Commits:` block listing subject and author of the newest commits
pub fn commit_summary(commits: &[CommitRecord], count: usize) -> String {
    let lines: Vec<String> = commits
        .iter()
        .take(count)
        .map(|c| format!("- {} (by {})", c.subject(), c.author_name()))
        .collect();
    format!("Recent Commits:\n{}\n\n---\n\n", lines.join("\n"))
}

fn file_block(file: &RepoFile) -> String {
    format!("// FILE: {}\n\n{}\n\n---\n\n", file.path, file.content)
}

/// Context for a repository chat question: recent commits, then the relevant files
pub fn chat_context(question: &str, files: &[RepoFile], commits: &[CommitRecord], limits: &Limits) -> String {
    let mut context = commit_summary(commits, limits.chat_commit_lines);
    context.push_str("Repository Code Files:\n\n");
    for file in relevant_files(question, files, limits) {
        context.push_str(&file_block(file));
    }
    context
}

/// Context for the repository note: the full file tree, then the key configuration files
pub fn note_context(files: &[RepoFile]) -> String {
    let tree: Vec<String> = files.iter().map(|f| format!("- {}", f.path)).collect();
    let mut context = format!("File tree:\n{}\n\n", tree.join("\n"));
    context.push_str("Key file contents:\n");
    for file in files
        .iter()
        .filter(|f| KEY_FILE_MARKERS.iter().any(|m| f.path.contains(m)))
    {
        context.push_str(&file_block(file));
    }
    context
}

/// Rough token count: a quarter of the characters plus a fixed prompt allowance, rounded up
pub fn estimate_tokens(parts: &[&str]) -> usize {
    let chars: usize = parts.iter().map(|p| p.chars().count()).sum();
    (chars + PROMPT_OVERHEAD_CHARS + 3) / 4
}

/// Fails with [`CopilotError::TokenBudget`] when `estimated` is above `limit`
pub fn ensure_within_budget(estimated: usize, limit: usize) -> Result<()> {
    if estimated > limit {
        return Err(CopilotError::TokenBudget { estimated, limit });
    }
    Ok(())
}

/// Open and closed counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub open: usize,
    pub closed: usize,
}

impl StateCounts {
    fn tally<'a>(items: impl Iterator<Item = &'a IssueState>) -> Self {
        items.fold(Self::default(), |mut counts, item| {
            if item.is_open() {
                counts.open += 1;
            } else {
                counts.closed += 1;
            }
            counts
        })
    }
}

/// Commit count of one week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekTotal {
    /// Unix timestamp of the week start
    pub week: i64,
    pub total: u64,
}

/// A contributor's total commit count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorTotal {
    pub author: Author,
    pub total: u64,
}

/// Summarised health metrics, in the shape sent to the model and cached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    /// Last twelve weeks, oldest first
    pub commit_activity: Vec<WeekTotal>,
    /// Up to ten contributors, most commits first
    pub contributors: Vec<ContributorTotal>,
    /// Issues that are not pull requests
    pub issues: StateCounts,
    pub pulls: StateCounts,
}

impl HealthMetrics {
    /// Aggregates raw statistics responses.
    ///
    /// Contributors without a GitHub account are skipped. The issues listing includes pull
    /// requests; those entries are not counted as issues.
    pub fn from_raw(
        activity: &[WeeklyActivity],
        contributors: &[ContributorStats],
        issues: &[IssueState],
        pulls: &[IssueState],
    ) -> Self {
        let skip = activity.len().saturating_sub(WEEKS_KEPT);
        let commit_activity = activity[skip..]
            .iter()
            .map(|w| WeekTotal {
                week: w.week,
                total: w.total,
            })
            .collect();

        let mut ranked: Vec<ContributorTotal> = contributors
            .iter()
            .filter_map(|c| {
                c.author.clone().map(|author| ContributorTotal {
                    author,
                    total: c.total,
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.total.cmp(&a.total));
        ranked.truncate(TOP_CONTRIBUTORS);

        Self {
            commit_activity,
            contributors: ranked,
            issues: StateCounts::tally(issues.iter().filter(|i| i.pull_request.is_none())),
            pulls: StateCounts::tally(pulls.iter()),
        }
    }
}
