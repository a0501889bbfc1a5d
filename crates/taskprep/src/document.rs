//! The context document: a flat report on one task.

use std::collections::HashSet;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::repo::{BranchState, CommitRecord, RepoSnapshot, StatusEntry};

/// Default cap on [`ContextDocument::related_commits`].
pub const DEFAULT_RELATED_LIMIT: usize = 5;

/// Everything written for one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ContextDocument {
    /// The task description, verbatim.
    pub task: String,
    pub keywords: Vec<String>,
    pub branch: BranchState,
    /// Most recent commits on `HEAD`, newest first.
    pub recent_activity: Vec<CommitRecord>,
    /// Older commits whose subject mentions a keyword, newest first.
    pub related_commits: Vec<CommitRecord>,
    pub working_tree: Vec<StatusEntry>,
    pub generated_at: DateTime<Local>,
}

impl ContextDocument {
    /// Combine a task, its keywords, and a repository snapshot.
    pub fn assemble(
        task: &str,
        keywords: Vec<String>,
        snapshot: RepoSnapshot,
        related_limit: usize,
        generated_at: DateTime<Local>,
    ) -> Self {
        let related = related_commits(
            &snapshot.history,
            &snapshot.recent,
            &keywords,
            related_limit,
        );
        Self {
            task: task.to_string(),
            keywords,
            branch: snapshot.branch,
            recent_activity: snapshot.recent,
            related_commits: related,
            working_tree: snapshot.working_tree,
            generated_at,
        }
    }
}

/// Commits from `history` whose subject contains any keyword
/// (case-insensitive), skipping commits already listed in `recent`.
pub fn related_commits(
    history: &[CommitRecord],
    recent: &[CommitRecord],
    keywords: &[String],
    limit: usize,
) -> Vec<CommitRecord> {
    if keywords.is_empty() || limit == 0 {
        return Vec::new();
    }

    let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let listed: HashSet<&str> = recent.iter().map(|c| c.hash.as_str()).collect();

    history
        .iter()
        .filter(|c| !listed.contains(c.hash.as_str()))
        .filter(|c| {
            let subject = c.subject.to_lowercase();
            needles.iter().any(|n| subject.contains(n.as_str()))
        })
        .take(limit)
        .cloned()
        .collect()
}
