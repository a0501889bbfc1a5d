//! Repository state consumed by the context document.
//!
//! A [`RepoProbe`] produces a [`RepoSnapshot`]: the current branch, the most
//! recent commits, a wider history window used to find keyword-related
//! commits, and the uncommitted changes in the working tree.
//!
//! | Probe | Source |
//! |-------|--------|
//! | [`GitProbe`] | `git` subprocesses in a working directory |
//! | [`StaticProbe`] | a fixed snapshot supplied by the caller |

pub mod git;

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use serde::Serialize;

pub use git::{GitError, GitProbe};

/// Upper bound for [`ProbeQuery::recent`].
pub const MAX_RECENT_COMMITS: usize = 100;
/// Upper bound for [`ProbeQuery::history_window`].
pub const MAX_HISTORY_WINDOW: usize = 1000;

// ── Snapshot types ──────────────────────────────────────────────────

/// One commit as listed in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    /// Abbreviated commit hash.
    pub hash: String,
    pub author: String,
    /// Relative date, e.g. `3 hours ago`.
    pub when: String,
    pub subject: String,
}

/// One uncommitted change, as reported by `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    /// Two-character status code (`" M"`, `"A "`, `"??"`, ...).
    pub code: String,
    pub path: String,
}

/// What `HEAD` points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum BranchState {
    /// On a branch (possibly one without commits yet).
    Named(String),
    /// Detached at the given abbreviated hash.
    Detached(String),
    /// Branch could not be determined; carries the reason.
    Unavailable(String),
}

impl BranchState {
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Detached(hash) => write!(f, "detached at {hash}"),
            Self::Unavailable(reason) => write!(f, "unavailable ({reason})"),
        }
    }
}

/// Repository state captured at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSnapshot {
    pub branch: BranchState,
    /// Most recent commits on `HEAD`, newest first.
    pub recent: Vec<CommitRecord>,
    /// Wider window of commits on `HEAD`, newest first. Starts with `recent`.
    pub history: Vec<CommitRecord>,
    /// Paths are relative to [`root`](Self::root) when it is known.
    pub working_tree: Vec<StatusEntry>,
    /// Top-level directory of the repository.
    pub root: Option<PathBuf>,
}

impl RepoSnapshot {
    /// A snapshot for a directory with no readable repository.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            branch: BranchState::Unavailable(reason.into()),
            recent: Vec::new(),
            history: Vec::new(),
            working_tree: Vec::new(),
            root: None,
        }
    }
}

// ── Probe trait ─────────────────────────────────────────────────────

/// How much history a probe should collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeQuery {
    /// Number of commits listed under recent activity.
    pub recent: usize,
    /// Number of commits scanned for keyword-related history.
    pub history_window: usize,
}

impl ProbeQuery {
    /// Build a query, clamping both counts into their supported ranges.
    pub fn new(recent: usize, history_window: usize) -> Self {
        Self {
            recent: recent.clamp(1, MAX_RECENT_COMMITS),
            history_window: history_window.clamp(1, MAX_HISTORY_WINDOW),
        }
    }

    /// Number of commits to read in one `git log` call.
    pub fn log_depth(&self) -> usize {
        self.recent.max(self.history_window)
    }
}

impl Default for ProbeQuery {
    fn default() -> Self {
        Self::new(10, 200)
    }
}

/// Boxed future returned by [`RepoProbe::snapshot`].
pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = RepoSnapshot> + Send + 'a>>;

/// Source of repository state.
///
/// Probes never fail: problems reading the repository are reported through
/// [`BranchState::Unavailable`] and empty lists so the document can always be
/// written.
pub trait RepoProbe: Send + Sync {
    fn snapshot(&self, query: ProbeQuery) -> ProbeFuture<'_>;
}

/// Probe that returns a fixed snapshot, trimmed to the query.
#[derive(Debug, Clone)]
pub struct StaticProbe {
    snapshot: RepoSnapshot,
}

impl StaticProbe {
    pub fn new(snapshot: RepoSnapshot) -> Self {
        Self { snapshot }
    }
}

impl RepoProbe for StaticProbe {
    fn snapshot(&self, query: ProbeQuery) -> ProbeFuture<'_> {
        let mut snapshot = self.snapshot.clone();
        snapshot.recent.truncate(query.recent);
        snapshot.history.truncate(query.history_window);
        Box::pin(async move { snapshot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, subject: &str) -> CommitRecord {
        CommitRecord {
            hash: hash.into(),
            author: "Ada".into(),
            when: "1 day ago".into(),
            subject: subject.into(),
        }
    }

    #[test]
    fn probe_query_clamps_counts() {
        let q = ProbeQuery::new(0, 5000);
        assert_eq!(q.recent, 1);
        assert_eq!(q.history_window, MAX_HISTORY_WINDOW);

        let q = ProbeQuery::new(500, 3);
        assert_eq!(q.recent, MAX_RECENT_COMMITS);
        assert_eq!(q.log_depth(), MAX_RECENT_COMMITS);
    }

    #[test]
    fn branch_state_display() {
        assert_eq!(BranchState::Named("main".into()).to_string(), "main");
        assert_eq!(
            BranchState::Detached("abc1234".into()).to_string(),
            "detached at abc1234"
        );
        let unavailable = BranchState::Unavailable("not a git repository".into());
        assert!(!unavailable.is_available());
        assert_eq!(
            unavailable.to_string(),
            "unavailable (not a git repository)"
        );
    }

    #[test]
    fn branch_state_serializes_tagged() {
        let json = serde_json::to_value(BranchState::Named("main".into())).unwrap();
        assert_eq!(json["state"], "named");
        assert_eq!(json["value"], "main");
    }

    #[tokio::test]
    async fn static_probe_truncates_to_query() {
        let commits: Vec<_> = (0..5).map(|i| commit(&format!("h{i}"), "work")).collect();
        let probe = StaticProbe::new(RepoSnapshot {
            branch: BranchState::Named("main".into()),
            recent: commits.clone(),
            history: commits,
            working_tree: Vec::new(),
            root: None,
        });

        let snapshot = probe.snapshot(ProbeQuery::new(2, 3)).await;
        assert_eq!(snapshot.recent.len(), 2);
        assert_eq!(snapshot.history.len(), 3);
        assert_eq!(snapshot.recent[0].hash, "h0");
    }
}
