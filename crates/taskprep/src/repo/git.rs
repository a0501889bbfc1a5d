//! Repository probe backed by the `git` command line.
//!
//! [`GitProbe`] runs four read-only queries concurrently in its working
//! directory:
//!
//! | Query | Command |
//! |-------|---------|
//! | branch | `git symbolic-ref --quiet --short HEAD`, falling back to `git rev-parse --short HEAD` |
//! | root | `git rev-parse --show-toplevel` |
//! | history | `git log -n <depth>` with a unit-separated format |
//! | working tree | `git status --porcelain -z --untracked-files=all` |

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{
    BranchState, CommitRecord, ProbeFuture, ProbeQuery, RepoProbe, RepoSnapshot, StatusEntry,
};

/// Field separator used in the `git log` format string.
const FIELD_SEP: char = '\x1f';
const LOG_FORMAT: &str = "--pretty=format:%h%x1f%an%x1f%ar%x1f%s";

/// Failure running a git command.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("`git {args}` exited with {code}: {stderr}")]
    Failed {
        args: String,
        code: i32,
        stderr: String,
    },
}

impl GitError {
    /// Short, single-line description for the document.
    pub fn reason(&self) -> String {
        match self {
            Self::Spawn(e) => format!("failed to run git: {e}"),
            Self::Failed { stderr, code, .. } => stderr
                .lines()
                .next()
                .map(|line| line.trim_start_matches("fatal: ").to_string())
                .filter(|line| !line.is_empty())
                .unwrap_or_else(|| format!("git exited with {code}")),
        }
    }
}

// ── Helper ──────────────────────────────────────────────────────────

/// Run a git command in the given directory and return its stdout.
async fn run_git(workdir: &Path, args: &[&str]) -> Result<String, GitError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(workdir)
        .env("GIT_OPTIONAL_LOCKS", "0")
        .output()
        .await?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(GitError::Failed {
            args: args.join(" "),
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

// ── Queries ─────────────────────────────────────────────────────────

async fn current_branch(workdir: &Path) -> BranchState {
    match run_git(workdir, &["symbolic-ref", "--quiet", "--short", "HEAD"]).await {
        Ok(name) => return BranchState::Named(name.trim().to_string()),
        Err(e @ GitError::Spawn(_)) => {
            warn!("could not determine current branch: {e}");
            return BranchState::Unavailable(e.reason());
        }
        Err(e) => debug!("HEAD is not a symbolic ref: {e}"),
    }

    match run_git(workdir, &["rev-parse", "--short", "HEAD"]).await {
        Ok(hash) => BranchState::Detached(hash.trim().to_string()),
        Err(e) => {
            warn!("could not determine current branch: {e}");
            BranchState::Unavailable(e.reason())
        }
    }
}

async fn commit_log(workdir: &Path, depth: usize) -> Result<Vec<CommitRecord>, GitError> {
    let depth = depth.to_string();
    let output = run_git(workdir, &["log", "-n", depth.as_str(), LOG_FORMAT]).await?;
    Ok(parse_log(&output))
}

async fn toplevel(workdir: &Path) -> Result<PathBuf, GitError> {
    let output = run_git(workdir, &["rev-parse", "--show-toplevel"]).await?;
    Ok(PathBuf::from(output.trim_end_matches(['\n', '\r'])))
}

async fn working_tree(workdir: &Path) -> Result<Vec<StatusEntry>, GitError> {
    let output = run_git(
        workdir,
        &["status", "--porcelain", "-z", "--untracked-files=all"],
    )
    .await?;
    Ok(parse_porcelain(&output))
}

// ── Parsing ─────────────────────────────────────────────────────────

/// Parse `git log` output produced with [`LOG_FORMAT`].
///
/// Lines with fewer than four fields are skipped.
pub fn parse_log(output: &str) -> Vec<CommitRecord> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(4, FIELD_SEP);
            let hash = fields.next()?.trim();
            let author = fields.next()?;
            let when = fields.next()?;
            let subject = fields.next()?;
            if hash.is_empty() {
                return None;
            }
            Some(CommitRecord {
                hash: hash.to_string(),
                author: author.to_string(),
                when: when.to_string(),
                subject: subject.trim_end().to_string(),
            })
        })
        .collect()
}

/// Parse `git status --porcelain -z` (v1) output.
///
/// Records are NUL-terminated and paths are never quoted. A rename or copy
/// record is followed by a second record holding the original path; the
/// pair is reported as `old -> new`.
pub fn parse_porcelain(output: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    let mut records = output.split('\0');
    while let Some(record) = records.next() {
        let (Some(code), Some(path)) = (record.get(..2), record.get(3..)) else {
            continue;
        };
        if path.is_empty() {
            continue;
        }
        let original = if code.contains(['R', 'C']) {
            records.next().filter(|o| !o.is_empty())
        } else {
            None
        };
        let path = match original {
            Some(original) => format!("{original} -> {path}"),
            None => path.to_string(),
        };
        entries.push(StatusEntry {
            code: code.to_string(),
            path,
        });
    }
    entries
}

// ── GitProbe ────────────────────────────────────────────────────────

/// Reads repository state with `git` (`git log`, `git status`, ...).
pub struct GitProbe {
    workdir: PathBuf,
}

impl GitProbe {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl RepoProbe for GitProbe {
    fn snapshot(&self, query: ProbeQuery) -> ProbeFuture<'_> {
        let workdir = self.workdir.clone();
        Box::pin(async move {
            let (branch, root, history, tree) = tokio::join!(
                current_branch(&workdir),
                toplevel(&workdir),
                commit_log(&workdir, query.log_depth()),
                working_tree(&workdir),
            );

            if !branch.is_available() {
                return RepoSnapshot {
                    branch,
                    ..RepoSnapshot::unavailable("")
                };
            }

            // An unborn branch has no log; that is not worth a warning.
            let history = history.unwrap_or_else(|e| {
                debug!("no commit history: {e}");
                Vec::new()
            });
            let working_tree = tree.unwrap_or_else(|e| {
                warn!("could not read working tree status: {e}");
                Vec::new()
            });
            let root = root
                .inspect_err(|e| debug!("no repository root: {e}"))
                .ok();

            let mut recent = history.clone();
            recent.truncate(query.recent);
            let mut history = history;
            history.truncate(query.history_window);

            debug!(
                branch = %branch,
                recent = recent.len(),
                history = history.len(),
                changes = working_tree.len(),
                "probed repository"
            );

            RepoSnapshot {
                branch,
                recent,
                history,
                working_tree,
                root,
            }
        })
    }
}
