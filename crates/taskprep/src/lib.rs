//! Task context preparation.
//!
//! `taskprep` turns a free-text task description into a context document:
//! the task itself, keywords derived from it, and a snapshot of the git
//! repository it will be worked on (current branch, recent activity,
//! keyword-related commits, uncommitted changes). The document is written
//! to a fixed path, `.context/current-task.md` by default, replacing any
//! previous one.
//!
//! # Library usage
//!
//! ```ignore
//! use taskprep::{PrepConfig, prepare};
//!
//! let config = PrepConfig::new("/path/to/repo");
//! let prepared = prepare("Fix CustomSupabaseProvider connection", &config).await?;
//! println!("wrote {}", prepared.path.display());
//! ```
//!
//! Keyword extraction and repository probing are pluggable through
//! [`KeywordExtractor`] and [`RepoProbe`]; use [`prepare_with`] to supply
//! your own.
//!
//! # Binary
//!
//! ```sh
//! prepare-context "Fix CustomSupabaseProvider connection"
//! prepare-context --workdir ../app --format html "collaboration feature"
//! ```

pub mod assets;
pub mod config;
pub mod document;
pub mod error;
pub mod keywords;
pub mod output;
pub mod render;
pub mod repo;

pub use config::{ConfigFile, PrepConfig};
pub use document::ContextDocument;
pub use error::PrepareError;
pub use keywords::{IdentifierKeywords, KeywordExtractor};
pub use render::OutputFormat;
pub use repo::{GitProbe, RepoProbe, RepoSnapshot, StaticProbe};

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Where the document was written.
    pub path: PathBuf,
    pub document: ContextDocument,
    /// The exact text written to `path`.
    pub rendered: String,
}

/// Prepare and write the context document for `task`, reading repository
/// state with `git` in `config.workdir`.
pub async fn prepare(task: &str, config: &PrepConfig) -> Result<Prepared, PrepareError> {
    let extractor = config.keyword_extractor();
    let probe = GitProbe::new(&config.workdir);
    prepare_with(task, config, &extractor, &probe).await
}

/// Like [`prepare`], with a caller-supplied keyword rule and repository probe.
pub async fn prepare_with(
    task: &str,
    config: &PrepConfig,
    extractor: &dyn KeywordExtractor,
    probe: &dyn RepoProbe,
) -> Result<Prepared, PrepareError> {
    let keywords = extractor.extract(task);
    debug!(?keywords, "extracted keywords");

    let path = config.output_path();
    let mut snapshot = probe.snapshot(config.probe_query()).await;
    // Earlier runs leave the document itself untracked; don't report it.
    if let Some(own) = repo_relative(&path, &config.workdir, snapshot.root.as_deref()) {
        snapshot
            .working_tree
            .retain(|entry| Path::new(&entry.path) != own);
    }

    let document = ContextDocument::assemble(
        task,
        keywords,
        snapshot,
        config.related_limit,
        Local::now(),
    );

    let rendered = render::render(&document, config.format)?;
    output::write_document(&path, &rendered)?;

    info!(
        path = %path.display(),
        branch = %document.branch,
        commits = document.recent_activity.len(),
        "context document written"
    );

    Ok(Prepared {
        path,
        document,
        rendered,
    })
}

/// `path` relative to the repository root, which status paths are reported
/// against. Falls back to `workdir` when the root is unknown.
fn repo_relative(path: &Path, workdir: &Path, root: Option<&Path>) -> Option<PathBuf> {
    let base = std::fs::canonicalize(workdir).ok()?;
    let absolute = match path.strip_prefix(workdir) {
        Ok(tail) => base.join(tail),
        Err(_) => path.to_path_buf(),
    };
    let root = match root {
        Some(root) => std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf()),
        None => base,
    };
    absolute.strip_prefix(&root).ok().map(Path::to_path_buf)
}
