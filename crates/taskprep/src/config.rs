//! Context-preparation configuration with sensible defaults.
//!
//! [`PrepConfig`] is layered: built-in defaults, then an optional JSON file
//! (`.taskprep.json` in the working directory), then command-line flags.
//! It converts into the pieces [`prepare`](crate::prepare) needs via
//! [`keyword_extractor`](PrepConfig::keyword_extractor),
//! [`probe_query`](PrepConfig::probe_query) and
//! [`output_path`](PrepConfig::output_path).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::document::DEFAULT_RELATED_LIMIT;
use crate::error::PrepareError;
use crate::keywords::{DEFAULT_MAX_KEYWORDS, DEFAULT_MIN_LEN, IdentifierKeywords};
use crate::render::OutputFormat;
use crate::repo::ProbeQuery;

/// Name of the optional per-project config file.
pub const CONFIG_FILE_NAME: &str = ".taskprep.json";
/// Directory (under the working directory) holding the default output.
pub const DEFAULT_OUTPUT_DIR: &str = ".context";
/// File stem of the default output; the extension follows the format.
pub const DEFAULT_OUTPUT_STEM: &str = "current-task";

/// Configuration for one context-preparation run.
#[derive(Debug, Clone)]
pub struct PrepConfig {
    /// Working directory for git queries and relative paths. Default: `"."`.
    pub workdir: PathBuf,
    /// Output path; relative paths resolve against `workdir`.
    /// Default: `.context/current-task.<ext>`.
    pub output: Option<PathBuf>,
    /// Default: markdown.
    pub format: OutputFormat,
    /// Commits listed under recent activity. Default: `10`.
    pub recent_commits: usize,
    /// Commits scanned for keyword-related history. Default: `200`.
    pub history_window: usize,
    /// Maximum related commits listed. Default: `5`.
    pub related_limit: usize,
    /// Maximum keywords extracted. Default: `12`.
    pub max_keywords: usize,
    /// Minimum length of a plain-word keyword. Default: `3`.
    pub min_keyword_len: usize,
    /// Stopwords added to the built-in list.
    pub extra_stopwords: Vec<String>,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            output: None,
            format: OutputFormat::Markdown,
            recent_commits: 10,
            history_window: 200,
            related_limit: DEFAULT_RELATED_LIMIT,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            min_keyword_len: DEFAULT_MIN_LEN,
            extra_stopwords: Vec::new(),
        }
    }
}

/// Contents of `.taskprep.json`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub recent_commits: Option<usize>,
    pub history_window: Option<usize>,
    pub related_limit: Option<usize>,
    pub max_keywords: Option<usize>,
    pub min_keyword_len: Option<usize>,
    #[serde(default)]
    pub stopwords: Vec<String>,
}

impl ConfigFile {
    /// Load a config file, returning `None` when it does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, PrepareError> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config file at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(PrepareError::io("read config file", path, e)),
        };
        let file: Self = serde_json::from_str(&data).map_err(|e| PrepareError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!("loaded config file {}", path.display());
        Ok(Some(file))
    }
}

impl PrepConfig {
    /// Defaults rooted at `workdir`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            ..Self::default()
        }
    }

    /// Default location of the config file for this working directory.
    pub fn config_file_path(&self) -> PathBuf {
        self.workdir.join(CONFIG_FILE_NAME)
    }

    /// Overlay values from a config file.
    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(output) = file.output {
            self.output = Some(output);
        }
        if let Some(format) = file.format {
            self.format = format;
        }
        if let Some(n) = file.recent_commits {
            self.recent_commits = n;
        }
        if let Some(n) = file.history_window {
            self.history_window = n;
        }
        if let Some(n) = file.related_limit {
            self.related_limit = n;
        }
        if let Some(n) = file.max_keywords {
            self.max_keywords = n;
        }
        if let Some(n) = file.min_keyword_len {
            self.min_keyword_len = n;
        }
        self.extra_stopwords.extend(file.stopwords);
    }

    /// Where the document is written.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.workdir.join(path),
            None => self.workdir.join(DEFAULT_OUTPUT_DIR).join(format!(
                "{DEFAULT_OUTPUT_STEM}.{}",
                self.format.extension()
            )),
        }
    }

    /// The keyword rule configured by this config.
    pub fn keyword_extractor(&self) -> IdentifierKeywords {
        IdentifierKeywords::new(self.min_keyword_len, self.max_keywords)
            .with_stopwords(&self.extra_stopwords)
    }

    /// History depth for the repository probe (clamped).
    pub fn probe_query(&self) -> ProbeQuery {
        ProbeQuery::new(self.recent_commits, self.history_window)
    }
}
