//! Rendering a [`ContextDocument`] to text.
//!
//! | Format | Output |
//! |--------|--------|
//! | [`OutputFormat::Markdown`] | Plain markdown with `Task:` / `Keywords:` lines and `##` sections |
//! | [`OutputFormat::Json`] | Pretty-printed serde serialization of the document |
//! | [`OutputFormat::Html`] | Standalone page with the reset stylesheet inlined |

use clap::ValueEnum;
use serde::Deserialize;

use crate::assets::{DOCUMENT_CSS, RESET_CSS};
use crate::document::ContextDocument;
use crate::repo::{CommitRecord, StatusEntry};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

/// On-disk format of the context document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Html,
}

impl OutputFormat {
    /// File extension used for the default output path.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

/// Render a document in the given format.
pub fn render(doc: &ContextDocument, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Markdown => Ok(render_markdown(doc)),
        OutputFormat::Json => serde_json::to_string_pretty(doc).map(|mut s| {
            s.push('\n');
            s
        }),
        OutputFormat::Html => Ok(render_html(doc)),
    }
}

// ── Section text shared by both text formats ────────────────────────

fn keywords_line(doc: &ContextDocument) -> String {
    if doc.keywords.is_empty() {
        "(none)".to_string()
    } else {
        doc.keywords.join(", ")
    }
}

fn commit_line(c: &CommitRecord) -> String {
    format!("{} {} ({}, {})", c.hash, c.subject, c.author, c.when)
}

fn status_line(e: &StatusEntry) -> String {
    format!("{} {}", e.code.trim(), e.path)
}

fn empty_activity(doc: &ContextDocument) -> &'static str {
    if doc.branch.is_available() {
        "No commits yet."
    } else {
        "Git history unavailable."
    }
}

fn empty_related(doc: &ContextDocument) -> &'static str {
    if doc.keywords.is_empty() {
        "No keywords to match."
    } else {
        "No earlier commits mention these keywords."
    }
}

fn empty_tree(doc: &ContextDocument) -> &'static str {
    if doc.branch.is_available() {
        "Clean."
    } else {
        "Git status unavailable."
    }
}

// ── Markdown ────────────────────────────────────────────────────────

fn markdown_list(out: &mut String, items: impl Iterator<Item = String>, empty: &str) {
    let mut any = false;
    for item in items {
        out.push_str("- ");
        out.push_str(&item);
        out.push('\n');
        any = true;
    }
    if !any {
        out.push_str(&format!("_{empty}_\n"));
    }
}

/// Render the markdown form of the document.
pub fn render_markdown(doc: &ContextDocument) -> String {
    let mut out = String::from("# Task Context\n\n");
    out.push_str(&format!("Task: {}\n", doc.task));
    out.push_str(&format!(
        "Generated: {}\n\n",
        doc.generated_at.format(TIMESTAMP_FORMAT)
    ));
    out.push_str(&format!("Keywords: {}\n\n", keywords_line(doc)));

    out.push_str("## Current Branch\n\n");
    out.push_str(&format!("{}\n\n", doc.branch));

    out.push_str("## Recent Activity\n\n");
    markdown_list(
        &mut out,
        doc.recent_activity.iter().map(commit_line),
        empty_activity(doc),
    );

    out.push_str("\n## Related Commits\n\n");
    markdown_list(
        &mut out,
        doc.related_commits.iter().map(commit_line),
        empty_related(doc),
    );

    out.push_str("\n## Working Tree\n\n");
    markdown_list(
        &mut out,
        doc.working_tree.iter().map(status_line),
        empty_tree(doc),
    );

    out
}

// ── HTML ────────────────────────────────────────────────────────────

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn html_section(out: &mut String, heading: &str, items: Vec<String>, empty: &str) {
    out.push_str(&format!("<h2>{heading}</h2>\n"));
    if items.is_empty() {
        out.push_str(&format!("<p class=\"empty\">{}</p>\n", escape_html(empty)));
        return;
    }
    out.push_str("<ul>\n");
    for item in items {
        out.push_str(&format!("<li>{}</li>\n", escape_html(&item)));
    }
    out.push_str("</ul>\n");
}

/// Render the HTML form of the document.
pub fn render_html(doc: &ContextDocument) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str(&format!(
        "<title>Task Context: {}</title>\n",
        escape_html(&doc.task)
    ));
    out.push_str("<style>\n");
    out.push_str(RESET_CSS);
    out.push_str(DOCUMENT_CSS);
    out.push_str("</style>\n</head>\n<body>\n");

    out.push_str("<h1>Task Context</h1>\n");
    out.push_str(&format!("<p>Task: {}</p>\n", escape_html(&doc.task)));
    out.push_str(&format!(
        "<p class=\"meta\">Generated: {}</p>\n",
        doc.generated_at.format(TIMESTAMP_FORMAT)
    ));
    out.push_str(&format!(
        "<p>Keywords: {}</p>\n",
        escape_html(&keywords_line(doc))
    ));

    out.push_str("<h2>Current Branch</h2>\n");
    out.push_str(&format!(
        "<p><code>{}</code></p>\n",
        escape_html(&doc.branch.to_string())
    ));

    html_section(
        &mut out,
        "Recent Activity",
        doc.recent_activity.iter().map(commit_line).collect(),
        empty_activity(doc),
    );
    html_section(
        &mut out,
        "Related Commits",
        doc.related_commits.iter().map(commit_line).collect(),
        empty_related(doc),
    );
    html_section(
        &mut out,
        "Working Tree",
        doc.working_tree.iter().map(status_line).collect(),
        empty_tree(doc),
    );

    out.push_str("</body>\n</html>\n");
    out
}
