//! End-to-end tests for context preparation.
//!
//! Library-level tests use a [`StaticProbe`] so they do not depend on git.
//! The remaining tests create a throwaway repository with `git init` and
//! drive the `prepare-context` binary the way a shell script would; they are
//! skipped when `git` is not installed.

use std::fs;
use std::path::Path;
use std::process::Command;

use taskprep::repo::{BranchState, CommitRecord, StatusEntry};
use taskprep::{
    IdentifierKeywords, OutputFormat, PrepConfig, RepoSnapshot, StaticProbe, prepare_with,
};
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

fn commit(hash: &str, subject: &str) -> CommitRecord {
    CommitRecord {
        hash: hash.into(),
        author: "Ada".into(),
        when: "3 hours ago".into(),
        subject: subject.into(),
    }
}

fn feature_branch() -> StaticProbe {
    let history = vec![
        commit("aaa1111", "Tidy imports"),
        commit("bbb2222", "Bump dependencies"),
        commit("ccc3333", "Retry supabase connection on timeout"),
        commit("ddd4444", "Introduce CustomSupabaseProvider"),
    ];
    StaticProbe::new(RepoSnapshot {
        branch: BranchState::Named("feature/supabase".into()),
        recent: history[..2].to_vec(),
        history,
        working_tree: vec![StatusEntry {
            code: " M".into(),
            path: "src/provider.rs".into(),
        }],
        root: None,
    })
}

async fn prepare_static(dir: &TempDir, task: &str, probe: &StaticProbe) -> String {
    let config = PrepConfig::new(dir.path());
    let extractor = IdentifierKeywords::default();
    let prepared = prepare_with(task, &config, &extractor, probe)
        .await
        .unwrap();
    assert!(prepared.path.exists(), "document was not written");
    fs::read_to_string(&prepared.path).unwrap()
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}

fn init_repo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "-q"]);
    git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
    fs::write(dir.path().join("README.md"), "# demo\n").unwrap();
    git(dir.path(), &["add", "README.md"]);
    git(dir.path(), &["commit", "-q", "-m", "Initial commit"]);
    fs::write(dir.path().join("provider.ts"), "export {}\n").unwrap();
    git(dir.path(), &["add", "provider.ts"]);
    git(
        dir.path(),
        &["commit", "-q", "-m", "Add CustomSupabaseProvider skeleton"],
    );
    dir
}

fn run_cli(workdir: &Path, task: &str) -> String {
    run_cli_with(workdir, &[task], &[])
}

fn run_cli_with(workdir: &Path, args: &[&str], envs: &[(&str, &Path)]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_prepare-context"))
        .args(args)
        .envs(envs.iter().copied())
        .current_dir(workdir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "prepare-context failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    fs::read_to_string(path).unwrap()
}

// ── Library ─────────────────────────────────────────────────────────

#[tokio::test]
async fn document_echoes_task() {
    let dir = tempfile::tempdir().unwrap();
    for task in ["test task", "collaboration feature"] {
        let text = prepare_static(&dir, task, &feature_branch()).await;
        assert!(text.contains(task), "missing task {task:?} in:\n{text}");
    }
}

#[tokio::test]
async fn identifier_task_lists_keywords() {
    let dir = tempfile::tempdir().unwrap();
    let text = prepare_static(&dir, "Fix CustomSupabaseProvider connection", &feature_branch()).await;
    assert!(text.contains("Keywords:"));
    assert!(text.contains("CustomSupabaseProvider"));
}

#[tokio::test]
async fn sections_are_present() {
    let dir = tempfile::tempdir().unwrap();
    let text = prepare_static(&dir, "Fix CustomSupabaseProvider connection", &feature_branch()).await;

    assert!(text.contains("Recent Activity"));
    assert!(text.contains("Current Branch"));
    assert!(text.contains("feature/supabase"));
    assert!(text.contains("aaa1111 Tidy imports (Ada, 3 hours ago)"));
    // Older commits mentioning a keyword are surfaced; recent ones are not repeated.
    assert!(text.contains("ccc3333 Retry supabase connection on timeout"));
    assert!(text.contains("ddd4444 Introduce CustomSupabaseProvider"));
    assert!(text.contains("M src/provider.rs"));
}

#[tokio::test]
async fn empty_task_still_writes_document() {
    let dir = tempfile::tempdir().unwrap();
    let probe = StaticProbe::new(RepoSnapshot::unavailable("not a git repository"));
    let text = prepare_static(&dir, "", &probe).await;
    assert!(text.contains("Keywords: (none)"));
    assert!(text.contains("Recent Activity"));
    assert!(text.contains("Current Branch"));
}

#[tokio::test]
async fn second_run_replaces_first() {
    let dir = tempfile::tempdir().unwrap();
    let probe = feature_branch();
    prepare_static(&dir, "first unique task alpha", &probe).await;
    let text = prepare_static(&dir, "second unique task beta", &probe).await;

    assert!(text.contains("second unique task beta"));
    assert!(!text.contains("first unique task alpha"));
    assert_eq!(text.matches("# Task Context").count(), 1);
}

#[tokio::test]
async fn json_and_html_formats() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = IdentifierKeywords::default();
    let probe = feature_branch();

    let mut config = PrepConfig::new(dir.path());
    config.format = OutputFormat::Json;
    let json = prepare_with("collaboration feature", &config, &extractor, &probe)
        .await
        .unwrap();
    assert!(json.path.ends_with(".context/current-task.json"));
    let value: serde_json::Value = serde_json::from_str(&json.rendered).unwrap();
    assert_eq!(value["task"], "collaboration feature");
    assert_eq!(value["keywords"][0], "collaboration");

    config.format = OutputFormat::Html;
    let html = prepare_with("collaboration feature", &config, &extractor, &probe)
        .await
        .unwrap();
    assert!(html.path.ends_with(".context/current-task.html"));
    assert!(html.rendered.contains("box-sizing"));
    assert!(html.rendered.contains("Recent Activity"));
}

// ── Real git + binary ───────────────────────────────────────────────

#[test]
fn cli_reads_git_state() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let repo = init_repo();
    let text = run_cli(repo.path(), "Fix CustomSupabaseProvider connection");

    assert!(text.contains("Fix CustomSupabaseProvider connection"));
    assert!(text.contains("Keywords:"));
    assert!(text.contains("## Current Branch\n\nmain\n"));
    assert!(text.contains("Recent Activity"));
    assert!(text.contains("Add CustomSupabaseProvider skeleton"));
    assert!(text.contains("Initial commit"));
    assert!(repo.path().join(".context/current-task.md").exists());
}

#[test]
fn cli_overwrites_previous_document() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let repo = init_repo();
    run_cli(repo.path(), "test task");
    let text = run_cli(repo.path(), "collaboration feature");

    assert!(text.contains("collaboration feature"));
    assert!(!text.contains("test task"));
    // The document itself is not reported as an uncommitted change.
    assert!(text.contains("## Working Tree\n\n_Clean._\n"));
}

#[test]
fn cli_handles_unborn_branch() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "-q"]);
    git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/trunk"]);

    let text = run_cli(dir.path(), "test task");
    assert!(text.contains("## Current Branch\n\ntrunk\n"));
    assert!(text.contains("_No commits yet._"));
}

#[test]
fn cli_reports_detached_head() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let repo = init_repo();
    git(repo.path(), &["checkout", "-q", "--detach", "HEAD~1"]);

    let text = run_cli(repo.path(), "test task");
    assert!(text.contains("detached at "));
    assert!(text.contains("Initial commit"));
    assert!(!text.contains("Add CustomSupabaseProvider skeleton"));
}

#[test]
fn cli_from_subdirectory() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let repo = init_repo();
    let app = repo.path().join("app");
    fs::create_dir(&app).unwrap();
    fs::write(app.join("a.txt"), "a\n").unwrap();
    git(repo.path(), &["add", "app/a.txt"]);
    git(repo.path(), &["commit", "-q", "-m", "Add app"]);

    run_cli(&app, "test task");
    let text = run_cli(&app, "test task");
    assert!(app.join(".context/current-task.md").exists());
    assert!(!text.contains(".context"), "own output listed:\n{text}");
    assert!(text.contains("## Working Tree\n\n_Clean._\n"));
}

#[test]
fn cli_lists_untracked_files_beside_output() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let repo = init_repo();
    fs::create_dir(repo.path().join("notes")).unwrap();
    fs::write(repo.path().join("notes/todo.txt"), "later\n").unwrap();

    run_cli_with(repo.path(), &["--output", "notes/ctx.md", "test task"], &[]);
    let text = run_cli_with(repo.path(), &["--output", "notes/ctx.md", "test task"], &[]);
    assert!(text.contains("- ?? notes/todo.txt\n"));
    assert!(!text.contains("notes/ctx.md"));
}

#[test]
fn cli_outside_repository() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    // Keep git from finding a repository above the temp directory.
    let ceiling = dir.path().parent().unwrap_or(dir.path());
    let text = run_cli_with(
        dir.path(),
        &["test task"],
        &[("GIT_CEILING_DIRECTORIES", ceiling)],
    );

    assert!(text.contains("## Current Branch\n\nunavailable ("));
    assert!(text.contains("## Recent Activity\n\n_Git history unavailable._\n"));
    assert!(text.contains("_Git status unavailable._"));
    assert!(dir.path().join(".context/current-task.md").exists());
}

#[tokio::test]
async fn own_output_is_not_a_working_tree_change() {
    let dir = tempfile::tempdir().unwrap();
    let probe = StaticProbe::new(RepoSnapshot {
        branch: BranchState::Named("main".into()),
        recent: vec![commit("aaa1111", "Initial commit")],
        history: vec![commit("aaa1111", "Initial commit")],
        working_tree: vec![
            StatusEntry {
                code: "??".into(),
                path: ".context/current-task.md".into(),
            },
            StatusEntry {
                code: "??".into(),
                path: ".context/other.md".into(),
            },
            StatusEntry {
                code: "??".into(),
                path: "scratch.txt".into(),
            },
        ],
        root: None,
    });
    let text = prepare_static(&dir, "test task", &probe).await;
    assert!(text.contains("- ?? scratch.txt\n"));
    assert!(text.contains("- ?? .context/other.md\n"));
    assert!(!text.contains("current-task.md"));
}

#[tokio::test]
async fn own_output_is_matched_against_repository_root() {
    let dir = tempfile::tempdir().unwrap();
    let app = dir.path().join("app");
    fs::create_dir(&app).unwrap();
    let probe = StaticProbe::new(RepoSnapshot {
        branch: BranchState::Named("main".into()),
        recent: Vec::new(),
        history: Vec::new(),
        working_tree: vec![
            StatusEntry {
                code: "??".into(),
                path: "app/.context/current-task.md".into(),
            },
            StatusEntry {
                code: "??".into(),
                path: ".context/current-task.md".into(),
            },
        ],
        root: Some(dir.path().to_path_buf()),
    });

    let config = PrepConfig::new(&app);
    let prepared = prepare_with("test task", &config, &IdentifierKeywords::default(), &probe)
        .await
        .unwrap();
    let paths: Vec<&str> = prepared
        .document
        .working_tree
        .iter()
        .map(|e| e.path.as_str())
        .collect();
    assert_eq!(paths, vec![".context/current-task.md"]);
}
