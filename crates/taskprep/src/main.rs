//! Write a task context document for the repository in the working directory.
//!
//! Log verbosity follows `RUST_LOG` when set, otherwise `-v` flags.
//!
//! # Examples
//!
//! ```sh
//! # Markdown at .context/current-task.md
//! prepare-context "Fix CustomSupabaseProvider connection"
//!
//! # Another repository, HTML output, also echoed to stdout
//! prepare-context -C ../web --format html --print "collaboration feature"
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use taskprep::{ConfigFile, OutputFormat, PrepConfig, PrepareError};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Write a task context document for the repository in the working directory.
#[derive(Parser)]
#[command(name = "prepare-context", version)]
struct Cli {
    /// Task description, copied verbatim into the document
    task: String,

    /// Working directory for git queries and relative paths
    #[arg(short = 'C', long, default_value = ".")]
    workdir: PathBuf,

    /// Output path (relative paths resolve against the working directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Number of recent commits to list
    #[arg(short = 'n', long)]
    recent: Option<usize>,

    /// Number of commits scanned for keyword-related history
    #[arg(long)]
    history_window: Option<usize>,

    /// Maximum number of keywords
    #[arg(long)]
    max_keywords: Option<usize>,

    /// Config file [default: <workdir>/.taskprep.json]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also print the document to stdout
    #[arg(long)]
    print: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Layer defaults, config file, and flags.
fn build_config(cli: &Cli) -> Result<PrepConfig, PrepareError> {
    let workdir = std::fs::canonicalize(&cli.workdir)
        .map_err(|e| PrepareError::Io {
            action: "open working directory",
            path: cli.workdir.clone(),
            source: e,
        })?;
    let mut config = PrepConfig::new(workdir);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config.config_file_path());
    if let Some(file) = ConfigFile::load(&config_path)? {
        config.apply_file(file);
    } else if cli.config.is_some() {
        // An explicitly named file must exist.
        return Err(PrepareError::Config {
            path: config_path,
            message: "file not found".to_string(),
        });
    }

    if let Some(output) = &cli.output {
        config.output = Some(output.clone());
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(n) = cli.recent {
        config.recent_commits = n;
    }
    if let Some(n) = cli.history_window {
        config.history_window = n;
    }
    if let Some(n) = cli.max_keywords {
        config.max_keywords = n;
    }

    debug!(?config, "resolved configuration");
    Ok(config)
}

async fn run(cli: &Cli) -> Result<(), PrepareError> {
    let config = build_config(cli)?;
    let prepared = taskprep::prepare(&cli.task, &config).await?;

    if cli.print {
        print!("{}", prepared.rendered);
    }
    println!("{}", prepared.path.display());
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
