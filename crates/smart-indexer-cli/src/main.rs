//! smart-indexer: offline workspace indexing, cache inspection, and stats.
//!
//! This is ambient tooling around the core library — useful for CI
//! pre-warming and local debugging without an editor attached. It calls the
//! same `BackgroundIndex` the LSP binary uses; no indexing behavior lives
//! here that doesn't also live there.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smart_indexer::{parse::is_supported_source_file, BackgroundIndex, Config, SHARD_VERSION};

/// Exit codes for the CLI.
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 2;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Offline workspace indexing, cache inspection, and stats for smart-indexer
#[derive(Parser)]
#[command(name = "smart-indexer")]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot background index build, then print stats
    Index {
        /// Workspace root to index (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// Read metadata.json and shard counts without reindexing
    Stats {
        /// Workspace root (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// Purge the cache directory
    Clear {
        /// Workspace root (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            return ExitCode::from(exit_codes::ERROR);
        }
    };

    match runtime.block_on(run(cli.command, cli.format, cli.quiet)) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(e) => {
            if cli.format == OutputFormat::Json {
                let error_json = serde_json::json!({
                    "error": "CommandFailed",
                    "message": e.to_string(),
                });
                eprintln!("{error_json}");
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run(command: Commands, format: OutputFormat, quiet: bool) -> Result<()> {
    match command {
        Commands::Index { root } => cmd_index(&root, format, quiet).await,
        Commands::Stats { root } => cmd_stats(&root, format).await,
        Commands::Clear { root } => cmd_clear(&root, format, quiet).await,
    }
}

fn open_background_index(root: &Path) -> Result<(PathBuf, Config, BackgroundIndex)> {
    let root = root.canonicalize().context("failed to resolve workspace root")?;
    let config = Config::load(&root).context("failed to load configuration")?;
    let cache_root = config.cache_root(&root);
    let exclusion = config.build_exclusion(&root);
    let index = BackgroundIndex::init(
        root.clone(),
        cache_root,
        SHARD_VERSION,
        config.max_concurrent_index_jobs,
        config.max_indexed_file_size,
        exclusion,
    )
    .context("failed to open background index")?;
    Ok((root, config, index))
}

/// Walk `root` with the compiled exclusion applied, collecting every
/// supported TypeScript/JavaScript source file as a `file://` URI.
fn discover_source_uris(root: &Path, index: &BackgroundIndex) -> Vec<String> {
    let mut uris = Vec::new();
    for entry in ignore::WalkBuilder::new(root).hidden(false).build() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = entry.path();
        if !path.is_file() || !is_supported_source_file(path) {
            continue;
        }
        if index.is_excluded(path) {
            continue;
        }
        uris.push(smart_indexer::background_index::path_to_uri(path));
    }
    uris
}

async fn cmd_index(root: &Path, format: OutputFormat, quiet: bool) -> Result<()> {
    let (root, config, index) = open_background_index(root)?;
    if config.enable_git_integration {
        smart_indexer::git::ensure_ignored(&root, &format!("{}/", config.cache_directory));
    }
    let uris = discover_source_uris(&root, &index);
    if !quiet && format == OutputFormat::Text {
        eprintln!("indexing {} files under {}", uris.len(), root.display());
    }

    let progress_quiet = quiet || format == OutputFormat::Json;
    let on_progress: Option<std::sync::Arc<dyn Fn(usize, usize) + Send + Sync>> = if progress_quiet {
        None
    } else {
        Some(std::sync::Arc::new(|done, total| {
            eprint!("\rindexed {done}/{total}");
        }))
    };

    index
        .ensure_up_to_date(uris, on_progress)
        .await
        .context("indexing failed")?;
    if !progress_quiet {
        eprintln!();
    }

    print_stats(&index, format);
    Ok(())
}

async fn cmd_stats(root: &Path, format: OutputFormat) -> Result<()> {
    let (_root, _config, index) = open_background_index(root)?;
    print_stats(&index, format);
    Ok(())
}

async fn cmd_clear(root: &Path, format: OutputFormat, quiet: bool) -> Result<()> {
    let (root, _config, index) = open_background_index(root)?;
    index.clear().await.context("failed to clear cache")?;
    if !quiet {
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"cleared": true, "root": root.display().to_string()}));
            }
            OutputFormat::Text => println!("cleared cache for {}", root.display()),
        }
    }
    Ok(())
}

fn print_stats(index: &BackgroundIndex, format: OutputFormat) {
    let snapshot = index.stats().snapshot();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&snapshot).unwrap_or_default());
        }
        OutputFormat::Text => {
            println!("files indexed:       {}", snapshot.files_indexed);
            println!("files skipped:       {}", snapshot.files_skipped);
            println!("files purged:        {}", snapshot.files_purged);
            println!("parse errors:        {}", snapshot.parse_errors);
            println!("shard cache hits:    {}", snapshot.shard_cache_hits);
            println!("shard cache misses:  {}", snapshot.shard_cache_misses);
            if let Some(err) = &snapshot.last_error {
                println!("last error:          {err}");
            }
        }
    }
}
