//! Scan command - walk a content tree and summarize it

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::{colors, format_bytes, print_header, print_warning};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::error::IndexError;
use crate::core::indexer::{CancelToken, DirectoryScanner, Fid, FileEntry};

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan
    pub root: PathBuf,

    /// Worker threads (defaults to the configured value)
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Glob patterns to exclude (can be specified multiple times)
    #[arg(long, short = 'e')]
    pub exclude: Vec<String>,
}

struct Scanned {
    path: PathBuf,
    size: u64,
    fid: Option<Fid>,
    links: u64,
}

impl Scanned {
    fn from_entry(entry: FileEntry) -> Self {
        Self {
            size: entry.metadata.len(),
            links: link_count(&entry.metadata),
            fid: entry.fid,
            path: entry.path,
        }
    }
}

#[cfg(unix)]
fn link_count(metadata: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.nlink()
}

#[cfg(not(unix))]
fn link_count(_metadata: &std::fs::Metadata) -> u64 {
    1
}

#[derive(Debug, Serialize)]
pub struct ScanOutput {
    pub root: String,
    pub workers: usize,
    pub files: usize,
    pub total_bytes: u64,
    /// Paths sharing one inode, grouped
    pub hard_links: Vec<Vec<String>>,
}

/// Execute the scan command
pub async fn execute(
    args: ScanArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scanner_config = config.scanner.clone();
    if let Some(workers) = args.workers {
        scanner_config.workers = workers;
    }
    scanner_config.exclude_patterns.extend(args.exclude);
    let scanner = DirectoryScanner::from_config(&scanner_config)?;

    let token = CancelToken::new();
    let interrupt = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, stopping scan");
                token.cancel();
            }
        })
    };

    let root = args.root.clone();
    let workers = scanner.workers();
    let (files, error) = tokio::task::spawn_blocking(move || {
        scanner.scan(&root, &token, Scanned::from_entry).collect()
    })
    .await?;
    interrupt.abort();

    match error {
        None => {}
        Some(IndexError::Cancelled) => print_warning("Scan cancelled; totals are partial"),
        Some(e) => return Err(e.into()),
    }

    let output = ScanOutput {
        root: args.root.display().to_string(),
        workers,
        files: files.len(),
        total_bytes: files.iter().map(|f| f.size).sum(),
        hard_links: hard_link_groups(&files),
    };

    match format {
        OutputFormat::Human => {
            print_header(&format!("Scanned {}", output.root));
            println!(
                "  {} file(s), {} with {} worker(s)",
                colors::number(&output.files.to_string()),
                colors::number(&format_bytes(output.total_bytes)),
                output.workers
            );
            for group in &output.hard_links {
                println!("  {} {}", colors::dim("linked:"), colors::file_path(&group.join(", ")));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
    }

    Ok(())
}

fn hard_link_groups(files: &[Scanned]) -> Vec<Vec<String>> {
    let mut groups: Vec<(Fid, Vec<String>)> = Vec::new();

    for file in files.iter().filter(|f| f.links > 1) {
        let Some(fid) = file.fid else { continue };
        let path = file.path.display().to_string();
        match groups.iter_mut().find(|(g, _)| *g == fid) {
            Some((_, paths)) => paths.push(path),
            None => groups.push((fid, vec![path])),
        }
    }

    groups
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(_, mut paths)| {
            paths.sort();
            paths
        })
        .collect()
}
