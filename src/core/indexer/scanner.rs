//! Concurrent directory scanner.
//!
//! One traversal thread walks the tree and hands every regular file
//! to a bounded channel. `workers` threads pull entries from that
//! channel, run the caller's `process` function and push results to a
//! shared results channel. The results channel closes only after
//! every worker has exited.
//!
//! ```text
//! walker ──bounded(workers)──> worker 1..N ──unbounded──> results
//!    └───────────bounded(1)──────────────────────────> errors
//! ```

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use glob::Pattern;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use walkdir::{DirEntry, WalkDir};

use super::cancel::CancelToken;
use crate::core::config::ScannerConfig;
use crate::core::error::{IndexError, Result};

/// Filesystem identity of an entry (device and inode).
///
/// Supports equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fid {
    dev: u64,
    ino: u64,
}

impl Fid {
    #[cfg(unix)]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// A regular file found by the scanner
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub metadata: Metadata,
    pub fid: Option<Fid>,
}

/// Handles to a running scan
pub struct Scan<R> {
    /// Closed once every worker has finished
    pub results: Receiver<R>,
    /// Receives at most one traversal error
    pub errors: Receiver<IndexError>,
    handles: Vec<JoinHandle<()>>,
}

impl<R> Scan<R> {
    /// Wait for the scan to finish, returning all results and the
    /// traversal error if one occurred
    pub fn collect(self) -> (Vec<R>, Option<IndexError>) {
        let results: Vec<R> = self.results.iter().collect();
        for handle in self.handles {
            if handle.join().is_err() {
                tracing::error!("Scanner thread panicked");
            }
        }
        let error = self.errors.try_recv().ok();
        (results, error)
    }
}

/// Bounded-worker tree walker
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    workers: usize,
    exclude_patterns: Vec<Pattern>,
}

impl DirectoryScanner {
    /// Create a scanner
    ///
    /// # Arguments
    ///
    /// * `workers` - Number of worker threads (at least one)
    /// * `exclude_patterns` - Glob patterns; matching directories are
    ///   pruned and matching files skipped
    pub fn new(workers: usize, exclude_patterns: Vec<String>) -> Result<Self> {
        if workers == 0 {
            return Err(IndexError::Config(
                "Scanner needs at least one worker".to_string(),
            ));
        }

        let exclude = exclude_patterns
            .into_iter()
            .map(|p| {
                Pattern::new(&p).map_err(|e| {
                    IndexError::Config(format!("Invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            workers,
            exclude_patterns: exclude,
        })
    }

    pub fn from_config(config: &ScannerConfig) -> Result<Self> {
        Self::new(config.workers, config.exclude_patterns.clone())
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Start scanning `root`, calling `process` once per regular file.
    ///
    /// Returns immediately; consume [`Scan::results`] or call
    /// [`Scan::collect`]. Cancelling `token` stops the traversal and
    /// delivers [`IndexError::Cancelled`] on the error channel. Entries
    /// already handed to workers are still processed.
    pub fn scan<R, F>(&self, root: &Path, token: &CancelToken, process: F) -> Scan<R>
    where
        R: Send + 'static,
        F: Fn(FileEntry) -> R + Send + Sync + 'static,
    {
        let (entry_tx, entry_rx) = bounded::<FileEntry>(self.workers);
        let (error_tx, error_rx) = bounded::<IndexError>(1);
        let (result_tx, result_rx) = unbounded::<R>();

        let mut handles = Vec::with_capacity(self.workers + 1);

        let walker = {
            let root = root.to_path_buf();
            let exclude = self.exclude_patterns.clone();
            let token = token.clone();
            thread::spawn(move || {
                if let Err(e) = walk(&root, &exclude, &token, &entry_tx) {
                    tracing::warn!(root = ?root, "Scan stopped: {}", e);
                    let _ = error_tx.send(e);
                }
            })
        };
        handles.push(walker);

        let process = Arc::new(process);
        for _ in 0..self.workers {
            let rx = entry_rx.clone();
            let tx = result_tx.clone();
            let process = Arc::clone(&process);
            handles.push(thread::spawn(move || {
                while let Ok(entry) = rx.recv() {
                    if tx.send(process(entry)).is_err() {
                        break;
                    }
                }
            }));
        }

        drop(entry_rx);
        drop(result_tx);

        Scan {
            results: result_rx,
            errors: error_rx,
            handles,
        }
    }
}

fn walk(
    root: &Path,
    exclude: &[Pattern],
    token: &CancelToken,
    tx: &Sender<FileEntry>,
) -> Result<()> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_excluded(e, root, exclude));

    for entry in walker {
        if token.is_cancelled() {
            return Err(IndexError::Cancelled);
        }

        let entry = entry.map_err(|e| IndexError::Walk(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry
            .metadata()
            .map_err(|e| IndexError::Walk(e.to_string()))?;
        let file = FileEntry {
            path: entry.into_path(),
            fid: Fid::from_metadata(&metadata),
            metadata,
        };

        select! {
            send(tx, file) -> sent => {
                if sent.is_err() {
                    return Ok(());
                }
            }
            recv(token.signal()) -> _ => return Err(IndexError::Cancelled),
        }
    }

    Ok(())
}

/// Whether an entry matches an exclude pattern; the root never does
fn is_excluded(entry: &DirEntry, root: &Path, exclude: &[Pattern]) -> bool {
    let path = entry.path();
    if path == root || exclude.is_empty() {
        return false;
    }

    let relative = path.strip_prefix(root).unwrap_or(path);
    let name = entry.file_name().to_str().unwrap_or_default();

    let excluded = exclude
        .iter()
        .any(|p| p.matches_path(relative) || p.matches_path(path) || p.matches(name));
    if excluded {
        tracing::debug!(path = ?path, "Skipping excluded entry");
    }
    excluded
}
