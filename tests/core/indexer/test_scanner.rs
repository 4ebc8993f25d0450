// Integration tests for the concurrent directory scanner

use mcindex::core::error::IndexError;
use mcindex::core::indexer::{CancelToken, DirectoryScanner};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn content_tree(files: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    for i in 0..files {
        let shard = dir.path().join(format!("{:02}", i % 7)).join(format!("{:02}", i % 3));
        fs::create_dir_all(&shard).unwrap();
        fs::write(shard.join(format!("abc-{i:04}-x")), format!("bytes {i}")).unwrap();
    }
    dir
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap().to_path_buf()
}

#[test]
fn test_every_file_processed_once_across_workers() {
    let tree = content_tree(200);
    let scanner = DirectoryScanner::new(4, vec![]).unwrap();

    let (paths, error) = scanner
        .scan(tree.path(), &CancelToken::new(), |entry| entry.path)
        .collect();

    assert!(error.is_none());
    assert_eq!(paths.len(), 200);
    let unique: HashSet<_> = paths.iter().collect();
    assert_eq!(unique.len(), 200);
}

#[test]
fn test_process_sees_metadata() {
    let tree = content_tree(5);
    let scanner = DirectoryScanner::new(2, vec![]).unwrap();

    let (sizes, _) = scanner
        .scan(tree.path(), &CancelToken::new(), |entry| entry.metadata.len())
        .collect();

    assert_eq!(sizes.len(), 5);
    assert!(sizes.iter().all(|s| *s == 7));
}

#[test]
fn test_excluded_directories_are_pruned() {
    let tree = content_tree(30);
    fs::create_dir_all(tree.path().join("upload/u-1")).unwrap();
    fs::write(tree.path().join("upload/u-1/partial"), b"...").unwrap();
    fs::create_dir_all(tree.path().join("00/00/.conversion")).unwrap();
    fs::write(tree.path().join("00/00/.conversion/abc-0000-x.jpg"), b"jpg").unwrap();

    let scanner =
        DirectoryScanner::new(3, vec!["upload".to_string(), ".conversion".to_string()]).unwrap();
    let root = tree.path().to_path_buf();
    let (paths, error) = scanner
        .scan(tree.path(), &CancelToken::new(), move |entry| relative(&root, &entry.path))
        .collect();

    assert!(error.is_none());
    assert_eq!(paths.len(), 30);
    assert!(paths.iter().all(|p| !p.starts_with("upload")));
    assert!(paths
        .iter()
        .all(|p| !p.components().any(|c| c.as_os_str() == ".conversion")));
}

#[test]
fn test_cancel_mid_scan_stops_traversal() {
    let tree = content_tree(500);
    let scanner = DirectoryScanner::new(1, vec![]).unwrap();
    let token = CancelToken::new();
    let seen = Arc::new(AtomicUsize::new(0));

    let worker_token = token.clone();
    let worker_seen = Arc::clone(&seen);
    let scan = scanner.scan(tree.path(), &token, move |entry| {
        if worker_seen.fetch_add(1, Ordering::SeqCst) == 10 {
            worker_token.cancel();
        }
        std::thread::sleep(Duration::from_millis(1));
        entry.path
    });

    let (paths, error) = scan.collect();

    assert!(matches!(error, Some(IndexError::Cancelled)));
    assert!(token.is_cancelled());
    assert!(paths.len() < 500, "scan ran to completion: {}", paths.len());
    assert_eq!(paths.len(), seen.load(Ordering::SeqCst));
}

#[test]
fn test_results_can_be_consumed_while_scanning() {
    let tree = content_tree(50);
    let scanner = DirectoryScanner::new(2, vec![]).unwrap();

    let scan = scanner.scan(tree.path(), &CancelToken::new(), |entry| entry.path);
    let streamed = scan.results.iter().count();

    assert_eq!(streamed, 50);
    assert!(scan.errors.try_recv().is_err());
}
