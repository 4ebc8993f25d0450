//! Sync command - replay record-store changes against the index
//!
//! Reads a change feed as JSON lines, one entry per line:
//!
//! ```text
//! {"table": "datafiles", "old_val": null, "new_val": {"id": "abc-defg-456", ...}}
//! ```

use clap::Args;
use serde::Deserialize;
use serde_json::Value;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use crate::cli::output::{print_reports, print_warning};
use crate::cli::{DataArgs, OutputFormat};
use crate::core::services::Services;
use crate::core::sync::ChangeEvent;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Change feed file; `-` reads stdin
    pub feed: PathBuf,

    #[command(flatten)]
    pub data: DataArgs,
}

/// One change-feed entry
#[derive(Debug, Deserialize)]
pub struct FeedEntry {
    pub table: String,
    #[serde(default)]
    pub old_val: Value,
    #[serde(default)]
    pub new_val: Value,
}

/// Parse a change feed, skipping blank lines and tables that do not
/// affect the index
pub fn parse_feed(reader: impl BufRead) -> Result<Vec<ChangeEvent>, Box<dyn std::error::Error>> {
    let mut events = Vec::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: FeedEntry = serde_json::from_str(&line)
            .map_err(|e| format!("Invalid change feed entry on line {}: {e}", n + 1))?;

        match ChangeEvent::from_feed(&entry.table, &entry.old_val, &entry.new_val) {
            Some(event) => events.push(event),
            None => tracing::debug!(table = %entry.table, line = n + 1, "Ignoring change"),
        }
    }

    Ok(events)
}

/// Execute the sync command
pub async fn execute(
    args: SyncArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let events = if args.feed.as_os_str() == "-" {
        parse_feed(io::stdin().lock())?
    } else {
        parse_feed(BufReader::new(std::fs::File::open(&args.feed)?))?
    };

    let services = services.clone();
    let reports = tokio::task::spawn_blocking(move || {
        let mut reports = Vec::new();
        for event in &events {
            match services.apply_change(event) {
                Ok(r) => reports.extend(r),
                Err(e) => print_warning(&format!("Change {event:?} not applied: {e}")),
            }
        }
        reports
    })
    .await?;

    print_reports(&reports, format)?;
    Ok(())
}
