//! Output formatting for CLI commands
//!
//! Human-readable or JSON output. Colors respect the NO_COLOR env var.

use crate::cli::OutputFormat;
use crate::core::indexer::IndexReport;

/// Color scheme for CLI output
pub mod colors {
    use colored::{ColoredString, Colorize};

    pub fn label(s: &str) -> ColoredString {
        s.bold()
    }

    /// Style for entity type labels
    pub fn kind(s: &str) -> ColoredString {
        s.cyan()
    }

    pub fn file_path(s: &str) -> ColoredString {
        s.blue()
    }

    pub fn number(s: &str) -> ColoredString {
        s.yellow()
    }

    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    pub fn warning(s: &str) -> ColoredString {
        s.yellow()
    }

    pub fn error(s: &str) -> ColoredString {
        s.red().bold()
    }

    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }

    pub fn score(s: &str) -> ColoredString {
        s.magenta()
    }

    pub fn rank(s: &str) -> ColoredString {
        s.green().bold()
    }
}

/// Format bytes into human-readable size
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}

/// Format a millisecond duration
pub fn format_duration_ms(ms: u64) -> String {
    if ms >= 60_000 {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) as f64 / 1000.0;
        format!("{mins}m {secs:.1}s")
    } else if ms >= 1000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        format!("{ms}ms")
    }
}

/// One line summary of an indexing run
pub fn report_line(report: &IndexReport) -> String {
    let failed = report.failed_ids().len();
    let status = if report.is_complete() {
        colors::success("ok")
    } else {
        colors::error("incomplete")
    };

    format!(
        "{:<9} {} read, {} committed in {} batch(es), {} failed {} [{}]",
        colors::kind(&report.doc_type.to_string()),
        colors::number(&report.total.to_string()),
        colors::number(&report.committed().to_string()),
        report.batches.len(),
        colors::number(&failed.to_string()),
        colors::dim(&format!("({})", format_duration_ms(report.duration_ms))),
        status
    )
}

/// Print reports in the requested format
pub fn print_reports(reports: &[IndexReport], format: OutputFormat) -> serde_json::Result<()> {
    match format {
        OutputFormat::Human => {
            for report in reports {
                println!("{}", report_line(report));
                if let Some(err) = &report.cursor_error {
                    print_warning(&format!("{} read stopped early: {err}", report.doc_type));
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(reports)?),
    }
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{}", colors::success(message));
}

pub fn print_warning(message: &str) {
    eprintln!("{}: {}", colors::warning("Warning"), message);
}

pub fn print_header(title: &str) {
    println!("{}", colors::label(title));
}
