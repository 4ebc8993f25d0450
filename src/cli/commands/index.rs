//! Index command - rebuild or refresh the search index

use clap::Args;

use crate::cli::output::{print_reports, print_success};
use crate::cli::{DataArgs, OutputFormat};
use crate::core::indexer::{IndexReport, Scope};
use crate::core::services::Services;
use crate::core::types::EntityKind;

/// Arguments for the index command
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Entity kind to index (datafile, sample, process, project, user).
    /// All kinds when omitted.
    #[arg(long, short = 'k')]
    pub kind: Option<EntityKind>,

    #[command(flatten)]
    pub data: DataArgs,

    /// Only index these ids (requires --kind)
    pub ids: Vec<String>,
}

/// Execute the index command
pub async fn execute(
    args: IndexArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.kind.is_none() && !args.ids.is_empty() {
        return Err("Indexing specific ids requires --kind".into());
    }

    let services = services.clone();
    let reports: Vec<IndexReport> = tokio::task::spawn_blocking(move || match args.kind {
        Some(kind) => services.index(kind, &Scope::from_ids(args.ids)).map(|r| vec![r]),
        None => services.index_all(),
    })
    .await??;

    print_reports(&reports, format)?;

    let incomplete: Vec<String> = reports
        .iter()
        .filter(|r| !r.is_complete())
        .map(|r| r.doc_type.to_string())
        .collect();

    if !incomplete.is_empty() {
        return Err(format!("Indexing incomplete for: {}", incomplete.join(", ")).into());
    }

    if format == OutputFormat::Human {
        let total: usize = reports.iter().map(IndexReport::committed).sum();
        print_success(&format!("Indexed {total} document(s)"));
    }

    Ok(())
}
