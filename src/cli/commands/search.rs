//! Search command - query the index

use clap::Args;
use serde::Serialize;

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::search::SearchHit;
use crate::core::services::Services;
use crate::core::types::EntityKind;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query (supports boolean operators: AND, OR, NOT)
    pub query: String,

    /// Restrict results to one entity kind
    #[arg(long, short = 't')]
    pub kind: Option<EntityKind>,

    /// Maximum number of results (1-100)
    #[arg(long, short = 'k', default_value = "10")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub total_results: usize,
    pub results: Vec<SearchHit>,
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let limit = args.limit.clamp(1, 100);
    let results = services.search(&args.query, args.kind, limit)?;

    let output = SearchOutput {
        query: args.query,
        total_results: results.len(),
        results,
    };

    match format {
        OutputFormat::Human => {
            if output.results.is_empty() {
                println!("No results found for '{}'", colors::label(&output.query));
                return Ok(());
            }

            println!(
                "Found {} result(s):\n",
                colors::number(&output.total_results.to_string())
            );
            for (i, hit) in output.results.iter().enumerate() {
                let name = hit
                    .document
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                println!(
                    "[{}] {} {} {} {}",
                    colors::rank(&(i + 1).to_string()),
                    colors::kind(&hit.doc_type),
                    hit.id,
                    colors::file_path(name),
                    colors::score(&format!("(score: {:.2})", hit.score))
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
