//! mcindex - search indexing and file serving for research data
//!
//! # Examples
//!
//! ```bash
//! # Rebuild the whole index from a record store dump
//! mcindex index --data ./dump
//!
//! # Reindex two samples
//! mcindex index --kind sample s-1 s-2 --data ./dump
//!
//! # Search
//! mcindex search "titanium alloy" --kind datafile
//!
//! # Serve stored files
//! mcindex serve --data ./dump
//! ```

use clap::Parser;
use mcindex::cli::{run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays scriptable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mcindex=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
