//! Serve command - run the file-serving HTTP API

use clap::Args;

use crate::cli::DataArgs;
use crate::core::services::Services;
use crate::http::{self, AppState};

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind host (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides configuration)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    #[command(flatten)]
    pub data: DataArgs,
}

/// Execute the serve command
pub async fn execute(
    args: ServeArgs,
    services: &Services,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = args.host.unwrap_or_else(|| services.config.server.host.clone());
    let port = args.port.unwrap_or(services.config.server.port);

    let app = http::router(AppState::from_services(services));

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("Service ready - Health check at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
