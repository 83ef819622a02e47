use clap::Parser;
use tracing_subscriber::EnvFilter;

use stylepreview::config::ServerConfig;
use stylepreview::server;

/// Serve a live-reloading preview page for a built stylesheet.
#[derive(Parser)]
#[command(name = "stylepreview")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Stylesheet to inject into the preview page (URL path or file path)
    stylesheet: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::new(cli.stylesheet)?;
    server::serve(config).await
}
