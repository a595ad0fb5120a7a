use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use branchdesk::config::Settings;
use branchdesk::server::start_server;

#[derive(Parser)]
#[command(name = "branchdesk")]
#[command(version, about = "Live bank branch admin console")]
pub struct Cli {
    /// Port to serve on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind (e.g. 0.0.0.0 to expose on the network)
    #[arg(long)]
    pub bind: Option<String>,

    /// Path to a settings file. If not provided, ./branchdesk.toml is used when present
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Open the browser once the server is up
    #[arg(long)]
    pub open: bool,

    /// Development mode: permissive CORS for external tooling
    #[arg(long)]
    pub dev: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_cli(cli.port, cli.bind, cli.open, cli.dev);
    debug!(?settings, "resolved settings");

    // Spawn browser open before starting the server (which blocks)
    if settings.open_browser {
        let url = format!("http://{}:{}", browse_host(&settings.bind), settings.port);
        tokio::spawn(async move {
            // Small delay to let the server start binding
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                eprintln!("Failed to open browser: {}", e);
            }
        });
    }

    start_server(settings).await
}

/// Wildcard binds aren't browsable; send the browser to loopback instead.
fn browse_host(bind: &str) -> &str {
    match bind {
        "0.0.0.0" | "::" | "[::]" => "localhost",
        other => other,
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
