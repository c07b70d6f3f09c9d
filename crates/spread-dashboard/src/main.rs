//! spread-dashboard: interactive view of how topics propagate across platforms
//!
//! Loads the topic paths, posts and users once, then serves the dashboard
//! over HTTP and, with `--console`, in the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use spread_dashboard::{run_console, DashboardConfig, PlaybackDriver, WebServer};
use spread_data::{load_or_empty, FsFetcher};
use spread_view::Dashboard;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spread-dashboard")]
#[command(about = "Propagation dashboard for multi-platform topic spread", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the data sources (overrides config file)
    #[arg(short, long, env = "SPREAD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP listen address (overrides config file)
    #[arg(long, env = "SPREAD_HTTP_ADDR")]
    http_addr: Option<String>,

    /// Do not start the HTTP server
    #[arg(long)]
    no_http: bool,

    /// Open the terminal console
    #[arg(long)]
    console: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

/// Logs go to stderr, except in console mode where they would corrupt the
/// screen: there they go to `log_file`, or nowhere.
fn init_tracing(config: &DashboardConfig, console: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;

    if !console {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(());
    }

    if let Some(path) = &config.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_path) = DashboardConfig::load(cli.config.as_deref())?;
    let config = config.with_overrides(cli.data_dir, cli.http_addr, cli.no_http);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    init_tracing(&config, cli.console)?;

    match &config_path {
        Some(path) => info!(path = %path.display(), "Loaded config"),
        None => info!("No config file found, using defaults"),
    }
    info!(
        root = %config.data.root.display(),
        topics = %config.data.topics,
        posts = %config.data.posts,
        users = %config.data.users,
        "Loading data sources"
    );

    let fetcher = FsFetcher::new(config.data.root.clone());
    let dataset = load_or_empty(&fetcher, &config.data.sources(), config.data.load_timeout()).await;

    let dashboard = Arc::new(RwLock::new(Dashboard::new(
        Arc::new(dataset),
        config.playback.options(),
    )));

    let driver = PlaybackDriver::new(dashboard.clone(), config.playback.frame());
    tokio::spawn(driver.run());

    if config.http.enabled {
        let server = WebServer::new(
            config.http.bind_addr.clone(),
            dashboard.clone(),
            config.http.web_root.clone(),
        );
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                tracing::error!(error = %e, "HTTP server failed");
            }
        });
    }

    if cli.console {
        run_console(dashboard).await?;
        return Ok(());
    }

    if !config.http.enabled {
        warn!("HTTP disabled and no console requested; nothing can drive the dashboard");
    }
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
