use std::net::SocketAddr;
use std::path::PathBuf;

use axum::middleware;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fileshare::{fsutil, handlers, routes, AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "fileshare")]
#[command(about = "Share a directory over HTTP with listings and zip downloads")]
#[command(version)]
struct Cli {
    /// Directory to serve (overrides the config file)
    #[arg(short, long, env = "FILESHARE_DIR")]
    dir: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "FILESHARE_PORT")]
    port: Option<u16>,

    /// Config file path
    #[arg(short, long, env = "FILESHARE_CONFIG", default_value = "fileshare.yaml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, env = "FILESHARE_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "fileshare=debug,tower_http=debug"
    } else {
        "fileshare=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Config file settings, overridden by CLI flags
    let config = Config::load(&cli.config)?.apply_overrides(cli.dir, cli.port);

    // Make sure the root exists, then pin it to its canonical path
    std::fs::create_dir_all(&config.directory)?;
    let root_dir = std::fs::canonicalize(&config.directory)?;
    if !root_dir.is_dir() {
        return Err(format!("Root path is not a directory: {}", root_dir.display()).into());
    }

    let port = config.port;
    let state = AppState::with_config(root_dir.clone(), config);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = routes::file_routes()
        .layer(middleware::from_fn(handlers::log_request))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Serving files from: {}", root_dir.display());
    info!("Local addresses:");
    info!("  http://localhost:{port}");
    match fsutil::local_ipv4_addrs() {
        Ok(ips) => {
            for ip in ips {
                info!("  http://{ip}:{port}");
            }
        }
        Err(err) => warn!("Could not determine local IP addresses: {err}"),
    }

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
