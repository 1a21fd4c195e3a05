//! # Photo Album Server
//!
//! Serves the photo album REST API.
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - PostgreSQL for image and album metadata (in-memory when no database is
//!   configured)
//! - Cloudinary for image storage and delivery

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use photoalbum_core::PostgresDatabase;
use photoalbum_server::{
    Config, create_app,
    infra::startup::build_state,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "photoalbum-server")]
#[command(about = "REST backend for a photo album with favourites and albums")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Run without Cloudinary credentials using an in-memory media host
    #[arg(long, default_value_t = false)]
    dev: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "photoalbum_server=debug,photoalbum_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(&cli.serve)?;

    if let Some(Command::Db(DbCommand::Migrate)) = cli.command {
        return run_db_migrate(&config).await;
    }

    run_server(config).await
}

fn load_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server_host = host;
    }
    if args.dev {
        config.dev_mode = true;
    }
    Ok(config)
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to run migrations")?;
    let db = PostgresDatabase::connect(url, config.database_max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;
    db.migrate().await.context("database migration failed")?;
    info!("Database migrations applied");
    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server_host, config.server_port);

    let state = build_state(config).await?;
    let app = create_app(state);

    info!("Starting photo album server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
