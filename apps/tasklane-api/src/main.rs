use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tasklane_api::config::{ApiConfig, ConfigSource};
use tasklane_api::{AppState, app};

const DEFAULT_LOG_FILTER: &str = "tasklane_api=debug,tasklane_db=debug,tower_http=info,sqlx=warn";

#[derive(Parser)]
#[command(name = "tasklane-api")]
#[command(about = "Activity and todo REST service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply migrations and start the HTTP server (default)
    Serve,
    /// Apply migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }

    let cli = Cli::parse();
    let (config, source) = ApiConfig::load()?;
    let _guard = init_tracing(config.log_dir.as_deref());

    match &source {
        ConfigSource::File(path) => info!("Loaded config from {}", path),
        ConfigSource::Environment => info!("Loaded config from environment"),
    }

    let pool = tasklane_db::connect(&config.database_url, config.max_connections).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Migrate => {
            info!("Migrations applied");
        }
        Commands::Serve => serve(pool, &config).await?,
    }

    Ok(())
}

async fn serve(pool: sqlx::PgPool, config: &ApiConfig) -> Result<()> {
    let router = app(AppState::from_pool(pool));

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(log_dir: Option<&str>) -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tasklane-api.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                ),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
