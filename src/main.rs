use clap::Parser;
use dialer_admin_api::cli::{Cli, Commands};
use dialer_admin_api::config::AppConfig;
use dialer_admin_api::database::DatabaseManager;
use dialer_admin_api::middleware::init_tracing;
use dialer_admin_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up DB_* and API_KEY
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = dialer_admin_api::config::config().clone();
    if let Some(port) = cli.port {
        config.api.port = port;
    }

    init_tracing(&config.logging.level);

    match cli.command() {
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::CheckDb => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::close(&pool).await;
            println!("Database connection OK");
            Ok(())
        }
        Commands::Serve => serve(config).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting dialer admin API in {:?} mode", config.environment);

    if config.api.api_key.is_empty() {
        tracing::warn!("API_KEY is not set; every /api/v1 request will be rejected");
    }

    let pool = match DatabaseManager::connect(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Dialer admin API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close(&pool).await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
