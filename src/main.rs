use quote_monitor::{create_router, AppConfig, AppState, FinnhubClient, HistoryStore, Scheduler};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quote_monitor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    let client = FinnhubClient::from_config(&config)?;
    if !client.has_credential() {
        tracing::warn!("⚠️  FINNHUB_API_KEY (or API_KEY) not set; every fetch will fail; set it and restart the service");
    }
    if config.request_timeout.is_none() {
        tracing::debug!("No outbound request timeout configured");
    }

    // One store and one scheduler for the whole process
    let store = Arc::new(HistoryStore::new());
    let scheduler = Arc::new(Scheduler::new(Arc::new(client), Arc::clone(&store)));

    let app = create_router(AppState::new(Arc::clone(&scheduler)));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("🚀 Quote monitor running on http://{}", config.bind_addr);
    tracing::info!("📊 Health check: http://{}/health", config.bind_addr);
    tracing::info!("📚 Swagger UI: http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let cancelled = scheduler.shutdown();
    tracing::info!(cancelled, "Shutdown complete, cancelled {} monitor(s)", cancelled);

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
