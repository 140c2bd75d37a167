mod config;
mod error;
mod handlers;
mod models;
mod services;

#[cfg(feature = "http-server")]
mod api; // POST /api/analyze

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::AnalyzeHandler;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables first so RUST_LOG can come from .env
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("🚀 Starting Nutrition Analyzer...");

    // A missing credential stops the process here, before any traffic is accepted.
    let config = Config::from_env()?;
    log::debug!("Loaded configuration: {:?}", config);

    let model = config.build_model_service();
    log::info!(
        "✅ {} model service initialized with model: {}",
        config.provider,
        config.model
    );

    let analyze_handler = Arc::new(AnalyzeHandler::new(model));

    #[cfg(feature = "http-server")]
    {
        let cors = api::cors_layer(config.frontend_url.as_deref())?;
        let app = api::create_router(analyze_handler, cors);

        let addr = format!("0.0.0.0:{}", config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        log::info!("🌐 Server running on http://localhost:{}", config.port);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl+C: {}", e);
                }
                log::info!("🛑 Shutting down...");
            })
            .await?;
    }

    #[cfg(not(feature = "http-server"))]
    {
        let _ = analyze_handler;
        log::warn!("⚠️ Built without the http-server feature, nothing to serve");
    }

    Ok(())
}
