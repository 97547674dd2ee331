use anyhow::{Context, Result};
use prediction_market_matcher::{
    build_router, AppContext, FilePickStore, KalshiClient, MarketCatalog, PreviewService,
    RequestSigner, Settings, StaticTierVerifier,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting prediction market matcher");

    let config_path = std::env::var("PICKS_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let settings = Settings::load(Some(&config_path))?;
    info!("Loaded settings: {:?}", settings);

    // Exchange client with signed requests
    let signer = RequestSigner::new(
        settings.exchange.api_key_id.clone(),
        &settings.exchange.private_key,
    );
    if !signer.is_configured() {
        warn!("⚠️ KALSHI_API_KEY_ID / KALSHI_PRIVATE_KEY not set - previews will report the exchange as not configured");
    }
    let exchange = KalshiClient::with_base_url(
        signer,
        &settings.exchange.base_url,
        settings.request_timeout(),
    );

    if settings.admin.secret.is_empty() {
        warn!("⚠️ No admin secret configured - every admin request will be rejected");
    }

    let catalog = MarketCatalog::new(settings.catalog_config()?);
    let preview = PreviewService::new(
        Arc::new(FilePickStore::new(&settings.picks.dir)),
        Arc::new(exchange),
        catalog,
        settings.preview_settings(),
    );

    let state = Arc::new(AppContext {
        preview,
        verifier: Arc::new(StaticTierVerifier::new(settings.subscribers.clone())),
        admin_secret: settings.admin.secret.clone(),
        utc_offset_hours: settings.preview.utc_offset_hours,
    });

    let listener = tokio::net::TcpListener::bind(&settings.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server.bind_addr))?;
    info!("Listening on {}", settings.server.bind_addr);

    axum::serve(listener, build_router(state))
        .await
        .context("Server error")?;

    Ok(())
}
