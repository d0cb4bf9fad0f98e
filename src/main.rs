use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vision_describe::{
    config::AppConfig,
    web::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("🚀 Starting image description server...");

    // -----------------------------
    // Shared state
    // -----------------------------
    let config = AppConfig::from_env();
    let state = AppState::new(config).context("Failed to initialise application state")?;

    info!(
        model = state.config.model.as_str(),
        api_base = state.pipeline.client().base_url(),
        language = state.config.language.as_str(),
        key_configured = state.resolver().has_api_key(),
        "configuration loaded"
    );

    let addr = state.config.bind_addr.clone();
    let app = web::router(state);

    println!("🌐 HTTP listening on http://{addr}");
    println!("🛠 Analyze endpoint at http://{addr}/api/analyze");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
