use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub mod error;
pub mod form;
pub mod handlers;
pub mod sse;

use crate::config::AppConfig;
use crate::credentials::{configured_sources, CredentialResolver, CredentialSource};
use crate::pipeline::AnalysisPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sources: Arc<Vec<Arc<dyn CredentialSource>>>,
    pub pipeline: Arc<AnalysisPipeline>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let sources = configured_sources(&config.secrets_path);
        let pipeline = AnalysisPipeline::from_config(&config)?;
        Ok(Self::with_parts(config, sources, pipeline))
    }

    pub fn with_parts(
        config: AppConfig,
        sources: Vec<Arc<dyn CredentialSource>>,
        pipeline: AnalysisPipeline,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sources: Arc::new(sources),
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn resolver(&self) -> CredentialResolver {
        CredentialResolver::from_sources(self.sources.as_ref().clone())
    }
}

pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.upload_limit_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/session", get(handlers::session))
        .route(
            "/api/credentials/validate",
            post(handlers::validate_credentials),
        )
        .route("/api/analyze", post(handlers::analyze))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}
