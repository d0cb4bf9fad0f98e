use axum::{
    extract::{Multipart, State},
    response::{
        sse::{KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{
    error::WebError,
    form::AnalyzeForm,
    sse::{event_stream, ChannelSink},
    AppState,
};
use crate::credentials::{check_liveness, ManualEntry, SourceKind};

const INDEX_HTML: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/index.html"));

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub configured: bool,
    pub model: String,
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub live: bool,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub source: SourceKind,
    pub live_checked: bool,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        configured: state.resolver().has_api_key(),
        model: state.config.model.clone(),
        language: state.config.language.clone(),
    })
}

pub async fn validate_credentials(
    State(state): State<AppState>,
    Json(payload): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, WebError> {
    let manual = ManualEntry {
        api_key: payload.api_key.unwrap_or_default(),
        organization: payload.organization,
        project: payload.project,
    };

    let mut credential = state.resolver().with_source(manual).resolve()?;
    credential.check_shape()?;

    if payload.live {
        check_liveness(state.pipeline.client(), &mut credential).await?;
    }

    Ok(Json(ValidateResponse {
        valid: true,
        source: credential.source(),
        live_checked: credential.is_validated(),
    }))
}

pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let form = AnalyzeForm::from_multipart(multipart).await?;

    let credential = state.resolver().with_source(form.manual).resolve()?;
    credential.check_shape()?;
    form.input.preflight()?;

    info!(
        source = ?credential.source(),
        ask_details = form.input.ask_details,
        "analyze triggered"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let pipeline = state.pipeline.clone();
    let input = form.input;

    tokio::spawn(async move {
        let mut sink = ChannelSink::new(tx);
        if let Err(err) = pipeline.analyze(&credential, input, &mut sink).await {
            warn!(code = err.code(), "analysis ended with error");
            sink.fail(&err);
        }
    });

    Ok(Sse::new(event_stream(rx))
        .keep_alive(KeepAlive::default())
        .into_response())
}
