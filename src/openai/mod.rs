pub mod stream;
pub mod types;

use std::fmt;
use std::time::Duration;

use anyhow::Context;
use reqwest::{RequestBuilder, Response};
use tracing::debug;

use crate::credentials::Credential;
use crate::error::redact_secrets;

pub use stream::FragmentStream;
pub use types::{ChatCompletionRequest, ChatMessage, ContentPart, ImageUrl};

use types::ErrorEnvelope;

#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "HTTP {code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ApiFailure {}

impl ApiFailure {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ApiFailure {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: redact_secrets(&err.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            probe_timeout: timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, builder: RequestBuilder, credential: &Credential) -> RequestBuilder {
        let mut builder = builder.bearer_auth(credential.api_key());
        if let Some(org) = credential.organization() {
            builder = builder.header("OpenAI-Organization", org);
        }
        if let Some(project) = credential.project() {
            builder = builder.header("OpenAI-Project", project);
        }
        builder
    }

    /// Cheapest authenticated call the service offers; used as a liveness probe.
    pub async fn list_models(&self, credential: &Credential) -> Result<(), ApiFailure> {
        let req = self
            .authorize(self.http.get(self.endpoint("models")), credential)
            .timeout(self.probe_timeout);

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(failure_from_response(resp).await);
        }

        debug!(source = ?credential.source(), "model listing succeeded");
        Ok(())
    }

    pub async fn stream_chat(
        &self,
        credential: &Credential,
        request: &ChatCompletionRequest,
    ) -> Result<FragmentStream, ApiFailure> {
        let req = self
            .authorize(self.http.post(self.endpoint("chat/completions")), credential)
            .json(request);

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(failure_from_response(resp).await);
        }

        Ok(stream::fragments(resp))
    }
}

async fn failure_from_response(resp: Response) -> ApiFailure {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => envelope.error.describe(),
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        Err(_) => body.trim().to_string(),
    };

    ApiFailure {
        status: Some(status.as_u16()),
        message: redact_secrets(&message),
    }
}
