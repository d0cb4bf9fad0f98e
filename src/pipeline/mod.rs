mod assembler;
mod image;
mod prompt;

use futures_util::StreamExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::credentials::{Credential, CredentialResolver};
use crate::error::{classify_inference_failure, AppError};
use crate::openai::{ChatCompletionRequest, OpenAiClient};
use crate::prompts::{prompts_for, PromptSet};

pub use assembler::{RenderSink, StreamAssembler, CURSOR};
pub use image::UploadedImage;
pub use prompt::{build_request, compose_prompt};

/// What the user supplied for one "analyze" action.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub image: Option<UploadedImage>,
    pub ask_details: bool,
    pub details: String,
}

impl AnalysisInput {
    /// Local checks that must pass before anything is sent.
    pub fn preflight(&self) -> Result<&UploadedImage, AppError> {
        let image = self
            .image
            .as_ref()
            .filter(|img| !img.is_empty())
            .ok_or(AppError::MissingImage)?;
        image.media_type()?;
        Ok(image)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub max_tokens: u32,
    pub language: String,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            language: config.language.clone(),
        }
    }

    pub fn prompts(&self) -> &'static PromptSet {
        prompts_for(Some(self.language.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub text: String,
    pub fragments: usize,
}

pub struct AnalysisPipeline {
    client: OpenAiClient,
    settings: PipelineSettings,
}

impl AnalysisPipeline {
    pub fn new(client: OpenAiClient, settings: PipelineSettings) -> Self {
        Self { client, settings }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = OpenAiClient::new(config.api_base.clone(), config.request_timeout)?;
        Ok(Self::new(client, PipelineSettings::from_config(config)))
    }

    pub fn client(&self) -> &OpenAiClient {
        &self.client
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn build_request(&self, input: &AnalysisInput) -> Result<ChatCompletionRequest, AppError> {
        let image = input.preflight()?;
        let prompt = compose_prompt(self.settings.prompts(), input.ask_details, &input.details);
        Ok(build_request(
            &self.settings.model,
            self.settings.max_tokens,
            prompt,
            image.data_uri()?,
        ))
    }

    pub async fn resolve_and_analyze<S>(
        &self,
        resolver: &CredentialResolver,
        input: AnalysisInput,
        sink: &mut S,
    ) -> Result<Analysis, AppError>
    where
        S: RenderSink + ?Sized,
    {
        let credential = resolver.resolve()?;
        credential.check_shape()?;
        self.analyze(&credential, input, sink).await
    }

    /// Stream a description of the uploaded image into `sink`.
    ///
    /// Fragments are appended in arrival order and each append produces one interim
    /// rendering. Once the stream is open the sink is finalized exactly once, also when
    /// the stream fails part way.
    pub async fn analyze<S>(
        &self,
        credential: &Credential,
        input: AnalysisInput,
        sink: &mut S,
    ) -> Result<Analysis, AppError>
    where
        S: RenderSink + ?Sized,
    {
        let request_id = Uuid::new_v4().to_string();
        let request = self.build_request(&input)?;

        info!(
            request_id = request_id.as_str(),
            source = ?credential.source(),
            model = self.settings.model.as_str(),
            image_bytes = input.image.as_ref().map(|i| i.len()).unwrap_or_default(),
            with_context = input.ask_details && !input.details.trim().is_empty(),
            "analysis started"
        );

        let mut stream = match self.client.stream_chat(credential, &request).await {
            Ok(stream) => stream,
            Err(failure) => {
                let err = classify_inference_failure(&failure);
                warn!(
                    request_id = request_id.as_str(),
                    code = err.code(),
                    status = failure.status,
                    "analysis request failed"
                );
                return Err(err);
            }
        };

        let mut assembler = StreamAssembler::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    if assembler.push(&fragment) {
                        sink.interim(&assembler.interim());
                    }
                }
                Err(failure) => {
                    sink.finalize(assembler.text());
                    let err = classify_inference_failure(&failure);
                    warn!(
                        request_id = request_id.as_str(),
                        code = err.code(),
                        fragments = assembler.fragments(),
                        "analysis stream failed"
                    );
                    return Err(err);
                }
            }
        }

        sink.finalize(assembler.text());
        info!(
            request_id = request_id.as_str(),
            fragments = assembler.fragments(),
            chars = assembler.text().chars().count(),
            "analysis finished"
        );

        let fragments = assembler.fragments();
        Ok(Analysis {
            text: assembler.finish(),
            fragments,
        })
    }
}
