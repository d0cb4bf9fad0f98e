use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use inquire::{Password, PasswordDisplayMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vision_describe::{
    config::AppConfig,
    credentials::{check_liveness, configured_sources, CredentialResolver, ManualEntry},
    pipeline::{AnalysisInput, AnalysisPipeline, RenderSink, UploadedImage, CURSOR},
};

#[derive(Debug, Parser)]
#[command(name = "describe_cli", about = "Describe an image with a vision-capable model")]
struct Args {
    /// JPEG or PNG file to describe
    image: PathBuf,

    /// Extra context or a specific question about the image
    #[arg(short, long)]
    question: Option<String>,

    /// Confirm the API key with the service before analyzing
    #[arg(long)]
    check: bool,

    /// Response language (`es`, `en`)
    #[arg(short, long)]
    language: Option<String>,
}

/// Prints only what is new since the previous rendering.
#[derive(Default)]
struct TerminalSink {
    printed: usize,
}

impl TerminalSink {
    fn emit(&mut self, text: &str) {
        if let Some(fresh) = text.get(self.printed..) {
            print!("{fresh}");
            let _ = io::stdout().flush();
        }
        self.printed = text.len();
    }
}

impl RenderSink for TerminalSink {
    fn interim(&mut self, rendered: &str) {
        self.emit(rendered.strip_suffix(CURSOR).unwrap_or(rendered));
    }

    fn finalize(&mut self, text: &str) {
        self.emit(text);
        println!();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(language) = args.language {
        config.language = language;
    }

    let mut resolver = CredentialResolver::from_sources(configured_sources(&config.secrets_path));
    if !resolver.has_api_key() && io::stdin().is_terminal() {
        let key = Password::new("OpenAI API key:")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .with_help_message("Add OPENAI_API_KEY to the secrets file to skip this prompt")
            .prompt()
            .context("Failed to read API key")?;
        resolver = resolver.with_source(ManualEntry::new(key));
    }

    let mut credential = resolver.resolve()?;
    credential.check_shape()?;

    let pipeline = AnalysisPipeline::from_config(&config)?;
    if args.check {
        check_liveness(pipeline.client(), &mut credential).await?;
        eprintln!("✅ API key accepted");
    }

    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read image {}", args.image.display()))?;
    let filename = args
        .image
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned);

    let input = AnalysisInput {
        image: Some(UploadedImage::new(bytes, filename, None)),
        ask_details: args.question.is_some(),
        details: args.question.unwrap_or_default(),
    };

    let mut sink = TerminalSink::default();
    pipeline.analyze(&credential, input, &mut sink).await?;

    Ok(())
}
