use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Process settings, read once at startup.
///
/// Every value comes from the environment (a `.env` file counts) and has a default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub language: String,
    pub secrets_path: PathBuf,
    pub upload_limit_bytes: usize,
    /// Bounds connecting and the liveness probe. Also the longest silence allowed
    /// between two reads of a streamed response.
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            api_base: "https://api.openai.com/v1".into(),
            model: "gpt-4o".into(),
            max_tokens: 1200,
            language: "es".into(),
            secrets_path: PathBuf::from("config/secrets.toml"),
            upload_limit_bytes: 20 * 1024 * 1024,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |name: &str, fallback: String| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        let upload_mb: usize = parse_or(&lookup, "VISION_UPLOAD_LIMIT_MB", 20);
        let timeout_secs: u64 = parse_or(
            &lookup,
            "VISION_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        );

        Self {
            bind_addr: text("VISION_BIND", defaults.bind_addr),
            api_base: text("OPENAI_BASE_URL", defaults.api_base),
            model: text("VISION_MODEL", defaults.model),
            max_tokens: parse_or(&lookup, "VISION_MAX_TOKENS", defaults.max_tokens),
            language: text("VISION_LANGUAGE", defaults.language),
            secrets_path: PathBuf::from(text(
                "VISION_SECRETS_FILE",
                defaults.secrets_path.to_string_lossy().into_owned(),
            )),
            upload_limit_bytes: upload_mb.max(1).saturating_mul(1024 * 1024),
            request_timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            warn!(name, value = raw.as_str(), "unparseable setting, using default");
            default
        }),
        _ => default,
    }
}
