use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::openai::ApiFailure;

/// Why a credential was refused. Never carries the secret itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialRejection {
    Empty,
    UnknownPrefix,
    TooShort,
    Rejected,
}

impl fmt::Display for CredentialRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CredentialRejection::Empty => "the key is empty",
            CredentialRejection::UnknownPrefix => "the key does not start with a known prefix",
            CredentialRejection::TooShort => "the key is too short",
            CredentialRejection::Rejected => "the service rejected the key",
        };
        f.write_str(text)
    }
}

/// Every failure an analyze or validate action can end in.
///
/// All variants are terminal for the current action; nothing retries them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("no API key available: enter one or configure OPENAI_API_KEY in the secrets file")]
    MissingCredential,

    #[error("invalid API key ({0}): re-enter it or update the configured secret")]
    InvalidCredential(CredentialRejection),

    #[error("the API key is not allowed to use this resource: check the organization and project identifiers")]
    InsufficientPermission(String),

    #[error("the account has no remaining quota: check the billing status")]
    InsufficientQuota,

    #[error("upload an image before analyzing")]
    MissingImage,

    #[error("unsupported image type `{0}`: upload a JPEG or PNG file")]
    UnsupportedImage(String),

    #[error("could not verify the API key: {0}")]
    UnknownAuthError(String),

    #[error("the analysis failed: {0}")]
    UnknownError(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingCredential => "missing_credential",
            AppError::InvalidCredential(_) => "invalid_credential",
            AppError::InsufficientPermission(_) => "insufficient_permission",
            AppError::InsufficientQuota => "insufficient_quota",
            AppError::MissingImage => "missing_image",
            AppError::UnsupportedImage(_) => "unsupported_image",
            AppError::UnknownAuthError(_) => "unknown_auth_error",
            AppError::UnknownError(_) => "unknown_error",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            AppError::InsufficientPermission(detail)
            | AppError::UnknownAuthError(detail)
            | AppError::UnknownError(detail) => Some(detail.as_str()),
            _ => None,
        }
    }

    /// True for failures detected locally, before any network call.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            AppError::MissingCredential
                | AppError::MissingImage
                | AppError::UnsupportedImage(_)
                | AppError::InvalidCredential(
                    CredentialRejection::Empty
                        | CredentialRejection::UnknownPrefix
                        | CredentialRejection::TooShort
                )
        )
    }
}

static AUTH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)invalid[_ ]api[_ ]key|incorrect api key|authentication|unauthori[sz]ed")
        .expect("invalid auth pattern")
});

static QUOTA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)quota|billing").expect("invalid quota pattern"));

static PERMISSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)organi[sz]ation|project|permission").expect("invalid permission pattern")
});

static SECRET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sk-[A-Za-z0-9_\-\*]{4,}").expect("invalid secret pattern"));

pub fn redact_secrets(text: &str) -> String {
    SECRET_PATTERN.replace_all(text, "sk-***").into_owned()
}

/// Classify a failed liveness probe.
///
/// A 401 whose text names the organization or project means the key itself is fine
/// but the identifiers sent with it are not, so it is a permission problem.
pub fn classify_liveness_failure(failure: &ApiFailure) -> AppError {
    let text = failure.to_string();
    let mentions_scope = PERMISSION_PATTERN.is_match(&text);

    match failure.status {
        Some(401) if !mentions_scope => AppError::InvalidCredential(CredentialRejection::Rejected),
        Some(401) | Some(403) => AppError::InsufficientPermission(redact_secrets(&text)),
        _ if mentions_scope => AppError::InsufficientPermission(redact_secrets(&text)),
        _ => AppError::UnknownAuthError(redact_secrets(&text)),
    }
}

pub fn classify_inference_failure(failure: &ApiFailure) -> AppError {
    let text = failure.to_string();

    if failure.status == Some(401) || AUTH_PATTERN.is_match(&text) {
        AppError::InvalidCredential(CredentialRejection::Rejected)
    } else if QUOTA_PATTERN.is_match(&text) {
        AppError::InsufficientQuota
    } else {
        AppError::UnknownError(redact_secrets(&text))
    }
}
