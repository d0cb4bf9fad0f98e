//! Credential resolution and validation.
//!
//! Sources are tried in a fixed order (secrets file, environment, manual entry) and the
//! first non-empty normalized value wins. A manual entry therefore never overrides a
//! configured secret; it only fills in when nothing is configured.

mod liveness;
mod normalize;
mod shape;
mod sources;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AppError;

pub use liveness::check_liveness;
pub use normalize::normalize_secret;
pub use shape::{check_shape, KNOWN_PREFIXES, MIN_KEY_LEN};
pub use sources::{EnvSource, ManualEntry, SecretsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    SecretsStore,
    Environment,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    ApiKey,
    Organization,
    Project,
}

impl CredentialField {
    pub const ALL: [CredentialField; 3] = [
        CredentialField::ApiKey,
        CredentialField::Organization,
        CredentialField::Project,
    ];

    /// Names a source may store this field under, preferred first.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            CredentialField::ApiKey => &["OPENAI_API_KEY"],
            CredentialField::Organization => &["OPENAI_ORG_ID", "OPENAI_ORGANIZATION"],
            CredentialField::Project => &["OPENAI_PROJECT_ID", "OPENAI_PROJECT"],
        }
    }
}

/// One place a credential can come from. Lookups are pure and never fail:
/// an absent value is simply `None`.
pub trait CredentialSource: Send + Sync {
    fn kind(&self) -> SourceKind;
    fn lookup(&self, field: CredentialField) -> Option<String>;
}

#[derive(Clone)]
pub struct Credential {
    api_key: String,
    organization: Option<String>,
    project: Option<String>,
    source: SourceKind,
    validated: bool,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"<redacted>")
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("source", &self.source)
            .field("validated", &self.validated)
            .finish()
    }
}

impl Credential {
    pub fn new(api_key: &str, source: SourceKind) -> Self {
        Self {
            api_key: normalize_secret(api_key),
            organization: None,
            project: None,
            source,
            validated: false,
        }
    }

    pub fn with_organization(mut self, organization: Option<String>) -> Self {
        self.organization = organization.map(|o| normalize_secret(&o)).filter(|o| !o.is_empty());
        self
    }

    pub fn with_project(mut self, project: Option<String>) -> Self {
        self.project = project.map(|p| normalize_secret(&p)).filter(|p| !p.is_empty());
        self
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub(crate) fn mark_validated(&mut self) {
        self.validated = true;
    }

    pub fn check_shape(&self) -> Result<(), AppError> {
        check_shape(&self.api_key).map_err(AppError::InvalidCredential)
    }
}

#[derive(Clone, Default)]
pub struct CredentialResolver {
    sources: Vec<Arc<dyn CredentialSource>>,
}

impl CredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sources(sources: Vec<Arc<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    pub fn with_source(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    fn first_value(&self, field: CredentialField) -> Option<(SourceKind, String)> {
        self.sources.iter().find_map(|source| {
            source
                .lookup(field)
                .map(|raw| normalize_secret(&raw))
                .filter(|value| !value.is_empty())
                .map(|value| (source.kind(), value))
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.first_value(CredentialField::ApiKey).is_some()
    }

    pub fn resolve(&self) -> Result<Credential, AppError> {
        let (source, api_key) = self
            .first_value(CredentialField::ApiKey)
            .ok_or(AppError::MissingCredential)?;

        let organization = self
            .first_value(CredentialField::Organization)
            .map(|(_, v)| v);
        let project = self.first_value(CredentialField::Project).map(|(_, v)| v);

        debug!(
            source = ?source,
            organization = organization.is_some(),
            project = project.is_some(),
            "credential resolved"
        );

        Ok(Credential {
            api_key,
            organization,
            project,
            source,
            validated: false,
        })
    }
}

/// The non-interactive sources, in priority order: secrets file, then environment.
pub fn configured_sources(secrets_path: &Path) -> Vec<Arc<dyn CredentialSource>> {
    let secrets = match SecretsStore::load(secrets_path) {
        Ok(store) => store,
        Err(err) => {
            warn!(
                path = %secrets_path.display(),
                error = format!("{err:#}").as_str(),
                "ignoring unreadable secrets file"
            );
            SecretsStore::default()
        }
    };

    vec![Arc::new(secrets), Arc::new(EnvSource::capture())]
}
