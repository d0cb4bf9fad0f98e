use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};

use super::{CredentialField, CredentialSource, SourceKind};

/// Read-only secrets file (TOML). Keys live at the top level or under `[default]`.
#[derive(Clone, Default)]
pub struct SecretsStore {
    values: HashMap<String, String>,
}

impl fmt::Debug for SecretsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.values.keys().collect::<Vec<_>>();
        keys.sort();
        f.debug_struct("SecretsStore").field("keys", &keys).finish()
    }
}

impl SecretsStore {
    /// Load the store from disk. A missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read secrets file {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("Failed to parse secrets file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(raw)?;
        let mut values = HashMap::new();

        for (key, value) in &table {
            if let Some(s) = value.as_str() {
                values.insert(key.clone(), s.to_string());
            }
        }

        if let Some(default) = table.get("default").and_then(|v| v.as_table()) {
            for (key, value) in default {
                if let Some(s) = value.as_str() {
                    values.entry(key.clone()).or_insert_with(|| s.to_string());
                }
            }
        }

        Ok(Self { values })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl CredentialSource for SecretsStore {
    fn kind(&self) -> SourceKind {
        SourceKind::SecretsStore
    }

    fn lookup(&self, field: CredentialField) -> Option<String> {
        field
            .names()
            .iter()
            .find_map(|name| self.values.get(*name).cloned())
    }
}

/// Environment variables captured once; nothing reads the live environment afterwards.
#[derive(Clone, Default)]
pub struct EnvSource {
    values: HashMap<String, String>,
}

impl fmt::Debug for EnvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.values.keys().collect::<Vec<_>>();
        keys.sort();
        f.debug_struct("EnvSource").field("keys", &keys).finish()
    }
}

impl EnvSource {
    pub fn capture() -> Self {
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let values = CredentialField::ALL
            .iter()
            .flat_map(|field| field.names().iter())
            .filter_map(|name| lookup(name).map(|value| (name.to_string(), value)))
            .collect();
        Self { values }
    }
}

impl CredentialSource for EnvSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Environment
    }

    fn lookup(&self, field: CredentialField) -> Option<String> {
        field
            .names()
            .iter()
            .find_map(|name| self.values.get(*name).cloned())
    }
}

#[derive(Clone, Default)]
pub struct ManualEntry {
    pub api_key: String,
    pub organization: Option<String>,
    pub project: Option<String>,
}

impl fmt::Debug for ManualEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualEntry")
            .field("api_key", &if self.api_key.is_empty() { "<empty>" } else { "<redacted>" })
            .field("organization", &self.organization)
            .field("project", &self.project)
            .finish()
    }
}

impl ManualEntry {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

impl CredentialSource for ManualEntry {
    fn kind(&self) -> SourceKind {
        SourceKind::Manual
    }

    fn lookup(&self, field: CredentialField) -> Option<String> {
        match field {
            CredentialField::ApiKey => Some(self.api_key.clone()),
            CredentialField::Organization => self.organization.clone(),
            CredentialField::Project => self.project.clone(),
        }
    }
}
