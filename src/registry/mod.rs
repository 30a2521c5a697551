//! Endpoint catalog
//!
//! Named Coinglass endpoints beyond the typed datasets, embedded at build time.
//! Paths are relative to the `/api` base URL. Payloads from these endpoints
//! have no typed mapping and land in the raw log.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Embedded catalog data
const CATALOG_JSON: &str = include_str!("endpoints.json");

/// Catalog instance, parsed once
static CATALOG: Lazy<Result<EndpointRegistry, RegistryError>> =
    Lazy::new(|| EndpointRegistry::from_json(CATALOG_JSON));

/// Catalog of named endpoints
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    schema_version: String,
    entries: BTreeMap<String, EndpointEntry>,
}

impl EndpointRegistry {
    /// Shared embedded catalog
    pub fn load() -> Result<&'static Self, &'static RegistryError> {
        CATALOG.as_ref()
    }

    /// Parse the embedded catalog into an owned copy
    pub fn load_embedded() -> Result<Self, RegistryError> {
        Self::from_json(CATALOG_JSON)
    }

    /// Parse a catalog document
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: RawCatalog = serde_json::from_str(json)
            .map_err(|e| RegistryError::ParseError(format!("Failed to parse catalog: {e}")))?;

        let mut entries = BTreeMap::new();
        for mut entry in raw.endpoints {
            if !entry.path.starts_with('/') {
                return Err(RegistryError::ParseError(format!(
                    "Endpoint {} has a relative path: {}",
                    entry.name, entry.path
                )));
            }
            // Some catalog paths were written against the host root.
            if let Some(stripped) = entry.path.strip_prefix("/api/") {
                entry.path = format!("/{stripped}");
            }
            let name = entry.name.clone();
            if entries.insert(name.clone(), entry).is_some() {
                return Err(RegistryError::DuplicateName(name));
            }
        }

        Ok(Self {
            schema_version: raw.schema_version,
            entries,
        })
    }

    /// Catalog format version
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// All entries, sorted by name
    pub fn entries(&self) -> Vec<&EndpointEntry> {
        self.entries.values().collect()
    }

    /// Look up an entry by name
    pub fn get(&self, name: &str) -> Option<&EndpointEntry> {
        self.entries.get(name)
    }

    /// Look up an entry by name, failing when absent
    pub fn require(&self, name: &str) -> Result<&EndpointEntry, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Entries usable on the Hobbyist plan without paid access
    pub fn hobbyist_defaults(&self) -> Vec<&EndpointEntry> {
        self.entries.values().filter(|e| e.hobbyist).collect()
    }

    /// Entries whose name matches a `*` wildcard pattern
    ///
    /// # Examples
    /// ```ignore
    /// let registry = EndpointRegistry::load_embedded()?;
    /// let heatmaps = registry.resolve_pattern("liquidation_*heatmap*")?;
    /// ```
    pub fn resolve_pattern(&self, pattern: &str) -> Result<Vec<&EndpointEntry>, RegistryError> {
        let matches: Vec<&EndpointEntry> = self
            .entries
            .values()
            .filter(|entry| matches_pattern(pattern, &entry.name))
            .collect();

        if matches.is_empty() {
            return Err(RegistryError::NotFound(format!(
                "Pattern {pattern} does not match any endpoint"
            )));
        }
        Ok(matches)
    }
}

/// Wildcard match where `*` spans any run of characters
fn matches_pattern(pattern: &str, value: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == value;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let last = parts.len() - 1;
    let mut pos = 0;

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !value.starts_with(part) {
                return false;
            }
            pos = part.len();
        } else if i == last {
            return value.len() >= pos + part.len() && value.ends_with(part);
        } else if let Some(found) = value[pos..].find(part) {
            pos += found + part.len();
        } else {
            return false;
        }
    }

    true
}

/// One named endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointEntry {
    name: String,
    path: String,
    category: String,
    #[serde(default)]
    requires_symbol: bool,
    #[serde(default)]
    hobbyist: bool,
}

impl EndpointEntry {
    /// Catalog name (raw log `endpoint` column)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the base URL
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Grouping such as `liquidation` or `etf`
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether the endpoint needs a `symbol` query parameter
    pub fn requires_symbol(&self) -> bool {
        self.requires_symbol
    }

    /// Whether the Hobbyist plan can call it
    pub fn hobbyist(&self) -> bool {
        self.hobbyist
    }
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    schema_version: String,
    endpoints: Vec<EndpointEntry>,
}

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Catalog JSON is invalid
    #[error("catalog parse error: {0}")]
    ParseError(String),

    /// Unknown endpoint name
    #[error("endpoint not found: {0}")]
    NotFound(String),

    /// Same name listed twice
    #[error("duplicate endpoint name: {0}")]
    DuplicateName(String),
}
