//! Resource Catalog - Load resource descriptors from JSON
//!
//! The catalog is a JSON object keyed by resource id. Each value describes
//! the resource as it is advertised to the orchestrator, plus optional
//! private connection info for resources backed by a reservation service.

use super::testbed::Testbed;
use crate::error::{ManagerError, Result};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Connection info for a remote reservation backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrivateInfo {
    pub url: String,
    pub secret: String,
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceDescriptor {
    /// Filled from the catalog key
    #[serde(skip)]
    pub resource_id: String,
    /// Human-readable testbed name, resolved with [`Testbed::from_name`]
    pub testbed: String,
    pub node_type: String,
    #[serde(deserialize_with = "deserialize_cardinality")]
    pub cardinality: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub private: Option<PrivateInfo>,
    /// Canned value handed out by provide for static resources
    #[serde(default)]
    pub value: Option<String>,
}

impl ResourceDescriptor {
    /// Orchestrator testbed, if the name is in the code table
    pub fn testbed(&self) -> Option<Testbed> {
        Testbed::from_name(&self.testbed)
    }

    /// Whether provisioning is delegated to a reservation backend
    pub fn is_remote(&self) -> bool {
        self.private.is_some()
    }

    /// Value returned by provide for a static resource
    pub fn static_value(&self) -> String {
        self.value.clone().unwrap_or_else(|| {
            format!(
                "please go to {} in order to be able to use this resource",
                self.testbed
            )
        })
    }
}

fn deserialize_cardinality<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n,
        Raw::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("cardinality '{}' is not a number", s)))?,
    };

    u32::try_from(value)
        .map_err(|_| serde::de::Error::custom(format!("cardinality {} out of range", value)))
}

/// Immutable snapshot of the resource catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    resources: BTreeMap<String, ResourceDescriptor>,
}

impl Catalog {
    /// Parse a catalog from its JSON document
    pub fn from_json(content: &str) -> Result<Self> {
        let mut resources: BTreeMap<String, ResourceDescriptor> = serde_json::from_str(content)
            .map_err(|e| ManagerError::Configuration(format!("malformed resource catalog: {}", e)))?;

        for (resource_id, descriptor) in resources.iter_mut() {
            descriptor.resource_id = resource_id.clone();
            if let Some(private) = &descriptor.private {
                url::Url::parse(&private.url).map_err(|e| {
                    ManagerError::Configuration(format!(
                        "resource '{}' has an invalid backend url: {}",
                        resource_id, e
                    ))
                })?;
            }
        }

        Ok(Self { resources })
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ResourceDescriptor>) -> Self {
        Self {
            resources: descriptors
                .into_iter()
                .map(|d| (d.resource_id.clone(), d))
                .collect(),
        }
    }

    pub fn get(&self, resource_id: &str) -> Option<&ResourceDescriptor> {
        self.resources.get(resource_id)
    }

    /// Descriptors in resource id order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.values()
    }

    pub fn resource_ids(&self) -> Vec<&str> {
        self.resources.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Where the controller gets catalog snapshots from
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> Result<Catalog>;
}

/// Catalog read from a JSON file on every load, so edits are picked up by
/// the next listing.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for FileCatalog {
    fn load(&self) -> Result<Catalog> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ManagerError::Configuration(format!(
                "cannot read resource catalog {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Catalog::from_json(&content)
    }
}

impl CatalogSource for Catalog {
    fn load(&self) -> Result<Catalog> {
        Ok(self.clone())
    }
}
