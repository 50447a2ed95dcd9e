//! Orchestrator messages
//!
//! Shapes exchanged with the orchestrator. Field names follow its schema.

use crate::catalog::ResourceDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identity of the experimenter issuing a request
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub ob_project_id: String,
    #[serde(default)]
    pub testbed_tenants: HashMap<String, String>,
}

impl UserInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserInfo")
            .field("name", &self.name)
            .field("ob_project_id", &self.ob_project_id)
            .field("testbed_tenants", &self.testbed_tenants)
            .finish_non_exhaustive()
    }
}

/// A resource as advertised to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub resource_id: String,
    pub description: String,
    pub cardinality: u32,
    pub node_type: String,
    /// Orchestrator testbed code
    pub testbed: i32,
}

impl ResourceMetadata {
    /// Translate a descriptor; `None` when its testbed has no orchestrator code
    pub fn from_descriptor(descriptor: &ResourceDescriptor) -> Option<Self> {
        let testbed = descriptor.testbed()?;
        Some(Self {
            resource_id: descriptor.resource_id.clone(),
            description: descriptor.description.clone(),
            cardinality: descriptor.cardinality,
            node_type: descriptor.node_type.clone(),
            testbed: testbed.code(),
        })
    }
}
