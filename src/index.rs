//! Resource Index
//!
//! Maps each testbed to the remotely-backed resource it hosts and the
//! connection info of its reservation backend. Rebuilt from scratch on every
//! catalog listing.
//!
//! The index holds a single slot per testbed: when two remote resources share
//! a testbed, the one listed last wins and the other cannot be resolved.

use crate::catalog::{Catalog, Testbed};
use std::collections::BTreeMap;
use std::fmt;

/// Connection metadata for one remote resource
#[derive(Clone, PartialEq, Eq)]
pub struct ResourceIndexEntry {
    pub testbed: Testbed,
    pub resource_id: String,
    pub backend_url: String,
    pub backend_secret: String,
}

// Keep the secret out of logs
impl fmt::Debug for ResourceIndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceIndexEntry")
            .field("testbed", &self.testbed)
            .field("resource_id", &self.resource_id)
            .field("backend_url", &self.backend_url)
            .field("backend_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    entries: BTreeMap<Testbed, ResourceIndexEntry>,
}

impl ResourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole index with the remote resources of `catalog`
    pub fn rebuild(&mut self, catalog: &Catalog) {
        self.entries.clear();

        for descriptor in catalog.iter() {
            let Some(private) = &descriptor.private else {
                continue;
            };
            let Some(testbed) = descriptor.testbed() else {
                tracing::warn!(
                    "Remote resource {} has unknown testbed '{}', not indexed",
                    descriptor.resource_id,
                    descriptor.testbed
                );
                continue;
            };

            let entry = ResourceIndexEntry {
                testbed,
                resource_id: descriptor.resource_id.clone(),
                backend_url: private.url.clone(),
                backend_secret: private.secret.clone(),
            };

            if let Some(previous) = self.entries.insert(testbed, entry) {
                tracing::warn!(
                    "Testbed {} already indexed {}, replaced by {}",
                    testbed,
                    previous.resource_id,
                    descriptor.resource_id
                );
            }
        }

        tracing::debug!("Resource index rebuilt with {} entries", self.entries.len());
    }

    /// First entry whose resource id matches
    pub fn lookup_by_resource_id(&self, resource_id: &str) -> Option<&ResourceIndexEntry> {
        self.entries
            .values()
            .find(|entry| entry.resource_id == resource_id)
    }

    pub fn get(&self, testbed: Testbed) -> Option<&ResourceIndexEntry> {
        self.entries.get(&testbed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PrivateInfo, ResourceDescriptor};

    fn descriptor(id: &str, testbed: &str, url: Option<&str>) -> ResourceDescriptor {
        ResourceDescriptor {
            resource_id: id.to_string(),
            testbed: testbed.to_string(),
            node_type: "UeReservation".to_string(),
            cardinality: 1,
            description: String::new(),
            private: url.map(|u| PrivateInfo {
                url: u.to_string(),
                secret: format!("{}-secret", id),
            }),
            value: None,
        }
    }

    #[test]
    fn test_rebuild_indexes_remote_resources_only() {
        let catalog = Catalog::from_descriptors(vec![
            descriptor("fokus-cell", "fokus", None),
            descriptor("surrey-ue", "surrey", Some("https://ue.example/")),
        ]);

        let mut index = ResourceIndex::new();
        index.rebuild(&catalog);

        assert_eq!(index.len(), 1);
        let entry = index.get(Testbed::Surrey).unwrap();
        assert_eq!(entry.resource_id, "surrey-ue");
        assert_eq!(entry.backend_url, "https://ue.example/");
        assert_eq!(entry.backend_secret, "surrey-ue-secret");
        assert!(index.lookup_by_resource_id("fokus-cell").is_none());
    }

    #[test]
    fn test_rebuild_replaces_previous_state() {
        let mut index = ResourceIndex::new();
        index.rebuild(&Catalog::from_descriptors(vec![descriptor(
            "surrey-ue",
            "surrey",
            Some("https://ue.example/"),
        )]));
        assert!(index.lookup_by_resource_id("surrey-ue").is_some());

        index.rebuild(&Catalog::from_descriptors(vec![descriptor(
            "dt-ue",
            "dt",
            Some("https://dt.example/"),
        )]));
        assert_eq!(index.len(), 1);
        assert!(index.lookup_by_resource_id("surrey-ue").is_none());
        assert!(index.lookup_by_resource_id("dt-ue").is_some());
    }

    #[test]
    fn test_one_slot_per_testbed() {
        let catalog = Catalog::from_descriptors(vec![
            descriptor("surrey-ue-a", "surrey", Some("https://a.example/")),
            descriptor("surrey-ue-b", "surrey", Some("https://b.example/")),
        ]);

        let mut index = ResourceIndex::new();
        index.rebuild(&catalog);

        // Catalog iterates in id order, so "b" is written last
        assert_eq!(index.len(), 1);
        assert!(index.lookup_by_resource_id("surrey-ue-a").is_none());
        assert_eq!(
            index.lookup_by_resource_id("surrey-ue-b").unwrap().backend_url,
            "https://b.example/"
        );
    }

    #[test]
    fn test_unknown_testbed_is_not_indexed() {
        let catalog = Catalog::from_descriptors(vec![descriptor(
            "moon-ue",
            "moon",
            Some("https://moon.example/"),
        )]);

        let mut index = ResourceIndex::new();
        index.rebuild(&catalog);
        assert!(index.is_empty());
    }

    #[test]
    fn test_debug_hides_secret() {
        let entry = ResourceIndexEntry {
            testbed: Testbed::Surrey,
            resource_id: "surrey-ue".to_string(),
            backend_url: "https://ue.example/".to_string(),
            backend_secret: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", entry);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("surrey-ue"));
    }
}
