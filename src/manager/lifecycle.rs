//! Lifecycle Controller
//!
//! Drives list -> validate -> provide -> release for one manager instance.
//! Static resources are answered from the catalog alone. Remote resources
//! are resolved through the [`ResourceIndex`] built by the last listing and
//! then handed to the [`ReservationClient`].

use super::ledger::{ReservationKey, ReservationLedger, ReservationState};
use super::messages::{ResourceMetadata, UserInfo};
use super::payload::{PayloadFormat, ReservationRequest};
use super::ResourceManager;
use crate::backend::{BackendStatus, ReservationClient};
use crate::catalog::{Catalog, CatalogSource, ResourceDescriptor};
use crate::error::{ErrorKind, ManagerError, Result};
use crate::index::{ResourceIndex, ResourceIndexEntry};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

pub struct LifecycleController {
    catalog: Arc<dyn CatalogSource>,
    client: ReservationClient,
    index: RwLock<ResourceIndex>,
    ledger: Mutex<ReservationLedger>,
}

impl LifecycleController {
    pub fn new(catalog: Arc<dyn CatalogSource>, client: ReservationClient) -> Self {
        Self {
            catalog,
            client,
            index: RwLock::new(ResourceIndex::new()),
            ledger: Mutex::new(ReservationLedger::new()),
        }
    }

    /// Copy of the current resource index
    pub async fn index_snapshot(&self) -> ResourceIndex {
        self.index.read().await.clone()
    }

    /// Ledger state of a request
    pub async fn reservation_state(&self, key: &ReservationKey) -> ReservationState {
        self.ledger.lock().await.state(key)
    }

    fn describe<'a>(catalog: &'a Catalog, resource_id: &str) -> Result<&'a ResourceDescriptor> {
        catalog.get(resource_id).ok_or_else(|| {
            ManagerError::InvalidResource(format!(
                "resource id {} not in the valid options: {:?}",
                resource_id,
                catalog.resource_ids()
            ))
        })
    }

    /// Index entry for a remote resource. The guard is dropped before any backend call.
    async fn resolve(&self, resource_id: &str) -> Result<ResourceIndexEntry> {
        self.index
            .read()
            .await
            .lookup_by_resource_id(resource_id)
            .cloned()
            .ok_or_else(|| {
                ManagerError::InvalidResource(format!(
                    "resource {} has no reservation backend in the resource index",
                    resource_id
                ))
            })
    }

    async fn record(&self, request: &ReservationRequest, state: ReservationState) {
        self.ledger
            .lock()
            .await
            .record(ReservationKey::from(request), state);
    }
}

impl ResourceManager for LifecycleController {
    async fn list_resources(&self, user: &UserInfo) -> Result<Vec<ResourceMetadata>> {
        tracing::info!("Received list resources from {}", user.name);

        let catalog = self.catalog.load()?;
        self.index.write().await.rebuild(&catalog);

        let result: Vec<ResourceMetadata> = catalog
            .iter()
            .filter_map(|descriptor| {
                let metadata = ResourceMetadata::from_descriptor(descriptor);
                if metadata.is_none() {
                    tracing::debug!(
                        "Skipping {}: testbed '{}' has no orchestrator code",
                        descriptor.resource_id,
                        descriptor.testbed
                    );
                }
                metadata
            })
            .collect();

        tracing::info!("Returning {} resources", result.len());
        Ok(result)
    }

    async fn validate_resources(&self, user: &UserInfo, payload: &str) -> Result<()> {
        let request = ReservationRequest::parse(payload, PayloadFormat::Yaml, &user.name)?;
        tracing::info!("Validating {} for {}", request.resource_id, user.name);

        let catalog = self.catalog.load()?;
        let descriptor = Self::describe(&catalog, &request.resource_id)?;

        if descriptor.is_remote() {
            let entry = self.resolve(&request.resource_id).await?;
            match self.client.check_reachable(&entry).await? {
                BackendStatus::Up => {},
                BackendStatus::Down(status) => {
                    return Err(ManagerError::BackendUnreachable(format!(
                        "backend of {} reports status '{}'",
                        request.resource_id, status
                    )));
                },
            }
        }

        self.record(&request, ReservationState::Validated).await;
        Ok(())
    }

    async fn provide_resources(&self, user: &UserInfo, payload: &str) -> Result<Vec<String>> {
        let request = ReservationRequest::parse(payload, PayloadFormat::Json, &user.name)?;
        tracing::info!(
            "Providing {} ({}) for {}",
            request.resource_name,
            request.resource_id,
            user.name
        );

        let catalog = self.catalog.load()?;
        let descriptor = Self::describe(&catalog, &request.resource_id)?;

        if !descriptor.is_remote() {
            let value = json!({ "value": descriptor.static_value() });
            self.record(&request, ReservationState::Provisioned).await;
            return Ok(vec![value.to_string()]);
        }

        let entry = self.resolve(&request.resource_id).await?;
        let record = self
            .client
            .reserve(&entry, &request.user_name, &request.resource_name)
            .await?;
        self.record(&request, ReservationState::Provisioned).await;

        let encoded = serde_json::to_string(&record).map_err(|e| {
            ManagerError::ReservationFailed(format!("cannot encode reservation record: {}", e))
        })?;
        Ok(vec![encoded])
    }

    async fn release_resources(&self, user: &UserInfo, payload: &str) -> Result<()> {
        let request = match ReservationRequest::parse(payload, PayloadFormat::Json, &user.name) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Ignoring release from {}: {}", user.name, e);
                return Ok(());
            },
        };

        let entry = match self.resolve(&request.resource_id).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Nothing to release for {}: {}", user.name, e);
                return Ok(());
            },
        };

        // Claimed under the lock so concurrent releases terminate once
        let key = ReservationKey::from(&request);
        let Some(previous) = self.ledger.lock().await.begin_release(&key) else {
            tracing::info!(
                "{} ({}) already released for {}",
                request.resource_name,
                request.resource_id,
                user.name
            );
            return Ok(());
        };

        let result = self
            .client
            .terminate(&entry, &request.user_name, &request.resource_name)
            .await;
        let state = if result.is_ok() {
            ReservationState::Released
        } else {
            previous
        };
        self.ledger.lock().await.record(key, state);

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::ReservationFailed => Err(e),
            Err(e) => {
                tracing::warn!(
                    "Release of {} for {} not confirmed: {}",
                    request.resource_name,
                    user.name,
                    e
                );
                Ok(())
            },
        }
    }

    async fn create_user(&self, user: &UserInfo) -> Result<UserInfo> {
        tracing::debug!("Nothing to create for user {}", user.name);
        Ok(user.clone())
    }

    async fn refresh_resources(&self, user: &UserInfo) -> Result<Vec<ResourceMetadata>> {
        tracing::debug!("Refresh requested by {}, physical resources do not refresh", user.name);
        Ok(Vec::new())
    }
}
