//! Resource manager
//!
//! The orchestrator-facing side of the plugin.
//!
//! # Module Structure
//!
//! - [`lifecycle`] - The [`LifecycleController`] implementing [`ResourceManager`]
//! - [`ledger`] - Per-request lifecycle state
//! - [`messages`] - Orchestrator message shapes
//! - [`payload`] - Typed request payload parsing

pub mod ledger;
pub mod lifecycle;
pub mod messages;
pub mod payload;

pub use ledger::{ReservationKey, ReservationState};
pub use lifecycle::LifecycleController;
pub use messages::{ResourceMetadata, UserInfo};
pub use payload::{PayloadFormat, ReservationRequest};

use crate::error::Result;

/// Operations the orchestrator invokes on a resource manager
#[allow(async_fn_in_trait)]
pub trait ResourceManager {
    /// Advertise the catalog. Also rebuilds the resource index.
    async fn list_resources(&self, user: &UserInfo) -> Result<Vec<ResourceMetadata>>;

    /// Check that a requested resource exists and its backend is up
    async fn validate_resources(&self, user: &UserInfo, payload: &str) -> Result<()>;

    /// Provision a resource; each returned string is a JSON-encoded record
    async fn provide_resources(&self, user: &UserInfo, payload: &str) -> Result<Vec<String>>;

    /// Best-effort release of a provisioned resource
    async fn release_resources(&self, user: &UserInfo, payload: &str) -> Result<()>;

    async fn create_user(&self, user: &UserInfo) -> Result<UserInfo>;

    async fn refresh_resources(&self, user: &UserInfo) -> Result<Vec<ResourceMetadata>>;
}
