//! Physical device resource manager
//!
//! Advertises a catalog of lab resources to a testbed orchestrator and runs
//! the validate -> provide -> release lifecycle for them. UE reservations
//! are delegated to a remote reservation backend over HTTP.
//!
//! - [`catalog`] - Static resource catalog and testbed codes
//! - [`index`] - Testbed to reservation backend index
//! - [`backend`] - Reservation backend client
//! - [`manager`] - Lifecycle controller and orchestrator messages
//! - [`host`] - Line-delimited JSON host adapter
//! - [`config`] - Configuration file
//! - [`error`] - Error kinds

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod host;
pub mod index;
pub mod manager;

pub use error::{ErrorKind, ManagerError};
pub use manager::{LifecycleController, ResourceManager};
