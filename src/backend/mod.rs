//! Reservation backend interaction module
//!
//! # Module Structure
//!
//! - [`client`] - Reachability check, reserve and terminate calls
//! - [`http`] - HTTP utilities for backend REST calls
//!
//! # Example
//!
//! ```ignore
//! use crate::backend::ReservationClient;
//!
//! async fn example(entry: &ResourceIndexEntry) -> pd_manager::error::Result<()> {
//!     let client = ReservationClient::new("pd-manager", None)?;
//!     let record = client.reserve(entry, "alice", "my-ue").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;

pub use client::{BackendStatus, ReservationClient, ReservationRecord};
