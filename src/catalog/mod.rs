//! Resource catalog
//!
//! Static description of the physical resources this manager advertises.
//!
//! # Module Structure
//!
//! - [`descriptor`] - Catalog snapshot, descriptors and catalog sources
//! - [`testbed`] - Testbed name to orchestrator code table
//!
//! # Catalog Format
//!
//! ```json
//! {
//!   "surrey-ue": {
//!     "testbed": "surrey",
//!     "node_type": "UeReservation",
//!     "cardinality": 5,
//!     "description": "Reserved UE at Surrey",
//!     "private": {"url": "https://ue.example/", "secret": "..."}
//!   }
//! }
//! ```

pub mod descriptor;
pub mod testbed;

pub use descriptor::{Catalog, CatalogSource, FileCatalog, PrivateInfo, ResourceDescriptor};
pub use testbed::Testbed;
