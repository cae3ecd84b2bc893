//! svcad-registry
//!
//! Everything that talks to the outside world on behalf of a pass:
//! - the registry transport boundary and its blocking HTTP implementation,
//! - the registry snapshot fetch (paged `GET /v2/services`),
//! - the broker catalog file loader.
//!
//! Replay logic does not live here; it only depends on [`RegistryTransport`].

pub mod catalog;
pub mod snapshot;
pub mod transport;

pub use catalog::{load_catalog_file, parse_catalog_str, CatalogFormat};
pub use snapshot::{fetch_registered_services, SnapshotError};
pub use transport::{
    HttpMethod, HttpRegistryTransport, RegistryResponse, RegistryTransport, TransportError,
};

/// Offering collection endpoint.
pub const SERVICES_URI: &str = "/v2/services";

/// Plan collection endpoint.
pub const SERVICE_PLANS_URI: &str = "/v2/service_plans";

/// `PUT` target for an existing offering.
pub fn service_uri(guid: &str) -> String {
    format!("{SERVICES_URI}/{guid}")
}

/// `PUT` target for an existing plan.
pub fn service_plan_uri(guid: &str) -> String {
    format!("{SERVICE_PLANS_URI}/{guid}")
}
