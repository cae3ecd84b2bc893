//! Registry snapshot: fetch existing offerings and normalize the v2 wire
//! format into [`Service`] values.
//!
//! The registry lists offerings as paged `{metadata, entity}` resources.
//! Plans are requested inline (`inline-relations-depth=2`) so one walk of
//! the pages yields the full snapshot. Paging follows `next_url` until it is
//! null.
//!
//! Unknown fields are ignored so registry API additions do not break
//! decoding.

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use svcad_schemas::{Plan, Service};
use tracing::debug;

use crate::transport::{HttpMethod, RegistryTransport, TransportError};

/// First snapshot page. Later pages come from `next_url`.
pub const SNAPSHOT_FIRST_PAGE_URI: &str =
    "/v2/services?inline-relations-depth=2&results-per-page=50&page=1";

/// Upper bound on pages walked in one fetch.
pub const MAX_SNAPSHOT_PAGES: usize = 1_000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    Transport { uri: String, error: TransportError },
    Api { uri: String, status: u16 },
    Decode { uri: String, message: String },
    /// A resource had an empty `metadata.guid`.
    MissingGuid { label: String },
    /// `next_url` revisited a page or the page bound was hit.
    PagingLoop { uri: String },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { uri, error } => {
                write!(f, "registry snapshot fetch {uri} failed: {error}")
            }
            Self::Api { uri, status } => {
                write!(f, "registry snapshot fetch {uri} returned status={status}")
            }
            Self::Decode { uri, message } => {
                write!(f, "registry snapshot page {uri} could not be decoded: {message}")
            }
            Self::MissingGuid { label } => {
                write!(f, "registry service '{label}' has empty metadata.guid")
            }
            Self::PagingLoop { uri } => {
                write!(f, "registry snapshot paging did not terminate at {uri}")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

// ---------------------------------------------------------------------------
// Raw wire-level structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawPage<E> {
    #[serde(default)]
    pub next_url: Option<String>,
    #[serde(default = "Vec::new")]
    pub resources: Vec<RawResource<E>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub guid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawResource<E> {
    pub metadata: RawMetadata,
    pub entity: E,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawServiceEntity {
    pub label: String,
    /// v2 brokers leave provider null.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub info_url: Option<String>,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub bindable: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub extra: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub service_plans: Vec<RawResource<RawPlanEntity>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlanEntity {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub free: Option<bool>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub extra: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Convert one registry resource (with inline plans) into a [`Service`].
pub fn normalize_service(raw: RawResource<RawServiceEntity>) -> Result<Service, SnapshotError> {
    let RawResource { metadata, entity } = raw;
    if metadata.guid.is_empty() {
        return Err(SnapshotError::MissingGuid {
            label: entity.label,
        });
    }

    let plans = entity
        .service_plans
        .into_iter()
        .map(normalize_plan)
        .collect();

    Ok(Service {
        unique_id: entity.unique_id,
        guid: Some(metadata.guid),
        label: entity.label,
        provider: entity.provider.unwrap_or_default(),
        version: entity.version.unwrap_or_default(),
        description: entity.description.unwrap_or_default(),
        url: entity.url,
        info_url: entity.info_url,
        documentation_url: entity.documentation_url,
        bindable: entity.bindable.unwrap_or(true),
        tags: entity.tags.unwrap_or_default(),
        extra: entity.extra,
        active: entity.active.unwrap_or(true),
        plans,
    })
}

fn normalize_plan(raw: RawResource<RawPlanEntity>) -> Plan {
    let RawResource { metadata, entity } = raw;
    Plan {
        guid: Some(metadata.guid).filter(|g| !g.is_empty()),
        unique_id: entity.unique_id,
        name: entity.name,
        description: entity.description.unwrap_or_default(),
        free: entity.free.unwrap_or(true),
        public: entity.public.unwrap_or(true),
        extra: entity.extra,
    }
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Walk every snapshot page and return the registry's offerings in listing order.
pub fn fetch_registered_services(
    transport: &dyn RegistryTransport,
) -> Result<Vec<Service>, SnapshotError> {
    let mut out: Vec<Service> = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut next: Option<String> = Some(SNAPSHOT_FIRST_PAGE_URI.to_string());

    while let Some(uri) = next.take() {
        if !seen.insert(uri.clone()) || seen.len() > MAX_SNAPSHOT_PAGES {
            return Err(SnapshotError::PagingLoop { uri });
        }

        let resp = transport
            .request(HttpMethod::Get, &uri, None)
            .map_err(|error| SnapshotError::Transport {
                uri: uri.clone(),
                error,
            })?;
        if !resp.is_success() {
            return Err(SnapshotError::Api {
                uri,
                status: resp.status,
            });
        }

        let page: RawPage<RawServiceEntity> =
            serde_json::from_str(&resp.body).map_err(|e| SnapshotError::Decode {
                uri: uri.clone(),
                message: e.to_string(),
            })?;

        debug!(uri = %uri, resources = page.resources.len(), "registry snapshot page");

        for resource in page.resources {
            out.push(normalize_service(resource)?);
        }
        next = page.next_url.filter(|u| !u.is_empty());
    }

    Ok(out)
}
