use serde::Serialize;
use svcad_schemas::{Plan, Service};

/// How a catalog service was bound to its registry counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    UniqueId,
    Tuple,
}

/// A catalog service bound to a registry service.
///
/// `service.guid` has been copied from `registered.guid`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActiveService {
    pub service: Service,
    pub registered: Service,
    pub matched_by: MatchKind,
}

/// Catalog `unique_id` disagreed with the registry entry it was tuple-matched to.
///
/// Non-fatal. Kept in the classification so callers and tests can see it
/// without scraping logs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TupleMatchDiagnostic {
    pub label: String,
    pub version: String,
    pub provider: String,
    pub catalog_unique_id: String,
    pub registered_unique_id: Option<String>,
    pub registered_guid: Option<String>,
}

/// Output of [`crate::classify`]. Lives for one reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Catalog services matched to a registry record, in catalog order.
    pub active: Vec<ActiveService>,
    /// Catalog services with no registry match, in catalog order.
    pub new: Vec<Service>,
    /// Registry records no catalog service claimed, in registry order.
    pub inactive: Vec<Service>,
    pub diagnostics: Vec<TupleMatchDiagnostic>,
}

impl Classification {
    /// Catalog view of the active services (guids assigned).
    pub fn active_services(&self) -> impl Iterator<Item = &Service> {
        self.active.iter().map(|a| &a.service)
    }
}

/// Plan writes needed to bring one registry service in line with the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Catalog plans absent from the registry. No guid.
    pub plans_to_add: Vec<Plan>,
    /// Catalog plans whose attributes differ from the registry. Carry the
    /// registry plan guid.
    pub plans_to_update: Vec<Plan>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.plans_to_add.is_empty() && self.plans_to_update.is_empty()
    }
}
