//! Replay: turn classified services and their change sets into registry writes.
//!
//! Per service:
//!
//! ```text
//! Pending -> OfferingSubmitted -> PlansProcessed
//!                              -> PlansSkipped   (no guid came back, or service inactive)
//! ```
//!
//! Within a service all plan adds are issued before any plan update. A
//! failed plan call is logged and does not stop the next one.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use svcad_registry::{
    service_plan_uri, service_uri, HttpMethod, RegistryResponse, RegistryTransport,
    SERVICES_URI, SERVICE_PLANS_URI,
};
use svcad_schemas::{OfferingWrite, Plan, Service};
use tracing::{debug, error, info};

use crate::ServiceChanges;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayState {
    Pending,
    OfferingSubmitted,
    PlansProcessed,
    PlansSkipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The offering write did not yield a registry guid.
    OfferingFailed,
    /// The broker marks the service inactive; plan changes are not propagated.
    ServiceInactive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanWrite {
    Add,
    Update,
}

/// Why an offering write produced no guid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OfferingFailure {
    /// No response was obtained.
    Transport { message: String },
    /// Response status outside 200–299.
    Api { status: u16 },
    /// 2xx response without a usable `metadata.guid`.
    MissingResponseGuid { status: u16 },
    /// An update was requested for a service that has no registry guid.
    NoRegistryGuid,
}

impl fmt::Display for OfferingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { message } => write!(f, "{message}"),
            Self::Api { status } => write!(f, "status={status}"),
            Self::MissingResponseGuid { status } => {
                write!(f, "status={status} but response carried no metadata.guid")
            }
            Self::NoRegistryGuid => write!(f, "service has no registry guid to update"),
        }
    }
}

impl std::error::Error for OfferingFailure {}

/// What happened to one service during replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceOutcome {
    pub label: String,
    pub unique_id: Option<String>,
    pub write: OfferingWriteKind,
    /// Registry guid after the offering write; `None` if it failed.
    pub guid: Option<String>,
    pub state: ReplayState,
    pub skip_reason: Option<SkipReason>,
    pub offering_failure: Option<OfferingFailure>,
    pub plans_added: usize,
    pub plans_updated: usize,
    pub plan_failures: usize,
}

/// Serializable mirror of [`OfferingWrite`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferingWriteKind {
    Create,
    Update,
}

impl From<OfferingWrite> for OfferingWriteKind {
    fn from(w: OfferingWrite) -> Self {
        match w {
            OfferingWrite::Create => OfferingWriteKind::Create,
            OfferingWrite::Update => OfferingWriteKind::Update,
        }
    }
}

impl ServiceOutcome {
    fn pending(service: &Service, write: OfferingWrite) -> Self {
        Self {
            label: service.label.clone(),
            unique_id: service.unique_id.clone(),
            write: write.into(),
            guid: None,
            state: ReplayState::Pending,
            skip_reason: None,
            offering_failure: None,
            plans_added: 0,
            plans_updated: 0,
            plan_failures: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Active services first, then new services, each in catalog order.
    pub services: Vec<ServiceOutcome>,
}

impl ReplaySummary {
    pub fn offering_failures(&self) -> usize {
        self.services
            .iter()
            .filter(|s| s.offering_failure.is_some())
            .count()
    }

    pub fn plan_failures(&self) -> usize {
        self.services.iter().map(|s| s.plan_failures).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.offering_failures() == 0 && self.plan_failures() == 0
    }
}

// ---------------------------------------------------------------------------
// Replayer
// ---------------------------------------------------------------------------

pub struct Replayer<'t> {
    transport: &'t dyn RegistryTransport,
}

impl<'t> Replayer<'t> {
    pub fn new(transport: &'t dyn RegistryTransport) -> Self {
        Self { transport }
    }

    /// Replay active services (offering update) then new services
    /// (offering create). Never fails; see [`ServiceOutcome`] per service.
    pub fn replay(&self, active: &[ServiceChanges], new: &[ServiceChanges]) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        for changes in active {
            summary
                .services
                .push(self.replay_service(changes, OfferingWrite::Update));
        }
        for changes in new {
            summary
                .services
                .push(self.replay_service(changes, OfferingWrite::Create));
        }
        summary
    }

    fn replay_service(&self, changes: &ServiceChanges, write: OfferingWrite) -> ServiceOutcome {
        let service = &changes.service;
        let mut outcome = ServiceOutcome::pending(service, write);

        let submitted = self.submit_offering(service, write);
        outcome.state = ReplayState::OfferingSubmitted;

        let service_guid = match submitted {
            Ok(guid) => guid,
            Err(failure) => {
                outcome.offering_failure = Some(failure);
                outcome.skip_reason = Some(SkipReason::OfferingFailed);
                outcome.state = ReplayState::PlansSkipped;
                return outcome;
            }
        };
        outcome.guid = Some(service_guid.clone());

        if !service.active {
            debug!(service = %service.display_name(), "service inactive; plan changes not propagated");
            outcome.skip_reason = Some(SkipReason::ServiceInactive);
            outcome.state = ReplayState::PlansSkipped;
            return outcome;
        }

        let cs = &changes.change_set;
        debug!(
            service_guid = %service_guid,
            add = cs.plans_to_add.len(),
            update = cs.plans_to_update.len(),
            "processing plans"
        );

        for plan in &cs.plans_to_add {
            if self.write_plan(plan, &service_guid, PlanWrite::Add) {
                outcome.plans_added += 1;
            } else {
                outcome.plan_failures += 1;
            }
        }
        for plan in &cs.plans_to_update {
            if self.write_plan(plan, &service_guid, PlanWrite::Update) {
                outcome.plans_updated += 1;
            } else {
                outcome.plan_failures += 1;
            }
        }

        outcome.state = ReplayState::PlansProcessed;
        outcome
    }

    /// Create or update the offering; on success return the registry guid.
    fn submit_offering(
        &self,
        service: &Service,
        write: OfferingWrite,
    ) -> Result<String, OfferingFailure> {
        let (method, uri) = match write {
            OfferingWrite::Create => (HttpMethod::Post, SERVICES_URI.to_string()),
            OfferingWrite::Update => match service.guid.as_deref() {
                Some(guid) if !guid.is_empty() => (HttpMethod::Put, service_uri(guid)),
                _ => {
                    error!(service = %service.display_name(), "cannot update offering without registry guid");
                    return Err(OfferingFailure::NoRegistryGuid);
                }
            },
        };
        let body = service.offering_body(write);

        debug!(
            method = %method,
            uri = %uri,
            body = %body,
            "{} service offering",
            if write == OfferingWrite::Update { "update" } else { "advertise" }
        );

        let resp = match self.transport.request(method, &uri, Some(&body)) {
            Ok(resp) => resp,
            Err(e) => {
                error!(service = %service.display_name(), uri = %uri, error = %e, "failed to advertise offering");
                return Err(OfferingFailure::Transport {
                    message: e.to_string(),
                });
            }
        };

        if !resp.is_success() {
            error!(
                service = %service.display_name(),
                uri = %uri,
                status = resp.status,
                "failed to advertise offering"
            );
            return Err(OfferingFailure::Api {
                status: resp.status,
            });
        }

        match response_guid(&resp) {
            Some(guid) => {
                info!(status = resp.status, guid = %guid, service = %service.display_name(), "advertised offering");
                Ok(guid)
            }
            None => {
                error!(
                    service = %service.display_name(),
                    uri = %uri,
                    status = resp.status,
                    "offering response carried no metadata.guid"
                );
                Err(OfferingFailure::MissingResponseGuid {
                    status: resp.status,
                })
            }
        }
    }

    /// Issue one plan add/update. Returns `true` on a 2xx response.
    fn write_plan(&self, plan: &Plan, service_guid: &str, write: PlanWrite) -> bool {
        let (method, uri) = match write {
            PlanWrite::Add => (HttpMethod::Post, SERVICE_PLANS_URI.to_string()),
            PlanWrite::Update => match plan.guid.as_deref() {
                Some(guid) if !guid.is_empty() => (HttpMethod::Put, service_plan_uri(guid)),
                _ => {
                    error!(plan = %plan.name, "cannot update plan without registry guid");
                    return false;
                }
            },
        };
        let verb = match write {
            PlanWrite::Add => "add",
            PlanWrite::Update => "update",
        };
        let body: Value = plan.write_body(service_guid);

        info!(plan = %plan.name, plan_guid = plan.guid.as_deref().unwrap_or(""), uri = %uri, "{verb} plan");

        match self.transport.request(method, &uri, Some(&body)) {
            Ok(resp) if resp.is_success() => {
                info!(plan = %plan.name, status = resp.status, "{verb} plan succeeded");
                true
            }
            Ok(resp) => {
                error!(plan = %plan.name, uri = %uri, status = resp.status, "failed to {verb} plan");
                false
            }
            Err(e) => {
                error!(plan = %plan.name, uri = %uri, error = %e, "failed to {verb} plan");
                false
            }
        }
    }
}

fn response_guid(resp: &RegistryResponse) -> Option<String> {
    let v = resp.json().ok()?;
    v.pointer("/metadata/guid")
        .and_then(Value::as_str)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
}
