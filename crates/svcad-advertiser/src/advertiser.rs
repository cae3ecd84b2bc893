use chrono::{DateTime, Utc};
use serde::Serialize;
use svcad_reconcile::{classify, compute_change_set, ChangeSet, Classification, PassCounts};
use svcad_registry::RegistryTransport;
use svcad_schemas::Service;
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::{ReplaySummary, Replayer};

/// A service paired with the plan writes it needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceChanges {
    pub service: Service,
    pub change_set: ChangeSet,
}

/// Everything a pass would write, computed without touching the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PassPlan {
    pub counts: PassCounts,
    pub active: Vec<ServiceChanges>,
    pub new: Vec<ServiceChanges>,
    /// Registry offerings with no catalog counterpart. Reported only.
    pub inactive: Vec<Service>,
}

/// Result of [`ServiceAdvertiser::advertise`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdvertiseReport {
    pub pass_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub counts: PassCounts,
    pub replay: ReplaySummary,
}

/// One reconciliation pass over a catalog and a registry snapshot.
///
/// Classification happens at construction; [`Self::advertise`] replays it.
/// The advertiser owns its inputs for the duration of the pass and is
/// meant to be dropped afterwards.
pub struct ServiceAdvertiser<'t> {
    transport: &'t dyn RegistryTransport,
    classification: Classification,
    counts: PassCounts,
}

impl<'t> ServiceAdvertiser<'t> {
    pub fn new(
        catalog: Vec<Service>,
        registered: Vec<Service>,
        transport: &'t dyn RegistryTransport,
        enabled: bool,
    ) -> Self {
        debug!(services = ?registered, "registered in registry");
        debug!(services = ?catalog, "current catalog");

        let classification = classify(&catalog, &registered);
        let counts = PassCounts::new(enabled, catalog.len(), registered.len(), &classification);

        Self {
            transport,
            classification,
            counts,
        }
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn counts(&self) -> PassCounts {
        self.counts
    }

    /// Catalog size when enabled, else zero.
    pub fn active_count(&self) -> usize {
        self.counts.active_count()
    }

    /// Orphaned registry offerings when enabled, else the whole registry.
    pub fn disabled_count(&self) -> usize {
        self.counts.disabled_count()
    }

    /// Compute every change set for this pass without issuing any request.
    pub fn plan(&self) -> PassPlan {
        let active = self
            .classification
            .active
            .iter()
            .map(|a| ServiceChanges {
                change_set: compute_change_set(&a.service, Some(&a.registered)),
                service: a.service.clone(),
            })
            .collect();
        let new = self
            .classification
            .new
            .iter()
            .map(|s| ServiceChanges {
                change_set: compute_change_set(s, None),
                service: s.clone(),
            })
            .collect();

        PassPlan {
            counts: self.counts,
            active,
            new,
            inactive: self.classification.inactive.clone(),
        }
    }

    /// Run the pass: update matched offerings, create new ones, and apply
    /// their plan changes. Failures are absorbed into the report.
    pub fn advertise(&self) -> AdvertiseReport {
        let pass_id = Uuid::new_v4();
        let span = info_span!("advertise_pass", pass_id = %pass_id);
        let _guard = span.enter();
        let started_at = Utc::now();

        let plan = self.plan();
        for changes in plan.active.iter().chain(plan.new.iter()) {
            debug!(
                service = %changes.service.display_name(),
                plans_to_add = changes.change_set.plans_to_add.len(),
                plans_to_update = changes.change_set.plans_to_update.len(),
                "service change set"
            );
        }

        let replay = Replayer::new(self.transport).replay(&plan.active, &plan.new);

        info!(
            "Found {} active, {} disabled and {} new service offerings",
            plan.active.len(),
            self.disabled_count(),
            plan.new.len()
        );

        AdvertiseReport {
            pass_id,
            started_at,
            finished_at: Utc::now(),
            counts: self.counts,
            replay,
        }
    }
}
