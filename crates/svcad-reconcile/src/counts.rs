//! Summary counts for one reconciliation pass.
//!
//! When the advertiser is disabled the legacy counts report no active
//! services and treat every registry record as disabled. `enabled` and the
//! raw sizes are kept alongside so callers can tell "advertiser off" apart
//! from "everything in the registry is orphaned".

use serde::Serialize;

use crate::Classification;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PassCounts {
    pub enabled: bool,
    pub catalog_size: usize,
    pub registry_size: usize,
    pub matched: usize,
    pub new: usize,
    pub inactive: usize,
}

impl PassCounts {
    pub fn new(
        enabled: bool,
        catalog_size: usize,
        registry_size: usize,
        classification: &Classification,
    ) -> Self {
        Self {
            enabled,
            catalog_size,
            registry_size,
            matched: classification.active.len(),
            new: classification.new.len(),
            inactive: classification.inactive.len(),
        }
    }

    /// Catalog size when enabled, else zero.
    pub fn active_count(&self) -> usize {
        if self.enabled {
            self.catalog_size
        } else {
            0
        }
    }

    /// Unclaimed registry records when enabled, else the whole registry.
    pub fn disabled_count(&self) -> usize {
        if self.enabled {
            self.inactive
        } else {
            self.registry_size
        }
    }
}
