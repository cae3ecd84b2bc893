//! svcad-reconcile
//!
//! Catalog vs registry reconciliation.
//!
//! - Catalog services are matched to registry services by `unique_id`,
//!   falling back to the `(label, version, provider)` tuple.
//! - A registry service binds to at most one catalog service.
//! - Unclaimed registry services are reported as inactive, never mutated.
//! - Plans of each matched/new service are diffed into a [`ChangeSet`].
//!
//! Deterministic, pure logic. No IO. No registry calls.

mod change_set;
mod counts;
mod engine;
mod types;

pub use change_set::compute_change_set;
pub use counts::PassCounts;
pub use engine::{classify, same_tuple, same_unique_id};
pub use types::*;
