//! svcad-advertiser
//!
//! One reconciliation pass: classify the broker catalog against the
//! registry snapshot, diff plans, and replay the difference as registry
//! writes.
//!
//! Replay is sequential and blocking. Failures are logged and absorbed; a
//! failed offering write skips that service's plans and the pass moves on.
//! Nothing is retried within a pass and orphaned registry offerings are
//! never deleted.

mod advertiser;
mod replay;

pub use advertiser::{AdvertiseReport, PassPlan, ServiceAdvertiser, ServiceChanges};
pub use replay::{
    OfferingFailure, OfferingWriteKind, PlanWrite, ReplayState, ReplaySummary, Replayer,
    ServiceOutcome, SkipReason,
};
