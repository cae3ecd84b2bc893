//! Scenario: per-service plan diffing.
//!
//! # Invariants under test
//!
//! 1. New service: every catalog plan is an add, nothing is an update.
//! 2. Changed plan (matched by `unique_id`) is an update carrying the
//!    registry plan guid.
//! 3. Plans without `unique_id` fall back to matching by name.
//! 4. Identical plans are omitted from both lists.
//! 5. Diffing a registry that already reflects the catalog yields an empty
//!    change set (idempotence).
//! 6. A `unique_id` the registry assigned to a plan the catalog left
//!    without one is not a change.

use svcad_reconcile::*;
use svcad_schemas::{Plan, Service};

fn p1(description: &str) -> Plan {
    Plan::new("p1", description).with_unique_id("plan-1")
}

#[test]
fn new_service_adds_every_plan() {
    let catalog = Service::new("db", "core", "1.0")
        .with_unique_id("A")
        .with_plan(p1("v1"))
        .with_plan(Plan::new("p2", "second"));

    let cs = compute_change_set(&catalog, None);

    assert_eq!(cs.plans_to_add, catalog.plans);
    assert!(cs.plans_to_update.is_empty());
}

#[test]
fn changed_plan_becomes_update_with_registry_guid() {
    let registered = Service::new("db", "core", "1.0")
        .with_unique_id("A")
        .with_guid("g1")
        .with_plan(p1("v0").with_guid("pg1"));
    let catalog = Service::new("db", "core", "1.0")
        .with_unique_id("A")
        .with_plan(p1("v1"));

    let c = classify(std::slice::from_ref(&catalog), std::slice::from_ref(&registered));
    assert_eq!(c.active.len(), 1);
    let active = &c.active[0];
    assert_eq!(active.service.guid.as_deref(), Some("g1"));

    let cs = compute_change_set(&active.service, Some(&active.registered));

    assert!(cs.plans_to_add.is_empty());
    assert_eq!(cs.plans_to_update.len(), 1);
    assert_eq!(cs.plans_to_update[0].guid.as_deref(), Some("pg1"));
    assert_eq!(cs.plans_to_update[0].description, "v1");
}

#[test]
fn plans_without_unique_id_match_by_name() {
    let registered = Service::new("db", "core", "1.0")
        .with_guid("g1")
        .with_plan(Plan::new("small", "old text").with_guid("pg-small"))
        .with_plan(Plan::new("large", "same").with_guid("pg-large"));
    let catalog = Service::new("db", "core", "1.0")
        .with_plan(Plan::new("small", "new text"))
        .with_plan(Plan::new("large", "same"))
        .with_plan(Plan::new("xl", "brand new"));

    let cs = compute_change_set(&catalog, Some(&registered));

    assert_eq!(cs.plans_to_add.len(), 1);
    assert_eq!(cs.plans_to_add[0].name, "xl");
    assert_eq!(cs.plans_to_add[0].guid, None);

    assert_eq!(cs.plans_to_update.len(), 1);
    assert_eq!(cs.plans_to_update[0].name, "small");
    assert_eq!(cs.plans_to_update[0].guid.as_deref(), Some("pg-small"));
}

#[test]
fn renamed_plan_with_stable_id_is_an_update_not_an_add() {
    let registered = Service::new("db", "core", "1.0")
        .with_guid("g1")
        .with_plan(Plan::new("small", "d").with_unique_id("plan-1").with_guid("pg1"));
    let catalog = Service::new("db", "core", "1.0")
        .with_plan(Plan::new("starter", "d").with_unique_id("plan-1"));

    let cs = compute_change_set(&catalog, Some(&registered));

    assert!(cs.plans_to_add.is_empty());
    assert_eq!(cs.plans_to_update.len(), 1);
    assert_eq!(cs.plans_to_update[0].name, "starter");
    assert_eq!(cs.plans_to_update[0].guid.as_deref(), Some("pg1"));
}

#[test]
fn registry_plan_is_claimed_once() {
    let registered = Service::new("db", "core", "1.0")
        .with_guid("g1")
        .with_plan(Plan::new("small", "d").with_guid("pg1"));
    let catalog = Service::new("db", "core", "1.0")
        .with_plan(Plan::new("small", "d"))
        .with_plan(Plan::new("small", "d"));

    let cs = compute_change_set(&catalog, Some(&registered));

    assert_eq!(cs.plans_to_add.len(), 1);
    assert!(cs.plans_to_update.is_empty());
}

#[test]
fn diffing_is_stable_once_registry_reflects_catalog() {
    let catalog = Service::new("db", "core", "1.0")
        .with_unique_id("A")
        .with_plan(p1("v1"))
        .with_plan(Plan::new("p2", "second"));

    // What the registry holds after a successful pass: same attributes,
    // guids assigned.
    let mut synced = catalog.clone().with_guid("g1");
    for (i, plan) in synced.plans.iter_mut().enumerate() {
        plan.guid = Some(format!("pg{i}"));
    }

    let c = classify(std::slice::from_ref(&catalog), std::slice::from_ref(&synced));
    let active = &c.active[0];
    let cs = compute_change_set(&active.service, Some(&active.registered));

    assert!(cs.is_empty(), "no-change input must produce no plan writes: {cs:?}");
}

#[test]
fn registry_assigned_plan_id_does_not_trigger_update() {
    let catalog = Service::new("db", "core", "1.0")
        .with_unique_id("A")
        .with_plan(Plan::new("small", "d"));
    let registered = Service::new("db", "core", "1.0")
        .with_unique_id("A")
        .with_guid("g1")
        .with_plan(
            Plan::new("small", "d")
                .with_unique_id("cc-assigned")
                .with_guid("pg1"),
        );

    let cs = compute_change_set(&catalog, Some(&registered));

    assert!(cs.is_empty(), "unchanged plan must not be re-diffed: {cs:?}");
}

#[test]
fn catalog_plan_id_differing_from_registry_is_an_update() {
    let catalog = Service::new("db", "core", "1.0")
        .with_unique_id("A")
        .with_plan(Plan::new("small", "d").with_unique_id("plan-new"));
    let registered = Service::new("db", "core", "1.0")
        .with_unique_id("A")
        .with_guid("g1")
        .with_plan(
            Plan::new("small", "d")
                .with_unique_id("plan-old")
                .with_guid("pg1"),
        );

    let cs = compute_change_set(&catalog, Some(&registered));

    assert!(cs.plans_to_add.is_empty());
    assert_eq!(cs.plans_to_update.len(), 1);
    assert_eq!(cs.plans_to_update[0].guid.as_deref(), Some("pg1"));
}
