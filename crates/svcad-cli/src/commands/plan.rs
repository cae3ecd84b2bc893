//! `svcad plan`: classify and diff against the live registry, print JSON.
//!
//! Only `GET` requests are issued. The transport handed to the advertiser
//! is never asked to write because `advertise()` is never called.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use svcad_advertiser::{PassPlan, ServiceAdvertiser};
use svcad_reconcile::TupleMatchDiagnostic;
use svcad_registry::{fetch_registered_services, load_catalog_file};

use super::{connect, load_pass_context, run_blocking, PassContext};

#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub config_hash: String,
    pub registry: String,
    pub enabled: bool,
    pub active_count: usize,
    pub disabled_count: usize,
    pub diagnostics: Vec<TupleMatchDiagnostic>,
    pub plan: PassPlan,
}

pub fn compute_plan(ctx: &PassContext) -> Result<PlanOutput> {
    let catalog = load_catalog_file(&ctx.settings.catalog_path)?;
    let transport = connect(ctx)?;
    let registered =
        fetch_registered_services(&transport).context("REGISTRY_SNAPSHOT_FAILED")?;

    let advertiser =
        ServiceAdvertiser::new(catalog, registered, &transport, ctx.settings.enabled);

    Ok(PlanOutput {
        config_hash: ctx.config_hash.clone(),
        registry: ctx.settings.registry_base_url.clone(),
        enabled: ctx.settings.enabled,
        active_count: advertiser.active_count(),
        disabled_count: advertiser.disabled_count(),
        diagnostics: advertiser.classification().diagnostics.clone(),
        plan: advertiser.plan(),
    })
}

pub async fn plan(config_paths: Vec<String>, strict: bool) -> Result<()> {
    let ctx = Arc::new(load_pass_context(&config_paths, strict)?);

    let output = run_blocking(move || compute_plan(&ctx)).await?;
    let json = serde_json::to_string_pretty(&output).context("serialize plan json failed")?;
    println!("{json}");
    Ok(())
}
