//! Command handler modules for the `svcad` binary.
//!
//! Shared config loading and pass wiring live here. The registry client is
//! blocking, so every pass runs on the blocking pool via [`run_blocking`].

pub mod advertise;
pub mod plan;

use anyhow::{Context, Result};
use svcad_advertiser::{AdvertiseReport, ServiceAdvertiser};
use svcad_config::{
    report_unused_keys, resolve_registry_token, AdvertiserSettings, LoadedConfig, UnusedKeyPolicy,
};
use svcad_registry::{fetch_registered_services, load_catalog_file, HttpRegistryTransport};
use tracing::warn;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Everything a command needs before it can talk to the registry.
/// **Token is redacted in `Debug` output.**
#[derive(Clone)]
pub struct PassContext {
    pub config_hash: String,
    pub settings: AdvertiserSettings,
    pub token: Option<String>,
}

impl std::fmt::Debug for PassContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassContext")
            .field("config_hash", &self.config_hash)
            .field("settings", &self.settings)
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// Load layered config, apply the unused-key guard, build typed settings,
/// and resolve the registry token once.
pub fn load_pass_context(config_paths: &[String], strict: bool) -> Result<PassContext> {
    let loaded: LoadedConfig = svcad_config::load_layered_yaml(config_paths)?;

    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(&loaded.config_json, policy)?;
    if !report.is_clean() {
        warn!(
            unused_leaf_keys = report.unused_leaf_pointers.len(),
            "CONFIG_UNUSED_KEYS"
        );
        for p in report.unused_leaf_pointers.iter().take(50) {
            warn!(unused = %p, "unused config key");
        }
    }

    let settings = AdvertiserSettings::from_config_json(&loaded.config_json)?;
    let token = resolve_registry_token(&settings)?.into_token();

    Ok(PassContext {
        config_hash: loaded.config_hash,
        settings,
        token,
    })
}

// ---------------------------------------------------------------------------
// Pass wiring
// ---------------------------------------------------------------------------

pub fn connect(ctx: &PassContext) -> Result<HttpRegistryTransport> {
    HttpRegistryTransport::new(
        ctx.settings.registry_base_url.clone(),
        ctx.token.clone(),
        ctx.settings.registry_timeout(),
    )
}

/// One full pass: reload the catalog, snapshot the registry, replay.
///
/// A snapshot failure aborts the pass before any write is issued.
pub fn run_pass(ctx: &PassContext) -> Result<AdvertiseReport> {
    let catalog = load_catalog_file(&ctx.settings.catalog_path)?;
    let transport = connect(ctx)?;
    let registered =
        fetch_registered_services(&transport).context("REGISTRY_SNAPSHOT_FAILED")?;

    let advertiser =
        ServiceAdvertiser::new(catalog, registered, &transport, ctx.settings.enabled);
    Ok(advertiser.advertise())
}

/// Run blocking registry work off the async executor.
pub async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("registry worker panicked")?
}

pub fn print_report(config_hash: &str, report: &AdvertiseReport) {
    println!("pass_id={}", report.pass_id);
    println!("config_hash={}", config_hash);
    println!("started_at_utc={}", report.started_at.to_rfc3339());
    println!("finished_at_utc={}", report.finished_at.to_rfc3339());
    println!(
        "matched={} new={} inactive={}",
        report.counts.matched, report.counts.new, report.counts.inactive
    );
    println!(
        "active_count={} disabled_count={}",
        report.counts.active_count(),
        report.counts.disabled_count()
    );
    println!(
        "offering_failures={} plan_failures={}",
        report.replay.offering_failures(),
        report.replay.plan_failures()
    );
}
