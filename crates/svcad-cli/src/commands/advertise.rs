//! `svcad advertise` and `svcad watch`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::{load_pass_context, print_report, run_blocking, run_pass};

// ---------------------------------------------------------------------------
// advertise
// ---------------------------------------------------------------------------

/// One pass. Exits non-zero when any registry write failed.
pub async fn advertise_once(config_paths: Vec<String>, strict: bool) -> Result<()> {
    let ctx = Arc::new(load_pass_context(&config_paths, strict)?);

    let pass_ctx = Arc::clone(&ctx);
    let report = run_blocking(move || run_pass(&pass_ctx)).await?;
    print_report(&ctx.config_hash, &report);

    if !report.replay.is_clean() {
        bail!(
            "ADVERTISE_INCOMPLETE: {} offering failure(s), {} plan failure(s)",
            report.replay.offering_failures(),
            report.replay.plan_failures()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// watch
// ---------------------------------------------------------------------------

/// Periodic passes until Ctrl-C or `max_passes`.
///
/// Passes never overlap. A signal received mid-pass lets the pass finish
/// and stops before the next one. A failed pass is logged and the loop
/// carries on.
pub async fn watch(
    config_paths: Vec<String>,
    strict: bool,
    interval_override: Option<u64>,
    max_passes: Option<u64>,
) -> Result<()> {
    let ctx = Arc::new(load_pass_context(&config_paths, strict)?);

    let interval = match interval_override {
        Some(0) => bail!("--interval-secs must be > 0"),
        Some(secs) => Duration::from_secs(secs),
        None => ctx.settings.interval(),
    };
    info!(
        interval_secs = interval.as_secs(),
        registry = %ctx.settings.registry_base_url,
        "watch started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut passes: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!(passes, "shutdown requested");
                break;
            }
        }

        let pass_ctx = Arc::clone(&ctx);
        let pass = tokio::spawn(run_blocking(move || run_pass(&pass_ctx)));
        tokio::pin!(pass);

        let mut stop_after_pass = false;
        let joined = tokio::select! {
            joined = &mut pass => joined,
            _ = &mut shutdown => {
                warn!("shutdown requested; finishing current pass");
                stop_after_pass = true;
                pass.await
            }
        };

        match joined {
            Ok(Ok(report)) => print_report(&ctx.config_hash, &report),
            Ok(Err(e)) => error!(error = %format!("{e:#}"), "advertise pass failed"),
            Err(e) => error!(error = %e, "advertise pass aborted"),
        }

        passes += 1;
        if stop_after_pass || max_passes.is_some_and(|max| passes >= max) {
            break;
        }
    }

    info!(passes, "watch stopped");
    Ok(())
}
