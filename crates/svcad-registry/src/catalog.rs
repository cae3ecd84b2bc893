//! Broker catalog loader.
//!
//! A catalog document is YAML or JSON with a top-level `services` list in
//! broker order. Only identity fields needed for matching are checked:
//! every service needs a label and every plan a name. Guids in the file are
//! discarded; guids only ever come from the registry.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use svcad_schemas::Service;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Yaml,
    Json,
}

impl CatalogFormat {
    /// `.json` is JSON; anything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => CatalogFormat::Json,
            _ => CatalogFormat::Yaml,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDoc {
    #[serde(default)]
    services: Vec<Service>,
}

pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<Vec<Service>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog: {}", path.display()))?;
    parse_catalog_str(&raw, CatalogFormat::from_path(path))
        .with_context(|| format!("invalid catalog: {}", path.display()))
}

pub fn parse_catalog_str(raw: &str, format: CatalogFormat) -> Result<Vec<Service>> {
    let doc: CatalogDoc = match format {
        CatalogFormat::Json => serde_json::from_str(raw).context("catalog json decode failed")?,
        CatalogFormat::Yaml => serde_yaml::from_str(raw).context("catalog yaml decode failed")?,
    };

    let mut services = doc.services;
    for (i, svc) in services.iter_mut().enumerate() {
        if svc.label.trim().is_empty() {
            bail!("CATALOG_IDENTITY_MISSING: services[{i}] has empty label");
        }
        for (j, plan) in svc.plans.iter().enumerate() {
            if plan.name.trim().is_empty() {
                bail!(
                    "CATALOG_IDENTITY_MISSING: services[{i}] ('{}') plans[{j}] has empty name",
                    svc.label
                );
            }
        }

        svc.guid = None;
        for plan in svc.plans.iter_mut() {
            plan.guid = None;
        }
    }

    Ok(services)
}
