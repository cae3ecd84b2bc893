#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;

pub const CATALOG_YAML: &str = r#"
services:
  - label: db
    provider: core
    version: "1.0"
    unique_id: svc-db
    plans:
      - name: small
        unique_id: db-small
        description: "2 GB"
  - label: search
    provider: core
    version: "7.0"
    unique_id: svc-search
    plans:
      - name: basic
"#;

/// Write a catalog plus a config pointing at `base_url`; returns the config path.
pub fn write_config(dir: &Path, base_url: &str, extra_yaml: &str) -> PathBuf {
    let catalog = dir.join("catalog.yaml");
    std::fs::write(&catalog, CATALOG_YAML).unwrap();

    let config = dir.join("svcad.yaml");
    let body = format!(
        "registry:\n  base_url: \"{base_url}\"\n  timeout_secs: 5\ncatalog:\n  path: \"{}\"\n{extra_yaml}",
        catalog.display()
    );
    std::fs::write(&config, body).unwrap();
    config
}

/// `svcad` isolated from the developer's environment.
pub fn svcad(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("svcad").unwrap();
    cmd.current_dir(dir)
        .env_remove("SVCAD_REGISTRY_TOKEN")
        .env("RUST_LOG", "info");
    cmd
}

/// One registry page holding the `db` offering with its `small` plan.
pub fn registry_page_with_db() -> serde_json::Value {
    serde_json::json!({
        "total_results": 1,
        "next_url": null,
        "resources": [{
            "metadata": { "guid": "g-db" },
            "entity": {
                "label": "db", "provider": "core", "version": "1.0",
                "unique_id": "svc-db", "active": true,
                "service_plans": [{
                    "metadata": { "guid": "pg-small" },
                    "entity": { "name": "small", "unique_id": "db-small", "description": "2 GB" }
                }]
            }
        }]
    })
}
