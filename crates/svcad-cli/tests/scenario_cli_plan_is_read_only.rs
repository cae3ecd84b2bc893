//! Scenario: `svcad plan` against a mock registry.
//!
//! # Invariants under test
//!
//! 1. Prints a JSON plan: matched services with their change sets, new
//!    services, and counts.
//! 2. Issues only the snapshot `GET`; no `POST`/`PUT` reaches the registry.
//! 3. `--strict-config` turns an unused config key into a failure before
//!    any request is made.
//! 4. A configured token env var that is unset fails with SECRETS_MISSING.
//! 5. The bearer token from the named env var is sent on the snapshot call.

mod common;

use httpmock::prelude::*;
use predicates::prelude::*;

#[test]
fn plan_prints_json_and_writes_nothing() {
    let server = MockServer::start();
    let snapshot = server.mock(|when, then| {
        when.method(GET).path("/v2/services");
        then.status(200).json_body(common::registry_page_with_db());
    });
    let writes_post = server.mock(|when, then| {
        when.method(POST);
        then.status(201);
    });
    let writes_put = server.mock(|when, then| {
        when.method(PUT);
        then.status(200);
    });

    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(dir.path(), &server.base_url(), "");

    let out = common::svcad(dir.path())
        .args(["plan", "--config", config.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["enabled"], true);
    assert_eq!(json["active_count"], 2);
    assert_eq!(json["disabled_count"], 0);
    assert_eq!(json["plan"]["active"][0]["service"]["guid"], "g-db");
    assert_eq!(
        json["plan"]["active"][0]["change_set"]["plans_to_add"]
            .as_array()
            .unwrap()
            .len(),
        0
    );
    assert_eq!(json["plan"]["new"][0]["service"]["label"], "search");
    assert_eq!(json["config_hash"].as_str().unwrap().len(), 64);

    snapshot.assert();
    writes_post.assert_hits(0);
    writes_put.assert_hits(0);
}

#[test]
fn strict_config_rejects_unused_keys_before_any_request() {
    let server = MockServer::start();
    let snapshot = server.mock(|when, then| {
        when.method(GET).path("/v2/services");
        then.status(200).json_body(common::registry_page_with_db());
    });

    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(
        dir.path(),
        &server.base_url(),
        "advertiser:\n  dry_run: true\n",
    );

    common::svcad(dir.path())
        .args(["--strict-config", "plan", "--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_UNUSED_KEYS"));

    snapshot.assert_hits(0);
}

#[test]
fn unset_token_env_fails_with_its_name() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(dir.path(), "http://127.0.0.1:9", "");
    let overlay = dir.path().join("token.yaml");
    std::fs::write(&overlay, "registry:\n  token_env: SVCAD_TEST_UNSET_TOKEN\n").unwrap();

    common::svcad(dir.path())
        .env_remove("SVCAD_TEST_UNSET_TOKEN")
        .args([
            "plan",
            "--config",
            config.to_str().unwrap(),
            "--config",
            overlay.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SECRETS_MISSING"))
        .stderr(predicate::str::contains("SVCAD_TEST_UNSET_TOKEN"));
}

#[test]
fn bearer_token_is_sent_from_named_env_var() {
    let server = MockServer::start();
    let snapshot = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/services")
            .header("authorization", "Bearer tok-from-env-123");
        then.status(200).json_body(common::registry_page_with_db());
    });

    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(dir.path(), &server.base_url(), "");
    let overlay = dir.path().join("token.yaml");
    std::fs::write(&overlay, "registry:\n  token_env: SVCAD_TEST_PLAN_TOKEN\n").unwrap();

    common::svcad(dir.path())
        .env("SVCAD_TEST_PLAN_TOKEN", "tok-from-env-123")
        .args([
            "plan",
            "--config",
            config.to_str().unwrap(),
            "--config",
            overlay.to_str().unwrap(),
        ])
        .assert()
        .success();

    snapshot.assert();
}
