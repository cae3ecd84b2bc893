use std::time::Duration;

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Typed view of the merged config. Holds env var NAMES, never credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvertiserSettings {
    pub registry_base_url: String,
    /// Name of the env var carrying the registry bearer token.
    pub registry_token_env: Option<String>,
    pub registry_timeout_secs: u64,
    pub catalog_path: String,
    pub enabled: bool,
    pub interval_secs: u64,
}

impl AdvertiserSettings {
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let registry_base_url = required_str(config, "/registry/base_url")?;
        if !(registry_base_url.starts_with("http://") || registry_base_url.starts_with("https://"))
        {
            bail!(
                "CONFIG_INVALID_VALUE /registry/base_url: expected an http(s) URL, got '{}'",
                registry_base_url
            );
        }

        let registry_timeout_secs =
            optional_u64(config, "/registry/timeout_secs")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let interval_secs =
            optional_u64(config, "/advertiser/interval_secs")?.unwrap_or(DEFAULT_INTERVAL_SECS);
        if registry_timeout_secs == 0 {
            bail!("CONFIG_INVALID_VALUE /registry/timeout_secs: must be > 0");
        }
        if interval_secs == 0 {
            bail!("CONFIG_INVALID_VALUE /advertiser/interval_secs: must be > 0");
        }

        Ok(Self {
            registry_base_url: registry_base_url.trim_end_matches('/').to_string(),
            registry_token_env: optional_str(config, "/registry/token_env")?,
            registry_timeout_secs,
            catalog_path: required_str(config, "/catalog/path")?,
            enabled: optional_bool(config, "/advertiser/enabled")?.unwrap_or(true),
            interval_secs,
        })
    }

    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry_timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

// ---------------------------------------------------------------------------
// Pointer readers
// ---------------------------------------------------------------------------

fn required_str(config: &Value, pointer: &str) -> Result<String> {
    match optional_str(config, pointer)? {
        Some(s) => Ok(s),
        None => bail!("CONFIG_MISSING_KEY {}: required string is absent or empty", pointer),
    }
}

/// Blank strings read as absent.
fn optional_str(config: &Value, pointer: &str) -> Result<Option<String>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let t = s.trim();
            Ok((!t.is_empty()).then(|| t.to_string()))
        }
        Some(other) => bail!("CONFIG_INVALID_TYPE {}: expected string, got {}", pointer, other),
    }
}

fn optional_u64(config: &Value, pointer: &str) -> Result<Option<u64>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) => Ok(Some(n)),
            None => bail!(
                "CONFIG_INVALID_TYPE {}: expected non-negative integer, got {}",
                pointer,
                v
            ),
        },
    }
}

fn optional_bool(config: &Value, pointer: &str) -> Result<Option<bool>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => bail!("CONFIG_INVALID_TYPE {}: expected bool, got {}", pointer, other),
    }
}
