//! Registry credential resolution.
//!
//! Config stores only the NAME of the env var holding the bearer token
//! (`/registry/token_env`). The token is read once at startup and handed
//! to the transport; nothing else calls `std::env::var` for it.
//!
//! - `token_env` set: the variable is required.
//! - `token_env` absent: [`DEFAULT_TOKEN_ENV`] is read if present,
//!   otherwise the registry is called without credentials.
//!
//! Error messages name the variable, never the value.

use anyhow::{bail, Result};

use crate::settings::AdvertiserSettings;

/// Fallback env var consulted when the config does not name one.
pub const DEFAULT_TOKEN_ENV: &str = "SVCAD_REGISTRY_TOKEN";

/// Bearer token for the registry. **Value is redacted in `Debug` output.**
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryToken {
    /// Env var the token was read from (or would have been).
    pub source_env: String,
    pub token: Option<String>,
}

impl RegistryToken {
    pub fn into_token(self) -> Option<String> {
        self.token
    }

    pub fn is_present(&self) -> bool {
        self.token.is_some()
    }
}

impl std::fmt::Debug for RegistryToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryToken")
            .field("source_env", &self.source_env)
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// Blank values read as unset.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// Resolve the registry token from the process environment.
pub fn resolve_registry_token(settings: &AdvertiserSettings) -> Result<RegistryToken> {
    resolve_registry_token_with(settings, resolve_env)
}

/// Resolve the registry token through `lookup` instead of the process
/// environment. `lookup` returns `None` for unset or blank variables.
pub fn resolve_registry_token_with<F>(
    settings: &AdvertiserSettings,
    lookup: F,
) -> Result<RegistryToken>
where
    F: Fn(&str) -> Option<String>,
{
    match settings.registry_token_env.as_deref() {
        Some(name) => match lookup(name) {
            Some(token) => Ok(RegistryToken {
                source_env: name.to_string(),
                token: Some(token),
            }),
            None => bail!(
                "SECRETS_MISSING: required env var '{}' (registry token) is not set or empty",
                name
            ),
        },
        None => Ok(RegistryToken {
            source_env: DEFAULT_TOKEN_ENV.to_string(),
            token: lookup(DEFAULT_TOKEN_ENV),
        }),
    }
}
