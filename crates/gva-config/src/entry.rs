//! Typed configuration consumed by the HTTP clients.
//!
//! # Contract
//! - YAML provides defaults for every key; an empty config is valid.
//! - The two endpoint addresses may be overridden from the environment
//!   (`GVA_VERIFY_ORDER_URL`, `GVA_CLAIM_TICKET_URL`). Nothing else is read
//!   from the environment, and env lookups happen only in this module.
//! - `validate` runs after overrides so a bad env value is caught too.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::LoadedConfig;

pub const ENV_VERIFY_ORDER_URL: &str = "GVA_VERIFY_ORDER_URL";
pub const ENV_CLAIM_TICKET_URL: &str = "GVA_CLAIM_TICKET_URL";

const DEFAULT_VERIFY_ORDER_URL: &str = "http://localhost:3000/api/verify-order";
const DEFAULT_CLAIM_TICKET_URL: &str = "http://localhost:3000/api/claim-ticket";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Dev-time env file, relative to the working directory.
pub const DOTENV_FILE: &str = ".env.local";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub verify_order: String,
    pub claim_ticket: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            verify_order: DEFAULT_VERIFY_ORDER_URL.to_string(),
            claim_ticket: DEFAULT_CLAIM_TICKET_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout. Covers connect + response.
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// How the claim payload is put on the wire. Both use the same five keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimEncoding {
    #[default]
    Json,
    Multipart,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimConfig {
    pub encoding: ClaimEncoding,
}

// ---------------------------------------------------------------------------
// EntryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    pub endpoints: EndpointsConfig,
    pub http: HttpConfig,
    pub claim: ClaimConfig,
}

impl EntryConfig {
    /// Typed view of a loaded config. Does not consult the environment.
    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Self> {
        let cfg: EntryConfig = serde_json::from_value(loaded.config_json.clone())
            .context("config does not match the entry config shape")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// `from_loaded` plus endpoint overrides from the process environment,
    /// after loading `.env.local` from the working directory if present.
    pub fn from_loaded_with_env(loaded: &LoadedConfig) -> Result<Self> {
        Self::from_loaded_with_env_file(loaded, Path::new(DOTENV_FILE))
    }

    /// As `from_loaded_with_env`, reading dev-time variables from `env_file`.
    /// A missing file is not an error.
    pub fn from_loaded_with_env_file(loaded: &LoadedConfig, env_file: &Path) -> Result<Self> {
        load_env_file(env_file);
        let mut cfg: EntryConfig = serde_json::from_value(loaded.config_json.clone())
            .context("config does not match the entry config shape")?;
        apply_env_overrides(&mut cfg, |name| std::env::var(name).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_http_url("endpoints.verify_order", &self.endpoints.verify_order)?;
        ensure_http_url("endpoints.claim_ticket", &self.endpoints.claim_ticket)?;
        if self.http.timeout_ms == 0 {
            bail!("CONFIG_INVALID http.timeout_ms must be > 0");
        }
        Ok(())
    }
}

fn ensure_http_url(key: &str, raw: &str) -> Result<()> {
    let parsed = Url::parse(raw)
        .with_context(|| format!("CONFIG_INVALID {key} is not a valid URL: {raw:?}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("CONFIG_INVALID {key} must use http or https, got {raw:?}");
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        bail!("CONFIG_INVALID {key} has no host: {raw:?}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Apply endpoint overrides. `lookup` returns the value of an env var by name;
/// empty values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut EntryConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(url) = non_empty(ENV_VERIFY_ORDER_URL) {
        cfg.endpoints.verify_order = url;
    }
    if let Some(url) = non_empty(ENV_CLAIM_TICKET_URL) {
        cfg.endpoints.claim_ticket = url;
    }
}

/// Load `KEY=value` lines from `path` into the process environment. Variables
/// that are already set win. Returns `false` if the file is missing or
/// malformed.
pub fn load_env_file(path: &Path) -> bool {
    dotenvy::from_path(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EntryConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.claim.encoding, ClaimEncoding::Json);
        assert_eq!(cfg.http.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn rejects_relative_and_non_http_urls() {
        assert!(ensure_http_url("k", "/api/verify").is_err());
        assert!(ensure_http_url("k", "ftp://host/x").is_err());
        assert!(ensure_http_url("k", "http://").is_err());
        assert!(ensure_http_url("k", "https://gift way.example/a").is_err());
        assert!(ensure_http_url("k", "https://giveaway.example/api").is_ok());
    }

    #[test]
    fn rejects_addresses_that_do_not_parse() {
        for bad in [
            "http://host:99999/x",
            "http://:80/x",
            "http://?x",
            "https://exa%mple.com",
            "mailto:giveaway@example.com",
        ] {
            let err = ensure_http_url("endpoints.verify_order", bad).unwrap_err();
            assert!(err.to_string().contains("CONFIG_INVALID"), "{bad}: {err}");
        }
        assert!(ensure_http_url("k", "http://127.0.0.1:3000/api/verify-order").is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = EntryConfig::default();
        cfg.http.timeout_ms = 0;
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("timeout_ms"), "{err}");
    }

    #[test]
    fn empty_env_values_do_not_override() {
        let mut cfg = EntryConfig::default();
        apply_env_overrides(&mut cfg, |_| Some("   ".to_string()));
        assert_eq!(cfg, EntryConfig::default());
    }
}
