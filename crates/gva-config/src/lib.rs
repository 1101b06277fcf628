//! gva-config
//!
//! Layered YAML configuration for the entry workflow.
//!
//! - Documents merge in order: earlier docs are base, later docs override
//!   (objects deep-merge, everything else replaces).
//! - The merged document is canonicalized to JSON and hashed (SHA-256) so a
//!   session can log exactly which configuration it ran with.
//! - `report_unused_keys` flags leaves nothing reads; the caller chooses
//!   whether that is a warning or an error.
//! - `EntryConfig` is the typed view the clients are built from.

mod entry;

pub use entry::{
    apply_env_overrides, load_env_file, ClaimConfig, ClaimEncoding, EndpointsConfig,
    EntryConfig, HttpConfig, DOTENV_FILE, ENV_CLAIM_TICKET_URL, ENV_VERIFY_ORDER_URL,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;

/// JSON-pointer prefixes read by `EntryConfig`. A leaf under any of these is
/// consumed; every other leaf is reported as unused.
///
/// Keep in sync with the `serde` shape of `EntryConfig`.
pub const CONSUMED_POINTERS: &[&str] = &[
    "/endpoints/verify_order",
    "/endpoints/claim_ticket",
    "/http/timeout_ms",
    "/claim/encoding",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Produce an unused-key report.
///
/// A leaf is consumed when its pointer equals a registry entry or sits below
/// one. With `Fail`, any unused leaf is an error; with `Warn` the report is
/// always returned.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let registry: Vec<Vec<&str>> = CONSUMED_POINTERS
        .iter()
        .map(|p| p.split('/').filter(|t| !t.is_empty()).collect())
        .collect();

    let mut unused = BTreeSet::new();
    let mut path = Vec::new();
    walk_unused(config_json, &mut path, &registry, &mut unused);

    let consumed_prefixes: BTreeSet<String> =
        CONSUMED_POINTERS.iter().map(|p| p.to_string()).collect();
    let report = UnusedKeyReport {
        consumed_prefixes: consumed_prefixes.into_iter().collect(),
        unused_leaf_pointers: unused.into_iter().collect(),
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        let shown: Vec<&String> = report.unused_leaf_pointers.iter().take(12).collect();
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s); remove them or add them \
            to CONSUMED_POINTERS. First few: {:?}",
            report.unused_leaf_pointers.len(),
            shown
        );
    }

    Ok(report)
}

/// Depth-first walk over `v`. `path` holds the unescaped tokens leading to
/// `v`; a subtree stops being walked as soon as a registry entry covers it.
fn walk_unused(
    v: &Value,
    path: &mut Vec<String>,
    registry: &[Vec<&str>],
    unused: &mut BTreeSet<String>,
) {
    let covered = registry
        .iter()
        .any(|entry| entry.len() <= path.len() && entry.iter().zip(path.iter()).all(|(e, t)| *e == t.as_str()));
    if covered {
        return;
    }

    let children: Vec<(String, &Value)> = match v {
        Value::Object(map) => map.iter().map(|(k, c)| (k.clone(), c)).collect(),
        Value::Array(items) => items.iter().enumerate().map(|(i, c)| (i.to_string(), c)).collect(),
        _ => {
            unused.insert(to_pointer(path));
            return;
        }
    };

    for (token, child) in children {
        path.push(token);
        walk_unused(child, path, registry, unused);
        path.pop();
    }
}

/// RFC 6901 pointer for a token path (`~` and `/` escaped).
fn to_pointer(path: &[String]) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.iter()
        .map(|t| format!("/{}", t.replace('~', "~0").replace('/', "~1")))
        .collect()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Lowercase hex SHA-256 of `canonical_json`.
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

/// Read and layer YAML files in order.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let docs = paths
        .iter()
        .map(|p| fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}")))
        .collect::<Result<Vec<String>>>()?;
    let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(serde_json::Map::new());
    for (idx, raw) in yaml_docs.iter().enumerate() {
        let layer: serde_yaml::Value = serde_yaml::from_str(raw)
            .with_context(|| format!("invalid yaml in layer {idx}"))?;
        // An empty document parses as null; treat it as an empty layer.
        if layer.is_null() {
            continue;
        }
        let layer = serde_json::to_value(layer)
            .with_context(|| format!("yaml->json conversion failed for layer {idx}"))?;
        merge_layer(&mut merged, layer);
    }

    // serde_json's default Map is key-sorted, so compact output is canonical.
    let canonical_json =
        serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = hex::encode(Sha256::digest(canonical_json.as_bytes()));
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Overlay `layer` onto `base` in place: objects merge key by key, anything
/// else replaces.
fn merge_layer(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base_map), Value::Object(layer_map)) => {
            for (key, value) in layer_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_layer(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unused(v: Value) -> Vec<String> {
        report_unused_keys(&v, UnusedKeyPolicy::Warn)
            .unwrap()
            .unused_leaf_pointers
    }

    #[test]
    fn registry_covers_only_whole_tokens() {
        assert!(unused(json!({"http": {"timeout_ms": 10}})).is_empty());
        assert_eq!(
            unused(json!({"http": {"timeout_ms_extra": 1}})),
            vec!["/http/timeout_ms_extra".to_string()]
        );
        assert_eq!(unused(json!({"https": 1})), vec!["/https".to_string()]);
    }

    #[test]
    fn arrays_report_indexed_leaves() {
        assert_eq!(
            unused(json!({"extra": ["a", "b"]})),
            vec!["/extra/0".to_string(), "/extra/1".to_string()]
        );
    }

    #[test]
    fn scalar_root_is_reported_as_root() {
        assert_eq!(unused(json!(5)), vec!["/".to_string()]);
    }

    #[test]
    fn merge_overrides_leaves_and_keeps_siblings() {
        let mut base = json!({"http": {"timeout_ms": 1000}, "claim": {"encoding": "json"}});
        merge_layer(&mut base, json!({"http": {"timeout_ms": 2500}}));
        assert_eq!(base["http"]["timeout_ms"], 2500);
        assert_eq!(base["claim"]["encoding"], "json");

        merge_layer(&mut base, json!({"claim": "flat"}));
        assert_eq!(base["claim"], "flat");
    }

    #[test]
    fn leaf_pointers_escape_tokens() {
        assert_eq!(unused(json!({"a/b": {"c~d": 1}})), vec!["/a~1b/c~0d".to_string()]);
    }
}
