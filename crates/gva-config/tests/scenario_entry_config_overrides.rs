//! EntryConfig: YAML defaults, file layering and endpoint env overrides.
//!
//! GREEN when:
//! - an empty config yields the built-in defaults
//! - YAML layers loaded from disk override in order
//! - env overrides replace only the endpoint addresses
//! - an override that is not an absolute http(s) URL fails validation
//! - a malformed encoding value is a load error, not a silent default
//! - a dotenv file feeds the process environment without clobbering it

use gva_config::{
    apply_env_overrides, load_env_file, load_layered_yaml, load_layered_yaml_from_strings,
    ClaimEncoding, EntryConfig, ENV_CLAIM_TICKET_URL, ENV_VERIFY_ORDER_URL,
};
use std::io::Write;

#[test]
fn empty_config_uses_defaults() {
    let loaded = load_layered_yaml_from_strings(&[""]).unwrap();
    let cfg = EntryConfig::from_loaded(&loaded).unwrap();
    assert_eq!(cfg, EntryConfig::default());
}

#[test]
fn layered_files_override_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let env = dir.path().join("prod.yaml");

    let mut f = std::fs::File::create(&base).unwrap();
    writeln!(
        f,
        "endpoints:\n  verify_order: \"https://a.example/verify\"\n  claim_ticket: \"https://a.example/claim\"\nhttp:\n  timeout_ms: 4000"
    )
    .unwrap();
    let mut f = std::fs::File::create(&env).unwrap();
    writeln!(f, "claim:\n  encoding: multipart\nhttp:\n  timeout_ms: 1500").unwrap();

    let loaded = load_layered_yaml(&[base.to_str().unwrap(), env.to_str().unwrap()]).unwrap();
    let cfg = EntryConfig::from_loaded(&loaded).unwrap();

    assert_eq!(cfg.endpoints.verify_order, "https://a.example/verify");
    assert_eq!(cfg.http.timeout_ms, 1500);
    assert_eq!(cfg.claim.encoding, ClaimEncoding::Multipart);
}

#[test]
fn missing_file_is_a_contextual_error() {
    let err = load_layered_yaml(&["/definitely/not/here.yaml"]).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read yaml path"));
}

#[test]
fn env_overrides_replace_only_endpoints() {
    let loaded = load_layered_yaml_from_strings(&["http:\n  timeout_ms: 2500\n"]).unwrap();
    let mut cfg = EntryConfig::from_loaded(&loaded).unwrap();

    apply_env_overrides(&mut cfg, |name| match name {
        n if n == ENV_VERIFY_ORDER_URL => Some("https://env.example/verify".to_string()),
        n if n == ENV_CLAIM_TICKET_URL => Some("https://env.example/claim".to_string()),
        _ => Some("ignored".to_string()),
    });

    assert_eq!(cfg.endpoints.verify_order, "https://env.example/verify");
    assert_eq!(cfg.endpoints.claim_ticket, "https://env.example/claim");
    assert_eq!(cfg.http.timeout_ms, 2500);
    cfg.validate().unwrap();
}

#[test]
fn bad_override_fails_validation() {
    let mut cfg = EntryConfig::default();
    apply_env_overrides(&mut cfg, |name| {
        (name == ENV_CLAIM_TICKET_URL).then(|| "claim-ticket".to_string())
    });
    let err = cfg.validate().unwrap_err().to_string();
    assert!(err.contains("endpoints.claim_ticket"), "{err}");
}

#[test]
fn unknown_encoding_is_rejected() {
    let loaded = load_layered_yaml_from_strings(&["claim:\n  encoding: xml\n"]).unwrap();
    assert!(EntryConfig::from_loaded(&loaded).is_err());
}

#[test]
fn dotenv_file_loads_without_overwriting() {
    std::env::set_var("GVA_DOTENV_PRESET_MARKER", "from-process");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env.local");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "GVA_DOTENV_FILE_MARKER=from-file").unwrap();
    writeln!(f, "GVA_DOTENV_PRESET_MARKER=from-file").unwrap();
    drop(f);

    assert!(load_env_file(&path));
    assert_eq!(std::env::var("GVA_DOTENV_FILE_MARKER").unwrap(), "from-file");
    assert_eq!(
        std::env::var("GVA_DOTENV_PRESET_MARKER").unwrap(),
        "from-process"
    );

    assert!(!load_env_file(&dir.path().join("missing.env")));
}
