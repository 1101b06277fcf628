use anyhow::{Context, Result};
use gva_config::{EntryConfig, HttpConfig};

use crate::{HttpClaimSubmitter, HttpOrderVerifier};

/// Shared `reqwest` client with the configured timeout.
pub fn build_http_client(cfg: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(cfg.timeout())
        .user_agent(concat!("gva-client/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("http client build failed")
}

/// Both HTTP collaborators built from one validated config, sharing a
/// connection pool.
pub fn http_collaborators(cfg: &EntryConfig) -> Result<(HttpOrderVerifier, HttpClaimSubmitter)> {
    cfg.validate()?;
    let http = build_http_client(&cfg.http)?;
    let verifier = HttpOrderVerifier::new(http.clone(), cfg.endpoints.verify_order.clone());
    let submitter = HttpClaimSubmitter::new(
        http,
        cfg.endpoints.claim_ticket.clone(),
        cfg.claim.encoding,
    );
    Ok((verifier, submitter))
}
