use gva_forms::{VerifyOutcome, VerifyRequest};
use tracing::debug;

use crate::error::ClientError;
use crate::wire::VerifyOrderResponse;
use crate::OrderVerifier;

/// Verify-order collaborator over HTTP: `POST {orderId}` as JSON.
#[derive(Debug, Clone)]
pub struct HttpOrderVerifier {
    http: reqwest::Client,
    url: String,
}

impl HttpOrderVerifier {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self, req: &VerifyRequest) -> Result<VerifyOrderResponse, ClientError> {
        let resp = self.http.post(&self.url).json(req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                code: status.as_u16(),
            });
        }

        resp.json::<VerifyOrderResponse>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl OrderVerifier for HttpOrderVerifier {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn verify_order(&self, req: &VerifyRequest) -> VerifyOutcome {
        match self.fetch(req).await {
            Ok(body) => body.into_outcome(),
            Err(err) => {
                debug!(url = %self.url, error = %err, "verify-order call failed");
                VerifyOutcome::transport(err.to_string())
            }
        }
    }
}
