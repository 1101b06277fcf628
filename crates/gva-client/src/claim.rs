use gva_config::ClaimEncoding;
use gva_forms::{ClaimOutcome, ClaimRequest};
use tracing::debug;

use crate::error::ClientError;
use crate::wire::interpret_claim_response;
use crate::ClaimSubmitter;

/// Claim-ticket collaborator over HTTP.
///
/// The five claim keys are sent either as a JSON object or as multipart form
/// fields, per `ClaimEncoding`. The collaborator accepts both.
#[derive(Debug, Clone)]
pub struct HttpClaimSubmitter {
    http: reqwest::Client,
    url: String,
    encoding: ClaimEncoding,
}

impl HttpClaimSubmitter {
    pub fn new(http: reqwest::Client, url: impl Into<String>, encoding: ClaimEncoding) -> Self {
        Self {
            http,
            url: url.into(),
            encoding,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn encoding(&self) -> ClaimEncoding {
        self.encoding
    }

    fn build(&self, req: &ClaimRequest) -> reqwest::RequestBuilder {
        let builder = self.http.post(&self.url);
        match self.encoding {
            ClaimEncoding::Json => builder.json(req),
            ClaimEncoding::Multipart => {
                let form = req
                    .form_fields()
                    .into_iter()
                    .fold(reqwest::multipart::Form::new(), |form, (key, value)| {
                        form.text(key, value.to_string())
                    });
                builder.multipart(form)
            }
        }
    }

    async fn exchange(&self, req: &ClaimRequest) -> Result<(u16, Vec<u8>), ClientError> {
        let resp = self.build(req).send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait::async_trait]
impl ClaimSubmitter for HttpClaimSubmitter {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn submit_claim(&self, req: &ClaimRequest) -> ClaimOutcome {
        match self.exchange(req).await {
            Ok((status, body)) => interpret_claim_response(status, &body),
            Err(err) => {
                debug!(url = %self.url, error = %err, "claim-ticket call failed");
                ClaimOutcome::transport(err.to_string())
            }
        }
    }
}
