// src/service_client.rs
//! HTTP relay client for the external CV evaluation service.

use reqwest::multipart::{Form, Part};
use tracing::info;

use crate::error::CvMatchError;
use crate::normalize::CanonicalRequest;
use crate::types::EvaluationResultMap;

const EVALUATE_ENDPOINT: &str = "/evaluate-cv";
const EVALUATIONS_ENDPOINT: &str = "/evaluations";

pub struct EvaluationClient {
    client: reqwest::Client,
    base_url: String,
}

impl EvaluationClient {
    /// Create a new client against the evaluation service base URL.
    ///
    /// No request timeout is configured; an unresponsive upstream stalls
    /// the request until the caller gives up.
    pub fn new(base_url: String) -> Result<Self, CvMatchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| CvMatchError::Upstream(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Forward a normalized submission as a fresh multipart transmission:
    /// one `job_codes` field carrying the JSON-encoded code array, one
    /// `cv_files` part per file. All-or-nothing; there are no partial
    /// results and no retries.
    pub async fn submit(
        &self,
        request: CanonicalRequest,
    ) -> Result<EvaluationResultMap, CvMatchError> {
        let url = format!("{}{}", self.base_url, EVALUATE_ENDPOINT);

        let job_codes = serde_json::to_string(&request.job_codes)
            .map_err(|e| CvMatchError::Validation(format!("Failed to encode job codes: {e}")))?;

        let mut form = Form::new().text("job_codes", job_codes);
        for file in request.files {
            let part = Part::bytes(file.data)
                .file_name(file.name)
                .mime_str(&file.content_type)
                .map_err(|e| {
                    CvMatchError::Validation(format!(
                        "Invalid content type {}; {e}",
                        file.content_type
                    ))
                })?;
            form = form.part("cv_files", part);
        }

        info!("Calling evaluation service: {}", url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CvMatchError::Upstream(e.to_string()))?;

        Self::decode(response).await
    }

    /// Fetch the full historical result set. An empty map is a valid
    /// success; only transport failures and non-2xx statuses are errors.
    pub async fn fetch_history(&self) -> Result<EvaluationResultMap, CvMatchError> {
        let url = format!("{}{}", self.base_url, EVALUATIONS_ENDPOINT);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CvMatchError::Upstream(e.to_string()))?;

        Self::decode(response).await
    }

    /// The response body is returned verbatim as a JSON object; a body
    /// that is not one is a contract break, not an outage.
    async fn decode(response: reqwest::Response) -> Result<EvaluationResultMap, CvMatchError> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(CvMatchError::Upstream(format!("status {status}; {body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CvMatchError::Upstream(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| CvMatchError::MalformedResponse(e.to_string()))
    }
}
