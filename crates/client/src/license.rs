//! HTTP backend for the remote license server.

use crate::config::parse_base;
use crate::error::ClientResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use smartlead_core::license::{
    FeatureToken, LicenseError, LicenseServer, UsageReport, ValidationResponse,
};
use std::time::Duration;
use url::Url;

/// Talks to `/validate`, `/track` and `/token` on the license server.
///
/// Makes a single attempt per call; callers own timeouts and fallback.
#[derive(Debug, Clone)]
pub struct HttpLicenseServer {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
    /// Expiry as epoch milliseconds
    expires: i64,
}

impl HttpLicenseServer {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parse_base(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, LicenseError> {
        self.base_url
            .join(path)
            .map_err(|e| LicenseError::Transport(e.to_string()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, LicenseError> {
        let response = request
            .send()
            .await
            .map_err(|e| LicenseError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LicenseError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl LicenseServer for HttpLicenseServer {
    async fn validate(
        &self,
        license_key: &str,
        client_id: &str,
    ) -> Result<ValidationResponse, LicenseError> {
        let request = self
            .client
            .post(self.endpoint("validate")?)
            .bearer_auth(license_key)
            .header("X-Client-Id", client_id)
            .json(&json!({ "machineId": client_id }));

        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| LicenseError::Malformed(e.to_string()))
    }

    async fn track(&self, report: UsageReport) -> Result<(), LicenseError> {
        let request = self
            .client
            .post(self.endpoint("track")?)
            .bearer_auth(&report.key)
            .json(&report);

        self.send(request).await?;
        Ok(())
    }

    async fn issue_token(&self, license_key: &str) -> Result<FeatureToken, LicenseError> {
        let request = self
            .client
            .post(self.endpoint("token")?)
            .bearer_auth(license_key);

        let body: TokenResponse = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| LicenseError::Malformed(e.to_string()))?;

        let expires_at: DateTime<Utc> = DateTime::from_timestamp_millis(body.expires)
            .ok_or_else(|| LicenseError::Malformed(format!("bad expiry {}", body.expires)))?;
        Ok(FeatureToken {
            token: body.token,
            expires_at,
        })
    }
}
