//! Client for the workflow-automation engine behind the premium tools.

use crate::config::{parse_base, RetryConfig};
use crate::error::{ClientError, ClientResult};
use crate::transport::HttpTransport;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;
use smartlead_core::license::FeatureToken;
use std::time::Duration;
use url::Url;

const FEATURE_TOKEN_HEADER: &str = "x-feature-token";

#[derive(Debug, Clone)]
pub struct WorkflowClient {
    http: HttpTransport,
    base_url: Url,
    license_key: Option<String>,
}

impl WorkflowClient {
    pub fn new(base_url: &str, license_key: Option<String>) -> ClientResult<Self> {
        Ok(Self {
            http: HttpTransport::new(Duration::from_secs(30), RetryConfig::no_retry(), None)?,
            base_url: parse_base(base_url)?,
            license_key,
        })
    }

    fn headers(&self, token: &FeatureToken) -> ClientResult<HeaderMap> {
        let invalid = |_| ClientError::Config("credential contains invalid characters".to_string());

        let mut headers = HeaderMap::new();
        headers.insert(
            FEATURE_TOKEN_HEADER,
            HeaderValue::from_str(&token.token).map_err(invalid)?,
        );
        if let Some(key) = &self.license_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key)).map_err(invalid)?,
            );
        }
        Ok(headers)
    }

    pub async fn list_workflows(&self, token: &FeatureToken) -> ClientResult<Value> {
        let url = self.base_url.join("workflows")?;
        let result = self
            .http
            .send(Method::GET, url, &[], None, self.headers(token)?)
            .await;
        map_denied(result)
    }

    pub async fn execute_workflow(
        &self,
        token: &FeatureToken,
        workflow_id: &str,
        data: &Value,
    ) -> ClientResult<Value> {
        check_workflow_id(workflow_id)?;
        let url = self
            .base_url
            .join(&format!("workflows/{}/execute", workflow_id))?;
        let result = self
            .http
            .send(Method::POST, url, &[], Some(data), self.headers(token)?)
            .await;
        map_denied(result)
    }
}

/// The id becomes one path segment; anything that could leave it is refused
fn check_workflow_id(id: &str) -> ClientResult<()> {
    if id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(|c| matches!(c, '/' | '\\' | '?' | '#'))
    {
        return Err(ClientError::InvalidArgument(format!(
            "workflow_id {:?} is not a valid workflow id",
            id
        )));
    }
    Ok(())
}

/// A 403 means the engine rejected the feature token
fn map_denied(result: ClientResult<Value>) -> ClientResult<Value> {
    result.map_err(|e| match e {
        ClientError::Api { status: 403, .. } => ClientError::Api {
            status: 403,
            message: "Premium feature access denied. Please check your license status."
                .to_string(),
        },
        other => other,
    })
}
