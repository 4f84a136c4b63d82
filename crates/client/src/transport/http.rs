//! HTTP transport shared by every upstream client.

use crate::config::RetryConfig;
use crate::error::{ClientError, ClientResult};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// HTTP transport for making API requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    retry_config: RetryConfig,
    /// Appended as the `api_key` query parameter when set.
    api_key: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new(
        timeout: Duration,
        retry_config: RetryConfig,
        api_key: Option<String>,
    ) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            retry_config,
            api_key,
        })
    }

    /// Execute a request with retries on throttling, unavailability and timeouts.
    async fn execute_with_retry(&self, request_builder: RequestBuilder) -> ClientResult<Response> {
        let retry_config = &self.retry_config;
        let mut attempt = 0;

        loop {
            let request = request_builder
                .try_clone()
                .ok_or_else(|| ClientError::Config("Request cannot be cloned".to_string()))?;

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();

                    if response.status().is_success() {
                        return Ok(response);
                    }

                    if retry_config.can_retry(attempt) && retry_config.should_retry_status(status) {
                        let backoff = retry_config.backoff_for_attempt(attempt);
                        warn!(
                            status = status,
                            attempt = attempt + 1,
                            backoff_ms = backoff.as_millis() as u64,
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                        attempt += 1;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(ClientError::from_response(status, &body));
                }
                Err(e) => {
                    if retry_config.can_retry(attempt) && e.is_timeout() {
                        let backoff = retry_config.backoff_for_attempt(attempt);
                        warn!(
                            attempt = attempt + 1,
                            backoff_ms = backoff.as_millis() as u64,
                            "Request timed out, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Send one request and return its payload.
    ///
    /// JSON bodies are parsed; anything else (CSV exports, plain text) comes
    /// back as a JSON string. An empty body is `null`.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        query: &[(String, String)],
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> ClientResult<Value> {
        debug!(method = %method, url = %url, "Upstream request");

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(api_key) = &self.api_key {
            builder = builder.query(&[("api_key", api_key.as_str())]);
        }
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = self.execute_with_retry(builder).await?;
        read_payload(response).await
    }

    /// Execute a GET request.
    pub async fn get(&self, url: Url, query: &[(String, String)]) -> ClientResult<Value> {
        self.send(Method::GET, url, query, None, HeaderMap::new()).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post(&self, url: Url, body: &Value) -> ClientResult<Value> {
        self.send(Method::POST, url, &[], Some(body), HeaderMap::new())
            .await
    }
}

async fn read_payload(response: Response) -> ClientResult<Value> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("json"))
        .unwrap_or(false);
    let text = response.text().await?;

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    if is_json {
        return Ok(serde_json::from_str(&text)?);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// Flatten a JSON object into query pairs.
///
/// Nulls are skipped, arrays become comma-separated lists and nested
/// objects are sent as JSON text.
pub fn query_pairs(arguments: &Map<String, Value>) -> Vec<(String, String)> {
    arguments
        .iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
                other => other.to_string(),
            };
            Some((key.clone(), rendered))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            ..Default::default()
        }
    }

    fn transport(retry: RetryConfig) -> HttpTransport {
        HttpTransport::new(Duration::from_secs(5), retry, Some("sk-test".to_string())).unwrap()
    }

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[tokio::test]
    async fn test_get_sends_api_key_and_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .and(query_param("api_key", "sk-test"))
            .and(query_param("client_id", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
            .mount(&server)
            .await;

        let result = transport(RetryConfig::no_retry())
            .get(url(&server, "/campaigns"), &[("client_id".to_string(), "7".to_string())])
            .await
            .unwrap();
        assert_eq!(result, json!([{ "id": 1 }]));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/campaigns/create"))
            .and(body_json(json!({ "name": "Q4" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "id": 9 })))
            .mount(&server)
            .await;

        let result = transport(RetryConfig::no_retry())
            .post(url(&server, "/campaigns/create"), &json!({ "name": "Q4" }))
            .await
            .unwrap();
        assert_eq!(result["id"], 9);
    }

    #[tokio::test]
    async fn test_retries_on_503_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let result = transport(fast_retry(3))
            .get(url(&server, "/flaky"), &[])
            .await
            .unwrap();
        assert_eq!(result, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/throttled"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({ "message": "Too many requests" })),
            )
            .expect(3)
            .mount(&server)
            .await;

        let err = transport(fast_retry(3))
            .get(url(&server, "/throttled"), &[])
            .await
            .unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Too many requests");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .expect(1)
            .mount(&server)
            .await;

        let err = transport(fast_retry(3))
            .get(url(&server, "/missing"), &[])
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_timeouts_are_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .expect(2)
            .mount(&server)
            .await;

        let transport =
            HttpTransport::new(Duration::from_millis(100), fast_retry(2), None).unwrap();
        let err = transport.get(url(&server, "/slow"), &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Http(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_non_json_body_is_passed_through() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/export"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/csv")
                    .set_body_string("email,name\na@b.c,Ann\n"),
            )
            .mount(&server)
            .await;

        let result = transport(RetryConfig::no_retry())
            .get(url(&server, "/export"), &[])
            .await
            .unwrap();
        assert_eq!(result, Value::String("email,name\na@b.c,Ann\n".to_string()));
    }

    #[test]
    fn test_query_pairs() {
        let args = json!({
            "offset": 10,
            "status": "ACTIVE",
            "ids": [1, 2, 3],
            "skip": null
        });
        let mut pairs = query_pairs(args.as_object().unwrap());
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("ids".to_string(), "1,2,3".to_string()),
                ("offset".to_string(), "10".to_string()),
                ("status".to_string(), "ACTIVE".to_string()),
            ]
        );
    }
}
