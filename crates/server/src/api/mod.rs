use crate::config::AppState;
use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

mod handlers;
pub mod sse;

/// Start the HTTP bridge
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP bridge listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Operator endpoints
        .route("/api/health", get(health_check))
        .route("/api/license", get(handlers::license_status))
        .route("/api/tools", get(handlers::list_tools))
        // MCP over plain HTTP
        .route("/mcp", post(handlers::mcp_request))
        // MCP over SSE
        .route("/sse", get(sse::open_session))
        .route("/message", post(sse::post_message))
        // Middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "smartlead-mcp",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error type for API handlers
pub struct ApiError {
    status: StatusCode,
    error: anyhow::Error,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: anyhow::anyhow!(message.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let details = self
            .error
            .chain()
            .skip(1)
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(": ");

        let response = ErrorResponse {
            error: self.error.to_string(),
            details: (!details.is_empty()).then_some(details),
        };

        (self.status, Json(response)).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use futures::StreamExt;
    use serde_json::{json, Value};
    use smartlead_core::GatewayConfig;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut config = GatewayConfig::default();
        config.api.key = Some("sk-test-0123456789".to_string());
        create_router(AppState::new(&config).unwrap())
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_license_status_is_redacted() {
        let response = app()
            .oneshot(Request::get("/api/license").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;

        assert_eq!(body["decision"]["tier"], "free");
        assert_eq!(body["decision"]["status"], "default_fallback");
        assert!(!body.to_string().contains("sk-test-0123456789"));
    }

    #[tokio::test]
    async fn test_tools_lists_enabled_set() {
        let response = app()
            .oneshot(Request::get("/api/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        let tools = body["tools"].as_array().unwrap();

        assert!(!tools.is_empty());
        assert!(tools.iter().any(|t| t["name"] == "smartlead_list_campaigns"));
        assert!(!tools.iter().any(|t| t["name"] == "smartlead_get_vendors"));
    }

    #[tokio::test]
    async fn test_mcp_post_round_trip() {
        let response = app()
            .oneshot(post_json("/mcp", json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"], json!({}));
    }

    #[tokio::test]
    async fn test_mcp_post_notification_is_accepted() {
        let response = app()
            .oneshot(post_json(
                "/mcp",
                json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_message_for_unknown_session() {
        let response = app()
            .oneshot(post_json(
                "/message?sessionId=6f1c2d8e-0a4b-4c3d-9e2f-1a2b3c4d5e6f",
                json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sse_session_round_trip() {
        let app = app();

        let response = app
            .clone()
            .oneshot(Request::get("/sse").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mut events = response.into_body().into_data_stream();

        // First event names the endpoint to post to
        let mut received = String::new();
        while !received.contains("\n\n") {
            let chunk = events.next().await.unwrap().unwrap();
            received.push_str(&String::from_utf8_lossy(&chunk));
        }
        assert!(received.contains("event: endpoint"));
        let endpoint = received
            .lines()
            .find_map(|l| l.strip_prefix("data: "))
            .unwrap()
            .to_string();
        assert!(endpoint.starts_with("/message?sessionId="));

        let accepted = app
            .clone()
            .oneshot(post_json(
                &endpoint,
                json!({ "jsonrpc": "2.0", "id": 42, "method": "ping" }),
            ))
            .await
            .unwrap();
        assert_eq!(accepted.status(), StatusCode::ACCEPTED);

        // The response arrives on the stream
        let mut received = String::new();
        while !received.contains("\n\n") {
            let chunk = events.next().await.unwrap().unwrap();
            received.push_str(&String::from_utf8_lossy(&chunk));
        }
        assert!(received.contains("event: message"));
        let data = received
            .lines()
            .find_map(|l| l.strip_prefix("data: "))
            .unwrap();
        let message: Value = serde_json::from_str(data).unwrap();
        assert_eq!(message["id"], 42);
    }
}
