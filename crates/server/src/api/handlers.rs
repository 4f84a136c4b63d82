use crate::config::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use smartlead_core::LicenseDecision;
use smartlead_mcp::protocol::ToolSchema;

/// Resolved license for this process
pub async fn license_status(State(state): State<AppState>) -> Json<LicenseStatusResponse> {
    let license = &state.mcp.router().context().license;
    let decision = license.resolve().await;

    Json(LicenseStatusResponse {
        decision,
        license_key: state.config.license.key.clone(),
        client_id: license.client_id().to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LicenseStatusResponse {
    pub decision: LicenseDecision,
    /// Masked
    pub license_key: Option<String>,
    pub client_id: String,
}

/// Tools the current license exposes
pub async fn list_tools(State(state): State<AppState>) -> Json<ListToolsResponse> {
    let operations = state.mcp.router().list_operations().await;
    let tools = operations.iter().map(ToolSchema::from).collect();
    Json(ListToolsResponse { tools })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListToolsResponse {
    pub tools: Vec<ToolSchema>,
}

/// One JSON-RPC message per request; notifications get 202 and no body
pub async fn mcp_request(State(state): State<AppState>, body: String) -> Response {
    match state.mcp.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
