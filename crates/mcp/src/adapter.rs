// Adapters that carry a dispatched call to the upstream services

use crate::tools::automation::{EXECUTE_WORKFLOW, LIST_WORKFLOWS};
use crate::tools::RestTool;
use async_trait::async_trait;
use serde_json::Value;
use smartlead_client::{SmartleadClient, WorkflowClient};
use smartlead_core::{Adapter, AdapterError, LicenseEvaluator, OperationDescriptor};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Serves REST-backed tools through the Smartlead client
pub struct RestAdapter {
    client: SmartleadClient,
    tools: HashMap<String, RestTool>,
}

impl RestAdapter {
    pub fn new(client: SmartleadClient, tools: impl IntoIterator<Item = RestTool>) -> Self {
        Self {
            client,
            tools: tools
                .into_iter()
                .map(|t| (t.descriptor.name.clone(), t))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[async_trait]
impl Adapter for RestAdapter {
    async fn call(
        &self,
        operation: &OperationDescriptor,
        arguments: Value,
    ) -> Result<Value, AdapterError> {
        let tool = self.tools.get(&operation.name).ok_or_else(|| {
            AdapterError::message(format!("no route for tool {}", operation.name))
        })?;

        let request = tool
            .route
            .prepare(arguments)
            .map_err(|e| AdapterError::message(e.to_string()))?;
        debug!(
            tool = %operation.name,
            method = %tool.route.method,
            path = %request.path,
            "Calling upstream"
        );

        self.client
            .request(
                tool.route.base,
                tool.route.method.clone(),
                &request.path,
                &request.query,
                request.body.as_ref(),
            )
            .await
            .map_err(AdapterError::from)
    }
}

/// Serves the premium workflow tools
pub struct WorkflowAdapter {
    client: Option<WorkflowClient>,
    license: Arc<LicenseEvaluator>,
}

impl WorkflowAdapter {
    /// `client` is `None` when no workflow engine is configured
    pub fn new(client: Option<WorkflowClient>, license: Arc<LicenseEvaluator>) -> Self {
        Self { client, license }
    }
}

#[async_trait]
impl Adapter for WorkflowAdapter {
    async fn call(
        &self,
        operation: &OperationDescriptor,
        arguments: Value,
    ) -> Result<Value, AdapterError> {
        let client = self.client.as_ref().ok_or_else(|| {
            AdapterError::message("Workflow engine is not configured. Set N8N_API_URL to enable it.")
        })?;

        let token = self.license.feature_token().await.ok_or_else(|| {
            AdapterError::message("Unable to validate premium feature access. Please try again later.")
        })?;

        let result = match operation.name.as_str() {
            LIST_WORKFLOWS => client.list_workflows(&token).await,
            EXECUTE_WORKFLOW => {
                let workflow_id = match arguments.get("workflow_id") {
                    Some(Value::String(id)) => id.clone(),
                    Some(Value::Number(id)) => id.to_string(),
                    _ => return Err(AdapterError::message("workflow_id is required")),
                };
                let data = arguments
                    .get("data")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Default::default()));
                client.execute_workflow(&token, &workflow_id, &data).await
            }
            other => return Err(AdapterError::message(format!("no route for tool {}", other))),
        };
        result.map_err(AdapterError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{campaign, email_accounts, registry::*};
    use serde_json::json;
    use smartlead_client::{ApiBase, RetryConfig};
    use smartlead_core::license::{
        FeatureToken, LicenseError, LicenseServer, LicenseSettings, Tier, UsageReport,
        ValidationResponse,
    };
    use smartlead_core::Category;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SmartleadClient {
        SmartleadClient::builder()
            .api_key("test-key")
            .core_url(format!("{}/api/v1", server.uri()))
            .delivery_url(format!("{}/delivery", server.uri()))
            .retry_config(RetryConfig::no_retry())
            .build()
            .unwrap()
    }

    fn descriptor(tools: &[RestTool], name: &str) -> OperationDescriptor {
        tools
            .iter()
            .find(|t| t.descriptor.name == name)
            .map(|t| t.descriptor.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_with_path_and_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/campaigns/42/sequence-analytics"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("start_date", "2024-01-01"))
            .and(query_param("end_date", "2024-01-31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let tools = campaign::tools();
        let adapter = RestAdapter::new(client(&server), tools.clone());
        let result = adapter
            .call(
                &descriptor(&tools, "smartlead_get_campaign_sequence_analytics"),
                json!({ "campaign_id": 42, "start_date": "2024-01-01", "end_date": "2024-01-31" }),
            )
            .await
            .unwrap();
        assert_eq!(result, json!({ "data": [] }));
    }

    #[tokio::test]
    async fn test_delete_with_id_list_body() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v1/campaigns/7/email-accounts"))
            .and(body_json(json!({ "email_accounts_ids": [99] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let tools = email_accounts::tools();
        let adapter = RestAdapter::new(client(&server), tools.clone());
        adapter
            .call(
                &descriptor(&tools, "smartlead_remove_email_from_campaign"),
                json!({ "campaign_id": 7, "email_account_id": 99 }),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_routes_to_selected_base() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/delivery/spam-test/report/mailboxes-count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 3 })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = RestTool::new(
            "smartlead_get_mailbox_count",
            "count",
            Category::SmartDelivery,
            json_schema_object(json!({}), vec![]),
            Route::get("spam-test/report/mailboxes-count").on(ApiBase::SmartDelivery),
        );
        let adapter = RestAdapter::new(client(&server), vec![tool.clone()]);
        let result = adapter.call(&tool.descriptor, json!({})).await.unwrap();
        assert_eq!(result["count"], 3);
    }

    #[tokio::test]
    async fn test_upstream_message_is_kept() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/campaigns/1"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "message": "Campaign not found" })),
            )
            .mount(&server)
            .await;

        let tools = campaign::tools();
        let adapter = RestAdapter::new(client(&server), tools.clone());
        let err = adapter
            .call(&descriptor(&tools, "smartlead_get_campaign"), json!({ "campaign_id": 1 }))
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(404));
        assert_eq!(err.to_string(), "Campaign not found");
    }

    #[tokio::test]
    async fn test_csv_export_passes_through_as_string() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/campaigns/5/leads-export"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/csv")
                    .set_body_string("email,first_name\na@b.c,Ann\n"),
            )
            .mount(&server)
            .await;

        let tools = campaign::tools();
        let adapter = RestAdapter::new(client(&server), tools.clone());
        let result = adapter
            .call(
                &descriptor(&tools, "smartlead_export_campaign_leads"),
                json!({ "campaign_id": 5 }),
            )
            .await
            .unwrap();
        assert_eq!(result, json!("email,first_name\na@b.c,Ann\n"));
    }

    #[tokio::test]
    async fn test_unknown_tool_has_no_route() {
        let server = MockServer::start().await;
        let adapter = RestAdapter::new(client(&server), Vec::new());
        let stray = descriptor(&campaign::tools(), "smartlead_get_campaign");
        let err = adapter.call(&stray, json!({ "campaign_id": 1 })).await.unwrap_err();
        assert!(err.to_string().contains("no route"));
    }

    struct PremiumServer;

    #[async_trait]
    impl LicenseServer for PremiumServer {
        async fn validate(&self, _: &str, _: &str) -> Result<ValidationResponse, LicenseError> {
            Ok(ValidationResponse {
                valid: true,
                level: Some(Tier::Premium),
                ..Default::default()
            })
        }

        async fn track(&self, _: UsageReport) -> Result<(), LicenseError> {
            Ok(())
        }

        async fn issue_token(&self, _: &str) -> Result<FeatureToken, LicenseError> {
            Ok(FeatureToken {
                token: "ft-1".to_string(),
                expires_at: chrono_now_plus_hour(),
            })
        }
    }

    fn chrono_now_plus_hour() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now() + chrono::Duration::hours(1)
    }

    fn premium_license() -> Arc<LicenseEvaluator> {
        let settings = LicenseSettings {
            license_key: Some("lic".to_string()),
            ..Default::default()
        };
        Arc::new(LicenseEvaluator::new(settings, Some(Arc::new(PremiumServer)), "m1"))
    }

    #[tokio::test]
    async fn test_workflow_execute_sends_feature_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/workflows/wf-1/execute"))
            .and(header("X-Feature-Token", "ft-1"))
            .and(body_json(json!({ "lead": 3 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "executionId": "e1" })))
            .expect(1)
            .mount(&server)
            .await;

        let workflows = WorkflowClient::new(&server.uri(), Some("lic".to_string())).unwrap();
        let adapter = WorkflowAdapter::new(Some(workflows), premium_license());
        let execute = crate::tools::automation::descriptors()
            .into_iter()
            .find(|d| d.name == EXECUTE_WORKFLOW)
            .unwrap();

        let result = adapter
            .call(&execute, json!({ "workflow_id": "wf-1", "data": { "lead": 3 } }))
            .await
            .unwrap();
        assert_eq!(result["executionId"], "e1");
    }

    #[tokio::test]
    async fn test_workflow_without_token_fails_clearly() {
        // Free tier: no workflow integration, so no token
        let license = Arc::new(LicenseEvaluator::new(LicenseSettings::default(), None, "m1"));
        let workflows = WorkflowClient::new("http://127.0.0.1:1", None).unwrap();
        let adapter = WorkflowAdapter::new(Some(workflows), license);
        let list = crate::tools::automation::descriptors()
            .into_iter()
            .find(|d| d.name == LIST_WORKFLOWS)
            .unwrap();

        let err = adapter.call(&list, json!({})).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to validate premium feature access. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_workflow_engine_not_configured() {
        let adapter = WorkflowAdapter::new(None, premium_license());
        let list = crate::tools::automation::descriptors().remove(0);
        let err = adapter.call(&list, json!({})).await.unwrap_err();
        assert!(err.to_string().contains("N8N_API_URL"));
    }
}
