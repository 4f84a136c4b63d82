// Premium workflow-automation tools, served by the workflow engine rather
// than the Smartlead REST API

use super::registry::*;
use serde_json::json;
use smartlead_core::{Category, InputContract, OperationDescriptor};

pub const LIST_WORKFLOWS: &str = "smartlead_list_workflows";
pub const EXECUTE_WORKFLOW: &str = "smartlead_execute_workflow";

pub fn descriptors() -> Vec<OperationDescriptor> {
    vec![
        OperationDescriptor::new(
            LIST_WORKFLOWS,
            "List the automation workflows available to this license (Premium).",
            Category::WorkflowAutomation,
            InputContract::new(json_schema_object(json!({}), vec![])),
        ),
        OperationDescriptor::new(
            EXECUTE_WORKFLOW,
            "Execute an automation workflow with the given input data (Premium).",
            Category::WorkflowAutomation,
            InputContract::new(json_schema_object(
                json!({
                    "workflow_id": json_schema_string("ID of the workflow to execute"),
                    "data": json_schema_free_object("Input data passed to the workflow")
                }),
                vec!["workflow_id"],
            )),
        ),
    ]
}
