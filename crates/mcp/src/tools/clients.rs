// Client (agency sub-account) tools

use super::registry::*;
use serde_json::json;
use smartlead_core::Category;

const CATEGORY: Category = Category::ClientManagement;

pub fn tools() -> Vec<RestTool> {
    vec![
        RestTool::new(
            "smartlead_add_client",
            "Add a new client to the system, optionally with white-label settings.",
            CATEGORY,
            json_schema_object(
                json!({
                    "name": json_schema_string("Name of the client"),
                    "email": json_schema_string("Email address of the client"),
                    "permission": json_schema_array(
                        json!({ "type": "string" }),
                        "Array of permissions to grant to the client. Use [\"full_access\"] for full permissions."
                    ),
                    "logo": json_schema_string("Logo text or identifier"),
                    "logo_url": {
                        "type": ["string", "null"],
                        "description": "URL to the client's logo image"
                    },
                    "password": json_schema_string("Password for the client's account")
                }),
                vec!["name", "email", "permission", "password"],
            ),
            Route::post("client/save"),
        ),
        RestTool::new(
            "smartlead_fetch_all_clients",
            "Retrieve a list of all clients in the system.",
            CATEGORY,
            json_schema_object(json!({}), vec![]),
            Route::get("client/").with_payload(Payload::None),
        ),
    ]
}
