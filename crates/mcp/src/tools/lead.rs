// Lead management tools

use super::registry::*;
use serde_json::{json, Map, Value};
use smartlead_core::Category;

const CATEGORY: Category = Category::LeadManagement;

/// Contact fields shared by create, update and bulk import
fn lead_fields() -> Map<String, Value> {
    let fields = json!({
        "email": json_schema_string("Email address of the lead"),
        "first_name": json_schema_string("First name of the lead"),
        "last_name": json_schema_string("Last name of the lead"),
        "company": json_schema_string("Company of the lead"),
        "title": json_schema_string("Job title of the lead"),
        "phone": json_schema_string("Phone number of the lead"),
        "custom_fields": json_schema_free_object("Custom fields for the lead")
    });
    match fields {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn with_lead_fields(id_name: &str, id_description: &str) -> Value {
    let mut properties = Map::new();
    properties.insert(id_name.to_string(), json_schema_number(id_description));
    properties.extend(lead_fields());
    Value::Object(properties)
}

pub fn tools() -> Vec<RestTool> {
    vec![
        RestTool::new(
            "smartlead_list_leads",
            "List leads with optional filtering by campaign or status.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": json_schema_number("Filter leads by campaign ID"),
                    "status": json_schema_string("Filter leads by status (e.g., \"active\", \"unsubscribed\", \"bounced\")"),
                    "limit": json_schema_number("Maximum number of leads to return"),
                    "offset": json_schema_number("Offset for pagination"),
                    "search": json_schema_string("Search term to filter leads"),
                    "start_date": json_schema_string("Filter leads created after this date (YYYY-MM-DD format)"),
                    "end_date": json_schema_string("Filter leads created before this date (YYYY-MM-DD format)")
                }),
                vec![],
            ),
            Route::get("leads"),
        ),
        RestTool::new(
            "smartlead_get_lead",
            "Get details of a specific lead by ID.",
            CATEGORY,
            json_schema_object(
                json!({ "lead_id": json_schema_number("ID of the lead to retrieve") }),
                vec!["lead_id"],
            ),
            Route::get("leads/{lead_id}"),
        ),
        RestTool::new(
            "smartlead_add_lead_to_campaign",
            "Add a new lead to a campaign.",
            CATEGORY,
            json_schema_object(
                with_lead_fields("campaign_id", "ID of the campaign to add the lead to"),
                vec!["campaign_id", "email"],
            ),
            Route::post("campaigns/{campaign_id}/leads"),
        ),
        RestTool::new(
            "smartlead_update_lead",
            "Update an existing lead's information.",
            CATEGORY,
            json_schema_object(
                with_lead_fields("lead_id", "ID of the lead to update"),
                vec!["lead_id"],
            ),
            Route::put("leads/{lead_id}"),
        ),
        RestTool::new(
            "smartlead_update_lead_status",
            "Update a lead's status.",
            CATEGORY,
            json_schema_object(
                json!({
                    "lead_id": json_schema_number("ID of the lead to update"),
                    "status": json_schema_string("New status for the lead")
                }),
                vec!["lead_id", "status"],
            ),
            Route::put("leads/{lead_id}/status"),
        ),
        RestTool::new(
            "smartlead_bulk_import_leads",
            "Import multiple leads into a campaign at once.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": json_schema_number("ID of the campaign to add the leads to"),
                    "leads": json_schema_array(
                        json_schema_object(Value::Object(lead_fields()), vec!["email"]),
                        "Array of leads to import"
                    )
                }),
                vec!["campaign_id", "leads"],
            ),
            Route::post("campaigns/{campaign_id}/leads/bulk").with_payload(Payload::Fields(&["leads"])),
        ),
        RestTool::new(
            "smartlead_delete_lead",
            "Delete a lead permanently.",
            CATEGORY,
            json_schema_object(
                json!({ "lead_id": json_schema_number("ID of the lead to delete") }),
                vec!["lead_id"],
            ),
            Route::delete("leads/{lead_id}"),
        ),
    ]
}
