// Campaign webhook tools

use super::registry::*;
use serde_json::json;
use smartlead_core::Category;

const CATEGORY: Category = Category::Webhooks;

pub const EVENT_TYPES: [&str; 6] = [
    "EMAIL_SENT",
    "EMAIL_OPEN",
    "EMAIL_LINK_CLICK",
    "EMAIL_REPLY",
    "LEAD_UNSUBSCRIBED",
    "LEAD_CATEGORY_UPDATED",
];

fn campaign_id(description: &str) -> serde_json::Value {
    json_schema_string(description)
}

fn time_window() -> (serde_json::Value, serde_json::Value) {
    (
        json_schema_string("Start date/time in ISO 8601 format (e.g. 2025-03-21T00:00:00Z)"),
        json_schema_string("End date/time in ISO 8601 format (e.g. 2025-04-04T23:59:59Z)"),
    )
}

pub fn tools() -> Vec<RestTool> {
    let (from_time, to_time) = time_window();

    vec![
        RestTool::new(
            "smartlead_fetch_webhooks_by_campaign",
            "Fetch all the webhooks associated with a campaign using the campaign ID.",
            CATEGORY,
            json_schema_object(
                json!({ "campaign_id": campaign_id("ID of the campaign to fetch webhooks for") }),
                vec!["campaign_id"],
            ),
            Route::get("campaigns/{campaign_id}/webhooks"),
        ),
        RestTool::new(
            "smartlead_upsert_campaign_webhook",
            "Add or update a webhook for a specific campaign.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": campaign_id("ID of the campaign to add/update webhook for"),
                    "id": {
                        "type": ["integer", "null"],
                        "description": "ID of the webhook to update. Set to null to create a new webhook."
                    },
                    "name": json_schema_string("Name for the webhook"),
                    "webhook_url": json_schema_string("URL to call when the webhook event occurs"),
                    "event_types": json_schema_array(
                        json!({ "type": "string", "enum": EVENT_TYPES }),
                        &format!("Types of events to trigger the webhook. Options: {}", EVENT_TYPES.join(", "))
                    ),
                    "categories": json_schema_array(
                        json!({ "type": "string" }),
                        "Categories for filtering webhook events (e.g. [\"Interested\", \"NotInterested\"])"
                    )
                }),
                vec!["campaign_id", "name", "webhook_url", "event_types"],
            ),
            Route::post("campaigns/{campaign_id}/webhooks"),
        ),
        RestTool::new(
            "smartlead_delete_campaign_webhook",
            "Delete a specific webhook from a campaign.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": campaign_id("ID of the campaign containing the webhook"),
                    "id": json_schema_integer("ID of the webhook to delete")
                }),
                vec!["campaign_id", "id"],
            ),
            Route::delete("campaigns/{campaign_id}/webhooks").with_payload(Payload::Fields(&["id"])),
        ),
        RestTool::new(
            "smartlead_get_webhooks_publish_summary",
            "Get a summary of webhook publish events (Private Beta feature).",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": campaign_id("ID of the campaign to get webhook publish summary for"),
                    "fromTime": from_time.clone(),
                    "toTime": to_time.clone()
                }),
                vec!["campaign_id"],
            ),
            Route::get("campaigns/{campaign_id}/webhooks/summary"),
        ),
        RestTool::new(
            "smartlead_retrigger_failed_events",
            "Retrigger failed webhook events (Private Beta feature).",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": campaign_id("ID of the campaign to retrigger failed webhook events for"),
                    "fromTime": from_time,
                    "toTime": to_time
                }),
                vec!["campaign_id", "fromTime", "toTime"],
            ),
            Route::post("campaigns/{campaign_id}/webhooks/retrigger-failed-events")
                .with_payload(Payload::Fields(&["fromTime", "toTime"])),
        ),
    ]
}
