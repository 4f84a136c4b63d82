// Campaign management tools

use super::registry::*;
use serde_json::json;
use smartlead_core::Category;

const CATEGORY: Category = Category::CampaignManagement;

fn campaign_id() -> serde_json::Value {
    json_schema_number("ID of the campaign")
}

fn date_range(extra: serde_json::Value) -> serde_json::Value {
    let mut properties = json!({
        "campaign_id": campaign_id(),
        "start_date": json_schema_string("Start date in YYYY-MM-DD format"),
        "end_date": json_schema_string("End date in YYYY-MM-DD format")
    });
    if let (Some(target), Some(extra)) = (properties.as_object_mut(), extra.as_object()) {
        target.extend(extra.clone());
    }
    json_schema_object(properties, vec!["campaign_id", "start_date", "end_date"])
}

fn sequence_item() -> serde_json::Value {
    let variant = json_schema_object(
        json!({
            "subject": json_schema_string("Email subject line"),
            "email_body": json_schema_string("Email body content in HTML"),
            "variant_label": json_schema_string("Label for this variant (A, B, C, etc.)"),
            "variant_distribution_percentage": json_schema_number(
                "Percentage of leads to receive this variant (for MANUAL_PERCENTAGE)"
            )
        }),
        vec!["subject", "email_body", "variant_label"],
    );

    json_schema_object(
        json!({
            "seq_number": json_schema_number("The sequence number (order) of this email"),
            "seq_delay_details": {
                "type": "object",
                "properties": {
                    "delay_in_days": json_schema_number("Days to wait before sending this email")
                },
                "description": "Delay details for this sequence"
            },
            "variant_distribution_type": json_schema_enum(
                &["MANUAL_EQUAL", "MANUAL_PERCENTAGE", "AI_EQUAL"],
                "How to distribute variants"
            ),
            "lead_distribution_percentage": json_schema_number(
                "What sample % size of the lead pool to use to find the winner (for AI_EQUAL)"
            ),
            "winning_metric_property": json_schema_enum(
                &["OPEN_RATE", "CLICK_RATE", "REPLY_RATE", "POSITIVE_REPLY_RATE"],
                "Metric to use for determining the winning variant (for AI_EQUAL)"
            ),
            "seq_variants": json_schema_array(variant, "Variants of the email in this sequence")
        }),
        vec!["seq_number", "seq_delay_details", "variant_distribution_type", "seq_variants"],
    )
}

pub fn tools() -> Vec<RestTool> {
    vec![
        RestTool::new(
            "smartlead_create_campaign",
            "Create a new campaign in Smartlead.",
            CATEGORY,
            json_schema_object(
                json!({
                    "name": json_schema_string("Name of the campaign"),
                    "client_id": json_schema_number("Client ID for the campaign")
                }),
                vec!["name"],
            ),
            Route::post("campaigns/create"),
        ),
        RestTool::new(
            "smartlead_update_campaign_schedule",
            "Update a campaign's schedule settings.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": campaign_id(),
                    "timezone": json_schema_string("Timezone for the campaign (e.g., \"America/Los_Angeles\")"),
                    "days_of_the_week": json_schema_array(
                        json!({ "type": "number" }),
                        "Days of the week to send emails (1-7, where 1 is Monday)"
                    ),
                    "start_hour": json_schema_string("Start hour in 24-hour format (e.g., \"09:00\")"),
                    "end_hour": json_schema_string("End hour in 24-hour format (e.g., \"17:00\")"),
                    "min_time_btw_emails": json_schema_number("Minimum time between emails in minutes"),
                    "max_new_leads_per_day": json_schema_number("Maximum number of new leads per day"),
                    "schedule_start_time": json_schema_string("Schedule start time in ISO format")
                }),
                vec!["campaign_id"],
            ),
            Route::post("campaigns/{campaign_id}/schedule"),
        ),
        RestTool::new(
            "smartlead_update_campaign_settings",
            "Update a campaign's general settings.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": campaign_id(),
                    "name": json_schema_string("New name for the campaign"),
                    "status": json_schema_enum(&["active", "paused", "completed"], "Status of the campaign"),
                    "settings": json_schema_free_object("Additional campaign settings")
                }),
                vec!["campaign_id"],
            ),
            Route::post("campaigns/{campaign_id}/settings"),
        ),
        RestTool::new(
            "smartlead_update_campaign_status",
            "Update the status of a campaign. Use this specifically for changing a campaign's status.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": campaign_id(),
                    "status": json_schema_enum(
                        &["PAUSED", "STOPPED", "START"],
                        "New status for the campaign (must be in uppercase)"
                    )
                }),
                vec!["campaign_id", "status"],
            ),
            Route::post("campaigns/{campaign_id}/status"),
        ),
        RestTool::new(
            "smartlead_get_campaign",
            "Get details of a specific campaign by ID.",
            CATEGORY,
            json_schema_object(json!({ "campaign_id": campaign_id() }), vec!["campaign_id"]),
            Route::get("campaigns/{campaign_id}"),
        ),
        RestTool::new(
            "smartlead_list_campaigns",
            "List all campaigns with optional pagination.",
            CATEGORY,
            json_schema_object(
                json!({
                    "limit": json_schema_number("Maximum number of campaigns to return"),
                    "offset": json_schema_number("Offset for pagination")
                }),
                vec![],
            ),
            Route::get("campaigns"),
        ),
        RestTool::new(
            "smartlead_save_campaign_sequence",
            "Save a sequence of emails for a campaign.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": campaign_id(),
                    "sequence": json_schema_array(sequence_item(), "Sequence of emails to send")
                }),
                vec!["campaign_id", "sequence"],
            ),
            Route::post("campaigns/{campaign_id}/sequences").with_payload(Payload::Fields(&["sequence"])),
        ),
        RestTool::new(
            "smartlead_get_campaign_sequence",
            "Fetch a campaign's sequence data.",
            CATEGORY,
            json_schema_object(json!({ "campaign_id": campaign_id() }), vec!["campaign_id"]),
            Route::get("campaigns/{campaign_id}/sequences"),
        ),
        RestTool::new(
            "smartlead_get_campaigns_by_lead",
            "Fetch all campaigns that a lead belongs to.",
            CATEGORY,
            json_schema_object(
                json!({ "lead_id": json_schema_number("ID of the lead") }),
                vec!["lead_id"],
            ),
            Route::get("leads/{lead_id}/campaigns"),
        ),
        RestTool::new(
            "smartlead_export_campaign_leads",
            "Export all leads data from a campaign as CSV.",
            CATEGORY,
            json_schema_object(json!({ "campaign_id": campaign_id() }), vec!["campaign_id"]),
            Route::get("campaigns/{campaign_id}/leads-export"),
        ),
        RestTool::new(
            "smartlead_delete_campaign",
            "Delete a campaign permanently.",
            CATEGORY,
            json_schema_object(json!({ "campaign_id": campaign_id() }), vec!["campaign_id"]),
            Route::delete("campaigns/{campaign_id}"),
        ),
        RestTool::new(
            "smartlead_get_campaign_analytics_by_date",
            "Fetch campaign analytics for a specific date range.",
            CATEGORY,
            date_range(json!({})),
            Route::get("campaigns/{campaign_id}/analytics-by-date"),
        ),
        RestTool::new(
            "smartlead_get_campaign_sequence_analytics",
            "Fetch analytics data for a specific email campaign sequence.",
            CATEGORY,
            date_range(json!({
                "time_zone": json_schema_string("Timezone for the data (e.g., \"Europe/London\")")
            })),
            Route::get("campaigns/{campaign_id}/sequence-analytics"),
        ),
    ]
}
