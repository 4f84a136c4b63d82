// Campaign statistics tools

use super::registry::*;
use serde_json::json;
use smartlead_core::Category;

const CATEGORY: Category = Category::CampaignStatistics;

fn date_range_tool(name: &str, description: &str, path: &'static str) -> RestTool {
    RestTool::new(
        name,
        description,
        CATEGORY,
        json_schema_object(
            json!({
                "campaign_id": json_schema_number("ID of the campaign"),
                "start_date": json_schema_string("Start date in YYYY-MM-DD format"),
                "end_date": json_schema_string("End date in YYYY-MM-DD format")
            }),
            vec!["campaign_id", "start_date", "end_date"],
        ),
        Route::get(path),
    )
}

pub fn tools() -> Vec<RestTool> {
    vec![
        RestTool::new(
            "smartlead_get_campaign_statistics",
            "Fetch campaign statistics using the campaign's ID.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": json_schema_number("ID of the campaign to fetch statistics for"),
                    "offset": json_schema_number("Offset for pagination"),
                    "limit": json_schema_number("Maximum number of statistics to return"),
                    "email_sequence_number": json_schema_string("Email sequence number to filter by (e.g., \"1,2,3,4\")"),
                    "email_status": json_schema_string(
                        "Email status to filter by (e.g., \"opened\", \"clicked\", \"replied\", \"unsubscribed\", \"bounced\")"
                    ),
                    "sent_time_start_date": json_schema_string(
                        "Filter by sent time greater than this date (e.g., \"2023-10-16 10:33:02.000Z\")"
                    ),
                    "sent_time_end_date": json_schema_string(
                        "Filter by sent time less than this date (e.g., \"2023-10-16 10:33:02.000Z\")"
                    )
                }),
                vec!["campaign_id"],
            ),
            Route::get("campaigns/{campaign_id}/statistics"),
        ),
        date_range_tool(
            "smartlead_get_campaign_statistics_by_date",
            "Fetch campaign statistics for a specific date range.",
            "campaigns/{campaign_id}/analytics-by-date",
        ),
        RestTool::new(
            "smartlead_get_warmup_stats_by_email",
            "Fetch warmup stats for the last 7 days for a specific email account.",
            CATEGORY,
            json_schema_object(
                json!({
                    "email_account_id": json_schema_number("ID of the email account to fetch warmup stats for")
                }),
                vec!["email_account_id"],
            ),
            Route::get("email-accounts/{email_account_id}/warmup-stats"),
        ),
        RestTool::new(
            "smartlead_get_campaign_top_level_analytics",
            "Fetch top level analytics for a campaign.",
            CATEGORY,
            json_schema_object(
                json!({ "campaign_id": json_schema_number("ID of the campaign to fetch analytics for") }),
                vec!["campaign_id"],
            ),
            Route::get("campaigns/{campaign_id}/analytics"),
        ),
        date_range_tool(
            "smartlead_get_campaign_top_level_analytics_by_date",
            "Fetch campaign top level analytics for a specific date range.",
            "campaigns/{campaign_id}/top-level-analytics-by-date",
        ),
        RestTool::new(
            "smartlead_get_campaign_lead_statistics",
            "Fetch lead statistics for a campaign.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": json_schema_number("ID of the campaign to fetch lead statistics for"),
                    "limit": json_schema_number("Maximum number of leads to return (max 100)"),
                    "created_at_gt": json_schema_string("Filter by leads created after this date (YYYY-MM-DD format)"),
                    "event_time_gt": json_schema_string("Filter by events after this date (YYYY-MM-DD format)"),
                    "offset": json_schema_number("Offset for pagination")
                }),
                vec!["campaign_id"],
            ),
            Route::get("campaigns/{campaign_id}/lead-statistics"),
        ),
        RestTool::new(
            "smartlead_get_campaign_mailbox_statistics",
            "Fetch mailbox statistics for a campaign.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": json_schema_number("ID of the campaign to fetch mailbox statistics for"),
                    "client_id": json_schema_string("Client ID if the campaign is client-specific"),
                    "offset": json_schema_number("Offset for pagination"),
                    "limit": json_schema_number("Maximum number of results to return (min 1, max 20)"),
                    "start_date": json_schema_string("Start date (must be used with end_date)"),
                    "end_date": json_schema_string("End date (must be used with start_date)"),
                    "timezone": json_schema_string("Timezone for the data (e.g., \"America/Los_Angeles\")")
                }),
                vec!["campaign_id"],
            ),
            Route::get("campaigns/{campaign_id}/mailbox-statistics"),
        ),
    ]
}
