// SmartDelivery (inbox placement and spam testing) tools

use super::registry::*;
use serde_json::{json, Map, Value};
use smartlead_client::ApiBase;
use smartlead_core::Category;

const CATEGORY: Category = Category::SmartDelivery;

const PLACEMENT_REQUIRED: [&str; 11] = [
    "test_name",
    "spam_filters",
    "link_checker",
    "campaign_id",
    "sequence_mapping_id",
    "provider_ids",
    "sender_accounts",
    "all_email_sent_without_time_gap",
    "min_time_btwn_emails",
    "min_time_unit",
    "is_warmup",
];

fn route(route: Route) -> Route {
    route.on(ApiBase::SmartDelivery)
}

fn placement_fields() -> Map<String, Value> {
    let fields = json!({
        "test_name": json_schema_string("Name of your test"),
        "description": json_schema_string("Description for your test to reference later"),
        "spam_filters": json_schema_array(
            json!({ "type": "string" }),
            "Array of spam filters to test across, e.g. [\"spam_assassin\"]"
        ),
        "link_checker": json_schema_boolean(
            "Enable to check if domains for links in email body are blacklisted"
        ),
        "campaign_id": json_schema_integer("Campaign ID for which you want to select the sequence to test"),
        "sequence_mapping_id": json_schema_integer("The ID of the sequence or variant you would like to test"),
        "provider_ids": json_schema_array(
            json!({ "type": "integer" }),
            "Array of provider IDs to send test emails to"
        ),
        "sender_accounts": json_schema_array(
            json!({ "type": "string" }),
            "Array of email addresses to use as senders"
        ),
        "all_email_sent_without_time_gap": json_schema_boolean("Set true to send all emails simultaneously"),
        "min_time_btwn_emails": json_schema_integer(
            "Time gap between each email from each mailbox (if time gap enabled)"
        ),
        "min_time_unit": json_schema_string("Time unit for the time gap (minutes, hours, days)"),
        "is_warmup": json_schema_boolean(
            "Set true to receive positive intent responses and move emails from spam to inbox"
        )
    });
    match fields {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn automated_schema() -> Value {
    let mut properties = placement_fields();
    let schedule = json!({
        "schedule_start_time": json_schema_string("Start date and time to schedule or run the test (ISO format)"),
        "test_end_date": json_schema_string("End date to stop running your test (YYYY-MM-DD format)"),
        "every_days": json_schema_integer("Frequency of how often to run a new test"),
        "tz": json_schema_string("Timezone for scheduling"),
        "days": json_schema_array(
            json!({ "type": "integer" }),
            "Days of the week to run the test (1-7, where 1 is Monday)"
        ),
        "starHour": json_schema_string("Test start time"),
        "folder_id": json_schema_integer("Folder ID to assign the test to")
    });
    if let Value::Object(schedule) = schedule {
        properties.extend(schedule);
    }

    let mut required = PLACEMENT_REQUIRED.to_vec();
    required.extend(["schedule_start_time", "test_end_date", "every_days", "tz", "days"]);
    json_schema_object(Value::Object(properties), required)
}

fn spam_test_id() -> Value {
    json_schema_integer("ID of the spam test")
}

/// Report keyed by one spam test
fn report(name: &str, description: &str, route: Route) -> RestTool {
    RestTool::new(
        name,
        description,
        CATEGORY,
        json_schema_object(json!({ "spam_test_id": spam_test_id() }), vec!["spam_test_id"]),
        self::route(route),
    )
}

/// Report keyed by one reply within a spam test
fn reply_report(name: &str, description: &str, path: &'static str) -> RestTool {
    RestTool::new(
        name,
        description,
        CATEGORY,
        json_schema_object(
            json!({
                "spam_test_id": spam_test_id(),
                "reply_id": json_schema_integer("ID of the reply")
            }),
            vec!["spam_test_id", "reply_id"],
        ),
        route(Route::get(path)),
    )
}

fn pagination() -> Value {
    json!({
        "limit": json_schema_integer("Number of items to return"),
        "offset": json_schema_integer("Offset for pagination")
    })
}

pub fn tools() -> Vec<RestTool> {
    let mut folder_query = pagination();
    if let Some(properties) = folder_query.as_object_mut() {
        properties.insert("name".into(), json_schema_string("Filter folders by name"));
    }

    vec![
        RestTool::new(
            "smartlead_get_region_wise_providers",
            "Retrieve the list of all Email Providers for spam testing classified by region/country. These provider IDs are required to create manual or automated spam tests.",
            CATEGORY,
            json_schema_object(json!({}), vec![]),
            route(Route::get("spam-test/seed/providers").with_payload(Payload::None)),
        ),
        RestTool::new(
            "smartlead_create_manual_placement_test",
            "Create a manual placement test using Smartlead mailboxes to test email deliverability across various email providers.",
            CATEGORY,
            json_schema_object(Value::Object(placement_fields()), PLACEMENT_REQUIRED.to_vec()),
            route(Route::post("spam-test/manual")),
        ),
        RestTool::new(
            "smartlead_create_automated_placement_test",
            "Create an automated placement test that runs on a schedule using Smart Delivery.",
            CATEGORY,
            automated_schema(),
            route(Route::post("spam-test/schedule")),
        ),
        report(
            "smartlead_get_spam_test_details",
            "Retrieve details of a specific spam test by ID.",
            Route::get("spam-test/{spam_test_id}"),
        ),
        RestTool::new(
            "smartlead_delete_smart_delivery_tests",
            "Delete multiple Smart Delivery tests in bulk.",
            CATEGORY,
            json_schema_object(
                json!({
                    "spamTestIds": json_schema_array(
                        json!({ "type": "integer" }),
                        "Array of spam test IDs to delete"
                    )
                }),
                vec!["spamTestIds"],
            ),
            route(Route::post("spam-test/delete")),
        ),
        report(
            "smartlead_stop_automated_test",
            "Stop an active automated test before its end date.",
            Route::put("spam-test/{spam_test_id}/stop").with_payload(Payload::None),
        ),
        RestTool::new(
            "smartlead_list_all_tests",
            "List all Smart Delivery tests, either manual or automated.",
            CATEGORY,
            json_schema_object(
                json!({
                    "testType": json_schema_enum(&["manual", "auto"], "Type of tests to list"),
                    "limit": json_schema_integer("Number of tests to return"),
                    "offset": json_schema_integer("Offset for pagination")
                }),
                vec!["testType"],
            ),
            route(Route::post("spam-test/report").with_payload(Payload::QueryThenJson(&["testType"]))),
        ),
        report(
            "smartlead_get_provider_wise_report",
            "Get detailed report of a spam test sorted by email providers.",
            Route::post("spam-test/report/{spam_test_id}/providerwise").with_payload(Payload::None),
        ),
        report(
            "smartlead_get_group_wise_report",
            "Get detailed report of a spam test sorted by location (region/country).",
            Route::post("spam-test/report/{spam_test_id}/groupwise").with_payload(Payload::None),
        ),
        report(
            "smartlead_get_sender_account_wise_report",
            "Get detailed report of a spam test sorted by sender accounts with details of each email from each mailbox.",
            Route::get("spam-test/report/{spam_test_id}/sender-account-wise"),
        ),
        report(
            "smartlead_get_spam_filter_details",
            "Get spam filter report per sender mailbox showing each spam score with details leading to the score.",
            Route::get("spam-test/report/{spam_test_id}/spam-filter-details"),
        ),
        report(
            "smartlead_get_dkim_details",
            "Check if DKIM authentication passed or failed for each sender mailbox and receiver account.",
            Route::get("spam-test/report/{spam_test_id}/dkim-details"),
        ),
        report(
            "smartlead_get_spf_details",
            "Check if SPF authentication passed or failed for the test.",
            Route::get("spam-test/report/{spam_test_id}/spf-details"),
        ),
        report(
            "smartlead_get_rdns_details",
            "Check if rDNS was correct for an IP sending the email.",
            Route::get("spam-test/report/{spam_test_id}/rdns-details"),
        ),
        report(
            "smartlead_get_sender_accounts",
            "Get the list of all sender accounts selected for a specific spam test.",
            Route::get("spam-test/report/{spam_test_id}/sender-accounts"),
        ),
        report(
            "smartlead_get_blacklist",
            "Get the list of all blacklists per IP per email sent.",
            Route::get("spam-test/report/{spam_test_id}/blacklist"),
        ),
        report(
            "smartlead_get_email_content",
            "Get details for the email content (raw, HTML) along with campaign and sequence details.",
            Route::get("spam-test/report/{spam_test_id}/email-content"),
        ),
        report(
            "smartlead_get_ip_analytics",
            "Get total blacklist count identified in the test.",
            Route::get("spam-test/report/{spam_test_id}/ip-analytics"),
        ),
        reply_report(
            "smartlead_get_email_headers",
            "Get details of the email headers for a specific email.",
            "spam-test/report/{spam_test_id}/sender-account-wise/{reply_id}/email-headers",
        ),
        report(
            "smartlead_get_schedule_history",
            "Get the list and summary of all tests that ran for a particular automated test.",
            Route::get("spam-test/report/{spam_test_id}/schedule-history"),
        ),
        reply_report(
            "smartlead_get_ip_details",
            "Get the list of all blacklists per IP for a specific email.",
            "spam-test/report/{spam_test_id}/sender-account-wise/{reply_id}/ip-details",
        ),
        RestTool::new(
            "smartlead_get_mailbox_summary",
            "Get the list of mailboxes used for any Smart Delivery test with overall performance across all tests.",
            CATEGORY,
            json_schema_object(pagination(), vec![]),
            route(Route::get("spam-test/report/mailboxes-summary")),
        ),
        RestTool::new(
            "smartlead_get_mailbox_count",
            "Get the count of all mailboxes used for any spam test.",
            CATEGORY,
            json_schema_object(json!({}), vec![]),
            route(Route::get("spam-test/report/mailboxes-count").with_payload(Payload::None)),
        ),
        RestTool::new(
            "smartlead_get_all_folders",
            "Get the list and details of all folders created in Smart Delivery along with tests inside each folder.",
            CATEGORY,
            json_schema_object(folder_query, vec![]),
            route(Route::get("spam-test/folder")),
        ),
        RestTool::new(
            "smartlead_create_folder",
            "Create a folder in Smart Delivery to organize tests.",
            CATEGORY,
            json_schema_object(
                json!({ "name": json_schema_string("Name of the folder to create") }),
                vec!["name"],
            ),
            route(Route::post("spam-test/folder").with_payload(Payload::Fields(&["name"]))),
        ),
        RestTool::new(
            "smartlead_get_folder_by_id",
            "Get details of a specific folder by ID.",
            CATEGORY,
            json_schema_object(
                json!({ "folder_id": json_schema_integer("ID of the folder to retrieve") }),
                vec!["folder_id"],
            ),
            route(Route::get("spam-test/folder/{folder_id}")),
        ),
        RestTool::new(
            "smartlead_delete_folder",
            "Delete a folder from Smart Delivery.",
            CATEGORY,
            json_schema_object(
                json!({ "folder_id": json_schema_integer("ID of the folder to delete") }),
                vec!["folder_id"],
            ),
            route(Route::delete("spam-test/folder/{folder_id}")),
        ),
    ]
}
