// Email account tools

use super::registry::*;
use serde_json::{json, Map, Value};
use smartlead_core::Category;

const CATEGORY: Category = Category::EmailAccountManagement;

fn account_id(description: &str) -> Value {
    json_schema_number(description)
}

/// SMTP/IMAP/OAuth connection settings
fn connection_fields() -> Map<String, Value> {
    let fields = json!({
        "smtp_host": json_schema_string("SMTP server hostname"),
        "smtp_port": json_schema_number("SMTP server port"),
        "smtp_username": json_schema_string("SMTP username"),
        "smtp_password": json_schema_string("SMTP password"),
        "imap_host": json_schema_string("IMAP server hostname"),
        "imap_port": json_schema_number("IMAP server port"),
        "imap_username": json_schema_string("IMAP username"),
        "imap_password": json_schema_string("IMAP password"),
        "oauth_token": json_schema_string("OAuth token")
    });
    match fields {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn tags() -> Value {
    json_schema_array(
        json!({ "type": "string" }),
        "Tags to assign to the email account",
    )
}

pub fn tools() -> Vec<RestTool> {
    let mut create = Map::new();
    create.insert("email".into(), json_schema_string("Email address"));
    create.insert(
        "provider".into(),
        json_schema_string("Email provider (e.g., \"gmail\", \"outlook\", \"custom\")"),
    );
    create.insert("name".into(), json_schema_string("Display name for the email account"));
    create.extend(connection_fields());
    create.insert("tags".into(), tags());

    let mut update = Map::new();
    update.insert("email_account_id".into(), account_id("ID of the email account to update"));
    update.insert("name".into(), json_schema_string("Display name for the email account"));
    update.extend(connection_fields());
    update.insert(
        "status".into(),
        json_schema_enum(&["active", "paused", "disconnected"], "Status of the email account"),
    );

    vec![
        RestTool::new(
            "smartlead_list_email_accounts_campaign",
            "List all email accounts associated with a specific campaign.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": json_schema_number("ID of the campaign to get email accounts for"),
                    "status": json_schema_enum(
                        &["active", "disconnected", "pending"],
                        "Filter email accounts by status"
                    ),
                    "limit": json_schema_number("Maximum number of email accounts to return"),
                    "offset": json_schema_number("Offset for pagination")
                }),
                vec!["campaign_id"],
            ),
            Route::get("campaigns/{campaign_id}/email-accounts"),
        ),
        RestTool::new(
            "smartlead_add_email_to_campaign",
            "Add an email account to a campaign.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": json_schema_number("ID of the campaign to add the email account to"),
                    "email_account_id": account_id("ID of the email account to add to the campaign")
                }),
                vec!["campaign_id", "email_account_id"],
            ),
            Route::post("campaigns/{campaign_id}/email-accounts").with_payload(Payload::IdList {
                field: "email_account_ids",
                argument: "email_account_id",
            }),
        ),
        RestTool::new(
            "smartlead_remove_email_from_campaign",
            "Remove an email account from a campaign.",
            CATEGORY,
            json_schema_object(
                json!({
                    "campaign_id": json_schema_number("ID of the campaign to remove the email account from"),
                    "email_account_id": account_id("ID of the email account to remove from the campaign")
                }),
                vec!["campaign_id", "email_account_id"],
            ),
            // The upstream API spells this field differently from the add call
            Route::delete("campaigns/{campaign_id}/email-accounts").with_payload(Payload::IdList {
                field: "email_accounts_ids",
                argument: "email_account_id",
            }),
        ),
        RestTool::new(
            "smartlead_fetch_email_accounts",
            "Fetch all email accounts associated with the user.",
            CATEGORY,
            json_schema_object(
                json!({
                    "status": json_schema_enum(
                        &["active", "disconnected", "pending"],
                        "Filter email accounts by status"
                    ),
                    "limit": json_schema_number("Maximum number of email accounts to return"),
                    "offset": json_schema_number("Offset for pagination")
                }),
                vec![],
            ),
            Route::get("email-accounts/"),
        ),
        RestTool::new(
            "smartlead_create_email_account",
            "Create a new email account.",
            CATEGORY,
            json_schema_object(Value::Object(create), vec!["email", "provider"]),
            Route::post("email-accounts/save"),
        ),
        RestTool::new(
            "smartlead_update_email_account",
            "Update an existing email account.",
            CATEGORY,
            json_schema_object(Value::Object(update), vec!["email_account_id"]),
            Route::post("email-accounts/{email_account_id}"),
        ),
        RestTool::new(
            "smartlead_fetch_email_account_by_id",
            "Fetch a specific email account by ID.",
            CATEGORY,
            json_schema_object(
                json!({ "email_account_id": account_id("ID of the email account to fetch") }),
                vec!["email_account_id"],
            ),
            Route::get("email-accounts/{email_account_id}/"),
        ),
        RestTool::new(
            "smartlead_update_email_warmup",
            "Add or update warmup settings for an email account.",
            CATEGORY,
            json_schema_object(
                json!({
                    "email_account_id": account_id("ID of the email account to update warmup settings for"),
                    "enabled": json_schema_boolean("Whether warmup is enabled for this email account"),
                    "daily_limit": json_schema_number("Daily limit for warmup emails"),
                    "warmup_settings": {
                        "type": "object",
                        "properties": {
                            "start_time": json_schema_string("Start time for warmup in HH:MM format"),
                            "end_time": json_schema_string("End time for warmup in HH:MM format"),
                            "days_of_week": json_schema_array(
                                json!({ "type": "number" }),
                                "Days of the week for warmup (1-7, where 1 is Monday)"
                            )
                        },
                        "description": "Additional warmup settings"
                    }
                }),
                vec!["email_account_id", "enabled"],
            ),
            Route::post("email-accounts/{email_account_id}/warmup"),
        ),
        RestTool::new(
            "smartlead_reconnect_email_account",
            "Reconnect a failed email account.",
            CATEGORY,
            json_schema_object(
                json!({
                    "email_account_id": account_id("ID of the email account to reconnect"),
                    "connection_details": {
                        "type": "object",
                        "properties": Value::Object(connection_fields()),
                        "description": "Connection details for reconnecting the email account"
                    }
                }),
                vec!["email_account_id"],
            ),
            // Reconnects every failed account; the endpoint takes no parameters
            Route::post("email-accounts/reconnect-failed-email-accounts")
                .with_payload(Payload::EmptyBody),
        ),
        RestTool::new(
            "smartlead_update_email_account_tag",
            "Update tags for an email account.",
            CATEGORY,
            json_schema_object(
                json!({
                    "email_account_id": account_id("ID of the email account to update tags for"),
                    "tags": tags()
                }),
                vec!["email_account_id", "tags"],
            ),
            Route::post("email-accounts/tag-manager"),
        ),
    ]
}
