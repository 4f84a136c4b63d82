// SmartSenders (domain and mailbox purchasing) tools

use super::registry::*;
use serde_json::{json, Value};
use smartlead_client::ApiBase;
use smartlead_core::Category;

const CATEGORY: Category = Category::SmartSenders;

fn vendor_id(description: &str) -> Value {
    json_schema_integer(description)
}

fn domains(mailbox: Value, required: Vec<&str>, description: &str, per_domain: &str) -> Value {
    json_schema_array(
        json_schema_object(
            json!({
                "domain_name": json_schema_string(per_domain),
                "mailbox_details": json_schema_array(
                    json_schema_object(mailbox, required),
                    "Details for each mailbox"
                )
            }),
            vec!["domain_name", "mailbox_details"],
        ),
        description,
    )
}

fn route(route: Route) -> Route {
    route.on(ApiBase::SmartSenders)
}

pub fn tools() -> Vec<RestTool> {
    let profile_pic = json_schema_string("URL or identifier for profile picture (optional)");

    vec![
        RestTool::new(
            "smartlead_get_vendors",
            "Retrieve all active domain vendors with their corresponding IDs.",
            CATEGORY,
            json_schema_object(json!({}), vec![]),
            route(Route::get("smart-senders/get-vendors")),
        ),
        RestTool::new(
            "smartlead_search_domain",
            "Search for available domains under $15 that match a given domain name pattern.",
            CATEGORY,
            json_schema_object(
                json!({
                    "domain_name": json_schema_string("The domain name pattern you want to search for"),
                    "vendor_id": vendor_id(
                        "ID of the vendor from whom you want to purchase the domain (use Get Vendors API to retrieve this ID)"
                    )
                }),
                vec!["domain_name", "vendor_id"],
            ),
            route(Route::get("smart-senders/search-domain")),
        ),
        RestTool::new(
            "smartlead_auto_generate_mailboxes",
            "Auto-generate mailboxes based on the domain name and personal details provided.",
            CATEGORY,
            json_schema_object(
                json!({
                    "vendor_id": vendor_id("ID of the vendor from whom you want to purchase the domains and mailboxes"),
                    "domains": domains(
                        json!({
                            "first_name": json_schema_string(
                                "First name for the mailbox owner (should be more than 2 characters and without spaces)"
                            ),
                            "last_name": json_schema_string(
                                "Last name for the mailbox owner (should be more than 2 characters and without spaces)"
                            ),
                            "profile_pic": profile_pic.clone()
                        }),
                        vec!["first_name", "last_name"],
                        "List of domains and associated mailbox details",
                        "The domain name for which you want to generate mailboxes (e.g., example.com)"
                    )
                }),
                vec!["vendor_id", "domains"],
            ),
            route(Route::post("smart-senders/auto-generate-mailboxes")),
        ),
        RestTool::new(
            "smartlead_place_order_mailboxes",
            "Confirm and place order for domains and mailboxes to be purchased.",
            CATEGORY,
            json_schema_object(
                json!({
                    "vendor_id": vendor_id("ID of the vendor from whom you want to purchase the domains and mailboxes"),
                    "forwarding_domain": json_schema_string(
                        "The domain to forward to when users access purchased domains"
                    ),
                    "domains": domains(
                        json!({
                            "mailbox": json_schema_string("The complete mailbox address (e.g., john@example.com)"),
                            "first_name": json_schema_string("First name for the mailbox owner"),
                            "last_name": json_schema_string("Last name for the mailbox owner"),
                            "profile_pic": profile_pic
                        }),
                        vec!["mailbox", "first_name", "last_name"],
                        "List of domains and associated mailbox details for purchase",
                        "The domain name you want to purchase"
                    )
                }),
                vec!["vendor_id", "forwarding_domain", "domains"],
            ),
            route(Route::post("smart-senders/place-order")),
        ),
        RestTool::new(
            "smartlead_get_domain_list",
            "Retrieve a list of all domains purchased through SmartSenders.",
            CATEGORY,
            json_schema_object(json!({}), vec![]),
            route(Route::get("smart-senders/get-domain-list")),
        ),
    ]
}
