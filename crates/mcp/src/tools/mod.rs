// Static catalog data: every operation the gateway exposes

pub mod automation;
pub mod campaign;
pub mod clients;
pub mod delivery;
pub mod email_accounts;
pub mod lead;
pub mod registry;
pub mod senders;
pub mod statistics;
pub mod webhooks;

pub use registry::{Payload, PreparedRequest, RestTool, Route, RouteError};

use smartlead_core::{Catalog, Category};

/// Every REST-backed tool, in listing order
pub fn rest_tools() -> Vec<RestTool> {
    let mut tools = Vec::new();
    tools.extend(campaign::tools());
    tools.extend(email_accounts::tools());
    tools.extend(lead::tools());
    tools.extend(statistics::tools());
    tools.extend(delivery::tools());
    tools.extend(webhooks::tools());
    tools.extend(clients::tools());
    tools.extend(senders::tools());
    tools
}

/// REST-backed tools of one category
pub fn rest_tools_for(category: Category) -> Vec<RestTool> {
    rest_tools()
        .into_iter()
        .filter(|t| t.descriptor.category == category)
        .collect()
}

/// Register every operation, REST-backed and workflow, into `catalog`
pub fn register_catalog(catalog: &Catalog) {
    catalog.register_many(rest_tools().into_iter().map(|t| t.descriptor));
    catalog.register_many(automation::descriptors());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_prefixed() {
        let catalog = Catalog::new();
        register_catalog(&catalog);

        let all = catalog.all();
        let names: HashSet<_> = all.iter().map(|d| d.name.clone()).collect();
        assert_eq!(names.len(), all.len());
        assert!(all.iter().all(|d| d.name.starts_with("smartlead_")));
    }

    #[test]
    fn test_every_category_is_populated() {
        let catalog = Catalog::new();
        register_catalog(&catalog);

        for category in Category::ALL {
            assert!(
                !catalog.get_by_category(category).is_empty(),
                "no operations in {}",
                category
            );
        }
        assert_eq!(catalog.get_by_category(Category::SmartDelivery).len(), 27);
        assert_eq!(catalog.get_by_category(Category::WorkflowAutomation).len(), 2);
    }

    #[test]
    fn test_contracts_are_objects_with_known_required_fields() {
        for tool in rest_tools() {
            let schema = tool.descriptor.input_contract.schema();
            assert_eq!(schema["type"], "object", "{}", tool.descriptor.name);
            let properties = schema["properties"].as_object().unwrap();
            for required in tool.descriptor.input_contract.required() {
                assert!(
                    properties.contains_key(required),
                    "{} requires undeclared field {}",
                    tool.descriptor.name,
                    required
                );
            }
        }
    }

    #[test]
    fn test_path_placeholders_are_required_arguments() {
        for tool in rest_tools() {
            let required = tool.descriptor.input_contract.required();
            let mut rest = tool.route.path;
            while let Some(start) = rest.find('{') {
                let end = rest[start..].find('}').unwrap() + start;
                let name = &rest[start + 1..end];
                assert!(
                    required.contains(&name),
                    "{} does not require path parameter {}",
                    tool.descriptor.name,
                    name
                );
                rest = &rest[end + 1..];
            }
        }
    }
}
