use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Fixed grouping of operations; the unit of license gating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    CampaignManagement,
    EmailAccountManagement,
    LeadManagement,
    CampaignStatistics,
    SmartDelivery,
    Webhooks,
    ClientManagement,
    SmartSenders,
    WorkflowAutomation,
}

impl Category {
    /// Every known category, in listing order
    pub const ALL: [Category; 9] = [
        Category::CampaignManagement,
        Category::EmailAccountManagement,
        Category::LeadManagement,
        Category::CampaignStatistics,
        Category::SmartDelivery,
        Category::Webhooks,
        Category::ClientManagement,
        Category::SmartSenders,
        Category::WorkflowAutomation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CampaignManagement => "campaignManagement",
            Category::EmailAccountManagement => "emailAccountManagement",
            Category::LeadManagement => "leadManagement",
            Category::CampaignStatistics => "campaignStatistics",
            Category::SmartDelivery => "smartDelivery",
            Category::Webhooks => "webhooks",
            Category::ClientManagement => "clientManagement",
            Category::SmartSenders => "smartSenders",
            Category::WorkflowAutomation => "workflowAutomation",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// One callable capability exposed to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub input_contract: InputContract,
}

impl OperationDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        input_contract: InputContract,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            input_contract,
        }
    }
}

/// Declarative description of accepted arguments (a JSON Schema object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputContract(pub Value);

impl InputContract {
    pub fn new(schema: Value) -> Self {
        Self(schema)
    }

    /// Contract accepting any object
    pub fn any() -> Self {
        Self(serde_json::json!({ "type": "object", "properties": {} }))
    }

    pub fn schema(&self) -> &Value {
        &self.0
    }

    /// Names listed under `required`
    pub fn required(&self) -> Vec<&str> {
        self.0
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Check the shape of `arguments`, returning them normalized to an object.
    ///
    /// Absent or null arguments are treated as `{}`. Only the top level is
    /// checked: required keys, primitive JSON types and `enum` membership.
    pub fn validate(&self, arguments: Value) -> Result<Value, String> {
        let object = match arguments {
            Value::Null => serde_json::Map::new(),
            Value::Object(map) => map,
            other => return Err(format!("expected an object, got {}", json_type(&other))),
        };

        for name in self.required() {
            match object.get(name) {
                None | Some(Value::Null) => {
                    return Err(format!("missing required field '{}'", name));
                }
                Some(_) => {}
            }
        }

        let properties = match self.0.get("properties").and_then(Value::as_object) {
            Some(p) => p,
            None => return Ok(Value::Object(object)),
        };

        for (name, value) in &object {
            let Some(property) = properties.get(name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            if let Some(expected) = property.get("type").and_then(Value::as_str) {
                if !matches_type(expected, value) {
                    return Err(format!(
                        "field '{}' must be of type {}, got {}",
                        name,
                        expected,
                        json_type(value)
                    ));
                }
            }
            if let Some(allowed) = property.get("enum").and_then(Value::as_array) {
                if !allowed.contains(value) {
                    return Err(format!("field '{}' has a value outside its enum", name));
                }
            }
        }

        Ok(Value::Object(object))
    }
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
