// Tool descriptors paired with the REST route that serves them

use serde_json::{Map, Value};
use smartlead_client::transport::query_pairs;
use smartlead_client::{ApiBase, Method};
use smartlead_core::{Category, InputContract, OperationDescriptor};

/// How the arguments left over after filling the path travel upstream
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Remaining arguments become the JSON body
    Json,
    /// Remaining arguments become the query string
    Query,
    /// Nothing is sent
    None,
    /// An empty JSON object is sent
    EmptyBody,
    /// Only the listed arguments are sent, as a JSON body
    Fields(&'static [&'static str]),
    /// One argument is wrapped into a one-element array under `field`
    IdList {
        field: &'static str,
        argument: &'static str,
    },
    /// The listed arguments go to the query string, the rest to the body
    QueryThenJson(&'static [&'static str]),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RouteError {
    #[error("missing path parameter '{0}'")]
    MissingPathParam(String),

    #[error("path parameter '{0}' must be a string or number without '/', '?' or '#'")]
    InvalidPathParam(String),
}

/// Where and how one tool calls upstream
#[derive(Debug, Clone)]
pub struct Route {
    pub base: ApiBase,
    pub method: Method,
    /// Relative path with `{param}` placeholders
    pub path: &'static str,
    pub payload: Payload,
}

/// Fully resolved request, ready for the client
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Route {
    fn new(method: Method, path: &'static str, payload: Payload) -> Self {
        Self {
            base: ApiBase::Core,
            method,
            path,
            payload,
        }
    }

    pub fn get(path: &'static str) -> Self {
        Self::new(Method::GET, path, Payload::Query)
    }

    pub fn post(path: &'static str) -> Self {
        Self::new(Method::POST, path, Payload::Json)
    }

    pub fn put(path: &'static str) -> Self {
        Self::new(Method::PUT, path, Payload::Json)
    }

    pub fn delete(path: &'static str) -> Self {
        Self::new(Method::DELETE, path, Payload::None)
    }

    pub fn on(mut self, base: ApiBase) -> Self {
        self.base = base;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Fill the path template and lay out what is left of `arguments`.
    ///
    /// Arguments consumed by the path are not sent again.
    pub fn prepare(&self, arguments: Value) -> Result<PreparedRequest, RouteError> {
        let mut remaining = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let path = fill_path(self.path, &mut remaining)?;

        let (query, body) = match &self.payload {
            Payload::Json => (Vec::new(), Some(Value::Object(remaining))),
            Payload::Query => (query_pairs(&remaining), None),
            Payload::None => (Vec::new(), None),
            Payload::EmptyBody => (Vec::new(), Some(Value::Object(Map::new()))),
            Payload::Fields(fields) => {
                let picked = fields
                    .iter()
                    .filter_map(|f| remaining.remove(*f).map(|v| (f.to_string(), v)))
                    .collect::<Map<_, _>>();
                (Vec::new(), Some(Value::Object(picked)))
            }
            Payload::IdList { field, argument } => {
                let ids = remaining
                    .remove(*argument)
                    .map(|id| vec![id])
                    .unwrap_or_default();
                let mut body = Map::new();
                body.insert(field.to_string(), Value::Array(ids));
                (Vec::new(), Some(Value::Object(body)))
            }
            Payload::QueryThenJson(fields) => {
                let in_query = fields
                    .iter()
                    .filter_map(|f| remaining.remove(*f).map(|v| (f.to_string(), v)))
                    .collect::<Map<_, _>>();
                (query_pairs(&in_query), Some(Value::Object(remaining)))
            }
        };

        Ok(PreparedRequest { path, query, body })
    }
}

fn fill_path(template: &str, arguments: &mut Map<String, Value>) -> Result<String, RouteError> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        let segment = match arguments.remove(name) {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Null) | None => return Err(RouteError::MissingPathParam(name.to_string())),
            Some(_) => return Err(RouteError::InvalidPathParam(name.to_string())),
        };
        if segment.is_empty() || segment.contains(['/', '?', '#']) {
            return Err(RouteError::InvalidPathParam(name.to_string()));
        }
        path.push_str(&rest[..start]);
        path.push_str(&segment);
        rest = &rest[start + len + 1..];
    }
    path.push_str(rest);
    Ok(path)
}

/// A catalog entry together with its upstream route
#[derive(Debug, Clone)]
pub struct RestTool {
    pub descriptor: OperationDescriptor,
    pub route: Route,
}

impl RestTool {
    pub fn new(
        name: &str,
        description: &str,
        category: Category,
        schema: Value,
        route: Route,
    ) -> Self {
        Self {
            descriptor: OperationDescriptor::new(
                name,
                description,
                category,
                InputContract::new(schema),
            ),
            route,
        }
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: Value, required: Vec<&str>) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_enum(values: &[&str], description: &str) -> Value {
    serde_json::json!({
        "type": "string",
        "enum": values,
        "description": description
    })
}

pub fn json_schema_number(description: &str) -> Value {
    serde_json::json!({
        "type": "number",
        "description": description
    })
}

pub fn json_schema_integer(description: &str) -> Value {
    serde_json::json!({
        "type": "integer",
        "description": description
    })
}

pub fn json_schema_boolean(description: &str) -> Value {
    serde_json::json!({
        "type": "boolean",
        "description": description
    })
}

pub fn json_schema_array(items: Value, description: &str) -> Value {
    serde_json::json!({
        "type": "array",
        "items": items,
        "description": description
    })
}

pub fn json_schema_free_object(description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "description": description
    })
}
