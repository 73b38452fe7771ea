//! Helper functions for the in-memory WAPI

use crate::common::NOT_FOUND_CODE;
use crate::transport::WapiResponse;
use serde_json::{json, Map, Value};

const REFERENCE_TOKEN: &str = "ZG5zLm1vY2sk";

/// Read access to request query parameters
pub struct Query<'a> {
    pairs: &'a [(String, String)],
}

impl<'a> Query<'a> {
    pub fn new(pairs: &'a [(String, String)]) -> Self {
        Self { pairs }
    }

    /// Value of a query parameter
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Search filters: every parameter that is not a WAPI argument
    pub fn filters(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.pairs
            .iter()
            .filter(|(k, _)| !k.starts_with('_'))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Fields WAPI returns when no `_return_fields` are given
pub fn basic_fields(object_type: &str) -> &'static [&'static str] {
    match object_type {
        "record:host" => &["ipv4addrs", "ipv6addrs", "name", "view"],
        _ => &["name", "view"],
    }
}

/// Select the fields a read should return
pub fn project(object: &Map<String, Value>, query: &Query) -> Value {
    let object_type = object_type_of(object);
    let mut fields: Vec<&str> = Vec::new();

    if let Some(listed) = query.get("_return_fields") {
        fields.extend(listed.split(',').filter(|f| !f.is_empty()));
    } else {
        fields.extend(basic_fields(object_type));
        if let Some(extra) = query.get("_return_fields+") {
            fields.extend(extra.split(',').filter(|f| !f.is_empty()));
        }
    }

    let mut projected = Map::new();
    if let Some(reference) = object.get("_ref") {
        projected.insert("_ref".to_string(), reference.clone());
    }
    for field in fields {
        if let Some(value) = object.get(field) {
            projected.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(projected)
}

/// Whether a stored field equals a search value
pub fn field_equals(object: &Map<String, Value>, field: &str, value: &str) -> bool {
    match object.get(field) {
        Some(Value::String(s)) => s == value,
        Some(Value::Number(n)) => n.to_string() == value,
        Some(Value::Bool(b)) => b.to_string() == value,
        _ => false,
    }
}

pub fn reference_of(object: &Map<String, Value>) -> &str {
    object.get("_ref").and_then(Value::as_str).unwrap_or_default()
}

pub fn object_type_of(object: &Map<String, Value>) -> &str {
    reference_of(object).split('/').next().unwrap_or_default()
}

pub fn make_reference(object_type: &str, id: u64, name: &str, view: &str) -> String {
    format!("{}/{}{:08}:{}/{}", object_type, REFERENCE_TOKEN, id, name, view)
}

/// Numeric id embedded in a mock reference
pub fn id_of(reference: &str) -> u64 {
    reference
        .split('/')
        .nth(1)
        .and_then(|rest| rest.split(':').next())
        .and_then(|token| token.strip_prefix(REFERENCE_TOKEN))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or_default()
}

/// Server-side defaults applied on create
pub fn apply_defaults(object_type: &str, fields: &mut Map<String, Value>) {
    if object_type.starts_with("record:") || object_type == "network" {
        fields
            .entry("view")
            .or_insert_with(|| Value::String("default".to_string()));
    }
}

/// WAPI fills in the parent host name on nested address entries
pub fn attach_host_to_addresses(fields: &mut Map<String, Value>) {
    let Some(name) = fields.get("name").cloned() else {
        return;
    };
    for key in ["ipv4addrs", "ipv6addrs"] {
        if let Some(Value::Array(entries)) = fields.get_mut(key) {
            for entry in entries.iter_mut() {
                if let Value::Object(entry) = entry {
                    entry.entry("host").or_insert_with(|| name.clone());
                }
            }
        }
    }
}

pub fn parse_body(body: Option<&[u8]>) -> Result<Map<String, Value>, WapiResponse> {
    let Some(body) = body else {
        return Err(error_response(400, "Client.Ibap.Proto", "Request body is required"));
    };
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(error_response(400, "Client.Ibap.Proto", "Request body must be a JSON object")),
        Err(e) => Err(error_response(400, "Client.Ibap.Proto", &format!("Invalid JSON: {}", e))),
    }
}

pub fn json_response(status: u16, body: &Value) -> WapiResponse {
    WapiResponse {
        status,
        body: body.to_string().into_bytes(),
    }
}

pub fn error_response(status: u16, code: &str, text: &str) -> WapiResponse {
    let class = if code == NOT_FOUND_CODE {
        "AdmConDataNotFoundError"
    } else {
        "AdmConProtoError"
    };
    json_response(
        status,
        &json!({
            "Error": format!("{}: {}", class, text),
            "code": code,
            "text": text,
        }),
    )
}

pub fn not_found(reference: &str) -> WapiResponse {
    error_response(404, NOT_FOUND_CODE, &format!("Reference {} not found", reference))
}
