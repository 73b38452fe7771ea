//! In-memory WAPI for unit testing
//!
//! `MockTransport` implements [`Transport`] by emulating the parts of WAPI
//! the client relies on: reference issuing, equality search, return-field
//! projection, `_max_results` overflow errors, paging and not-found errors.
//! Every request is recorded so tests can inspect what went on the wire.

mod helpers;

use crate::error::InfobloxError;
use crate::resource::Reference;
use crate::transport::{Method, Transport, WapiRequest, WapiResponse};
use helpers::{error_response, json_response, project, Query};
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Mock transport for testing
///
/// Clones share the same store, so a test can keep one handle for
/// inspection while the client owns another.
#[derive(Debug, Clone)]
pub struct MockTransport {
    pub(crate) base_url: String,
    // Stored objects in creation order, each carrying its `_ref`
    pub(crate) objects: Arc<Mutex<Vec<Map<String, Value>>>>,
    // Remaining results of paged searches, keyed by page id
    pub(crate) pages: Arc<Mutex<HashMap<String, (usize, Vec<Value>)>>>,
    // Canned responses returned ahead of the emulation
    pub(crate) queued: Arc<Mutex<VecDeque<WapiResponse>>>,
    pub(crate) requests: Arc<Mutex<Vec<WapiRequest>>>,
    // Counter for generating references and page ids
    pub(crate) next_id: Arc<Mutex<u64>>,
}

impl MockTransport {
    /// Create a new, empty mock
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Arc::new(Mutex::new(Vec::new())),
            pages: Arc::new(Mutex::new(HashMap::new())),
            queued: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    /// Add an object to the mock store (for test setup)
    pub fn add_object(&self, object_type: &str, object: Value) -> Reference {
        let mut fields = match object {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        helpers::apply_defaults(object_type, &mut fields);
        let reference = self.issue_reference(object_type, &fields);
        fields.insert("_ref".to_string(), Value::String(reference.clone()));
        helpers::attach_host_to_addresses(&mut fields);
        self.objects.lock().unwrap().push(fields);
        Reference::new(reference)
    }

    /// Return `response` for the next request instead of emulating it
    pub fn push_response(&self, response: WapiResponse) {
        self.queued.lock().unwrap().push_back(response);
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<WapiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Most recent request
    pub fn last_request(&self) -> Option<WapiRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Number of stored objects of a type
    pub fn count(&self, object_type: &str) -> usize {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .filter(|o| helpers::object_type_of(o) == object_type)
            .count()
    }

    /// Generate next ID
    pub(crate) fn next_id(&self) -> u64 {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }

    fn issue_reference(&self, object_type: &str, fields: &Map<String, Value>) -> String {
        let name = fields.get("name").and_then(Value::as_str).unwrap_or_default();
        let view = fields.get("view").and_then(Value::as_str).unwrap_or("default");
        helpers::make_reference(object_type, self.next_id(), name, view)
    }

    fn handle(&self, request: &WapiRequest) -> WapiResponse {
        let query = Query::new(&request.query);
        let is_reference = request.targets_reference();

        match (request.method, is_reference) {
            (Method::Get, true) => self.read(&request.path, &query),
            (Method::Get, false) if query.get("_page_id").is_some() => self.next_page(&query),
            (Method::Get, false) => self.search(&request.path, &query),
            (Method::Post, false) => self.create(&request.path, request.body.as_deref()),
            (Method::Put, true) => self.update(&request.path, request.body.as_deref()),
            (Method::Delete, true) => self.delete(&request.path),
            _ => error_response(400, "Client.Ibap.Proto", &format!(
                "{} not supported on {}",
                request.method.as_str(),
                request.path
            )),
        }
    }

    fn read(&self, reference: &str, query: &Query) -> WapiResponse {
        let objects = self.objects.lock().unwrap();
        match objects.iter().find(|o| helpers::reference_of(o) == reference) {
            Some(object) => json_response(200, &project(object, query)),
            None => helpers::not_found(reference),
        }
    }

    fn search(&self, object_type: &str, query: &Query) -> WapiResponse {
        let matches: Vec<Value> = {
            let objects = self.objects.lock().unwrap();
            objects
                .iter()
                .filter(|o| helpers::object_type_of(o) == object_type)
                .filter(|o| query.filters().all(|(field, value)| helpers::field_equals(o, field, value)))
                .map(|o| project(o, query))
                .collect()
        };

        let max_results = query.get("_max_results").and_then(|v| v.parse::<usize>().ok());

        if query.get("_paging") == Some("1") {
            let page_size = max_results.unwrap_or(matches.len()).max(1);
            return self.page(page_size, matches);
        }

        if let Some(max) = max_results {
            if matches.len() > max {
                return error_response(
                    400,
                    "Client.Ibap.Proto",
                    &format!("Result set too large (> {})", max),
                );
            }
        }

        json_response(200, &Value::Array(matches))
    }

    fn page(&self, page_size: usize, mut remaining: Vec<Value>) -> WapiResponse {
        let rest = remaining.split_off(page_size.min(remaining.len()));
        let mut body = Map::new();
        body.insert("result".to_string(), Value::Array(remaining));

        if !rest.is_empty() {
            let page_id = format!("page{:06}", self.next_id());
            self.pages.lock().unwrap().insert(page_id.clone(), (page_size, rest));
            body.insert("next_page_id".to_string(), Value::String(page_id));
        }

        json_response(200, &Value::Object(body))
    }

    fn next_page(&self, query: &Query) -> WapiResponse {
        let page_id = query.get("_page_id").unwrap_or_default();
        let Some((page_size, remaining)) = self.pages.lock().unwrap().remove(page_id) else {
            return error_response(400, "Client.Ibap.Proto", &format!("Page id {} is not valid", page_id));
        };
        self.page(page_size, remaining)
    }

    fn create(&self, object_type: &str, body: Option<&[u8]>) -> WapiResponse {
        let mut fields = match helpers::parse_body(body) {
            Ok(fields) => fields,
            Err(response) => return response,
        };

        if fields.contains_key("_ref") {
            return error_response(400, "Client.Ibap.Proto", "Unknown argument/field: '_ref'");
        }
        if fields.get("name").and_then(Value::as_str).is_none_or(str::is_empty) {
            return error_response(400, "Client.Ibap.Proto", "Required field missing: name");
        }
        helpers::apply_defaults(object_type, &mut fields);

        {
            let objects = self.objects.lock().unwrap();
            let duplicate = objects.iter().any(|o| {
                helpers::object_type_of(o) == object_type
                    && o.get("name") == fields.get("name")
                    && o.get("view") == fields.get("view")
            });
            if duplicate {
                let name = fields.get("name").and_then(Value::as_str).unwrap_or_default();
                return error_response(
                    400,
                    "Client.Ibap.Data.Conflict",
                    &format!("The record '{}' already exists.", name),
                );
            }
        }

        let reference = self.issue_reference(object_type, &fields);
        fields.insert("_ref".to_string(), Value::String(reference.clone()));
        helpers::attach_host_to_addresses(&mut fields);
        self.objects.lock().unwrap().push(fields);

        json_response(201, &Value::String(reference))
    }

    fn update(&self, reference: &str, body: Option<&[u8]>) -> WapiResponse {
        let changes = match helpers::parse_body(body) {
            Ok(fields) => fields,
            Err(response) => return response,
        };
        if changes.contains_key("_ref") {
            return error_response(400, "Client.Ibap.Proto", "Unknown argument/field: '_ref'");
        }

        let mut objects = self.objects.lock().unwrap();
        let Some(object) = objects.iter_mut().find(|o| helpers::reference_of(o) == reference) else {
            return helpers::not_found(reference);
        };

        let renamed = changes.contains_key("name") || changes.contains_key("view");
        for (key, value) in changes {
            object.insert(key, value);
        }
        helpers::attach_host_to_addresses(object);

        if renamed {
            let object_type = helpers::object_type_of(object).to_string();
            let name = object.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
            let view = object.get("view").and_then(Value::as_str).unwrap_or("default").to_string();
            let id = helpers::id_of(reference);
            let new_reference = helpers::make_reference(&object_type, id, &name, &view);
            object.insert("_ref".to_string(), Value::String(new_reference));
        }

        json_response(200, &Value::String(helpers::reference_of(object).to_string()))
    }

    fn delete(&self, reference: &str) -> WapiResponse {
        let mut objects = self.objects.lock().unwrap();
        let Some(index) = objects.iter().position(|o| helpers::reference_of(o) == reference) else {
            return helpers::not_found(reference);
        };
        objects.remove(index);
        json_response(200, &Value::String(reference.to_string()))
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, request: WapiRequest) -> Result<WapiResponse, InfobloxError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(response) = self.queued.lock().unwrap().pop_front() {
            return Ok(response);
        }

        Ok(self.handle(&request))
    }
}
