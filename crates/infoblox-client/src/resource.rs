//! Generic WAPI resource layer
//!
//! A [`Resource`] is bound to one WAPI object type (via its [`Record`]
//! schema) and provides the get/find/create/update/delete primitives. An
//! [`Object`] addresses one remote entity by its [`Reference`]; it holds no
//! pointer back to its resource, so operations take the resource explicitly.

use crate::common::query::{build_query, Condition, Options, PagedResponse};
use crate::common::{check_response, decode};
use crate::error::InfobloxError;
use crate::transport::{Method, Transport, WapiRequest, WapiResponse};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

/// Opaque server-issued object reference (`_ref`)
///
/// Format is `<object type>/<id>:<display name>`, but only the object type
/// prefix is ever interpreted client-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    /// Wrap a reference string
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Reference as sent on the wire
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty string
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Object type prefix, e.g. `record:host`
    pub fn object_type(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }

    /// Unwrap into the raw string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Reference {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

impl From<&str> for Reference {
    fn from(reference: &str) -> Self {
        Self(reference.to_string())
    }
}

/// Schema of one WAPI object type
///
/// Implementors derive serde with `Option` fields skipped when `None`, so
/// only fields that were explicitly set are sent on create and update.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// WAPI object type name, e.g. `record:host`
    const OBJECT_TYPE: &'static str;

    /// Every readable field of the schema, for full-fidelity reads
    const RETURN_FIELDS: &'static [&'static str];

    /// Reference of a record read from the server
    fn reference(&self) -> Option<&Reference>;
}

/// Handle to one remote object
pub struct Object<T> {
    reference: Reference,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Object<T> {
    fn clone(&self) -> Self {
        Self::new(self.reference.clone())
    }
}

impl<T> fmt::Debug for Object<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object").field("reference", &self.reference).finish()
    }
}

impl<T> Object<T> {
    /// Create a handle for a known reference
    pub fn new(reference: impl Into<Reference>) -> Self {
        Self {
            reference: reference.into(),
            _record: PhantomData,
        }
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }
}

impl<T: Record> Object<T> {
    /// Fetch the current representation of this object
    pub async fn get(&self, resource: &Resource<T>, options: &Options) -> Result<T, InfobloxError> {
        resource.get(&self.reference, options).await
    }

    /// Write `record` over this object, returning the reference the server reports
    pub async fn update(&self, resource: &Resource<T>, record: &T) -> Result<Reference, InfobloxError> {
        resource.update(&self.reference, record).await
    }

    /// Delete this object
    pub async fn delete(&self, resource: &Resource<T>) -> Result<Reference, InfobloxError> {
        resource.delete(&self.reference).await
    }
}

/// CRUD surface for one WAPI object type
pub struct Resource<T> {
    transport: Arc<dyn Transport>,
    max_results: u32,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            max_results: self.max_results,
            _record: PhantomData,
        }
    }
}

impl<T: Record> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("object_type", &T::OBJECT_TYPE)
            .field("base_url", &self.transport.base_url())
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl<T: Record> Resource<T> {
    /// Bind a resource to a transport
    ///
    /// `max_results` is sent as `_max_results` on searches that do not set
    /// their own cap, and is the page size of [`Resource::find_all`].
    pub fn new(transport: Arc<dyn Transport>, max_results: u32) -> Self {
        Self {
            transport,
            max_results,
            _record: PhantomData,
        }
    }

    pub fn object_type(&self) -> &'static str {
        T::OBJECT_TYPE
    }

    /// Handle for an existing object of this type
    pub fn object(&self, reference: impl Into<Reference>) -> Object<T> {
        Object::new(reference)
    }

    /// Get an object by reference
    ///
    /// # Returns
    /// * `Ok(T)` - The decoded object
    /// * `Err(InfobloxError::NotFound)` - If the reference does not resolve
    pub async fn get(&self, reference: &Reference, options: &Options) -> Result<T, InfobloxError> {
        self.check_reference(reference)?;
        let context = format!("GET {}", reference);
        debug!("Fetching {} {}", T::OBJECT_TYPE, reference);

        let request = WapiRequest::new(Method::Get, reference.as_str()).with_query(options.to_query());
        let response = self.send(request, &context).await?;
        decode(&response, &context)
    }

    /// Search by field equality, returning undecoded objects
    pub async fn find_raw(
        &self,
        conditions: &[Condition],
        options: &Options,
    ) -> Result<Vec<serde_json::Value>, InfobloxError> {
        let context = format!("GET {} (search)", T::OBJECT_TYPE);
        let response = self.search(conditions, options, &context).await?;
        decode(&response, &context)
    }

    /// Search by field equality
    ///
    /// All conditions must match (AND). An empty list matches every object,
    /// up to `options.max_results` or the resource default; WAPI rejects a
    /// search whose result set would exceed that cap rather than truncating.
    /// No match yields an empty `Vec`.
    pub async fn find(&self, conditions: &[Condition], options: &Options) -> Result<Vec<T>, InfobloxError> {
        self.find_raw(conditions, options)
            .await?
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value(value).map_err(|e| {
                    InfobloxError::Decode(format!(
                        "GET {} (search): result {}: {}",
                        T::OBJECT_TYPE,
                        index,
                        e
                    ))
                })
            })
            .collect()
    }

    /// Fetch every object of this type
    pub async fn all(&self, options: &Options) -> Result<Vec<T>, InfobloxError> {
        self.find(&[], options).await
    }

    /// Search by field equality, following WAPI paging until exhausted
    ///
    /// Page size is `options.max_results` or the resource default.
    pub async fn find_all(&self, conditions: &[Condition], options: &Options) -> Result<Vec<T>, InfobloxError> {
        let page_size = options.max_results.unwrap_or(self.max_results);
        let mut first = options.clone();
        first.max_results = None;

        let mut query = build_query(conditions, &first)?;
        query.push(("_paging".to_string(), "1".to_string()));
        query.push(("_return_as_object".to_string(), "1".to_string()));
        query.push(("_max_results".to_string(), page_size.to_string()));

        let context = format!("GET {} (paged search)", T::OBJECT_TYPE);
        let mut request = WapiRequest::new(Method::Get, T::OBJECT_TYPE).with_query(query);
        let mut all_results = Vec::new();

        loop {
            debug!("Fetching page of {} ({} so far)", T::OBJECT_TYPE, all_results.len());
            let response = self.send(request, &context).await?;
            let page: PagedResponse<T> = decode(&response, &context)?;
            all_results.extend(page.result);

            match page.next_page_id {
                Some(page_id) if !page_id.is_empty() => {
                    request = WapiRequest::new(Method::Get, T::OBJECT_TYPE)
                        .with_query(vec![("_page_id".to_string(), page_id)]);
                }
                _ => break,
            }
        }

        Ok(all_results)
    }

    /// Create an object from a record
    pub async fn create(&self, record: &T) -> Result<Reference, InfobloxError> {
        let payload = Self::encode(record, || format!("POST {}", T::OBJECT_TYPE))?;
        self.create_json(payload).await
    }

    /// Create an object from a caller-serialized JSON payload
    ///
    /// No field validation happens client-side; the server's verdict is
    /// returned as an error.
    pub async fn create_json(&self, payload: Vec<u8>) -> Result<Reference, InfobloxError> {
        let context = format!("POST {}", T::OBJECT_TYPE);
        let request = WapiRequest::new(Method::Post, T::OBJECT_TYPE).with_body(payload);
        let response = self.send(request, &context).await?;
        let reference = Self::decode_reference(&response, &context)?;
        info!("Created {}", reference);
        Ok(reference)
    }

    /// Replace the fields present in `record` on an existing object
    ///
    /// Fields that are `None` are not sent and keep their server-side value.
    /// Returns the reference reported by the server, which changes when the
    /// object's name does.
    pub async fn update(&self, reference: &Reference, record: &T) -> Result<Reference, InfobloxError> {
        let payload = Self::encode(record, || format!("PUT {}", reference))?;
        self.update_json(reference, payload).await
    }

    /// Update an object from a caller-serialized JSON payload
    pub async fn update_json(&self, reference: &Reference, payload: Vec<u8>) -> Result<Reference, InfobloxError> {
        self.check_reference(reference)?;
        let context = format!("PUT {}", reference);
        let request = WapiRequest::new(Method::Put, reference.as_str()).with_body(payload);
        let response = self.send(request, &context).await?;
        let updated = Self::decode_reference(&response, &context)?;
        info!("Updated {}", updated);
        Ok(updated)
    }

    /// Delete an object by reference
    pub async fn delete(&self, reference: &Reference) -> Result<Reference, InfobloxError> {
        self.check_reference(reference)?;
        let context = format!("DELETE {}", reference);
        let request = WapiRequest::new(Method::Delete, reference.as_str());
        let response = self.send(request, &context).await?;
        let deleted = Self::decode_reference(&response, &context)?;
        info!("Deleted {}", deleted);
        Ok(deleted)
    }

    async fn search(
        &self,
        conditions: &[Condition],
        options: &Options,
        context: &str,
    ) -> Result<WapiResponse, InfobloxError> {
        let mut options = options.clone();
        if options.max_results.is_none() {
            options.max_results = Some(self.max_results);
        }
        let query = build_query(conditions, &options)?;

        debug!("Searching {} with conditions: {:?}", T::OBJECT_TYPE, conditions);
        let request = WapiRequest::new(Method::Get, T::OBJECT_TYPE).with_query(query);
        self.send(request, context).await
    }

    async fn send(&self, request: WapiRequest, context: &str) -> Result<WapiResponse, InfobloxError> {
        let by_reference = request.targets_reference();
        let response = self.transport.request(request).await?;
        check_response(response, context, by_reference)
    }

    fn encode(record: &T, context: impl FnOnce() -> String) -> Result<Vec<u8>, InfobloxError> {
        serde_json::to_vec(record).map_err(|source| InfobloxError::Serialization {
            context: context(),
            source,
        })
    }

    fn check_reference(&self, reference: &Reference) -> Result<(), InfobloxError> {
        if reference.is_empty() {
            return Err(InfobloxError::InvalidRequest(format!(
                "empty reference for {}",
                T::OBJECT_TYPE
            )));
        }
        if reference.object_type() != T::OBJECT_TYPE {
            return Err(InfobloxError::InvalidRequest(format!(
                "reference {} is not a {}",
                reference,
                T::OBJECT_TYPE
            )));
        }
        Ok(())
    }

    fn decode_reference(response: &WapiResponse, context: &str) -> Result<Reference, InfobloxError> {
        let reference: Reference = decode(response, context)?;
        if reference.is_empty() {
            return Err(InfobloxError::Decode(format!("{}: server returned an empty reference", context)));
        }
        Ok(reference)
    }
}
