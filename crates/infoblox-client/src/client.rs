//! Infoblox WAPI client
//!
//! Entry point that owns the transport and hands out typed resources. The
//! HOST record helpers are thin compositions over [`Resource`].

use crate::common::query::{Condition, Options};
use crate::common::HttpTransport;
use crate::config::{InfobloxConfig, DEFAULT_MAX_RESULTS};
use crate::error::InfobloxError;
use crate::models::RecordHost;
use crate::resource::{Object, Record, Reference, Resource};
use crate::transport::{Method, Transport, WapiRequest};
use std::sync::Arc;
use tracing::debug;

/// Infoblox WAPI client
#[derive(Debug, Clone)]
pub struct InfobloxClient {
    transport: Arc<dyn Transport>,
    max_results: u32,
}

impl InfobloxClient {
    /// Create a client talking HTTP to the configured appliance
    pub fn new(config: &InfobloxConfig) -> Result<Self, InfobloxError> {
        let transport = HttpTransport::new(config)?;
        debug!("Created Infoblox client for {}", transport.base_url());
        Ok(Self {
            transport: Arc::new(transport),
            max_results: config.max_results,
        })
    }

    /// Create a client over any transport (e.g. the in-memory mock)
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Override the default search cap
    ///
    /// Zero is rejected: WAPI would refuse every non-empty search.
    pub fn with_max_results(mut self, max_results: u32) -> Result<Self, InfobloxError> {
        if max_results == 0 {
            return Err(InfobloxError::Config("max_results must be greater than zero".to_string()));
        }
        self.max_results = max_results;
        Ok(self)
    }

    /// Get the versioned WAPI base URL
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Resource for any record type
    pub fn resource<T: Record>(&self) -> Resource<T> {
        Resource::new(Arc::clone(&self.transport), self.max_results)
    }

    /// Validate credentials and connectivity
    ///
    /// Reads the `grid` object, which every authenticated user can see.
    pub async fn validate_credentials(&self) -> Result<(), InfobloxError> {
        debug!("Validating Infoblox credentials and connectivity");
        let request = WapiRequest::new(Method::Get, "grid");
        let response = self.transport.request(request).await?;
        crate::common::check_response(response, "GET grid", false)?;
        debug!("Credentials validated successfully");
        Ok(())
    }

    /// HOST record resource
    pub fn record_host(&self) -> Resource<RecordHost> {
        self.resource()
    }

    /// Handle for a HOST record with a known reference
    pub fn record_host_object(&self, reference: impl Into<Reference>) -> Object<RecordHost> {
        Object::new(reference)
    }

    /// Get a HOST record by reference
    ///
    /// Without options every schema field is requested, so the returned
    /// record reflects all server-side values.
    pub async fn get_record_host(
        &self,
        reference: impl Into<Reference>,
        options: Option<&Options>,
    ) -> Result<RecordHost, InfobloxError> {
        let default_options;
        let options = match options {
            Some(options) => options,
            None => {
                default_options = Options::with_return_fields(RecordHost::RETURN_FIELDS.iter().copied());
                &default_options
            }
        };

        let resource = self.record_host();
        self.record_host_object(reference)
            .get(&resource, options)
            .await
    }

    /// Find HOST records by exact name within a DNS view
    pub async fn find_record_host(&self, name: &str, view: &str) -> Result<Vec<RecordHost>, InfobloxError> {
        debug!("Querying HOST records name={} view={}", name, view);
        let conditions = [Condition::new("name", name), Condition::new("view", view)];
        let options = Options::with_return_fields(RecordHost::RETURN_FIELDS.iter().copied());
        self.record_host().find(&conditions, &options).await
    }

    /// Create a HOST record
    pub async fn create_record_host(&self, record: &RecordHost) -> Result<Reference, InfobloxError> {
        self.record_host().create(record).await
    }

    /// Update the fields set in `record` on an existing HOST record
    pub async fn update_record_host(
        &self,
        reference: impl Into<Reference>,
        record: &RecordHost,
    ) -> Result<Reference, InfobloxError> {
        let resource = self.record_host();
        self.record_host_object(reference).update(&resource, record).await
    }

    /// Delete a HOST record
    pub async fn delete_record_host(&self, reference: impl Into<Reference>) -> Result<Reference, InfobloxError> {
        let resource = self.record_host();
        self.record_host_object(reference).delete(&resource).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::models::{HostIpv4Addr, HostIpv6Addr};

    fn setup() -> (MockTransport, InfobloxClient) {
        let mock = MockTransport::new("https://gm.test/wapi/v2.7");
        let client = InfobloxClient::with_transport(Arc::new(mock.clone()));
        (mock, client)
    }

    fn host(name: &str, view: &str) -> RecordHost {
        RecordHost::new(name, view).with_ipv4(HostIpv4Addr::new("10.0.0.5"))
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let (_mock, client) = setup();
        let record = RecordHost {
            comment: Some("pxe target".to_string()),
            aliases: Some(vec!["pxe.example.com".to_string()]),
            configure_for_dns: Some(true),
            ..RecordHost::new("node1.example.com", "default")
                .with_ttl(600)
                .with_ipv4(HostIpv4Addr::new("10.0.0.21").with_dhcp("aa:bb:cc:00:00:01"))
                .with_ipv6(HostIpv6Addr::new("2001:db8::21"))
        };

        let reference = client.create_record_host(&record).await.unwrap();
        assert!(!reference.is_empty());

        let fetched = client.get_record_host(reference.clone(), None).await.unwrap();
        assert_eq!(fetched.reference(), Some(&reference));
        assert_eq!(fetched.name, record.name);
        assert_eq!(fetched.view, record.view);
        assert_eq!(fetched.ttl, Some(600));
        assert_eq!(fetched.use_ttl, Some(true));
        assert_eq!(fetched.comment, record.comment);
        assert_eq!(fetched.aliases, record.aliases);
        assert_eq!(fetched.configure_for_dns, Some(true));

        let v4 = &fetched.ipv4addrs.as_ref().unwrap()[0];
        assert_eq!(v4.ipv4addr.as_deref(), Some("10.0.0.21"));
        assert_eq!(v4.mac.as_deref(), Some("aa:bb:cc:00:00:01"));
        assert_eq!(v4.configure_for_dhcp, Some(true));
        assert_eq!(v4.host.as_deref(), Some("node1.example.com"));

        let v6 = &fetched.ipv6addrs.as_ref().unwrap()[0];
        assert_eq!(v6.ipv6addr.as_deref(), Some("2001:db8::21"));
    }

    #[tokio::test]
    async fn test_explicit_zero_values_round_trip() {
        let (mock, client) = setup();
        let record = RecordHost {
            ttl: Some(0),
            use_ttl: Some(false),
            comment: Some(String::new()),
            ..host("zero.example.com", "default")
        };

        let reference = client.create_record_host(&record).await.unwrap();
        let body: serde_json::Value =
            serde_json::from_str(mock.last_request().unwrap().body_text().unwrap()).unwrap();
        assert_eq!(body["ttl"], 0);
        assert_eq!(body["comment"], "");
        assert!(body.get("aliases").is_none());
        assert!(body.get("disable").is_none());

        let fetched = client.get_record_host(reference, None).await.unwrap();
        assert_eq!(fetched.ttl, Some(0));
        assert_eq!(fetched.comment.as_deref(), Some(""));
        assert_eq!(fetched.aliases, None);
    }

    #[tokio::test]
    async fn test_get_without_return_fields_only_has_basic_fields() {
        let (_mock, client) = setup();
        let reference = client
            .create_record_host(&host("basic.example.com", "default").with_ttl(300))
            .await
            .unwrap();

        let basic = client
            .get_record_host(reference, Some(&Options::default()))
            .await
            .unwrap();
        assert_eq!(basic.name.as_deref(), Some("basic.example.com"));
        assert_eq!(basic.ttl, None);
    }

    #[tokio::test]
    async fn test_find_record_host_by_name_and_view() {
        let (_mock, client) = setup();
        client.create_record_host(&host("a.example.com", "v1")).await.unwrap();
        client.create_record_host(&host("a.example.com", "v2")).await.unwrap();
        client.create_record_host(&host("b.example.com", "v1")).await.unwrap();

        let found = client.find_record_host("a.example.com", "v1").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.as_deref(), Some("a.example.com"));
        assert_eq!(found[0].view.as_deref(), Some("v1"));

        let missing = client.find_record_host("c.example.com", "v1").await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_find_sends_name_and_view_filters() {
        let (mock, client) = setup();
        client.find_record_host("a.example.com", "default").await.unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "record:host");
        assert_eq!(request.query[0], ("name".to_string(), "a.example.com".to_string()));
        assert_eq!(request.query[1], ("view".to_string(), "default".to_string()));
        assert!(request.query.iter().any(|(k, _)| k == "_return_fields"));
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_reference_fails() {
        let (_mock, client) = setup();
        let err = client
            .get_record_host("record:host/ZG5zLmhvc3QkZ2FyYmFnZQ:nope/default", None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_rename_reissues_reference() {
        let (_mock, client) = setup();
        let reference = client.create_record_host(&host("old.example.com", "default")).await.unwrap();

        let rename = RecordHost {
            name: Some("new.example.com".to_string()),
            ..RecordHost::default()
        };
        let renamed = client.update_record_host(reference.clone(), &rename).await.unwrap();
        assert_ne!(renamed, reference);
        assert!(renamed.as_str().contains("new.example.com"));

        assert!(client.get_record_host(reference, None).await.unwrap_err().is_not_found());
        let fetched = client.get_record_host(renamed, None).await.unwrap();
        assert_eq!(fetched.name.as_deref(), Some("new.example.com"));
        assert_eq!(fetched.ipv4addrs.unwrap()[0].ipv4addr.as_deref(), Some("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_delete_record_host() {
        let (mock, client) = setup();
        let reference = client.create_record_host(&host("gone.example.com", "default")).await.unwrap();
        assert_eq!(mock.count("record:host"), 1);

        let deleted = client.delete_record_host(reference.clone()).await.unwrap();
        assert_eq!(deleted, reference);
        assert_eq!(mock.count("record:host"), 0);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_server_error() {
        let (_mock, client) = setup();
        client.create_record_host(&host("dup.example.com", "default")).await.unwrap();
        let err = client
            .create_record_host(&host("dup.example.com", "default"))
            .await
            .unwrap_err();
        assert!(matches!(err, InfobloxError::Api { ref message, .. } if message.contains("already exists")));
    }

    #[tokio::test]
    async fn test_seeded_objects_are_findable() {
        let (mock, client) = setup();
        let reference = mock.add_object(
            "record:host",
            serde_json::json!({"name": "seeded.example.com", "ttl": 60}),
        );

        let found = client.find_record_host("seeded.example.com", "default").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference(), Some(&reference));
        assert_eq!(found[0].ttl, Some(60));
    }

    #[tokio::test]
    async fn test_validate_credentials() {
        let (mock, client) = setup();
        mock.push_response(crate::transport::WapiResponse {
            status: 200,
            body: br#"[{"_ref": "grid/b25lLmNsdXN0ZXIkMA:Infoblox"}]"#.to_vec(),
        });
        client.validate_credentials().await.unwrap();

        mock.push_response(crate::transport::WapiResponse {
            status: 401,
            body: b"Authorization Required".to_vec(),
        });
        let err = client.validate_credentials().await.unwrap_err();
        assert!(matches!(err, InfobloxError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_with_max_results_rejects_zero() {
        let (mock, client) = setup();
        let err = client.clone().with_max_results(0).unwrap_err();
        assert!(matches!(err, InfobloxError::Config(_)));

        let client = client.with_max_results(25).unwrap();
        client.find_record_host("a.example.com", "default").await.unwrap();
        let search = mock.last_request().unwrap();
        assert!(search.query.contains(&("_max_results".to_string(), "25".to_string())));
    }
}
