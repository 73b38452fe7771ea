//! Infoblox WAPI Client
//!
//! A Rust client library for the Infoblox Web API (WAPI), the REST interface
//! of Infoblox DNS/DHCP/IPAM appliances. A generic [`Resource`] layer provides
//! get/find/create/update/delete for any object type; HOST records
//! (`record:host`) are supported out of the box.
//!
//! # Example
//!
//! ```no_run
//! use infoblox_client::{HostIpv4Addr, InfobloxClient, InfobloxConfig, RecordHost};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = InfobloxConfig::new("https://gm.example.com", "admin", "infoblox");
//! let client = InfobloxClient::new(&config)?;
//!
//! // Create a HOST record with a DHCP-enabled address
//! let record = RecordHost::new("node1.example.com", "default")
//!     .with_ipv4(HostIpv4Addr::new("10.0.0.21").with_dhcp("aa:bb:cc:00:00:01"));
//! let reference = client.create_record_host(&record).await?;
//!
//! // Read it back and search by name
//! let host = client.get_record_host(reference, None).await?;
//! let matches = client.find_record_host("node1.example.com", "default").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Typed records**: `Option` fields separate "unset" from "zero"
//! - **Search**: equality conditions combined with AND, capped or paged
//! - **Errors**: not-found, transport, decode and auth failures kept apart
//! - **Mocking**: in-memory WAPI behind the `test-util` feature

pub mod client;
pub mod common;
pub mod config;
pub mod error;
pub mod models;
pub mod resource;
#[path = "trait.rs"]
pub mod transport;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::InfobloxClient;
pub use common::query::{Condition, Options};
pub use common::HttpTransport;
pub use config::InfobloxConfig;
pub use error::InfobloxError;
pub use models::*;
pub use resource::{Object, Record, Reference, Resource};
pub use transport::{Method, Transport, WapiRequest, WapiResponse};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockTransport;
