//! Infoblox WAPI models
//!
//! These models match the WAPI `record:host` object and its nested address
//! structs. Every writable field is an `Option`: `None` is left out of the
//! request body, while `Some` is always sent, zero values included.

use crate::resource::{Record, Reference};
use serde::{Deserialize, Serialize};

/// HOST record (`record:host`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RecordHost {
    /// Server-issued reference; read-only, never sent
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// Read-only on the server; derived from `name`
    #[serde(skip_serializing)]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Must be true for `ttl` to take effect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ttl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure_for_dns: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4addrs: Option<Vec<HostIpv4Addr>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6addrs: Option<Vec<HostIpv6Addr>>,
}

impl Record for RecordHost {
    const OBJECT_TYPE: &'static str = "record:host";

    const RETURN_FIELDS: &'static [&'static str] = &[
        "name",
        "view",
        "zone",
        "ttl",
        "use_ttl",
        "comment",
        "aliases",
        "configure_for_dns",
        "disable",
        "ipv4addrs",
        "ipv6addrs",
    ];

    fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }
}

impl RecordHost {
    /// HOST record with a name and view, everything else unset
    pub fn new(name: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            view: Some(view.into()),
            ..Self::default()
        }
    }

    /// Add an IPv4 address entry
    pub fn with_ipv4(mut self, addr: HostIpv4Addr) -> Self {
        self.ipv4addrs.get_or_insert_with(Vec::new).push(addr);
        self
    }

    /// Add an IPv6 address entry
    pub fn with_ipv6(mut self, addr: HostIpv6Addr) -> Self {
        self.ipv6addrs.get_or_insert_with(Vec::new).push(addr);
        self
    }

    /// Set the TTL and enable it
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self.use_ttl = Some(true);
        self
    }
}

/// IPv4 address entry of a HOST record
///
/// Exists only nested inside its parent record; WAPI's own `_ref` for it
/// is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HostIpv4Addr {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4addr: Option<String>,
    /// Parent host name, filled in by the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure_for_dhcp: Option<bool>,
}

impl HostIpv4Addr {
    pub fn new(ipv4addr: impl Into<String>) -> Self {
        Self {
            ipv4addr: Some(ipv4addr.into()),
            ..Self::default()
        }
    }

    /// Bind to a MAC and serve the address over DHCP
    pub fn with_dhcp(mut self, mac: impl Into<String>) -> Self {
        self.mac = Some(mac.into());
        self.configure_for_dhcp = Some(true);
        self
    }
}

/// IPv6 address entry of a HOST record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HostIpv6Addr {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// DUID/MAC used for DHCPv6
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure_for_dhcp: Option<bool>,
}

impl HostIpv6Addr {
    pub fn new(ipv6addr: impl Into<String>) -> Self {
        Self {
            ipv6addr: Some(ipv6addr.into()),
            ..Self::default()
        }
    }
}
