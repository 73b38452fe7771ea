//! Command implementations
//!
//! Each command takes the client explicitly and returns the JSON it prints,
//! which keeps the commands testable against the in-memory WAPI.

use crate::error::CliError;
use clap::{Args, Subcommand};
use infoblox_client::{
    Condition, HostIpv4Addr, HostIpv6Addr, InfobloxClient, Options, Record, RecordHost,
};
use serde_json::{json, Value};
use tracing::info;

/// HOST record commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check credentials and connectivity
    Check,
    /// Get a HOST record by reference
    Get(GetArgs),
    /// Search HOST records by field equality
    Find(FindArgs),
    /// Create a HOST record
    Create(CreateArgs),
    /// Update fields of a HOST record
    Update(UpdateArgs),
    /// Delete a HOST record
    Delete {
        /// Record reference (`record:host/...`)
        reference: String,
    },
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Record reference (`record:host/...`)
    pub reference: String,

    /// Comma-separated fields to return (default: all HOST fields)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Return the basic fields in addition to --fields
    #[arg(long)]
    pub base: bool,
}

#[derive(Debug, Args)]
pub struct FindArgs {
    /// Exact host name
    #[arg(long)]
    pub name: Option<String>,

    /// DNS view
    #[arg(long)]
    pub view: Option<String>,

    /// Extra equality filter, e.g. --field zone=example.com
    #[arg(long = "field", value_parser = parse_condition)]
    pub fields: Vec<Condition>,

    /// Follow paging instead of failing when the result cap is exceeded
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Fully qualified host name
    #[arg(long)]
    pub name: String,

    /// DNS view
    #[arg(long, default_value = "default")]
    pub view: String,

    /// IPv4 address, optionally bound to a MAC for DHCP: ADDR[=MAC]
    #[arg(long = "ipv4", value_parser = parse_ipv4)]
    pub ipv4: Vec<HostIpv4Addr>,

    /// IPv6 address
    #[arg(long = "ipv6")]
    pub ipv6: Vec<String>,

    /// Record TTL in seconds (0 is sent as-is)
    #[arg(long)]
    pub ttl: Option<u32>,

    #[arg(long)]
    pub comment: Option<String>,

    /// DNS alias, may be repeated
    #[arg(long = "alias")]
    pub aliases: Vec<String>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Record reference (`record:host/...`)
    pub reference: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub ttl: Option<u32>,

    /// New comment; an empty string clears it
    #[arg(long)]
    pub comment: Option<String>,

    #[arg(long)]
    pub disable: Option<bool>,
}

/// Parse `field=value` into a search condition
pub fn parse_condition(raw: &str) -> Result<Condition, String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok(Condition::new(field, value)),
        _ => Err(format!("expected FIELD=VALUE, got {:?}", raw)),
    }
}

/// Parse `ADDR` or `ADDR=MAC` into an IPv4 address entry
pub fn parse_ipv4(raw: &str) -> Result<HostIpv4Addr, String> {
    match raw.split_once('=') {
        None if !raw.is_empty() => Ok(HostIpv4Addr::new(raw)),
        Some((addr, mac)) if !addr.is_empty() && !mac.is_empty() => Ok(HostIpv4Addr::new(addr).with_dhcp(mac)),
        _ => Err(format!("expected ADDR or ADDR=MAC, got {:?}", raw)),
    }
}

/// Run one command and return its JSON output
pub async fn run(client: &InfobloxClient, command: Command) -> Result<Value, CliError> {
    match command {
        Command::Check => {
            client.validate_credentials().await?;
            Ok(json!({"status": "ok", "url": client.base_url()}))
        }
        Command::Get(args) => get(client, args).await,
        Command::Find(args) => find(client, args).await,
        Command::Create(args) => create(client, args).await,
        Command::Update(args) => update(client, args).await,
        Command::Delete { reference } => {
            let deleted = client.delete_record_host(reference).await?;
            info!("Deleted HOST record {}", deleted);
            Ok(json!({"deleted": deleted}))
        }
    }
}

async fn get(client: &InfobloxClient, args: GetArgs) -> Result<Value, CliError> {
    let host = if args.fields.is_empty() {
        client.get_record_host(args.reference, None).await?
    } else {
        let options = Options::with_return_fields(args.fields).base(args.base);
        client.get_record_host(args.reference, Some(&options)).await?
    };
    Ok(serde_json::to_value(HostView::from(&host))?)
}

async fn find(client: &InfobloxClient, args: FindArgs) -> Result<Value, CliError> {
    let mut conditions = Vec::new();
    if let Some(name) = args.name {
        conditions.push(Condition::new("name", name));
    }
    if let Some(view) = args.view {
        conditions.push(Condition::new("view", view));
    }
    conditions.extend(args.fields);

    let resource = client.record_host();
    let options = Options::with_return_fields(RecordHost::RETURN_FIELDS.iter().copied());
    let hosts = if args.all {
        resource.find_all(&conditions, &options).await?
    } else {
        resource.find(&conditions, &options).await?
    };

    info!("Found {} HOST records", hosts.len());
    let views: Vec<HostView> = hosts.iter().map(HostView::from).collect();
    Ok(serde_json::to_value(views)?)
}

async fn create(client: &InfobloxClient, args: CreateArgs) -> Result<Value, CliError> {
    if args.ipv4.is_empty() && args.ipv6.is_empty() {
        return Err(CliError::InvalidArgument(
            "a HOST record needs at least one --ipv4 or --ipv6 address".to_string(),
        ));
    }

    let mut record = RecordHost::new(args.name, args.view);
    if let Some(ttl) = args.ttl {
        record = record.with_ttl(ttl);
    }
    record.comment = args.comment;
    if !args.aliases.is_empty() {
        record.aliases = Some(args.aliases);
    }
    for addr in args.ipv4 {
        record = record.with_ipv4(addr);
    }
    for addr in args.ipv6 {
        record = record.with_ipv6(HostIpv6Addr::new(addr));
    }

    let reference = client.create_record_host(&record).await?;
    info!("Created HOST record {}", reference);
    Ok(json!({"reference": reference}))
}

async fn update(client: &InfobloxClient, args: UpdateArgs) -> Result<Value, CliError> {
    let mut change = RecordHost {
        name: args.name,
        comment: args.comment,
        disable: args.disable,
        ..RecordHost::default()
    };
    if let Some(ttl) = args.ttl {
        change = change.with_ttl(ttl);
    }
    if change == RecordHost::default() {
        return Err(CliError::InvalidArgument("nothing to update".to_string()));
    }

    let reference = client.update_record_host(args.reference, &change).await?;
    Ok(json!({"reference": reference}))
}

/// Printed form of a HOST record: the reference is shown, unlike on the wire
#[derive(Debug, serde::Serialize)]
struct HostView<'a> {
    #[serde(rename = "_ref")]
    reference: Option<&'a str>,
    #[serde(flatten)]
    record: &'a RecordHost,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone: Option<&'a str>,
}

impl<'a> From<&'a RecordHost> for HostView<'a> {
    fn from(host: &'a RecordHost) -> Self {
        Self {
            reference: host.reference.as_ref().map(|r| r.as_str()),
            record: host,
            zone: host.zone.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infoblox_client::MockTransport;
    use std::sync::Arc;

    fn setup() -> InfobloxClient {
        InfobloxClient::with_transport(Arc::new(MockTransport::new("https://gm.test/wapi/v2.7")))
    }

    fn create_args(name: &str) -> CreateArgs {
        CreateArgs {
            name: name.to_string(),
            view: "default".to_string(),
            ipv4: vec![parse_ipv4("10.0.0.5=aa:bb:cc:dd:ee:ff").unwrap()],
            ipv6: Vec::new(),
            ttl: Some(0),
            comment: None,
            aliases: Vec::new(),
        }
    }

    #[test]
    fn test_parse_condition() {
        assert_eq!(parse_condition("zone=example.com").unwrap(), Condition::new("zone", "example.com"));
        assert_eq!(parse_condition("comment=").unwrap(), Condition::new("comment", ""));
        assert!(parse_condition("=x").is_err());
        assert!(parse_condition("novalue").is_err());
    }

    #[test]
    fn test_parse_ipv4() {
        let plain = parse_ipv4("10.0.0.5").unwrap();
        assert_eq!(plain.ipv4addr.as_deref(), Some("10.0.0.5"));
        assert_eq!(plain.configure_for_dhcp, None);

        let dhcp = parse_ipv4("10.0.0.6=aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(dhcp.mac.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
        assert_eq!(dhcp.configure_for_dhcp, Some(true));

        assert!(parse_ipv4("10.0.0.7=").is_err());
        assert!(parse_ipv4("").is_err());
    }

    #[tokio::test]
    async fn test_create_get_find_delete() {
        let client = setup();

        let created = run(&client, Command::Create(create_args("cli.example.com"))).await.unwrap();
        let reference = created["reference"].as_str().unwrap().to_string();

        let fetched = run(
            &client,
            Command::Get(GetArgs {
                reference: reference.clone(),
                fields: Vec::new(),
                base: false,
            }),
        )
        .await
        .unwrap();
        assert_eq!(fetched["_ref"], reference.as_str());
        assert_eq!(fetched["ttl"], 0);
        assert_eq!(fetched["ipv4addrs"][0]["mac"], "aa:bb:cc:dd:ee:ff");

        let found = run(
            &client,
            Command::Find(FindArgs {
                name: Some("cli.example.com".to_string()),
                view: None,
                fields: vec![Condition::new("view", "default")],
                all: false,
            }),
        )
        .await
        .unwrap();
        assert_eq!(found.as_array().unwrap().len(), 1);

        let deleted = run(&client, Command::Delete { reference: reference.clone() }).await.unwrap();
        assert_eq!(deleted["deleted"], reference.as_str());
    }

    #[tokio::test]
    async fn test_create_requires_an_address() {
        let client = setup();
        let mut args = create_args("bare.example.com");
        args.ipv4.clear();

        let err = run(&client, Command::Create(args)).await.unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_update_requires_a_change() {
        let client = setup();
        let created = run(&client, Command::Create(create_args("upd.example.com"))).await.unwrap();
        let reference = created["reference"].as_str().unwrap().to_string();

        let empty = UpdateArgs {
            reference: reference.clone(),
            name: None,
            ttl: None,
            comment: None,
            disable: None,
        };
        assert!(matches!(
            run(&client, Command::Update(empty)).await.unwrap_err(),
            CliError::InvalidArgument(_)
        ));

        let clear_comment = UpdateArgs {
            reference,
            name: None,
            ttl: None,
            comment: Some(String::new()),
            disable: None,
        };
        let updated = run(&client, Command::Update(clear_comment)).await.unwrap();
        assert!(updated["reference"].as_str().unwrap().starts_with("record:host/"));
    }

    #[tokio::test]
    async fn test_get_unknown_reference_is_an_error() {
        let client = setup();
        let err = run(
            &client,
            Command::Get(GetArgs {
                reference: "record:host/bm9wZQ:nope/default".to_string(),
                fields: Vec::new(),
                base: false,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Infoblox(ref e) if e.is_not_found()));
    }
}
