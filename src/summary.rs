use crate::cli::OutputFormat;
use crate::config_dump::{BootstrapInfo, ClusterInfo, ClusterOrigin, ConfigDump, ListenerInfo, RouteInfo};
use crate::error::Error;
use serde_json::Value;
use std::fmt::Write;
use tabled::{settings::Style, Table, Tabled};

const NETWORK_FILTER_PREFIX: &str = "envoy.filters.network.";

/// How a fetched config dump is presented.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderMode {
    /// Condensed report of bootstrap, clusters, listeners, routes and secrets.
    Summary,
    /// The full dump; JSON is passed through untouched.
    Full(OutputFormat),
}

/// Renders raw config dump text in the requested mode.
pub fn render(raw: &str, mode: RenderMode) -> Result<String, Error> {
    match mode {
        RenderMode::Full(OutputFormat::Json) => Ok(raw.to_string()),
        RenderMode::Full(OutputFormat::Yaml) => {
            let doc: Value = serde_json::from_str(raw)?;
            Ok(serde_yaml::to_string(&doc)?)
        }
        RenderMode::Summary => Ok(format_summary(&ConfigDump::parse(raw)?)),
    }
}

/// Formats the report; blocks always appear in the same order and absent sections are skipped.
pub fn format_summary(dump: &ConfigDump) -> String {
    let mut blocks = Vec::new();

    if let Some(b) = &dump.bootstrap {
        blocks.push(bootstrap_block(b));
    }
    if let Some(clusters) = &dump.clusters {
        blocks.push(format!("Clusters\n{}", cluster_table(clusters)));
    }
    if let Some(listeners) = &dump.listeners {
        blocks.push(format!("Listeners\n{}", listener_table(listeners)));
    }
    if let Some(routes) = &dump.routes {
        blocks.push(format!("Routes\n{}", route_table(routes)));
    }
    if dump.secrets {
        blocks.push(
            "Secrets\n  Secret material is present but withheld from this summary; use --full-config to view it."
                .to_string(),
        );
    }

    blocks.join("\n\n")
}

fn bootstrap_block(b: &BootstrapInfo) -> String {
    let static_clusters = if b.static_clusters.is_empty() {
        None
    } else {
        Some(b.static_clusters.join(", "))
    };
    let extensions = b.extensions.to_string();

    let fields = [
        ("Node ID", b.node_id.as_deref()),
        ("Cluster", b.node_cluster.as_deref()),
        ("Namespace", b.namespace.as_deref()),
        ("Partition", b.partition.as_deref()),
        ("Version", b.version.as_deref()),
        ("Admin", b.admin_address.as_deref()),
        ("xDS", b.xds.as_deref()),
        ("Static clusters", static_clusters.as_deref()),
        ("Extensions", Some(extensions.as_str())),
    ];

    let mut out = String::from("Bootstrap");
    for (label, value) in fields {
        let _ = write!(out, "\n  {:<17}{}", format!("{label}:"), value.unwrap_or("-"));
    }
    out
}

#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "ENDPOINTS")]
    endpoints: usize,
    #[tabled(rename = "ORIGIN")]
    origin: &'static str,
    #[tabled(rename = "TLS")]
    tls: &'static str,
}

fn cluster_table(clusters: &[ClusterInfo]) -> String {
    let rows = clusters.iter().map(|c| ClusterRow {
        name: c.name.clone(),
        kind: c.kind.clone(),
        endpoints: c.endpoints,
        origin: match c.origin {
            ClusterOrigin::Static => "static",
            ClusterOrigin::Dynamic => "dynamic",
        },
        tls: yes_no(c.tls),
    });
    Table::new(rows).with(Style::empty()).to_string()
}

#[derive(Tabled)]
struct ListenerRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ADDRESS")]
    address: String,
    #[tabled(rename = "DIRECTION")]
    direction: String,
    #[tabled(rename = "FILTER CHAINS")]
    filter_chains: usize,
    #[tabled(rename = "FILTERS")]
    filters: String,
    #[tabled(rename = "MTLS")]
    mtls: &'static str,
}

fn listener_table(listeners: &[ListenerInfo]) -> String {
    let rows = listeners.iter().map(|l| ListenerRow {
        name: l.name.clone(),
        address: l.address.clone().unwrap_or_else(|| "-".to_string()),
        direction: l.direction.clone(),
        filter_chains: l.filter_chains,
        filters: l
            .filters
            .iter()
            .map(|f| f.strip_prefix(NETWORK_FILTER_PREFIX).unwrap_or(f))
            .collect::<Vec<_>>()
            .join(", "),
        mtls: yes_no(l.mtls),
    });
    Table::new(rows).with(Style::empty()).to_string()
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "VIRTUAL HOSTS")]
    virtual_hosts: usize,
    #[tabled(rename = "ROUTES")]
    routes: usize,
}

fn route_table(routes: &[RouteInfo]) -> String {
    let rows = routes.iter().map(|r| RouteRow {
        name: r.name.clone(),
        virtual_hosts: r.virtual_hosts,
        routes: r.routes,
    });
    Table::new(rows).with(Style::empty()).to_string()
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}
