//! Reads the proxy's config dump from its loopback-only admin endpoint.

use crate::error::Error;
use crate::k8s::{self, ClusterConnection, PodTarget, Runner};
use anyhow::{bail, Result};
use tracing::{debug, info};

const ADMIN_HOST: &str = "127.0.0.1";

/// Where the admin endpoint lives inside the pod's network namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminEndpoint {
    pub port: u16,
    pub include_eds: bool,
}

impl Default for AdminEndpoint {
    fn default() -> Self {
        Self {
            port: 19000,
            include_eds: false,
        }
    }
}

impl AdminEndpoint {
    pub fn config_dump_url(&self) -> String {
        let mut url = format!("{ADMIN_HOST}:{}/config_dump", self.port);
        if self.include_eds {
            url.push_str("?include_eds");
        }
        url
    }
}

/// Fetches the raw config dump of the target pod's sidecar.
///
/// A single attempt is made; any failure is returned as [`Error::Fetch`]
/// carrying the pod, namespace and underlying cause.
pub fn fetch_config_dump(
    runner: &impl Runner,
    conn: &ClusterConnection,
    target: &PodTarget,
    admin: AdminEndpoint,
) -> Result<String, Error> {
    fetch(runner, conn, target, admin).map_err(|err| Error::Fetch {
        pod: target.pod.clone(),
        namespace: target.namespace.clone(),
        cause: format!("{err:#}"),
    })
}

fn fetch(
    runner: &impl Runner,
    conn: &ClusterConnection,
    target: &PodTarget,
    admin: AdminEndpoint,
) -> Result<String> {
    ensure_container(runner, conn, target)?;

    let url = admin.config_dump_url();
    info!(pod = %target.pod, namespace = %target.namespace, %url, "fetching config dump");

    let args = k8s::build_kubectl_exec_args(conn, target, &["wget", "-qO-", url.as_str()]);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let body = runner.run_capture("kubectl", &args)?;

    if body.trim().is_empty() {
        bail!("admin endpoint {url} returned an empty response");
    }
    debug!(bytes = body.len(), "config dump received");
    Ok(body)
}

/// Verifies the pod exists and runs the sidecar container before exec'ing into it.
fn ensure_container(runner: &impl Runner, conn: &ClusterConnection, target: &PodTarget) -> Result<()> {
    let args = k8s::build_kubectl_containers_args(conn, target);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let names = runner.run_capture("kubectl", &args)?;

    let containers: Vec<&str> = names.split_whitespace().collect();
    if !containers.contains(&target.container.as_str()) {
        bail!(
            "container {} not found in pod (found: {})",
            target.container,
            if containers.is_empty() {
                "none".to_string()
            } else {
                containers.join(", ")
            }
        );
    }
    Ok(())
}
