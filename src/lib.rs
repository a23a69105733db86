pub mod cli;
pub mod config_dump;
pub mod error;
pub mod fetch;
pub mod k8s;
pub mod output;
pub mod summary;

use cli::Args;
use error::Error;
use fetch::AdminEndpoint;
use k8s::{Connect, PodTarget, Runner};
use output::{LineStyle, Ui};
use summary::RenderMode;
use termcolor::WriteColor;
use tracing::{info, warn};

const MAX_NAME_LEN: usize = 253;

/// A validated request: what to fetch and how to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub target: PodTarget,
    pub admin: AdminEndpoint,
    pub mode: RenderMode,
}

/// Runs one proxy-config invocation against the real cluster and stdout.
pub fn run(args: Args) -> Result<(), Error> {
    let mut ui = Ui::stdout();
    execute(&args, &k8s::KubeconfigConnector, &k8s::SystemRunner, &mut ui)
}

/// Validates, connects, fetches and renders, writing the report to `ui`.
///
/// Nothing is written unless every step succeeds.
pub fn execute<W: WriteColor>(
    args: &Args,
    connector: &impl Connect,
    runner: &impl Runner,
    ui: &mut Ui<W>,
) -> Result<(), Error> {
    // 校验必须先于任何网络访问。
    let request = validate(args)?;

    let conn = connector
        .connect(args.kubeconfig.as_deref(), args.context.as_deref())
        .map_err(|err| Error::Connection(format!("{err:#}")))?;
    info!(context = %conn.context, "kubernetes client ready");

    let raw = fetch::fetch_config_dump(runner, &conn, &request.target, request.admin)?;
    let report = summary::render(&raw, request.mode)?;

    ui.output(
        &format!(
            "Proxy configuration for {} in namespace {}",
            request.target.pod, request.target.namespace
        ),
        Some(LineStyle::Header),
    )?;
    if report.is_empty() && request.mode == RenderMode::Summary {
        ui.output("The proxy reports no configuration yet.", None)?;
    } else {
        ui.output(&report, None)?;
    }
    Ok(())
}

/// Checks operator input before anything touches the cluster.
pub fn validate(args: &Args) -> Result<Request, Error> {
    if !args.extra.is_empty() {
        return Err(Error::Validation(format!(
            "non-flag arguments given: {}",
            args.extra.join(", ")
        )));
    }

    let pod = match args.pod.as_deref() {
        Some(pod) if !pod.is_empty() => pod,
        _ => {
            return Err(Error::Validation(
                "pod must be specified (e.g. --pod podname)".to_string(),
            ))
        }
    };
    check_name("pod", pod)?;
    check_name("namespace", &args.namespace)?;
    check_name("container", &args.container)?;

    let mode = if args.full_config {
        RenderMode::Full(args.format.unwrap_or_default())
    } else {
        if let Some(format) = args.format {
            warn!(?format, "--format only applies with --full-config; ignoring");
        }
        RenderMode::Summary
    };

    Ok(Request {
        target: PodTarget {
            namespace: args.namespace.clone(),
            pod: pod.to_string(),
            container: args.container.clone(),
        },
        admin: AdminEndpoint {
            port: args.admin_port,
            include_eds: args.include_eds,
        },
        mode,
    })
}

/// Accepts DNS-1123 style names: lowercase alphanumerics, '-' and '.', alphanumeric at both ends.
fn check_name(what: &str, name: &str) -> Result<(), Error> {
    let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    let valid = name.len() <= MAX_NAME_LEN
        && edge_ok(name.chars().next())
        && edge_ok(name.chars().last())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');

    if valid {
        Ok(())
    } else {
        Err(Error::Validation(format!("invalid {what} name {name:?}")))
    }
}
