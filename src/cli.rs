use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "proxycfg",
    version,
    about = "Get the sidecar proxy configuration for a Kubernetes Pod"
)]
pub struct Args {
    /// The name of the Kubernetes Pod to query.
    #[arg(short, long)]
    pub pod: Option<String>,

    /// The Namespace of the Kubernetes Pod to query.
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Return the full proxy configuration.
    #[arg(long)]
    pub full_config: bool,

    /// The output format for --full-config.
    #[arg(short = 'o', long, value_enum, ignore_case = true)]
    pub format: Option<OutputFormat>,

    /// The path to the Kubernetes config file.
    #[arg(short = 'c', long)]
    pub kubeconfig: Option<PathBuf>,

    /// The name of the Kubernetes context to use.
    #[arg(long)]
    pub context: Option<String>,

    // 代理所在的 sidecar 容器。
    #[arg(long, default_value = "envoy-sidecar")]
    pub container: String,

    #[arg(long, default_value_t = 19000)]
    pub admin_port: u16,

    /// Ask the admin endpoint to include endpoint (EDS) data.
    #[arg(long)]
    pub include_eds: bool,

    // 收集多余的位置参数，交给校验阶段拒绝。
    #[arg(hide = true)]
    pub extra: Vec<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}
