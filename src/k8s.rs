use anyhow::{anyhow, bail, Context, Result};
use kube::config::Kubeconfig;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// A pod container reached through the orchestration layer's exec mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodTarget {
    pub namespace: String,
    pub pod: String,
    pub container: String,
}

/// Resolved cluster connection: the kubeconfig and context every kubectl call uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConnection {
    pub kubeconfig: Option<PathBuf>,
    pub context: String,
}

impl ClusterConnection {
    /// Global kubectl flags selecting this connection.
    pub fn kubectl_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(path) = &self.kubeconfig {
            args.push("--kubeconfig".to_string());
            args.push(path.display().to_string());
        }
        args.push("--context".to_string());
        args.push(self.context.clone());
        args
    }
}

/// Creates an authenticated cluster connection from a config path and context name.
pub trait Connect {
    fn connect(&self, kubeconfig: Option<&Path>, context: Option<&str>)
        -> Result<ClusterConnection>;
}

/// Connector backed by the user's kubeconfig file.
pub struct KubeconfigConnector;

impl Connect for KubeconfigConnector {
    fn connect(
        &self,
        kubeconfig: Option<&Path>,
        context: Option<&str>,
    ) -> Result<ClusterConnection> {
        let config = match kubeconfig {
            Some(path) => Kubeconfig::read_from(path)
                .with_context(|| format!("failed to read kubeconfig {}", path.display()))?,
            None => Kubeconfig::read().context("failed to read kubeconfig. Is kubectl configured?")?,
        };

        let context = resolve_context(&config, context)?;
        debug!(%context, "resolved kubernetes context");

        Ok(ClusterConnection {
            kubeconfig: kubeconfig.map(Path::to_path_buf),
            context,
        })
    }
}

/// Picks the requested context, falling back to the kubeconfig's current context.
fn resolve_context(config: &Kubeconfig, requested: Option<&str>) -> Result<String> {
    let name = match requested {
        Some(name) => name.to_string(),
        None => config
            .current_context
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow!("no current context set; pass --context"))?,
    };

    let entry = config
        .contexts
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| anyhow!("context '{name}' not found in kubeconfig"))?;

    // 上下文引用的集群必须存在，否则 kubectl 会在 exec 时才报错。
    if let Some(cluster) = entry.context.as_ref().map(|c| c.cluster.as_str()) {
        if !config.clusters.iter().any(|c| c.name == cluster) {
            bail!("context '{name}' refers to unknown cluster '{cluster}'");
        }
    }

    Ok(name)
}

/// Executes external commands for cluster queries.
pub trait Runner {
    /// Runs a command and returns its stdout unmodified on success.
    /// Parameters: `program` (&str) executable name.
    /// Parameters: `args` (&[&str]) argument list.
    /// Returns: Result<String> with stdout or an error carrying stderr.
    fn run_capture(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// Runner implementation that invokes system binaries.
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run_capture(&self, program: &str, args: &[&str]) -> Result<String> {
        // Capture stdout and stderr to surface kubectl errors clearly.
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to run {program}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{program} failed ({}): {}", output.status, stderr.trim());
        }

        String::from_utf8(output.stdout)
            .with_context(|| format!("{program} returned non-UTF-8 output"))
    }
}

/// Builds kubectl arguments listing the container names of a pod.
pub fn build_kubectl_containers_args(conn: &ClusterConnection, target: &PodTarget) -> Vec<String> {
    let mut args = conn.kubectl_args();
    args.extend(
        [
            "get",
            "pod",
            target.pod.as_str(),
            "--namespace",
            target.namespace.as_str(),
            "-o",
            "jsonpath={.spec.containers[*].name}",
        ]
        .map(String::from),
    );
    args
}

/// Builds kubectl exec arguments for running a command inside a pod container.
/// Parameters: `conn` (&ClusterConnection) kubeconfig and context selection.
/// Parameters: `target` (&PodTarget) pod, namespace and container.
/// Parameters: `remote_cmd` (&[&str]) command executed inside the container.
/// Returns: Vec<String> argument list for kubectl.
pub fn build_kubectl_exec_args(
    conn: &ClusterConnection,
    target: &PodTarget,
    remote_cmd: &[&str],
) -> Vec<String> {
    let mut args = conn.kubectl_args();
    args.push("exec".to_string());
    args.push(target.pod.clone());
    args.push("--namespace".to_string());
    args.push(target.namespace.clone());
    args.push("-c".to_string());
    args.push(target.container.clone());

    // Pass argv directly; no shell inside the sidecar is assumed.
    args.push("--".to_string());
    args.extend(remote_cmd.iter().map(|s| s.to_string()));
    args
}

#[cfg(test)]
pub use fakes::*;

#[cfg(test)]
mod fakes {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    /// Records a command executed by a runner.
    pub struct CommandRecord {
        pub program: String,
        pub args: Vec<String>,
    }

    #[derive(Debug, Default)]
    /// Test runner replaying scripted responses and recording every call.
    pub struct FakeRunner {
        responses: Mutex<VecDeque<Result<String, String>>>,
        pub calls: Mutex<Vec<CommandRecord>>,
    }

    impl FakeRunner {
        /// Queues a successful stdout for the next call.
        pub fn with_output(self, stdout: &str) -> Self {
            self.responses.lock().unwrap().push_back(Ok(stdout.to_string()));
            self
        }

        /// Queues a failure for the next call.
        pub fn with_failure(self, message: &str) -> Self {
            self.responses.lock().unwrap().push_back(Err(message.to_string()));
            self
        }

        pub fn recorded(&self) -> Vec<CommandRecord> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Runner for FakeRunner {
        fn run_capture(&self, program: &str, args: &[&str]) -> Result<String> {
            self.calls.lock().unwrap().push(CommandRecord {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
            });
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(out)) => Ok(out),
                Some(Err(msg)) => Err(anyhow!(msg)),
                None => bail!("no scripted response for {program}"),
            }
        }
    }

    /// Connector returning a fixed connection.
    pub struct StaticConnector(pub ClusterConnection);

    impl StaticConnector {
        pub fn new(context: &str) -> Self {
            Self(ClusterConnection {
                kubeconfig: None,
                context: context.to_string(),
            })
        }
    }

    impl Connect for StaticConnector {
        fn connect(&self, _: Option<&Path>, _: Option<&str>) -> Result<ClusterConnection> {
            Ok(self.0.clone())
        }
    }

    /// Connector that always fails.
    pub struct FailingConnector(pub &'static str);

    impl Connect for FailingConnector {
        fn connect(&self, _: Option<&Path>, _: Option<&str>) -> Result<ClusterConnection> {
            bail!(self.0)
        }
    }
}
