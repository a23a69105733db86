use thiserror::Error;

/// Failures of a single proxy-config invocation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error validating flags: {0}")]
    Validation(String),

    #[error("Error setting up Kubernetes client: {0}")]
    Connection(String),

    #[error("Error fetching configuration for {pod} in namespace {namespace}: {cause}")]
    Fetch {
        pod: String,
        namespace: String,
        cause: String,
    },

    #[error("Error parsing proxy configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Error converting proxy configuration to YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Error writing output: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    /// Process exit status for this failure; usage problems use 2 like clap does.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_) => 2,
            _ => 1,
        }
    }
}
