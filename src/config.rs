//! Harness configuration.
use crate::constants::DEFAULT_REPORTS_DIR;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Harness configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// JSON-RPC endpoints.
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    /// Tenderly project.
    #[serde(default)]
    pub tenderly: TenderlyConfig,
    /// Simulation selection and output.
    #[serde(default)]
    pub simulations: SimulationsConfig,
    /// Transport retries.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl HarnessConfig {
    /// Sets the primary RPC endpoint.
    pub fn with_rpc_url(mut self, url: Option<Url>) -> Self {
        self.endpoints.rpc = url.or(self.endpoints.rpc);
        self
    }

    /// Sets the Ethereum mainnet RPC endpoint.
    pub fn with_l1_rpc_url(mut self, url: Option<Url>) -> Self {
        self.endpoints.l1 = url.or(self.endpoints.l1);
        self
    }

    /// Sets the Arbitrum One RPC endpoint.
    pub fn with_arb1_rpc_url(mut self, url: Option<Url>) -> Self {
        self.endpoints.arb1 = url.or(self.endpoints.arb1);
        self
    }

    /// Sets the Arbitrum Nova RPC endpoint.
    pub fn with_nova_rpc_url(mut self, url: Option<Url>) -> Self {
        self.endpoints.nova = url.or(self.endpoints.nova);
        self
    }

    /// Sets the Tenderly account.
    pub fn with_tenderly_user(mut self, user: Option<String>) -> Self {
        if let Some(user) = user {
            self.tenderly.user = user;
        }
        self
    }

    /// Sets the Tenderly project slug.
    pub fn with_tenderly_project(mut self, project: Option<String>) -> Self {
        if let Some(project) = project {
            self.tenderly.project = project;
        }
        self
    }

    /// Sets the Tenderly access key.
    pub fn with_tenderly_access_key(mut self, access_key: Option<String>) -> Self {
        if let Some(access_key) = access_key {
            self.tenderly.access_key = access_key;
        }
        self
    }

    /// Sets the simulation files to run, keeping the current ones if `files` is empty.
    pub fn with_simulation_files(mut self, files: impl IntoIterator<Item = PathBuf>) -> Self {
        let files: Vec<_> = files.into_iter().collect();
        if !files.is_empty() {
            self.simulations.files = files;
        }
        self
    }

    /// Sets the built-in simulations to run, keeping the current ones if `names` is empty.
    pub fn with_builtins(mut self, names: impl IntoIterator<Item = String>) -> Self {
        let names: Vec<_> = names.into_iter().collect();
        if !names.is_empty() {
            self.simulations.builtins = names;
        }
        self
    }

    /// Enables follow-up simulations of Arbitrum proposals.
    ///
    /// A `false` keeps the current setting.
    pub fn with_follow_ups(mut self, follow_ups: bool) -> Self {
        self.simulations.follow_ups |= follow_ups;
        self
    }

    /// Sets the directory reports are written to.
    pub fn with_reports_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.simulations.reports_dir = dir;
        }
        self
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// JSON-RPC endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Primary endpoint, used for governors on any chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc: Option<Url>,
    /// Ethereum mainnet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l1: Option<Url>,
    /// Arbitrum One.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arb1: Option<Url>,
    /// Arbitrum Nova.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nova: Option<Url>,
}

/// Tenderly project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderlyConfig {
    /// Account slug.
    #[serde(default)]
    pub user: String,
    /// Project slug.
    #[serde(default)]
    pub project: String,
    /// Access key.
    #[serde(skip_serializing, default)]
    pub access_key: String,
}

/// Simulation selection and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationsConfig {
    /// Simulation files to run.
    pub files: Vec<PathBuf>,
    /// Built-in simulations to run.
    pub builtins: Vec<String>,
    /// Whether to also run the L1 and retryable legs of Arbitrum proposals.
    pub follow_ups: bool,
    /// Directory reports are written to.
    pub reports_dir: PathBuf,
}

impl Default for SimulationsConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            builtins: Vec::new(),
            follow_ups: false,
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
        }
    }
}

/// Transport retries of the JSON-RPC providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryConfig {
    /// Maximum number of retries of a rate limited request.
    pub max_retries: u32,
    /// Initial backoff in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 10, backoff_ms: 800 }
    }
}
