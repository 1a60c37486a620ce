//! # Harness CLI
use crate::{
    chains::Chains,
    checks::{ProposalCheck, default_checks, run_checks},
    config::HarnessConfig,
    report::Report,
    simulation::{SimulationData, Simulator},
    sims,
    tenderly::TenderlyClient,
    types::{AllCheckResults, SimulationConfig},
};
use clap::{Parser, builder::PossibleValuesParser};
use eyre::WrapErr;
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};
use url::Url;

/// Simulates governance proposals on Tenderly and checks the outcome.
#[derive(Debug, Parser)]
#[command(author, about = "govsim", long_about = None)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, one is created from the other arguments and stored under `govsim.yaml`.
    #[arg(long, value_name = "CONFIG", env = "GOVSIM_CONFIG", default_value = "govsim.yaml")]
    pub config: PathBuf,
    /// The primary RPC endpoint, used for governors on the chain it is connected to.
    #[arg(long = "rpc-url", value_name = "URL", env = "RPC_URL")]
    pub rpc_url: Option<Url>,
    /// An Ethereum mainnet RPC endpoint.
    #[arg(long = "l1-rpc-url", value_name = "URL", env = "L1_RPC_URL")]
    pub l1_rpc_url: Option<Url>,
    /// An Arbitrum One RPC endpoint.
    #[arg(long = "arb1-rpc-url", value_name = "URL", env = "ARB1_RPC_URL")]
    pub arb1_rpc_url: Option<Url>,
    /// An Arbitrum Nova RPC endpoint.
    #[arg(long = "nova-rpc-url", value_name = "URL", env = "NOVA_RPC_URL")]
    pub nova_rpc_url: Option<Url>,
    /// The Tenderly access key.
    #[arg(long = "tenderly-access-token", value_name = "KEY", env = "TENDERLY_ACCESS_TOKEN")]
    pub tenderly_access_token: Option<String>,
    /// The Tenderly account slug.
    #[arg(long = "tenderly-user", value_name = "USER", env = "TENDERLY_USER")]
    pub tenderly_user: Option<String>,
    /// The Tenderly project slug.
    #[arg(long = "tenderly-project", value_name = "PROJECT", env = "TENDERLY_PROJECT_SLUG")]
    pub tenderly_project: Option<String>,
    /// A simulation file to run, YAML or JSON.
    #[arg(long = "sim", value_name = "FILE")]
    pub sims: Vec<PathBuf>,
    /// A built-in simulation to run.
    #[arg(
        long = "builtin",
        value_name = "NAME",
        value_parser = PossibleValuesParser::new(sims::BUILTIN.iter().copied())
    )]
    pub builtins: Vec<String>,
    /// Also simulate the L1 and retryable legs of Arbitrum proposals.
    #[arg(long = "follow-ups", default_value_t = false)]
    pub follow_ups: bool,
    /// The directory reports are written to.
    #[arg(long = "reports-dir", value_name = "DIR")]
    pub reports_dir: Option<PathBuf>,
}

impl Args {
    /// Runs the configured simulations.
    pub async fn run(self) -> eyre::Result<()> {
        let config_path = self.config.clone();
        let config = self.load_config(&config_path)?;
        run(config).await
    }

    /// Loads the configuration file, or creates it from the arguments if missing.
    pub fn load_config(self, path: &Path) -> eyre::Result<HarnessConfig> {
        if !path.exists() {
            let config = self.merge_config(HarnessConfig::default());
            config.save_to_file(path)?;
            info!(path = %path.display(), "Created config file");
            Ok(config)
        } else {
            Ok(self.merge_config(HarnessConfig::load_from_file(path)?))
        }
    }

    /// Merges [`Args`] values into an existing [`HarnessConfig`] instance.
    pub fn merge_config(self, config: HarnessConfig) -> HarnessConfig {
        config
            .with_rpc_url(self.rpc_url)
            .with_l1_rpc_url(self.l1_rpc_url)
            .with_arb1_rpc_url(self.arb1_rpc_url)
            .with_nova_rpc_url(self.nova_rpc_url)
            .with_tenderly_user(self.tenderly_user)
            .with_tenderly_project(self.tenderly_project)
            .with_tenderly_access_key(self.tenderly_access_token)
            .with_simulation_files(self.sims)
            .with_builtins(self.builtins)
            .with_follow_ups(self.follow_ups)
            .with_reports_dir(self.reports_dir)
    }
}

/// Runs every simulation of `config`, checks it and writes its report.
///
/// A simulation that fails is logged and the run continues. The run fails if any simulation could
/// not be completed.
pub async fn run(config: HarnessConfig) -> eyre::Result<()> {
    let configs = simulation_configs(&config)?;
    if configs.is_empty() {
        warn!("No simulations configured, pass `--sim` or `--builtin`");
        return Ok(());
    }

    let chains = Chains::connect(&config.endpoints, config.retry).await?;
    let tenderly = TenderlyClient::new(&config.tenderly)?;
    let simulator = Simulator::new(chains, tenderly);
    let checks = default_checks();
    let reports_dir = &config.simulations.reports_dir;

    let mut queue = VecDeque::from(configs);
    let mut failures = 0usize;
    while let Some(sim_config) = queue.pop_front() {
        let dao = sim_config.dao_name().to_string();
        let data = match simulator.simulate(sim_config).await {
            Ok(data) => data,
            Err(err) => {
                error!(%dao, %err, "Simulation failed");
                failures += 1;
                continue;
            }
        };

        if config.simulations.follow_ups {
            queue.extend(follow_ups(&data));
        }

        let results = check(&checks, &data).await;
        let id = &data.result.sim.simulation.id;
        if let Err(err) = simulator.tenderly().share(id).await {
            warn!(%dao, %err, simulation = %id, "Failed to share simulation");
        }
        let url = simulator.tenderly().simulation_url(id);
        let path = Report::new(&data, &results, url)
            .write_to(reports_dir)
            .wrap_err_with(|| format!("failed to write report to {}", reports_dir.display()))?;

        let (errors, warnings) = results.counts();
        info!(
            %dao,
            proposal = %data.result.proposal.id,
            errors,
            warnings,
            report = %path.display(),
            "Checked proposal"
        );
    }

    if failures > 0 {
        eyre::bail!("{failures} simulation(s) failed");
    }
    Ok(())
}

/// Collects the simulations named by the config, files first.
fn simulation_configs(config: &HarnessConfig) -> eyre::Result<Vec<SimulationConfig>> {
    let mut configs = Vec::new();
    for path in &config.simulations.files {
        configs.push(SimulationConfig::load_from_file(path)?);
    }
    for name in &config.simulations.builtins {
        configs.push(sims::builtin(name)?);
    }
    Ok(configs)
}

/// The follow-up simulations of a simulated Arbitrum proposal.
fn follow_ups(data: &SimulationData) -> Vec<SimulationConfig> {
    let SimulationConfig::New(parent) = &data.config else { return Vec::new() };
    match sims::round_trip_configs(parent, data.result.proposal.id) {
        Ok(configs) => {
            if !configs.is_empty() {
                info!(count = configs.len(), "Queued follow-up simulations");
            }
            configs
        }
        Err(err) => {
            warn!(%err, "Failed to decode L2 to L1 messages, skipping follow-ups");
            Vec::new()
        }
    }
}

async fn check(checks: &[Box<dyn ProposalCheck>], data: &SimulationData) -> AllCheckResults {
    run_checks(checks, &data.result.proposal, &data.result.sim, &data.deps).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_env_style_args() {
        let args = Args::try_parse_from([
            "govsim",
            "--config",
            "custom.yaml",
            "--rpc-url",
            "http://localhost:8545",
            "--builtin",
            "atlas-fees",
            "--sim",
            "sims/compound.yaml",
            "--follow-ups",
        ])
        .unwrap();

        assert_eq!(args.config, PathBuf::from("custom.yaml"));
        assert_eq!(args.builtins, ["atlas-fees"]);
        assert!(args.follow_ups);

        let config = args.merge_config(HarnessConfig::default());
        assert_eq!(config.endpoints.rpc.unwrap().as_str(), "http://localhost:8545/");
        assert_eq!(config.simulations.files, [PathBuf::from("sims/compound.yaml")]);
        assert!(config.simulations.follow_ups);
    }

    #[test]
    fn rejects_unknown_builtin() {
        assert!(Args::try_parse_from(["govsim", "--builtin", "nope"]).is_err());
    }

    #[test]
    fn creates_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("govsim.yaml");
        let args = Args::try_parse_from(["govsim", "--tenderly-project", "sims"]).unwrap();

        let config = args.load_config(&path).unwrap();
        assert_eq!(config.tenderly.project, "sims");
        assert_eq!(HarnessConfig::load_from_file(&path).unwrap().tenderly.project, "sims");
    }

    #[test]
    fn reloading_config_does_not_repeat_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("govsim.yaml");
        let argv = ["govsim", "--sim", "a.yaml", "--builtin", "atlas-fees", "--follow-ups"];

        let created = Args::try_parse_from(argv).unwrap().load_config(&path).unwrap();
        let loaded = Args::try_parse_from(argv).unwrap().load_config(&path).unwrap();
        let loaded_again = Args::try_parse_from(argv).unwrap().load_config(&path).unwrap();

        for config in [created, loaded, loaded_again] {
            assert_eq!(config.simulations.files, [PathBuf::from("a.yaml")]);
            assert_eq!(config.simulations.builtins, ["atlas-fees"]);
            assert!(config.simulations.follow_ups);
        }
        let saved = HarnessConfig::load_from_file(&path).unwrap();
        assert_eq!(saved.simulations.builtins, ["atlas-fees"]);
    }

    #[test]
    fn collects_builtins() {
        let config = HarnessConfig::default().with_builtins(["atlas-fees".to_string()]);
        let configs = simulation_configs(&config).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].dao_name(), "Arbitrum");
    }
}
