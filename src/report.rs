//! Markdown reports of simulated proposals.

use crate::{
    simulation::SimulationData,
    types::{AllCheckResults, CheckResult, SimulationConfig},
};
use chrono::DateTime;
use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};
use tracing::info;

/// A rendered simulation report.
#[derive(Debug)]
pub struct Report<'a> {
    data: &'a SimulationData,
    checks: &'a AllCheckResults,
    simulation_url: String,
}

impl<'a> Report<'a> {
    /// Creates a report linking to the simulation at `simulation_url`.
    pub fn new(
        data: &'a SimulationData,
        checks: &'a AllCheckResults,
        simulation_url: impl Into<String>,
    ) -> Self {
        Self { data, checks, simulation_url: simulation_url.into() }
    }

    /// Path of the report relative to the reports directory: `<dao>/<proposal>.md`.
    pub fn relative_path(&self) -> PathBuf {
        let config = &self.data.config;
        let id = self.data.result.proposal.id;
        let stem = match config {
            SimulationConfig::ArbL2ToL1(c) => format!("{id}-{}-{}", config.kind(), c.id_offset),
            SimulationConfig::ArbRetryable(c) => {
                format!("{id}-{}-{}-{}", config.kind(), c.chain_id.chain_id(), c.id_offset)
            }
            _ => id.to_string(),
        };
        Path::new(&sanitize(config.dao_name())).join(format!("{stem}.md"))
    }

    /// Renders the report.
    pub fn render(&self) -> String {
        let SimulationData { config, result, .. } = self.data;
        let proposal = &result.proposal;
        let block = &result.latest_block;
        let (errors, warnings) = self.checks.counts();

        let mut out = String::new();
        let _ = writeln!(out, "# {}: proposal {}\n", config.dao_name(), proposal.id);
        let _ = writeln!(out, "| | |\n|---|---|");
        let (kind, chain_id) = (config.kind(), proposal.chain_id);
        let _ = writeln!(out, "| Simulation | `{kind}` on chain {chain_id} |");
        let (governor, governor_type) = (config.governor_address(), config.governor_type());
        let _ = writeln!(out, "| Governor | `{governor}` ({governor_type}) |");
        let _ = writeln!(out, "| Proposer | `{}` |", proposal.proposer);
        let _ = write!(out, "| Latest block | {}", block.number);
        let time =
            i64::try_from(block.timestamp).ok().and_then(|ts| DateTime::from_timestamp(ts, 0));
        if let Some(time) = time {
            let _ = write!(out, " at {}", time.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        let _ = writeln!(out, " |");
        let (id, url) = (&result.sim.simulation.id, &self.simulation_url);
        let _ = writeln!(out, "| Tenderly | [{id}]({url}) |");
        let _ = writeln!(
            out,
            "| Outcome | {}, {errors} error(s), {warnings} warning(s) |\n",
            if self.checks.passed() { "passed" } else { "failed" }
        );

        if let Some(title) = proposal.description.lines().find(|line| !line.trim().is_empty()) {
            let _ = writeln!(out, "> {}\n", title.trim_start_matches('#').trim());
        }

        let _ = writeln!(out, "## Checks\n");
        for entry in self.checks.iter() {
            let _ = writeln!(out, "### {} {}\n", status(&entry.result), entry.name);
            section(&mut out, "Errors", &entry.result.errors);
            section(&mut out, "Warnings", &entry.result.warnings);
            section(&mut out, "Info", &entry.result.info);
        }
        out
    }

    /// Writes the report under `dir`, returning its path.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(self.relative_path());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.render())?;
        info!(path = %path.display(), "Wrote report");
        Ok(path)
    }
}

fn status(result: &CheckResult) -> &'static str {
    if !result.passed() {
        "❌"
    } else if !result.is_clean() {
        "❗"
    } else {
        "✅"
    }
}

fn section(out: &mut String, title: &str, messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    let _ = writeln!(out, "**{title}**\n");
    for message in messages {
        let _ = writeln!(out, "- {message}");
    }
    out.push('\n');
}

/// Keeps DAO names usable as a directory name.
fn sanitize(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') { c } else { '-' })
        .collect();
    if name.is_empty() { "unnamed".to_string() } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        checks::test_utils,
        simulation::SimulationResult,
        tenderly::simulation_url,
        types::{BlockInfo, ExecutedConfig, GovernorConfig, GovernorType},
    };
    use alloy::{
        primitives::{B256, U256},
        transports::mock::Asserter,
    };

    fn data() -> SimulationData {
        SimulationData {
            config: SimulationConfig::Executed(ExecutedConfig {
                governor: GovernorConfig {
                    dao_name: "Compound".to_string(),
                    governor_address: test_utils::GOVERNOR,
                    governor_type: GovernorType::Bravo,
                },
                proposal_id: U256::from(42),
            }),
            result: SimulationResult {
                sim: test_utils::fixture(),
                proposal: test_utils::proposal(),
                latest_block: BlockInfo {
                    number: 18_100_000,
                    timestamp: 1_694_260_800,
                    hash: B256::ZERO,
                },
            },
            deps: test_utils::deps(Asserter::new()),
        }
    }

    fn checks() -> AllCheckResults {
        let mut checks = AllCheckResults::default();
        checks.insert("status", "Simulation executes successfully", CheckResult::info("ok"));
        checks.insert(
            "logs",
            "Reports all events",
            CheckResult { warnings: vec!["undecoded".to_string()], ..Default::default() },
        );
        checks
    }

    #[test]
    fn renders_header_and_sections() {
        let data = data();
        let checks = checks();
        let url = simulation_url("gov", "sims", &data.result.sim.simulation.id);
        let report = Report::new(&data, &checks, url.clone()).render();

        assert!(report.starts_with("# Compound: proposal 42\n"));
        assert!(report.contains("| Latest block | 18100000 at 2023-09-09 12:00:00 UTC |"));
        assert!(report.contains(&format!("[3c1f7c4e-5b7a-4f3e-9d1a-8c2b6e4f0a11]({url})")));
        assert!(report.contains("| Outcome | passed, 0 error(s), 1 warning(s) |"));
        assert!(report.contains("> Grant COMP to a contributor\n"));
        assert!(report.contains("### ✅ Simulation executes successfully\n\n**Info**\n\n- ok\n"));
        assert!(report.contains("### ❗ Reports all events\n\n**Warnings**\n\n- undecoded\n"));
    }

    #[test]
    fn writes_under_dao_directory() {
        let dir = tempfile::tempdir().unwrap();
        let data = data();
        let checks = checks();
        let path = Report::new(&data, &checks, "url").write_to(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("Compound").join("42.md"));
        assert!(std::fs::read_to_string(path).unwrap().contains("## Checks"));
    }

    #[test]
    fn sanitizes_dao_names() {
        assert_eq!(sanitize("Uniswap V3/Gov"), "Uniswap-V3-Gov");
        assert_eq!(sanitize(""), "unnamed");
    }
}
