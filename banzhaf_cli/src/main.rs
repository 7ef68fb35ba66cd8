use std::{
    fs::File,
    io::{self, BufWriter},
    path::PathBuf,
};

use anyhow::{Context, Result};
use banzhaf_core::{
    enumerate_exact, load_estimator_config_from_env, load_member_table_from_env, DemographicTable,
    EstimatorConfig, Granularity, MemberTable, PowerIndex,
};
use clap::{Parser, ValueEnum};
use tracing::info;

mod csv_io;

/// How many of the strongest units are echoed to the log after a run.
const TOP_UNITS_LOGGED: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Flat,
    Race,
    RaceAgeSex,
}

impl From<Mode> for Granularity {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Flat => Granularity::Flat,
            Mode::Race => Granularity::SingleLevelBlocks,
            Mode::RaceAgeSex => Granularity::MultiLevelBlocks,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Estimate Banzhaf power indices for weighted and hierarchical voting bodies",
    long_about = None
)]
struct Cli {
    /// Estimator config JSON (defaults to BANZHAF_CONFIG_PATH, then the builtin)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Member table JSON (defaults to BANZHAF_MEMBERS_PATH, then the electoral college)
    #[arg(long)]
    members: Option<PathBuf>,

    /// Wide demographic share CSV, required for block modes
    #[arg(long)]
    demographics: Option<PathBuf>,

    /// Column of the demographic CSV holding member ids
    #[arg(long, default_value = "state")]
    member_column: String,

    /// Override the configured granularity
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Override the configured number of trials
    #[arg(long)]
    trials: Option<u64>,

    /// Override the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the configured worker count
    #[arg(long)]
    workers: Option<usize>,

    /// Count every assignment instead of sampling (flat bodies only)
    #[arg(long, conflicts_with_all = ["mode", "trials", "seed", "workers", "demographics"])]
    exact: bool,

    /// Write the CSV here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = apply_overrides(load_config(&cli)?, &cli);
    let body = load_members(&cli)?
        .into_hierarchy()
        .context("member table is not a valid voting body")?;
    info!(
        target: "banzhaf::cli",
        members = body.len(),
        total_weight = body.total_weight(),
        threshold = body.threshold(),
        "cli.body=loaded"
    );

    let (index, per_person) = if cli.exact {
        let counters = enumerate_exact(&body).context("exact enumeration failed")?;
        let index = counters.normalize().context("exact enumeration found no pivots")?;
        let per_person = index.per_person(&body.flat());
        (index, per_person)
    } else {
        let table = load_demographics(&cli, config.mode())?;
        let estimate = match banzhaf_core::estimate(&body, &table, &config) {
            Err(err) if err.is_degenerate() => {
                return Err(err).context("raise --trials so at least one unit is pivotal");
            }
            other => other.context("estimation failed")?,
        };
        let per_person = estimate.per_person();
        (estimate.index, per_person)
    };

    log_top_units(&index);
    write_output(&cli, &index, per_person.as_deref())
}

fn load_config(cli: &Cli) -> Result<EstimatorConfig> {
    match &cli.config {
        Some(path) => EstimatorConfig::from_file(path)
            .with_context(|| format!("failed to load estimator config {}", path.display())),
        None => Ok(load_estimator_config_from_env()),
    }
}

fn apply_overrides(mut config: EstimatorConfig, cli: &Cli) -> EstimatorConfig {
    if let Some(mode) = cli.mode {
        config = config.with_mode(mode.into());
    }
    if let Some(trials) = cli.trials {
        config = config.with_trials(trials);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(workers) = cli.workers {
        config = config.with_workers(workers);
    }
    config
}

fn load_members(cli: &Cli) -> Result<MemberTable> {
    match &cli.members {
        Some(path) => MemberTable::from_file(path)
            .with_context(|| format!("failed to load member table {}", path.display())),
        None => Ok(load_member_table_from_env()),
    }
}

fn load_demographics(cli: &Cli, mode: Granularity) -> Result<DemographicTable> {
    if mode == Granularity::Flat {
        return Ok(DemographicTable::new());
    }
    let path = cli
        .demographics
        .as_ref()
        .with_context(|| format!("mode {mode} needs --demographics"))?;
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    csv_io::read_demographics(file, &cli.member_column)
        .with_context(|| format!("failed to read demographics from {}", path.display()))
}

fn log_top_units(index: &PowerIndex) {
    for (rank, (unit, weight)) in index.ranked().into_iter().take(TOP_UNITS_LOGGED).enumerate() {
        info!(
            target: "banzhaf::cli",
            rank = rank + 1,
            unit = %unit,
            weight,
            "cli.index=top_unit"
        );
    }
}

fn write_output(cli: &Cli, index: &PowerIndex, per_person: Option<&[Option<f64>]>) -> Result<()> {
    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            csv_io::write_index(BufWriter::new(file), index, per_person)?;
            info!(target: "banzhaf::cli", path = %path.display(), "cli.output=written");
        }
        None => {
            let stdout = io::stdout();
            csv_io::write_index(stdout.lock(), index, per_person)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_arguments_are_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::parse_from([
            "banzhaf", "--mode", "race", "--trials", "500", "--seed", "9", "--workers", "4",
        ]);
        let config = apply_overrides(EstimatorConfig::default(), &cli);
        assert_eq!(config.mode(), Granularity::SingleLevelBlocks);
        assert_eq!(config.trials(), 500);
        assert_eq!(config.seed(), 9);
        assert_eq!(config.workers(), 4);
    }

    #[test]
    fn exact_conflicts_with_sampling_flags() {
        assert!(Cli::try_parse_from(["banzhaf", "--exact", "--trials", "10"]).is_err());
    }

    #[test]
    fn block_modes_require_a_demographic_file() {
        let cli = Cli::parse_from(["banzhaf", "--mode", "race"]);
        let err = load_demographics(&cli, Granularity::SingleLevelBlocks).unwrap_err();
        assert!(err.to_string().contains("--demographics"));
    }
}
