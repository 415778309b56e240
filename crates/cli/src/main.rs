use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use banditsim_core::{
    export, BanditSimulator, RngSampler, SimulationConfig, SimulationOutcome, SourceBounds,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "banditsim",
    version,
    about = "Epsilon-greedy bandit simulation with decaying exploration"
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a simulation and emit the per-step series
    Run {
        #[command(flatten)]
        sim: SimArgs,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run a simulation and print per-source statistics
    Summary {
        #[command(flatten)]
        sim: SimArgs,
    },
}

#[derive(Args, Debug)]
struct SimArgs {
    /// Reward range LOW:HIGH of a source, upper bound excluded (repeatable)
    #[arg(long = "source", value_name = "LOW:HIGH", allow_hyphen_values = true)]
    sources: Vec<SourceBounds>,
    /// Total number of pulls
    #[arg(long)]
    steps: Option<usize>,
    /// Round-robin passes over all sources before exploiting
    #[arg(long)]
    exploration_passes: Option<usize>,
    /// Initial epsilon (default 1/number of sources)
    #[arg(long)]
    epsilon: Option<f64>,
    /// Factor applied to epsilon after every exploitation pull
    #[arg(long)]
    decay_rate: Option<f64>,
    /// RNG seed; random when unset
    #[arg(long, env = "BANDITSIM_SEED")]
    seed: Option<u64>,
}

impl SimArgs {
    fn config(&self) -> SimulationConfig {
        let defaults = SimulationConfig::default();
        SimulationConfig {
            sources: if self.sources.is_empty() {
                defaults.sources
            } else {
                self.sources.clone()
            },
            steps: self.steps.unwrap_or(defaults.steps),
            exploration_passes: self
                .exploration_passes
                .unwrap_or(defaults.exploration_passes),
            initial_epsilon: self.epsilon,
            decay_rate: self.decay_rate.unwrap_or(defaults.decay_rate),
        }
    }

    fn simulate(&self) -> anyhow::Result<SimulationOutcome> {
        let simulator = BanditSimulator::new(self.config())?;
        let outcome = match self.seed {
            Some(seed) => {
                info!(seed, "using seeded sampler");
                simulator.run(&mut RngSampler::seeded(seed))?
            }
            None => simulator.run(&mut RngSampler::from_entropy())?,
        };
        Ok(outcome)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Csv,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { sim, format, out } => {
            let outcome = sim.simulate()?;
            match out {
                Some(path) => {
                    write_series_file(&outcome, format, &path)?;
                    info!(path = %path.display(), "series written");
                }
                None => {
                    let stdout = io::stdout();
                    write_series(&outcome, format, stdout.lock())?;
                }
            }
        }
        Commands::Summary { sim } => {
            let outcome = sim.simulate()?;
            println!("{}", summary_table(&outcome));
            println!("{}", totals_line(&outcome));
        }
    }

    Ok(())
}

fn write_series<W: Write>(
    outcome: &SimulationOutcome,
    format: Format,
    writer: W,
) -> anyhow::Result<()> {
    match format {
        Format::Json => export::write_json(outcome, writer)?,
        Format::Csv => export::write_csv(outcome, writer)?,
    }
    Ok(())
}

fn write_series_file(
    outcome: &SimulationOutcome,
    format: Format,
    path: &Path,
) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(dir) {
            warn!(path = %dir.display(), error = %err, "failed to create output directory");
        }
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_series(outcome, format, &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

fn summary_table(outcome: &SimulationOutcome) -> String {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Source")]
        number: usize,
        #[tabled(rename = "Range")]
        range: String,
        #[tabled(rename = "Pulls")]
        pulls: u64,
        #[tabled(rename = "Return")]
        cumulative_return: i64,
        #[tabled(rename = "Average")]
        average: String,
        #[tabled(rename = "Best")]
        best: String,
    }

    let rows: Vec<Row> = outcome
        .sources
        .iter()
        .map(|source| Row {
            number: source.index + 1,
            range: format!("[{}, {})", source.lower_bound, source.upper_bound),
            pulls: source.pulls,
            cumulative_return: source.cumulative_return,
            average: format!("{:.3}", source.running_average),
            best: if source.index == outcome.best_index {
                "*".to_string()
            } else {
                String::new()
            },
        })
        .collect();

    Table::new(rows).to_string()
}

fn totals_line(outcome: &SimulationOutcome) -> String {
    format!(
        "total reward {} over {} pulls, mean {:.3}, final epsilon {:.3e}, best source {}",
        outcome.total_reward(),
        outcome.series.len(),
        outcome.mean_reward(),
        outcome.final_epsilon,
        outcome.best_index + 1
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("banditsim").chain(args.iter().copied())).unwrap()
    }

    fn sim_args(cli: Cli) -> SimArgs {
        match cli.command {
            Commands::Run { sim, .. } | Commands::Summary { sim } => sim,
        }
    }

    #[test]
    fn flags_override_reference_defaults() {
        let sim = sim_args(parse(&[
            "run",
            "--source",
            "5:6",
            "--source",
            "-10:11",
            "--steps",
            "40",
            "--exploration-passes",
            "2",
            "--epsilon",
            "0.25",
            "--decay-rate",
            "0.9",
            "--seed",
            "3",
        ]));
        let config = sim.config();
        assert_eq!(
            config.sources,
            vec![SourceBounds::new(5, 6), SourceBounds::new(-10, 11)]
        );
        assert_eq!(config.steps, 40);
        assert_eq!(config.exploration_passes, 2);
        assert_eq!(config.initial_epsilon, Some(0.25));
        assert_eq!(config.decay_rate, 0.9);
        assert_eq!(sim.seed, Some(3));
    }

    #[test]
    fn missing_flags_fall_back_to_reference_experiment() {
        let config = sim_args(parse(&["summary"])).config();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn malformed_source_is_rejected_by_the_parser() {
        let result = Cli::try_parse_from(["banditsim", "run", "--source", "7"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_configuration_is_reported() {
        let sim = sim_args(parse(&[
            "run",
            "--source",
            "1:2",
            "--steps",
            "3",
            "--exploration-passes",
            "4",
        ]));
        let err = sim.simulate().unwrap_err();
        assert!(err.to_string().contains("exploration passes"), "{err}");
    }

    #[test]
    fn csv_export_lands_in_nested_directory() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("runs").join("series.csv");
        let sim = sim_args(parse(&[
            "run", "--source", "5:6", "--source", "10:11", "--steps", "6", "--exploration-passes",
            "1", "--seed", "1",
        ]));
        let outcome = sim.simulate().unwrap();

        write_series_file(&outcome, Format::Csv, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 7);
        assert!(text.starts_with(export::CSV_HEADER));
    }

    #[test]
    fn summary_marks_best_source() {
        let sim = sim_args(parse(&[
            "summary", "--source", "5:6", "--source", "10:11", "--steps", "10", "--seed", "8",
            "--exploration-passes", "1",
        ]));
        let outcome = sim.simulate().unwrap();
        let table = summary_table(&outcome);
        assert!(table.contains("[10, 11)"));
        assert!(table.contains('*'));
        assert!(totals_line(&outcome).ends_with("best source 2"));
    }
}
