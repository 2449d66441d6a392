use std::path::PathBuf;

use clap::{ArgAction, Parser};
use mars_sizing::Topology;
use mars_sizing::config::load_study;
use mars_sizing::export::{self, chart, design};
use mars_sizing::solver::config::from_study;
use mars_sizing::solver::{ComparisonPolicy, CoupledSizingSolver, size_all};
use sizing_cli::{CompareArg, TopologyArg, init_logging, print_report};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Size rotorcraft, fixed-wing and hybrid VTOL UAVs for one mission"
)]
struct Cli {
    /// Study file (YAML list or TOML) or directory of TOML studies
    #[arg(long)]
    config: PathBuf,

    /// Study name when the configuration holds several (defaults to the first)
    #[arg(long)]
    study: Option<String>,

    /// Topologies to size (repeatable; defaults to the study's list)
    #[arg(long, value_enum)]
    topology: Vec<TopologyArg>,

    /// Ranking used to pick the best topology (defaults to the study's policy)
    #[arg(long, value_enum)]
    compare: Option<CompareArg>,

    /// Write per-topology results as CSV (`-` for stdout)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a JSON summary (`-` for stdout)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write matching-chart samples of the best (or first winged) topology as CSV
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Number of wing-loading intervals in the chart export
    #[arg(long, default_value_t = 200)]
    chart_intervals: usize,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let study = load_study(&cli.config, cli.study.as_deref())?;
    let plan = from_study(&study)?;

    let topologies: Vec<Topology> = if cli.topology.is_empty() {
        plan.topologies.clone()
    } else {
        cli.topology.iter().copied().map(Topology::from).collect()
    };
    let comparison = cli
        .compare
        .map(ComparisonPolicy::from)
        .unwrap_or(plan.comparison);

    let report = size_all(&plan.input, &topologies, comparison);
    print_report(&plan.name, &report);

    if let Some(path) = &cli.csv {
        let writer = export::writer_for_path(path)?;
        design::write_csv(writer, &design::records(&report))?;
    }

    if let Some(path) = &cli.json {
        let writer = export::writer_for_path(path)?;
        design::write_json(writer, &plan.name, &report)?;
    }

    if let Some(path) = &cli.chart {
        let topology = report
            .best
            .or_else(|| topologies.iter().copied().find(|t| t.is_winged()))
            .ok_or_else(|| anyhow::anyhow!("no winged topology to chart"))?;
        let solver = CoupledSizingSolver::new(plan.input.with_topology(topology))?;
        let samples = solver
            .chart()
            .sample(solver.chart_domain(), cli.chart_intervals);
        let writer = export::writer_for_path(path)?;
        chart::write_samples(writer, &samples)?;
    }

    Ok(())
}
