use std::path::PathBuf;

use clap::{ArgAction, Parser};
use mars_sizing::config::load_study;
use mars_sizing::export::{self, sweep as sweep_export};
use mars_sizing::solver::config::from_study;
use mars_sizing::solver::{SweepParameter, linspace, sweep};
use sizing_cli::{ParameterArg, TopologyArg, init_logging};

#[derive(Parser)]
#[command(author, version, about = "Sweep one mission or battery parameter for a topology")]
struct Cli {
    /// Study file (YAML list or TOML) or directory of TOML studies
    #[arg(long)]
    config: PathBuf,

    /// Study name when the configuration holds several (defaults to the first)
    #[arg(long)]
    study: Option<String>,

    /// Topology to size at every sample
    #[arg(long, value_enum)]
    topology: TopologyArg,

    /// Parameter to vary
    #[arg(long, value_enum)]
    parameter: ParameterArg,

    /// First value of the sweep
    #[arg(long)]
    from: f64,

    /// Last value of the sweep
    #[arg(long)]
    to: f64,

    /// Number of samples, both ends included
    #[arg(long, default_value_t = 11)]
    steps: usize,

    /// CSV output path (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.steps == 0 {
        anyhow::bail!("--steps must be at least 1");
    }

    let study = load_study(&cli.config, cli.study.as_deref())?;
    let plan = from_study(&study)?;
    let base = plan.input.with_topology(cli.topology.into());
    let parameter = SweepParameter::from(cli.parameter);
    let values = linspace(cli.from, cli.to, cli.steps);

    let samples = sweep(&base, parameter, &values);
    let writer = export::writer_for_path(&cli.output)?;
    sweep_export::write_csv(writer, parameter, &samples)?;

    if cli.output.as_os_str() != "-" {
        let converged = samples.iter().filter(|s| s.result.is_ok()).count();
        println!(
            "{} sweep of {} ({} samples, {} converged) written to {}",
            parameter,
            base.topology,
            samples.len(),
            converged,
            cli.output.display()
        );
    }

    Ok(())
}
