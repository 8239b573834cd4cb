//! Beam Planning CLI
//!
//! Usage:
//!   plan-beams plan <scenario.txt> [--json] [--output FILE]
//!   plan-beams evaluate <scenario.txt> [solution.txt]
//!   plan-beams batch <dir>
//!
//! Assignment lines go to stdout; logs go to stderr, so
//! `plan-beams plan s.txt | plan-beams evaluate s.txt` works.

use anyhow::Result;
use beam_planning::config::ConfigOverrides;
use beam_planning::evaluate::{evaluate, read_solution};
use beam_planning::render::{PlanReport, TextSink};
use beam_planning::{batch, loader, plan, PlannerConfig};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "plan-beams",
    about = "Assign Starlink satellite beams and colors to ground users"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    config: ConfigArgs,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan beams for a scenario and print one line per assignment
    Plan {
        /// Path to scenario file
        scenario: PathBuf,

        /// Print a JSON report instead of assignment lines
        #[arg(long)]
        json: bool,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a solution against a scenario
    Evaluate {
        /// Path to scenario file
        scenario: PathBuf,

        /// Path to solution file (stdin if omitted)
        solution: Option<PathBuf>,
    },
    /// Plan and validate every *.txt scenario in a directory
    Batch {
        /// Directory of scenario files
        dir: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
struct ConfigArgs {
    /// JSON planner config (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Beams per satellite
    #[arg(long, global = true)]
    beams_per_satellite: Option<usize>,

    /// Max angle from user vertical, degrees
    #[arg(long, global = true)]
    max_visible_deg: Option<f64>,

    /// Min user-side separation from non-Starlink satellites, degrees
    #[arg(long, global = true)]
    interferer_min_deg: Option<f64>,

    /// Min satellite-side separation between same-color beams, degrees
    #[arg(long, global = true)]
    self_interference_min_deg: Option<f64>,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<PlannerConfig> {
        let overrides = ConfigOverrides {
            beams_per_satellite: self.beams_per_satellite,
            max_user_visible_angle_deg: self.max_visible_deg,
            interferer_separation_min_deg: self.interferer_min_deg,
            self_interference_min_deg: self.self_interference_min_deg,
        };
        Ok(overrides.resolve(self.config.as_deref())?)
    }
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => {
            info!("Writing output to {:?}", path);
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn run_plan(config: &PlannerConfig, scenario: &Path, json: bool, output: Option<&Path>) -> Result<ExitCode> {
    let scenario = loader::load_scenario(scenario)?;
    let mut writer = open_output(output)?;

    if json {
        let mut events = Vec::new();
        let summary = plan(&scenario, config, &mut events)?;
        PlanReport::new(&scenario, config, events, summary).write_json(&mut writer)?;
        writeln!(writer)?;
        writer.flush()?;
    } else {
        let mut sink = TextSink::new(writer);
        plan(&scenario, config, &mut sink)?;
        sink.into_inner()?;
    }

    Ok(ExitCode::SUCCESS)
}

fn run_evaluate(config: &PlannerConfig, scenario: &Path, solution: Option<&Path>) -> Result<ExitCode> {
    let scenario = loader::load_scenario(scenario)?;

    let solution = match solution {
        Some(path) => {
            info!("Reading solution file {:?}", path);
            read_solution(File::open(path)?, &scenario, config)?
        }
        None => {
            info!("Reading solution from stdin");
            read_solution(io::stdin().lock(), &scenario, config)?
        }
    };

    let evaluation = evaluate(&scenario, &solution, config);
    for violation in &evaluation.violations {
        println!("{}", violation);
    }
    println!(
        "{}% of {} total users covered.",
        evaluation.coverage_pct(),
        evaluation.total_users
    );

    Ok(if evaluation.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_batch(config: &PlannerConfig, dir: &Path) -> Result<ExitCode> {
    let outcomes = batch::run_batch(dir, config)?;

    for o in &outcomes {
        match &o.error {
            Some(e) => println!("{} | ERROR {}", o.path.display(), e),
            None => println!(
                "{} | {:>8.3} ms | {:>6.2}% of {} users | {}",
                o.path.display(),
                o.elapsed_ms,
                o.coverage_pct,
                o.users,
                if o.valid { "valid" } else { "INVALID" }
            ),
        }
    }

    Ok(if outcomes.iter().all(|o| o.passed()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging on stderr; stdout carries results only
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.config.resolve()?;

    match &args.command {
        Command::Plan {
            scenario,
            json,
            output,
        } => run_plan(&config, scenario, *json, output.as_deref()),
        Command::Evaluate { scenario, solution } => {
            run_evaluate(&config, scenario, solution.as_deref())
        }
        Command::Batch { dir } => run_batch(&config, dir),
    }
}
