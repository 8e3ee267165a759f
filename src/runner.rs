use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Args, Command, FromArgMatches as _};
use log::{info, LevelFilter};

use crate::error::EpiError;
use crate::log::set_log_level;
use crate::parameters::{load_parameters_from_json, Parameters};
use crate::report::{Report, StateCountsRow};
use crate::simulation::{ContactEvent, RunOutcome, Simulation};
use crate::snapshot::StateCounts;

/// Name of the per-step report written to `--output-dir`.
pub const STATE_COUNTS_REPORT: &str = "state_counts.csv";

/// Command line arguments of the `epigraph` binary.
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path to a JSON parameter file. Defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Optional directory for the state counts report
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Write one JSON snapshot per step to this file
    #[arg(long)]
    pub snapshots: Option<PathBuf>,

    /// Cancel the run after this many steps
    #[arg(long)]
    pub max_steps: Option<u64>,

    /// Pause after every contact attempt, e.g. `200ms`
    #[arg(long, value_parser = humantime::parse_duration)]
    pub contact_delay: Option<Duration>,

    /// Pause after every step that committed a progression batch, e.g. `1s`
    #[arg(long, value_parser = humantime::parse_duration)]
    pub progression_delay: Option<Duration>,

    /// Enable logging at this level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<LevelFilter>,
}

/// How a run driven by the runner ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub steps: u64,
    pub counts: StateCounts,
}

fn create_cli() -> Command {
    let cli = Command::new("epigraph")
        .about("Simulates an epidemic spreading over a generated contact network");
    BaseArgs::augment_args(cli)
}

/// Parses the process arguments and runs a simulation to completion.
///
/// # Errors
/// Returns an error if argument parsing, parameter loading or report output fails.
pub fn run_with_args() -> Result<RunSummary, Box<dyn Error>> {
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    run_with_args_internal(&args)
}

fn write_snapshot<W: Write>(writer: &mut W, simulation: &Simulation) -> Result<(), EpiError> {
    serde_json::to_writer(&mut *writer, &simulation.snapshot())?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn run_with_args_internal(args: &BaseArgs) -> Result<RunSummary, Box<dyn Error>> {
    if let Some(level) = args.log_level {
        set_log_level(level);
    }

    let parameters = match &args.config {
        Some(path) => {
            info!("loading parameters from {}", path.display());
            load_parameters_from_json(path)?
        }
        None => Parameters::default(),
    };
    let mut simulation = Simulation::new(&parameters, args.random_seed)?;

    let mut report = match &args.output_dir {
        Some(dir) => Some(Report::<StateCountsRow>::create(dir.join(STATE_COUNTS_REPORT))?),
        None => None,
    };
    let mut snapshots = match &args.snapshots {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    // The observer cannot return an error; the first one stops the run and is reported below.
    let mut failure: Option<EpiError> = None;
    let outcome = simulation.run(|simulation, step| {
        let written = report
            .as_mut()
            .map_or(Ok(()), |report| {
                report.send(&StateCountsRow::new(step.step, &simulation.state_counts()))
            })
            .and_then(|()| {
                snapshots
                    .as_mut()
                    .map_or(Ok(()), |writer| write_snapshot(writer, simulation))
            });
        if let Err(error) = written {
            failure = Some(error);
            return ControlFlow::Break(());
        }

        if let Some(delay) = args.contact_delay {
            if matches!(step.contact, Some(ContactEvent::Attempted { .. })) {
                thread::sleep(delay);
            }
        }
        if let Some(delay) = args.progression_delay {
            if step.progression_settled {
                thread::sleep(delay);
            }
        }

        if args
            .max_steps
            .is_some_and(|max_steps| simulation.current_step() >= max_steps)
        {
            simulation.shutdown();
        }
        ControlFlow::Continue(())
    });
    if let Some(error) = failure {
        return Err(error.into());
    }
    if let Some(writer) = snapshots.as_mut() {
        writer.flush()?;
    }

    let steps = simulation.current_step();
    if steps > u64::from(parameters.duration) {
        info!(
            "run lasted {steps} steps, past the configured duration of {}",
            parameters.duration
        );
    }
    let counts = simulation.state_counts();
    println!(
        "{outcome:?} after {steps} steps: susceptible={} infected={} critical={} recovered={} dead={}",
        counts.susceptible, counts.infected, counts.critical, counts.recovered, counts.dead
    );
    Ok(RunSummary {
        outcome,
        steps,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args() -> BaseArgs {
        BaseArgs {
            random_seed: 42,
            config: Some(PathBuf::from("tests/data/config.json")),
            ..BaseArgs::default()
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        create_cli().debug_assert();
    }

    #[test]
    fn parses_pacing_durations() {
        let matches = create_cli()
            .try_get_matches_from([
                "epigraph",
                "--contact-delay",
                "250ms",
                "--progression-delay",
                "1s",
                "--log-level",
                "debug",
                "-r",
                "7",
            ])
            .unwrap();
        let args = BaseArgs::from_arg_matches(&matches).unwrap();
        assert_eq!(args.contact_delay, Some(Duration::from_millis(250)));
        assert_eq!(args.progression_delay, Some(Duration::from_secs(1)));
        assert_eq!(args.log_level, Some(LevelFilter::Debug));
        assert_eq!(args.random_seed, 7);
    }

    #[test]
    fn runs_config_to_completion() {
        let summary = run_with_args_internal(&args()).unwrap();
        assert_eq!(summary.outcome, RunOutcome::Terminated);
        assert_eq!(summary.counts.total(), 60);
        assert!(!summary.counts.has_active());
    }

    #[test]
    fn same_seed_same_summary() {
        let a = run_with_args_internal(&args()).unwrap();
        let b = run_with_args_internal(&args()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn runs_with_defaults() {
        let summary = run_with_args_internal(&BaseArgs::default()).unwrap();
        assert_eq!(summary.counts.total(), 100);
    }

    #[test]
    fn max_steps_cancels_run() {
        let test_args = BaseArgs {
            max_steps: Some(3),
            ..args()
        };
        let summary = run_with_args_internal(&test_args).unwrap();
        assert_eq!(summary.outcome, RunOutcome::Shutdown);
        assert_eq!(summary.steps, 3);
    }

    #[test]
    fn writes_report_and_snapshots() {
        let temp_dir = tempdir().unwrap();
        let snapshot_path = temp_dir.path().join("snapshots.jsonl");
        let test_args = BaseArgs {
            output_dir: Some(temp_dir.path().join("out")),
            snapshots: Some(snapshot_path.clone()),
            ..args()
        };
        let summary = run_with_args_internal(&test_args).unwrap();

        let mut reader =
            csv::Reader::from_path(temp_dir.path().join("out").join(STATE_COUNTS_REPORT)).unwrap();
        let rows: Vec<StateCountsRow> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(rows.len() as u64, summary.steps);
        assert_eq!(rows.first().map(|row| row.step), Some(1));
        let last = rows.last().unwrap();
        assert_eq!(last.step, summary.steps);
        assert_eq!(last.recovered, summary.counts.recovered);

        let content = fs::read_to_string(snapshot_path).unwrap();
        let snapshots: Vec<serde_json::Value> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(snapshots.len() as u64, summary.steps);
        assert_eq!(snapshots.last().unwrap()["terminated"], true);
        assert_eq!(snapshots[0]["nodes"].as_array().unwrap().len(), 60);
    }

    #[test]
    fn missing_config_is_an_error() {
        let test_args = BaseArgs {
            config: Some(PathBuf::from("tests/data/missing.json")),
            ..BaseArgs::default()
        };
        assert!(run_with_args_internal(&test_args).is_err());
    }
}
