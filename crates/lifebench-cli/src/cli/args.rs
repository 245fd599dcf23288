use clap::{Parser, Subcommand};
use lifebench_core::{FailurePolicy, Launcher, SweepOverrides};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lifebench",
    version,
    about = "Benchmark sweeps over external Game of Life binaries"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sweep ./gameoflife: 400 timesteps, one trial per point, no CSV
    Sequential(SweepArgs),
    /// Sweep ./gameoflifempi under mpirun: 654 timesteps, five trials per point, CSV in csv/
    Mpi(SweepArgs),
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SweepArgs {
    /// YAML file overriding preset fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Simulation binary to run
    #[arg(long)]
    pub binary: Option<PathBuf>,

    /// Process launcher program; the binary is started as `<launcher> -n <px*py> ...`
    #[arg(long)]
    pub launcher: Option<String>,

    /// Generations the binary is asked to compute
    #[arg(long)]
    pub timestep: Option<u32>,

    /// Repetitions per grid point
    #[arg(long)]
    pub trials: Option<u32>,

    /// Directory for the timestamped CSV result log
    #[arg(long, conflicts_with = "no_csv")]
    pub csv_dir: Option<PathBuf>,

    /// Do not write a CSV result log
    #[arg(long)]
    pub no_csv: bool,

    /// Timing wrapper command, split on whitespace (default: `time`)
    #[arg(long, conflicts_with = "no_timer")]
    pub timer: Option<String>,

    /// Run without a timing wrapper; the binary must print the timing report itself
    #[arg(long)]
    pub no_timer: bool,

    /// Log and skip failing runs instead of aborting the sweep
    #[arg(long)]
    pub keep_going: bool,

    /// Kill a run that takes longer than this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Path to write a JSON summary of the sweep
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print the effective configuration as YAML, then exit
    #[arg(long)]
    pub print_config: bool,

    /// Print every invocation without running anything
    #[arg(long)]
    pub dry_run: bool,
}

impl SweepArgs {
    /// Flag values as overrides. Applied after the `--config` file.
    pub fn overrides(&self) -> SweepOverrides {
        let timer = if self.no_timer {
            Some(Vec::new())
        } else {
            self.timer
                .as_ref()
                .map(|t| t.split_whitespace().map(String::from).collect())
        };
        SweepOverrides {
            binary: self.binary.clone(),
            launcher: self
                .launcher
                .clone()
                .map(|program| Launcher::Mpirun { program }),
            timer,
            timestep: self.timestep,
            trials: self.trials,
            csv_dir: self.csv_dir.clone(),
            no_csv: self.no_csv,
            failure_policy: self.keep_going.then_some(FailurePolicy::Skip),
            timeout_secs: self.timeout_secs,
            ..SweepOverrides::default()
        }
    }
}
