use crate::cli::args::SweepArgs;
use crate::exit_codes::{CONFIG_ERROR, SUCCESS, SWEEP_FAILED};
use anyhow::{Context, Result};
use lifebench_core::{
    plan, run_sweep, GridPoint, Invocation, ProcessExecutor, RunFailure, RunRecord, SweepConfig,
    SweepError, SweepObserver, SweepOverrides,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Sequential,
    Mpi,
}

impl Preset {
    fn config(self) -> SweepConfig {
        match self {
            Preset::Sequential => SweepConfig::sequential(),
            Preset::Mpi => SweepConfig::mpi(),
        }
    }
}

/// Merge precedence: preset → --config file → flags.
fn effective_config(preset: Preset, args: &SweepArgs) -> Result<SweepConfig, SweepError> {
    let mut cfg = preset.config();
    if let Some(path) = &args.config {
        cfg = cfg.apply(SweepOverrides::from_yaml_file(path)?);
    }
    let cfg = cfg.apply(args.overrides());
    cfg.validate()?;
    Ok(cfg)
}

/// `ITERATION <i> Elapsed time: ...`, the line existing result scrapers expect.
/// Only the MPI harness ever printed the trailing `<total> Total`.
fn iteration_line(r: &RunRecord, show_total: bool) -> String {
    let mut line = format!(
        "ITERATION {} Elapsed time: {} minutes {} seconds {} miliseconds",
        r.trial, r.timing.minutes, r.timing.seconds, r.timing.millis
    );
    if show_total {
        line.push_str(&format!(" {} Total", r.timing.total_millis()));
    }
    line
}

/// Prints one line per finished run.
struct Console {
    done: usize,
    total: usize,
    show_total: bool,
}

impl SweepObserver for Console {
    fn on_start(&mut self, point: &GridPoint, trial: u32, _inv: &Invocation) {
        tracing::debug!(%point, trial, "run {}/{}", self.done + 1, self.total);
    }

    fn on_record(&mut self, r: &RunRecord) {
        self.done += 1;
        tracing::debug!(
            point = %r.point,
            trial = r.trial,
            wall_ms = r.wall.as_millis() as u64,
            "run finished"
        );
        println!("{}", iteration_line(r, self.show_total));
    }

    fn on_failure(&mut self, f: &RunFailure) {
        self.done += 1;
        println!("ITERATION {} FAILED [{}]: {}", f.trial, f.point, f.error);
    }
}

pub fn run(preset: Preset, args: SweepArgs) -> Result<i32> {
    let cfg = match effective_config(preset, &args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return Ok(CONFIG_ERROR);
        }
    };

    if args.print_config {
        print!("{}", serde_yaml::to_string(&cfg)?);
        return Ok(SUCCESS);
    }

    if args.dry_run {
        for run in plan(&cfg)? {
            println!("{}", run.invocation);
        }
        return Ok(SUCCESS);
    }

    println!("Game of Life benchmark sweep ({:?})", preset);
    println!("Binary:   {}", cfg.binary.display());
    println!("Timestep: {}", cfg.timestep);
    println!("Runs:     {}", cfg.expected_runs());
    match &cfg.csv_dir {
        Some(dir) => println!("CSV dir:  {}", dir.display()),
        None => println!("CSV dir:  (disabled)"),
    }
    println!();

    let mut executor = ProcessExecutor::new(cfg.timeout());
    let mut console = Console {
        done: 0,
        total: cfg.expected_runs(),
        show_total: preset == Preset::Mpi,
    };
    let summary = run_sweep(&cfg, &mut executor, &mut console).context("sweep aborted")?;

    println!();
    println!(
        "SUMMARY: completed={} skipped={} expected={} wall={}ms",
        summary.completed, summary.skipped, summary.expected_runs, summary.total_wall_ms
    );
    if let Some(path) = &summary.csv_path {
        println!("Results written to {}", path.display());
    }

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("Report saved to {}", path.display());
    }

    if summary.skipped > 0 {
        return Ok(SWEEP_FAILED);
    }
    Ok(SUCCESS)
}
