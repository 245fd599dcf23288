//! The sweep driver: grid points × trials, strictly one child at a time.

use crate::config::{FailurePolicy, SweepConfig};
use crate::error::{Result, SweepError};
use crate::exec::Executor;
use crate::grid::GridPoint;
use crate::invocation::Invocation;
use crate::record::{timestamp_now, ResultLog, RunRecord};
use crate::timing::parse_stderr;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

/// Hooks for progress reporting. Console output lives with the caller.
pub trait SweepObserver {
    fn on_start(&mut self, _point: &GridPoint, _trial: u32, _inv: &Invocation) {}
    fn on_record(&mut self, record: &RunRecord);
    fn on_failure(&mut self, _failure: &RunFailure) {}
}

impl SweepObserver for () {
    fn on_record(&mut self, _record: &RunRecord) {}
}

impl SweepObserver for Vec<RunRecord> {
    fn on_record(&mut self, record: &RunRecord) {
        self.push(record.clone());
    }
}

/// A run that failed and was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    #[serde(flatten)]
    pub point: GridPoint,
    pub trial: u32,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub started_at: String,
    pub csv_path: Option<PathBuf>,
    pub expected_runs: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failures: Vec<RunFailure>,
    pub total_wall_ms: u64,
}

/// One planned child invocation.
#[derive(Debug, Clone)]
pub struct PlannedRun {
    pub point: GridPoint,
    pub trial: u32,
    pub invocation: Invocation,
}

/// Every invocation the sweep would make, in order, without running anything.
pub fn plan(cfg: &SweepConfig) -> Result<Vec<PlannedRun>> {
    cfg.validate()?;
    let mut runs = Vec::with_capacity(cfg.expected_runs());
    for point in cfg.grid_points() {
        let invocation = Invocation::for_point(cfg, &point);
        for trial in 0..cfg.trials {
            runs.push(PlannedRun {
                point,
                trial,
                invocation: invocation.clone(),
            });
        }
    }
    Ok(runs)
}

/// Run the whole sweep.
///
/// Under [`FailurePolicy::Abort`] the first failing run ends the sweep with its
/// error; rows written before it stay on disk. Under [`FailurePolicy::Skip`]
/// launch, timeout and timing failures are collected and the sweep continues.
/// Errors writing the result log are always fatal.
pub fn run_sweep<E, O>(cfg: &SweepConfig, executor: &mut E, observer: &mut O) -> Result<SweepSummary>
where
    E: Executor + ?Sized,
    O: SweepObserver + ?Sized,
{
    let runs = plan(cfg)?;
    let started_at = timestamp_now();
    let sweep_start = Instant::now();

    let mut log = match &cfg.csv_dir {
        Some(dir) => Some(ResultLog::create(dir, &started_at)?),
        None => None,
    };

    tracing::info!(
        binary = %cfg.binary.display(),
        runs = runs.len(),
        timestep = cfg.timestep,
        trials = cfg.trials,
        policy = ?cfg.failure_policy,
        "starting sweep"
    );

    let mut completed = 0;
    let mut failures = Vec::new();

    for run in &runs {
        observer.on_start(&run.point, run.trial, &run.invocation);
        tracing::debug!(command = %run.invocation, trial = run.trial, "launching");

        match run_one(executor, run) {
            Ok(record) => {
                if let Some(log) = log.as_mut() {
                    log.append(&record)?;
                }
                tracing::debug!(
                    point = %record.point,
                    trial = record.trial,
                    total_millis = record.timing.total_millis(),
                    wall_ms = record.wall.as_millis() as u64,
                    "run recorded"
                );
                observer.on_record(&record);
                completed += 1;
            }
            Err(e) => match cfg.failure_policy {
                FailurePolicy::Abort => {
                    tracing::error!(point = %run.point, trial = run.trial, error = %e, "run failed, aborting sweep");
                    return Err(e);
                }
                FailurePolicy::Skip => {
                    tracing::warn!(point = %run.point, trial = run.trial, error = %e, "run failed, skipping");
                    let failure = RunFailure {
                        point: run.point,
                        trial: run.trial,
                        error: e.to_string(),
                    };
                    observer.on_failure(&failure);
                    failures.push(failure);
                }
            },
        }
    }

    let csv_path = log.map(ResultLog::finish).transpose()?;
    let summary = SweepSummary {
        started_at,
        csv_path,
        expected_runs: runs.len(),
        completed,
        skipped: failures.len(),
        failures,
        total_wall_ms: sweep_start.elapsed().as_millis() as u64,
    };
    tracing::info!(
        completed = summary.completed,
        skipped = summary.skipped,
        total_wall_ms = summary.total_wall_ms,
        "sweep finished"
    );
    Ok(summary)
}

fn run_one<E: Executor + ?Sized>(executor: &mut E, run: &PlannedRun) -> Result<RunRecord> {
    let out = executor.execute(&run.invocation)?;
    let timing = parse_stderr(&out.stderr).map_err(|source| SweepError::Timing {
        point: run.point,
        trial: run.trial,
        source,
    })?;
    Ok(RunRecord {
        point: run.point,
        trial: run.trial,
        timing,
        wall: out.wall,
    })
}
