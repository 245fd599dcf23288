//! Sweep runner for external Game of Life benchmark binaries.
//!
//! Builds a grid of `(px, py, nx, ny)` points, runs the simulation binary once
//! per point and trial, parses the elapsed time a `time` wrapper prints on
//! stderr, and optionally appends each result to a CSV log.

pub mod config;
pub mod error;
pub mod exec;
pub mod grid;
pub mod invocation;
pub mod record;
pub mod sweep;
pub mod timing;

pub use config::{FailurePolicy, Launcher, SweepConfig, SweepOrder, SweepOverrides};
pub use error::{Result, SweepError};
pub use exec::{Executor, ProcessExecutor, RunOutput};
pub use grid::{GridPoint, Shape};
pub use invocation::Invocation;
pub use record::{ResultLog, RunRecord};
pub use sweep::{plan, run_sweep, PlannedRun, RunFailure, SweepObserver, SweepSummary};
pub use timing::{parse_stderr, Timing, TimingError};
