//! Sweep configuration.
//!
//! The two harness presets are plain constructors. A YAML file may override any
//! subset of fields; merge precedence is preset → file → caller.

use crate::error::{Result, SweepError};
use crate::grid::{GridPoint, Shape, DEFAULT_BOARD_SIZES, DEFAULT_SHAPES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SEQUENTIAL_BINARY: &str = "./gameoflife";
pub const MPI_BINARY: &str = "./gameoflifempi";
pub const SEQUENTIAL_TIMESTEP: u32 = 400;
pub const MPI_TIMESTEP: u32 = 654;
pub const MPI_TRIALS: u32 = 5;
pub const DEFAULT_CSV_DIR: &str = "csv";

/// How the simulation binary is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Launcher {
    /// Run the binary itself.
    Direct,
    /// `<program> -n <px*py> <binary> ...`
    Mpirun { program: String },
}

impl Launcher {
    pub fn mpirun() -> Self {
        Launcher::Mpirun {
            program: "mpirun".to_string(),
        }
    }
}

/// Nesting of the shape and board-size loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepOrder {
    ShapesOuter,
    BoardsOuter,
}

/// What happens when one run fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepConfig {
    pub binary: PathBuf,
    pub launcher: Launcher,
    /// Wrapper argv prepended to every invocation. Empty means no wrapper.
    pub timer: Vec<String>,
    pub shapes: Vec<Shape>,
    pub board_sizes: Vec<u32>,
    pub timestep: u32,
    pub trials: u32,
    pub order: SweepOrder,
    /// Directory for the CSV result log. `None` disables the log.
    pub csv_dir: Option<PathBuf>,
    pub failure_policy: FailurePolicy,
    pub timeout_secs: Option<u64>,
}

/// Partial config read from YAML. Only `Some` values override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepOverrides {
    pub binary: Option<PathBuf>,
    pub launcher: Option<Launcher>,
    pub timer: Option<Vec<String>>,
    pub shapes: Option<Vec<Shape>>,
    pub board_sizes: Option<Vec<u32>>,
    pub timestep: Option<u32>,
    pub trials: Option<u32>,
    pub order: Option<SweepOrder>,
    pub csv_dir: Option<PathBuf>,
    /// Set to disable the CSV log even when the preset writes one.
    #[serde(default)]
    pub no_csv: bool,
    pub failure_policy: Option<FailurePolicy>,
    pub timeout_secs: Option<u64>,
}

impl SweepOverrides {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SweepError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }
}

impl SweepConfig {
    /// The sequential harness: one trial per point, shapes outer, no CSV.
    pub fn sequential() -> Self {
        Self {
            binary: PathBuf::from(SEQUENTIAL_BINARY),
            launcher: Launcher::Direct,
            timer: vec!["time".to_string()],
            shapes: DEFAULT_SHAPES.to_vec(),
            board_sizes: DEFAULT_BOARD_SIZES.to_vec(),
            timestep: SEQUENTIAL_TIMESTEP,
            trials: 1,
            order: SweepOrder::ShapesOuter,
            csv_dir: None,
            failure_policy: FailurePolicy::Abort,
            timeout_secs: None,
        }
    }

    /// The MPI harness: five trials per point under `mpirun`, boards outer, CSV in `csv/`.
    pub fn mpi() -> Self {
        Self {
            binary: PathBuf::from(MPI_BINARY),
            launcher: Launcher::mpirun(),
            timestep: MPI_TIMESTEP,
            trials: MPI_TRIALS,
            order: SweepOrder::BoardsOuter,
            csv_dir: Some(PathBuf::from(DEFAULT_CSV_DIR)),
            ..Self::sequential()
        }
    }

    pub fn apply(self, o: SweepOverrides) -> Self {
        let csv_dir = if o.no_csv {
            None
        } else {
            o.csv_dir.or(self.csv_dir)
        };
        Self {
            binary: o.binary.unwrap_or(self.binary),
            launcher: o.launcher.unwrap_or(self.launcher),
            timer: o.timer.unwrap_or(self.timer),
            shapes: o.shapes.unwrap_or(self.shapes),
            board_sizes: o.board_sizes.unwrap_or(self.board_sizes),
            timestep: o.timestep.unwrap_or(self.timestep),
            trials: o.trials.unwrap_or(self.trials),
            order: o.order.unwrap_or(self.order),
            csv_dir,
            failure_policy: o.failure_policy.unwrap_or(self.failure_policy),
            timeout_secs: o.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Shape components are non-zero by construction; divisibility is not checked.
    pub fn validate(&self) -> Result<()> {
        if self.shapes.is_empty() {
            return Err(SweepError::Config("shapes must not be empty".into()));
        }
        if self.board_sizes.is_empty() {
            return Err(SweepError::Config("board_sizes must not be empty".into()));
        }
        if self.board_sizes.contains(&0) {
            return Err(SweepError::Config("board sizes must be > 0".into()));
        }
        if self.trials == 0 {
            return Err(SweepError::Config("trials must be >= 1".into()));
        }
        if self.timestep == 0 {
            return Err(SweepError::Config("timestep must be >= 1".into()));
        }
        if self.timeout_secs == Some(0) {
            return Err(SweepError::Config("timeout must be > 0 when set".into()));
        }
        if self.binary.as_os_str().is_empty() {
            return Err(SweepError::Config("binary path must not be empty".into()));
        }
        if let Launcher::Mpirun { program } = &self.launcher {
            if program.trim().is_empty() {
                return Err(SweepError::Config("launcher program must not be empty".into()));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Grid points in iteration order. Trials repeat each point in place.
    pub fn grid_points(&self) -> Vec<GridPoint> {
        let mut points = Vec::with_capacity(self.shapes.len() * self.board_sizes.len());
        match self.order {
            SweepOrder::ShapesOuter => {
                for &shape in &self.shapes {
                    for &board in &self.board_sizes {
                        points.push(GridPoint::new(shape, board));
                    }
                }
            }
            SweepOrder::BoardsOuter => {
                for &board in &self.board_sizes {
                    for &shape in &self.shapes {
                        points.push(GridPoint::new(shape, board));
                    }
                }
            }
        }
        points
    }

    pub fn expected_runs(&self) -> usize {
        self.board_sizes.len() * self.shapes.len() * self.trials as usize
    }
}
