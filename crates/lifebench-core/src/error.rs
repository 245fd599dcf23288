use crate::grid::GridPoint;
use crate::timing::TimingError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` did not exit within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("bad timing output for {point} trial {trial}: {source}")]
    Timing {
        point: GridPoint,
        trial: u32,
        #[source]
        source: TimingError,
    },

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse sweep config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid sweep config: {0}")]
    Config(String),
}

impl SweepError {
    /// Configuration errors are rejected before any child is started.
    pub fn is_config(&self) -> bool {
        matches!(self, SweepError::Config(_) | SweepError::Yaml(_))
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
