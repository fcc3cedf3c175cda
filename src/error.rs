use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("required parameter `{key}` is missing")]
    Missing { key: String },
    #[error("parameter `{key}` has the wrong type: {reason}")]
    InvalidType { key: String, reason: String },
    #[error("parameter `{key}` = {value} is out of range: {reason}")]
    OutOfRange {
        key: String,
        value: String,
        reason: String,
    },
    #[error("cannot read configuration file {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse configuration file {path}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigurationError {
    pub fn out_of_range(key: &str, value: impl ToString, reason: &str) -> Self {
        ConfigurationError::OutOfRange {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Raised when the evolution loop is asked to take a step that cannot advance
/// time (zero advection speed, or a non-finite step).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("time step dt = {dt} at iteration {iteration} (t = {time}) cannot advance the solution")]
pub struct DegenerateStepError {
    pub iteration: usize,
    pub time: f64,
    pub dt: f64,
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("io error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("malformed header in {path}: {reason}")]
    Header { path: PathBuf, reason: String },
    #[error("malformed data in {path}, line {line}: {reason}")]
    Data {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("snapshot holds {found} cells but the grid has {expected}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("cannot compute error norms")]
    Norm(#[from] ndarray_stats::errors::MultiInputError),
}

impl OutputError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum AdvectionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    DegenerateStep(#[from] DegenerateStepError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

pub type Result<T> = std::result::Result<T, AdvectionError>;
