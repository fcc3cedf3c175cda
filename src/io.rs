pub mod monitor;
pub mod param_parser;
pub mod read_snapshot;
pub mod write_snapshot;

use crate::error::OutputError;
use crate::grid::Grid;

/// Destination for the snapshots emitted by the evolution loop.
pub trait SnapshotWriter {
    fn write_snapshot(&mut self, grid: &Grid, step: usize, time: f64) -> Result<(), OutputError>;
    fn finalize(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}
