use csv::{Writer, WriterBuilder};
use ndarray::{Array1, ArrayView1};
use ndarray_stats::DeviationExt;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::error::OutputError;
use crate::grid::Grid;

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct MonitorRecord {
    pub time: f64,
    pub mass: f64,
    pub l1_norm: f64,
    pub l2_norm: f64,
    pub linf_norm: f64,
}

/// Tracks conservation and convergence during a run.
///
/// The exact solution of periodic linear advection is the initial profile
/// translated by `v * (t - t0)`; it is sampled from the stored initial
/// interior data by linear interpolation with periodic wrap.
pub struct Monitor {
    writer: Option<Writer<File>>,
    coordinates: Array1<f64>,
    initial_field: Array1<f64>,
    xmin: f64,
    width: f64,
    start_time: f64,
    advection_speed: f64,
}
impl Monitor {
    pub fn new(grid: &Grid, advection_speed: f64, start_time: f64) -> Self {
        Monitor {
            writer: None,
            coordinates: grid.interior_coordinates().to_owned(),
            initial_field: grid.interior_field().to_owned(),
            xmin: grid.xmin,
            width: grid.width(),
            start_time,
            advection_speed,
        }
    }
    /// Also appends every record to a CSV file at `path`. An existing file
    /// keeps its records (a restarted run continues the history); the header
    /// row is only written into an empty file.
    pub fn with_file(mut self, path: &Path) -> Result<Self, OutputError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| OutputError::io(path, e))?;
        let is_empty = file
            .metadata()
            .map_err(|e| OutputError::io(path, e))?
            .len()
            == 0;
        self.writer = Some(WriterBuilder::new().has_headers(is_empty).from_writer(file));
        Ok(self)
    }
    pub fn exact_solution(&self, x: f64, time: f64) -> f64 {
        let n = self.coordinates.len();
        if n == 1 {
            return self.initial_field[0];
        }
        let shift = self.advection_speed * (time - self.start_time);
        let x_init = self.xmin + (x - shift - self.xmin).rem_euclid(self.width);
        let first = self.coordinates[0];
        let last = self.coordinates[n - 1];
        let (x1, y1, x2, y2) = if x_init < first {
            (last - self.width, self.initial_field[n - 1], first, self.initial_field[0])
        } else if x_init > last {
            (last, self.initial_field[n - 1], first + self.width, self.initial_field[0])
        } else {
            let i = self
                .coordinates
                .iter()
                .position(|&xi| xi >= x_init)
                .unwrap_or(n - 1)
                .max(1);
            (
                self.coordinates[i - 1],
                self.initial_field[i - 1],
                self.coordinates[i],
                self.initial_field[i],
            )
        };
        (y2 - y1) * (x_init - x1) / (x2 - x1) + y1
    }
    pub fn exact_field(&self, time: f64) -> Array1<f64> {
        self.coordinates.mapv(|x| self.exact_solution(x, time))
    }
    pub fn measure(&self, field: ArrayView1<f64>, dx: f64, time: f64) -> Result<MonitorRecord, OutputError> {
        let exact = self.exact_field(time);
        Ok(MonitorRecord {
            time,
            mass: field.sum() * dx,
            l1_norm: field.l1_dist(&exact)?,
            l2_norm: field.l2_dist(&exact)?,
            linf_norm: field.linf_dist(&exact)?,
        })
    }
    pub fn record(&mut self, grid: &Grid, time: f64) -> Result<MonitorRecord, OutputError> {
        let record = self.measure(grid.interior_field(), grid.dx, time)?;
        if let Some(writer) = self.writer.as_mut() {
            writer.serialize(record)?;
        }
        Ok(record)
    }
    pub fn finish(&mut self) -> Result<(), OutputError> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .flush()
                .map_err(|e| OutputError::io("monitor", e))?;
        }
        Ok(())
    }
}
