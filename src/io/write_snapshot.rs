use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OutputError;
use crate::grid::Grid;
use crate::io::SnapshotWriter;

pub const HEADER_FILE: &str = "header.txt";
pub const DATA_FILE: &str = "grid.dat";

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
struct PointData {
    pub x: f64,
    pub solution: f64,
}

/// Number of digits used for the step index in directory names.
pub fn step_width(max_iter: usize) -> usize {
    if max_iter == 0 {
        1
    } else {
        max_iter.ilog10() as usize + 1
    }
}

pub fn snapshot_dir_name(step: usize, width: usize) -> String {
    format!("step_{:0width$}", step, width = width)
}

/// `%20.13e`: mantissa with 13 decimals, signed two-digit exponent, right
/// aligned in 20 columns.
pub fn format_time(time: f64) -> String {
    let formatted = format!("{:.13e}", time);
    let formatted = match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exp.abs())
            }
            Err(_) => formatted.clone(),
        },
        None => formatted.clone(),
    };
    format!("{:>20}", formatted)
}

/// Writes `<root>/step_<n>/header.txt` and `<root>/step_<n>/grid.dat`. With
/// `write_guard` the guard cells are written too.
pub fn write_snapshot(
    root: &Path,
    grid: &Grid,
    step: usize,
    time: f64,
    width: usize,
    write_guard: bool,
) -> Result<PathBuf, OutputError> {
    let dirname = root.join(snapshot_dir_name(step, width));
    if dirname.exists() {
        fs::remove_dir_all(&dirname).map_err(|e| OutputError::io(&dirname, e))?;
    }
    fs::create_dir_all(&dirname).map_err(|e| OutputError::io(&dirname, e))?;

    let header_path = dirname.join(HEADER_FILE);
    let header = format!(
        "time = {}\nstep = {}\nwrite_guard = {}\n",
        format_time(time),
        step,
        u8::from(write_guard)
    );
    fs::write(&header_path, header).map_err(|e| OutputError::io(&header_path, e))?;

    let data_path = dirname.join(DATA_FILE);
    let mut writer = WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_path(&data_path)?;
    let (coordinates, field) = if write_guard {
        (grid.coordinates.view(), grid.field.view())
    } else {
        (grid.interior_coordinates(), grid.interior_field())
    };
    for (&x, &solution) in coordinates.iter().zip(field.iter()) {
        writer.serialize(PointData { x, solution })?;
    }
    writer.flush().map_err(|e| OutputError::io(&data_path, e))?;
    Ok(dirname)
}

/// Snapshot directories under one output root.
#[derive(Clone, Debug)]
pub struct SnapshotDirectory {
    pub root: PathBuf,
    pub width: usize,
    pub write_guard: bool,
}
impl SnapshotDirectory {
    pub fn new(root: impl Into<PathBuf>, max_iter: usize) -> Result<Self, OutputError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| OutputError::io(&root, e))?;
        Ok(SnapshotDirectory {
            root,
            width: step_width(max_iter),
            write_guard: false,
        })
    }
    pub fn with_guard_cells(mut self, write_guard: bool) -> Self {
        self.write_guard = write_guard;
        self
    }
}
impl SnapshotWriter for SnapshotDirectory {
    fn write_snapshot(&mut self, grid: &Grid, step: usize, time: f64) -> Result<(), OutputError> {
        let dirname = write_snapshot(&self.root, grid, step, time, self.width, self.write_guard)?;
        tracing::info!("OUTPUT : wrote output {}", dirname.display());
        Ok(())
    }
}
