use ndarray::Array1;
use std::fs;
use std::path::Path;

use crate::error::OutputError;
use crate::grid::Grid;
use crate::io::write_snapshot::{DATA_FILE, HEADER_FILE};

/// Contents of one snapshot directory, used to restart a run.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub time: f64,
    pub step: usize,
    /// The rows include the guard cells.
    pub write_guard: bool,
    pub coordinates: Array1<f64>,
    pub field: Array1<f64>,
}
impl Snapshot {
    /// Copies the snapshot into `grid`. Without guard rows only the interior
    /// is replaced and guard cells are left for the next boundary fill.
    pub fn restore_into(&self, grid: &mut Grid) -> Result<(), OutputError> {
        let expected = if self.write_guard {
            grid.len()
        } else {
            grid.n_interior
        };
        if self.field.len() != expected {
            return Err(OutputError::LengthMismatch {
                expected,
                found: self.field.len(),
            });
        }
        if self.write_guard {
            grid.field.assign(&self.field);
        } else {
            grid.interior_field_mut().assign(&self.field);
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "0" | "false" => Some(false),
        "1" | "true" => Some(true),
        _ => None,
    }
}

pub fn read_snapshot(dir: &Path) -> Result<Snapshot, OutputError> {
    let header_path = dir.join(HEADER_FILE);
    let header = fs::read_to_string(&header_path).map_err(|e| OutputError::io(&header_path, e))?;
    let mut time = None;
    let mut step = None;
    let mut write_guard = false;
    for line in header.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        let malformed = |reason: String| OutputError::Header {
            path: header_path.clone(),
            reason,
        };
        match key.trim() {
            "time" => {
                time = Some(
                    value
                        .parse::<f64>()
                        .map_err(|e| malformed(format!("time `{}`: {}", value, e)))?,
                )
            }
            "step" => {
                step = Some(
                    value
                        .parse::<usize>()
                        .map_err(|e| malformed(format!("step `{}`: {}", value, e)))?,
                )
            }
            "write_guard" => {
                write_guard = parse_flag(value)
                    .ok_or_else(|| malformed(format!("write_guard `{}`", value)))?
            }
            _ => {}
        }
    }
    let (Some(time), Some(step)) = (time, step) else {
        return Err(OutputError::Header {
            path: header_path,
            reason: "both `time` and `step` are required".to_string(),
        });
    };

    // columns may be separated by any run of whitespace
    let data_path = dir.join(DATA_FILE);
    let data = fs::read_to_string(&data_path).map_err(|e| OutputError::io(&data_path, e))?;
    let mut coordinates = Vec::new();
    let mut field = Vec::new();
    for (index, line) in data.lines().enumerate() {
        if line.contains('#') || line.trim().is_empty() {
            continue;
        }
        let malformed = |reason: String| OutputError::Data {
            path: data_path.clone(),
            line: index + 1,
            reason,
        };
        let mut columns = line.split_whitespace().map(|token| {
            token
                .parse::<f64>()
                .map_err(|e| malformed(format!("`{}`: {}", token, e)))
        });
        let (Some(x), Some(solution)) = (columns.next(), columns.next()) else {
            return Err(malformed("expected a coordinate and a value".to_string()));
        };
        coordinates.push(x?);
        field.push(solution?);
    }
    Ok(Snapshot {
        time,
        step,
        write_guard,
        coordinates: Array1::from(coordinates),
        field: Array1::from(field),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::write_snapshot::write_snapshot;
    use ndarray::array;

    #[test]
    fn test_read_back_written_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut grid = Grid::new(4, -1.0, 1.0).unwrap();
        grid.interior_field_mut()
            .assign(&array![0.1, -2.25, 3.0e-7, 1.0 / 3.0]);
        let path = write_snapshot(dir.path(), &grid, 42, 0.734375, 2, false).unwrap();

        let snapshot = read_snapshot(&path).unwrap();
        assert_eq!(snapshot.step, 42);
        assert!(!snapshot.write_guard);
        assert!((snapshot.time - 0.734375).abs() < 1e-13);
        assert_eq!(snapshot.field, grid.interior_field());
        assert_eq!(snapshot.coordinates, grid.interior_coordinates());

        let mut restored = Grid::new(4, -1.0, 1.0).unwrap();
        snapshot.restore_into(&mut restored).unwrap();
        assert_eq!(restored.interior_field(), grid.interior_field());
    }

    #[test]
    fn test_read_back_snapshot_with_guard_cells() {
        let dir = tempfile::tempdir().unwrap();
        let mut grid = Grid::new(3, 0.0, 3.0).unwrap();
        grid.interior_field_mut().assign(&array![1.0, 2.0, 3.0]);
        grid.fill_boundary_conditions();
        let path = write_snapshot(dir.path(), &grid, 1, 0.25, 1, true).unwrap();

        let snapshot = read_snapshot(&path).unwrap();
        assert!(snapshot.write_guard);
        assert_eq!(snapshot.field, array![3.0, 1.0, 2.0, 3.0, 1.0]);
        let mut restored = Grid::new(3, 0.0, 3.0).unwrap();
        snapshot.restore_into(&mut restored).unwrap();
        assert_eq!(restored.field, grid.field);
    }

    #[test]
    fn test_restore_rejects_wrong_length() {
        let snapshot = Snapshot {
            time: 0.0,
            step: 0,
            write_guard: false,
            coordinates: array![0.5, 1.5],
            field: array![1.0, 2.0],
        };
        let mut grid = Grid::new(3, 0.0, 3.0).unwrap();
        assert!(matches!(
            snapshot.restore_into(&mut grid),
            Err(OutputError::LengthMismatch {
                expected: 3,
                found: 2
            })
        ));
        // with guard rows the whole buffer is expected
        let snapshot = Snapshot {
            write_guard: true,
            ..snapshot
        };
        let mut grid = Grid::new(2, 0.0, 2.0).unwrap();
        assert!(matches!(
            snapshot.restore_into(&mut grid),
            Err(OutputError::LengthMismatch {
                expected: 4,
                found: 2
            })
        ));
    }

    #[test]
    fn test_comments_and_incomplete_headers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(HEADER_FILE), "time = 1.0e+00\n").unwrap();
        fs::write(dir.path().join(DATA_FILE), "# position data\n0.5 2.0\n").unwrap();
        assert!(matches!(
            read_snapshot(dir.path()),
            Err(OutputError::Header { .. })
        ));

        fs::write(dir.path().join(HEADER_FILE), "time = 1.0e+00\nstep = 5\n").unwrap();
        let snapshot = read_snapshot(dir.path()).unwrap();
        assert_eq!(snapshot.step, 5);
        assert_eq!(snapshot.field, array![2.0]);
    }

    #[test]
    fn test_columns_separated_by_several_spaces() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(HEADER_FILE),
            "time        = 0.5\nstep        = 2\nwrite_guard = 0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(DATA_FILE),
            "# position\n# data\n0.5   2\n1.5   3\n  2.5\t\t4  \n",
        )
        .unwrap();
        let snapshot = read_snapshot(dir.path()).unwrap();
        assert_eq!(snapshot.step, 2);
        assert_eq!(snapshot.time, 0.5);
        assert!(!snapshot.write_guard);
        assert_eq!(snapshot.coordinates, array![0.5, 1.5, 2.5]);
        assert_eq!(snapshot.field, array![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_malformed_rows_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(HEADER_FILE), "time = 0\nstep = 0\n").unwrap();
        fs::write(dir.path().join(DATA_FILE), "0.5 1.0\n1.5\n").unwrap();
        assert!(matches!(
            read_snapshot(dir.path()),
            Err(OutputError::Data { line: 2, .. })
        ));
        fs::write(dir.path().join(DATA_FILE), "0.5 one\n").unwrap();
        assert!(matches!(
            read_snapshot(dir.path()),
            Err(OutputError::Data { line: 1, .. })
        ));
    }
}
