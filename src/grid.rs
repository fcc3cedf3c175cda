use ndarray::{Array1, ArrayView1, ArrayViewMut1, s};

use crate::error::ConfigurationError;

/// Uniform, periodic 1D grid with `n_guard` guard cells on each side.
///
/// Cell `i` of `coordinates` / `field` is interior when
/// `n_guard <= i < n_guard + n_interior`. Interface `i` (in the flux arrays)
/// sits between cell `i` and cell `i + 1`.
#[derive(Clone, Debug)]
pub struct Grid {
    pub n_interior: usize,
    pub n_guard: usize,
    pub xmin: f64,
    pub xmax: f64,
    pub dx: f64,
    pub coordinates: Array1<f64>,
    pub field: Array1<f64>,
}
impl Grid {
    pub fn new(n_interior: usize, xmin: f64, xmax: f64) -> Result<Grid, ConfigurationError> {
        Grid::with_guard_cells(n_interior, 1, xmin, xmax)
    }
    pub fn with_guard_cells(
        n_interior: usize,
        n_guard: usize,
        xmin: f64,
        xmax: f64,
    ) -> Result<Grid, ConfigurationError> {
        if n_interior == 0 {
            return Err(ConfigurationError::out_of_range(
                "Grid.nx",
                n_interior,
                "at least one interior cell is required",
            ));
        }
        if n_guard == 0 || n_guard > n_interior {
            return Err(ConfigurationError::out_of_range(
                "Grid.n_guard",
                n_guard,
                "guard width must be in [1, nx]",
            ));
        }
        if !xmin.is_finite() {
            return Err(ConfigurationError::out_of_range(
                "Grid.xmin",
                xmin,
                "must be finite",
            ));
        }
        if !xmax.is_finite() || xmax <= xmin {
            return Err(ConfigurationError::out_of_range(
                "Grid.xmax",
                xmax,
                &format!("must be finite and greater than xmin = {}", xmin),
            ));
        }
        let dx = (xmax - xmin) / n_interior as f64;
        let ncell = n_interior + 2 * n_guard;
        let coordinates =
            Array1::from_shape_fn(ncell, |i| xmin + dx * (i as f64 + 0.5 - n_guard as f64));
        let field = Array1::zeros(ncell);
        Ok(Grid {
            n_interior,
            n_guard,
            xmin,
            xmax,
            dx,
            coordinates,
            field,
        })
    }
    /// Total number of cells, guard cells included.
    pub fn len(&self) -> usize {
        self.field.len()
    }
    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }
    /// Periodic wrap: the leading guard cells take the last `n_guard` interior
    /// values, the trailing guard cells take the first `n_guard`.
    pub fn fill_boundary_conditions(&mut self) {
        let ng = self.n_guard;
        let nx = self.n_interior;
        debug_assert_eq!(self.field.len(), nx + 2 * ng);
        for i in 0..ng {
            self.field[i] = self.field[nx + i];
            self.field[ng + nx + i] = self.field[ng + i];
        }
    }
    pub fn interior_coordinates(&self) -> ArrayView1<f64> {
        self.coordinates
            .slice(s![self.n_guard..self.n_guard + self.n_interior])
    }
    pub fn interior_field(&self) -> ArrayView1<f64> {
        self.field.slice(s![self.n_guard..self.n_guard + self.n_interior])
    }
    pub fn interior_field_mut(&mut self) -> ArrayViewMut1<f64> {
        self.field
            .slice_mut(s![self.n_guard..self.n_guard + self.n_interior])
    }
    /// Replaces the whole field buffer, guard cells included.
    pub fn set_field(&mut self, values: ArrayView1<f64>) -> Result<(), ConfigurationError> {
        if values.len() != self.field.len() {
            return Err(ConfigurationError::out_of_range(
                "field",
                values.len(),
                &format!("initial field must have {} values", self.field.len()),
            ));
        }
        self.field.assign(&values);
        Ok(())
    }
    /// Integral of the field over the physical domain.
    pub fn total_mass(&self) -> f64 {
        self.interior_field().sum() * self.dx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_coordinates_are_cell_centers() {
        let grid = Grid::new(4, 0.0, 4.0).unwrap();
        assert_eq!(grid.len(), 6);
        assert!((grid.dx - 1.0).abs() < 1e-14);
        let expected = array![-0.5, 0.5, 1.5, 2.5, 3.5, 4.5];
        for (x, e) in grid.coordinates.iter().zip(expected.iter()) {
            assert!((x - e).abs() < 1e-14);
        }
        assert_eq!(grid.interior_coordinates().len(), 4);
        assert!(grid.field.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_invalid_grids_are_rejected() {
        assert!(matches!(
            Grid::new(0, 0.0, 1.0),
            Err(ConfigurationError::OutOfRange { .. })
        ));
        assert!(Grid::new(4, 1.0, 1.0).is_err());
        assert!(Grid::new(4, 2.0, 1.0).is_err());
        assert!(Grid::new(4, 0.0, f64::NAN).is_err());
        match Grid::new(4, f64::NEG_INFINITY, 1.0) {
            Err(ConfigurationError::OutOfRange { key, .. }) => assert_eq!(key, "Grid.xmin"),
            other => panic!("expected an out-of-range xmin, got {:?}", other.map(|g| g.len())),
        }
        match Grid::new(4, 0.0, f64::INFINITY) {
            Err(ConfigurationError::OutOfRange { key, .. }) => assert_eq!(key, "Grid.xmax"),
            other => panic!("expected an out-of-range xmax, got {:?}", other.map(|g| g.len())),
        }
        assert!(Grid::with_guard_cells(4, 0, 0.0, 1.0).is_err());
        assert!(Grid::with_guard_cells(2, 3, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_fill_boundary_conditions() {
        let mut grid = Grid::new(4, 0.0, 4.0).unwrap();
        grid.interior_field_mut().assign(&array![1.0, 2.0, 3.0, 4.0]);
        grid.fill_boundary_conditions();
        assert_eq!(grid.field, array![4.0, 1.0, 2.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn test_fill_boundary_conditions_wide_guard() {
        let mut grid = Grid::with_guard_cells(3, 2, 0.0, 3.0).unwrap();
        grid.interior_field_mut().assign(&array![1.0, 2.0, 3.0]);
        grid.fill_boundary_conditions();
        assert_eq!(grid.field, array![2.0, 3.0, 1.0, 2.0, 3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_set_field_checks_length() {
        let mut grid = Grid::new(4, 0.0, 4.0).unwrap();
        assert!(grid.set_field(array![1.0, 2.0].view()).is_err());
        grid.set_field(array![0.0, 1.0, 2.0, 3.0, 4.0, 0.0].view())
            .unwrap();
        assert!((grid.total_mass() - 10.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_periodic_fill_is_idempotent(
            values in prop::collection::vec(-100.0f64..100.0, 3..40),
            n_guard in 1usize..3,
        ) {
            let nx = values.len();
            let mut grid = Grid::with_guard_cells(nx, n_guard, -1.0, 2.0).unwrap();
            grid.interior_field_mut().assign(&Array1::from(values));
            grid.fill_boundary_conditions();
            let ng = n_guard;
            prop_assert_eq!(grid.field.slice(s![0..ng]), grid.field.slice(s![nx..nx + ng]));
            prop_assert_eq!(
                grid.field.slice(s![nx + ng..nx + 2 * ng]),
                grid.field.slice(s![ng..2 * ng])
            );
            let once = grid.field.clone();
            grid.fill_boundary_conditions();
            prop_assert_eq!(once, grid.field.clone());
        }
    }
}
