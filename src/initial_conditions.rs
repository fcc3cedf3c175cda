use ndarray::{Array1, ArrayView1};

use crate::error::ConfigurationError;
use crate::grid::Grid;

/// Gaussian bump `y0 + dy * exp(-((x - x0) / width)^2)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianBump {
    pub x0: f64,
    pub width: f64,
    pub y0: f64,
    pub dy: f64,
}
impl Default for GaussianBump {
    fn default() -> Self {
        GaussianBump {
            x0: 0.0,
            width: 0.75,
            y0: 10.0,
            dy: 1.25,
        }
    }
}
impl GaussianBump {
    pub fn new(x0: f64, width: f64, y0: f64, dy: f64) -> Result<Self, ConfigurationError> {
        if !(width > 0.0) {
            return Err(ConfigurationError::out_of_range(
                "InitConds.dx",
                width,
                "bump width must be positive",
            ));
        }
        Ok(GaussianBump { x0, width, y0, dy })
    }
    pub fn value(&self, x: f64) -> f64 {
        let t = (x - self.x0) / self.width;
        self.y0 + self.dy * (-t * t).exp()
    }
    pub fn evaluate(&self, coordinates: ArrayView1<f64>) -> Array1<f64> {
        coordinates.mapv(|x| self.value(x))
    }
}

/// Fills the whole buffer, guard cells included, from `init_func` evaluated on
/// the grid's coordinates.
pub fn apply_initial_condition<F>(grid: &mut Grid, init_func: F) -> Result<(), ConfigurationError>
where
    F: Fn(ArrayView1<f64>) -> Array1<f64>,
{
    let values = init_func(grid.coordinates.view());
    grid.set_field(values.view())
}
