mod reconstruction;
mod riemann_solver;

use ndarray::{Array1, ArrayView1, ArrayViewMut1};

use crate::error::ConfigurationError;
use crate::grid::Grid;
pub use reconstruction::reconstruction;
pub use riemann_solver::upwind;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalParameters {
    pub advection_speed: f64,
    pub cfl_fraction: f64, // fraction of the CFL step actually taken, in (0, 1]
}
impl PhysicalParameters {
    pub fn new(advection_speed: f64, cfl_fraction: f64) -> Result<Self, ConfigurationError> {
        if !advection_speed.is_finite() {
            return Err(ConfigurationError::out_of_range(
                "Hydro.advection_speed",
                advection_speed,
                "must be finite",
            ));
        }
        if !(cfl_fraction > 0.0 && cfl_fraction <= 1.0) {
            return Err(ConfigurationError::out_of_range(
                "Hydro.f_cfl",
                cfl_fraction,
                "must lie in (0, 1]",
            ));
        }
        Ok(PhysicalParameters {
            advection_speed,
            cfl_fraction,
        })
    }
}

/// Time step allowed by the hydro component: `f_cfl * |v| * dx`.
///
/// Returns exactly zero when the advection speed is zero; the caller decides
/// what a zero step means.
pub fn compute_time_step(params: &PhysicalParameters, dx: f64) -> f64 {
    params.cfl_fraction * params.advection_speed.abs() * dx
}

/// Fluxes at the `len(field) - 1` interfaces of `field`.
pub fn compute_fluxes(field: ArrayView1<f64>, advection_speed: f64) -> Array1<f64> {
    let (lower, upper) = reconstruction(field);
    upwind(lower, upper, advection_speed)
}

/// Conservative update: interface `i` moves `flux[i] * dt / dx` out of cell
/// `i` and into cell `i + 1`.
pub fn update(mut field: ArrayViewMut1<f64>, fluxes: ArrayView1<f64>, dt: f64, dx: f64) {
    assert_eq!(
        fluxes.len() + 1,
        field.len(),
        "one flux per interface between adjacent cells"
    );
    for (i, &flux) in fluxes.iter().enumerate() {
        let dq = flux * dt / dx;
        field[i] -= dq;
        field[i + 1] += dq;
    }
}

/// A single hydro step on a grid whose guard cells are already filled.
pub fn one_step(grid: &mut Grid, params: &PhysicalParameters, dt: f64) {
    let fluxes = compute_fluxes(grid.field.view(), params.advection_speed);
    let dx = grid.dx;
    update(grid.field.view_mut(), fluxes.view(), dt, dx);
}
