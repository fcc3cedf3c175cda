use ndarray::{Array1, ArrayView1};

/// Exact Riemann solver for linear advection: the flux is carried by the
/// upwind state.
pub fn upwind(
    lower: ArrayView1<f64>,
    upper: ArrayView1<f64>,
    advection_speed: f64,
) -> Array1<f64> {
    assert_eq!(
        lower.len(),
        upper.len(),
        "lower and upper interface states must have the same length"
    );
    if advection_speed == 0.0 {
        Array1::zeros(lower.len())
    } else if advection_speed > 0.0 {
        lower.mapv(|q| advection_speed * q)
    } else {
        upper.mapv(|q| advection_speed * q)
    }
}
