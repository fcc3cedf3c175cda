use ndarray::{ArrayView1, s};

/// Piecewise-constant (Godunov) reconstruction.
///
/// For `N` cells there are `N - 1` interfaces; interface `i` lies between
/// cells `i` and `i + 1`, so its lower state is cell `i` and its upper state
/// is cell `i + 1`. First order in space.
pub fn reconstruction(field: ArrayView1<f64>) -> (ArrayView1<f64>, ArrayView1<f64>) {
    assert!(field.len() >= 2, "reconstruction needs at least two cells");
    let n = field.len();
    (field.slice_move(s![..n - 1]), field.slice_move(s![1..]))
}
