//! First-order Godunov (upwind) finite-volume solver for linear advection of
//! a scalar field on a periodic 1D grid.
pub mod error;
pub mod grid;
pub mod hydro;
pub mod initial_conditions;
pub mod initialization;
pub mod io;
pub mod solver;
