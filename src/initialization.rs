use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{
    error::Result,
    grid::Grid,
    hydro::PhysicalParameters,
    initial_conditions::{GaussianBump, apply_initial_condition},
    io::{
        monitor::Monitor, param_parser::Parameters, read_snapshot::read_snapshot,
        write_snapshot::SnapshotDirectory,
    },
    solver::{SimulationClock, Solver, SolverParameters},
};

pub struct DriverParameters {
    pub solver_params: SolverParameters,
    pub output_dir: PathBuf,
    pub restart_dir: Option<PathBuf>,
}

pub fn initialize_params_by_file(file_path: impl AsRef<Path>) -> Result<Parameters> {
    let params = Parameters::parse(file_path)?;
    Ok(params)
}

pub fn initialize_driver(params: &mut Parameters) -> Result<DriverParameters> {
    let final_step: usize = params.with_default("Driver.max_iter", 10)?;
    let output_dt: f64 = params.with_default("Driver.output_dt", 0.0)?;
    let final_time: f64 = params.required("Driver.tmax")?;
    let output_dir: String = params.with_default("Driver.output_dir", "output".to_string())?;
    let restart_dir: String = params.with_default("Driver.restart_dir", String::new())?;
    let output_dir = if output_dir.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(output_dir)
    };
    Ok(DriverParameters {
        solver_params: SolverParameters {
            final_time,
            final_step,
            output_dt,
        },
        output_dir,
        restart_dir: (!restart_dir.is_empty()).then(|| PathBuf::from(restart_dir)),
    })
}

pub fn initialize_grid(params: &mut Parameters) -> Result<Grid> {
    let nx: usize = params.required("Grid.nx")?;
    let xmin: f64 = params.required("Grid.xmin")?;
    let xmax: f64 = params.required("Grid.xmax")?;
    let n_guard: usize = params.with_default("Grid.n_guard", 1)?;
    let grid = Grid::with_guard_cells(nx, n_guard, xmin, xmax)?;
    Ok(grid)
}

pub fn initialize_hydro(params: &mut Parameters) -> Result<PhysicalParameters> {
    let advection_speed: f64 = params.with_default("Hydro.advection_speed", 1.0)?;
    let cfl_fraction: f64 = params.with_default("Hydro.f_cfl", 0.75)?;
    Ok(PhysicalParameters::new(advection_speed, cfl_fraction)?)
}

pub fn initialize_initial_conditions(params: &mut Parameters) -> Result<GaussianBump> {
    let default = GaussianBump::default();
    let x0: f64 = params.with_default("InitConds.x0", default.x0)?;
    let width: f64 = params.with_default("InitConds.dx", default.width)?;
    let y0: f64 = params.with_default("InitConds.y0", default.y0)?;
    let dy: f64 = params.with_default("InitConds.dy", default.dy)?;
    Ok(GaussianBump::new(x0, width, y0, dy)?)
}

fn log_section(params: &Parameters, section: &str) {
    for line in params.section_report(section) {
        info!("{}", line);
    }
}

/// Resolves every component from the configuration, applies the initial
/// condition (or restart data), and returns a solver ready to step.
pub fn initialize_solver(params: &mut Parameters) -> Result<Solver<SnapshotDirectory>> {
    if let Some(config_file) = params.config_file.as_ref() {
        info!("configuration file: {}", config_file.display());
    }
    let driver = initialize_driver(params)?;
    log_section(params, "Driver");
    let mut grid = initialize_grid(params)?;
    let write_guard: bool = params.with_default("Grid.write_guard", false)?;
    log_section(params, "Grid");
    let physical = initialize_hydro(params)?;
    log_section(params, "Hydro");
    let bump = initialize_initial_conditions(params)?;
    log_section(params, "InitConds");
    let monitor_file: String = params.with_default("Monitor.monitor_file", "monitor.csv".to_string())?;
    log_section(params, "Monitor");
    for (name, value) in params.unused() {
        warn!("unused parameter {} : {}", name, value);
    }

    let writer = SnapshotDirectory::new(&driver.output_dir, driver.solver_params.final_step)?
        .with_guard_cells(write_guard);
    let mut clock = SimulationClock::new(&driver.solver_params);
    match driver.restart_dir.as_ref() {
        None => apply_initial_condition(&mut grid, |x| bump.evaluate(x))?,
        Some(restart_dir) => {
            let snapshot = read_snapshot(restart_dir)?;
            snapshot.restore_into(&mut grid)?;
            info!(
                "restarting from {} at t = {:e}, n = {}",
                restart_dir.display(),
                snapshot.time,
                snapshot.step
            );
            clock = clock.starting_at(snapshot.time, snapshot.step);
        }
    }

    let mut solver = Solver::new(grid, physical, clock, writer);
    if !monitor_file.is_empty() {
        let monitor = Monitor::new(&solver.grid, physical.advection_speed, solver.clock.current_time)
            .with_file(&driver.output_dir.join(monitor_file))?;
        solver = solver.with_monitor(monitor);
    }
    Ok(solver)
}
