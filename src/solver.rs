use tracing::{debug, info};

use crate::error::{DegenerateStepError, Result};
use crate::grid::Grid;
use crate::hydro::{PhysicalParameters, compute_time_step, one_step};
use crate::io::SnapshotWriter;
use crate::io::monitor::Monitor;

pub struct SolverParameters {
    pub final_time: f64,
    pub final_step: usize,
    pub output_dt: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationClock {
    pub current_time: f64,
    pub current_iteration: usize,
    pub max_time: f64,
    pub max_iterations: usize,
    pub output_interval: f64,
    last_output_bucket: f64,
}
impl SimulationClock {
    pub fn new(solver_param: &SolverParameters) -> Self {
        SimulationClock {
            current_time: 0.0,
            current_iteration: 0,
            max_time: solver_param.final_time,
            max_iterations: solver_param.final_step,
            output_interval: solver_param.output_dt,
            last_output_bucket: -1.0,
        }
    }
    /// Resume from a restart point.
    pub fn starting_at(mut self, time: f64, iteration: usize) -> Self {
        self.current_time = time;
        self.current_iteration = iteration;
        self
    }
    pub fn is_running(&self) -> bool {
        self.current_iteration < self.max_iterations && self.current_time < self.max_time
    }
    /// True once per `output_interval` bucket of simulated time. Never true
    /// when periodic output is disabled.
    pub fn output_due(&mut self) -> bool {
        if !(self.output_interval > 0.0) {
            return false;
        }
        let bucket = (self.current_time / self.output_interval).floor();
        if bucket > self.last_output_bucket {
            self.last_output_bucket = bucket;
            true
        } else {
            false
        }
    }
    pub fn advance(&mut self, dt: f64) {
        self.current_time += dt;
        self.current_iteration += 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Initializing,
    Stepping,
    Writing,
    Finalizing,
    Done,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub iterations: usize,
    pub final_time: f64,
    pub final_step: usize,
    pub snapshots: usize,
}

pub struct Solver<W: SnapshotWriter> {
    pub grid: Grid,
    pub physical: PhysicalParameters,
    pub clock: SimulationClock,
    pub writer: W,
    pub monitor: Option<Monitor>,
    state: LoopState,
    snapshots: usize,
}
impl<W: SnapshotWriter> Solver<W> {
    /// `grid` must already hold the initial condition.
    pub fn new(grid: Grid, physical: PhysicalParameters, clock: SimulationClock, writer: W) -> Self {
        Solver {
            grid,
            physical,
            clock,
            writer,
            monitor: None,
            state: LoopState::Initializing,
            snapshots: 0,
        }
    }
    pub fn with_monitor(mut self, monitor: Monitor) -> Self {
        self.monitor = Some(monitor);
        self
    }
    pub fn state(&self) -> LoopState {
        self.state
    }
    fn emit_snapshot(&mut self, step: usize) -> Result<()> {
        let previous = self.state;
        self.state = LoopState::Writing;
        self.writer
            .write_snapshot(&self.grid, step, self.clock.current_time)?;
        self.snapshots += 1;
        self.state = previous;
        Ok(())
    }
    fn record_monitor(&mut self) -> Result<()> {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.record(&self.grid, self.clock.current_time)?;
        }
        Ok(())
    }
    /// Runs the evolution loop to completion and writes the final snapshot.
    pub fn solve(&mut self) -> Result<RunSummary> {
        self.state = LoopState::Stepping;
        info!(
            "evolution loop: t = {:e}, n = {}, tmax = {:e}, max_iter = {}",
            self.clock.current_time,
            self.clock.current_iteration,
            self.clock.max_time,
            self.clock.max_iterations
        );
        while self.clock.is_running() {
            let n = self.clock.current_iteration;
            if self.clock.output_due() {
                self.emit_snapshot(n)?;
            }
            self.record_monitor()?;

            self.grid.fill_boundary_conditions();
            let dt = compute_time_step(&self.physical, self.grid.dx);
            if !(dt > 0.0 && dt.is_finite()) {
                return Err(DegenerateStepError {
                    iteration: n,
                    time: self.clock.current_time,
                    dt,
                }
                .into());
            }
            debug!("n = {}; t = {:e}; dt = {:e}", n, self.clock.current_time, dt);
            one_step(&mut self.grid, &self.physical, dt);
            self.clock.advance(dt);
        }

        self.state = LoopState::Finalizing;
        // a stop on time happens at the top of iteration n, tagged n + 1
        let final_step = if self.clock.current_iteration < self.clock.max_iterations {
            self.clock.current_iteration + 1
        } else {
            self.clock.current_iteration
        };
        info!(
            "n = {}; t = {:e}",
            self.clock.current_iteration, self.clock.current_time
        );
        self.emit_snapshot(final_step)?;
        self.record_monitor()?;
        self.writer.finalize()?;
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.finish()?;
        }
        self.state = LoopState::Done;
        Ok(RunSummary {
            iterations: self.clock.current_iteration,
            final_time: self.clock.current_time,
            final_step,
            snapshots: self.snapshots,
        })
    }
}
