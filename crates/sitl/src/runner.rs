//! Mission runner.
//!
//! Drives the interpreter and the vehicle model in lockstep at the same
//! 40 Hz cadence the original airframe used. Each tick: the engine emits a
//! goal, the vehicle is commanded to it and advanced one time step, and the
//! engine reads the updated vehicle back on the next tick.

use logoflight_core::{
    Instruction, LogoConfig, LogoInterpreter, NavigationGoal, ResolvedProgram, TelemetrySource,
};

use crate::error::SimulatorError;
use crate::vehicle::SimVehicle;

/// Simulation tick rate.
pub const TICK_HZ: u32 = 40;

const DT: f32 = 1.0 / TICK_HZ as f32;

/// Interpreter plus vehicle, stepped together in simulated time.
#[derive(Debug)]
pub struct MissionRunner {
    engine: LogoInterpreter,
    vehicle: SimVehicle,
    ticks: u32,
}

impl MissionRunner {
    /// Load both plans and anchor a vehicle at the origin.
    pub fn new(
        mission: &[Instruction],
        failsafe: &[Instruction],
        config: LogoConfig,
    ) -> Result<Self, SimulatorError> {
        let mission = ResolvedProgram::load(mission).map_err(SimulatorError::PlanRejected)?;
        let failsafe = ResolvedProgram::load(failsafe).map_err(SimulatorError::PlanRejected)?;
        let vehicle = SimVehicle::new(config.waypoint_radius);
        let mut engine = LogoInterpreter::new(mission, failsafe, config);
        engine.start(&vehicle);
        Ok(Self {
            engine,
            vehicle,
            ticks: 0,
        })
    }

    /// Advance one tick and return the goal in force.
    pub fn tick(&mut self) -> NavigationGoal {
        let goal = self.engine.tick(&self.vehicle);
        self.vehicle.set_goal(goal);
        self.vehicle.step(DT);
        self.ticks += 1;
        tracing::trace!(
            tick = self.ticks,
            goal_x = goal.x,
            goal_y = goal.y,
            goal_alt = goal.altitude,
            vehicle_pos = ?self.vehicle.position(),
            state = ?self.engine.engine_state(),
            "tick"
        );
        goal
    }

    /// Tick until `condition` holds, up to `max_ticks`.
    ///
    /// Fails if the engine halts on a fault or the tick limit passes first.
    pub fn run_until(
        &mut self,
        max_ticks: u32,
        mut condition: impl FnMut(&Self) -> bool,
    ) -> Result<u32, SimulatorError> {
        for _ in 0..max_ticks {
            self.tick();
            if let (logoflight_core::EngineState::Halted, Some(fault)) =
                (self.engine.engine_state(), self.engine.last_fault())
            {
                tracing::warn!(%fault, "engine halted");
                return Err(SimulatorError::EngineHalted(fault));
            }
            if condition(self) {
                return Ok(self.ticks);
            }
        }
        Err(SimulatorError::TickLimitExceeded(max_ticks))
    }

    /// Tick until the vehicle is within `tolerance` meters of `(x, y)`.
    pub fn run_to_position(
        &mut self,
        x: i32,
        y: i32,
        tolerance: f32,
        max_ticks: u32,
    ) -> Result<u32, SimulatorError> {
        self.run_until(max_ticks, |runner| {
            let (vx, vy) = runner.vehicle.position();
            let dx = (vx - x) as f32;
            let dy = (vy - y) as f32;
            (dx * dx + dy * dy).sqrt() <= tolerance
        })
    }

    pub fn engine(&self) -> &LogoInterpreter {
        &self.engine
    }

    pub fn vehicle(&self) -> &SimVehicle {
        &self.vehicle
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}
