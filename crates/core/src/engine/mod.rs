//! Execution Engine
//!
//! [`LogoInterpreter`] owns two resolved programs (mission and failsafe),
//! the turtle state, the interrupt scheduler, and one main execution
//! context. Ticked at the platform's navigation rate (40 Hz on the original
//! airframe), it retires instructions until a pen-down move suspends it,
//! then emits the plane turtle as a [`NavigationGoal`].
//!
//! Fault policy: a runtime fault in the mission program switches to the
//! failsafe program; a fault in the failsafe program halts the engine on
//! its last goal. An interrupt handler missing its deadline only disarms
//! the handler.

mod context;
mod error;
mod frame;
mod interrupt;

pub use context::{ExecContext, StepOutcome};
pub use error::RuntimeError;
pub use frame::{CallStack, Frame, LoopCount, MAX_NESTING};
pub use interrupt::InterruptScheduler;

use crate::config::LogoConfig;
use crate::goal::NavigationGoal;
use crate::program::{ResolvedProgram, SubroutineId};
use crate::telemetry::TelemetrySource;
use crate::turtle::TurtleState;

/// Which program is in control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightMode {
    Mission,
    Failsafe,
}

/// Main-program execution phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Retiring instructions
    Running,
    /// Suspended until the vehicle reaches the current goal
    AwaitingArrival,
    /// Unrecoverable fault; the last goal is held forever
    Halted,
}

/// The flight-plan interpreter.
#[derive(Debug)]
pub struct LogoInterpreter {
    mission: ResolvedProgram,
    failsafe: ResolvedProgram,
    config: LogoConfig,
    mode: FlightMode,
    engine_state: EngineState,
    ctx: ExecContext,
    interrupt: InterruptScheduler,
    state: TurtleState,
    last_fault: Option<RuntimeError>,
}

impl LogoInterpreter {
    pub fn new(mission: ResolvedProgram, failsafe: ResolvedProgram, config: LogoConfig) -> Self {
        Self {
            mission,
            failsafe,
            state: TurtleState::new(&config),
            config,
            mode: FlightMode::Mission,
            engine_state: EngineState::Running,
            ctx: ExecContext::new(),
            interrupt: InterruptScheduler::new(),
            last_fault: None,
        }
    }

    /// Begin the mission from the vehicle's current position.
    pub fn start(&mut self, telemetry: &dyn TelemetrySource) {
        self.enter_mode(FlightMode::Mission, telemetry);
    }

    /// Switch programs and restart from the vehicle's current position.
    ///
    /// Resets the execution context, disarms any interrupt, and re-anchors
    /// both turtles. The recorded fault, if any, is kept for diagnostics.
    pub fn enter_mode(&mut self, mode: FlightMode, telemetry: &dyn TelemetrySource) {
        self.mode = mode;
        self.engine_state = EngineState::Running;
        self.ctx = ExecContext::new();
        self.interrupt.disarm();
        self.state.reset(&self.config, telemetry);
    }

    /// Advance one tick and return the goal to steer toward.
    pub fn tick(&mut self, telemetry: &dyn TelemetrySource) -> NavigationGoal {
        if self.engine_state != EngineState::Halted {
            let result = match self.mode {
                FlightMode::Mission => Self::advance(
                    &self.mission,
                    &mut self.ctx,
                    &mut self.interrupt,
                    &mut self.state,
                    &mut self.engine_state,
                    &self.config,
                    telemetry,
                ),
                FlightMode::Failsafe => Self::advance(
                    &self.failsafe,
                    &mut self.ctx,
                    &mut self.interrupt,
                    &mut self.state,
                    &mut self.engine_state,
                    &self.config,
                    telemetry,
                ),
            };
            if let Err(fault) = result {
                self.handle_fault(fault, telemetry);
            }
        }
        self.goal()
    }

    /// One tick of one program: service the interrupt, gate on arrival,
    /// then retire main-program instructions up to the step budget.
    fn advance(
        program: &ResolvedProgram,
        ctx: &mut ExecContext,
        interrupt: &mut InterruptScheduler,
        state: &mut TurtleState,
        engine_state: &mut EngineState,
        config: &LogoConfig,
        telemetry: &dyn TelemetrySource,
    ) -> Result<(), RuntimeError> {
        interrupt.service(program, state, telemetry, config.interrupt_budget)?;

        if *engine_state == EngineState::AwaitingArrival {
            if telemetry.has_arrived() {
                *engine_state = EngineState::Running;
            } else {
                return Ok(());
            }
        }

        for _ in 0..config.step_budget {
            match ctx.step(program, state, &mut interrupt.armed, telemetry)? {
                StepOutcome::Moved => {
                    if state.waits_for_arrival() {
                        *engine_state = EngineState::AwaitingArrival;
                        return Ok(());
                    }
                }
                StepOutcome::Continue => {}
                // Wrap around and keep flying the plan
                StepOutcome::ProgramEnd => ctx.restart(),
            }
        }
        // Budget exhausted; yield and resume next tick
        Ok(())
    }

    fn handle_fault(&mut self, fault: RuntimeError, telemetry: &dyn TelemetrySource) {
        self.last_fault = Some(fault);
        match fault {
            RuntimeError::InterruptDeadline => self.interrupt.disarm(),
            _ => match self.mode {
                FlightMode::Mission => self.enter_mode(FlightMode::Failsafe, telemetry),
                FlightMode::Failsafe => self.engine_state = EngineState::Halted,
            },
        }
    }

    /// Current goal, projected from the plane turtle.
    pub fn goal(&self) -> NavigationGoal {
        NavigationGoal::from(&self.state)
    }

    pub fn mode(&self) -> FlightMode {
        self.mode
    }

    pub fn engine_state(&self) -> EngineState {
        self.engine_state
    }

    pub fn last_fault(&self) -> Option<RuntimeError> {
        self.last_fault
    }

    pub fn interrupt_armed(&self) -> Option<SubroutineId> {
        self.interrupt.armed()
    }

    pub fn turtle_state(&self) -> &TurtleState {
        &self.state
    }
}
