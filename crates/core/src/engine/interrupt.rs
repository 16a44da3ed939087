//! Interrupt Scheduler
//!
//! A plan may arm one subroutine as an interrupt handler. While armed, the
//! handler runs to completion at the start of every tick, before the main
//! program advances, even while the main program is suspended waiting for
//! arrival. The handler executes in a throwaway [`ExecContext`], so the
//! main program's counter, stack, and parameter are never disturbed; it
//! shares the turtle state, which is how a handler redirects the vehicle.
//!
//! Handlers must be short. One that fails to finish within the configured
//! budget raises [`RuntimeError::InterruptDeadline`].

use crate::engine::context::{ExecContext, StepOutcome};
use crate::engine::RuntimeError;
use crate::program::{ResolvedProgram, SubroutineId};
use crate::telemetry::TelemetrySource;
use crate::turtle::TurtleState;

/// Holds the armed handler and runs it each tick.
#[derive(Debug, Clone, Default)]
pub struct InterruptScheduler {
    pub(crate) armed: Option<SubroutineId>,
}

impl InterruptScheduler {
    pub const fn new() -> Self {
        Self { armed: None }
    }

    pub fn armed(&self) -> Option<SubroutineId> {
        self.armed
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }

    /// Run the armed handler to completion, if any.
    pub fn service(
        &mut self,
        program: &ResolvedProgram,
        state: &mut TurtleState,
        telemetry: &dyn TelemetrySource,
        budget: usize,
    ) -> Result<(), RuntimeError> {
        let Some(handler) = self.armed else {
            return Ok(());
        };
        let Some(entry) = program.subroutine_entry(handler) else {
            // Armed against a program that no longer defines the handler
            self.armed = None;
            return Ok(());
        };

        let mut ctx = ExecContext::at(entry);
        for _ in 0..budget {
            // Handlers never suspend on movement; the main program picks up
            // the changed goal when it resumes
            match ctx.step(program, state, &mut self.armed, telemetry)? {
                StepOutcome::ProgramEnd => return Ok(()),
                StepOutcome::Continue | StepOutcome::Moved => {}
            }
        }
        Err(RuntimeError::InterruptDeadline)
    }
}
