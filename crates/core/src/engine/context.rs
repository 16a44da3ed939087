//! Execution Context
//!
//! One program-counter/stack/parameter triple walking a resolved program.
//! The main program and each interrupt activation get their own context, so
//! a handler can never corrupt the suspended main flow.
//!
//! `step` retires exactly one instruction. The caller decides how many steps
//! to take per tick and whether a movement outcome suspends execution.

use crate::engine::frame::{CallStack, Frame, LoopCount};
use crate::engine::RuntimeError;
use crate::program::{Instruction, ResolvedProgram, SubroutineId};
use crate::program::store::{BlockKind, Link};
use crate::telemetry::{SystemValue, TelemetrySource, ValueUnavailable};
use crate::turtle::TurtleState;

/// What one retired instruction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Bookkeeping only; keep stepping
    Continue,
    /// The goal changed; with the pen down the caller must now wait
    Moved,
    /// The program ran off its end (or wrapped through a terminator)
    ProgramEnd,
}

/// Program counter, nesting stack, and parameter register.
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    pub pc: u16,
    pub stack: CallStack,
    pub param: i16,
}

impl ExecContext {
    pub const fn new() -> Self {
        Self {
            pc: 0,
            stack: CallStack::new(),
            param: 0,
        }
    }

    /// Context positioned at a subroutine entry, as interrupt activation uses.
    pub const fn at(pc: u16) -> Self {
        Self {
            pc,
            stack: CallStack::new(),
            param: 0,
        }
    }

    /// Rewind to the top of the program, keeping the parameter register.
    pub fn restart(&mut self) {
        self.pc = 0;
        self.stack.clear();
    }

    /// Read a system value, resolving PARAM against this context.
    fn read_value(
        &self,
        value: SystemValue,
        telemetry: &dyn TelemetrySource,
    ) -> Result<i16, ValueUnavailable> {
        match value {
            SystemValue::Param => Ok(self.param),
            other => telemetry.system_value(other),
        }
    }

    /// Execute the instruction at `pc` and advance.
    pub fn step(
        &mut self,
        program: &ResolvedProgram,
        state: &mut TurtleState,
        interrupt_arm: &mut Option<SubroutineId>,
        telemetry: &dyn TelemetrySource,
    ) -> Result<StepOutcome, RuntimeError> {
        if self.pc as usize >= program.len() {
            if self.stack.is_empty() {
                return Ok(StepOutcome::ProgramEnd);
            }
            // Ran off the table with frames still open
            return Err(RuntimeError::PcOutOfRange { pc: self.pc });
        }
        let instruction = match program.instruction_at(self.pc) {
            Some(instruction) => *instruction,
            None => return Err(RuntimeError::PcOutOfRange { pc: self.pc }),
        };

        match instruction {
            Instruction::If { cmp, value, rhs } => {
                // An unavailable value reads as a false condition
                let taken = self
                    .read_value(value, telemetry)
                    .map(|lhs| cmp.evaluate(lhs, rhs))
                    .unwrap_or(false);
                if taken {
                    self.pc += 1;
                } else {
                    match program.link_at(self.pc) {
                        Link::IfFalse(target) => self.pc = target,
                        _ => return Err(RuntimeError::ControlFlowCorrupt { pc: self.pc }),
                    }
                }
                Ok(StepOutcome::Continue)
            }
            Instruction::Else => match program.link_at(self.pc) {
                Link::ElseEnd(target) => {
                    self.pc = target;
                    Ok(StepOutcome::Continue)
                }
                _ => Err(RuntimeError::ControlFlowCorrupt { pc: self.pc }),
            },
            Instruction::Repeat(count) => {
                let count = count.resolve(self.param);
                if count <= 0 {
                    match program.link_at(self.pc) {
                        Link::LoopExit(target) => self.pc = target,
                        _ => return Err(RuntimeError::ControlFlowCorrupt { pc: self.pc }),
                    }
                } else {
                    self.stack.push(Frame::Loop {
                        body_start: self.pc + 1,
                        remaining: LoopCount::Finite(count as u16),
                    })?;
                    self.pc += 1;
                }
                Ok(StepOutcome::Continue)
            }
            Instruction::RepeatForever => {
                self.stack.push(Frame::Loop {
                    body_start: self.pc + 1,
                    remaining: LoopCount::Forever,
                })?;
                self.pc += 1;
                Ok(StepOutcome::Continue)
            }
            Instruction::End => self.step_end(program),
            Instruction::To(_) => {
                // Falling into a subroutine definition ends the main flow
                self.stack.clear();
                Ok(StepOutcome::ProgramEnd)
            }
            Instruction::Do { subroutine, param } => {
                let entry = program
                    .subroutine_entry(subroutine)
                    .ok_or(RuntimeError::ControlFlowCorrupt { pc: self.pc })?;
                let argument = param.resolve(self.param);
                self.stack.push(Frame::Call {
                    return_pc: self.pc + 1,
                    saved_param: self.param,
                    subroutine,
                })?;
                self.param = argument;
                self.pc = entry;
                Ok(StepOutcome::Continue)
            }
            Instruction::Exec { subroutine, param } => {
                let entry = program
                    .subroutine_entry(subroutine)
                    .ok_or(RuntimeError::ControlFlowCorrupt { pc: self.pc })?;
                self.param = param.resolve(self.param);
                self.stack.clear();
                self.pc = entry;
                Ok(StepOutcome::Continue)
            }
            other => {
                self.execute_simple(other, state, interrupt_arm, telemetry);
                self.pc += 1;
                if other.is_move() {
                    Ok(StepOutcome::Moved)
                } else {
                    Ok(StepOutcome::Continue)
                }
            }
        }
    }

    /// END closes whichever construct the loader tagged it with.
    fn step_end(&mut self, program: &ResolvedProgram) -> Result<StepOutcome, RuntimeError> {
        match program.link_at(self.pc) {
            Link::End(BlockKind::If) => {
                self.pc += 1;
                Ok(StepOutcome::Continue)
            }
            Link::End(BlockKind::Loop) => {
                match self.stack.top_mut() {
                    Some(Frame::Loop {
                        body_start,
                        remaining,
                    }) => match remaining {
                        LoopCount::Forever => self.pc = *body_start,
                        LoopCount::Finite(n) if *n > 1 => {
                            *n -= 1;
                            self.pc = *body_start;
                        }
                        LoopCount::Finite(_) => {
                            self.stack.pop();
                            self.pc += 1;
                        }
                    },
                    _ => return Err(RuntimeError::ControlFlowCorrupt { pc: self.pc }),
                }
                Ok(StepOutcome::Continue)
            }
            Link::End(BlockKind::Subroutine) => match self.stack.pop() {
                Some(Frame::Call {
                    return_pc,
                    saved_param,
                    ..
                }) => {
                    self.param = saved_param;
                    self.pc = return_pc;
                    Ok(StepOutcome::Continue)
                }
                Some(_) => Err(RuntimeError::ControlFlowCorrupt { pc: self.pc }),
                None => Ok(StepOutcome::ProgramEnd),
            },
            _ => Err(RuntimeError::ControlFlowCorrupt { pc: self.pc }),
        }
    }

    /// Instructions with no control-flow edge.
    fn execute_simple(
        &mut self,
        instruction: Instruction,
        state: &mut TurtleState,
        interrupt_arm: &mut Option<SubroutineId>,
        telemetry: &dyn TelemetrySource,
    ) {
        match instruction {
            Instruction::Home => {
                let turtle = state.active_turtle_mut();
                turtle.x = 0;
                turtle.y = 0;
                turtle.set_heading(0);
            }
            Instruction::Forward(distance) => {
                let distance = distance.resolve(self.param);
                state.active_turtle_mut().forward(distance);
            }
            Instruction::Turn(degrees) => {
                let degrees = degrees.resolve(self.param);
                state.active_turtle_mut().turn(degrees);
            }
            Instruction::SetHeading(degrees) => {
                let degrees = degrees.resolve(self.param);
                state.active_turtle_mut().set_heading(degrees);
            }
            Instruction::UseCurrentPos => {
                let (x, y) = telemetry.position();
                let turtle = state.active_turtle_mut();
                turtle.x = x;
                turtle.y = y;
            }
            Instruction::UseCurrentAngle => {
                let heading = telemetry.heading();
                state.active_turtle_mut().set_heading(heading);
            }
            Instruction::UseAngleToGoal => {
                // Skipped when the bearing is unavailable
                if let Ok(bearing) = telemetry.system_value(SystemValue::AngleToGoal) {
                    state.active_turtle_mut().set_heading(bearing);
                }
            }
            Instruction::East(meters) => {
                state.active_turtle_mut().x += meters.resolve(self.param) as i32;
            }
            Instruction::North(meters) => {
                state.active_turtle_mut().y += meters.resolve(self.param) as i32;
            }
            Instruction::SetX(meters) => {
                state.active_turtle_mut().x = meters.resolve(self.param) as i32;
            }
            Instruction::SetY(meters) => {
                state.active_turtle_mut().y = meters.resolve(self.param) as i32;
            }
            Instruction::SetPos { x, y } => {
                let turtle = state.active_turtle_mut();
                turtle.x = x as i32;
                turtle.y = y as i32;
            }
            Instruction::ChangeAlt(meters) => {
                state.active_turtle_mut().altitude += meters.resolve(self.param) as i32;
            }
            Instruction::SetAlt(meters) => {
                state.active_turtle_mut().altitude = meters.resolve(self.param) as i32;
            }
            Instruction::ChangeSpeed(delta) => {
                state.speed = state.speed.saturating_add(delta.resolve(self.param));
            }
            Instruction::SetSpeed(speed) => {
                state.speed = speed.resolve(self.param);
            }
            Instruction::PenUp => state.pen_down = false,
            Instruction::PenDown => state.pen_down = true,
            Instruction::PenToggle => state.pen_down = !state.pen_down,
            Instruction::SetTurtle(kind) => state.active = kind,
            Instruction::FlagOn(flags) => state.flags.insert(flags),
            Instruction::FlagOff(flags) => state.flags.remove(flags),
            Instruction::FlagToggle(flags) => state.flags.toggle(flags),
            Instruction::ParamSet(value) => self.param = value,
            Instruction::ParamAdd(value) => self.param = self.param.wrapping_add(value),
            Instruction::ParamMul(value) => self.param = self.param.wrapping_mul(value),
            Instruction::ParamDiv(value) => {
                if value != 0 {
                    self.param = self.param.wrapping_div(value);
                }
            }
            Instruction::LoadToParam(value) => {
                // Skipped when the value is unavailable
                if let Ok(reading) = self.read_value(value, telemetry) {
                    self.param = reading;
                }
            }
            Instruction::SetInterrupt(subroutine) => *interrupt_arm = Some(subroutine),
            Instruction::ClearInterrupt => *interrupt_arm = None,
            // Control-flow instructions are handled in step
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogoConfig;
    use crate::program::Operand;
    use crate::telemetry::MockTelemetry;
    use crate::turtle::{FlightFlags, TurtleKind};

    const SQUARE: SubroutineId = 1;
    const SPIRAL: SubroutineId = 2;

    fn setup(source: &[Instruction]) -> (ResolvedProgram, TurtleState, MockTelemetry) {
        let program = ResolvedProgram::load(source).unwrap();
        let state = TurtleState::new(&LogoConfig::default());
        (program, state, MockTelemetry::new())
    }

    /// Step until the program ends or `limit` instructions retire.
    fn run(
        ctx: &mut ExecContext,
        program: &ResolvedProgram,
        state: &mut TurtleState,
        telemetry: &MockTelemetry,
        limit: usize,
    ) -> Option<SubroutineId> {
        let mut arm = None;
        for _ in 0..limit {
            match ctx.step(program, state, &mut arm, telemetry).unwrap() {
                StepOutcome::ProgramEnd => return arm,
                _ => {}
            }
        }
        panic!("program did not finish within {} steps", limit);
    }

    // ========================================================================
    // Movement and bookkeeping
    // ========================================================================

    #[test]
    fn test_forward_reports_moved() {
        let (program, mut state, telemetry) = setup(&[Instruction::fd(100)]);
        let mut ctx = ExecContext::new();
        let mut arm = None;
        let outcome = ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        assert_eq!(outcome, StepOutcome::Moved);
        assert_eq!(state.active_turtle().y, 100);
        assert_eq!(ctx.pc, 1);
    }

    #[test]
    fn test_turn_reports_continue() {
        let (program, mut state, telemetry) = setup(&[Instruction::rt(90)]);
        let mut ctx = ExecContext::new();
        let mut arm = None;
        let outcome = ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        assert_eq!(outcome, StepOutcome::Continue);
        assert_eq!(state.active_turtle().heading, 90);
    }

    #[test]
    fn test_home_recenters_without_touching_altitude() {
        let (program, mut state, telemetry) = setup(&[Instruction::Home]);
        let turtle = state.active_turtle_mut();
        turtle.x = 500;
        turtle.y = -200;
        turtle.heading = 135;
        turtle.altitude = 80;
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 4);
        let turtle = state.active_turtle();
        assert_eq!((turtle.x, turtle.y, turtle.heading), (0, 0, 0));
        assert_eq!(turtle.altitude, 80);
    }

    #[test]
    fn test_cardinal_and_absolute_moves() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::east(30),
            Instruction::south(10),
            Instruction::set_x(-5),
            Instruction::set_pos(7, 8),
        ]);
        let mut ctx = ExecContext::new();
        let mut arm = None;
        for _ in 0..2 {
            ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        }
        assert_eq!((state.active_turtle().x, state.active_turtle().y), (30, -10));
        ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        assert_eq!(state.active_turtle().x, -5);
        ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        assert_eq!((state.active_turtle().x, state.active_turtle().y), (7, 8));
    }

    #[test]
    fn test_altitude_and_speed() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::set_alt(50),
            Instruction::alt_up(20),
            Instruction::alt_down(5),
            Instruction::set_speed(15),
            Instruction::speed_decrease(3),
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 8);
        assert_eq!(state.active_turtle().altitude, 65);
        assert_eq!(state.speed, 12);
    }

    #[test]
    fn test_pen_and_flags_and_turtle_select() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::PenUp,
            Instruction::FlagOn(FlightFlags::CROSS_TRACK),
            Instruction::FlagToggle(FlightFlags::TRIGGER),
            Instruction::SetTurtle(TurtleKind::Camera),
            Instruction::fd(40),
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 8);
        assert!(!state.pen_down);
        assert!(state.flags.contains(FlightFlags::CROSS_TRACK | FlightFlags::TRIGGER));
        // The camera turtle moved; the plane turtle stayed put
        assert_eq!(state.turtle(TurtleKind::Camera).y, 40);
        assert_eq!(state.turtle(TurtleKind::Plane).y, 0);
    }

    #[test]
    fn test_use_current_pos_and_angle() {
        let (program, mut state, mut telemetry) = setup(&[
            Instruction::UseCurrentPos,
            Instruction::UseCurrentAngle,
        ]);
        telemetry.set_position(12, 34);
        telemetry.set_heading(200);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 4);
        let turtle = state.active_turtle();
        assert_eq!((turtle.x, turtle.y, turtle.heading), (12, 34, 200));
    }

    // ========================================================================
    // Parameter register
    // ========================================================================

    #[test]
    fn test_param_arithmetic() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::param_set(10),
            Instruction::param_add(5),
            Instruction::param_mul(-2),
            Instruction::param_div(3),
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 8);
        assert_eq!(ctx.param, -10);
    }

    #[test]
    fn test_param_div_by_zero_is_noop() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::param_set(42),
            Instruction::param_div(0),
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 4);
        assert_eq!(ctx.param, 42);
    }

    #[test]
    fn test_load_to_param_skips_when_unavailable() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::param_set(7),
            Instruction::load_to_param(SystemValue::WindSpeed),
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 4);
        assert_eq!(ctx.param, 7);
    }

    #[test]
    fn test_param_operand_scales_moves() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::param_set(60),
            Instruction::Forward(Operand::Param),
            Instruction::Turn(Operand::NegParam),
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 6);
        assert_eq!(state.active_turtle().y, 60);
        assert_eq!(state.active_turtle().heading, 300);
    }

    // ========================================================================
    // Conditionals
    // ========================================================================

    #[test]
    fn test_if_true_enters_block() {
        let (program, mut state, mut telemetry) = setup(&[
            Instruction::if_gt(SystemValue::Altitude, 50),
            Instruction::rt(90),
            Instruction::End,
        ]);
        telemetry.set_value(SystemValue::Altitude, 80);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 6);
        assert_eq!(state.active_turtle().heading, 90);
    }

    #[test]
    fn test_if_false_takes_else_branch() {
        let (program, mut state, mut telemetry) = setup(&[
            Instruction::if_gt(SystemValue::Altitude, 50),
            Instruction::rt(90),
            Instruction::Else,
            Instruction::lt(90),
            Instruction::End,
        ]);
        telemetry.set_value(SystemValue::Altitude, 10);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 6);
        assert_eq!(state.active_turtle().heading, 270);
    }

    #[test]
    fn test_if_true_skips_else_branch() {
        let (program, mut state, mut telemetry) = setup(&[
            Instruction::if_ge(SystemValue::Altitude, 50),
            Instruction::rt(90),
            Instruction::Else,
            Instruction::lt(90),
            Instruction::End,
        ]);
        telemetry.set_value(SystemValue::Altitude, 50);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 6);
        assert_eq!(state.active_turtle().heading, 90);
    }

    #[test]
    fn test_if_unavailable_value_reads_false() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::if_lt(SystemValue::AirSpeed, 9999),
            Instruction::rt(90),
            Instruction::End,
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 6);
        assert_eq!(state.active_turtle().heading, 0);
    }

    #[test]
    fn test_if_on_param_register() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::param_set(3),
            Instruction::if_eq(SystemValue::Param, 3),
            Instruction::rt(45),
            Instruction::End,
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 8);
        assert_eq!(state.active_turtle().heading, 45);
    }

    // ========================================================================
    // Loops
    // ========================================================================

    #[test]
    fn test_repeat_runs_body_n_times() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::repeat(4),
            Instruction::fd(100),
            Instruction::rt(90),
            Instruction::End,
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 32);
        // Four sides of a square come back to the start
        let turtle = state.active_turtle();
        assert_eq!((turtle.x, turtle.y, turtle.heading), (0, 0, 0));
        assert!(ctx.stack.is_empty());
    }

    #[test]
    fn test_repeat_zero_skips_body() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::repeat(0),
            Instruction::fd(100),
            Instruction::End,
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 4);
        assert_eq!(state.active_turtle().y, 0);
    }

    #[test]
    fn test_repeat_negative_param_skips_body() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::param_set(-2),
            Instruction::repeat_param(),
            Instruction::fd(100),
            Instruction::End,
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 6);
        assert_eq!(state.active_turtle().y, 0);
    }

    #[test]
    fn test_repeat_forever_never_ends() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::RepeatForever,
            Instruction::rt(1),
            Instruction::End,
        ]);
        let mut ctx = ExecContext::new();
        let mut arm = None;
        for _ in 0..720 {
            let outcome = ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
            assert_ne!(outcome, StepOutcome::ProgramEnd);
        }
        // 720 steps = entry + 359 full iterations and change
        assert_eq!(ctx.stack.depth(), 1);
    }

    #[test]
    fn test_nested_repeat() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::repeat(3),
            Instruction::repeat(2),
            Instruction::east(1),
            Instruction::End,
            Instruction::north(10),
            Instruction::End,
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 64);
        assert_eq!((state.active_turtle().x, state.active_turtle().y), (6, 30));
    }

    // ========================================================================
    // Subroutines
    // ========================================================================

    #[test]
    fn test_do_call_and_return() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::call(SQUARE), // 0
            Instruction::rt(45),       // 1  runs after the call returns
            Instruction::End,          // 2
            Instruction::to(SQUARE),   // 3
            Instruction::fd(10),       // 4
            Instruction::End,          // 5
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 16);
        assert_eq!(state.active_turtle().y, 10);
        assert_eq!(state.active_turtle().heading, 45);
    }

    #[test]
    fn test_do_saves_and_restores_param() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::param_set(100),        // 0
            Instruction::call_arg(SQUARE, 25),  // 1
            Instruction::fd_param(),            // 2  caller's param is back
            Instruction::End,                   // 3
            Instruction::to(SQUARE),            // 4
            Instruction::fd_param(),            // 5  sees 25
            Instruction::param_set(1),          // 6  clobber, must not leak out
            Instruction::End,                   // 7
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 16);
        assert_eq!(state.active_turtle().y, 125);
        assert_eq!(ctx.param, 100);
    }

    #[test]
    fn test_call_param_forwards_callers_register() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::param_set(33),
            Instruction::call_param(SQUARE),
            Instruction::End,
            Instruction::to(SQUARE),
            Instruction::fd_param(),
            Instruction::End,
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 16);
        assert_eq!(state.active_turtle().y, 33);
    }

    #[test]
    fn test_nested_calls() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::call(SQUARE),      // 0
            Instruction::End,               // 1
            Instruction::to(SQUARE),        // 2
            Instruction::call_arg(SPIRAL, 5), // 3
            Instruction::east(1),           // 4
            Instruction::End,               // 5
            Instruction::to(SPIRAL),        // 6
            Instruction::north(1),          // 7
            Instruction::End,               // 8
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 16);
        assert_eq!((state.active_turtle().x, state.active_turtle().y), (1, 1));
    }

    #[test]
    fn test_exec_discards_callers() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::call(SQUARE),  // 0
            Instruction::rt(45),        // 1  must never run
            Instruction::End,           // 2
            Instruction::to(SQUARE),    // 3
            Instruction::exec(SPIRAL),  // 4
            Instruction::End,           // 5
            Instruction::to(SPIRAL),    // 6
            Instruction::fd(10),        // 7
            Instruction::End,           // 8  empty stack: program ends
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 16);
        assert_eq!(state.active_turtle().y, 10);
        assert_eq!(state.active_turtle().heading, 0);
        assert!(ctx.stack.is_empty());
    }

    #[test]
    fn test_recursion_overflows_stack() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::call(SQUARE),
            Instruction::End,
            Instruction::to(SQUARE),
            Instruction::call(SQUARE),
            Instruction::End,
        ]);
        let mut ctx = ExecContext::new();
        let mut arm = None;
        let mut fault = None;
        for _ in 0..64 {
            match ctx.step(&program, &mut state, &mut arm, &telemetry) {
                Ok(_) => {}
                Err(err) => {
                    fault = Some(err);
                    break;
                }
            }
        }
        assert_eq!(fault, Some(RuntimeError::StackOverflow));
    }

    #[test]
    fn test_bounded_recursion_with_exec() {
        // Tail recursion through EXEC reuses the frame and terminates
        let (program, mut state, telemetry) = setup(&[
            Instruction::call_arg(SQUARE, 3),   // 0
            Instruction::End,                   // 1
            Instruction::to(SQUARE),            // 2
            Instruction::if_gt(SystemValue::Param, 0), // 3
            Instruction::north(1),              // 4
            Instruction::param_add(-1),         // 5
            Instruction::exec_param(SQUARE),    // 6
            Instruction::End,                   // 7
            Instruction::End,                   // 8
        ]);
        let mut ctx = ExecContext::new();
        run(&mut ctx, &program, &mut state, &telemetry, 64);
        assert_eq!(state.active_turtle().y, 3);
    }

    // ========================================================================
    // Program end and wrap markers
    // ========================================================================

    #[test]
    fn test_running_off_table_ends_program() {
        let (program, mut state, telemetry) = setup(&[Instruction::rt(10)]);
        let mut ctx = ExecContext::new();
        let mut arm = None;
        ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        let outcome = ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        assert_eq!(outcome, StepOutcome::ProgramEnd);
    }

    #[test]
    fn test_flowing_into_to_ends_program() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::rt(10),      // 0
            Instruction::to(SQUARE),  // 1
            Instruction::fd(10),      // 2
            Instruction::End,         // 3
        ]);
        let mut ctx = ExecContext::new();
        let mut arm = None;
        ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        let outcome = ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        assert_eq!(outcome, StepOutcome::ProgramEnd);
        // The subroutine body did not run
        assert_eq!(state.active_turtle().y, 0);
    }

    #[test]
    fn test_restart_keeps_param() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::param_add(5),
            Instruction::End,
        ]);
        let mut ctx = ExecContext::new();
        let mut arm = None;
        ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        let outcome = ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        assert_eq!(outcome, StepOutcome::ProgramEnd);
        ctx.restart();
        assert_eq!(ctx.pc, 0);
        assert_eq!(ctx.param, 5);
    }

    // ========================================================================
    // Interrupt arming
    // ========================================================================

    #[test]
    fn test_set_and_clear_interrupt() {
        let (program, mut state, telemetry) = setup(&[
            Instruction::set_interrupt(SQUARE),
            Instruction::ClearInterrupt,
            Instruction::End,
            Instruction::to(SQUARE),
            Instruction::End,
        ]);
        let mut ctx = ExecContext::new();
        let mut arm = None;
        ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        assert_eq!(arm, Some(SQUARE));
        ctx.step(&program, &mut state, &mut arm, &telemetry).unwrap();
        assert_eq!(arm, None);
    }
}
