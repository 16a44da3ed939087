//! Flight-Plan Instruction Set
//!
//! Pure data types for LOGO flight-plan instructions. A plan is authored as
//! an ordered table of [`Instruction`]s: a main body followed by zero or more
//! subroutine blocks (`To(id)` .. `End`). Tables are immutable once loaded
//! into a [`ResolvedProgram`].
//!
//! Instructions take at most two operands. Magnitude operands are an
//! [`Operand`]: either a signed 16-bit literal or the current subroutine
//! parameter (optionally negated, which is how the left/backward/down
//! parameter forms are expressed).

pub mod store;

pub use store::{LoadError, ResolvedProgram, MAX_INSTRUCTIONS, MAX_SUBROUTINES};

use crate::telemetry::SystemValue;
use crate::turtle::{FlightFlags, TurtleKind};

/// Identifier of a subroutine block, unique within one program.
pub type SubroutineId = u8;

/// Magnitude operand: a literal, or the per-invocation parameter register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Signed literal value
    Literal(i16),
    /// Current subroutine parameter
    Param,
    /// Current subroutine parameter, negated (BK_PARAM, LT_PARAM, ...)
    NegParam,
}

impl Operand {
    /// Resolve the operand against the current parameter register.
    pub fn resolve(self, param: i16) -> i16 {
        match self {
            Operand::Literal(value) => value,
            Operand::Param => param,
            Operand::NegParam => param.wrapping_neg(),
        }
    }
}

/// Comparison operator for conditional instructions.
///
/// The system value (or parameter) is always the left-hand side, the
/// literal the right-hand side, compared as signed integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Comparison {
    /// Evaluate `lhs <cmp> rhs`.
    pub fn evaluate(self, lhs: i16, rhs: i16) -> bool {
        match self {
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Le => lhs <= rhs,
        }
    }
}

/// One flight-plan instruction.
///
/// Movement and orientation instructions apply to whichever turtle is
/// currently active. Distances are meters, angles degrees clockwise from
/// North, speeds in m/s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Return the turtle to the origin, aiming North (HOME)
    Home,
    /// Move along the current heading (FD / BK with negative distance)
    Forward(Operand),
    /// Rotate clockwise (RT / LT with negative angle)
    Turn(Operand),
    /// Set absolute heading, degrees clockwise from North (SET_ANGLE)
    SetHeading(Operand),
    /// Move the turtle to the vehicle's current X/Y (USE_CURRENT_POS)
    UseCurrentPos,
    /// Aim the turtle at the vehicle's current heading (USE_CURRENT_ANGLE)
    UseCurrentAngle,
    /// Aim the turtle along the vehicle-to-goal bearing (USE_ANGLE_TO_GOAL)
    UseAngleToGoal,
    /// Move East (EAST / WEST with negative distance)
    East(Operand),
    /// Move North (NORTH / SOUTH with negative distance)
    North(Operand),
    /// Set X, meters East of the origin (SET_X_POS)
    SetX(Operand),
    /// Set Y, meters North of the origin (SET_Y_POS)
    SetY(Operand),
    /// Set both coordinates at once (SET_POS)
    SetPos { x: i16, y: i16 },
    /// Adjust altitude (ALT_UP / ALT_DOWN with negative delta)
    ChangeAlt(Operand),
    /// Set altitude (SET_ALT)
    SetAlt(Operand),
    /// Adjust target speed (SPEED_INCREASE / SPEED_DECREASE)
    ChangeSpeed(Operand),
    /// Set target speed (SET_SPEED)
    SetSpeed(Operand),
    /// Stop waiting for arrival between moves (PEN_UP)
    PenUp,
    /// Wait for arrival after every move (PEN_DOWN)
    PenDown,
    /// Toggle the pen (PEN_TOGGLE)
    PenToggle,
    /// Select the active turtle (SET_TURTLE)
    SetTurtle(TurtleKind),
    /// Set a behavior flag (FLAG_ON)
    FlagOn(FlightFlags),
    /// Clear a behavior flag (FLAG_OFF)
    FlagOff(FlightFlags),
    /// Toggle a behavior flag (FLAG_TOGGLE)
    FlagToggle(FlightFlags),
    /// Loop the enclosed block n times (REPEAT / REPEAT_PARAM)
    Repeat(Operand),
    /// Loop the enclosed block forever (REPEAT_FOREVER)
    RepeatForever,
    /// Terminate a REPEAT, IF, or subroutine block (END)
    End,
    /// Conditional block entry (IF_EQ/NE/GT/LT/GE/LE)
    If {
        cmp: Comparison,
        value: SystemValue,
        rhs: i16,
    },
    /// Alternate branch of a conditional (ELSE)
    Else,
    /// Begin a subroutine definition (TO)
    To(SubroutineId),
    /// Call a subroutine; returns after its END (DO / DO_ARG / DO_PARAM)
    Do {
        subroutine: SubroutineId,
        param: Operand,
    },
    /// Tail-jump to a subroutine, discarding the whole call stack
    /// (EXEC / EXEC_ARG / EXEC_PARAM); never returns to the caller
    Exec {
        subroutine: SubroutineId,
        param: Operand,
    },
    /// Set the parameter register (PARAM_SET)
    ParamSet(i16),
    /// Add to the parameter register (PARAM_ADD / PARAM_SUB)
    ParamAdd(i16),
    /// Multiply the parameter register (PARAM_MUL)
    ParamMul(i16),
    /// Divide the parameter register (PARAM_DIV); divide-by-zero is a no-op
    ParamDiv(i16),
    /// Load a system value into the parameter register (LOAD_TO_PARAM)
    LoadToParam(SystemValue),
    /// Arm the interrupt handler subroutine (SET_INTERRUPT)
    SetInterrupt(SubroutineId),
    /// Disarm the interrupt handler (CLEAR_INTERRUPT)
    ClearInterrupt,
}

impl Instruction {
    /// True if executing this instruction changes the active turtle's goal
    /// position, altitude, or target speed. With the pen down, the engine
    /// suspends after any such instruction until the vehicle arrives.
    pub fn is_move(&self) -> bool {
        matches!(
            self,
            Instruction::Home
                | Instruction::Forward(_)
                | Instruction::UseCurrentPos
                | Instruction::East(_)
                | Instruction::North(_)
                | Instruction::SetX(_)
                | Instruction::SetY(_)
                | Instruction::SetPos { .. }
                | Instruction::ChangeAlt(_)
                | Instruction::SetAlt(_)
                | Instruction::ChangeSpeed(_)
                | Instruction::SetSpeed(_)
        )
    }
}

// ============================================================================
// LOGO-style constructor shorthand
// ============================================================================

/// Constructors mirroring the classic LOGO command names, so plans read like
/// the language they encode (`fd(100)`, `rt(90)`, `call_arg(SQUARE, 100)`).
impl Instruction {
    pub const fn fd(meters: i16) -> Self {
        Instruction::Forward(Operand::Literal(meters))
    }

    pub const fn bk(meters: i16) -> Self {
        Instruction::Forward(Operand::Literal(-meters))
    }

    pub const fn fd_param() -> Self {
        Instruction::Forward(Operand::Param)
    }

    pub const fn bk_param() -> Self {
        Instruction::Forward(Operand::NegParam)
    }

    pub const fn rt(degrees: i16) -> Self {
        Instruction::Turn(Operand::Literal(degrees))
    }

    pub const fn lt(degrees: i16) -> Self {
        Instruction::Turn(Operand::Literal(-degrees))
    }

    pub const fn rt_param() -> Self {
        Instruction::Turn(Operand::Param)
    }

    pub const fn lt_param() -> Self {
        Instruction::Turn(Operand::NegParam)
    }

    pub const fn set_angle(degrees: i16) -> Self {
        Instruction::SetHeading(Operand::Literal(degrees))
    }

    pub const fn set_angle_param() -> Self {
        Instruction::SetHeading(Operand::Param)
    }

    pub const fn east(meters: i16) -> Self {
        Instruction::East(Operand::Literal(meters))
    }

    pub const fn west(meters: i16) -> Self {
        Instruction::East(Operand::Literal(-meters))
    }

    pub const fn north(meters: i16) -> Self {
        Instruction::North(Operand::Literal(meters))
    }

    pub const fn south(meters: i16) -> Self {
        Instruction::North(Operand::Literal(-meters))
    }

    pub const fn set_x(meters: i16) -> Self {
        Instruction::SetX(Operand::Literal(meters))
    }

    pub const fn set_y(meters: i16) -> Self {
        Instruction::SetY(Operand::Literal(meters))
    }

    pub const fn set_pos(x: i16, y: i16) -> Self {
        Instruction::SetPos { x, y }
    }

    pub const fn alt_up(meters: i16) -> Self {
        Instruction::ChangeAlt(Operand::Literal(meters))
    }

    pub const fn alt_down(meters: i16) -> Self {
        Instruction::ChangeAlt(Operand::Literal(-meters))
    }

    pub const fn set_alt(meters: i16) -> Self {
        Instruction::SetAlt(Operand::Literal(meters))
    }

    pub const fn set_alt_param() -> Self {
        Instruction::SetAlt(Operand::Param)
    }

    pub const fn speed_increase(mps: i16) -> Self {
        Instruction::ChangeSpeed(Operand::Literal(mps))
    }

    pub const fn speed_decrease(mps: i16) -> Self {
        Instruction::ChangeSpeed(Operand::Literal(-mps))
    }

    pub const fn set_speed(mps: i16) -> Self {
        Instruction::SetSpeed(Operand::Literal(mps))
    }

    pub const fn repeat(count: i16) -> Self {
        Instruction::Repeat(Operand::Literal(count))
    }

    pub const fn repeat_param() -> Self {
        Instruction::Repeat(Operand::Param)
    }

    pub const fn if_eq(value: SystemValue, rhs: i16) -> Self {
        Instruction::If {
            cmp: Comparison::Eq,
            value,
            rhs,
        }
    }

    pub const fn if_ne(value: SystemValue, rhs: i16) -> Self {
        Instruction::If {
            cmp: Comparison::Ne,
            value,
            rhs,
        }
    }

    pub const fn if_gt(value: SystemValue, rhs: i16) -> Self {
        Instruction::If {
            cmp: Comparison::Gt,
            value,
            rhs,
        }
    }

    pub const fn if_lt(value: SystemValue, rhs: i16) -> Self {
        Instruction::If {
            cmp: Comparison::Lt,
            value,
            rhs,
        }
    }

    pub const fn if_ge(value: SystemValue, rhs: i16) -> Self {
        Instruction::If {
            cmp: Comparison::Ge,
            value,
            rhs,
        }
    }

    pub const fn if_le(value: SystemValue, rhs: i16) -> Self {
        Instruction::If {
            cmp: Comparison::Le,
            value,
            rhs,
        }
    }

    pub const fn to(id: SubroutineId) -> Self {
        Instruction::To(id)
    }

    /// DO: call a subroutine with parameter 0.
    pub const fn call(id: SubroutineId) -> Self {
        Instruction::Do {
            subroutine: id,
            param: Operand::Literal(0),
        }
    }

    /// DO_ARG: call a subroutine with a literal parameter.
    pub const fn call_arg(id: SubroutineId, param: i16) -> Self {
        Instruction::Do {
            subroutine: id,
            param: Operand::Literal(param),
        }
    }

    /// DO_PARAM: call a subroutine forwarding the current parameter.
    pub const fn call_param(id: SubroutineId) -> Self {
        Instruction::Do {
            subroutine: id,
            param: Operand::Param,
        }
    }

    /// EXEC: tail-jump to a subroutine with parameter 0.
    pub const fn exec(id: SubroutineId) -> Self {
        Instruction::Exec {
            subroutine: id,
            param: Operand::Literal(0),
        }
    }

    /// EXEC_ARG: tail-jump with a literal parameter.
    pub const fn exec_arg(id: SubroutineId, param: i16) -> Self {
        Instruction::Exec {
            subroutine: id,
            param: Operand::Literal(param),
        }
    }

    /// EXEC_PARAM: tail-jump forwarding the current parameter.
    pub const fn exec_param(id: SubroutineId) -> Self {
        Instruction::Exec {
            subroutine: id,
            param: Operand::Param,
        }
    }

    pub const fn param_set(value: i16) -> Self {
        Instruction::ParamSet(value)
    }

    pub const fn param_add(value: i16) -> Self {
        Instruction::ParamAdd(value)
    }

    pub const fn param_sub(value: i16) -> Self {
        Instruction::ParamAdd(-value)
    }

    pub const fn param_mul(value: i16) -> Self {
        Instruction::ParamMul(value)
    }

    pub const fn param_div(value: i16) -> Self {
        Instruction::ParamDiv(value)
    }

    pub const fn load_to_param(value: SystemValue) -> Self {
        Instruction::LoadToParam(value)
    }

    pub const fn set_interrupt(id: SubroutineId) -> Self {
        Instruction::SetInterrupt(id)
    }
}
