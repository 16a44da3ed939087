//! Runtime faults

use core::fmt;

/// Fault raised while executing a loaded program.
///
/// Load-time validation keeps most malformed plans out; these are the
/// conditions that can only surface at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeError {
    /// Combined loop/call nesting exceeded the stack capacity
    StackOverflow,
    /// Program counter left the instruction table through a corrupted edge
    PcOutOfRange { pc: u16 },
    /// Interrupt handler failed to finish within its per-tick budget
    InterruptDeadline,
    /// An END's frame did not match the construct it closes
    ControlFlowCorrupt { pc: u16 },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::StackOverflow => write!(f, "call/loop stack overflow"),
            RuntimeError::PcOutOfRange { pc } => {
                write!(f, "program counter {} out of range", pc)
            }
            RuntimeError::InterruptDeadline => {
                write!(f, "interrupt handler exceeded its budget")
            }
            RuntimeError::ControlFlowCorrupt { pc } => {
                write!(f, "control flow corrupt at {}", pc)
            }
        }
    }
}
