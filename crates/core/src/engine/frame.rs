//! Loop/Call Stack
//!
//! REPEAT blocks and DO calls share one fixed-depth stack, so a plan can
//! trade loop depth for call depth but never exceed the combined limit.
//! IF blocks consume no frame; their skips are resolved at load time.

use heapless::Vec;

use crate::engine::RuntimeError;
use crate::program::SubroutineId;

/// Combined nesting limit for loops and subroutine calls.
pub const MAX_NESTING: usize = 12;

/// Remaining iterations of a loop frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCount {
    Finite(u16),
    Forever,
}

/// One level of loop or call nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Loop {
        /// First instruction of the loop body
        body_start: u16,
        remaining: LoopCount,
    },
    Call {
        /// Instruction after the DO
        return_pc: u16,
        /// Caller's parameter register, restored on return
        saved_param: i16,
        subroutine: SubroutineId,
    },
}

/// Fixed-capacity stack of [`Frame`]s.
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<Frame, MAX_NESTING>,
}

impl CallStack {
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: Frame) -> Result<(), RuntimeError> {
        self.frames
            .push(frame)
            .map_err(|_| RuntimeError::StackOverflow)
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn top_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
