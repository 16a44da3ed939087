//! Program Store
//!
//! Validates an instruction table once, at load time, and resolves every
//! control-flow edge into a side table of links. The execution engine then
//! takes conditional skips and loop exits in O(1) with no runtime scanning,
//! and a malformed plan is rejected before the vehicle ever flies it.
//!
//! Block structure is strict: every REPEAT, REPEAT_FOREVER, IF, and TO must
//! be closed by a matching END, ELSE may only appear directly inside an IF,
//! and TO may only appear at the top level.

use core::fmt;

use heapless::Vec;

use crate::program::{Instruction, SubroutineId};

/// Capacity of one program's instruction table.
pub const MAX_INSTRUCTIONS: usize = 512;

/// Maximum distinct subroutines per program.
pub const MAX_SUBROUTINES: usize = 32;

/// Maximum statically nested blocks the loader tracks. This bounds source
/// nesting only; the runtime call/loop stack has its own, smaller limit.
const MAX_OPEN_BLOCKS: usize = 64;

/// Why a program was rejected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// DO, EXEC, or SET_INTERRUPT names a subroutine no TO defines
    UnresolvedSymbol { subroutine: SubroutineId },
    /// Two TO blocks define the same identifier
    DuplicateSubroutine { subroutine: SubroutineId },
    /// ELSE outside an IF block, or a second ELSE in the same IF
    UnexpectedElse { pc: u16 },
    /// A block was opened and never closed by END
    UnterminatedBlock { pc: u16 },
    /// TO inside a loop, conditional, or another subroutine
    NestedSubroutine { pc: u16 },
    /// Instruction table exceeds [`MAX_INSTRUCTIONS`]
    ProgramTooLarge,
    /// More than [`MAX_SUBROUTINES`] TO blocks
    TooManySubroutines,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::UnresolvedSymbol { subroutine } => {
                write!(f, "reference to undefined subroutine {}", subroutine)
            }
            LoadError::DuplicateSubroutine { subroutine } => {
                write!(f, "subroutine {} defined twice", subroutine)
            }
            LoadError::UnexpectedElse { pc } => write!(f, "unexpected ELSE at {}", pc),
            LoadError::UnterminatedBlock { pc } => {
                write!(f, "block opened at {} has no END", pc)
            }
            LoadError::NestedSubroutine { pc } => {
                write!(f, "TO at {} is not at top level", pc)
            }
            LoadError::ProgramTooLarge => write!(f, "program exceeds instruction capacity"),
            LoadError::TooManySubroutines => write!(f, "too many subroutines"),
        }
    }
}

/// Which construct an END closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockKind {
    Loop,
    If,
    /// Subroutine END, or the main-body terminator
    Subroutine,
}

/// Resolved control-flow edge for one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Link {
    /// No control-flow edge
    None,
    /// IF: where to resume when the condition is false
    IfFalse(u16),
    /// ELSE reached from the true branch: skip to after the END
    ElseEnd(u16),
    /// REPEAT with a non-positive count: skip past the END
    LoopExit(u16),
    /// END, tagged with the construct it closes
    End(BlockKind),
}

#[derive(Debug, Clone, Copy)]
enum OpenKind {
    Loop,
    If { else_idx: Option<u16> },
    Subroutine,
}

#[derive(Debug, Clone, Copy)]
struct OpenBlock {
    kind: OpenKind,
    start: u16,
}

/// A validated, immutable program with every control edge pre-resolved.
#[derive(Debug, Clone)]
pub struct ResolvedProgram {
    instructions: Vec<Instruction, MAX_INSTRUCTIONS>,
    links: Vec<Link, MAX_INSTRUCTIONS>,
    subroutines: Vec<(SubroutineId, u16), MAX_SUBROUTINES>,
}

impl ResolvedProgram {
    /// Validate an instruction table and resolve its control flow.
    pub fn load(source: &[Instruction]) -> Result<Self, LoadError> {
        if source.len() > MAX_INSTRUCTIONS {
            return Err(LoadError::ProgramTooLarge);
        }

        let mut links: Vec<Link, MAX_INSTRUCTIONS> = Vec::new();
        for _ in 0..source.len() {
            // len() <= capacity, checked above
            let _ = links.push(Link::None);
        }

        let mut subroutines: Vec<(SubroutineId, u16), MAX_SUBROUTINES> = Vec::new();
        let mut open: Vec<OpenBlock, MAX_OPEN_BLOCKS> = Vec::new();

        for (idx, instruction) in source.iter().enumerate() {
            let pc = idx as u16;
            match instruction {
                Instruction::Repeat(_) | Instruction::RepeatForever => {
                    open.push(OpenBlock {
                        kind: OpenKind::Loop,
                        start: pc,
                    })
                    .map_err(|_| LoadError::ProgramTooLarge)?;
                }
                Instruction::If { .. } => {
                    open.push(OpenBlock {
                        kind: OpenKind::If { else_idx: None },
                        start: pc,
                    })
                    .map_err(|_| LoadError::ProgramTooLarge)?;
                }
                Instruction::Else => match open.last_mut() {
                    Some(OpenBlock {
                        kind: OpenKind::If { else_idx: else_idx @ None },
                        ..
                    }) => *else_idx = Some(pc),
                    _ => return Err(LoadError::UnexpectedElse { pc }),
                },
                Instruction::To(id) => {
                    if !open.is_empty() {
                        return Err(LoadError::NestedSubroutine { pc });
                    }
                    if subroutines.iter().any(|(existing, _)| existing == id) {
                        return Err(LoadError::DuplicateSubroutine { subroutine: *id });
                    }
                    subroutines
                        .push((*id, pc + 1))
                        .map_err(|_| LoadError::TooManySubroutines)?;
                    open.push(OpenBlock {
                        kind: OpenKind::Subroutine,
                        start: pc,
                    })
                    .map_err(|_| LoadError::ProgramTooLarge)?;
                }
                Instruction::End => match open.pop() {
                    Some(OpenBlock {
                        kind: OpenKind::Loop,
                        start,
                    }) => {
                        links[start as usize] = Link::LoopExit(pc + 1);
                        links[idx] = Link::End(BlockKind::Loop);
                    }
                    Some(OpenBlock {
                        kind: OpenKind::If { else_idx },
                        start,
                    }) => {
                        let false_target = match else_idx {
                            Some(else_pc) => {
                                links[else_pc as usize] = Link::ElseEnd(pc + 1);
                                else_pc + 1
                            }
                            None => pc + 1,
                        };
                        links[start as usize] = Link::IfFalse(false_target);
                        links[idx] = Link::End(BlockKind::If);
                    }
                    Some(OpenBlock {
                        kind: OpenKind::Subroutine,
                        ..
                    })
                    // Top-level END terminates the main body; at runtime it
                    // behaves exactly like a subroutine END on an empty stack
                    | None => {
                        links[idx] = Link::End(BlockKind::Subroutine);
                    }
                },
                _ => {}
            }
        }

        if let Some(block) = open.first() {
            return Err(LoadError::UnterminatedBlock { pc: block.start });
        }

        let mut instructions: Vec<Instruction, MAX_INSTRUCTIONS> = Vec::new();
        for instruction in source {
            // len() <= capacity, checked above
            let _ = instructions.push(*instruction);

            let target = match instruction {
                Instruction::Do { subroutine, .. }
                | Instruction::Exec { subroutine, .. }
                | Instruction::SetInterrupt(subroutine) => Some(*subroutine),
                _ => None,
            };
            if let Some(id) = target {
                if !subroutines.iter().any(|(existing, _)| *existing == id) {
                    return Err(LoadError::UnresolvedSymbol { subroutine: id });
                }
            }
        }

        Ok(Self {
            instructions,
            links,
            subroutines,
        })
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instruction_at(&self, pc: u16) -> Option<&Instruction> {
        self.instructions.get(pc as usize)
    }

    pub(crate) fn link_at(&self, pc: u16) -> Link {
        self.links.get(pc as usize).copied().unwrap_or(Link::None)
    }

    /// First instruction after the subroutine's TO marker.
    pub fn subroutine_entry(&self, id: SubroutineId) -> Option<u16> {
        self.subroutines
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, entry)| *entry)
    }
}
