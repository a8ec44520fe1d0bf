//! Turns a handler's raw instruction bytes into a flat, jump-resolved
//! instruction stream and tags its loop-shaped jumps, ready for
//! [`crate::ast::lifter`] to rebuild an expression tree from.

mod loop_tagger;
mod opcode;
mod reader;

pub use loop_tagger::{LoopKind, LoopTagger, TaggedLoop};
pub use opcode::{Instruction, Opcode, OperandWidth};
pub use reader::DecodedHandler;
