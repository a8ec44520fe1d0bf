//! Classifies `jmpifz`/`endrepeat` instruction pairs into the loop shape
//! the Lingo compiler generated them from (`repeat while`, `repeat with ...
//! in`, `repeat with ... to`, `repeat with ... downto`), so the AST lifter
//! can emit the original loop header instead of raw jumps.
//!
//! `repeat with ... in` and `repeat with ... to/downto` aren't free-form:
//! the compiler always emits the same fixed instruction sequence around the
//! loop variable, so they're detected by matching that sequence rather than
//! by a loose shape heuristic. Anything that doesn't match either fixed
//! fingerprint falls back to `repeat while`, which is always a valid (if
//! less faithful) reading of the same bytecode.

use std::collections::HashMap;

use super::opcode::Opcode;
use super::reader::DecodedHandler;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopKind {
    While,
    RepeatWithTo,
    RepeatWithDownTo,
    RepeatWithIn,
}

#[derive(Clone, Copy, Debug)]
pub struct TaggedLoop {
    pub kind: LoopKind,
    /// Index of the `jmpifz` that guards the loop body.
    pub guard_index: usize,
    /// Index of the backward `jmp` (classic `repeat`) or `endrepeat`
    /// instruction that closes the loop.
    pub end_index: usize,
    /// First instruction index inside the loop body proper, past any
    /// fixed counter/iterator prelude the fingerprint matched.
    pub body_start: usize,
    /// Last instruction index (exclusive) inside the loop body proper,
    /// before any fixed counter/iterator tail the fingerprint matched.
    pub body_end: usize,
    /// First instruction index after the loop.
    pub exit_index: usize,
    /// Index of the `Set*` instruction that names this loop's control
    /// variable, if the fingerprint recovered one.
    pub var_instr: Option<usize>,
}

/// Loops keyed by their guard instruction's index.
pub struct LoopTagger {
    pub loops: HashMap<usize, TaggedLoop>,
}

impl LoopTagger {
    #[must_use]
    pub fn tag(handler: &DecodedHandler) -> Self {
        let mut loops = HashMap::new();

        for (i, instr) in handler.instructions.iter().enumerate() {
            if instr.opcode != Opcode::JmpIfZero {
                continue;
            }
            let exit_offset = (instr.offset as i64 + instr.operand) as u32;
            let exit_index = handler.index_at(exit_offset);
            if exit_index <= i || exit_index > handler.instructions.len() {
                continue;
            }

            // The instruction immediately before the exit point is either
            // an `EndRepeat` (dedicated loop-close opcode) or a backward
            // `Jmp` to the guard (classic `repeat while` encoding).
            let Some(closer_index) = exit_index.checked_sub(1) else { continue };
            let Some(closer) = handler.instructions.get(closer_index) else { continue };
            let closes_loop = match closer.opcode {
                Opcode::EndRepeat => true,
                Opcode::Jmp => {
                    let target = (closer.offset as i64 + closer.operand) as u32;
                    handler.index_at(target) <= i
                },
                _ => false,
            };
            if !closes_loop {
                continue;
            }

            let (kind, body_start, body_end, var_instr) = classify(handler, i, closer_index);
            loops.insert(i, TaggedLoop { kind, guard_index: i, end_index: closer_index, body_start, body_end, exit_index, var_instr });
        }

        Self { loops }
    }
}

/// The fixed 13-instruction `repeat with ... in` sequence straddles the
/// guard jump: a 7-instruction condition prelude computes `index <= count`,
/// a 5-instruction prelude inside the body fetches `list[index]` into the
/// loop variable, and a 3-instruction tail increments the index and drops
/// the scratch values before the loop closes.
fn classify(handler: &DecodedHandler, guard_index: usize, end_index: usize) -> (LoopKind, usize, usize, Option<usize>) {
    if guard_index >= 7 {
        let pre = &handler.instructions[guard_index - 7..guard_index];
        if matches_in_pre(pre) && end_index >= guard_index + 6 {
            let post = &handler.instructions[guard_index + 1..guard_index + 6];
            if matches_in_post(post) {
                let var_instr = guard_index + 5;
                let tail_ok = end_index >= 3 && matches_in_tail(&handler.instructions[end_index - 3..end_index]);
                let body_end = if tail_ok { end_index - 3 } else { end_index };
                return (LoopKind::RepeatWithIn, guard_index + 6, body_end, Some(var_instr));
            }
        }
    }

    if guard_index >= 1 && end_index >= guard_index + 1 + 4 {
        let cond = handler.instructions[guard_index - 1].opcode;
        if matches!(cond, Opcode::Le | Opcode::Ge) {
            let tail = &handler.instructions[end_index - 4..end_index];
            if matches_counter_tail(tail, cond == Opcode::Ge) {
                let kind = if cond == Opcode::Ge { LoopKind::RepeatWithDownTo } else { LoopKind::RepeatWithTo };
                return (kind, guard_index + 1, end_index - 4, Some(end_index - 1));
            }
        }
    }

    (LoopKind::While, guard_index + 1, end_index, None)
}

fn matches_in_pre(instrs: &[super::opcode::Instruction]) -> bool {
    instrs.len() == 7
        && instrs[0].opcode == Opcode::Peek && instrs[0].operand == 0
        && instrs[1].opcode == Opcode::PushArgList && instrs[1].operand == 1
        && instrs[2].opcode == Opcode::ExtCall
        && instrs[3].opcode == Opcode::PushInt && instrs[3].operand == 1
        && instrs[4].opcode == Opcode::Peek && instrs[4].operand == 0
        && instrs[5].opcode == Opcode::Peek && instrs[5].operand == 2
        && instrs[6].opcode == Opcode::Le
}

fn matches_in_post(instrs: &[super::opcode::Instruction]) -> bool {
    instrs.len() == 5
        && instrs[0].opcode == Opcode::Peek && instrs[0].operand == 2
        && instrs[1].opcode == Opcode::Peek && instrs[1].operand == 1
        && instrs[2].opcode == Opcode::PushArgList && instrs[2].operand == 2
        && instrs[3].opcode == Opcode::ExtCall
        && is_set_opcode(instrs[4].opcode)
}

fn matches_in_tail(instrs: &[super::opcode::Instruction]) -> bool {
    instrs.len() == 3
        && instrs[0].opcode == Opcode::PushInt && instrs[0].operand == 1
        && instrs[1].opcode == Opcode::Add
        && instrs[2].opcode == Opcode::Pop && instrs[2].operand == 3
}

fn matches_counter_tail(instrs: &[super::opcode::Instruction], down: bool) -> bool {
    instrs.len() == 4
        && instrs[0].opcode == Opcode::PushInt && instrs[0].operand == 1
        && is_get_opcode(instrs[1].opcode)
        && instrs[2].opcode == if down { Opcode::Sub } else { Opcode::Add }
        && is_set_opcode(instrs[3].opcode)
}

fn is_get_opcode(opcode: Opcode) -> bool {
    matches!(opcode, Opcode::GetGlobal | Opcode::GetGlobal2 | Opcode::GetProperty | Opcode::GetParam | Opcode::GetLocal)
}

fn is_set_opcode(opcode: Opcode) -> bool {
    matches!(opcode, Opcode::SetGlobal | Opcode::SetGlobal2 | Opcode::SetProperty | Opcode::SetParam | Opcode::SetLocal)
}
