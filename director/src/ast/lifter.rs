//! Rebuilds an expression/statement tree from a handler's flat, jump-
//! resolved instruction stream.
//!
//! The lifter walks instructions left to right over an explicit `Vec<Expr>`
//! operand stack, exactly mirroring what the Lingo VM itself does at
//! runtime. Jumps are handled structurally instead of by literal goto
//! translation: a tagged loop (see [`crate::bytecode::LoopTagger`]) becomes
//! a `repeat` statement whose body is lifted from the jump target range, a
//! `Peek`/compare/`jmpifz` chain becomes a `case` statement, a
//! `StartTell`/`EndTell` bracket becomes a `tell` block, and an untagged
//! `jmpifz` becomes an `if`/`else`. Any opcode this module doesn't model
//! falls back to a comment rather than failing the whole handler — most
//! scripts only use a small, well-known subset of the instruction set, and
//! a partially-decompiled handler is far more useful than none at all.

use crate::bytecode::{DecodedHandler, Instruction, LoopKind, LoopTagger, Opcode, TaggedLoop};
use crate::name::NameContext;
use crate::resources::Handler;
use crate::Version;

use super::datum::Datum;
use super::node::{BinOp, ChunkKind, Expr, PutMode, Stmt, UnOp};

struct Lifter<'a> {
    decoded: &'a DecodedHandler,
    loops: &'a LoopTagger,
    handler: &'a Handler,
    names: &'a NameContext,
    version: Version,
}

#[must_use]
pub fn lift(handler: &Handler, decoded: &DecodedHandler, names: &NameContext, version: Version) -> Vec<Stmt> {
    let loops = LoopTagger::tag(decoded);
    let lifter = Lifter { decoded, loops: &loops, handler, names, version };
    let mut stack = Vec::new();
    lifter.lift_range(0, decoded.instructions.len(), &mut stack)
}

fn pop(stack: &mut Vec<Expr>) -> Expr {
    stack.pop().unwrap_or(Expr::Literal(Datum::Void))
}

fn pop_n(stack: &mut Vec<Expr>, count: usize) -> Vec<Expr> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(pop(stack));
    }
    items.reverse();
    items
}

fn is_literal_zero(expr: &Expr) -> bool {
    matches!(expr, Expr::Literal(Datum::Int(0)))
}

fn chunk_kind_for_property_id(id: i64) -> ChunkKind {
    match id {
        0x0B => ChunkKind::Char,
        0x0C => ChunkKind::Word,
        0x0D => ChunkKind::Item,
        _ => ChunkKind::Line,
    }
}

fn put_mode(put_type: i64) -> PutMode {
    match put_type {
        1 => PutMode::After,
        2 => PutMode::Before,
        _ => PutMode::Into,
    }
}

fn datum_label(expr: &Expr) -> String {
    match expr {
        Expr::Literal(Datum::Symbol(name) | Datum::String(name)) => name.clone(),
        Expr::Literal(Datum::Int(value)) => value.to_string(),
        other => format!("{other:?}"),
    }
}

struct ChunkBounds {
    first_line: Expr,
    last_line: Expr,
    first_item: Expr,
    last_item: Expr,
    first_word: Expr,
    last_word: Expr,
    first_char: Expr,
    last_char: Expr,
}

impl<'a> Lifter<'a> {
    fn lift_range(&self, start: usize, end: usize, stack: &mut Vec<Expr>) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        let mut i = start;

        while i < end {
            if let Some(loop_) = self.loops.loops.get(&i) {
                stmts.push(self.lift_loop(loop_, stack));
                i = loop_.exit_index;
                continue;
            }

            let instr = &self.decoded.instructions[i];

            if instr.opcode == Opcode::Peek {
                if let Some((stmt, next)) = self.try_lift_case(i, stack) {
                    stmts.push(stmt);
                    i = next;
                    continue;
                }
            }

            if instr.opcode == Opcode::StartTell {
                let end_tell = (i + 1..end).find(|&k| self.decoded.instructions[k].opcode == Opcode::EndTell).unwrap_or(end);
                let window = pop(stack);
                let body = self.lift_range(i + 1, end_tell, &mut Vec::new());
                stmts.push(Stmt::Tell { window, body });
                i = end_tell + 1;
                continue;
            }

            if instr.opcode == Opcode::JmpIfZero {
                let (stmt, next) = self.lift_if(i, stack);
                stmts.push(stmt);
                i = next;
                continue;
            }

            if let Some(stmt) = self.lift_instruction(instr, stack) {
                stmts.push(stmt);
            }
            i += 1;
        }

        // Any value still on the stack at the end of a block is a
        // discarded call result (e.g. `beep()` used as a statement).
        while let Some(expr) = stack.pop() {
            stmts.push(Stmt::Expr(expr));
        }

        stmts
    }

    fn lift_loop(&self, loop_: &TaggedLoop, stack: &mut Vec<Expr>) -> Stmt {
        let default_var = if loop_.kind == LoopKind::RepeatWithIn { "item" } else { "counter" };
        let var = loop_.var_instr.map(|idx| self.loop_var_name(idx)).unwrap_or_else(|| default_var.to_string());

        match loop_.kind {
            LoopKind::While => {
                let cond = pop(stack);
                let body = self.lift_range(loop_.body_start, loop_.body_end, &mut Vec::new());
                Stmt::While { cond, body }
            },
            LoopKind::RepeatWithTo | LoopKind::RepeatWithDownTo => {
                let to = pop(stack);
                let from = pop(stack);
                let body = self.lift_range(loop_.body_start, loop_.body_end, &mut Vec::new());
                Stmt::RepeatWithTo { var, from, to, down: loop_.kind == LoopKind::RepeatWithDownTo, body }
            },
            LoopKind::RepeatWithIn => {
                let list = pop(stack);
                let body = self.lift_range(loop_.body_start, loop_.body_end, &mut Vec::new());
                Stmt::RepeatWithIn { var, list, body }
            },
        }
    }

    fn loop_var_name(&self, instr_index: usize) -> String {
        let Some(instr) = self.decoded.instructions.get(instr_index) else {
            return "item".to_string();
        };
        match instr.opcode {
            Opcode::SetGlobal | Opcode::SetGlobal2 => self.resolve(&self.handler.global_name_indices, instr.operand),
            Opcode::SetProperty => self.resolve(&self.handler.property_name_indices, instr.operand),
            Opcode::SetParam => self.resolve_slot(&self.handler.argument_name_indices, instr.operand),
            Opcode::SetLocal => self.resolve_slot(&self.handler.local_name_indices, instr.operand),
            _ => "item".to_string(),
        }
    }

    /// Returns the statement and the instruction index to resume at.
    fn lift_if(&self, guard_index: usize, stack: &mut Vec<Expr>) -> (Stmt, usize) {
        let guard = &self.decoded.instructions[guard_index];
        let cond = pop(stack);
        let then_end = self.decoded.index_at((guard.offset as i64 + guard.operand) as u32);

        // An `if` with an `else` ends its `then` branch with an
        // unconditional jump past the `else` branch.
        if then_end > guard_index + 1 {
            if let Some(closer) = self.decoded.instructions.get(then_end - 1) {
                if closer.opcode == Opcode::Jmp {
                    let else_end = self.decoded.index_at((closer.offset as i64 + closer.operand) as u32);
                    if else_end >= then_end {
                        let then_branch = self.lift_range(guard_index + 1, then_end - 1, &mut Vec::new());
                        let else_branch = self.lift_range(then_end, else_end, &mut Vec::new());
                        return (Stmt::If { cond, then_branch, else_branch }, else_end);
                    }
                }
            }
        }

        let then_branch = self.lift_range(guard_index + 1, then_end, &mut Vec::new());
        (Stmt::If { cond, then_branch, else_branch: Vec::new() }, then_end)
    }

    /// Recognizes a `case` label chain: `Peek n`, a label expression,
    /// `Eq`/`Ne`, `JmpIfZero`. Each label's body runs from the jump's
    /// fallthrough to its target, minus a trailing `Jmp` to the case's end
    /// and the `Pop` that drops the duplicated subject once it matches.
    /// Falls back to `None` (letting `Peek` lift as a plain stack op) if
    /// the shape doesn't hold.
    fn try_lift_case(&self, start: usize, stack: &mut Vec<Expr>) -> Option<(Stmt, usize)> {
        if self.decoded.instructions.get(start)?.opcode != Opcode::Peek {
            return None;
        }
        let subject = stack.last().cloned()?;
        let mut arms = Vec::new();
        let mut label_index = start;

        loop {
            let mut cursor = label_index + 1;
            let mut label_stack = Vec::new();
            loop {
                let instr = self.decoded.instructions.get(cursor)?;
                if matches!(instr.opcode, Opcode::Eq | Opcode::Ne) {
                    break;
                }
                if matches!(instr.opcode, Opcode::JmpIfZero | Opcode::Jmp | Opcode::Peek) {
                    return None;
                }
                self.lift_instruction(instr, &mut label_stack);
                cursor += 1;
            }
            let label = pop(&mut label_stack);
            cursor += 1;

            let jmp = self.decoded.instructions.get(cursor)?;
            if jmp.opcode != Opcode::JmpIfZero {
                return None;
            }
            let target = self.decoded.index_at((jmp.offset as i64 + jmp.operand) as u32);
            let body_start = cursor + 1;
            let has_trailing_jmp =
                target > body_start && self.decoded.instructions.get(target - 1).map(|i| i.opcode) == Some(Opcode::Jmp);
            let mut body_end = if has_trailing_jmp { target - 1 } else { target };
            if body_end > body_start && self.decoded.instructions.get(body_end - 1).map(|i| i.opcode) == Some(Opcode::Pop) {
                body_end -= 1;
            }
            let body = self.lift_range(body_start, body_end, &mut Vec::new());
            arms.push((vec![label], body));

            match self.decoded.instructions.get(target).map(|i| i.opcode) {
                Some(Opcode::Peek) => {
                    label_index = target;
                    continue;
                },
                Some(Opcode::Pop) => {
                    stack.pop();
                    return Some((Stmt::Case { subject, arms, otherwise: Vec::new() }, target + 1));
                },
                _ => {
                    let otherwise_end = (target..self.decoded.instructions.len())
                        .find(|&k| self.decoded.instructions[k].opcode == Opcode::Pop)
                        .unwrap_or(self.decoded.instructions.len());
                    let otherwise = self.lift_range(target, otherwise_end, &mut Vec::new());
                    stack.pop();
                    return Some((
                        Stmt::Case { subject, arms, otherwise },
                        (otherwise_end + 1).min(self.decoded.instructions.len()),
                    ));
                },
            }
        }
    }

    fn pop_chunk_bounds(&self, stack: &mut Vec<Expr>) -> ChunkBounds {
        let last_char = pop(stack);
        let first_char = pop(stack);
        let last_word = pop(stack);
        let first_word = pop(stack);
        let last_item = pop(stack);
        let first_item = pop(stack);
        let last_line = pop(stack);
        let first_line = pop(stack);
        ChunkBounds { first_line, last_line, first_item, last_item, first_word, last_word, first_char, last_char }
    }

    /// Wraps `of` in nested `char of word of item of line of ...` chunk
    /// expressions, skipping any layer whose `first` bound is the literal
    /// `0` (meaning that layer wasn't addressed).
    fn wrap_chunk_bounds(&self, bounds: ChunkBounds, of: Expr) -> Expr {
        let target = wrap_chunk_layer(ChunkKind::Line, bounds.first_line, bounds.last_line, of);
        let target = wrap_chunk_layer(ChunkKind::Item, bounds.first_item, bounds.last_item, target);
        let target = wrap_chunk_layer(ChunkKind::Word, bounds.first_word, bounds.last_word, target);
        wrap_chunk_layer(ChunkKind::Char, bounds.first_char, bounds.last_char, target)
    }

    /// Resolves a `Put`/`PutChunk`/`DeleteChunk` variable-type nibble to
    /// the reference it names. Types 1-5 (global/property/argument/
    /// local) reuse whatever reference expression the preceding
    /// `PushVarRef`/`Get*` already built and left on the stack; type 6
    /// (field reference) pops its own cast id (Director 5+) and field id
    /// instead, since there's no single prior push for it.
    fn resolve_var_type(&self, var_type: i64, stack: &mut Vec<Expr>) -> Expr {
        if var_type == 6 {
            let field_id = pop(stack);
            let cast = if self.version.0 >= 500 { pop(stack) } else { Expr::Literal(Datum::Int(0)) };
            return Expr::FieldRef { cast: Box::new(cast), field: Box::new(field_id) };
        }
        pop(stack)
    }

    fn read_v4_property(&self, category: i64, id: i64, stack: &mut Vec<Expr>) -> Expr {
        match category {
            0 if id >= 0x0B => {
                let of = pop(stack);
                Expr::LastChunk { kind: chunk_kind_for_property_id(id), of: Box::new(of) }
            },
            1 => {
                let of = pop(stack);
                Expr::ChunkCount { kind: chunk_kind_for_property_id(id), of: Box::new(of) }
            },
            8 if id == 2 && self.version.0 >= 500 => {
                let lib = pop(stack);
                Expr::CastLibProperty { prop: "fileName".to_string(), lib: Box::new(lib) }
            },
            _ => Expr::RawProperty { category, id, of: None },
        }
    }

    fn lift_obj_call(&self, instr: &Instruction, stack: &mut Vec<Expr>) -> Option<Stmt> {
        let mut args = match pop(stack) {
            Expr::List(args) => args,
            other => vec![other],
        };
        let receiver = pop(stack);
        let method = self.names.name(instr.operand as u16).unwrap_or("unknownMethod").to_string();

        match method.as_str() {
            "getAt" if !args.is_empty() => {
                let index = args.remove(0);
                stack.push(Expr::Index { base: Box::new(receiver), index: Box::new(index) });
            },
            "setAt" if args.len() >= 2 => {
                let index = args.remove(0);
                let value = args.remove(0);
                return Some(Stmt::Assign {
                    target: Expr::Index { base: Box::new(receiver), index: Box::new(index) },
                    value,
                });
            },
            "getProp" | "getPropRef" if !args.is_empty() => {
                let prop = datum_label(&args.remove(0));
                let mut expr = Expr::ObjectProperty { object: Box::new(receiver), prop };
                if let Some(index) = args.into_iter().next() {
                    expr = Expr::Index { base: Box::new(expr), index: Box::new(index) };
                }
                stack.push(expr);
            },
            "setProp" if args.len() >= 2 => {
                let prop = datum_label(&args.remove(0));
                let first = args.remove(0);
                let (target, value) = match args.into_iter().next() {
                    Some(value) => (
                        Expr::Index {
                            base: Box::new(Expr::ObjectProperty { object: Box::new(receiver), prop }),
                            index: Box::new(first),
                        },
                        value,
                    ),
                    None => (Expr::ObjectProperty { object: Box::new(receiver), prop }, first),
                };
                return Some(Stmt::Assign { target, value });
            },
            "setContentsAfter" => {
                let value = args.into_iter().next().unwrap_or(Expr::Literal(Datum::Void));
                return Some(Stmt::Put { value, target: Some(receiver), mode: PutMode::After });
            },
            "setContentsBefore" => {
                let value = args.into_iter().next().unwrap_or(Expr::Literal(Datum::Void));
                return Some(Stmt::Put { value, target: Some(receiver), mode: PutMode::Before });
            },
            "setContents" => {
                let value = args.into_iter().next().unwrap_or(Expr::Literal(Datum::Void));
                return Some(Stmt::Put { value, target: Some(receiver), mode: PutMode::Into });
            },
            "count" if args.len() == 1 => {
                let prop = datum_label(&args[0]);
                stack.push(Expr::ObjectProperty {
                    object: Box::new(Expr::ObjectProperty { object: Box::new(receiver), prop }),
                    prop: "count".to_string(),
                });
            },
            "hilite" => return Some(Stmt::Hilite(receiver)),
            "delete" => return Some(Stmt::Delete(receiver)),
            _ => {
                let call = Expr::ObjCall { receiver: Box::new(receiver), name: method, args };
                if instr.opcode == Opcode::ObjCallV4 {
                    return Some(Stmt::Expr(call));
                }
                stack.push(call);
            },
        }
        None
    }

    fn lift_instruction(&self, instr: &Instruction, stack: &mut Vec<Expr>) -> Option<Stmt> {
        use Opcode::*;

        match instr.opcode {
            Ret | RetFactory => {
                let value = stack.pop();
                return Some(Stmt::Return(value));
            },
            PushZero => stack.push(Expr::Literal(Datum::Int(0))),
            PushInt => stack.push(Expr::Literal(Datum::Int(instr.operand))),
            PushFloat => stack.push(Expr::Literal(Datum::Float(f64::from(f32::from_bits(instr.operand as u32))))),
            PushConstant => stack.push(Expr::Literal(Datum::Int(instr.operand))),
            PushSymbol => {
                let name = self.names.name(instr.operand as u16).unwrap_or("unknown").to_string();
                stack.push(Expr::Literal(Datum::Symbol(name)));
            },
            PushVarRef | PushChunkVarRef => {
                let var_type = instr.operand & 0xF;
                let raw_id = instr.operand >> 4;
                let expr = match var_type {
                    3 => Expr::Property(self.resolve(&self.handler.property_name_indices, raw_id)),
                    4 => Expr::Param(self.resolve_slot(&self.handler.argument_name_indices, raw_id)),
                    5 => Expr::Var(self.resolve_slot(&self.handler.local_name_indices, raw_id)),
                    _ => Expr::Global(self.names.name(raw_id as u16).unwrap_or("unknown").to_string()),
                };
                stack.push(expr);
            },
            Peek => {
                let depth = instr.operand.max(0) as usize;
                let value = stack.len().checked_sub(depth + 1).and_then(|idx| stack.get(idx).cloned());
                stack.push(value.unwrap_or(Expr::Literal(Datum::Void)));
            },
            Pop => {
                let count = (instr.operand.max(0) as usize).max(1);
                for _ in 0..count {
                    stack.pop();
                }
            },
            Swap => {
                let len = stack.len();
                if len >= 2 {
                    stack.swap(len - 1, len - 2);
                }
            },
            Mul | Add | Sub | Div | Modulo | Lt | Le | Gt | Ge | Eq | Ne | And | Or | Contains | Starts => {
                let rhs = pop(stack);
                let lhs = pop(stack);
                stack.push(Expr::Binary { op: bin_op(instr.opcode), lhs: Box::new(lhs), rhs: Box::new(rhs) });
            },
            AmpConcat => {
                let rhs = pop(stack);
                let lhs = pop(stack);
                stack.push(Expr::Binary { op: BinOp::Concat, lhs: Box::new(lhs), rhs: Box::new(rhs) });
            },
            AmpAmpConcat => {
                let rhs = pop(stack);
                let lhs = pop(stack);
                stack.push(Expr::Binary { op: BinOp::ConcatSpaced, lhs: Box::new(lhs), rhs: Box::new(rhs) });
            },
            Negate => {
                let expr = pop(stack);
                stack.push(Expr::Unary { op: UnOp::Negate, expr: Box::new(expr) });
            },
            Not => {
                let expr = pop(stack);
                stack.push(Expr::Unary { op: UnOp::Not, expr: Box::new(expr) });
            },
            GetGlobal | GetGlobal2 => {
                let name = self.resolve(&self.handler.global_name_indices, instr.operand);
                stack.push(Expr::Global(name));
            },
            SetGlobal | SetGlobal2 => {
                let name = self.resolve(&self.handler.global_name_indices, instr.operand);
                let value = pop(stack);
                return Some(Stmt::Assign { target: Expr::Global(name), value });
            },
            GetLocal => {
                let name = self.resolve_slot(&self.handler.local_name_indices, instr.operand);
                stack.push(Expr::Var(name));
            },
            SetLocal => {
                let name = self.resolve_slot(&self.handler.local_name_indices, instr.operand);
                let value = pop(stack);
                return Some(Stmt::Assign { target: Expr::Var(name), value });
            },
            GetParam => {
                let name = self.resolve_slot(&self.handler.argument_name_indices, instr.operand);
                stack.push(Expr::Param(name));
            },
            SetParam => {
                let name = self.resolve_slot(&self.handler.argument_name_indices, instr.operand);
                let value = pop(stack);
                return Some(Stmt::Assign { target: Expr::Param(name), value });
            },
            GetProperty | GetTopLevelProp => {
                let name = self.resolve(&self.handler.property_name_indices, instr.operand);
                stack.push(Expr::Property(name));
            },
            SetProperty => {
                let name = self.resolve(&self.handler.property_name_indices, instr.operand);
                let value = pop(stack);
                return Some(Stmt::Assign { target: Expr::Property(name), value });
            },
            GetObjProp | GetChainedProp => {
                let object = pop(stack);
                let prop = self.names.name(instr.operand as u16).unwrap_or("unknown").to_string();
                stack.push(Expr::ObjectProperty { object: Box::new(object), prop });
            },
            SetObjProp => {
                let value = pop(stack);
                let object = pop(stack);
                let prop = self.names.name(instr.operand as u16).unwrap_or("unknown").to_string();
                return Some(Stmt::Assign { target: Expr::ObjectProperty { object: Box::new(object), prop }, value });
            },
            GetMovieProp => {
                let name = self.names.name(instr.operand as u16).unwrap_or("unknown").to_string();
                stack.push(Expr::TheBuiltin(name));
            },
            SetMovieProp => {
                let name = self.names.name(instr.operand as u16).unwrap_or("unknown").to_string();
                let value = pop(stack);
                return Some(Stmt::Assign { target: Expr::TheBuiltin(name), value });
            },
            TheBuiltin => {
                let name = self.names.name(instr.operand as u16).unwrap_or("unknown").to_string();
                stack.push(Expr::TheBuiltin(name));
            },
            Get => {
                let id_expr = pop(stack);
                let id = match &id_expr {
                    Expr::Literal(Datum::Int(value)) => *value,
                    _ => -1,
                };
                stack.push(self.read_v4_property(instr.operand, id, stack));
            },
            Set => {
                let id_expr = pop(stack);
                let id = match &id_expr {
                    Expr::Literal(Datum::Int(value)) => *value,
                    _ => -1,
                };
                let target = self.read_v4_property(instr.operand, id, stack);
                let value = pop(stack);
                return Some(Stmt::Assign { target, value });
            },
            GetChunk => {
                let bounds = self.pop_chunk_bounds(stack);
                let of = pop(stack);
                stack.push(self.wrap_chunk_bounds(bounds, of));
            },
            HiliteChunk => {
                let bounds = self.pop_chunk_bounds(stack);
                let of = pop(stack);
                let target = self.wrap_chunk_bounds(bounds, of);
                return Some(Stmt::Hilite(target));
            },
            Put => {
                let put_type = instr.operand >> 4;
                let var_type = instr.operand & 0xF;
                let value = pop(stack);
                let target = if var_type == 0 { None } else { Some(self.resolve_var_type(var_type, stack)) };
                return Some(Stmt::Put { value, target, mode: put_mode(put_type) });
            },
            PutChunk => {
                let put_type = instr.operand >> 4;
                let var_type = instr.operand & 0xF;
                let value = pop(stack);
                let bounds = self.pop_chunk_bounds(stack);
                let base = self.resolve_var_type(var_type, stack);
                let target = self.wrap_chunk_bounds(bounds, base);
                return Some(Stmt::Put { value, target: Some(target), mode: put_mode(put_type) });
            },
            DeleteChunk => {
                let var_type = instr.operand & 0xF;
                let bounds = self.pop_chunk_bounds(stack);
                let base = self.resolve_var_type(var_type, stack);
                let target = self.wrap_chunk_bounds(bounds, base);
                return Some(Stmt::Delete(target));
            },
            PushArgList => {
                let args = pop_n(stack, instr.operand.max(0) as usize);
                stack.push(Expr::List(args));
            },
            PushArgListNoRet => {
                let args = pop_n(stack, instr.operand.max(0) as usize);
                stack.push(Expr::List(args));
            },
            PushList => {
                let args = pop_n(stack, instr.operand.max(0) as usize);
                stack.push(Expr::List(args));
            },
            PushPropList => {
                let count = instr.operand.max(0) as usize;
                let flat = pop_n(stack, count * 2);
                let pairs = flat.chunks_exact(2).map(|pair| (pair[0].clone(), pair[1].clone())).collect();
                stack.push(Expr::PropList(pairs));
            },
            LocalCall | ExtCall | TellCall => {
                let args = match pop(stack) {
                    Expr::List(args) => args,
                    other => vec![other],
                };
                let name = self.names.name(instr.operand as u16).unwrap_or("unknownHandler").to_string();
                stack.push(Expr::Call { name, args });
            },
            ObjCall | ObjCallV4 => {
                return self.lift_obj_call(instr, stack);
            },
            NewObj => {
                let args = match pop(stack) {
                    Expr::List(args) => args,
                    other => vec![other],
                };
                let factory = self.names.name(instr.operand as u16).unwrap_or("unknownFactory").to_string();
                stack.push(Expr::NewObj { factory, args });
            },
            Unknown(raw) => {
                log::warn!("unrecognized opcode 0x{raw:02x} at offset {}", instr.offset);
                return Some(Stmt::Comment(format!("unrecognized opcode 0x{raw:02x}")));
            },
            _ => {
                log::debug!("unhandled opcode {:?} at offset {}", instr.opcode, instr.offset);
                return Some(Stmt::Comment(format!("unhandled opcode {:?}", instr.opcode)));
            },
        }

        None
    }

    fn resolve(&self, table: &[u16], operand: i64) -> String {
        let index = operand.max(0) as usize;
        let resolved = table.get(index).and_then(|&name_index| self.names.name(name_index));
        if resolved.is_none() {
            log::debug!("name lookup out of range: slot {index} of {}", table.len());
        }
        resolved.unwrap_or("unknown").to_string()
    }

    /// Like [`Self::resolve`], but for `Local`/`Param` operands, which are
    /// byte offsets into the call frame rather than direct table indices —
    /// divide by the version's variable multiplier (§4.6) to get the slot.
    fn resolve_slot(&self, table: &[u16], operand: i64) -> String {
        let multiplier = self.version.variable_multiplier().max(1);
        let index = (operand.max(0) as u32 / multiplier) as usize;
        let resolved = table.get(index).and_then(|&name_index| self.names.name(name_index));
        if resolved.is_none() {
            log::debug!("name lookup out of range: slot {index} of {} (operand {operand}, multiplier {multiplier})", table.len());
        }
        resolved.unwrap_or("unknown").to_string()
    }
}

fn wrap_chunk_layer(kind: ChunkKind, first: Expr, last: Expr, of: Expr) -> Expr {
    if is_literal_zero(&first) {
        of
    } else {
        Expr::Chunk { kind, first: Box::new(first), last: Box::new(last), of: Box::new(of) }
    }
}

fn bin_op(opcode: Opcode) -> BinOp {
    match opcode {
        Opcode::Mul => BinOp::Mul,
        Opcode::Add => BinOp::Add,
        Opcode::Sub => BinOp::Sub,
        Opcode::Div => BinOp::Div,
        Opcode::Modulo => BinOp::Mod,
        Opcode::Lt => BinOp::Lt,
        Opcode::Le => BinOp::Le,
        Opcode::Gt => BinOp::Gt,
        Opcode::Ge => BinOp::Ge,
        Opcode::Eq => BinOp::Eq,
        Opcode::Ne => BinOp::Ne,
        Opcode::And => BinOp::And,
        Opcode::Or => BinOp::Or,
        Opcode::Contains => BinOp::Contains,
        Opcode::Starts => BinOp::Starts,
        _ => unreachable!("bin_op called with non-binary opcode"),
    }
}
