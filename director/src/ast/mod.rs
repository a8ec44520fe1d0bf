//! Lifts decoded bytecode into an expression/statement tree and prints it
//! back out as Lingo source.

mod datum;
mod lifter;
mod node;
mod writer;

pub use datum::Datum;
pub use lifter::lift;
pub use node::{BinOp, ChunkKind, Expr, Stmt, UnOp};
pub use writer::Writer;

use crate::bytecode::DecodedHandler;
use crate::name::NameContext;
use crate::resources::{Handler, Script};
use crate::Version;

/// One fully decompiled handler: its source-level signature plus body.
pub struct DecompiledHandler {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Vec<Stmt>,
}

/// Decompiles every handler in a script, in declaration order. A handler
/// whose bytecode fails to decode at all (never just individual unknown
/// opcodes, which degrade to comments) is skipped rather than aborting the
/// whole script.
pub fn decompile_script(script: &Script, names: &NameContext, version: Version) -> Vec<DecompiledHandler> {
    script
        .handlers
        .iter()
        .filter_map(|handler| decompile_handler(handler, names, version))
        .collect()
}

fn decompile_handler(handler: &Handler, names: &NameContext, version: Version) -> Option<DecompiledHandler> {
    let decoded = match DecodedHandler::decode(&handler.bytecode) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::warn!("skipping handler (name index {}): {e}", handler.name_index);
            return None;
        },
    };
    let body = lift(handler, &decoded, names, version);
    let name = names.name(handler.name_index).unwrap_or("unknownHandler").to_string();
    let parameters = handler
        .argument_name_indices
        .iter()
        .filter_map(|&index| names.name(index))
        .map(str::to_string)
        .collect();
    Some(DecompiledHandler { name, parameters, body })
}
