//! Combines a script context's `Lnam` name table with its `Lctx`/`LctX`
//! slot map so the bytecode reader and AST lifter can resolve a numeric
//! operand to the symbol it names, independent of which chunk originally
//! supplied it.

use std::rc::Rc;

use crate::collections::riff::{ChunkId, ChunkIndex};
use crate::error::Result;
use crate::resources::{ScriptContext, ScriptNames};

/// A read-only view over one script context's names, shared by every
/// handler lifted from the scripts it owns.
pub struct NameContext {
    names: Rc<ScriptNames>,
    context: Rc<ScriptContext>,
}

impl NameContext {
    pub fn load(index: &ChunkIndex, context_id: ChunkId) -> Result<Self> {
        let context = index.load(context_id, ScriptContext::parse)?;
        let names_id = context.names_chunk.ok_or_else(|| {
            crate::error::Error::malformed(context_id.0, libcommon::OsType::from(*b"Lctx"), "script context has no name table")
        })?;
        let names = index.load(names_id, ScriptNames::parse)?;
        Ok(Self { names, context })
    }

    #[must_use]
    pub fn name(&self, index: u16) -> Option<&str> {
        self.names.get(index as usize)
    }

    /// The `Lscr` chunk backing a given script slot number, if any.
    #[must_use]
    pub fn script_chunk(&self, script_number: i32) -> Option<ChunkId> {
        self.context
            .entries
            .iter()
            .find(|e| e.index == script_number)
            .and_then(|e| e.section)
    }

    #[must_use]
    pub fn script_context(&self) -> &ScriptContext {
        &self.context
    }
}
