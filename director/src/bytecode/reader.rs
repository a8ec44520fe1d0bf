//! Decodes a handler's raw bytecode into a flat instruction list, resolving
//! each jump operand to the instruction index it targets so later passes
//! never have to re-walk byte offsets.

use std::collections::HashMap;
use std::rc::Rc;

use libcommon::{Endianness, Stream};

use super::opcode::{canonical_opcode, operand_width, read_operand, Instruction, Opcode};
use crate::error::Result;

pub struct DecodedHandler {
    pub instructions: Vec<Instruction>,
    /// Byte offset -> index into `instructions`, for resolving jump targets.
    pub offset_to_index: HashMap<u32, usize>,
}

impl DecodedHandler {
    pub fn decode(bytecode: &Rc<[u8]>) -> Result<Self> {
        let mut stream = Stream::new(Rc::clone(bytecode), Endianness::Big);
        let mut instructions = Vec::new();
        let mut offset_to_index = HashMap::new();

        while stream.bytes_left() > 0 {
            let offset = stream.pos() as u32;
            let raw_opcode = stream.read_u8()?;
            let canonical = canonical_opcode(raw_opcode);
            let width = operand_width(raw_opcode);
            let operand = read_operand(&mut stream, width)?;

            offset_to_index.insert(offset, instructions.len());
            instructions.push(Instruction { raw_opcode, opcode: Opcode::from_canonical(canonical), operand, offset });
        }

        Ok(Self { instructions, offset_to_index })
    }

    /// Resolves a jump operand (an absolute byte offset) to its instruction
    /// index. Falls back to the end of the handler for a dangling target
    /// rather than failing the whole decompile.
    #[must_use]
    pub fn index_at(&self, offset: u32) -> usize {
        self.offset_to_index.get(&offset).copied().unwrap_or(self.instructions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_push_and_return() {
        // PushInt (0x40, byte operand 7), Ret (0x01)
        let bytecode: Rc<[u8]> = Rc::from(vec![0x40, 0x07, 0x01].into_boxed_slice());
        let decoded = DecodedHandler::decode(&bytecode).unwrap();
        assert_eq!(decoded.instructions.len(), 2);
        assert_eq!(decoded.instructions[0].opcode, Opcode::PushInt);
        assert_eq!(decoded.instructions[0].operand, 7);
        assert_eq!(decoded.instructions[1].opcode, Opcode::Ret);
        assert_eq!(decoded.index_at(2), 1);
    }
}
