//! The script context (`Lctx` pre-D11, `LctX` D11+): maps a script's slot
//! number in its cast to the `Lscr` chunk holding its compiled bytecode.

use libcommon::Stream;

use crate::collections::riff::ChunkId;
use crate::error::Result;

#[derive(Clone, Copy, Debug)]
pub struct ScriptContextEntry {
    /// Index into this table; matches the `scriptNumber` Lingo uses to refer
    /// to a script by position (e.g. `script 3`).
    pub index: i32,
    /// The owning `Lscr` chunk, or `None` for an unused slot.
    pub section: Option<ChunkId>,
}

#[derive(Clone, Debug, Default)]
pub struct ScriptContext {
    pub entries: Vec<ScriptContextEntry>,
    pub names_chunk: Option<ChunkId>,
}

impl ScriptContext {
    pub fn parse(stream: &mut Stream, _len: u32) -> Result<Self> {
        let _unknown_a = stream.read_u32()?;
        let _unknown_b = stream.read_u32()?;
        let entry_count = stream.read_u32()?;
        let _entry_count2 = stream.read_u32()?;
        let entries_offset = stream.read_u16()?;
        let _unknown_c = stream.read_u16()?;
        let _unknown_d = stream.read_u32()?;
        let _unknown_e = stream.read_u32()?;
        let names_chunk_raw = stream.read_i32()?;
        let _unknown_f = stream.read_i16()?;
        let _flags = stream.read_u16()?;
        let _free_pointer = stream.read_i32()?;

        stream.seek(entries_offset as usize)?;
        let mut entries = Vec::with_capacity(entry_count as usize);
        for index in 0..entry_count as i32 {
            let _unknown = stream.read_i32()?;
            let section_id = stream.read_i32()?;
            let _unknown2 = stream.read_i32()?;
            let _unknown3 = stream.read_u16()?;
            let section = if section_id < 0 { None } else { Some(ChunkId(section_id)) };
            entries.push(ScriptContextEntry { index, section });
        }

        let names_chunk = if names_chunk_raw < 0 { None } else { Some(ChunkId(names_chunk_raw)) };

        Ok(Self { entries, names_chunk })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libcommon::Endianness;
    use std::rc::Rc;

    #[test]
    fn maps_a_slot_to_its_lscr_chunk() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&1u32.to_be_bytes()); // entry_count
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&26u16.to_be_bytes()); // entries_offset
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&7i32.to_be_bytes()); // names_chunk
        bytes.extend_from_slice(&0i16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&42i32.to_be_bytes()); // section_id
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());

        let mut stream = Stream::new(Rc::from(bytes.as_slice()), Endianness::Big);
        let ctx = ScriptContext::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(ctx.names_chunk, Some(ChunkId(7)));
        assert_eq!(ctx.entries[0].section, Some(ChunkId(42)));
    }
}
