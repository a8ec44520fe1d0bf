//! The compiled script chunk (`Lscr`): one per handler-bearing script or
//! factory, holding its property/global/argument name tables and the
//! bytecode for each handler. [`crate::bytecode`] and [`crate::ast`] turn
//! this into readable Lingo source; this module only exposes the raw
//! record.

use std::rc::Rc;

use libcommon::Stream;

use crate::error::Result;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScriptKind {
    Score,
    Movie,
    Parent,
}

/// One handler's compiled bytecode and the tables needed to read it: its
/// argument and local variable name indices (into the script's `Lnam`
/// table) and the raw instruction bytes.
#[derive(Clone, Debug)]
pub struct Handler {
    pub name_index: u16,
    pub argument_name_indices: Vec<u16>,
    pub local_name_indices: Vec<u16>,
    pub global_name_indices: Vec<u16>,
    pub property_name_indices: Vec<u16>,
    pub bytecode: Rc<[u8]>,
    pub stack_height: u32,
}

#[derive(Clone, Debug)]
pub struct Script {
    pub kind: ScriptKind,
    pub script_number: u16,
    pub parent_number: i16,
    pub cast_id: i32,
    pub factory_name_index: Option<u16>,
    pub property_name_indices: Vec<u16>,
    pub handlers: Vec<Handler>,
}

impl Script {
    pub fn parse(stream: &mut Stream, _len: u32) -> Result<Self> {
        let _total_length = stream.read_u32()?;
        let _total_length2 = stream.read_u32()?;
        let _header_length = stream.read_u16()?;
        let script_number = stream.read_u16()?;
        let _unknown_a = stream.read_u16()?;
        let parent_number = stream.read_i16()?;
        let _unknown_b = stream.read_u32()?;
        let script_flags = stream.read_u32()?;
        let _unknown_c = stream.read_u16()?;
        let cast_id = stream.read_i32()?;
        let factory_name_raw = stream.read_i16()?;
        let handler_count = stream.read_u16()?;
        let handler_vector_offset = stream.read_u32()?;
        let _handler_vector_size = stream.read_u32()?;
        let property_count = stream.read_u16()?;
        let property_table_offset = stream.read_u32()?;
        let global_count = stream.read_u16()?;
        let global_table_offset = stream.read_u32()?;
        let _unknown_d = stream.read_u32()?;
        let _unknown_e = stream.read_u32()?;
        let _unknown_f = stream.read_u32()?;
        let _unknown_g = stream.read_u16()?;
        let _global_count2 = stream.read_u16()?;
        let _global_table_offset2 = stream.read_u32()?;
        let _unknown_h = stream.read_u32()?;
        let _unknown_i = stream.read_u32()?;

        let global_name_indices = read_name_index_table(stream, global_table_offset, global_count)?;
        let property_name_indices = read_name_index_table(stream, property_table_offset, property_count)?;

        stream.seek(handler_vector_offset as usize)?;
        let mut records = Vec::with_capacity(handler_count as usize);
        for _ in 0..handler_count {
            let name_index = stream.read_u16()?;
            let _vector_pos = stream.read_u16()?;
            let compiled_length = stream.read_u32()?;
            let compiled_offset = stream.read_u32()?;
            let argument_count = stream.read_u16()?;
            let argument_offset = stream.read_u32()?;
            let local_count = stream.read_u16()?;
            let local_offset = stream.read_u32()?;
            let _unknown_j = stream.read_u32()?;
            let _line_count = stream.read_u16()?;
            let _line_offset = stream.read_u32()?;
            let stack_height = stream.read_u32()?;
            records.push((name_index, compiled_length, compiled_offset, argument_count, argument_offset, local_count, local_offset, stack_height));
        }

        let mut handlers = Vec::with_capacity(records.len());
        for (name_index, compiled_length, compiled_offset, argument_count, argument_offset, local_count, local_offset, stack_height) in records {
            let argument_name_indices = read_name_index_table(stream, argument_offset, argument_count)?;
            let local_name_indices = read_name_index_table(stream, local_offset, local_count)?;
            stream.seek(compiled_offset as usize)?;
            let bytecode = Rc::from(stream.read_bytes(compiled_length as usize)?.to_vec());
            handlers.push(Handler {
                name_index,
                argument_name_indices,
                local_name_indices,
                global_name_indices: global_name_indices.clone(),
                property_name_indices: property_name_indices.clone(),
                bytecode,
                stack_height,
            });
        }

        let kind = if script_flags & 0x1 != 0 {
            ScriptKind::Parent
        } else if script_flags & 0x2 != 0 {
            ScriptKind::Movie
        } else {
            ScriptKind::Score
        };

        Ok(Self {
            kind,
            script_number,
            parent_number,
            cast_id,
            factory_name_index: if factory_name_raw < 0 { None } else { Some(factory_name_raw as u16) },
            property_name_indices,
            handlers,
        })
    }
}

fn read_name_index_table(stream: &mut Stream, offset: u32, count: u16) -> Result<Vec<u16>> {
    stream.seek(offset as usize)?;
    let mut indices = Vec::with_capacity(count as usize);
    for _ in 0..count {
        indices.push(stream.read_u16()?);
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use libcommon::Endianness;
    use std::rc::Rc as StdRc;

    #[test]
    fn parses_a_script_with_no_handlers() {
        let mut bytes = vec![0u8; 64];
        bytes[14..16].copy_from_slice(&3u16.to_be_bytes()); // script_number
        bytes[26..30].copy_from_slice(&0u32.to_be_bytes()); // cast_id
        bytes[30..32].copy_from_slice(&(-1i16).to_be_bytes()); // factory_name
        // handler_count = 0, remaining offsets point past the header
        bytes[34..38].copy_from_slice(&64u32.to_be_bytes()); // handler_vector_offset
        bytes[42..46].copy_from_slice(&64u32.to_be_bytes()); // property_table_offset
        bytes[48..52].copy_from_slice(&64u32.to_be_bytes()); // global_table_offset

        let mut stream = Stream::new(StdRc::from(bytes.as_slice()), Endianness::Big);
        let script = Script::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(script.script_number, 3);
        assert!(script.handlers.is_empty());
        assert_eq!(script.kind, ScriptKind::Score);
    }
}
