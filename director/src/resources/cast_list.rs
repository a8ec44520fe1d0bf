//! The cast library table (`MCsL`), mapping a movie's internal cast
//! libraries to the chunk id ranges that hold their members.

use libcommon::Stream;

use crate::error::Result;

#[derive(Clone, Debug)]
pub struct CastListEntry {
    pub name: String,
    pub path: String,
    pub min_member: i32,
    pub max_member: i32,
    pub library_id: i32,
}

#[derive(Clone, Debug, Default)]
pub struct CastList {
    pub entries: Vec<CastListEntry>,
}

impl CastList {
    pub fn parse(stream: &mut Stream, _len: u32) -> Result<Self> {
        let _data_offset = stream.read_u16()?;
        let count = stream.read_u16()?;
        let _items_per_entry = stream.read_u16()?;
        let _entry_size = stream.read_u16()?;

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = stream.read_pascal_string()?;
            let path = stream.read_pascal_string()?;
            let min_member = stream.read_i32()?;
            let max_member = stream.read_i32()?;
            let library_id = i32::from(stream.read_u16()?);
            let _flags = stream.read_u16()?;
            entries.push(CastListEntry { name, path, min_member, max_member, library_id });
        }

        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libcommon::Endianness;
    use std::rc::Rc;

    #[test]
    fn parses_a_single_entry() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&0u16.to_be_bytes()); // data_offset
        bytes.extend_from_slice(&1u16.to_be_bytes()); // count
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.push(8);
        bytes.extend_from_slice(b"Internal");
        bytes.push(0);
        bytes.extend_from_slice(&1i32.to_be_bytes());
        bytes.extend_from_slice(&50i32.to_be_bytes());
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());

        let mut stream = Stream::new(Rc::from(bytes.as_slice()), Endianness::Big);
        let list = CastList::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(list.entries.len(), 1);
        assert_eq!(list.entries[0].name, "Internal");
        assert_eq!(list.entries[0].max_member, 50);
    }
}
