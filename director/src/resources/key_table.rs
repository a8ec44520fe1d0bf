//! The key table (`KEY*`), which links chunks to the cast members that own
//! them (a `CASt` chunk and its associated `STXT`/`BITD`/`snd ` chunk, a
//! script's `Lscr` and its owning cast slot, and so on).

use libcommon::OsType;
use libcommon::Stream;

use crate::collections::riff::ChunkId;
use crate::error::Result;

#[derive(Clone, Copy, Debug)]
pub struct KeyTableEntry {
    pub chunk_id: ChunkId,
    pub owner_id: ChunkId,
    pub fourcc: OsType,
}

#[derive(Clone, Debug, Default)]
pub struct KeyTable {
    pub entries: Vec<KeyTableEntry>,
}

impl KeyTable {
    pub fn parse(stream: &mut Stream, _len: u32) -> Result<Self> {
        let _entry_size = stream.read_u16()?;
        let _entry_size2 = stream.read_u16()?;
        let _max_count = stream.read_u32()?;
        let used_count = stream.read_u32()?;

        let mut entries = Vec::with_capacity(used_count as usize);
        for _ in 0..used_count {
            let chunk_id = ChunkId(stream.read_i32()?);
            let owner_id = ChunkId(stream.read_i32()?);
            let fourcc = OsType::from(stream.read_u32()?);
            entries.push(KeyTableEntry { chunk_id, owner_id, fourcc });
        }

        Ok(Self { entries })
    }

    /// All chunks owned by `owner`, optionally narrowed to one fourCC.
    pub fn owned_by(&self, owner: ChunkId, fourcc: Option<OsType>) -> impl Iterator<Item = ChunkId> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.owner_id == owner && fourcc.map_or(true, |f| e.fourcc == f))
            .map(|e| e.chunk_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libcommon::Endianness;
    use std::rc::Rc;

    #[test]
    fn finds_chunks_owned_by_a_cast_member() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&12u16.to_be_bytes());
        bytes.extend_from_slice(&12u16.to_be_bytes());
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&10i32.to_be_bytes());
        bytes.extend_from_slice(&5i32.to_be_bytes());
        bytes.extend_from_slice(b"Lscr");
        bytes.extend_from_slice(&11i32.to_be_bytes());
        bytes.extend_from_slice(&6i32.to_be_bytes());
        bytes.extend_from_slice(b"STXT");

        let mut stream = Stream::new(Rc::from(bytes.as_slice()), Endianness::Big);
        let table = KeyTable::parse(&mut stream, bytes.len() as u32).unwrap();
        let owned: Vec<_> = table.owned_by(ChunkId(5), None).collect();
        assert_eq!(owned, vec![ChunkId(10)]);
    }
}
