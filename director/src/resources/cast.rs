//! The cast slot table (`CAS*`) and individual cast member records (`CASt`).
//!
//! `CAS*` is just a flat array of chunk ids, one per slot in a cast
//! library; a zero entry is an empty slot. Each non-zero id names a `CASt`
//! chunk holding that member's type, name, and type-specific data (for a
//! bitmap, a reference to the `BITD`/`CLUT` that hold its pixels; for a
//! script, nothing — the `Lscr` is found through the key table instead).

use std::rc::Rc;

use libcommon::Stream;

use crate::collections::riff::ChunkId;
use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct Cast {
    pub slots: Vec<Option<ChunkId>>,
}

impl Cast {
    pub fn parse(stream: &mut Stream, len: u32) -> Result<Self> {
        let count = len / 4;
        let mut slots = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let raw = stream.read_i32()?;
            slots.push(if raw == 0 { None } else { Some(ChunkId(raw)) });
        }
        Ok(Self { slots })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CastMemberType {
    Bitmap,
    FilmLoop,
    Text,
    Palette,
    Picture,
    Sound,
    Button,
    Shape,
    Movie,
    DigitalVideo,
    Script,
    RichText,
    Other(u8),
}

impl From<u8> for CastMemberType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Bitmap,
            2 => Self::FilmLoop,
            3 => Self::Text,
            4 => Self::Palette,
            5 => Self::Picture,
            6 => Self::Sound,
            7 => Self::Button,
            8 => Self::Shape,
            9 => Self::Movie,
            10 => Self::DigitalVideo,
            11 => Self::Script,
            12 => Self::RichText,
            other => Self::Other(other),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CastMember {
    pub member_type: CastMemberType,
    /// The generic "cast info" block: name, comments, script text for
    /// pre-`Lscr` versions. Kept raw; [`CastMember::name`] extracts the one
    /// field this crate cares about.
    pub info: Rc<[u8]>,
    /// Type-specific data, e.g. a `BitmapInfo` record pointing at the
    /// member's `BITD`/`CLUT` chunks. Left to [`crate::media`] to interpret.
    pub specific: Rc<[u8]>,
}

impl CastMember {
    pub fn parse(stream: &mut Stream, _len: u32) -> Result<Self> {
        let member_type = CastMemberType::from(stream.read_u8()?);
        let info_len = stream.read_u32()?;
        let specific_len = stream.read_u32()?;
        let specific = Rc::from(stream.read_bytes(specific_len as usize)?.to_vec());
        let info = Rc::from(stream.read_bytes(info_len as usize)?.to_vec());

        Ok(Self { member_type, info, specific })
    }

    /// The member's display name, if its info block has one. Cast info
    /// blocks store a short offset table followed by a string pool; the
    /// name is always the pool's first string when present.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        if self.info.len() < 2 {
            return None;
        }
        let len = self.info[0] as usize;
        if len == 0 || len + 1 > self.info.len() {
            return None;
        }
        Some(self.info[1..1 + len].iter().map(|&b| b as char).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libcommon::Endianness;
    use std::rc::Rc as StdRc;

    #[test]
    fn parses_slot_table_with_a_hole() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&10i32.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&12i32.to_be_bytes());
        let mut stream = Stream::new(StdRc::from(bytes.as_slice()), Endianness::Big);
        let cast = Cast::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(cast.slots, vec![Some(ChunkId(10)), None, Some(ChunkId(12))]);
    }

    #[test]
    fn reads_member_name_from_info_block() {
        let mut bytes = vec![1u8]; // Bitmap
        bytes.extend_from_slice(&6u32.to_be_bytes()); // info_len
        bytes.extend_from_slice(&0u32.to_be_bytes()); // specific_len
        bytes.push(5);
        bytes.extend_from_slice(b"Ball1");
        let mut stream = Stream::new(StdRc::from(bytes.as_slice()), Endianness::Big);
        let member = CastMember::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(member.member_type, CastMemberType::Bitmap);
        assert_eq!(member.name().as_deref(), Some("Ball1"));
    }
}
