//! Finds and decodes the `STXT` chunk owned by a text cast member.

use crate::collections::riff::{ChunkId, ChunkIndex};
use crate::error::{Error, Result};
use crate::resources::stxt::Stxt;
use crate::resources::KeyTable;

pub fn member_text(index: &ChunkIndex, key_table: &KeyTable, owner: ChunkId) -> Result<String> {
    let stxt_id = key_table
        .owned_by(owner, Some(libcommon::OsType::from(*b"STXT")))
        .next()
        .ok_or_else(|| Error::ChunkMissing(libcommon::OsType::from(*b"STXT")))?;
    let stxt = index.load(stxt_id, Stxt::parse)?;
    Ok(stxt.text.clone())
}
