//! The container & chunk layer.
//!
//! A Director movie is a RIFX file: chunks are indexed either by a plain
//! `mmap` (Director 4 through roughly 11) or by the compressed "Afterburner"
//! format (`Fver`/`Fcdr`/`ABMP`/`FGEI`, introduced for Shockwave `.dcr`/`.cct`
//! files, where every chunk is individually zlib-compressed). Both backends
//! present the same [`ChunkIndex`] surface to the rest of the crate.

use libcommon::{Endianness, OsType, Stream, StreamError};
use std::{any::Any, cell::RefCell, collections::HashMap, rc::Rc};

use crate::error::{Error, Result};

libcommon::newtype_index! {
    /// The id of a chunk, i.e. its position in the memory map / Afterburner
    /// resource table. Unique per file.
    pub struct ChunkId(i32);
}

/// A 16-byte GUID identifying a chunk's compression codec.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct MoaId(pub [u8; 16]);

impl MoaId {
    pub const NULL: Self = Self([0; 16]);
    pub const ZLIB: Self = Self([1; 16]);
    pub const SND: Self = Self([2; 16]);
    pub const FONTMAP: Self = Self([3; 16]);

    fn from_table(index: u32, table: &[Self]) -> Self {
        table.get(index as usize).copied().unwrap_or(Self::NULL)
    }
}

impl std::fmt::Debug for MoaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::NULL => write!(f, "MoaId(NULL)"),
            Self::ZLIB => write!(f, "MoaId(ZLIB)"),
            Self::SND => write!(f, "MoaId(SND)"),
            Self::FONTMAP => write!(f, "MoaId(FONTMAP)"),
            _ => write!(f, "MoaId({:02x?})", self.0),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ChunkInfo {
    pub id: ChunkId,
    pub fourcc: OsType,
    pub len: u32,
    pub uncompressed_len: u32,
    pub offset: u32,
    pub compression_id: MoaId,
}

#[derive(Debug)]
struct AfterburnerEntry {
    offset: u32,
    comp_size: u32,
    uncomp_size: u32,
    compression_id: MoaId,
    fourcc: OsType,
}

enum Backend {
    Plain {
        file: Rc<[u8]>,
    },
    Afterburner {
        /// The inflated `FGEI` body: the ILS prefix followed by the
        /// individually-compressed spans referenced by `entries`.
        body: Rc<[u8]>,
        entries: HashMap<i32, AfterburnerEntry>,
        /// Chunks whose bodies were already inflated while walking the
        /// initial load segment.
        ils: RefCell<HashMap<i32, Rc<[u8]>>>,
    },
}

const CHUNK_HEADER_SIZE: u32 = 8;

/// Enumerates and lazily materializes the chunks of a RIFX file.
pub struct ChunkIndex {
    info: HashMap<i32, ChunkInfo>,
    order: HashMap<OsType, Vec<ChunkId>>,
    backend: Backend,
    endian: Endianness,
    body_cache: RefCell<HashMap<i32, Rc<[u8]>>>,
    parsed_cache: RefCell<HashMap<i32, Rc<dyn Any>>>,
}

impl std::fmt::Debug for ChunkIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkIndex").field("chunks", &self.info.len()).finish()
    }
}

impl ChunkIndex {
    pub fn new(file: Rc<[u8]>) -> Result<Self> {
        let mut header = Stream::new(Rc::clone(&file), Endianness::Big);
        let magic = OsType::from(header.read_u32()?);
        let endian = match magic.as_bytes() {
            b"RIFX" => Endianness::Big,
            b"XFIR" => Endianness::Little,
            _ => return Err(Error::NotRiffx),
        };
        header.set_endianness(endian);
        let _total_len = header.read_u32()?;
        let codec = OsType::from(header.read_u32()?);

        match codec.as_bytes() {
            b"MV93" | b"MC95" => Self::new_plain(file, endian),
            b"FGDM" | b"FGDC" => Self::new_afterburner(file, endian),
            _ => Err(Error::UnsupportedCodec(codec)),
        }
    }

    fn new_plain(file: Rc<[u8]>, endian: Endianness) -> Result<Self> {
        let mut stream = Stream::new(Rc::clone(&file), endian);
        stream.seek(12)?;
        let imap_fourcc = OsType::from(stream.read_u32()?);
        ensure_sample!(imap_fourcc.as_bytes() == b"imap", "expected imap at offset 12, found {}", imap_fourcc);
        let _imap_len = stream.read_u32()?;
        let _imap_count = stream.read_u32()?;
        let mmap_offset = stream.read_u32()?;

        stream.seek(mmap_offset as usize)?;
        let mmap_fourcc = OsType::from(stream.read_u32()?);
        ensure_sample!(mmap_fourcc.as_bytes() == b"mmap", "expected mmap at {}, found {}", mmap_offset, mmap_fourcc);
        let _mmap_len = stream.read_u32()?;

        let _header_length = stream.read_u16()?;
        let _entry_length = stream.read_u16()?;
        let _chunk_count_max = stream.read_u32()?;
        let chunk_count_used = stream.read_u32()?;
        let _junk_head = stream.read_u32()?;
        let _junk_head2 = stream.read_u32()?;
        let _free_head = stream.read_u32()?;

        let mut info = HashMap::with_capacity(chunk_count_used as usize);
        let mut order: HashMap<OsType, Vec<ChunkId>> = HashMap::new();

        for i in 0..chunk_count_used {
            let fourcc = OsType::from(stream.read_u32()?);
            let len = stream.read_u32()?;
            let offset = stream.read_u32()?;
            let _flags = stream.read_u32()?;
            let _next = stream.read_u32()?;

            if fourcc.as_bytes() == b"free" || fourcc.as_bytes() == b"junk" {
                continue;
            }

            let id = ChunkId(i as i32);
            info.insert(id.0, ChunkInfo {
                id,
                fourcc,
                len,
                uncompressed_len: len,
                offset,
                compression_id: MoaId::NULL,
            });
            order.entry(fourcc).or_default().push(id);
        }

        Ok(Self {
            info,
            order,
            backend: Backend::Plain { file },
            endian,
            body_cache: RefCell::new(HashMap::new()),
            parsed_cache: RefCell::new(HashMap::new()),
        })
    }

    fn new_afterburner(file: Rc<[u8]>, endian: Endianness) -> Result<Self> {
        let mut stream = Stream::new(Rc::clone(&file), endian);
        stream.seek(12)?;

        // Fver
        {
            let fourcc = OsType::from(stream.read_u32()?);
            ensure_sample!(fourcc.as_bytes() == b"Fver", "expected Fver, found {}", fourcc);
            let start = stream.pos();
            let length = stream.read_var_int()?;
            let data_start = stream.pos();
            let version = stream.read_var_int()?;
            if version >= 0x401 {
                stream.read_var_int()?;
                stream.read_var_int()?;
            }
            if version >= 0x501 {
                stream.read_pascal_string()?;
            }
            stream.seek(data_start + length as usize)?;
            debug_assert!(stream.pos() >= start);
        }

        // Fcdr
        let compression_table: Vec<MoaId> = {
            let fourcc = OsType::from(stream.read_u32()?);
            ensure_sample!(fourcc.as_bytes() == b"Fcdr", "expected Fcdr, found {}", fourcc);
            let length = stream.read_var_int()?;
            let compressed = stream.read_bytes(length as usize)?;
            let inflated = inflate(&compressed)?;
            let mut inner = Stream::new(Rc::from(inflated), endian);
            let count = inner.read_u16()?;
            let mut guids = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let mut guid = [0u8; 16];
                for byte in &mut guid {
                    *byte = inner.read_u8()?;
                }
                guids.push(MoaId(guid));
            }
            for _ in 0..count {
                inner.read_c_string()?;
            }
            guids
        };

        // ABMP
        let entries_by_res_id: HashMap<i32, AfterburnerEntry> = {
            let fourcc = OsType::from(stream.read_u32()?);
            ensure_sample!(fourcc.as_bytes() == b"ABMP", "expected ABMP, found {}", fourcc);
            let _length = stream.read_var_int()?;
            let _scratch_a = stream.read_var_int()?;
            let _scratch_b = stream.read_var_int()?;
            let uncompressed_len = stream.read_var_int()?;
            let remaining = stream.bytes_left();
            let compressed = stream.read_bytes(remaining)?;
            let inflated = inflate(&compressed)?;
            ensure_sample!(
                inflated.len() as u32 == uncompressed_len || uncompressed_len == 0,
                "ABMP inflated to {} bytes, expected {}",
                inflated.len(),
                uncompressed_len
            );
            let mut inner = Stream::new(Rc::from(inflated), endian);
            let _scratch_c = inner.read_var_int()?;
            let _scratch_d = inner.read_var_int()?;
            let res_count = inner.read_var_int()?;
            let mut entries = HashMap::with_capacity(res_count as usize);
            for _ in 0..res_count {
                let res_id = inner.read_var_int()? as i32;
                let offset = inner.read_var_int()?;
                let comp_size = inner.read_var_int()?;
                let uncomp_size = inner.read_var_int()?;
                let compression_index = inner.read_var_int()?;
                let fourcc = OsType::from(inner.read_u32()?);
                entries.insert(res_id, AfterburnerEntry {
                    offset,
                    comp_size,
                    uncomp_size,
                    compression_id: MoaId::from_table(compression_index, &compression_table),
                    fourcc,
                });
            }
            entries
        };

        // FGEI
        let fgei_body: Rc<[u8]> = {
            let fourcc = OsType::from(stream.read_u32()?);
            ensure_sample!(fourcc.as_bytes() == b"FGEI", "expected FGEI, found {}", fourcc);
            let _length = stream.read_var_int()?;
            let _scratch = stream.read_var_int()?;
            let remaining = stream.bytes_left();
            Rc::from(stream.read_bytes(remaining)?.to_vec())
        };

        let ils_id = 2;
        let ils = RefCell::new(HashMap::new());
        if let Some(ils_entry) = entries_by_res_id.get(&ils_id) {
            let mut ils_stream = Stream::new(Rc::clone(&fgei_body), endian);
            ils_stream.seek(ils_entry.offset as usize)?;
            let compressed = ils_stream.read_bytes(ils_entry.comp_size as usize)?;
            let inflated = match ils_entry.compression_id {
                MoaId::NULL => compressed.to_vec(),
                _ => inflate(&compressed)?,
            };
            let mut body_stream = Stream::new(Rc::from(inflated), endian);
            while body_stream.bytes_left() > 0 {
                let res_id = body_stream.read_var_int()? as i32;
                let len = entries_by_res_id.get(&res_id).map_or(0, |e| e.uncomp_size);
                let data = body_stream.read_bytes(len as usize)?;
                ils.borrow_mut().insert(res_id, Rc::from(data.to_vec()));
            }
        }

        let mut info = HashMap::with_capacity(entries_by_res_id.len());
        let mut order: HashMap<OsType, Vec<ChunkId>> = HashMap::new();

        let mut ids: Vec<_> = entries_by_res_id.keys().copied().collect();
        ids.sort_unstable();
        for res_id in ids {
            let entry = &entries_by_res_id[&res_id];
            let id = ChunkId(res_id);
            let fourcc = entry.fourcc;
            info.insert(id.0, ChunkInfo {
                id,
                fourcc,
                len: entry.comp_size,
                uncompressed_len: entry.uncomp_size,
                offset: entry.offset,
                compression_id: entry.compression_id,
            });
            order.entry(fourcc).or_default().push(id);
        }

        Ok(Self {
            info,
            order,
            backend: Backend::Afterburner { body: fgei_body, entries: entries_by_res_id, ils },
            endian,
            body_cache: RefCell::new(HashMap::new()),
            parsed_cache: RefCell::new(HashMap::new()),
        })
    }

    #[must_use]
    pub fn first(&self, fourcc: impl Into<OsType>) -> Option<ChunkId> {
        self.order.get(&fourcc.into()).and_then(|ids| ids.first().copied())
    }

    #[must_use]
    pub fn by_id(&self, id: ChunkId) -> Option<&ChunkInfo> {
        self.info.get(&id.0)
    }

    #[must_use]
    pub fn exists(&self, fourcc: impl Into<OsType>, id: ChunkId) -> bool {
        self.info.get(&id.0).map_or(false, |info| info.fourcc == fourcc.into())
    }

    pub fn iter_fourcc(&self, fourcc: impl Into<OsType>) -> impl Iterator<Item = ChunkId> + '_ {
        self.order.get(&fourcc.into()).into_iter().flatten().copied()
    }

    /// Returns every chunk id known to this index, in insertion order.
    pub fn all_ids(&self) -> impl Iterator<Item = ChunkId> + '_ {
        self.info.keys().copied().map(ChunkId)
    }

    /// Materializes a chunk's raw body, decompressing if necessary. Cached
    /// for the lifetime of the index.
    pub fn body(&self, id: ChunkId) -> Result<Rc<[u8]>> {
        if let Some(cached) = self.body_cache.borrow().get(&id.0) {
            return Ok(Rc::clone(cached));
        }

        let info = self.by_id(id).ok_or_else(|| Error::malformed(id.0, OsType::default(), "unknown chunk id"))?;

        let body = match &self.backend {
            Backend::Plain { file } => {
                let start = info.offset as usize + CHUNK_HEADER_SIZE as usize;
                let end = start + info.len as usize;
                if end > file.len() {
                    return Err(Error::malformed(id.0, info.fourcc, "chunk extends past end of file"));
                }
                Rc::from(&file[start..end])
            },
            Backend::Afterburner { body, entries, ils } => {
                if let Some(view) = ils.borrow().get(&id.0) {
                    Rc::clone(view)
                } else {
                    let entry = entries.get(&id.0).ok_or_else(|| Error::malformed(id.0, info.fourcc, "no Afterburner entry"))?;
                    let start = entry.offset as usize;
                    let end = start + entry.comp_size as usize;
                    if end > body.len() {
                        return Err(Error::malformed(id.0, info.fourcc, "chunk extends past end of FGEI body"));
                    }
                    let raw = &body[start..end];
                    match entry.compression_id {
                        MoaId::NULL => Rc::from(raw),
                        MoaId::ZLIB => Rc::from(inflate(raw)?),
                        other => return Err(Error::CompressionUnsupported(other)),
                    }
                }
            },
        };

        self.body_cache.borrow_mut().insert(id.0, Rc::clone(&body));
        Ok(body)
    }

    /// Loads and caches a chunk as a typed value, parsing it with `parse` on
    /// first access.
    pub fn load<T: Any, F>(&self, id: ChunkId, parse: F) -> Result<Rc<T>>
    where
        F: FnOnce(&mut Stream, u32) -> Result<T>,
    {
        if let Some(cached) = self.parsed_cache.borrow().get(&id.0) {
            return cached.clone().downcast::<T>().map_err(|_| {
                Error::malformed(id.0, self.by_id(id).map_or_else(OsType::default, |i| i.fourcc), "chunk cached under a different type")
            });
        }

        let body = self.body(id)?;
        let len = body.len() as u32;
        let mut stream = Stream::new(Rc::clone(&body), self.endian);
        let value = Rc::new(parse(&mut stream, len)?);
        self.parsed_cache.borrow_mut().insert(id.0, value.clone() as Rc<dyn Any>);
        Ok(value)
    }
}

fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    use std::io::Read;
    let mut decoder = flate2::read::ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(|_| Error::DecompressFailed(0))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rifx_header_detects_big_endian() {
        let bytes: Vec<u8> = vec![0x52, 0x49, 0x46, 0x58, 0x00, 0x00, 0x00, 0x10, 0x4D, 0x56, 0x39, 0x33];
        let mut s = Stream::new(Rc::from(bytes.as_slice()), Endianness::Big);
        let magic = OsType::from(s.read_u32().unwrap());
        assert_eq!(magic.as_bytes(), b"RIFX");
        let len = s.read_u32().unwrap();
        assert_eq!(len, 16);
        let codec = OsType::from(s.read_u32().unwrap());
        assert_eq!(codec.as_bytes(), b"MV93");
    }

    #[test]
    fn xfir_header_detects_little_endian() {
        let bytes: Vec<u8> = vec![0x58, 0x46, 0x49, 0x52, 0x10, 0x00, 0x00, 0x00];
        let mut s = Stream::new(Rc::from(bytes.as_slice()), Endianness::Big);
        let magic = OsType::from(s.read_u32().unwrap());
        assert_eq!(magic.as_bytes(), b"XFIR");
    }
}
