//! An endian-aware, bounds-checked byte reader over a reference-counted
//! buffer. Chunks materialized by the Afterburner zlib layer and chunks read
//! straight out of a plain `mmap` file both end up as a `Stream`, so nothing
//! downstream needs to care where the bytes came from.

use std::{convert::TryInto, fmt, ops::Deref, rc::Rc};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endianness {
    Big,
    Little,
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("unexpected end of stream at offset {offset} (wanted {wanted} bytes, {available} available)")]
    EndOfStream { offset: usize, wanted: usize, available: usize },
    #[error("seek to {0} is outside the stream")]
    BadSeek(usize),
    #[error("80-bit float exponent out of range for f64")]
    F80Overflow,
}

/// A cheap, shared view into a byte buffer. Cloning copies only the
/// `Rc` and the bounds, never the underlying bytes.
#[derive(Clone)]
pub struct ByteSlice {
    data: Rc<[u8]>,
    start: usize,
    end: usize,
}

impl Deref for ByteSlice {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data[self.start..self.end]
    }
}

impl fmt::Debug for ByteSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSlice({} bytes)", self.len())
    }
}

#[derive(Clone, Debug)]
pub struct Stream {
    data: Rc<[u8]>,
    start: usize,
    end: usize,
    pos: usize,
    endian: Endianness,
}

impl Stream {
    #[must_use]
    pub fn new(data: impl Into<Rc<[u8]>>, endian: Endianness) -> Self {
        let data = data.into();
        let end = data.len();
        Self { data, start: 0, end, pos: 0, endian }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos - self.start
    }

    #[must_use]
    pub fn bytes_left(&self) -> usize {
        self.end - self.pos
    }

    #[must_use]
    pub fn endianness(&self) -> Endianness {
        self.endian
    }

    pub fn set_endianness(&mut self, endian: Endianness) {
        self.endian = endian;
    }

    pub fn seek(&mut self, pos: usize) -> Result<(), StreamError> {
        let absolute = self.start + pos;
        if absolute > self.end {
            return Err(StreamError::BadSeek(pos));
        }
        self.pos = absolute;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<(), StreamError> {
        self.seek(self.pos() + n)
    }

    fn take(&mut self, n: usize) -> Result<&[u8], StreamError> {
        if self.bytes_left() < n {
            return Err(StreamError::EndOfStream {
                offset: self.pos(),
                wanted: n,
                available: self.bytes_left(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Returns a window over the next `n` bytes without copying, advancing
    /// past it. Fails on short read.
    pub fn read_bytes(&mut self, n: usize) -> Result<ByteSlice, StreamError> {
        let start = self.pos;
        self.take(n)?;
        Ok(ByteSlice { data: Rc::clone(&self.data), start, end: start + n })
    }

    /// Like [`read_bytes`](Self::read_bytes), but never fails on short read —
    /// returns whatever is left, possibly fewer than `n` bytes.
    #[must_use]
    pub fn read_up_to(&mut self, n: usize) -> ByteSlice {
        let n = n.min(self.bytes_left());
        let start = self.pos;
        self.pos += n;
        ByteSlice { data: Rc::clone(&self.data), start, end: start + n }
    }

    /// Borrows a sub-window of the next `n` bytes as an independent `Stream`
    /// sharing the parent's endianness, and advances the parent past it.
    pub fn substream(&mut self, n: usize) -> Result<Self, StreamError> {
        let start = self.pos;
        self.take(n)?;
        Ok(Self { data: Rc::clone(&self.data), start, end: start + n, pos: start, endian: self.endian })
    }

    pub fn read_u8(&mut self) -> Result<u8, StreamError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, StreamError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, StreamError> {
        let bytes: [u8; 2] = self.take(2)?.try_into().unwrap();
        Ok(match self.endian {
            Endianness::Big => u16::from_be_bytes(bytes),
            Endianness::Little => u16::from_le_bytes(bytes),
        })
    }

    pub fn read_i16(&mut self) -> Result<i16, StreamError> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, StreamError> {
        let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(match self.endian {
            Endianness::Big => u32::from_be_bytes(bytes),
            Endianness::Little => u32::from_le_bytes(bytes),
        })
    }

    pub fn read_i32(&mut self) -> Result<i32, StreamError> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_f32(&mut self) -> Result<f32, StreamError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, StreamError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(match self.endian {
            Endianness::Big => f64::from_be_bytes(bytes),
            Endianness::Little => f64::from_le_bytes(bytes),
        })
    }

    /// Apple SANE 80-bit extended precision float, as used by `snd ` sample
    /// rates and legacy tempo records.
    pub fn read_f80(&mut self) -> Result<f64, StreamError> {
        let exp_and_sign = self.read_u16()?;
        let hi = self.read_u32()?;
        let lo = self.read_u32()?;
        let sign = if exp_and_sign & 0x8000 != 0 { -1.0 } else { 1.0 };
        let biased_exponent = i32::from(exp_and_sign & 0x7fff);
        let significand = (u64::from(hi) << 32) | u64::from(lo);
        if biased_exponent == 0 && significand == 0 {
            return Ok(0.0 * sign);
        }
        let exponent = biased_exponent - 16383 - 63;
        if !(-1100..=1020).contains(&exponent) {
            return Err(StreamError::F80Overflow);
        }
        Ok(sign * (significand as f64) * 2f64.powi(exponent))
    }

    /// Afterburner's variable-length integer: 7 data bits per byte, MSB of
    /// each byte set while more bytes follow, accumulated most-significant
    /// byte first.
    pub fn read_var_int(&mut self) -> Result<u32, StreamError> {
        let mut result: u32 = 0;
        loop {
            let byte = self.read_u8()?;
            result = (result << 7) | u32::from(byte & 0x7f);
            if byte & 0x80 == 0 {
                break;
            }
        }
        Ok(result)
    }

    /// Raw Latin-1 bytes, each byte mapping directly to the codepoint of the
    /// same value.
    pub fn read_string(&mut self, n: usize) -> Result<String, StreamError> {
        Ok(self.take(n)?.iter().map(|&b| b as char).collect())
    }

    pub fn read_c_string(&mut self) -> Result<String, StreamError> {
        let mut out = Vec::new();
        loop {
            let byte = self.read_u8()?;
            if byte == 0 {
                break;
            }
            out.push(byte);
        }
        Ok(out.iter().map(|&b| b as char).collect())
    }

    pub fn read_pascal_string(&mut self) -> Result<String, StreamError> {
        let len = self.read_u8()? as usize;
        self.read_string(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(bytes: &[u8], endian: Endianness) -> Stream {
        Stream::new(Rc::from(bytes), endian)
    }

    #[test]
    fn reads_big_endian_ints() {
        let mut s = stream(&[0x00, 0x10, 0xFF, 0xFF, 0xFF, 0xFE], Endianness::Big);
        assert_eq!(s.read_u16().unwrap(), 16);
        assert_eq!(s.read_i32().unwrap(), -2);
    }

    #[test]
    fn reads_little_endian_ints() {
        let mut s = stream(&[0x10, 0x00], Endianness::Little);
        assert_eq!(s.read_u16().unwrap(), 16);
    }

    #[test]
    fn end_of_stream_fails_explicitly() {
        let mut s = stream(&[0x01], Endianness::Big);
        assert!(s.read_u16().is_err());
    }

    #[test]
    fn read_up_to_never_fails() {
        let mut s = stream(&[0x01, 0x02], Endianness::Big);
        assert_eq!(s.read_up_to(10).len(), 2);
        assert_eq!(s.read_up_to(10).len(), 0);
    }

    #[test]
    fn pascal_string_round_trips() {
        let mut s = stream(&[3, b'f', b'o', b'o'], Endianness::Big);
        assert_eq!(s.read_pascal_string().unwrap(), "foo");
    }

    #[test]
    fn var_int_accumulates_most_significant_byte_first() {
        // 300 = 0b1_0010_1100 -> split into 7-bit groups: 0000010 0101100
        let mut s = stream(&[0x82, 0x2C], Endianness::Big);
        assert_eq!(s.read_var_int().unwrap(), 300);
    }

    #[test]
    fn substream_shares_parent_endianness_and_advances_parent() {
        let mut s = stream(&[0xAA, 0xBB, 0xCC, 0xDD], Endianness::Little);
        let mut sub = s.substream(2).unwrap();
        assert_eq!(sub.read_u8().unwrap(), 0xAA);
        assert_eq!(s.pos(), 2);
        assert_eq!(s.read_u8().unwrap(), 0xCC);
    }
}
