//! The custom palette chunk (`CLUT`): an explicit 1-to-256 entry color
//! table, stored as the Mac `ColorTable` record (16-bit-per-channel RGB).

use libcommon::Stream;

use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct Clut {
    pub colors: Vec<(u8, u8, u8)>,
}

impl Clut {
    pub fn parse(stream: &mut Stream, len: u32) -> Result<Self> {
        let count = len / 6;
        let mut colors = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let r = stream.read_u16()?;
            let g = stream.read_u16()?;
            let b = stream.read_u16()?;
            colors.push(((r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8));
        }
        Ok(Self { colors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libcommon::Endianness;
    use std::rc::Rc;

    #[test]
    fn reduces_16_bit_channels_to_8_bit() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&0xFF00u16.to_be_bytes());
        bytes.extend_from_slice(&0x8000u16.to_be_bytes());
        bytes.extend_from_slice(&0x0000u16.to_be_bytes());
        let mut stream = Stream::new(Rc::from(bytes.as_slice()), Endianness::Big);
        let clut = Clut::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(clut.colors, vec![(0xFF, 0x80, 0x00)]);
    }
}
