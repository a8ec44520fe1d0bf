//! The styled text chunk (`STXT`): a cast member's raw Mac-Roman text plus
//! its run-length formatting table. Only the text is decoded here; run
//! formatting (font/size/color per span) is kept raw since nothing in this
//! crate renders it.

use std::rc::Rc;

use encoding::all::MAC_ROMAN;
use encoding::{DecoderTrap, Encoding};
use libcommon::Stream;

use crate::error::Result;

#[derive(Clone, Debug)]
pub struct Stxt {
    pub text: String,
    pub formatting: Rc<[u8]>,
}

impl Stxt {
    pub fn parse(stream: &mut Stream, _len: u32) -> Result<Self> {
        let _unknown = stream.read_u32()?;
        let text_len = stream.read_u32()?;
        let _raw_text_len = stream.read_u32()?;
        let text_bytes = stream.read_bytes(text_len as usize)?;
        let text = MAC_ROMAN
            .decode(&text_bytes, DecoderTrap::Replace)
            .map_err(|reason| crate::error::Error::malformed(0, libcommon::OsType::from(*b"STXT"), reason.to_string()))?;
        let remaining = stream.bytes_left();
        let formatting = Rc::from(stream.read_bytes(remaining)?.to_vec());
        Ok(Self { text, formatting })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libcommon::Endianness;
    use std::rc::Rc as StdRc;

    #[test]
    fn decodes_mac_roman_text() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&5u32.to_be_bytes());
        bytes.extend_from_slice(&5u32.to_be_bytes());
        bytes.extend_from_slice(b"Hello");
        let mut stream = Stream::new(StdRc::from(bytes.as_slice()), Endianness::Big);
        let stxt = Stxt::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(stxt.text, "Hello");
        assert!(stxt.formatting.is_empty());
    }
}
