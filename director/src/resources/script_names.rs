//! The script name table (`Lnam`): every symbol, global, and literal name
//! referenced by the movie's scripts, indexed by position. Bytecode operands
//! that name a variable or property are indices into this table.

use libcommon::Stream;

use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct ScriptNames {
    pub names: Vec<String>,
}

impl ScriptNames {
    pub fn parse(stream: &mut Stream, _len: u32) -> Result<Self> {
        let _unknown_a = stream.read_u32()?;
        let _unknown_b = stream.read_u32()?;
        let _len1 = stream.read_u32()?;
        let _len2 = stream.read_u32()?;
        let names_offset = stream.read_u16()?;
        let count = stream.read_u16()?;

        stream.seek(names_offset as usize)?;
        let mut names = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = stream.read_u8()?;
            let bytes = stream.read_bytes(len as usize)?;
            names.push(bytes.iter().map(|&b| b as char).collect());
        }

        Ok(Self { names })
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libcommon::Endianness;
    use std::rc::Rc;

    #[test]
    fn parses_names_at_the_declared_offset() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&20u16.to_be_bytes()); // names_offset
        bytes.extend_from_slice(&2u16.to_be_bytes()); // count
        bytes.resize(20, 0);
        bytes.push(2);
        bytes.extend_from_slice(b"me");
        bytes.push(5);
        bytes.extend_from_slice(b"sound");

        let mut stream = Stream::new(Rc::from(bytes.as_slice()), Endianness::Big);
        let names = ScriptNames::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(names.names, vec!["me", "sound"]);
        assert_eq!(names.get(1), Some("sound"));
    }
}
