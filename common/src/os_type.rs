use core::{char, fmt, str::FromStr};

/// A four-character chunk/resource type identifier (a "fourCC").
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct OsType([u8; 4]);

impl OsType {
    #[must_use]
    pub fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    fn fmt_write(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{}", char::from_u32(u32::from(*b)).unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }
        Ok(())
    }
}

impl FromStr for OsType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 {
            return Err("fourCC must be exactly 4 bytes");
        }
        let mut value = [0; 4];
        value.copy_from_slice(bytes);
        Ok(Self(value))
    }
}

impl From<[u8; 4]> for OsType {
    fn from(value: [u8; 4]) -> Self {
        Self(value)
    }
}

impl From<&[u8; 4]> for OsType {
    fn from(value: &[u8; 4]) -> Self {
        Self(*value)
    }
}

impl From<u32> for OsType {
    fn from(value: u32) -> Self {
        Self(value.to_be_bytes())
    }
}

impl From<OsType> for u32 {
    fn from(value: OsType) -> Self {
        u32::from_be_bytes(value.0)
    }
}

impl Default for OsType {
    fn default() -> Self {
        Self([0; 4])
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_write(f)
    }
}

impl fmt::Debug for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OsType(")?;
        self.fmt_write(f)?;
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u32() {
        let value = OsType::from(*b"Lscr");
        assert_eq!(u32::from(value), 0x4C73_6372);
        assert_eq!(value.to_string(), "Lscr");
    }

    #[test]
    fn rejects_wrong_length_strings() {
        assert!("abc".parse::<OsType>().is_err());
        assert!("abcde".parse::<OsType>().is_err());
    }
}
