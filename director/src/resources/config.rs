//! The movie configuration chunk (`DRCF` pre-D6, `VWCF` from D6 on).

use bitflags::bitflags;
use libcommon::Stream;

use crate::{detection::Version, error::Result};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Rect {
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
}

impl Rect {
    fn read(stream: &mut Stream) -> Result<Self> {
        let top = stream.read_i16()?;
        let left = stream.read_i16()?;
        let bottom = stream.read_i16()?;
        let right = stream.read_i16()?;
        Ok(Self { top, left, bottom, right })
    }

    #[must_use]
    pub fn width(self) -> i32 {
        i32::from(self.right) - i32::from(self.left)
    }

    #[must_use]
    pub fn height(self) -> i32 {
        i32::from(self.bottom) - i32::from(self.top)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StageColor {
    /// Pre-D7: an index into the current palette.
    Indexed(u16),
    /// D7+: a literal RGB triple.
    Rgb(u8, u8, u8),
}

bitflags! {
    #[derive(Default)]
    pub struct Flags: u32 {
        const PALETTE_MAPPING      = 0x40;
        const UPDATE_MOVIE_ENABLED = 0x200;
        const PRELOAD_EVENT_ABORT  = 0x400;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Platform {
    Unknown,
    Mac,
    Windows,
}

impl Platform {
    fn from_u16(value: u16) -> Self {
        match value {
            1 => Self::Mac,
            2 => Self::Windows,
            _ => Self::Unknown,
        }
    }
}

/// The parsed movie configuration. Field names follow Lingo's own property
/// names (`stageWidth`/`stageHeight`/`frameRate`/`directorVersion`/
/// `protection`); the handful of fields with no behavioural meaning in this
/// crate are kept as plain reserved words so the chunk still round-trips.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub own_size: u16,
    pub movie_rect: Rect,
    pub min_member: i16,
    pub max_member: i16,
    pub legacy_tempo: u8,
    pub legacy_stage_color_is_black: bool,
    reserved: [u16; 7],
    pub raw_version: u16,
    pub stage_color: StageColor,
    pub default_color_depth: u16,
    pub max_cast_color_depth: u16,
    pub flags: Flags,
    pub frame_rate: u16,
    pub platform: Platform,
    pub checksum: u32,
    pub max_member_resource_num: u32,
    pub protection: u16,
}

impl Config {
    #[must_use]
    pub fn director_version(&self) -> Version {
        Version::from_raw(self.raw_version)
    }

    #[must_use]
    pub fn stage_width(&self) -> i32 {
        self.movie_rect.width()
    }

    #[must_use]
    pub fn stage_height(&self) -> i32 {
        self.movie_rect.height()
    }

    /// Transcribed from ProjectorRays: set `fileVersion` to the movie's
    /// actual version and bump the protection counter if it's evenly
    /// divisible by 23. Its real-world effect on Director's protection
    /// scheme is not independently verified here (see DESIGN.md).
    pub fn unprotect(&mut self) {
        self.raw_version = self.director_version().0;
        if self.protection % 23 == 0 {
            self.protection += 1;
        }
    }

    pub fn parse(stream: &mut Stream, len: u32) -> Result<Self> {
        let start = stream.pos();

        // The director-version word lives at a fixed offset; peek it first
        // so later fields can branch on it, then rewind and read everything
        // in file order.
        stream.seek(start + 36)?;
        let raw_version = stream.read_u16()?;
        let version = Version::from_raw(raw_version);
        stream.seek(start)?;

        let own_size = stream.read_u16()?;
        ensure_sample!(u32::from(own_size) <= len.max(own_size.into()), "Config size mismatch ({} vs chunk length {})", own_size, len);
        let movie_rect = Rect::read(stream)?;
        ensure_sample!(movie_rect.right >= movie_rect.left, "movieRight < movieLeft");
        ensure_sample!(movie_rect.bottom >= movie_rect.top, "movieBottom < movieTop");
        let min_member = stream.read_i16()?;
        let max_member = stream.read_i16()?;
        let legacy_tempo = stream.read_u8()?;
        let legacy_stage_color_is_black = stream.read_u8()? != 0;

        let mut reserved = [0u16; 7];
        reserved[0] = stream.read_u16()?;
        reserved[1] = stream.read_u16()?;
        reserved[2] = stream.read_u16()?;
        reserved[3] = u16::from(stream.read_u8()?);
        reserved[4] = u16::from(stream.read_u8()?);
        reserved[5] = stream.read_u16()?; // covers the i32 "reserved_1e" as two words
        reserved[6] = stream.read_u16()?;
        let _ = stream.read_u16()?; // reserved_26
        let raw_version_reread = stream.read_u16()?;
        debug_assert_eq!(raw_version, raw_version_reread);

        let stage_color = if version.0 >= 700 {
            let r = stream.read_u8()?;
            let g = stream.read_u8()?;
            let b = stream.read_u8()?;
            let _pad = stream.read_u8()?;
            StageColor::Rgb(r, g, b)
        } else {
            StageColor::Indexed(stream.read_u16()?)
        };

        let default_color_depth = stream.read_u16()?;
        let max_cast_color_depth = stream.read_u16()?;
        let flags_bits = stream.read_u32()?;
        let flags = Flags::from_bits_truncate(flags_bits);
        let frame_rate = stream.read_u16()?;
        let platform = Platform::from_u16(stream.read_u16()?);
        let checksum = stream.read_u32()?;
        let max_member_resource_num = stream.read_u32()?;
        let protection = stream.read_u16()?;

        Ok(Self {
            own_size,
            movie_rect,
            min_member,
            max_member,
            legacy_tempo,
            legacy_stage_color_is_black,
            reserved,
            raw_version,
            stage_color,
            default_color_depth,
            max_cast_color_depth,
            flags,
            frame_rate,
            platform,
            checksum,
            max_member_resource_num,
            protection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libcommon::Endianness;
    use std::rc::Rc;

    fn sample(version: u16, dot_color: bool) -> Vec<u8> {
        let mut bytes = vec![0u8; 0];
        bytes.extend_from_slice(&40u16.to_be_bytes()); // own_size
        bytes.extend_from_slice(&0i16.to_be_bytes()); // top
        bytes.extend_from_slice(&0i16.to_be_bytes()); // left
        bytes.extend_from_slice(&480i16.to_be_bytes()); // bottom
        bytes.extend_from_slice(&640i16.to_be_bytes()); // right
        bytes.extend_from_slice(&1i16.to_be_bytes()); // min_member
        bytes.extend_from_slice(&100i16.to_be_bytes()); // max_member
        bytes.push(15); // legacy_tempo
        bytes.push(0); // legacy_stage_color_is_black
        bytes.extend_from_slice(&[0u8; 2]); // reserved[0]
        bytes.extend_from_slice(&[0u8; 2]); // reserved[1]
        bytes.extend_from_slice(&[0u8; 2]); // reserved[2]
        bytes.push(0); // reserved[3]
        bytes.push(0); // reserved[4]
        bytes.extend_from_slice(&[0u8; 2]); // reserved[5]
        bytes.extend_from_slice(&[0u8; 2]); // reserved[6]
        bytes.extend_from_slice(&[0u8; 2]); // reserved_26
        bytes.extend_from_slice(&version.to_be_bytes()); // version word at offset 36
        if dot_color {
            bytes.extend_from_slice(&[10, 20, 30, 0]);
        } else {
            bytes.extend_from_slice(&0u16.to_be_bytes());
        }
        bytes.extend_from_slice(&8u16.to_be_bytes()); // default_color_depth
        bytes.extend_from_slice(&8u16.to_be_bytes()); // max_cast_color_depth
        bytes.extend_from_slice(&0u32.to_be_bytes()); // flags
        bytes.extend_from_slice(&15u16.to_be_bytes()); // frame_rate
        bytes.extend_from_slice(&1u16.to_be_bytes()); // platform
        bytes.extend_from_slice(&0u32.to_be_bytes()); // checksum
        bytes.extend_from_slice(&0u32.to_be_bytes()); // max_member_resource_num
        bytes.extend_from_slice(&0u16.to_be_bytes()); // protection
        bytes
    }

    #[test]
    fn parses_pre_d7_indexed_stage_color() {
        let bytes = sample(1218, false);
        let mut stream = Stream::new(Rc::from(bytes.as_slice()), Endianness::Big);
        let config = Config::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(config.director_version().0, 600);
        assert!(matches!(config.stage_color, StageColor::Indexed(0)));
        assert_eq!(config.stage_width(), 640);
        assert_eq!(config.stage_height(), 480);
    }

    #[test]
    fn parses_d7_plus_rgb_stage_color() {
        let bytes = sample(1224, true);
        let mut stream = Stream::new(Rc::from(bytes.as_slice()), Endianness::Big);
        let config = Config::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(config.director_version().0, 700);
        assert_eq!(config.stage_color, StageColor::Rgb(10, 20, 30));
    }

    #[test]
    fn unprotect_bumps_protection_when_divisible_by_23() {
        let bytes = sample(1224, true);
        let mut stream = Stream::new(Rc::from(bytes.as_slice()), Endianness::Big);
        let mut config = Config::parse(&mut stream, bytes.len() as u32).unwrap();
        config.protection = 46; // divisible by 23
        config.unprotect();
        assert_eq!(config.protection, 47);
    }
}
