//! Resolves a cast member's palette: either one of Director's eight
//! built-in palettes (generated here, since they're not stored in the
//! file) or a `CLUT` chunk looked up through the key table.

use crate::collections::riff::{ChunkId, ChunkIndex};
use crate::error::Result;
use crate::resources::{Clut, KeyTable};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuiltInPalette {
    SystemMac,
    SystemWin,
    Rainbow,
    Grayscale,
    PastelsOriginal,
    VividOriginal,
    NtscOriginal,
    MetallicOriginal,
}

/// Either a built-in palette or an explicit `CLUT` chunk id; matches how a
/// sprite or cast member's `paletteId` field is actually encoded on disk
/// (small negative numbers select a built-in, anything else is a chunk id).
#[derive(Clone, Copy, Debug)]
pub enum PaletteRef {
    BuiltIn(BuiltInPalette),
    Custom(ChunkId),
}

impl PaletteRef {
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        let built_in = match raw {
            -1 => Some(BuiltInPalette::SystemMac),
            -2 => Some(BuiltInPalette::SystemWin),
            -3 => Some(BuiltInPalette::Rainbow),
            -4 => Some(BuiltInPalette::Grayscale),
            -5 => Some(BuiltInPalette::PastelsOriginal),
            -6 => Some(BuiltInPalette::VividOriginal),
            -7 => Some(BuiltInPalette::NtscOriginal),
            -8 => Some(BuiltInPalette::MetallicOriginal),
            _ => None,
        };
        match built_in {
            Some(palette) => Some(Self::BuiltIn(palette)),
            None if raw > 0 => Some(Self::Custom(ChunkId(raw))),
            None => None,
        }
    }
}

pub struct PaletteResolver<'a> {
    index: &'a ChunkIndex,
    key_table: &'a KeyTable,
}

impl<'a> PaletteResolver<'a> {
    #[must_use]
    pub fn new(index: &'a ChunkIndex, key_table: &'a KeyTable) -> Self {
        Self { index, key_table }
    }

    pub fn resolve(&self, reference: PaletteRef) -> Result<Vec<(u8, u8, u8)>> {
        match reference {
            PaletteRef::BuiltIn(palette) => Ok(generate(palette)),
            PaletteRef::Custom(id) => {
                let clut = self.index.load(id, Clut::parse)?;
                Ok(clut.colors.clone())
            },
        }
    }

    /// Looks up the `CLUT` chunk owned by a cast member, if it has one.
    #[must_use]
    pub fn member_clut(&self, owner: ChunkId) -> Option<ChunkId> {
        self.key_table.owned_by(owner, Some(libcommon::OsType::from(*b"CLUT"))).next()
    }
}

#[must_use]
pub fn generate(palette: BuiltInPalette) -> Vec<(u8, u8, u8)> {
    match palette {
        BuiltInPalette::SystemMac | BuiltInPalette::SystemWin => system_cube(),
        BuiltInPalette::Grayscale => grayscale(),
        BuiltInPalette::Rainbow => rainbow(),
        // The four "original" tint sets are artist-authored stock
        // palettes Director ships as resources rather than generating;
        // without the original binary data, the closest honest stand-in
        // is the 6x6x6 system cube.
        BuiltInPalette::PastelsOriginal | BuiltInPalette::VividOriginal | BuiltInPalette::NtscOriginal | BuiltInPalette::MetallicOriginal => system_cube(),
    }
}

/// The classic Mac OS 8-bit palette: every combination of 6 evenly spaced
/// levels per channel (216 colors), padded to 256 with black.
fn system_cube() -> Vec<(u8, u8, u8)> {
    const LEVELS: [u8; 6] = [0xFF, 0xCC, 0x99, 0x66, 0x33, 0x00];
    let mut colors = Vec::with_capacity(256);
    for r in LEVELS {
        for g in LEVELS {
            for b in LEVELS {
                colors.push((r, g, b));
            }
        }
    }
    colors.resize(256, (0, 0, 0));
    colors
}

fn grayscale() -> Vec<(u8, u8, u8)> {
    (0..256).map(|i| (i as u8, i as u8, i as u8)).collect()
}

fn rainbow() -> Vec<(u8, u8, u8)> {
    (0..256)
        .map(|i| {
            let hue = i as f32 / 256.0;
            hsv_to_rgb(hue)
        })
        .collect()
}

fn hsv_to_rgb(hue: f32) -> (u8, u8, u8) {
    let h = hue * 6.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    (((r * 255.0) as u8), ((g * 255.0) as u8), ((b * 255.0) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_negative_ids_map_to_known_palettes() {
        assert!(matches!(PaletteRef::from_raw(-1), Some(PaletteRef::BuiltIn(BuiltInPalette::SystemMac))));
        assert!(matches!(PaletteRef::from_raw(-4), Some(PaletteRef::BuiltIn(BuiltInPalette::Grayscale))));
    }

    #[test]
    fn positive_ids_are_custom_chunks() {
        assert!(matches!(PaletteRef::from_raw(200), Some(PaletteRef::Custom(ChunkId(200)))));
    }

    #[test]
    fn system_cube_has_256_entries() {
        assert_eq!(system_cube().len(), 256);
    }

    #[test]
    fn grayscale_is_monotonic() {
        let palette = grayscale();
        assert_eq!(palette[0], (0, 0, 0));
        assert_eq!(palette[255], (255, 255, 255));
    }
}
