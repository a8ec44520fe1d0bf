//! Decodes the non-script assets a movie embeds: indexed bitmaps, palettes,
//! sounds, and text.

pub mod bitmap;
pub mod palette;
pub mod sound;
pub mod text;

pub use bitmap::{decode as decode_bitmap, DecodedBitmap, PixelFormat};
pub use palette::{BuiltInPalette, PaletteRef, PaletteResolver};
