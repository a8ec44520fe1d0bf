//! Open-source Director movie parser and Lingo decompiler.
//!
//! Reads RIFX-family container files (`.dir`/`.dxr`/`.dcr`/`.cct`/`.cst`/
//! `.cxt`), indexes their chunks (plain `mmap` or compressed Afterburner),
//! and decompiles the Lingo bytecode stored in `Lscr` chunks back into
//! source text. Embedded bitmaps, palettes, sounds, and text records are
//! also decoded.

#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_lines,
)]

#[macro_use]
extern crate libcommon;

pub mod ast;
pub mod bytecode;
mod collections;
mod detection;
mod error;
pub mod facade;
pub mod media;
pub mod name;
pub mod player;
pub mod resources;

pub use collections::riff::{ChunkId, ChunkIndex, MoaId};
pub use detection::Version;
pub use error::{Error, Result};
pub use facade::{AssetHandle, LoadOptions, Movie, ScriptHandle};

#[must_use]
pub fn name(with_version: bool) -> String {
    let mut name = "Director".to_string();
    if with_version {
        name.push(' ');
        name.push_str(env!("CARGO_PKG_VERSION"));
    }
    name
}
