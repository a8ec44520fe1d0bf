//! Shared primitives used by the `director` crate: an endian-aware,
//! bounds-checked byte stream, a four-character type identifier, and the
//! small set of macros and traits every chunk codec builds on.

#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
)]

mod macros;
mod os_type;
mod stream;

pub use os_type::OsType;
pub use stream::{Endianness, Stream, StreamError};

pub type Result<T> = core::result::Result<T, StreamError>;
