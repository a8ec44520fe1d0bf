use libcommon::{OsType, StreamError};

pub type Result<T> = core::result::Result<T, Error>;

/// Error kinds surfaced while loading a movie or reading one of its chunks.
///
/// Container-level failures (`NotRiffx`, `UnsupportedCodec`, …) abort the
/// load. Per-script decompilation failures never appear here — an
/// undecodable opcode becomes a comment node in the AST instead, so a
/// partially-decompiled script is still returned to the caller (see
/// [`crate::ast`]).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("not a RIFX container")]
    NotRiffx,
    #[error("unsupported codec {0}")]
    UnsupportedCodec(OsType),
    #[error("malformed {fourcc} chunk {id}: {reason}")]
    MalformedChunk { id: i32, fourcc: OsType, reason: String },
    #[error("unsupported compression {0:?}")]
    CompressionUnsupported(crate::collections::riff::MoaId),
    #[error("failed to decompress chunk {0}")]
    DecompressFailed(i32),
    #[error("no {0} chunk in this file")]
    ChunkMissing(OsType),
    #[error("end of stream: {0}")]
    EndOfStream(#[from] StreamError),
    #[error("unsupported or unrecognised Director version")]
    BadVersion,
    /// Catch-all for `ensure_sample!` failures: a structural assumption
    /// about a chunk's layout didn't hold for this file.
    #[error(transparent)]
    Sample(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn malformed(id: i32, fourcc: impl Into<OsType>, reason: impl Into<String>) -> Self {
        Self::MalformedChunk { id, fourcc: fourcc.into(), reason: reason.into() }
    }
}
