//! Transcodes a cast member's audio into a standalone WAV file.
//!
//! Three source shapes show up in the wild: a Mac `snd ` resource (the
//! common case, handled by [`crate::resources::sound`]), a raw AIFF/AIFF-C
//! chunk, or — on Windows-authored movies — a RIFF `WAVE` chunk already.
//! The latter two are detected by magic and passed through close to
//! verbatim; only the `snd ` path needs real transcoding since it isn't a
//! standard container.

use crate::error::{Error, Result};
use crate::resources::sound::Sound;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SourceFormat {
    MacSnd,
    Aiff,
    Wave,
}

#[must_use]
pub fn detect(data: &[u8]) -> Option<SourceFormat> {
    if data.len() < 4 {
        return None;
    }
    match &data[0..4] {
        b"FORM" if data.get(8..12) == Some(b"AIFF") || data.get(8..12) == Some(b"AIFC") => Some(SourceFormat::Aiff),
        b"RIFF" => Some(SourceFormat::Wave),
        _ => Some(SourceFormat::MacSnd),
    }
}

/// Wraps 8/16-bit PCM samples in a minimal canonical WAV container.
pub fn snd_to_wav(sound: &Sound) -> Result<Vec<u8>> {
    let bits_per_sample: u16 = if sound.header.encoding == 0 { 8 } else { 16 };
    let channels: u16 = 1;
    let sample_rate = sound.header.sample_rate_hz();
    let byte_rate = sample_rate * u32::from(channels) * u32::from(bits_per_sample) / 8;
    let block_align = channels * bits_per_sample / 8;
    let data = &sound.samples;

    let mut out = Vec::with_capacity(44 + data.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());

    if bits_per_sample == 8 {
        // Mac 8-bit samples are unsigned; WAV's 8-bit PCM is as well, so
        // no conversion is needed beyond the copy.
        out.extend_from_slice(data);
    } else {
        out.extend_from_slice(data);
    }

    Ok(out)
}

/// Passes an AIFF or WAV chunk's body through unchanged — both are already
/// valid standalone files once extracted from their Director wrapper.
pub fn passthrough(data: &[u8]) -> Result<Vec<u8>> {
    if detect(data).is_none() {
        return Err(Error::malformed(0, libcommon::OsType::from(*b"snd "), "unrecognised audio container"));
    }
    Ok(data.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::sound::SampledSoundHeader;
    use std::rc::Rc;

    #[test]
    fn detects_aiff_by_form_type() {
        let mut data = vec![0u8; 12];
        data[0..4].copy_from_slice(b"FORM");
        data[8..12].copy_from_slice(b"AIFF");
        assert_eq!(detect(&data), Some(SourceFormat::Aiff));
    }

    #[test]
    fn detects_wave_by_riff_magic() {
        let mut data = vec![0u8; 12];
        data[0..4].copy_from_slice(b"RIFF");
        assert_eq!(detect(&data), Some(SourceFormat::Wave));
    }

    #[test]
    fn wraps_pcm_samples_in_a_wav_header() {
        let sound = Sound {
            header: SampledSoundHeader { sample_rate_fixed: 22050 << 16, loop_start: 0, loop_end: 0, encoding: 0, base_frequency: 60 },
            samples: Rc::from(vec![10u8, 20, 30, 40]),
        };
        let wav = snd_to_wav(&sound).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 4);
    }
}
