//! The raw Mac `snd ` resource, in its original Sound Manager layout. This
//! module only walks the resource far enough to find the sample header and
//! the PCM data that follows it; [`crate::media::sound`] turns that into a
//! playable WAV.

use std::rc::Rc;

use libcommon::Stream;

use crate::error::Result;

#[derive(Clone, Copy, Debug)]
pub struct SampledSoundHeader {
    pub sample_rate_fixed: u32,
    pub loop_start: u32,
    pub loop_end: u32,
    pub encoding: u8,
    pub base_frequency: u8,
}

impl SampledSoundHeader {
    /// `sampleRate` is a 16.16 fixed-point Mac `Fixed`; callers almost always
    /// want whole hertz.
    #[must_use]
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_fixed >> 16
    }
}

#[derive(Clone, Debug)]
pub struct Sound {
    pub header: SampledSoundHeader,
    pub samples: Rc<[u8]>,
}

impl Sound {
    pub fn parse(stream: &mut Stream, _len: u32) -> Result<Self> {
        let format = stream.read_i16()?;
        ensure_sample!(format == 1 || format == 2, "unrecognised snd resource format {}", format);

        if format == 1 {
            let data_format_count = stream.read_i16()?;
            for _ in 0..data_format_count {
                let _data_format_id = stream.read_i32()?;
                let _init_option = stream.read_i32()?;
            }
        } else {
            let _ref_count = stream.read_i16()?;
        }

        let command_count = stream.read_i16()?;
        let mut sample_ptr_is_null = true;
        for _ in 0..command_count {
            let cmd = stream.read_u16()?;
            let _param1 = stream.read_i16()?;
            let param2 = stream.read_i32()?;
            // bufferCmd/soundCmd (0x8050/0x8051) carry the header offset in
            // param2 when the high bit of cmd is set (data, not a pointer).
            if cmd & 0x8000 != 0 {
                sample_ptr_is_null = param2 == 0;
            }
        }
        ensure_sample!(sample_ptr_is_null, "snd resource references external sample data");

        let _sample_ptr = stream.read_u32()?;
        let length = stream.read_u32()?;
        let sample_rate_fixed = stream.read_u32()?;
        let loop_start = stream.read_u32()?;
        let loop_end = stream.read_u32()?;
        let encoding = stream.read_u8()?;
        let base_frequency = stream.read_u8()?;
        let samples = Rc::from(stream.read_bytes(length as usize)?.to_vec());

        Ok(Self {
            header: SampledSoundHeader { sample_rate_fixed, loop_start, loop_end, encoding, base_frequency },
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libcommon::Endianness;
    use std::rc::Rc as StdRc;

    #[test]
    fn parses_a_minimal_format_1_resource() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&1i16.to_be_bytes()); // format
        bytes.extend_from_slice(&0i16.to_be_bytes()); // data_format_count
        bytes.extend_from_slice(&0i16.to_be_bytes()); // command_count
        bytes.extend_from_slice(&0u32.to_be_bytes()); // sample_ptr
        bytes.extend_from_slice(&4u32.to_be_bytes()); // length
        bytes.extend_from_slice(&(22050u32 << 16).to_be_bytes()); // sample_rate
        bytes.extend_from_slice(&0u32.to_be_bytes()); // loop_start
        bytes.extend_from_slice(&0u32.to_be_bytes()); // loop_end
        bytes.push(0); // encoding
        bytes.push(60); // base_frequency
        bytes.extend_from_slice(&[1, 2, 3, 4]);

        let mut stream = Stream::new(StdRc::from(bytes.as_slice()), Endianness::Big);
        let sound = Sound::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(sound.header.sample_rate_hz(), 22050);
        assert_eq!(&*sound.samples, &[1, 2, 3, 4]);
    }
}
