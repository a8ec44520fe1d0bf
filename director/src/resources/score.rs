//! The score (`VWSC`): the frame-by-frame channel assignments that drive
//! playback. Director only stores the channels that change between two
//! frames, so each frame here is the fully resolved state after applying
//! that frame's deltas, not the on-disk delta itself.

use libcommon::Stream;

use crate::collections::riff::ChunkId;
use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Channel {
    pub member: Option<ChunkId>,
    pub position: (i16, i16),
    pub ink: u8,
}

#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub channels: Vec<Channel>,
}

#[derive(Clone, Debug, Default)]
pub struct Score {
    pub frames: Vec<Frame>,
}

impl Score {
    pub fn parse(stream: &mut Stream, _len: u32) -> Result<Self> {
        let _header_len = stream.read_u32()?;
        let _total_len = stream.read_u32()?;
        let frame_count = stream.read_u32()?;
        let channel_count = stream.read_u16()?;
        let _frame_version = stream.read_u16()?;

        let mut state = vec![Channel::default(); channel_count as usize];
        let mut frames = Vec::with_capacity(frame_count as usize);

        for _ in 0..frame_count {
            let frame_size = stream.read_u16()?;
            let frame_end = stream.pos() + frame_size as usize - 2;
            while stream.pos() < frame_end {
                let field_size = stream.read_u16()?;
                let channel_index = stream.read_u16()?;
                if channel_index as usize >= state.len() {
                    stream.skip(field_size as usize)?;
                    continue;
                }
                let member_raw = stream.read_i32()?;
                let x = stream.read_i16()?;
                let y = stream.read_i16()?;
                let ink = stream.read_u8()?;
                let consumed = 4 + 2 + 2 + 1;
                if (field_size as usize) > consumed {
                    stream.skip(field_size as usize - consumed)?;
                }
                state[channel_index as usize] = Channel {
                    member: if member_raw == 0 { None } else { Some(ChunkId(member_raw)) },
                    position: (x, y),
                    ink,
                };
            }
            frames.push(Frame { channels: state.clone() });
        }

        Ok(Self { frames })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libcommon::Endianness;
    use std::rc::Rc;

    #[test]
    fn applies_a_single_channel_update_to_one_frame() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&12u32.to_be_bytes()); // header_len (unused)
        bytes.extend_from_slice(&0u32.to_be_bytes()); // total_len (unused)
        bytes.extend_from_slice(&1u32.to_be_bytes()); // frame_count
        bytes.extend_from_slice(&2u16.to_be_bytes()); // channel_count
        bytes.extend_from_slice(&0u16.to_be_bytes()); // frame_version

        let mut frame = vec![];
        frame.extend_from_slice(&9u16.to_be_bytes()); // field_size
        frame.extend_from_slice(&0u16.to_be_bytes()); // channel_index
        frame.extend_from_slice(&5i32.to_be_bytes()); // member
        frame.extend_from_slice(&10i16.to_be_bytes()); // x
        frame.extend_from_slice(&20i16.to_be_bytes()); // y
        frame.push(1); // ink
        let frame_size = (frame.len() + 2) as u16;

        bytes.extend_from_slice(&frame_size.to_be_bytes());
        bytes.extend_from_slice(&frame);

        let mut stream = Stream::new(Rc::from(bytes.as_slice()), Endianness::Big);
        let score = Score::parse(&mut stream, bytes.len() as u32).unwrap();
        assert_eq!(score.frames.len(), 1);
        assert_eq!(score.frames[0].channels[0].member, Some(ChunkId(5)));
        assert_eq!(score.frames[0].channels[0].position, (10, 20));
        assert_eq!(score.frames[0].channels[1].member, None);
    }
}
