//! A minimal, data-only read of the score: which cast member sits in each
//! sprite channel on each frame, and where. This crate never renders a
//! frame — no ink modes, no transitions, no Xtra host — but a surprising
//! amount of tooling only needs to know channel assignments, which this
//! gets for free once `VWSC` is parsed.

use crate::collections::riff::ChunkIndex;
use crate::error::{Error, Result};
use crate::resources::Score;

pub use crate::resources::score::{Channel, Frame};

pub struct ScorePlayer {
    score: std::rc::Rc<Score>,
}

impl ScorePlayer {
    pub fn load(index: &ChunkIndex) -> Result<Self> {
        let id = index.first(*b"VWSC").ok_or_else(|| Error::ChunkMissing(libcommon::OsType::from(*b"VWSC")))?;
        let score = index.load(id, Score::parse)?;
        Ok(Self { score })
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.score.frames.len()
    }

    #[must_use]
    pub fn frame(&self, number: usize) -> Option<&Frame> {
        self.score.frames.get(number)
    }
}
