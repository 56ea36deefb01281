//! In-memory stereo PCM frames.

use crate::error::{BumpError, Result};

/// One sample instant across both channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StereoFrame {
    pub left: i16,
    pub right: i16,
}

impl StereoFrame {
    pub const SILENCE: StereoFrame = StereoFrame { left: 0, right: 0 };

    /// Interleaved little-endian bytes, left first.
    pub fn to_le_bytes(self) -> [u8; 4] {
        let [l0, l1] = self.left.to_le_bytes();
        let [r0, r1] = self.right.to_le_bytes();
        [l0, l1, r0, r1]
    }
}

/// Fixed-length sequence of frames covering the whole file.
///
/// Frames start out silent, so any range no segment writes to stays zero.
#[derive(Debug)]
pub struct SampleBuffer {
    frames: Vec<StereoFrame>,
}

impl SampleBuffer {
    /// Allocate `frame_count` silent frames, reporting allocation failure
    /// instead of aborting.
    pub fn zeroed(frame_count: usize) -> Result<Self> {
        let mut frames = Vec::new();
        frames
            .try_reserve_exact(frame_count)
            .map_err(|_| BumpError::Allocation {
                frames: frame_count,
            })?;
        frames.resize(frame_count, StereoFrame::SILENCE);
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[StereoFrame] {
        &self.frames
    }

    /// Mutable view of `len` frames starting at `offset`.
    ///
    /// Panics if the range runs past the end of the buffer.
    pub fn segment_mut(&mut self, offset: usize, len: usize) -> &mut [StereoFrame] {
        &mut self.frames[offset..offset + len]
    }
}
