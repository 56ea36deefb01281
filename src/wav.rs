//! PCM16 stereo WAV output: 44-byte canonical header followed by raw frames.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::buffer::StereoFrame;
use crate::config::{AUDIO_FORMAT_PCM, BITS_PER_SAMPLE, BLOCK_ALIGN, NUM_CHANNELS, SUBCHUNK1_SIZE};
use crate::error::{BumpError, Result};

/// Size of the canonical PCM header on disk.
pub const HEADER_LEN: usize = 44;

/// Canonical RIFF/WAVE header fields, in file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WavHeader {
    pub chunk_size: u32,
    pub subchunk1_size: u32,
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub subchunk2_size: u32,
}

impl WavHeader {
    /// Header for `frame_count` frames of 16-bit stereo PCM.
    pub fn pcm16_stereo(sample_rate: u32, frame_count: u32) -> Self {
        let subchunk2_size = frame_count * BLOCK_ALIGN as u32;
        Self {
            chunk_size: 4 + (8 + SUBCHUNK1_SIZE) + (8 + subchunk2_size),
            subchunk1_size: SUBCHUNK1_SIZE,
            audio_format: AUDIO_FORMAT_PCM,
            num_channels: NUM_CHANNELS,
            sample_rate,
            byte_rate: sample_rate * BLOCK_ALIGN as u32,
            block_align: BLOCK_ALIGN,
            bits_per_sample: BITS_PER_SAMPLE,
            subchunk2_size,
        }
    }

    /// Serialize field by field, little-endian, independent of struct layout.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let chunk_size = self.chunk_size.to_le_bytes();
        let subchunk1_size = self.subchunk1_size.to_le_bytes();
        let audio_format = self.audio_format.to_le_bytes();
        let num_channels = self.num_channels.to_le_bytes();
        let sample_rate = self.sample_rate.to_le_bytes();
        let byte_rate = self.byte_rate.to_le_bytes();
        let block_align = self.block_align.to_le_bytes();
        let bits_per_sample = self.bits_per_sample.to_le_bytes();
        let subchunk2_size = self.subchunk2_size.to_le_bytes();

        let fields: [&[u8]; 13] = [
            b"RIFF",
            &chunk_size,
            b"WAVE",
            b"fmt ",
            &subchunk1_size,
            &audio_format,
            &num_channels,
            &sample_rate,
            &byte_rate,
            &block_align,
            &bits_per_sample,
            b"data",
            &subchunk2_size,
        ];

        let mut out = [0u8; HEADER_LEN];
        let mut pos = 0;
        for field in fields {
            out[pos..pos + field.len()].copy_from_slice(field);
            pos += field.len();
        }
        debug_assert_eq!(pos, HEADER_LEN);
        out
    }
}

/// Output file, opened (and truncated) once and closed on drop.
pub struct WavFile<W: Write = File> {
    inner: W,
}

impl WavFile<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| BumpError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file))
    }
}

impl<W: Write> WavFile<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write the 44-byte header in one piece.
    pub fn write_header(&mut self, sample_rate: u32, frame_count: usize) -> Result<()> {
        let frame_count = u32::try_from(frame_count)
            .ok()
            .filter(|&n| {
                n.checked_mul(BLOCK_ALIGN as u32)
                    .and_then(|data| data.checked_add(36))
                    .is_some()
            })
            .ok_or_else(|| {
                BumpError::HeaderWrite(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} frames do not fit a RIFF size field", frame_count),
                ))
            })?;
        let header = WavHeader::pcm16_stereo(sample_rate, frame_count);
        self.inner
            .write_all(&header.to_bytes())
            .map_err(BumpError::HeaderWrite)
    }

    /// Write interleaved frames, reporting how many whole frames made it out
    /// if the writer stops early.
    pub fn write_frames(&mut self, frames: &[StereoFrame]) -> Result<()> {
        let requested = frames.len();
        let pcm: Vec<u8> = frames.iter().flat_map(|f| f.to_le_bytes()).collect();

        let mut pos = 0;
        while pos < pcm.len() {
            match self.inner.write(&pcm[pos..]) {
                Ok(0) => {
                    return Err(BumpError::DataWrite {
                        written: pos / BLOCK_ALIGN as usize,
                        requested,
                        source: io::ErrorKind::WriteZero.into(),
                    });
                }
                Ok(n) => pos += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(BumpError::DataWrite {
                        written: pos / BLOCK_ALIGN as usize,
                        requested,
                        source,
                    });
                }
            }
        }
        self.inner.flush().map_err(|source| BumpError::DataWrite {
            written: requested,
            requested,
            source,
        })
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.inner
    }
}
