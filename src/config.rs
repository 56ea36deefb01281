//! Fixed stimulus configuration and PCM format constants.

use std::path::PathBuf;

/// Number of interleaved channels (left, right).
pub const NUM_CHANNELS: u16 = 2;
/// Bits per sample for integer PCM.
pub const BITS_PER_SAMPLE: u16 = 16;
/// WAV format tag for integer PCM.
pub const AUDIO_FORMAT_PCM: u16 = 1;
/// Size of the `fmt ` subchunk body for PCM.
pub const SUBCHUNK1_SIZE: u32 = 16;
/// Bytes occupied by one stereo frame on disk.
pub const BLOCK_ALIGN: u16 = NUM_CHANNELS * BITS_PER_SAMPLE / 8;
/// Number of equal-length bump segments the file is split into.
pub const BUMPS: usize = 10;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Output WAV file.
    pub output: PathBuf,
    /// Sample rate (Hz).
    pub sample_rate: u32,
    /// Bump carrier frequency (Hz).
    pub frequency: f64,
    /// Envelope time constant, in samples.
    pub decay_rate: f64,
    /// Total duration (seconds).
    pub duration: f64,
    /// Peak amplitude applied to both channels before polarity.
    pub amplitude: f64,
}

impl Config {
    /// Total frames in the file.
    pub fn frame_count(&self) -> usize {
        (self.duration * self.sample_rate as f64) as usize
    }

    /// Frames per bump segment. Any remainder is left as trailing silence.
    pub fn segment_frames(&self) -> usize {
        self.frame_count() / BUMPS
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from("./bump.wav"),
            sample_rate: 44100,
            frequency: 64.5,
            decay_rate: 680.0,
            duration: 1.0,
            amplitude: i16::MAX as f64,
        }
    }
}
