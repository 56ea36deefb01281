use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort the stimulus pipeline.
#[derive(Error, Debug)]
pub enum BumpError {
    #[error("failed to allocate a buffer of {frames} frames")]
    Allocation { frames: usize },

    #[error("failed to open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("frequency {frequency} Hz violates the Nyquist limit for {sample_rate} Hz")]
    NyquistViolation { frequency: f64, sample_rate: u32 },

    #[error("failed to write WAV header: {0}")]
    HeaderWrite(#[source] io::Error),

    #[error("short write: {written} of {requested} frames written: {source}")]
    DataWrite {
        written: usize,
        requested: usize,
        #[source]
        source: io::Error,
    },
}

/// Type alias for pipeline results
pub type Result<T> = std::result::Result<T, BumpError>;
