mod buffer;
mod bump;
mod config;
mod error;
mod wav;

use std::process::ExitCode;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use buffer::SampleBuffer;
use bump::fill_bumps;
use config::{BLOCK_ALIGN, BUMPS, Config};
use wav::{HEADER_LEN, WavFile};

#[derive(Parser, Debug)]
#[command(name = "bump-wav", version)]
#[command(about = "Write ./bump.wav: ten decaying 64.5 Hz stereo bumps for amplifier protection testing")]
struct Args {}

/// Open the output, synthesize every segment, then write header and data.
/// Stops at the first failure; a partially written file is left in place.
fn run(config: &Config, progress: &ProgressBar) -> error::Result<()> {
    let mut out = WavFile::create(&config.output)?;

    let frame_count = config.frame_count();
    let mut buffer = SampleBuffer::zeroed(frame_count)?;
    debug!(
        "Allocated {} frames, {} per segment",
        frame_count,
        config.segment_frames()
    );

    fill_bumps(config, &mut buffer, |index, polarity| {
        debug!(
            "Segment {}: polarity left {:+}, right {:+}",
            index + 1,
            polarity.left,
            polarity.right
        );
        progress.inc(1);
    })?;

    let frames = buffer.frames();
    out.write_header(config.sample_rate, frames.len())?;
    out.write_frames(frames)?;
    progress.inc(1);

    info!(
        "Wrote {:?}: {} frames, {} bytes",
        config.output,
        frames.len(),
        HEADER_LEN + frames.len() * BLOCK_ALIGN as usize
    );
    Ok(())
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(BUMPS as u64 + 1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.set_message("segments");
    pb
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let _args = Args::parse();

    let config = Config::default();
    info!(
        "Generating {} bumps at {} Hz, decay {} samples, {} Hz sample rate, {} s",
        BUMPS, config.frequency, config.decay_rate, config.sample_rate, config.duration
    );

    let pb = progress_bar();
    let result = run(&config, &pb);
    pb.finish_and_clear();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
