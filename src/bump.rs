//! Exponentially decaying sinusoid bursts.

use std::f64::consts::PI;

use crate::buffer::{SampleBuffer, StereoFrame};
use crate::config::{BUMPS, Config};
use crate::error::{BumpError, Result};

/// Per-channel amplitude sign for one segment: -1, 0 or +1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Polarity {
    pub left: f64,
    pub right: f64,
}

const fn polarity(left: f64, right: f64) -> Polarity {
    Polarity { left, right }
}

/// Silence, every sign combination on both channels, each channel alone,
/// then silence again.
pub const POLARITY_SEQUENCE: [Polarity; BUMPS] = [
    polarity(0.0, 0.0),
    polarity(1.0, 1.0),
    polarity(-1.0, 1.0),
    polarity(1.0, -1.0),
    polarity(-1.0, -1.0),
    polarity(1.0, 0.0),
    polarity(-1.0, 0.0),
    polarity(0.0, 1.0),
    polarity(0.0, -1.0),
    polarity(0.0, 0.0),
];

/// Parameters for one decaying burst.
#[derive(Clone, Copy, Debug)]
pub struct Bump {
    /// Carrier frequency (Hz).
    pub frequency: f64,
    pub amplitude_left: f64,
    pub amplitude_right: f64,
    /// Envelope time constant, in samples.
    pub decay_rate: f64,
    /// Sample rate (Hz).
    pub sample_rate: u32,
}

impl Bump {
    fn check_nyquist(&self) -> Result<()> {
        if self.frequency * 2.0 >= self.sample_rate as f64 {
            return Err(BumpError::NyquistViolation {
                frequency: self.frequency,
                sample_rate: self.sample_rate,
            });
        }
        Ok(())
    }
}

/// Exponential envelope at frame `i`; 1.0 at the start of every segment.
pub fn envelope(i: usize, decay_rate: f64) -> f64 {
    (-(i as f64) / decay_rate).exp()
}

/// Float to i16 by truncation toward zero, wrapping out-of-range values
/// instead of saturating. Amplitudes of 32768 or more wrap around.
pub fn truncate_to_i16(value: f64) -> i16 {
    value as i32 as i16
}

/// Fill every frame of `frames` with one burst starting at phase 0.
///
/// On a Nyquist violation nothing is written.
pub fn generate_bump(bump: &Bump, frames: &mut [StereoFrame]) -> Result<()> {
    bump.check_nyquist()?;

    let phase_increment = 2.0 * PI / (bump.sample_rate as f64 / bump.frequency);
    let mut phase = 0.0f64;
    for (i, frame) in frames.iter_mut().enumerate() {
        let sample = phase.sin() * envelope(i, bump.decay_rate);
        phase += phase_increment;
        frame.left = truncate_to_i16(sample * bump.amplitude_left);
        frame.right = truncate_to_i16(sample * bump.amplitude_right);
    }
    Ok(())
}

/// Write the full polarity sequence into consecutive segments of `buffer`.
///
/// `on_segment` is called after each segment is written. Stops at the first
/// failing segment.
pub fn fill_bumps<F>(config: &Config, buffer: &mut SampleBuffer, mut on_segment: F) -> Result<()>
where
    F: FnMut(usize, Polarity),
{
    let segment_frames = config.segment_frames();
    let mut offset = 0;
    for (index, &polarity) in POLARITY_SEQUENCE.iter().enumerate() {
        let bump = Bump {
            frequency: config.frequency,
            amplitude_left: polarity.left * config.amplitude,
            amplitude_right: polarity.right * config.amplitude,
            decay_rate: config.decay_rate,
            sample_rate: config.sample_rate,
        };
        generate_bump(&bump, buffer.segment_mut(offset, segment_frames))?;
        offset += segment_frames;
        on_segment(index, polarity);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bump(amplitude_left: f64, amplitude_right: f64) -> Bump {
        Bump {
            frequency: 64.5,
            amplitude_left,
            amplitude_right,
            decay_rate: 680.0,
            sample_rate: 44100,
        }
    }

    #[test]
    fn envelope_starts_at_one_and_decreases() {
        assert_eq!(envelope(0, 680.0), 1.0);
        for i in 1..4410 {
            assert!(envelope(i, 680.0) < envelope(i - 1, 680.0), "not decreasing at {}", i);
        }
    }

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(truncate_to_i16(0.99), 0);
        assert_eq!(truncate_to_i16(-0.99), 0);
        assert_eq!(truncate_to_i16(1234.9), 1234);
        assert_eq!(truncate_to_i16(-1234.9), -1234);
        assert_eq!(truncate_to_i16(32767.9), 32767);
    }

    #[test]
    fn out_of_range_values_wrap() {
        assert_eq!(truncate_to_i16(32768.0), -32768);
        assert_eq!(truncate_to_i16(40000.0), -25536);
        assert_eq!(truncate_to_i16(-32769.0), 32767);
    }

    #[test]
    fn generate_bump_writes_every_frame() {
        let mut frames = vec![StereoFrame { left: 7, right: 7 }; 4410];
        generate_bump(&test_bump(32767.0, -32767.0), &mut frames).unwrap();
        assert_eq!(frames[0], StereoFrame::SILENCE);
        // the sentinel (7, 7) cannot satisfy left == -right
        for f in &frames {
            assert_eq!(f.left, -f.right);
        }
    }

    #[test]
    fn generate_bump_magnitude_decays() {
        let mut frames = vec![StereoFrame::SILENCE; 4410];
        generate_bump(&test_bump(32767.0, 32767.0), &mut frames).unwrap();
        // one carrier period is ~684 frames
        let peak = |range: std::ops::Range<usize>| {
            frames[range].iter().map(|f| f.left.unsigned_abs()).max().unwrap()
        };
        let first = peak(0..684);
        let second = peak(684..1368);
        let last = peak(3420..4104);
        assert!(first > second && second > last);
        assert!(first > 10000);
    }

    #[test]
    fn oversized_amplitude_wraps_instead_of_saturating() {
        let mut frames = vec![StereoFrame::SILENCE; 400];
        generate_bump(&test_bump(65536.0, 32767.0), &mut frames).unwrap();
        // sample near the first crest is ~0.78, so 65536 * 0.78 wraps negative
        let crest = 170;
        assert!(frames[crest].right > 0);
        assert!(frames[crest].left < 0);
    }

    #[test]
    fn nyquist_violation_leaves_frames_untouched() {
        let sentinel = StereoFrame { left: 11, right: -11 };
        let mut frames = vec![sentinel; 64];
        for frequency in [22050.0, 30000.0] {
            let bump = Bump {
                frequency,
                ..test_bump(32767.0, 32767.0)
            };
            let err = generate_bump(&bump, &mut frames).unwrap_err();
            assert!(matches!(err, BumpError::NyquistViolation { sample_rate: 44100, .. }));
        }
        assert!(frames.iter().all(|f| *f == sentinel));
    }

    #[test]
    fn just_below_nyquist_is_accepted() {
        let mut frames = vec![StereoFrame::SILENCE; 16];
        let bump = Bump {
            frequency: 22049.9,
            ..test_bump(1000.0, 1000.0)
        };
        assert!(generate_bump(&bump, &mut frames).is_ok());
    }

    #[test]
    fn fill_bumps_follows_polarity_sequence() {
        let config = Config::default();
        let mut buffer = SampleBuffer::zeroed(config.frame_count()).unwrap();
        let mut seen = Vec::new();
        fill_bumps(&config, &mut buffer, |index, p| seen.push((index, p))).unwrap();
        assert_eq!(seen.len(), BUMPS);
        assert_eq!(seen[2], (2, polarity(-1.0, 1.0)));

        let seg = config.segment_frames();
        let frames = buffer.frames();
        assert!(frames[..seg].iter().all(|f| *f == StereoFrame::SILENCE));
        assert!(frames[9 * seg..].iter().all(|f| *f == StereoFrame::SILENCE));

        // (+,+): both channels identical and positive on the first half cycle
        let second = &frames[seg..2 * seg];
        assert!(second.iter().all(|f| f.left == f.right));
        assert!(second[1..300].iter().all(|f| f.left > 0));

        // (-,+)
        let third = &frames[2 * seg..3 * seg];
        assert!(third.iter().all(|f| f.left == -f.right));
        assert!(third[1..300].iter().all(|f| f.left < 0));

        // (0,-): left silent
        let ninth = &frames[8 * seg..9 * seg];
        assert!(ninth.iter().all(|f| f.left == 0));
        assert!(ninth[1..300].iter().all(|f| f.right < 0));
    }

    #[test]
    fn fill_bumps_leaves_remainder_silent() {
        let config = Config {
            sample_rate: 1007,
            frequency: 10.0,
            decay_rate: 50.0,
            ..Config::default()
        };
        let mut buffer = SampleBuffer::zeroed(config.frame_count()).unwrap();
        fill_bumps(&config, &mut buffer, |_, _| {}).unwrap();
        let tail = &buffer.frames()[10 * config.segment_frames()..];
        assert_eq!(tail.len(), 7);
        assert!(tail.iter().all(|f| *f == StereoFrame::SILENCE));
    }

    #[test]
    fn fill_bumps_stops_at_nyquist_violation() {
        let config = Config {
            frequency: 30000.0,
            ..Config::default()
        };
        let mut buffer = SampleBuffer::zeroed(config.frame_count()).unwrap();
        let mut calls = 0;
        let err = fill_bumps(&config, &mut buffer, |_, _| calls += 1).unwrap_err();
        assert!(matches!(err, BumpError::NyquistViolation { .. }));
        assert_eq!(calls, 0);
    }

    #[test]
    fn bump_energy_peaks_at_carrier_frequency() {
        use rustfft::FftPlanner;
        use rustfft::num_complex::Complex;

        let fft_size = 4096;
        let mut frames = vec![StereoFrame::SILENCE; fft_size];
        generate_bump(&test_bump(32767.0, 32767.0), &mut frames).unwrap();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let mut spectrum: Vec<Complex<f64>> = frames
            .iter()
            .map(|f| Complex::new(f.left as f64, 0.0))
            .collect();
        fft.process(&mut spectrum);

        let peak_bin = spectrum[1..fft_size / 2]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
            .map(|(i, _)| i + 1)
            .unwrap();
        let bin_hz = 44100.0 / fft_size as f64;
        let peak_hz = peak_bin as f64 * bin_hz;
        assert!((peak_hz - 64.5).abs() <= 2.0 * bin_hz, "peak at {} Hz", peak_hz);
    }
}
