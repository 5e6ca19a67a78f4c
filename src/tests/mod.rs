//! End-to-end test suite for the vocoder library
//!
//! Covers the decoder's observable properties: length determinism, the
//! silence and pure-tone behaviors, phase continuity, idempotence, the
//! quantizer scaling law, and atomic validation failures.

use crate::decode::quantize;
use crate::*;

/// Common test utilities
pub mod utils {
    use num_complex::Complex;
    use rustfft::FftPlanner;

    /// Per-bin log-power for a Gaussian low-pass envelope with the given
    /// corner frequency; concentrates energy near the fundamental so the
    /// pitch is the dominant spectral peak.
    pub fn lowpass_log_envelope(bins: usize, sample_rate: u32, corner_hz: f32) -> Vec<f32> {
        let fft_size = (bins - 1) * 2;
        (0..bins)
            .map(|k| {
                let freq = k as f32 * sample_rate as f32 / fft_size as f32;
                -(freq / corner_hz).powi(2)
            })
            .collect()
    }

    /// Row-major repetition of one envelope row over `frames` frames.
    pub fn tile(row: &[f32], frames: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(row.len() * frames);
        for _ in 0..frames {
            out.extend_from_slice(row);
        }
        out
    }

    /// Frequency of the dominant spectral peak between `lo_hz` and `hi_hz`,
    /// measured with an independent zero-padded DFT.
    pub fn dominant_peak_hz(samples: &[i16], sample_rate: u32, lo_hz: f64, hi_hz: f64) -> f64 {
        let fft_size = 65_536;
        let mut buffer: Vec<Complex<f64>> = samples
            .iter()
            .map(|&s| Complex::new(f64::from(s), 0.0))
            .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
            .take(fft_size)
            .collect();
        FftPlanner::new()
            .plan_fft_forward(fft_size)
            .process(&mut buffer);

        let bin_hz = f64::from(sample_rate) / fft_size as f64;
        let lo = (lo_hz / bin_hz) as usize;
        let hi = (hi_hz / bin_hz) as usize;
        let peak = (lo..hi)
            .max_by(|&a, &b| buffer[a].norm().total_cmp(&buffer[b].norm()))
            .unwrap();
        peak as f64 * bin_hz
    }

    /// Root-mean-square amplitude of an i16 signal.
    pub fn rms(samples: &[i16]) -> f64 {
        let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        (sum / samples.len() as f64).sqrt()
    }
}

const FRAMES: usize = 101;
const BINS: usize = 257;

fn voiced_params<'a>(
    f0: &'a [f32],
    envelope: &'a [f32],
    coded_ap: &'a [f32],
) -> FrameParams<'a> {
    FrameParams {
        f0,
        spectral_envelope: envelope,
        coded_aperiodicity: coded_ap,
    }
}

#[test]
fn test_length_determinism() {
    let vocoder = Vocoder::new(VocoderConfig::default()).unwrap();
    let f0 = vec![200.0f32; FRAMES];
    let envelope = utils::tile(&utils::lowpass_log_envelope(BINS, 16_000, 300.0), FRAMES);
    let coded_ap = vec![-60.0f32; FRAMES];
    let params = voiced_params(&f0, &envelope, &coded_ap);

    let required = vocoder.required_samples(FRAMES);
    assert_eq!(required, 16_001);

    let samples = vocoder.decode(&params).unwrap();
    assert_eq!(samples.len(), required);

    let mut buffer = vec![0i16; required];
    let stats = vocoder.decode_into(&params, &mut buffer).unwrap();
    assert_eq!(stats.samples_written, required);
}

#[test]
fn test_silence_property() {
    // Fully unvoiced contour and a near-zero envelope decode to silence.
    let vocoder = Vocoder::new(VocoderConfig::default()).unwrap();
    let f0 = vec![0.0f32; FRAMES];
    let envelope = vec![-30.0f32; FRAMES * BINS];
    let coded_ap = vec![0.0f32; FRAMES];
    let params = voiced_params(&f0, &envelope, &coded_ap);

    let samples = vocoder.decode(&params).unwrap();
    for (i, &s) in samples.iter().enumerate() {
        assert!(s.abs() <= 2, "sample {} is {}", i, s);
    }
}

#[test]
fn test_pure_tone_peak() {
    // Constant 220 Hz, fully periodic, low-passed envelope: the dominant
    // spectral peak must land on the fundamental.
    let vocoder = Vocoder::new(VocoderConfig::default()).unwrap();
    let f0 = vec![220.0f32; FRAMES];
    let envelope = utils::tile(&utils::lowpass_log_envelope(BINS, 16_000, 150.0), FRAMES);
    let coded_ap = vec![-60.0f32; FRAMES];
    let params = voiced_params(&f0, &envelope, &coded_ap);

    let samples = vocoder.decode(&params).unwrap();
    assert!(utils::rms(&samples) > 50.0, "tone too quiet to analyze");

    let peak = utils::dominant_peak_hz(&samples, 16_000, 50.0, 2_000.0);
    assert!(
        (peak - 220.0).abs() <= 2.0,
        "dominant peak at {} Hz, expected 220",
        peak
    );
}

#[test]
fn test_phase_continuity() {
    // A continuous F0 ramp must not produce clicks: no single-sample jump
    // anywhere near the signal's peak amplitude.
    let vocoder = Vocoder::new(VocoderConfig::default()).unwrap();
    let f0: Vec<f32> = (0..FRAMES)
        .map(|i| 180.0 + 80.0 * i as f32 / (FRAMES - 1) as f32)
        .collect();
    let envelope = utils::tile(&utils::lowpass_log_envelope(BINS, 16_000, 150.0), FRAMES);
    let coded_ap = vec![-60.0f32; FRAMES];
    let params = voiced_params(&f0, &envelope, &coded_ap);

    let samples = vocoder.decode(&params).unwrap();
    let peak = samples.iter().map(|s| i32::from(s.abs())).max().unwrap();
    assert!(peak > 100);

    let max_jump = samples
        .windows(2)
        .map(|w| (i32::from(w[1]) - i32::from(w[0])).abs())
        .max()
        .unwrap();
    assert!(
        max_jump < peak * 6 / 10,
        "jump {} vs peak {}",
        max_jump,
        peak
    );
}

#[test]
fn test_idempotence() {
    let vocoder = Vocoder::new(VocoderConfig::default()).unwrap();
    let f0 = vec![170.0f32; 31];
    let envelope = utils::tile(&utils::lowpass_log_envelope(BINS, 16_000, 400.0), 31);
    let coded_ap = vec![-30.0f32; 31];
    let params = voiced_params(&f0, &envelope, &coded_ap);

    let first = vocoder.decode(&params).unwrap();
    let second = vocoder.decode(&params).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_concurrent_decodes_agree() {
    use std::sync::Arc;

    let vocoder = Arc::new(Vocoder::new(VocoderConfig::default()).unwrap());
    let f0 = Arc::new(vec![140.0f32; 21]);
    let envelope = Arc::new(utils::tile(
        &utils::lowpass_log_envelope(BINS, 16_000, 300.0),
        21,
    ));
    let coded_ap = Arc::new(vec![-50.0f32; 21]);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let (v, f, e, a) = (
            Arc::clone(&vocoder),
            Arc::clone(&f0),
            Arc::clone(&envelope),
            Arc::clone(&coded_ap),
        );
        handles.push(std::thread::spawn(move || {
            let params = FrameParams {
                f0: &f,
                spectral_envelope: &e,
                coded_aperiodicity: &a,
            };
            v.decode(&params).unwrap()
        }));
    }
    let results: Vec<Vec<i16>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for r in &results[1..] {
        assert_eq!(r, &results[0]);
    }
}

#[test]
fn test_single_frame_decode() {
    let vocoder = Vocoder::new(VocoderConfig::default()).unwrap();
    let f0 = vec![120.0f32];
    let envelope = vec![-5.0f32; BINS];
    let coded_ap = vec![-40.0f32];
    let params = voiced_params(&f0, &envelope, &coded_ap);

    assert_eq!(vocoder.required_samples(1), 1);
    let samples = vocoder.decode(&params).unwrap();
    assert_eq!(samples.len(), 1);
}

#[test]
fn test_length_mismatch_is_atomic() {
    let vocoder = Vocoder::new(VocoderConfig::default()).unwrap();
    let f0 = vec![200.0f32; 11];
    let envelope = vec![-5.0f32; 11 * BINS];
    let coded_ap = vec![-40.0f32; 11];
    let params = voiced_params(&f0, &envelope, &coded_ap);

    let mut buffer = vec![7777i16; vocoder.required_samples(11) - 1];
    let err = vocoder.decode_into(&params, &mut buffer).unwrap_err();
    assert!(matches!(err, VocoderError::LengthMismatch { .. }));
    assert!(buffer.iter().all(|&s| s == 7777), "buffer was touched");
}

#[test]
fn test_dimension_mismatch_rejected() {
    let vocoder = Vocoder::new(VocoderConfig::default()).unwrap();
    let f0 = vec![200.0f32; 11];
    let envelope = vec![-5.0f32; 11 * BINS - 3];
    let coded_ap = vec![-40.0f32; 11];
    let params = voiced_params(&f0, &envelope, &coded_ap);

    let err = vocoder.decode(&params).unwrap_err();
    assert!(matches!(
        err,
        VocoderError::InvalidDimension {
            field: "spectral_envelope",
            ..
        }
    ));
}

#[test]
fn test_clipping_is_reported() {
    // An enormous envelope drives synthesis far outside [-1, 1]; the
    // quantizer must clamp and count rather than wrap.
    let vocoder = Vocoder::new(VocoderConfig::default()).unwrap();
    let f0 = vec![200.0f32; 21];
    let envelope = vec![12.0f32; 21 * BINS];
    let coded_ap = vec![-60.0f32; 21];
    let params = voiced_params(&f0, &envelope, &coded_ap);

    let mut buffer = vec![0i16; vocoder.required_samples(21)];
    let stats = vocoder.decode_into(&params, &mut buffer).unwrap();
    assert!(stats.clipped_samples > 0);
    // Clamped, never wrapped: extremes are the range endpoints.
    assert!(buffer.iter().any(|&s| s == i16::MAX || s == i16::MIN));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_required_samples_matches_formula(
            frames in 1usize..400,
            period_ms in 1.0f64..30.0,
            rate in 8_000u32..48_000,
        ) {
            let got = required_samples(frames, period_ms, rate);
            let expected =
                ((frames - 1) as f64 * period_ms / 1000.0 * f64::from(rate)).floor() as usize + 1;
            prop_assert_eq!(got, expected);
            prop_assert!(got >= 1);
        }

        #[test]
        fn prop_quantizer_scaling_law(value in -1.0f64..=1.0) {
            let (sample, clipped) = quantize(value);
            prop_assert!(!clipped);
            prop_assert_eq!(f64::from(sample), (PCM_SCALE * value).round());
        }

        #[test]
        fn prop_expanded_aperiodicity_in_unit_range(
            code in -80.0f32..0.0,
            frames in 1usize..8,
        ) {
            let coded = vec![code; frames];
            let matrix = crate::synth::aperiodicity::expand(&coded, frames, 16_000, 512);
            for frame in 0..frames {
                for &v in matrix.row(frame) {
                    prop_assert!((0.0..=1.0).contains(&v));
                }
            }
        }
    }
}
