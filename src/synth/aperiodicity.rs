//! Coded aperiodicity expansion
//!
//! The encoder transmits one aperiodicity value per band per frame, in dB
//! against a fixed 3 kHz band table. Expansion interpolates each frame's
//! codes across the full frequency axis between a fully periodic anchor at
//! DC and a fully aperiodic anchor at Nyquist, then converts back to the
//! linear [0, 1] aperiodicity scale. At the 16 kHz reference rate the band
//! table yields exactly one code per frame.

use crate::dsp::interp::interp1_point;
use crate::types::SpectralMatrix;
use rayon::prelude::*;

/// Spacing of the coded aperiodicity bands in Hz.
pub const FREQUENCY_INTERVAL: f64 = 3000.0;

/// Highest band edge considered regardless of sample rate, in Hz.
pub const UPPER_LIMIT: f64 = 15_000.0;

/// Guard keeping aperiodicity strictly inside (0, 1).
pub const SAFE_GUARD_MINIMUM: f64 = 1e-12;

/// Frames whose mean code exceeds this (dB) stay fully aperiodic.
const FULLY_APERIODIC_THRESHOLD_DB: f64 = -0.5;

/// Number of coded aperiodicity bands for a sample rate.
///
/// Determined only by the sample rate; zero means the rate is too low for
/// the band table and is rejected at configuration time.
pub fn band_count(sample_rate: u32) -> usize {
    let nyquist = f64::from(sample_rate) / 2.0;
    (f64::min(UPPER_LIMIT, nyquist - FREQUENCY_INTERVAL) / FREQUENCY_INTERVAL) as usize
}

/// Expand coded aperiodicity to the full N x D matrix.
///
/// `coded` is row-major N x [`band_count`] in dB. Every frame receives an
/// expanded row; voicing decisions belong to the synthesizer. The caller
/// guarantees the dimensions (validated at the decode entry point).
pub fn expand(
    coded: &[f32],
    frame_count: usize,
    sample_rate: u32,
    fft_size: usize,
) -> SpectralMatrix {
    let bands = band_count(sample_rate);
    let bins = fft_size / 2 + 1;
    let nyquist = f64::from(sample_rate) / 2.0;

    // Coarse axis: DC anchor, one knot per band, Nyquist anchor.
    let mut coarse_axis = vec![0.0; bands + 2];
    for (i, knot) in coarse_axis.iter_mut().enumerate() {
        *knot = i as f64 * FREQUENCY_INTERVAL;
    }
    coarse_axis[bands + 1] = nyquist;

    let bin_hz = f64::from(sample_rate) / fft_size as f64;

    let mut matrix = SpectralMatrix::zeros(frame_count, bins);
    matrix
        .par_rows_mut()
        .zip(coded.par_chunks(bands))
        .for_each(|(row, codes)| expand_frame(row, codes, &coarse_axis, bin_hz));
    matrix
}

fn expand_frame(row: &mut [f64], codes: &[f32], coarse_axis: &[f64], bin_hz: f64) {
    let bands = codes.len();
    let mean_db = codes.iter().map(|&c| f64::from(c)).sum::<f64>() / bands as f64;
    if mean_db > FULLY_APERIODIC_THRESHOLD_DB {
        // Near-zero attenuation everywhere: keep the frame fully aperiodic.
        row.fill(1.0 - SAFE_GUARD_MINIMUM);
        return;
    }

    let mut coarse_db = vec![0.0; bands + 2];
    coarse_db[0] = -60.0;
    for (dst, &code) in coarse_db[1..].iter_mut().zip(codes.iter()) {
        *dst = f64::from(code);
    }
    coarse_db[bands + 1] = -SAFE_GUARD_MINIMUM;

    for (j, bin) in row.iter_mut().enumerate() {
        let db = interp1_point(coarse_axis, &coarse_db, j as f64 * bin_hz);
        *bin = 10.0_f64.powf(db / 20.0).clamp(0.0, 1.0);
    }
}
