//! Excitation time base: per-sample F0, voicing, and pulse epochs
//!
//! The F0 contour is a step function of the frame index; synthesis needs a
//! continuous phase, so the contour is linearly interpolated onto the sample
//! timeline and integrated by an explicit phase accumulator. Each 2π wrap of
//! the accumulated phase marks a pulse epoch; the fractional position of the
//! wrap between two samples is kept so the periodic response can be shifted
//! by less than one sample period, which is what keeps pitch periods
//! phase-continuous across frame boundaries.

use crate::dsp::interp::interp1;
use std::f64::consts::PI;

/// Phase rate used for unvoiced regions so noise segments keep arriving.
pub const DEFAULT_F0: f64 = 500.0;

/// One excitation pulse epoch on the sample timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    /// Epoch time in seconds
    pub location: f64,
    /// Sample index the epoch is attributed to
    pub sample_index: usize,
    /// Sub-sample offset of the exact epoch, in seconds
    pub time_shift: f64,
}

/// Excitation timing derived from the F0 contour.
#[derive(Debug, Clone)]
pub struct TimeBase {
    /// Pulse epochs in timeline order
    pub pulses: Vec<Pulse>,
    /// Per-sample voicing decision (0.0 or 1.0)
    pub vuv: Vec<f64>,
}

/// Explicit phase state integrated along the sample timeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseAccumulator {
    total: f64,
}

impl PhaseAccumulator {
    /// Advance by one sample's phase increment, returning the wrapped phase
    pub fn advance(&mut self, increment: f64) -> f64 {
        self.total += increment;
        self.total % (2.0 * PI)
    }
}

/// Build the excitation time base.
///
/// `lowest_f0` is the floor below which a frame is treated as unvoiced;
/// `output_len` must be at least 1 (guaranteed by entry-point validation).
pub fn build(
    f0: &[f64],
    sample_rate: u32,
    frame_period_s: f64,
    output_len: usize,
    lowest_f0: f64,
) -> TimeBase {
    let n = f0.len();
    let fs = f64::from(sample_rate);

    // Coarse per-frame axes with one extrapolated tail frame so the
    // interpolation covers samples past the last frame center.
    let mut coarse_time = vec![0.0; n + 1];
    let mut coarse_f0 = vec![0.0; n + 1];
    let mut coarse_vuv = vec![0.0; n + 1];
    for i in 0..n {
        coarse_time[i] = i as f64 * frame_period_s;
        coarse_f0[i] = if f0[i] < lowest_f0 { 0.0 } else { f0[i] };
        coarse_vuv[i] = if coarse_f0[i] == 0.0 { 0.0 } else { 1.0 };
    }
    coarse_time[n] = n as f64 * frame_period_s;
    if n >= 2 {
        coarse_f0[n] = coarse_f0[n - 1] * 2.0 - coarse_f0[n - 2];
        coarse_vuv[n] = coarse_vuv[n - 1] * 2.0 - coarse_vuv[n - 2];
    } else {
        coarse_f0[n] = coarse_f0[n - 1];
        coarse_vuv[n] = coarse_vuv[n - 1];
    }

    let time_axis: Vec<f64> = (0..output_len).map(|i| i as f64 / fs).collect();
    let mut sample_f0 = vec![0.0; output_len];
    let mut vuv = vec![0.0; output_len];
    interp1(&coarse_time, &coarse_f0, &time_axis, &mut sample_f0);
    interp1(&coarse_time, &coarse_vuv, &time_axis, &mut vuv);

    for (v, f) in vuv.iter_mut().zip(sample_f0.iter_mut()) {
        *v = if *v > 0.5 { 1.0 } else { 0.0 };
        if *v == 0.0 {
            *f = DEFAULT_F0;
        }
    }

    let mut accumulator = PhaseAccumulator::default();
    let wrapped: Vec<f64> = sample_f0
        .iter()
        .map(|&f| accumulator.advance(2.0 * PI * f / fs))
        .collect();

    let mut pulses = Vec::new();
    for i in 0..output_len.saturating_sub(1) {
        if (wrapped[i + 1] - wrapped[i]).abs() > PI {
            // The exact epoch lies between samples i and i + 1 where the
            // accumulated phase crosses a multiple of 2π; solve the linear
            // crossing for its fractional position.
            let y1 = wrapped[i] - 2.0 * PI;
            let y2 = wrapped[i + 1];
            let x = -y1 / (y2 - y1);
            pulses.push(Pulse {
                location: time_axis[i],
                sample_index: i,
                time_shift: x / fs,
            });
        }
    }

    TimeBase { pulses, vuv }
}
