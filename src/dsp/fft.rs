//! Real-signal FFT wrappers and minimum-phase spectrum analysis
//!
//! Thin state-carrying wrappers over rustfft, sized once per synthesis call.
//! The inverse transform is unnormalized; callers that need unit gain divide
//! by the transform size at the point where responses are mixed.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward FFT of a real waveform, keeping the non-redundant half spectrum.
pub struct ForwardRealFft {
    size: usize,
    fft: Arc<dyn Fft<f64>>,
    /// Input waveform, `size` samples
    pub waveform: Vec<f64>,
    /// Output half spectrum, `size / 2 + 1` bins
    pub spectrum: Vec<Complex<f64>>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl ForwardRealFft {
    /// Plan a forward transform of `size` points
    pub fn new(planner: &mut FftPlanner<f64>, size: usize) -> Self {
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::default(); fft.get_inplace_scratch_len()];
        Self {
            size,
            fft,
            waveform: vec![0.0; size],
            spectrum: vec![Complex::default(); size / 2 + 1],
            buffer: vec![Complex::default(); size],
            scratch,
        }
    }

    /// Transform `waveform` into `spectrum`
    pub fn exec(&mut self) {
        for (b, &w) in self.buffer.iter_mut().zip(self.waveform.iter()) {
            *b = Complex::new(w, 0.0);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);
        self.spectrum.copy_from_slice(&self.buffer[..self.size / 2 + 1]);
    }
}

/// Inverse FFT from a half spectrum back to a real waveform (unnormalized).
pub struct InverseRealFft {
    size: usize,
    fft: Arc<dyn Fft<f64>>,
    /// Input half spectrum, `size / 2 + 1` bins
    pub spectrum: Vec<Complex<f64>>,
    /// Output waveform, `size` samples, scaled by `size`
    pub waveform: Vec<f64>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl InverseRealFft {
    /// Plan an inverse transform of `size` points
    pub fn new(planner: &mut FftPlanner<f64>, size: usize) -> Self {
        let fft = planner.plan_fft_inverse(size);
        let scratch = vec![Complex::default(); fft.get_inplace_scratch_len()];
        Self {
            size,
            fft,
            spectrum: vec![Complex::default(); size / 2 + 1],
            waveform: vec![0.0; size],
            buffer: vec![Complex::default(); size],
            scratch,
        }
    }

    /// Transform `spectrum` into `waveform`
    pub fn exec(&mut self) {
        let half = self.size / 2;
        self.buffer[..half + 1].copy_from_slice(&self.spectrum);
        // Hermitian symmetry for the redundant bins
        for k in 1..half {
            self.buffer[self.size - k] = self.spectrum[k].conj();
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);
        for (w, b) in self.waveform.iter_mut().zip(self.buffer.iter()) {
            *w = b.re;
        }
    }
}

/// Minimum-phase spectrum reconstruction from a log-magnitude half spectrum.
///
/// Standard real-cepstrum method: mirror the log magnitude, take the
/// cepstrum, fold the anti-causal part onto the causal part, transform back
/// and exponentiate. `log_spectrum` holds ln(magnitude), i.e. ln(power) / 2.
pub struct MinimumPhase {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    /// Input log-magnitude half spectrum, `size / 2 + 1` bins
    pub log_spectrum: Vec<f64>,
    /// Output minimum-phase half spectrum, `size / 2 + 1` bins
    pub spectrum: Vec<Complex<f64>>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl MinimumPhase {
    /// Plan a minimum-phase analysis of `size` points
    pub fn new(planner: &mut FftPlanner<f64>, size: usize) -> Self {
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            size,
            forward,
            inverse,
            log_spectrum: vec![0.0; size / 2 + 1],
            spectrum: vec![Complex::default(); size / 2 + 1],
            buffer: vec![Complex::default(); size],
            scratch: vec![Complex::default(); scratch_len],
        }
    }

    /// Compute the minimum-phase spectrum from `log_spectrum`
    pub fn exec(&mut self) {
        let size = self.size;
        let half = size / 2;

        for k in 0..=half {
            self.buffer[k] = Complex::new(self.log_spectrum[k], 0.0);
        }
        for k in 1..half {
            self.buffer[size - k] = Complex::new(self.log_spectrum[k], 0.0);
        }
        self.inverse.process_with_scratch(&mut self.buffer, &mut self.scratch);

        // Fold the even cepstrum into a causal one; bins 0 and N/2 are kept.
        let norm = 1.0 / size as f64;
        self.buffer[0] *= norm;
        for k in 1..half {
            self.buffer[k] *= 2.0 * norm;
        }
        self.buffer[half] *= norm;
        for k in half + 1..size {
            self.buffer[k] = Complex::default();
        }
        self.forward.process_with_scratch(&mut self.buffer, &mut self.scratch);

        for k in 0..=half {
            let c = self.buffer[k];
            self.spectrum[k] = Complex::from_polar(c.re.exp(), c.im);
        }
    }
}

/// Swap the two halves of `input` into `output` so the impulse peak sits at
/// the buffer center after an inverse transform.
pub fn fftshift(input: &[f64], output: &mut [f64]) {
    let half = input.len() / 2;
    for i in 0..half {
        output[i] = input[i + half];
        output[i + half] = input[i];
    }
}
