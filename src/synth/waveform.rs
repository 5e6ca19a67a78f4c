//! Mixed-excitation waveform synthesis
//!
//! For every pulse epoch a short response segment is rendered and
//! overlap-added into the output, centered on the epoch's sample index. The
//! segment is the sum of a periodic response (minimum-phase filtered pulse,
//! shifted by the epoch's sub-sample offset) and an aperiodic response
//! (minimum-phase filtered noise), both shaped by the spectral envelope and
//! split by the per-bin aperiodic ratio.

use crate::dsp::fft::{fftshift, ForwardRealFft, InverseRealFft, MinimumPhase};
use crate::dsp::noise::{NoiseSource, SYNTHESIS_SEED};
use crate::synth::aperiodicity::SAFE_GUARD_MINIMUM;
use crate::types::SpectralMatrix;
use num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// Aperiodicity above this at DC suppresses the periodic response entirely.
const PERIODIC_SUPPRESSION_THRESHOLD: f64 = 0.999;

/// Synthesize the waveform from the decoded per-frame parameters.
///
/// `output` is zeroed and then accumulated into; its length defines the
/// sample timeline. Deterministic: the noise stream is reseeded per call.
pub fn synthesize(
    f0: &[f64],
    spectrogram: &SpectralMatrix,
    aperiodicity: &SpectralMatrix,
    fft_size: usize,
    frame_period_ms: f64,
    sample_rate: u32,
    output: &mut [f64],
) {
    output.fill(0.0);
    if output.is_empty() {
        return;
    }

    let frame_period_s = frame_period_ms / 1000.0;
    let lowest_f0 = (sample_rate as usize / fft_size) as f64 + 1.0;
    let time_base = crate::synth::excitation::build(
        f0,
        sample_rate,
        frame_period_s,
        output.len(),
        lowest_f0,
    );

    let mut segment = SegmentSynth::new(fft_size, spectrogram.bins());
    let mut response = vec![0.0; fft_size];

    let pulses = &time_base.pulses;
    for (i, pulse) in pulses.iter().enumerate() {
        let next = pulses[(i + 1).min(pulses.len() - 1)];
        let noise_size = next.sample_index - pulse.sample_index;
        let vuv = time_base.vuv[pulse.sample_index];

        segment.render(
            spectrogram,
            aperiodicity,
            frame_period_s,
            pulse.location,
            pulse.time_shift,
            vuv,
            noise_size,
            sample_rate,
            &mut response,
        );
        overlap_add(&response, pulse.sample_index, output);
    }
}

/// Sum a response segment into the output, centered on the pulse sample.
///
/// Response sample `i` lands at output index `sample_index - half + 1 + i`;
/// whatever falls outside the output is dropped.
fn overlap_add(response: &[f64], sample_index: usize, output: &mut [f64]) {
    let half = response.len() / 2;
    if sample_index + 1 >= half {
        let offset = sample_index + 1 - half;
        if offset >= output.len() {
            return;
        }
        for (dst, &src) in output[offset..].iter_mut().zip(response.iter()) {
            *dst += src;
        }
    } else {
        let skip = half - 1 - sample_index;
        for (dst, &src) in output.iter_mut().zip(response[skip..].iter()) {
            *dst += src;
        }
    }
}

/// Per-segment renderer holding the FFT plans and scratch buffers.
struct SegmentSynth {
    fft_size: usize,
    forward: ForwardRealFft,
    inverse: InverseRealFft,
    minimum_phase: MinimumPhase,
    dc_remover: Vec<f64>,
    envelope: Vec<f64>,
    ratio: Vec<f64>,
    periodic: Vec<f64>,
    aperiodic: Vec<f64>,
    noise: NoiseSource,
}

impl SegmentSynth {
    fn new(fft_size: usize, bins: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft_size,
            forward: ForwardRealFft::new(&mut planner, fft_size),
            inverse: InverseRealFft::new(&mut planner, fft_size),
            minimum_phase: MinimumPhase::new(&mut planner, fft_size),
            dc_remover: make_dc_remover(fft_size),
            envelope: vec![0.0; bins],
            ratio: vec![0.0; bins],
            periodic: vec![0.0; fft_size],
            aperiodic: vec![0.0; fft_size],
            noise: NoiseSource::new(SYNTHESIS_SEED),
        }
    }

    /// Render one response segment at `current_time` into `response`.
    #[allow(clippy::too_many_arguments)]
    fn render(
        &mut self,
        spectrogram: &SpectralMatrix,
        aperiodicity: &SpectralMatrix,
        frame_period_s: f64,
        current_time: f64,
        time_shift: f64,
        vuv: f64,
        noise_size: usize,
        sample_rate: u32,
        response: &mut [f64],
    ) {
        interpolate_row(spectrogram, current_time, frame_period_s, &mut self.envelope);
        interpolate_ratio(aperiodicity, current_time, frame_period_s, &mut self.ratio);

        self.periodic_response(vuv, time_shift, sample_rate);
        self.aperiodic_response(vuv, noise_size);

        let periodic_gain = (noise_size as f64).sqrt();
        let norm = 1.0 / self.fft_size as f64;
        for (i, r) in response.iter_mut().enumerate() {
            *r = (self.periodic[i] * periodic_gain + self.aperiodic[i]) * norm;
        }
    }

    /// Minimum-phase filtered pulse with the epoch's sub-sample delay.
    fn periodic_response(&mut self, vuv: f64, time_shift: f64, sample_rate: u32) {
        if vuv <= 0.5 || self.ratio[0] > PERIODIC_SUPPRESSION_THRESHOLD {
            self.periodic.fill(0.0);
            return;
        }

        for (log, (&s, &a)) in self
            .minimum_phase
            .log_spectrum
            .iter_mut()
            .zip(self.envelope.iter().zip(self.ratio.iter()))
        {
            *log = (s * (1.0 - a) + SAFE_GUARD_MINIMUM).ln() / 2.0;
        }
        self.minimum_phase.exec();
        self.inverse.spectrum.copy_from_slice(&self.minimum_phase.spectrum);

        // Linear-phase rotation realizing the fractional epoch delay.
        let coefficient =
            2.0 * PI * time_shift * f64::from(sample_rate) / self.fft_size as f64;
        for (k, s) in self.inverse.spectrum.iter_mut().enumerate() {
            let re2 = (coefficient * k as f64).cos();
            let im2 = (1.0 - re2 * re2).sqrt();
            *s = Complex::new(s.re * re2 + s.im * im2, s.im * re2 - s.re * im2);
        }

        self.inverse.exec();
        fftshift(&self.inverse.waveform, &mut self.periodic);
        remove_dc(&mut self.periodic, &self.dc_remover);
    }

    /// Minimum-phase filtered noise segment of `noise_size` samples.
    fn aperiodic_response(&mut self, vuv: f64, noise_size: usize) {
        self.noise_spectrum(noise_size);

        // The guard keeps steep envelopes whose bins underflowed to zero out
        // of ln(); a single -inf bin would spread NaN over the whole segment
        // through the cepstrum transforms.
        if vuv != 0.0 {
            for (log, (&s, &a)) in self
                .minimum_phase
                .log_spectrum
                .iter_mut()
                .zip(self.envelope.iter().zip(self.ratio.iter()))
            {
                *log = (s * a + SAFE_GUARD_MINIMUM).ln() / 2.0;
            }
        } else {
            for (log, &s) in self
                .minimum_phase
                .log_spectrum
                .iter_mut()
                .zip(self.envelope.iter())
            {
                *log = (s + SAFE_GUARD_MINIMUM).ln() / 2.0;
            }
        }
        self.minimum_phase.exec();

        for (dst, (&m, &n)) in self
            .inverse
            .spectrum
            .iter_mut()
            .zip(self.minimum_phase.spectrum.iter().zip(self.forward.spectrum.iter()))
        {
            *dst = m * n;
        }
        self.inverse.exec();
        fftshift(&self.inverse.waveform, &mut self.aperiodic);
    }

    /// Spectrum of a zero-mean noise burst covering one pulse interval.
    fn noise_spectrum(&mut self, noise_size: usize) {
        // The burst cannot outgrow the transform; long pulse gaps only occur
        // around voicing transitions and are truncated to the window.
        let noise_size = noise_size.min(self.fft_size);
        if noise_size > 0 {
            let mut average = 0.0;
            for w in self.forward.waveform[..noise_size].iter_mut() {
                *w = self.noise.next_gaussian();
                average += *w;
            }
            average /= noise_size as f64;
            for w in self.forward.waveform[..noise_size].iter_mut() {
                *w -= average;
            }
        }
        self.forward.waveform[noise_size..].fill(0.0);
        self.forward.exec();
    }
}

/// Envelope magnitude at a point in time, interpolated between frame centers.
fn interpolate_row(
    matrix: &SpectralMatrix,
    current_time: f64,
    frame_period_s: f64,
    out: &mut [f64],
) {
    let last = matrix.frames() - 1;
    let floor = ((current_time / frame_period_s).floor() as usize).min(last);
    let ceil = ((current_time / frame_period_s).ceil() as usize).min(last);
    let t = current_time / frame_period_s - floor as f64;

    if floor == ceil {
        for (o, &v) in out.iter_mut().zip(matrix.row(floor).iter()) {
            *o = v.abs();
        }
    } else {
        for (o, (&lo, &hi)) in out
            .iter_mut()
            .zip(matrix.row(floor).iter().zip(matrix.row(ceil).iter()))
        {
            *o = (1.0 - t) * lo.abs() + t * hi.abs();
        }
    }
}

/// Aperiodic power ratio at a point in time; clamped away from the exact
/// 0 and 1 endpoints before squaring into the power domain.
fn interpolate_ratio(
    matrix: &SpectralMatrix,
    current_time: f64,
    frame_period_s: f64,
    out: &mut [f64],
) {
    let last = matrix.frames() - 1;
    let floor = ((current_time / frame_period_s).floor() as usize).min(last);
    let ceil = ((current_time / frame_period_s).ceil() as usize).min(last);
    let t = current_time / frame_period_s - floor as f64;

    if floor == ceil {
        for (o, &v) in out.iter_mut().zip(matrix.row(floor).iter()) {
            *o = safe_aperiodicity(v).powi(2);
        }
    } else {
        for (o, (&lo, &hi)) in out
            .iter_mut()
            .zip(matrix.row(floor).iter().zip(matrix.row(ceil).iter()))
        {
            *o = ((1.0 - t) * safe_aperiodicity(lo) + t * safe_aperiodicity(hi)).powi(2);
        }
    }
}

fn safe_aperiodicity(x: f64) -> f64 {
    x.clamp(0.001, 1.0 - SAFE_GUARD_MINIMUM)
}

/// Hann-shaped window normalized to unit sum, used to subtract the DC
/// component a one-sided minimum-phase response accumulates.
fn make_dc_remover(fft_size: usize) -> Vec<f64> {
    let mut remover: Vec<f64> = apodize::hanning_iter(fft_size).collect();
    let sum: f64 = remover.iter().sum();
    for v in remover.iter_mut() {
        *v /= sum;
    }
    remover
}

/// Subtract the response's DC component, distributed over the remover shape.
fn remove_dc(response: &mut [f64], dc_remover: &[f64]) {
    let half = response.len() / 2;
    let dc: f64 = response[half..].iter().sum();
    // The causal response lives in the second half after fftshift; the first
    // half carries only the remover's compensation.
    for (r, &w) in response[..half].iter_mut().zip(dc_remover[..half].iter()) {
        *r = -dc * w;
    }
    for (r, &w) in response[half..].iter_mut().zip(dc_remover[half..].iter()) {
        *r -= dc * w;
    }
}
