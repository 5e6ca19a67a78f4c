//! Spectral envelope reconstruction
//!
//! The envelope travels in the log domain with an additive offset applied at
//! encode time; reconstruction is the element-wise inverse, `exp(v + offset)`.
//! Element order is preserved, so the result is the same row-major N x D
//! layout as the input. Exponentiation is total over finite inputs; extreme
//! values overflowing to infinity are the encoder's contract violation, not
//! guarded here.

use crate::types::SpectralMatrix;
use rayon::prelude::*;

/// Reconstruct the linear power spectrogram from its log-domain encoding.
///
/// The caller guarantees `log_envelope.len() == frame_count * (fft_size/2+1)`
/// (validated at the decode entry point).
pub fn reconstruct(
    log_envelope: &[f32],
    frame_count: usize,
    fft_size: usize,
    log_offset: f32,
) -> SpectralMatrix {
    let bins = fft_size / 2 + 1;
    let offset = f64::from(log_offset);
    let data: Vec<f64> = log_envelope
        .par_iter()
        .map(|&v| (f64::from(v) + offset).exp())
        .collect();
    SpectralMatrix::from_data(data, frame_count, bins)
}
