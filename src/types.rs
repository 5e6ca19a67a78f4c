//! Core types for the vocoder library
//!
//! This module defines the decoder configuration, the borrowed view over the
//! caller's per-frame parameter arrays, and the contiguous matrix container
//! used for the intermediate spectral products.

use crate::error::{Result, VocoderError};
use crate::synth::aperiodicity;

/// Default FFT size used by the reference deployment (16 kHz speech).
pub const DEFAULT_FFT_SIZE: usize = 512;

/// Default frame period in milliseconds.
pub const DEFAULT_FRAME_PERIOD_MS: f64 = 10.0;

/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Default additive offset applied to the log spectral envelope before
/// exponentiation, compensating the encoder's log(x + offset) normalization.
pub const DEFAULT_LOG_OFFSET: f32 = 1e-15;

/// Vocoder decoder configuration
///
/// A configuration is validated once when constructing a
/// [`Vocoder`](crate::Vocoder); all later calls can assume it is sound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VocoderConfig {
    /// FFT size; must be a positive even number
    pub fft_size: usize,
    /// Frame period in milliseconds
    pub frame_period_ms: f64,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Additive offset for the log spectral envelope
    pub log_offset: f32,
}

impl Default for VocoderConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            frame_period_ms: DEFAULT_FRAME_PERIOD_MS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            log_offset: DEFAULT_LOG_OFFSET,
        }
    }
}

impl VocoderConfig {
    /// Spectral dimension D: number of frequency bins per frame
    pub fn spectral_dim(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Number of coded aperiodicity values per frame for this sample rate
    pub fn aperiodicity_bands(&self) -> usize {
        aperiodicity::band_count(self.sample_rate)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`VocoderError::InvalidConfig`] if any field is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.fft_size == 0 || self.fft_size % 2 != 0 {
            return Err(VocoderError::invalid_config(format!(
                "fft_size must be a positive even number, got {}",
                self.fft_size
            )));
        }
        if !(self.frame_period_ms.is_finite() && self.frame_period_ms > 0.0) {
            return Err(VocoderError::invalid_config(format!(
                "frame_period_ms must be positive and finite, got {}",
                self.frame_period_ms
            )));
        }
        if self.sample_rate == 0 {
            return Err(VocoderError::invalid_config(
                "sample_rate must be positive",
            ));
        }
        if aperiodicity::band_count(self.sample_rate) == 0 {
            return Err(VocoderError::invalid_config(format!(
                "sample_rate {} Hz is below the aperiodicity band table floor",
                self.sample_rate
            )));
        }
        if !self.log_offset.is_finite() {
            return Err(VocoderError::invalid_config(format!(
                "log_offset must be finite, got {}",
                self.log_offset
            )));
        }
        Ok(())
    }
}

/// Borrowed view over the caller's per-frame acoustic parameters
///
/// All three slices describe the same ordered sequence of frames:
/// `f0.len()` frames, `spectral_envelope` row-major N x D, and
/// `coded_aperiodicity` row-major N x band_count (one value per frame for
/// the 16 kHz wire format).
#[derive(Debug, Clone, Copy)]
pub struct FrameParams<'a> {
    /// F0 contour in Hz; 0 marks an unvoiced frame
    pub f0: &'a [f32],
    /// Log-magnitude spectral envelope, row-major N x D
    pub spectral_envelope: &'a [f32],
    /// Coded aperiodicity, row-major N x band_count
    pub coded_aperiodicity: &'a [f32],
}

impl<'a> FrameParams<'a> {
    /// Number of frames N, defined by the F0 contour
    pub fn frame_count(&self) -> usize {
        self.f0.len()
    }
}

/// Contiguous row-major matrix of N frames by D frequency bins
///
/// Replaces the original pointer-table marshaling with a single allocation
/// and O(1) stride addressing; each row is contiguous for cache efficiency.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralMatrix {
    data: Vec<f64>,
    frames: usize,
    bins: usize,
}

impl SpectralMatrix {
    /// Create a zero-filled matrix
    pub fn zeros(frames: usize, bins: usize) -> Self {
        Self {
            data: vec![0.0; frames * bins],
            frames,
            bins,
        }
    }

    /// Create a matrix from existing row-major data
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != frames * bins`; internal callers construct
    /// the data to size.
    pub fn from_data(data: Vec<f64>, frames: usize, bins: usize) -> Self {
        assert_eq!(data.len(), frames * bins);
        Self { data, frames, bins }
    }

    /// Number of frames N
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of frequency bins D per frame
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Borrow one frame's row
    pub fn row(&self, frame: usize) -> &[f64] {
        &self.data[frame * self.bins..(frame + 1) * self.bins]
    }

    /// Mutably borrow one frame's row
    pub fn row_mut(&mut self, frame: usize) -> &mut [f64] {
        &mut self.data[frame * self.bins..(frame + 1) * self.bins]
    }

    /// Iterate over rows in parallel (frames are independent)
    pub fn par_rows_mut(&mut self) -> rayon::slice::ChunksMut<'_, f64> {
        use rayon::prelude::*;
        self.data.par_chunks_mut(self.bins)
    }
}

/// Statistics reported by a successful decode call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeStats {
    /// Number of samples written to the output buffer
    pub samples_written: usize,
    /// Number of samples that exceeded the 16-bit range and were clamped
    pub clipped_samples: usize,
}
