//! # Vocoder-Core: Parametric Speech Decoder
//!
//! This library decodes a compressed parametric representation of speech
//! (an F0 contour, a log-compressed spectral envelope, and a coded
//! aperiodicity measure) into a time-domain 16-bit PCM waveform. It
//! implements the synthesis half of a source-filter vocoder: the encoder (or
//! an upstream model) produces per-frame acoustic parameters, and this crate
//! reconstructs full-resolution spectral and aperiodicity matrices and
//! synthesizes audio with phase-continuous mixed excitation.
//!
//! ## Pipeline
//!
//! 1. **Aperiodicity expansion**: one coded value per frame per band is
//!    interpolated across the full frequency axis.
//! 2. **Envelope reconstruction**: the log-domain envelope is exponentiated
//!    (with its encode-time offset) back to a linear power spectrogram.
//! 3. **Waveform synthesis**: a phase-continuous pulse train and filtered
//!    noise, both shaped by the envelope, are overlap-added into the output.
//!
//! ## Usage
//!
//! ```rust
//! use vocoder_core::{FrameParams, Vocoder, VocoderConfig};
//!
//! let vocoder = Vocoder::new(VocoderConfig::default())?;
//!
//! let frames = 10;
//! let f0 = vec![220.0f32; frames];
//! let envelope = vec![-12.0f32; frames * 257];
//! let coded_aperiodicity = vec![-45.0f32; frames];
//! let params = FrameParams {
//!     f0: &f0,
//!     spectral_envelope: &envelope,
//!     coded_aperiodicity: &coded_aperiodicity,
//! };
//!
//! // Query mode: exact output length without doing any synthesis work.
//! let length = vocoder.required_samples(frames);
//!
//! let mut samples = vec![0i16; length];
//! let stats = vocoder.decode_into(&params, &mut samples)?;
//! assert_eq!(stats.samples_written, length);
//! # Ok::<(), vocoder_core::VocoderError>(())
//! ```
//!
//! Decoding is a pure function of its inputs: no state survives a call, the
//! noise excitation is deterministically seeded, and a `Vocoder` can be
//! shared freely across threads.

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod decode;
pub mod dsp;
pub mod error;
pub mod synth;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use decode::{required_samples, Vocoder, PCM_SCALE};
pub use error::{ErrorCategory, Result, VocoderError};
pub use types::{DecodeStats, FrameParams, SpectralMatrix, VocoderConfig};

/// Version information for the vocoder library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the vocoder library
///
/// Installs a default tracing subscriber if none is set. Safe to call
/// multiple times; decoding works without calling it.
pub fn init() {
    let _ = tracing_subscriber::fmt::try_init();
    tracing::info!("Vocoder-Core v{} initialized", VERSION);
}
