//! Decode entry point
//!
//! Orchestrates the three synthesis stages (aperiodicity expansion, envelope
//! reconstruction, waveform synthesis) and quantizes the result to signed
//! 16-bit PCM. The whole pipeline is a pure function of its inputs: no state
//! survives a call, and two calls with identical inputs produce bit-identical
//! output.

use crate::error::Result;
use crate::synth::{aperiodicity, envelope, waveform};
use crate::types::{DecodeStats, FrameParams, VocoderConfig};
use crate::utils::validation;

/// Fixed scale from the nominal [-1, 1] float range to 16-bit PCM.
pub const PCM_SCALE: f64 = 32767.0;

/// Number of output samples a decode of `frame_count` frames produces.
///
/// This is the query mode of the decoder: O(1), no synthesis work. Defined
/// as `floor((N - 1) * frame_period_ms / 1000 * sample_rate) + 1`.
pub fn required_samples(frame_count: usize, frame_period_ms: f64, sample_rate: u32) -> usize {
    (frame_count.saturating_sub(1) as f64 * frame_period_ms / 1000.0 * f64::from(sample_rate))
        as usize
        + 1
}

/// Parametric speech decoder
///
/// Holds a validated configuration; decoding itself is stateless, so a
/// `Vocoder` is safe to share across threads and to call repeatedly.
///
/// # Example
/// ```
/// use vocoder_core::{FrameParams, Vocoder, VocoderConfig};
///
/// let vocoder = Vocoder::new(VocoderConfig::default())?;
/// let frames = 3;
/// let f0 = vec![220.0f32; frames];
/// let envelope = vec![-10.0f32; frames * 257];
/// let coded_ap = vec![-40.0f32; frames];
/// let params = FrameParams {
///     f0: &f0,
///     spectral_envelope: &envelope,
///     coded_aperiodicity: &coded_ap,
/// };
///
/// assert_eq!(vocoder.required_samples(frames), 321);
/// let samples = vocoder.decode(&params)?;
/// assert_eq!(samples.len(), 321);
/// # Ok::<(), vocoder_core::VocoderError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Vocoder {
    config: VocoderConfig,
}

impl Vocoder {
    /// Create a decoder from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`VocoderError::InvalidConfig`](crate::VocoderError) if the
    /// configuration is out of range.
    pub fn new(config: VocoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The decoder's configuration
    pub fn config(&self) -> &VocoderConfig {
        &self.config
    }

    /// Number of samples a decode of `frame_count` frames produces
    pub fn required_samples(&self, frame_count: usize) -> usize {
        required_samples(
            frame_count,
            self.config.frame_period_ms,
            self.config.sample_rate,
        )
    }

    /// Decode into a caller-supplied buffer
    ///
    /// Runs expansion, reconstruction, and synthesis in sequence, then
    /// quantizes into `output`, which must hold exactly
    /// [`required_samples`](Self::required_samples) samples. Samples beyond
    /// the 16-bit range are clamped and counted.
    ///
    /// # Errors
    ///
    /// Fails atomically (no partial writes) on dimension or length
    /// mismatches.
    pub fn decode_into(&self, params: &FrameParams<'_>, output: &mut [i16]) -> Result<DecodeStats> {
        validation::validate_frame_params(&self.config, params)?;
        let frames = params.frame_count();
        let required = self.required_samples(frames);
        validation::validate_output_length(required, output.len())?;

        tracing::debug!(frames, samples = required, "decoding parametric frames");

        let aperiodicity = aperiodicity::expand(
            params.coded_aperiodicity,
            frames,
            self.config.sample_rate,
            self.config.fft_size,
        );
        let spectrogram = envelope::reconstruct(
            params.spectral_envelope,
            frames,
            self.config.fft_size,
            self.config.log_offset,
        );
        let f0: Vec<f64> = params.f0.iter().map(|&v| f64::from(v)).collect();

        let mut synthesized = vec![0.0; required];
        waveform::synthesize(
            &f0,
            &spectrogram,
            &aperiodicity,
            self.config.fft_size,
            self.config.frame_period_ms,
            self.config.sample_rate,
            &mut synthesized,
        );

        let mut clipped = 0usize;
        for (out, &value) in output.iter_mut().zip(synthesized.iter()) {
            let (sample, was_clipped) = quantize(value);
            *out = sample;
            clipped += usize::from(was_clipped);
        }
        if clipped > 0 {
            tracing::warn!(clipped, "clamped samples exceeding the 16-bit range");
        }

        Ok(DecodeStats {
            samples_written: required,
            clipped_samples: clipped,
        })
    }

    /// Decode into a freshly allocated buffer
    ///
    /// # Errors
    ///
    /// Same failure modes as [`decode_into`](Self::decode_into).
    pub fn decode(&self, params: &FrameParams<'_>) -> Result<Vec<i16>> {
        let mut output = vec![0i16; self.required_samples(params.frame_count())];
        self.decode_into(params, &mut output)?;
        Ok(output)
    }
}

/// Quantize one float sample to 16-bit PCM.
///
/// Rounds half away from zero and clamps to the representable range instead
/// of wrapping; the flag reports whether clamping occurred. NaN quantizes to
/// zero and is not counted as clipped, so the clip count only ever reports
/// samples that actually exceeded the range.
pub(crate) fn quantize(value: f64) -> (i16, bool) {
    if value.is_nan() {
        return (0, false);
    }
    let scaled = (PCM_SCALE * value).round();
    let clamped = scaled.clamp(f64::from(i16::MIN), f64::from(i16::MAX));
    (clamped as i16, clamped != scaled)
}
