//! Input validation for decode operations
//!
//! Every check runs before any synthesis work or output write, so a failed
//! call is atomic: the caller's buffer is untouched.

use crate::error::{Result, VocoderError};
use crate::types::{FrameParams, VocoderConfig};

/// Validate the per-frame parameter arrays against the configuration.
pub fn validate_frame_params(config: &VocoderConfig, params: &FrameParams<'_>) -> Result<()> {
    let frames = params.frame_count();
    if frames == 0 {
        return Err(VocoderError::invalid_dimension("f0", 1, 0));
    }

    let expected_envelope = frames * config.spectral_dim();
    if params.spectral_envelope.len() != expected_envelope {
        return Err(VocoderError::invalid_dimension(
            "spectral_envelope",
            expected_envelope,
            params.spectral_envelope.len(),
        ));
    }

    let expected_coded = frames * config.aperiodicity_bands();
    if params.coded_aperiodicity.len() != expected_coded {
        return Err(VocoderError::invalid_dimension(
            "coded_aperiodicity",
            expected_coded,
            params.coded_aperiodicity.len(),
        ));
    }

    Ok(())
}

/// Validate the caller-supplied output buffer length against the computed
/// synthesis length.
pub fn validate_output_length(required: usize, actual: usize) -> Result<()> {
    if required != actual {
        return Err(VocoderError::length_mismatch(required, actual));
    }
    Ok(())
}
