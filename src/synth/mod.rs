//! Synthesis stages: aperiodicity expansion, envelope reconstruction, and
//! mixed-excitation waveform generation

pub mod aperiodicity;
pub mod envelope;
pub mod excitation;
pub mod waveform;
