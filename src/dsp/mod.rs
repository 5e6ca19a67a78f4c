//! Shared DSP primitives: FFT wrappers, interpolation, and noise generation

pub mod fft;
pub mod interp;
pub mod noise;
