mod fft;

pub use fft::*;
