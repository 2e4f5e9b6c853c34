//! Instantaneous (complex-trace) attributes of seismic traces.
//!
//! The analytic signal of every trace is built with the FFT exactly like
//! `scipy.signal.hilbert`; phase, envelope and Hilbert component follow from
//! it, as do the derived frequency, bandwidth and sweetness attributes.
//!
//! ```
//! use seisattr::signal::attributes::instantaneous_attributes;
//!
//! let attrs = instantaneous_attributes(&[1.0f64, 0.0, -1.0, 0.0]).unwrap();
//! assert!((attrs.hilbert[1] - 1.0).abs() < 1e-12);
//! assert!(attrs.envelope.iter().all(|e| (e - 1.0).abs() < 1e-12));
//! ```
//!
//! Enable the `rayon` feature to process the traces of a grid in parallel.

#![warn(missing_docs)]

/// Kernel substrate: configuration lifecycle, errors and buffer adapters
pub mod kernel;

/// Signal processing
pub mod signal;

pub use rustfft::num_complex::Complex;
pub use seisattr_core::num_rs;
