//! Analytic-signal construction and instantaneous trace attributes.
//!
//! Function names mirror [`scipy.signal`](https://docs.scipy.org/doc/scipy/reference/signal.html)
//! and numpy where a counterpart exists.

/// Analytic signal, `scipy.signal.hilbert`
pub mod hilbert;

/// Phase, envelope, Hilbert component and the extended attribute set
pub mod attributes;

/// `numpy.unwrap`
pub mod unwrap;

/// `numpy.gradient` along the sample axis
pub mod gradient;

/// Capability traits implemented by the kernels of this module.
pub mod traits;
