//! Shared trait-first kernel substrate.
//!
//! Constructor validation, error types and the buffer adapters that let the
//! attribute kernels read traces from slices, vectors and `ndarray` views
//! without copying.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;
