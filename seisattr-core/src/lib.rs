//! NumPy-style numeric primitives backing `seisattr`.
//!
//! The crate is deliberately small: it owns the discrete Fourier transform
//! used by the analytic-signal kernels and nothing that depends on them.

use core::fmt;

/// Behavioural ports of NumPy routines.
pub mod num_rs;

/// Errors raised by the core primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A transform was requested on a zero-length sequence.
    InvalidLength {
        /// Name of the offending argument.
        arg: &'static str,
    },
    /// A caller-provided buffer did not match the planned transform length.
    LengthMismatch {
        /// Name of the offending argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLength { arg } => {
                write!(f, "Invalid length for `{arg}`: transform length must be > 0")
            }
            Error::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result alias for the core primitives.
pub type Result<T> = core::result::Result<T, Error>;
