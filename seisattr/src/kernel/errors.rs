use core::fmt;

/// Validation errors raised at kernel construction or adapter binding time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input or configuration field is empty.
    EmptyInput {
        /// Name of the argument that is empty.
        arg: &'static str,
    },
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// The same entry was listed more than once.
    DuplicateArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Position of the repeated entry.
        index: usize,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
    /// Output/input lengths did not match required shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyInput { arg } => write!(f, "Input `{arg}` was empty."),
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            ConfigError::DuplicateArgument { arg, index } => {
                write!(f, "Argument `{arg}` repeats an entry at position {index}.")
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
            ConfigError::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Runtime execution invariant violations for checked kernel entrypoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// An execution precondition was violated.
    InvalidState {
        /// Human readable reason.
        reason: &'static str,
    },
    /// A transform was requested on a zero-length trace.
    InvalidLength {
        /// Name of the argument.
        arg: &'static str,
    },
    /// Grid rows do not share one length. Raised before any row is computed.
    RaggedGrid {
        /// Index of the first offending row.
        row: usize,
        /// Length of row 0.
        expected: usize,
        /// Length of the offending row.
        got: usize,
    },
    /// Output length mismatched the expected runtime shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// Adapter binding/configuration failure.
    Config(ConfigError),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<seisattr_core::Error> for ExecInvariantViolation {
    fn from(value: seisattr_core::Error) -> Self {
        match value {
            seisattr_core::Error::InvalidLength { arg } => Self::InvalidLength { arg },
            seisattr_core::Error::LengthMismatch { arg, expected, got } => {
                Self::LengthMismatch { arg, expected, got }
            }
        }
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::InvalidState { reason } => {
                write!(f, "Execution invariant violation: {reason}")
            }
            ExecInvariantViolation::InvalidLength { arg } => {
                write!(f, "Invalid length for `{arg}`: traces must hold at least one sample")
            }
            ExecInvariantViolation::RaggedGrid { row, expected, got } => {
                write!(
                    f,
                    "Ragged grid: row {row} has {got} samples, row 0 has {expected}."
                )
            }
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Execution length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExecInvariantViolation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecInvariantViolation::Config(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_onto_runtime_variants() {
        let err: ExecInvariantViolation = seisattr_core::Error::InvalidLength { arg: "x" }.into();
        assert_eq!(err, ExecInvariantViolation::InvalidLength { arg: "x" });

        let err: ExecInvariantViolation = seisattr_core::Error::LengthMismatch {
            arg: "buf",
            expected: 4,
            got: 3,
        }
        .into();
        assert_eq!(
            err,
            ExecInvariantViolation::LengthMismatch {
                arg: "buf",
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn ragged_grid_message_names_the_row() {
        let err = ExecInvariantViolation::RaggedGrid {
            row: 1,
            expected: 3,
            got: 2,
        };
        assert_eq!(
            err.to_string(),
            "Ragged grid: row 1 has 2 samples, row 0 has 3."
        );
    }

    #[test]
    fn config_errors_are_the_source() {
        use std::error::Error;

        let err = ExecInvariantViolation::from(ConfigError::EmptyInput { arg: "attributes" });
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Input `attributes` was empty.");
    }
}
