//! Trait interfaces for signal-processing capabilities.
//!
//! Each kernel exposes a `run_into` entrypoint writing into caller buffers
//! and a `run_alloc` entrypoint that allocates its own output.

use crate::kernel::{ExecInvariantViolation, Read1D, ReadGrid, Write1D};
use crate::signal::attributes::{GridAttributes, InstantaneousAttributes};
use ndarray::Array2;
use rustfft::num_complex::Complex;

/// 1D analytic-signal capability (`scipy.signal.hilbert`).
pub trait AnalyticSignal1D<T> {
    /// Compute the analytic signal into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<Complex<T>> + ?Sized;

    /// Compute the analytic signal and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<Complex<T>>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D phase / envelope / Hilbert-component capability.
pub trait InstantaneousAttributes1D<T> {
    /// Compute the three attributes into caller-provided output buffers.
    fn run_into<I, P, E, H>(
        &self,
        input: &I,
        phase: &mut P,
        envelope: &mut E,
        hilbert: &mut H,
    ) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        P: Write1D<T> + ?Sized,
        E: Write1D<T> + ?Sized,
        H: Write1D<T> + ?Sized;

    /// Compute the three attributes and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<InstantaneousAttributes<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D selectable-attribute capability.
pub trait SelectedAttributes1D<T> {
    /// Compute the configured attributes, one output vector per attribute in
    /// configuration order.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<Vec<T>>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Trace-grid phase / envelope / Hilbert-component capability.
pub trait TraceGridAttributes<T> {
    /// Compute the three attributes for every trace of `grid`.
    fn run_alloc<G>(&self, grid: &G) -> Result<GridAttributes<T>, ExecInvariantViolation>
    where
        G: ReadGrid<T> + Sync + ?Sized;
}

/// Trace-grid selectable-attribute capability.
pub trait SelectedGridAttributes<T> {
    /// Compute the configured attributes for every trace of `grid`, one
    /// `traces x samples` array per attribute in configuration order.
    fn run_alloc<G>(&self, grid: &G) -> Result<Vec<Array2<T>>, ExecInvariantViolation>
    where
        G: ReadGrid<T> + Sync + ?Sized;
}

/// 1D phase-unwrapping capability (`numpy.unwrap`).
pub trait Unwrap1D<T> {
    /// Unwrap into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Unwrap and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D sample-axis derivative capability (`numpy.gradient`).
pub trait Gradient1D<T> {
    /// Differentiate into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Differentiate and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}
