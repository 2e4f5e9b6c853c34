//! Instantaneous (complex-trace) attributes of real seismic traces.
//!
//! Every attribute is derived from the analytic signal `y = x + i H[x]`
//! computed by [`crate::signal::hilbert`]:
//!
//! * instantaneous phase `atan2(Im y, Re y)`, in `(-pi, pi]`
//! * envelope (reflection strength) `|y|`
//! * Hilbert component (quadrature trace) `Im y`
//!
//! The extended set adds instantaneous frequency, bandwidth and sweetness,
//! derived from the three above with [`unwrap`](crate::signal::unwrap::unwrap)
//! and [`time_derivative`](crate::signal::gradient::time_derivative).
//!
//! Grids are traces x samples. Every trace is processed independently; rows
//! must share one length, which is checked before anything is computed.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, ReadGrid};
use crate::signal::traits::{InstantaneousAttributes1D, SelectedGridAttributes, TraceGridAttributes};
use core::fmt;
use core::str::FromStr;
use itertools::izip;
use ndarray::Array2;
use num_traits::{Float, FloatConst};
use rustfft::num_complex::Complex;
use rustfft::FftNum;

mod grid;
mod kernels;
pub use grid::*;
pub use kernels::*;

/// Phase, envelope and Hilbert component of a single trace.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantaneousAttributes<T> {
    /// Instantaneous phase in radians, `(-pi, pi]`.
    pub phase: Vec<T>,
    /// Instantaneous amplitude, `>= 0`.
    pub envelope: Vec<T>,
    /// Imaginary part of the analytic signal.
    pub hilbert: Vec<T>,
}

/// Phase, envelope and Hilbert component of a traces x samples grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAttributes<T> {
    /// Instantaneous phase in radians, `(-pi, pi]`.
    pub phase: Array2<T>,
    /// Instantaneous amplitude, `>= 0`.
    pub envelope: Array2<T>,
    /// Imaginary part of the analytic signal.
    pub hilbert: Array2<T>,
}

/// Per-sample trace attribute selectable through [`AttributeKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    /// The input samples themselves.
    Value,
    /// Imaginary part of the analytic signal.
    Hilbert,
    /// Instantaneous amplitude.
    Envelope,
    /// Instantaneous phase in radians.
    Phase,
    /// Instantaneous frequency in cycles per unit of the sample interval.
    Frequency,
    /// Instantaneous bandwidth, `|d envelope / dt| / (2 pi envelope)`.
    Bandwidth,
    /// Envelope over the square root of the instantaneous frequency.
    Sweetness,
}

impl Attribute {
    /// Every attribute, in declaration order.
    pub const ALL: [Attribute; 7] = [
        Attribute::Value,
        Attribute::Hilbert,
        Attribute::Envelope,
        Attribute::Phase,
        Attribute::Frequency,
        Attribute::Bandwidth,
        Attribute::Sweetness,
    ];

    /// Lowercase request name.
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Value => "samplevalue",
            Attribute::Hilbert => "hilbert",
            Attribute::Envelope => "envelope",
            Attribute::Phase => "phase",
            Attribute::Frequency => "frequency",
            Attribute::Bandwidth => "bandwidth",
            Attribute::Sweetness => "sweetness",
        }
    }

    /// Whether computing this attribute needs the analytic signal.
    pub fn needs_analytic(&self) -> bool {
        !matches!(self, Attribute::Value)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(ConfigError::InvalidArgument {
                arg: "attribute",
                reason: "unknown attribute name",
            })
    }
}

/// Instantaneous phase of one analytic sample, `-pi` folded onto `pi`.
pub(crate) fn phase_of<F: Float + FloatConst>(c: Complex<F>) -> F {
    let p = c.im.atan2(c.re);
    if p == -F::PI() {
        F::PI()
    } else {
        p
    }
}

/// Write phase, envelope and Hilbert component of `analytic` into the three
/// outputs. All four slices share one length.
pub(crate) fn split_analytic<F: Float + FloatConst>(
    analytic: &[Complex<F>],
    phase: &mut [F],
    envelope: &mut [F],
    hilbert: &mut [F],
) {
    for (y, p, e, h) in izip!(analytic, phase, envelope, hilbert) {
        *p = phase_of(*y);
        *e = y.norm();
        *h = y.im;
    }
}

/// Compute phase, envelope and Hilbert component of one real trace.
///
/// # Errors
/// [`ExecInvariantViolation::InvalidLength`] when `x` is empty.
pub fn instantaneous_attributes<F>(
    x: &[F],
) -> Result<InstantaneousAttributes<F>, ExecInvariantViolation>
where
    F: FftNum + Float + FloatConst,
{
    let kernel = InstantaneousAttributesKernel::try_new(InstantaneousAttributesConfig::default())
        .map_err(ExecInvariantViolation::from)?;
    kernel.run_alloc(x)
}

/// Compute phase, envelope and Hilbert component of every trace in `grid`.
///
/// Rows are validated first: a row whose length differs from row 0 fails with
/// [`ExecInvariantViolation::RaggedGrid`] and an empty row with
/// [`ExecInvariantViolation::InvalidLength`]. A grid without rows yields
/// `0 x n` outputs, where `n` is the array's column count (`0` for row lists).
pub fn trace_grid_attributes<F, G>(grid: &G) -> Result<GridAttributes<F>, ExecInvariantViolation>
where
    F: FftNum + Float + FloatConst,
    G: ReadGrid<F> + Sync + ?Sized,
{
    let kernel =
        TraceGridKernel::try_new(TraceGridConfig::default()).map_err(ExecInvariantViolation::from)?;
    kernel.run_alloc(grid)
}

/// Compute the requested `attributes` for every trace in `grid`, sampled at
/// interval `sample_interval`.
///
/// Returns one traces x samples array per requested attribute, in request
/// order. Grid validation is the same as [`trace_grid_attributes`].
pub fn grid_attributes<F, G>(
    grid: &G,
    attributes: &[Attribute],
    sample_interval: F,
) -> Result<Vec<Array2<F>>, ExecInvariantViolation>
where
    F: FftNum + Float + FloatConst,
    G: ReadGrid<F> + Sync + ?Sized,
{
    let kernel = AttributeKernel::try_new(AttributeConfig {
        attributes: attributes.to_vec(),
        sample_interval,
        parallel: true,
    })
    .map_err(ExecInvariantViolation::from)?;
    kernel.run_alloc(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::PI;
    use ndarray::array;
    use rand::seq::SliceRandom;
    use rand::Rng;

    fn random_grid(rows: usize, samples: usize) -> Vec<Vec<f64>> {
        let mut rng = rand::rng();
        (0..rows)
            .map(|_| (0..samples).map(|_| rng.random_range(-10.0..10.0)).collect())
            .collect()
    }

    #[test]
    fn quarter_period_cosine_attributes() {
        let attrs = instantaneous_attributes(&[1.0, 0.0, -1.0, 0.0]).expect("attributes");
        let expected_phase = [0.0, PI / 2.0, PI, -PI / 2.0];
        for (p, e) in attrs.phase.iter().zip(expected_phase.iter()) {
            // Compare on the circle; sample 2 sits on the branch cut.
            let d = (p - e + PI).rem_euclid(2.0 * PI) - PI;
            assert_abs_diff_eq!(d, 0.0, epsilon = 1e-12);
        }
        for e in attrs.envelope.iter() {
            assert_abs_diff_eq!(*e, 1.0, epsilon = 1e-12);
        }
        for (h, e) in attrs.hilbert.iter().zip([0.0, 1.0, 0.0, -1.0].iter()) {
            assert_abs_diff_eq!(*h, *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn envelope_and_phase_ranges() {
        for row in random_grid(8, 257) {
            let attrs = instantaneous_attributes(&row).expect("attributes");
            assert_eq!(attrs.phase.len(), row.len());
            assert!(attrs.envelope.iter().all(|e| *e >= 0.0));
            assert!(attrs.phase.iter().all(|p| *p > -PI && *p <= PI));
            for ((e, h), x) in attrs.envelope.iter().zip(attrs.hilbert.iter()).zip(row.iter()) {
                assert_abs_diff_eq!(*e, x.hypot(*h), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn negative_real_axis_maps_to_positive_pi() {
        assert_eq!(phase_of(Complex::new(-1.0f64, -0.0)), PI);
        assert_eq!(phase_of(Complex::new(-1.0f64, 0.0)), PI);
        assert_abs_diff_eq!(phase_of(Complex::new(0.0f64, -1.0)), -PI / 2.0, epsilon = 1e-15);
    }

    #[test]
    fn single_sample_trace() {
        let attrs = instantaneous_attributes(&[-2.0f64]).expect("attributes");
        assert_abs_diff_eq!(attrs.envelope[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(attrs.phase[0], PI, epsilon = 1e-12);
        assert_abs_diff_eq!(attrs.hilbert[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_trace_is_invalid_length() {
        let err = instantaneous_attributes::<f64>(&[]).expect_err("empty input");
        assert_eq!(err, ExecInvariantViolation::InvalidLength { arg: "x" });
    }

    #[test]
    fn grid_rows_match_single_trace_results() {
        let rows = random_grid(5, 64);
        let out = trace_grid_attributes(&rows).expect("grid attributes");
        assert_eq!(out.phase.dim(), (5, 64));
        for (i, row) in rows.iter().enumerate() {
            let attrs = instantaneous_attributes(row).expect("attributes");
            for j in 0..row.len() {
                assert_abs_diff_eq!(out.phase[[i, j]], attrs.phase[j], epsilon = 1e-12);
                assert_abs_diff_eq!(out.envelope[[i, j]], attrs.envelope[j], epsilon = 1e-12);
                assert_abs_diff_eq!(out.hilbert[[i, j]], attrs.hilbert[j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn grid_results_follow_row_permutations() {
        let rows = random_grid(12, 33);
        let mut order = (0..rows.len()).collect::<Vec<_>>();
        order.shuffle(&mut rand::rng());
        let shuffled = order.iter().map(|i| rows[*i].clone()).collect::<Vec<_>>();

        let out = trace_grid_attributes(&rows).expect("grid attributes");
        let out_shuffled = trace_grid_attributes(&shuffled).expect("grid attributes");
        for (k, i) in order.iter().enumerate() {
            assert_eq!(out_shuffled.envelope.row(k), out.envelope.row(*i));
            assert_eq!(out_shuffled.phase.row(k), out.phase.row(*i));
            assert_eq!(out_shuffled.hilbert.row(k), out.hilbert.row(*i));
        }
    }

    #[test]
    fn ragged_grid_fails_before_computing() {
        let rows = vec![vec![1.0f64, 2.0, 3.0], vec![1.0, 2.0]];
        let err = trace_grid_attributes(&rows).expect_err("ragged grid");
        assert_eq!(
            err,
            ExecInvariantViolation::RaggedGrid {
                row: 1,
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn grid_without_rows_is_empty() {
        let rows: Vec<Vec<f64>> = Vec::new();
        let out = trace_grid_attributes(&rows).expect("empty grid");
        assert_eq!(out.phase.dim(), (0, 0));
        assert_eq!(out.envelope.dim(), (0, 0));
        assert_eq!(out.hilbert.dim(), (0, 0));

        let grid = ndarray::Array2::<f64>::zeros((0, 7));
        let out = trace_grid_attributes(&grid).expect("empty array");
        assert_eq!(out.phase.dim(), (0, 7));
    }

    #[test]
    fn grid_with_empty_rows_is_invalid_length() {
        let rows: Vec<Vec<f64>> = vec![Vec::new(), Vec::new()];
        let err = trace_grid_attributes(&rows).expect_err("empty rows");
        assert_eq!(err, ExecInvariantViolation::InvalidLength { arg: "grid" });
    }

    #[test]
    fn ndarray_grids() {
        let grid = array![[1.0f64, 0.0, -1.0, 0.0], [0.0, 1.0, 0.0, -1.0]];
        let out = trace_grid_attributes(&grid).expect("grid attributes");
        assert_abs_diff_eq!(out.hilbert[[0, 1]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.hilbert[[1, 0]], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.hilbert[[1, 2]], 1.0, epsilon = 1e-12);

        let view_out = trace_grid_attributes(&grid.view()).expect("grid attributes");
        assert_eq!(view_out, out);
    }

    #[test]
    fn attribute_names_round_trip() {
        for a in Attribute::ALL {
            assert_eq!(a.to_string().parse::<Attribute>(), Ok(a));
        }
        assert_eq!("SampleValue".parse::<Attribute>(), Ok(Attribute::Value));
        assert!("coherence".parse::<Attribute>().is_err());
    }

    #[test]
    fn pure_tone_frequency() {
        // 8 cycles over 256 samples at dt = 0.004 s: 7.8125 Hz.
        let n = 256;
        let dt = 0.004;
        let row = (0..n)
            .map(|i| (2.0 * PI * 8.0 * i as f64 / n as f64).cos())
            .collect::<Vec<_>>();
        let out = grid_attributes(&vec![row], &[Attribute::Frequency, Attribute::Envelope], dt)
            .expect("grid attributes");
        assert_eq!(out.len(), 2);
        let expected = 8.0 / (n as f64 * dt);
        for j in 1..n - 1 {
            assert_abs_diff_eq!(out[0][[0, j]], expected, epsilon = 1e-6);
            assert_abs_diff_eq!(out[1][[0, j]], 1.0, epsilon = 1e-9);
        }
    }
}
