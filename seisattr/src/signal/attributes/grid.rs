//! Trace-grid driver: validate rows, plan once, run every trace.

use super::{split_analytic, AttributeKernel, GridAttributes};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, ReadGrid};
use crate::signal::hilbert::analytic_with_plan;
use crate::signal::traits::{SelectedGridAttributes, TraceGridAttributes};
use ndarray::Array2;
use num_traits::{Float, FloatConst};
use rustfft::num_complex::Complex;
use rustfft::FftNum;
use seisattr_core::num_rs::SpectralPlan;

/// Constructor config for [`TraceGridKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceGridConfig {
    /// Spread rows over the rayon pool. Ignored without the `rayon` feature.
    pub parallel: bool,
}

impl Default for TraceGridConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Trait-first phase / envelope / Hilbert-component kernel over trace grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceGridKernel {
    parallel: bool,
}

impl TraceGridKernel {
    /// Whether rows may run concurrently.
    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

impl KernelLifecycle for TraceGridKernel {
    type Config = TraceGridConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self {
            parallel: config.parallel,
        })
    }
}

/// Per-worker buffers, reused across the rows a worker processes.
pub(crate) struct TraceWorkspace<'p, F: FftNum> {
    plan: &'p SpectralPlan<F>,
    analytic: Vec<Complex<F>>,
    scratch: Vec<Complex<F>>,
}

impl<'p, F: FftNum + Float> TraceWorkspace<'p, F> {
    fn new(plan: &'p SpectralPlan<F>) -> Self {
        Self {
            plan,
            analytic: vec![Complex::new(F::zero(), F::zero()); plan.len()],
            scratch: plan.make_scratch(),
        }
    }

    /// Analytic signal of `trace`, valid until the next call.
    pub(crate) fn analytic(
        &mut self,
        trace: &[F],
    ) -> Result<&[Complex<F>], ExecInvariantViolation> {
        analytic_with_plan(self.plan, trace, &mut self.analytic, &mut self.scratch)?;
        Ok(&self.analytic)
    }
}

/// Borrow every row of `grid`, checking that all rows share the length of
/// row 0 and that this length is non-zero.
fn validate_rows<F, G>(grid: &G) -> Result<Vec<&[F]>, ExecInvariantViolation>
where
    G: ReadGrid<F> + ?Sized,
{
    let n_rows = grid.n_rows();
    let mut rows: Vec<&[F]> = Vec::with_capacity(n_rows);
    for row in 0..n_rows {
        let trace = grid.read_row(row).map_err(ExecInvariantViolation::from)?;
        if let Some(first) = rows.first() {
            if trace.len() != first.len() {
                return Err(ExecInvariantViolation::RaggedGrid {
                    row,
                    expected: first.len(),
                    got: trace.len(),
                });
            }
        }
        rows.push(trace);
    }
    if rows.first().is_some_and(|r| r.is_empty()) {
        return Err(ExecInvariantViolation::InvalidLength { arg: "grid" });
    }
    Ok(rows)
}

fn compute_rows<F, R>(
    plan: &SpectralPlan<F>,
    rows: &[&[F]],
    parallel: bool,
    row_fn: &R,
) -> Result<Vec<Vec<Vec<F>>>, ExecInvariantViolation>
where
    F: FftNum + Float,
    R: Fn(&[F], &mut TraceWorkspace<'_, F>) -> Result<Vec<Vec<F>>, ExecInvariantViolation> + Sync,
{
    #[cfg(feature = "rayon")]
    {
        if parallel {
            use rayon::prelude::*;
            return rows
                .par_iter()
                .enumerate()
                .map_init(
                    || TraceWorkspace::new(plan),
                    |ws, (row, &trace)| {
                        let out = row_fn(trace, ws);
                        tracing::trace!(row, "trace done");
                        out
                    },
                )
                .collect();
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    let mut ws = TraceWorkspace::new(plan);
    rows.iter()
        .enumerate()
        .map(|(row, &trace)| {
            let out = row_fn(trace, &mut ws);
            tracing::trace!(row, "trace done");
            out
        })
        .collect()
}

/// Run `row_fn` over every trace of `grid` and stack its `outputs` results
/// into traces x samples arrays.
pub(crate) fn drive_rows<F, G, R>(
    grid: &G,
    outputs: usize,
    parallel: bool,
    row_fn: R,
) -> Result<Vec<Array2<F>>, ExecInvariantViolation>
where
    F: FftNum + Float,
    G: ReadGrid<F> + ?Sized,
    R: Fn(&[F], &mut TraceWorkspace<'_, F>) -> Result<Vec<Vec<F>>, ExecInvariantViolation> + Sync,
{
    let rows = validate_rows(grid)?;
    let Some(samples) = rows.first().map(|r| r.len()) else {
        let cols = grid.n_cols().unwrap_or(0);
        tracing::debug!(outputs, cols, "empty trace grid");
        return Ok((0..outputs).map(|_| Array2::zeros((0, cols))).collect());
    };
    let n_rows = rows.len();

    let span = tracing::debug_span!("trace_grid", rows = n_rows, samples, outputs, parallel);
    let _guard = span.enter();

    // One plan for the whole grid; workers only own scratch space.
    let plan = SpectralPlan::try_new(samples)?;
    let per_row = compute_rows(&plan, &rows, parallel, &row_fn)?;

    let mut flat: Vec<Vec<F>> = (0..outputs)
        .map(|_| Vec::with_capacity(n_rows * samples))
        .collect();
    for row_outputs in per_row {
        if row_outputs.len() != outputs {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "trace produced an unexpected number of outputs",
            });
        }
        for (dst, src) in flat.iter_mut().zip(row_outputs) {
            dst.extend(src);
        }
    }
    let arrays = flat
        .into_iter()
        .map(|data| {
            Array2::from_shape_vec((n_rows, samples), data).map_err(|_| {
                ExecInvariantViolation::InvalidState {
                    reason: "trace outputs do not fill the grid",
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!("trace grid done");
    Ok(arrays)
}

impl<F> TraceGridAttributes<F> for TraceGridKernel
where
    F: FftNum + Float + FloatConst,
{
    fn run_alloc<G>(&self, grid: &G) -> Result<GridAttributes<F>, ExecInvariantViolation>
    where
        G: ReadGrid<F> + Sync + ?Sized,
    {
        let arrays = drive_rows(grid, 3, self.parallel, |trace, ws| {
            let n = trace.len();
            let (mut phase, mut envelope, mut hilbert) =
                (vec![F::zero(); n], vec![F::zero(); n], vec![F::zero(); n]);
            split_analytic(ws.analytic(trace)?, &mut phase, &mut envelope, &mut hilbert);
            Ok(vec![phase, envelope, hilbert])
        })?;
        let mut arrays = arrays.into_iter();
        match (arrays.next(), arrays.next(), arrays.next()) {
            (Some(phase), Some(envelope), Some(hilbert)) => Ok(GridAttributes {
                phase,
                envelope,
                hilbert,
            }),
            _ => Err(ExecInvariantViolation::InvalidState {
                reason: "grid driver returned fewer outputs than requested",
            }),
        }
    }
}

impl<F> SelectedGridAttributes<F> for AttributeKernel<F>
where
    F: FftNum + Float + FloatConst,
{
    fn run_alloc<G>(&self, grid: &G) -> Result<Vec<Array2<F>>, ExecInvariantViolation>
    where
        G: ReadGrid<F> + Sync + ?Sized,
    {
        let needs_analytic = self.needs_analytic();
        drive_rows(grid, self.attributes().len(), self.parallel(), |trace, ws| {
            if needs_analytic {
                Ok(self.select(trace, ws.analytic(trace)?))
            } else {
                Ok(self.select(trace, &[]))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::attributes::{grid_attributes, Attribute, AttributeConfig};
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;
    use rand::Rng;

    fn random_grid(rows: usize, samples: usize) -> Array2<f64> {
        let mut rng = rand::rng();
        Array2::from_shape_fn((rows, samples), |_| rng.random_range(-1.0..1.0))
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn rayon_rows_match_sequential_rows() {
        let grid = random_grid(17, 100);
        let seq = TraceGridKernel::try_new(TraceGridConfig { parallel: false })
            .expect("kernel")
            .run_alloc(&grid)
            .expect("sequential");
        let par = TraceGridKernel::try_new(TraceGridConfig::default())
            .expect("kernel")
            .run_alloc(&grid)
            .expect("parallel");
        assert_eq!(seq, par);
    }

    #[test]
    fn ragged_rows_are_reported_by_index() {
        let (a, b, c) = ([1.0f64, 2.0], [3.0f64, 4.0], [5.0f64]);
        let rows: Vec<&[f64]> = vec![&a[..], &b[..], &c[..]];
        let kernel = TraceGridKernel::try_new(TraceGridConfig::default()).expect("kernel");
        let err = TraceGridAttributes::<f64>::run_alloc(&kernel, &rows).expect_err("ragged");
        assert_eq!(
            err,
            ExecInvariantViolation::RaggedGrid {
                row: 2,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn non_contiguous_rows_are_rejected() {
        let grid = random_grid(3, 8);
        let transposed = grid.t();
        let kernel = TraceGridKernel::try_new(TraceGridConfig::default()).expect("kernel");
        let err = kernel.run_alloc(&transposed).expect_err("column-major rows");
        assert_eq!(
            err,
            ExecInvariantViolation::Config(ConfigError::NonContiguous { arg: "grid_view" })
        );
    }

    #[test]
    fn selected_grid_matches_per_trace_kernel() {
        use crate::signal::traits::SelectedAttributes1D;

        let grid = random_grid(4, 50);
        let attributes = vec![Attribute::Sweetness, Attribute::Value, Attribute::Bandwidth];
        let out = grid_attributes(&grid, &attributes, 0.002).expect("grid attributes");
        assert_eq!(out.len(), 3);

        let kernel = AttributeKernel::try_new(AttributeConfig {
            attributes,
            sample_interval: 0.002,
            parallel: false,
        })
        .expect("kernel");
        for (i, row) in grid.rows().into_iter().enumerate() {
            let single = SelectedAttributes1D::run_alloc(&kernel, &row).expect("trace attributes");
            for (k, values) in single.iter().enumerate() {
                for (j, v) in values.iter().enumerate() {
                    assert_abs_diff_eq!(out[k][[i, j]], *v, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn default_parallel_config_runs_in_any_build() {
        let grid = random_grid(5, 33);
        let kernel = TraceGridKernel::try_new(TraceGridConfig::default()).expect("kernel");
        assert!(kernel.parallel());
        let out = kernel.run_alloc(&grid).expect("grid");
        assert_eq!(out.envelope.dim(), (5, 33));
    }

    #[test]
    fn zero_row_arrays_keep_their_sample_count() {
        let grid = Array2::<f64>::zeros((0, 5));
        let kernel = TraceGridKernel::try_new(TraceGridConfig::default()).expect("kernel");
        let out = kernel.run_alloc(&grid).expect("empty grid");
        assert_eq!(out.phase.dim(), (0, 5));
        assert_eq!(out.envelope.dim(), (0, 5));
        assert_eq!(out.hilbert.dim(), (0, 5));

        let selected = grid_attributes(&grid.view(), &[Attribute::Frequency], 0.004)
            .expect("empty view");
        assert_eq!(selected[0].dim(), (0, 5));
    }

    #[test]
    fn selected_grid_without_rows() {
        let rows: Vec<Vec<f32>> = Vec::new();
        let out = grid_attributes(&rows, &[Attribute::Phase, Attribute::Frequency], 1.0)
            .expect("empty grid");
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|a| a.dim() == (0, 0)));
    }
}
