//! Trait-first kernels for analytic-signal construction.

use super::analytic_with_plan;
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::AnalyticSignal1D;
use num_traits::Float;
use rustfft::num_complex::Complex;
use rustfft::FftNum;
use seisattr_core::num_rs::SpectralPlan;

/// Constructor config for [`HilbertKernel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HilbertConfig {
    /// Number of Fourier components. `None` uses the input length; otherwise
    /// the input is truncated or zero-padded to `n` samples.
    pub n: Option<usize>,
}

/// Trait-first 1D analytic-signal kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HilbertKernel {
    n: Option<usize>,
}

impl HilbertKernel {
    /// Return the configured number of Fourier components.
    pub fn n(&self) -> Option<usize> {
        self.n
    }

    /// Length of the analytic signal produced for an input of `input_len` samples.
    pub fn output_len(&self, input_len: usize) -> usize {
        self.n.unwrap_or(input_len)
    }

    fn plan<F>(&self, input_len: usize) -> Result<SpectralPlan<F>, ExecInvariantViolation>
    where
        F: FftNum + Float,
    {
        let len = self.output_len(input_len);
        if len == 0 {
            return Err(ExecInvariantViolation::InvalidLength { arg: "x" });
        }
        Ok(SpectralPlan::try_new(len)?)
    }
}

impl KernelLifecycle for HilbertKernel {
    type Config = HilbertConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.n == Some(0) {
            return Err(ConfigError::InvalidArgument {
                arg: "n",
                reason: "number of Fourier components must be > 0",
            });
        }
        Ok(Self { n: config.n })
    }
}

impl<F> AnalyticSignal1D<F> for HilbertKernel
where
    F: FftNum + Float,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<Complex<F>> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let plan = self.plan::<F>(input.len())?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out.len() != plan.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: plan.len(),
                got: out.len(),
            });
        }
        let mut scratch = plan.make_scratch();
        analytic_with_plan(&plan, input, out, &mut scratch)
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<Complex<F>>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let plan = self.plan::<F>(input.len())?;
        let mut out = vec![Complex::new(F::zero(), F::zero()); plan.len()];
        let mut scratch = plan.make_scratch();
        analytic_with_plan(&plan, input, &mut out, &mut scratch)?;
        Ok(out)
    }
}
