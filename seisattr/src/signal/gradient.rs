//! Sample-axis derivative, matching `numpy.gradient(x, dt)`.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::Gradient1D;
use num_traits::Float;

/// Constructor config for [`GradientKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientConfig<F> {
    /// Distance between consecutive samples.
    pub spacing: F,
}

impl<F: Float> Default for GradientConfig<F> {
    fn default() -> Self {
        Self { spacing: F::one() }
    }
}

/// Trait-first 1D gradient kernel.
///
/// Interior points use second-order central differences, the two end points
/// first-order one-sided differences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientKernel<F> {
    spacing: F,
}

impl<F: Float> GradientKernel<F> {
    /// Configured sample spacing.
    pub fn spacing(&self) -> F {
        self.spacing
    }
}

impl<F: Float> KernelLifecycle for GradientKernel<F> {
    type Config = GradientConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        validate_spacing(config.spacing, "spacing")?;
        Ok(Self {
            spacing: config.spacing,
        })
    }
}

pub(crate) fn validate_spacing<F: Float>(h: F, arg: &'static str) -> Result<(), ConfigError> {
    if !h.is_finite() || h <= F::zero() {
        return Err(ConfigError::InvalidArgument {
            arg,
            reason: "sample spacing must be finite and > 0",
        });
    }
    Ok(())
}

pub(crate) fn gradient_slice<F: Float>(x: &[F], out: &mut [F], h: F) {
    let n = x.len();
    match n {
        0 => {}
        1 => out[0] = F::zero(),
        _ => {
            let two_h = h + h;
            out[0] = (x[1] - x[0]) / h;
            out[n - 1] = (x[n - 1] - x[n - 2]) / h;
            for (o, w) in out[1..n - 1].iter_mut().zip(x.windows(3)) {
                *o = (w[2] - w[0]) / two_h;
            }
        }
    }
}

impl<F: Float> Gradient1D<F> for GradientKernel<F> {
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out.len() != input.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: input.len(),
                got: out.len(),
            });
        }
        gradient_slice(input, out, self.spacing);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let mut out = vec![F::zero(); input.len()];
        gradient_slice(input, &mut out, self.spacing);
        Ok(out)
    }
}

/// Derivative of `x` along the sample axis with sample interval `dt`.
///
/// A single sample has zero derivative; an empty input yields an empty output.
pub fn time_derivative<F: Float>(x: &[F], dt: F) -> Result<Vec<F>, ExecInvariantViolation> {
    let kernel = GradientKernel::try_new(GradientConfig { spacing: dt })
        .map_err(ExecInvariantViolation::from)?;
    kernel.run_alloc(x)
}
