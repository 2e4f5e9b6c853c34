//! Phase unwrapping, matching `numpy.unwrap`.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::Unwrap1D;
use num_traits::{Float, FloatConst};

/// Constructor config for [`UnwrapKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnwrapConfig<F> {
    /// Maximum jump left untouched. `None` means `period / 2`; values below
    /// `period / 2` act as `period / 2`.
    pub discont: Option<F>,
    /// Period of the wrapped quantity.
    pub period: F,
}

impl<F: Float + FloatConst> Default for UnwrapConfig<F> {
    fn default() -> Self {
        Self {
            discont: None,
            period: F::PI() + F::PI(),
        }
    }
}

/// Trait-first 1D phase-unwrapping kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnwrapKernel<F> {
    discont: F,
    period: F,
}

impl<F: Float> UnwrapKernel<F> {
    /// Effective discontinuity threshold.
    pub fn discont(&self) -> F {
        self.discont
    }

    /// Period of the wrapped quantity.
    pub fn period(&self) -> F {
        self.period
    }
}

impl<F: Float> KernelLifecycle for UnwrapKernel<F> {
    type Config = UnwrapConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if !config.period.is_finite() || config.period <= F::zero() {
            return Err(ConfigError::InvalidArgument {
                arg: "period",
                reason: "period must be finite and > 0",
            });
        }
        let half = config.period / (F::one() + F::one());
        let discont = match config.discont {
            Some(d) if !d.is_finite() => {
                return Err(ConfigError::InvalidArgument {
                    arg: "discont",
                    reason: "discont must be finite",
                })
            }
            Some(d) => d.max(half),
            None => half,
        };
        Ok(Self {
            discont,
            period: config.period,
        })
    }
}

/// Floored remainder: the result carries the sign of `b`.
fn floor_mod<F: Float>(a: F, b: F) -> F {
    let r = a % b;
    if r != F::zero() && (r < F::zero()) != (b < F::zero()) {
        r + b
    } else {
        r
    }
}

fn unwrap_slice<F: Float>(p: &[F], out: &mut [F], discont: F, period: F) {
    let high = period / (F::one() + F::one());
    let low = -high;
    let mut correction = F::zero();
    if let Some((first, _)) = p.split_first() {
        out[0] = *first;
    }
    for (i, w) in p.windows(2).enumerate() {
        let dd = w[1] - w[0];
        let mut ddmod = floor_mod(dd - low, period) + low;
        if ddmod == low && dd > F::zero() {
            ddmod = high;
        }
        if dd.abs() >= discont {
            correction = correction + (ddmod - dd);
        }
        out[i + 1] = w[1] + correction;
    }
}

impl<F: Float> Unwrap1D<F> for UnwrapKernel<F> {
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
        unwrap_slice(input, out, self.discont, self.period);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let mut out = vec![F::zero(); input.len()];
        unwrap_slice(input, &mut out, self.discont, self.period);
        Ok(out)
    }
}

/// Unwrap radian phase by replacing jumps of at least `pi` with their
/// `2 pi` complement, `numpy.unwrap(p)`.
///
/// An empty input yields an empty output.
pub fn unwrap<F: Float + FloatConst>(p: &[F]) -> Vec<F> {
    let mut out = vec![F::zero(); p.len()];
    unwrap_slice(p, &mut out, F::PI(), F::PI() + F::PI());
    out
}
