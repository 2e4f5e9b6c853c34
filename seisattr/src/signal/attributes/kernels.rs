//! Trait-first kernels for per-trace attributes.

use super::{split_analytic, Attribute, InstantaneousAttributes};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::gradient::{gradient_slice, validate_spacing};
use crate::signal::hilbert::{analytic_with_plan, HilbertConfig, HilbertKernel};
use crate::signal::traits::{AnalyticSignal1D, InstantaneousAttributes1D, SelectedAttributes1D};
use crate::signal::unwrap::unwrap;
use itertools::izip;
use num_traits::{Float, FloatConst};
use rustfft::num_complex::Complex;
use rustfft::FftNum;
use seisattr_core::num_rs::SpectralPlan;

/// Constructor config for [`InstantaneousAttributesKernel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstantaneousAttributesConfig {
    /// Number of Fourier components of the underlying analytic signal.
    /// `None` uses the trace length.
    pub n: Option<usize>,
}

/// Trait-first 1D phase / envelope / Hilbert-component kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstantaneousAttributesKernel {
    hilbert: HilbertKernel,
}

impl InstantaneousAttributesKernel {
    /// Return the configured number of Fourier components.
    pub fn n(&self) -> Option<usize> {
        self.hilbert.n()
    }
}

impl KernelLifecycle for InstantaneousAttributesKernel {
    type Config = InstantaneousAttributesConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self {
            hilbert: HilbertKernel::try_new(HilbertConfig { n: config.n })?,
        })
    }
}

impl<F> InstantaneousAttributes1D<F> for InstantaneousAttributesKernel
where
    F: FftNum + Float + FloatConst,
{
    fn run_into<I, P, E, H>(
        &self,
        input: &I,
        phase: &mut P,
        envelope: &mut E,
        hilbert: &mut H,
    ) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        P: Write1D<F> + ?Sized,
        E: Write1D<F> + ?Sized,
        H: Write1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let expected = self.hilbert.output_len(input.len());
        let phase = phase.write_slice_mut().map_err(ExecInvariantViolation::from)?;
        let envelope = envelope
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        let hilbert = hilbert
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        for (arg, got) in [
            ("phase", phase.len()),
            ("envelope", envelope.len()),
            ("hilbert", hilbert.len()),
        ] {
            if got != expected {
                return Err(ExecInvariantViolation::LengthMismatch { arg, expected, got });
            }
        }
        let analytic = self.hilbert.run_alloc(input)?;
        split_analytic(&analytic, phase, envelope, hilbert);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<InstantaneousAttributes<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let analytic = self.hilbert.run_alloc(input)?;
        let n = analytic.len();
        let mut out = InstantaneousAttributes {
            phase: vec![F::zero(); n],
            envelope: vec![F::zero(); n],
            hilbert: vec![F::zero(); n],
        };
        split_analytic(&analytic, &mut out.phase, &mut out.envelope, &mut out.hilbert);
        Ok(out)
    }
}

/// Constructor config for [`AttributeKernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeConfig<F> {
    /// Requested attributes; outputs follow this order.
    pub attributes: Vec<Attribute>,
    /// Sample interval along the trace, e.g. seconds per sample.
    pub sample_interval: F,
    /// Spread grid rows over the rayon pool (feature `rayon`).
    pub parallel: bool,
}

/// Trait-first kernel computing a selectable list of attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeKernel<F> {
    attributes: Vec<Attribute>,
    sample_interval: F,
    parallel: bool,
}

impl<F: Float> AttributeKernel<F> {
    /// Requested attributes, in output order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Configured sample interval.
    pub fn sample_interval(&self) -> F {
        self.sample_interval
    }

    pub(crate) fn parallel(&self) -> bool {
        self.parallel
    }

    pub(crate) fn needs_analytic(&self) -> bool {
        self.attributes.iter().any(Attribute::needs_analytic)
    }
}

impl<F: Float> KernelLifecycle for AttributeKernel<F> {
    type Config = AttributeConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.attributes.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "attributes" });
        }
        for (index, attribute) in config.attributes.iter().enumerate() {
            if config.attributes[..index].contains(attribute) {
                return Err(ConfigError::DuplicateArgument {
                    arg: "attributes",
                    index,
                });
            }
        }
        validate_spacing(config.sample_interval, "sample_interval")?;
        Ok(Self {
            attributes: config.attributes,
            sample_interval: config.sample_interval,
            parallel: config.parallel,
        })
    }
}

impl<F> AttributeKernel<F>
where
    F: FftNum + Float + FloatConst,
{
    /// Derive the requested attributes of trace `x` from its analytic signal.
    ///
    /// `analytic` is empty when no requested attribute needs it, otherwise it
    /// has the length of `x`.
    pub(crate) fn select(&self, x: &[F], analytic: &[Complex<F>]) -> Vec<Vec<F>> {
        let n = x.len();
        let two_pi = F::PI() + F::PI();

        let (mut phase, mut envelope, mut hilbert) = (Vec::new(), Vec::new(), Vec::new());
        if !analytic.is_empty() {
            phase = vec![F::zero(); n];
            envelope = vec![F::zero(); n];
            hilbert = vec![F::zero(); n];
            split_analytic(analytic, &mut phase, &mut envelope, &mut hilbert);
        }

        let wants = |a: Attribute| self.attributes.contains(&a);
        let frequency = if wants(Attribute::Frequency) || wants(Attribute::Sweetness) {
            let mut f = vec![F::zero(); n];
            gradient_slice(&unwrap(&phase), &mut f, self.sample_interval);
            f.iter_mut().for_each(|v| *v = *v / two_pi);
            f
        } else {
            Vec::new()
        };

        self.attributes
            .iter()
            .map(|attribute| match attribute {
                Attribute::Value => x.to_vec(),
                Attribute::Hilbert => hilbert.clone(),
                Attribute::Envelope => envelope.clone(),
                Attribute::Phase => phase.clone(),
                Attribute::Frequency => frequency.clone(),
                Attribute::Bandwidth => {
                    let mut d = vec![F::zero(); n];
                    gradient_slice(&envelope, &mut d, self.sample_interval);
                    izip!(&d, &envelope)
                        .map(|(d, e)| {
                            if *e == F::zero() {
                                F::zero()
                            } else {
                                d.abs() / (two_pi * *e)
                            }
                        })
                        .collect()
                }
                Attribute::Sweetness => izip!(&envelope, &frequency)
                    .map(|(e, f)| {
                        if *f == F::zero() {
                            F::zero()
                        } else {
                            *e / f.abs().sqrt()
                        }
                    })
                    .collect(),
            })
            .collect()
    }
}

impl<F> SelectedAttributes1D<F> for AttributeKernel<F>
where
    F: FftNum + Float + FloatConst,
{
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<Vec<F>>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let x = input.read_slice().map_err(ExecInvariantViolation::from)?;
        if x.is_empty() {
            return Err(ExecInvariantViolation::InvalidLength { arg: "x" });
        }
        if !self.needs_analytic() {
            return Ok(self.select(x, &[]));
        }
        let plan = SpectralPlan::try_new(x.len())?;
        let mut analytic = vec![Complex::new(F::zero(), F::zero()); plan.len()];
        let mut scratch = plan.make_scratch();
        analytic_with_plan(&plan, x, &mut analytic, &mut scratch)?;
        Ok(self.select(x, &analytic))
    }
}
