use crate::{Error, Result};
use core::fmt;
use num_traits::Float;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftNum, FftPlanner};
use std::sync::Arc;

/// Forward and inverse transforms planned once for a fixed length.
///
/// The plan is `Send + Sync`; every caller brings its own scratch buffer
/// (see [`SpectralPlan::make_scratch`]) so a single plan can be shared by
/// worker threads transforming many equally sized traces.
#[derive(Clone)]
pub struct SpectralPlan<T: FftNum> {
    len: usize,
    scale: T,
    scratch_len: usize,
    forward: Arc<dyn Fft<T>>,
    inverse: Arc<dyn Fft<T>>,
}

impl<T> SpectralPlan<T>
where
    T: FftNum + Float,
{
    /// Plan transforms of length `len`.
    pub fn try_new(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::InvalidLength { arg: "len" });
        }
        let scale = T::from_usize(len)
            .map(|n| T::one() / n)
            .ok_or(Error::InvalidLength { arg: "len" })?;

        let mut planner = FftPlanner::<T>::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        let scratch_len = core::cmp::max(
            forward.get_inplace_scratch_len(),
            inverse.get_inplace_scratch_len(),
        );

        Ok(Self {
            len,
            scale,
            scratch_len,
            forward,
            inverse,
        })
    }

    /// Planned transform length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; zero-length plans cannot be constructed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Allocate a scratch buffer large enough for either direction.
    pub fn make_scratch(&self) -> Vec<Complex<T>> {
        vec![Complex::new(T::zero(), T::zero()); self.scratch_len]
    }

    /// Forward DFT of `buf` in place.
    ///
    /// `X[k] = sum_n x[n] * exp(-2*pi*i*k*n/N)`, no normalization.
    pub fn forward_inplace(
        &self,
        buf: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
    ) -> Result<()> {
        self.check_buffers(buf, scratch)?;
        self.forward
            .process_with_scratch(buf, &mut scratch[..self.scratch_len]);
        Ok(())
    }

    /// Inverse DFT of `buf` in place, normalized by `1/N`.
    pub fn inverse_inplace(
        &self,
        buf: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
    ) -> Result<()> {
        self.check_buffers(buf, scratch)?;
        self.inverse
            .process_with_scratch(buf, &mut scratch[..self.scratch_len]);
        buf.iter_mut().for_each(|c| *c = *c * self.scale);
        Ok(())
    }

    fn check_buffers(&self, buf: &[Complex<T>], scratch: &[Complex<T>]) -> Result<()> {
        if buf.len() != self.len {
            return Err(Error::LengthMismatch {
                arg: "buf",
                expected: self.len,
                got: buf.len(),
            });
        }
        if scratch.len() < self.scratch_len {
            return Err(Error::LengthMismatch {
                arg: "scratch",
                expected: self.scratch_len,
                got: scratch.len(),
            });
        }
        Ok(())
    }
}

impl<T: FftNum> fmt::Debug for SpectralPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralPlan")
            .field("len", &self.len)
            .field("scratch_len", &self.scratch_len)
            .finish_non_exhaustive()
    }
}
