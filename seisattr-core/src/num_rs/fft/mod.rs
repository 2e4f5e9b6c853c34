mod plan;

pub use plan::SpectralPlan;

use crate::{Error, Result};
use num_traits::Float;
use rustfft::num_complex::Complex;
use rustfft::FftNum;

/// Compute the one-dimensional discrete Fourier transform.
///
/// Behavioural port of `numpy.fft.fft(x)`:
///
/// `X[k] = sum_{n=0}^{N-1} x[n] * exp(-2*pi*i*k*n/N)`
///
/// Any `N >= 1` is accepted, including odd and non power-of-two lengths.
/// The input is left untouched.
///
/// # Errors
/// [`Error::InvalidLength`] when `x` is empty.
///
/// # Examples
/// ```
/// use rustfft::num_complex::Complex;
/// use seisattr_core::num_rs::fft;
///
/// let x = [1.0f64, 0.0, -1.0, 0.0].map(|v| Complex::new(v, 0.0));
/// let spectrum = fft(&x).unwrap();
/// assert!((spectrum[1].re - 2.0).abs() < 1e-12);
/// assert!((spectrum[3].re - 2.0).abs() < 1e-12);
/// ```
pub fn fft<T>(x: &[Complex<T>]) -> Result<Vec<Complex<T>>>
where
    T: FftNum + Float,
{
    let plan = SpectralPlan::try_new(x.len()).map_err(|_| Error::InvalidLength { arg: "x" })?;
    let mut buf = x.to_vec();
    let mut scratch = plan.make_scratch();
    plan.forward_inplace(&mut buf, &mut scratch)?;
    Ok(buf)
}

/// Forward transform of a real sequence, returning all `N` bins.
///
/// Equivalent to `numpy.fft.fft` on real input, not the half spectrum of
/// `numpy.fft.rfft`.
pub fn rfft_full<T>(x: &[T]) -> Result<Vec<Complex<T>>>
where
    T: FftNum + Float,
{
    let x = x
        .iter()
        .map(|v| Complex::new(*v, T::zero()))
        .collect::<Vec<_>>();
    fft(&x)
}

/// Forward transform over exactly `n` points.
///
/// Mirrors `numpy.fft.fft(x, n)`: the input is truncated to its first `n`
/// samples when longer, zero-padded when shorter.
///
/// # Errors
/// [`Error::InvalidLength`] when `n == 0`.
pub fn fft_n<T>(x: &[Complex<T>], n: usize) -> Result<Vec<Complex<T>>>
where
    T: FftNum + Float,
{
    if n == 0 {
        return Err(Error::InvalidLength { arg: "n" });
    }
    let mut padded = vec![Complex::new(T::zero(), T::zero()); n];
    let copied = n.min(x.len());
    padded[..copied].copy_from_slice(&x[..copied]);
    fft(&padded)
}

/// Compute the one-dimensional inverse discrete Fourier transform.
///
/// Behavioural port of `numpy.fft.ifft(x)`:
///
/// `x[n] = (1/N) * sum_{k=0}^{N-1} X[k] * exp(2*pi*i*k*n/N)`
///
/// # Errors
/// [`Error::InvalidLength`] when `spectrum` is empty.
pub fn ifft<T>(spectrum: &[Complex<T>]) -> Result<Vec<Complex<T>>>
where
    T: FftNum + Float,
{
    let plan = SpectralPlan::try_new(spectrum.len())
        .map_err(|_| Error::InvalidLength { arg: "spectrum" })?;
    let mut buf = spectrum.to_vec();
    let mut scratch = plan.make_scratch();
    plan.inverse_inplace(&mut buf, &mut scratch)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::PI;
    use rand::Rng;

    /// Reference DFT straight from the definition.
    fn naive_dft(x: &[Complex<f64>]) -> Vec<Complex<f64>> {
        let n = x.len();
        (0..n)
            .map(|k| {
                x.iter()
                    .enumerate()
                    .map(|(j, v)| {
                        let angle = -2.0 * PI * ((k * j) % n) as f64 / n as f64;
                        *v * Complex::new(angle.cos(), angle.sin())
                    })
                    .sum()
            })
            .collect()
    }

    /// `sin(w*f1*m) + cos(w*f2*m)` with `w = 2*pi/n`.
    fn two_tone(n: usize, f1: usize, f2: usize) -> Vec<Complex<f64>> {
        let w = 2.0 * PI / n as f64;
        (0..n)
            .map(|m| {
                let m = m as f64;
                Complex::new((w * f1 as f64 * m).sin() + (w * f2 as f64 * m).cos(), 0.0)
            })
            .collect()
    }

    fn random_signal(n: usize) -> Vec<Complex<f64>> {
        let mut rng = rand::rng();
        (0..n)
            .map(|_| Complex::new(rng.random_range(-100.0..100.0), 0.0))
            .collect()
    }

    #[test]
    fn empty_input_is_invalid_length() {
        let x: Vec<Complex<f64>> = Vec::new();
        assert_eq!(fft(&x), Err(Error::InvalidLength { arg: "x" }));
        assert_eq!(ifft(&x), Err(Error::InvalidLength { arg: "spectrum" }));
        assert_eq!(rfft_full::<f64>(&[]), Err(Error::InvalidLength { arg: "x" }));
        assert_eq!(
            fft_n(&[Complex::new(1.0, 0.0)], 0),
            Err(Error::InvalidLength { arg: "n" })
        );
    }

    #[test]
    fn quarter_period_cosine_spectrum() {
        let spectrum = rfft_full(&[1.0, 0.0, -1.0, 0.0]).expect("fft");
        let expected = [0.0, 2.0, 0.0, 2.0];
        for (bin, re) in spectrum.iter().zip(expected) {
            assert_abs_diff_eq!(bin.re, re, epsilon = 1e-12);
            assert_abs_diff_eq!(bin.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn odd_and_even_two_tone_bins() {
        let (f1, f2) = (12, 19);
        for n in [143usize, 144] {
            let half = n as f64 / 2.0;
            let spectrum = fft(&two_tone(n, f1, f2)).expect("fft");
            assert_eq!(spectrum.len(), n);
            for (k, bin) in spectrum.iter().enumerate() {
                let expected = if k == f1 {
                    Complex::new(0.0, -half)
                } else if k == n - f1 {
                    Complex::new(0.0, half)
                } else if k == f2 || k == n - f2 {
                    Complex::new(half, 0.0)
                } else {
                    Complex::new(0.0, 0.0)
                };
                assert_abs_diff_eq!(bin.re, expected.re, epsilon = 1e-10);
                assert_abs_diff_eq!(bin.im, expected.im, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn matches_definition_for_awkward_lengths() {
        for n in [1usize, 2, 3, 5, 7, 97, 143, 144] {
            let x = random_signal(n);
            let fast = fft(&x).expect("fft");
            let slow = naive_dft(&x);
            for (a, b) in fast.iter().zip(slow.iter()) {
                assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-8);
                assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn inverse_round_trips() {
        for n in [1usize, 2, 3, 143, 144, 1000] {
            let x = random_signal(n);
            let y = ifft(&fft(&x).expect("fft")).expect("ifft");
            assert_eq!(y.len(), n);
            for (a, b) in x.iter().zip(y.iter()) {
                let tol = 1e-9 * a.norm().max(1.0);
                assert_abs_diff_eq!(a.re, b.re, epsilon = tol);
                assert_abs_diff_eq!(b.im, 0.0, epsilon = tol);
            }
        }
    }

    #[test]
    fn forward_is_linear() {
        let mut rng = rand::rng();
        for n in [3usize, 64, 143] {
            let x = random_signal(n);
            let y = random_signal(n);
            let a: f64 = rng.random_range(-5.0..5.0);
            let b: f64 = rng.random_range(-5.0..5.0);
            let combined = x
                .iter()
                .zip(y.iter())
                .map(|(x, y)| *x * a + *y * b)
                .collect::<Vec<_>>();

            let lhs = fft(&combined).expect("fft");
            let fx = fft(&x).expect("fft");
            let fy = fft(&y).expect("fft");
            for ((l, x), y) in lhs.iter().zip(fx.iter()).zip(fy.iter()) {
                let r = *x * a + *y * b;
                assert_abs_diff_eq!(l.re, r.re, epsilon = 1e-8);
                assert_abs_diff_eq!(l.im, r.im, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn fft_n_pads_and_truncates() {
        let x = random_signal(6);
        let padded = fft_n(&x, 9).expect("fft_n");
        let mut manual = x.clone();
        manual.resize(9, Complex::new(0.0, 0.0));
        for (a, b) in padded.iter().zip(naive_dft(&manual).iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-9);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-9);
        }

        let truncated = fft_n(&x, 4).expect("fft_n");
        for (a, b) in truncated.iter().zip(naive_dft(&x[..4]).iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-9);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let x = random_signal(17);
        let copy = x.clone();
        let _ = fft(&x).expect("fft");
        let _ = ifft(&x).expect("ifft");
        assert_eq!(x, copy);
    }

    #[test]
    fn single_precision_round_trip() {
        let x = [0.5f32, -1.25, 3.0, 2.0, -0.75]
            .map(|v| Complex::new(v, 0.0))
            .to_vec();
        let y = ifft(&fft(&x).expect("fft")).expect("ifft");
        for (a, b) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-5);
        }
    }
}
