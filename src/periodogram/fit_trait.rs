use crate::data::TimeSeries;
use crate::float_trait::Float;

use conv::prelude::*;
use num_complex::Complex;
use num_traits::Zero;
use std::fmt::Debug;

/// Analysis of variance terms of a weighted harmonic fit at a single frequency
///
/// `explained` is the weighted sum of squares of the model around the weighted mean (SSR),
/// `residual` is the weighted sum of squared residuals (SSE), their sum is `total` (SST).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AovTerms<T> {
    pub explained: T,
    pub residual: T,
    pub total: T,
    /// Model degrees of freedom, $2M$
    pub dof_model: usize,
    /// Residual degrees of freedom, $N - 2M - 1$
    pub dof_residual: usize,
    /// Number of observations
    pub n_obs: usize,
}

impl<T: Float> AovTerms<T> {
    pub fn new(explained: T, total: T, n_obs: usize, n_harmonics: usize) -> Self {
        let explained = explained.max(T::zero()).min(total);
        let dof_model = 2 * n_harmonics;
        Self {
            explained,
            residual: (total - explained).max(T::zero()),
            total,
            dof_model,
            dof_residual: n_obs.saturating_sub(dof_model + 1),
            n_obs,
        }
    }

    /// $\theta_\mathrm{AoV} = \frac{d_2}{d_1} \frac{\mathrm{SSR}}{\mathrm{SSE}}$
    ///
    /// A flat time series gives zero, an exact fit of a variable time series gives infinity
    pub fn statistic(&self) -> T {
        aov_statistic(
            self.explained,
            self.residual,
            self.dof_model.approx().unwrap(),
            self.dof_residual.approx().unwrap(),
        )
    }
}

pub(crate) fn aov_statistic<T: Float>(
    explained: T,
    residual: T,
    dof_model: T,
    dof_residual: T,
) -> T {
    if explained <= T::zero() {
        T::zero()
    } else if residual <= T::zero() {
        T::infinity()
    } else {
        dof_residual / dof_model * explained / residual
    }
}

/// Minimum number of observations for the `n_harmonics`-harmonic fit to have a non-zero number
/// of residual degrees of freedom
pub fn min_observations(n_harmonics: usize) -> usize {
    2 * n_harmonics + 2
}

/// Single-passband data prepared for harmonic fits
///
/// Magnitudes are centered by their weighted mean
#[derive(Clone, Debug)]
pub struct FitInput<'a, T> {
    pub t: &'a [T],
    pub w: &'a [T],
    pub y: Vec<T>,
    pub w_sum: T,
    pub total: T,
}

impl<'a, T: Float> FitInput<'a, T> {
    pub fn new(ts: &'a mut TimeSeries<'_, T>) -> Self {
        let y = ts.m_centered();
        let total = ts.get_m_chi2();
        let w_sum = ts.w.get_sum();
        let t = ts.t.as_slice();
        let w = ts.w.as_slice();
        Self {
            t,
            w,
            y,
            w_sum,
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// Scratch buffers reused between frequencies
#[derive(Clone, Debug, Default)]
pub struct FitWorkspace<T> {
    pub(super) a: Vec<Complex<T>>,
    pub(super) b: Vec<Complex<T>>,
    pub(super) c: Vec<Complex<T>>,
}

impl<T: Float> FitWorkspace<T> {
    pub fn new(n: usize) -> Self {
        Self {
            a: vec![Complex::zero(); n],
            b: vec![Complex::zero(); n],
            c: vec![Complex::zero(); n],
        }
    }

    pub(super) fn resize(&mut self, n: usize) {
        self.a.resize(n, Complex::zero());
        self.b.resize(n, Complex::zero());
        self.c.resize(n, Complex::zero());
    }
}

/// Weighted least-squares fit of a truncated Fourier series
/// $m(t) = a_0 + \sum_{k=1}^M [a_k \cos(2\pi k \nu t) + b_k \sin(2\pi k \nu t)]$
pub trait HarmonicFitTrait: Send + Sync + Clone + Debug {
    /// Fit at a single frequency
    ///
    /// `z` holds unit phasors $z_i = \exp(2\pi i \nu t_i)$ aligned with `input`. Returns `None`
    /// when the fit is undefined: too few observations or degenerate design.
    fn aov_terms<T: Float>(
        &self,
        input: &FitInput<T>,
        z: &[Complex<T>],
        n_harmonics: usize,
        workspace: &mut FitWorkspace<T>,
    ) -> Option<AovTerms<T>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_and_exact_statistic() {
        let flat = AovTerms::<f64>::new(0.0, 0.0, 10, 1);
        assert_eq!(flat.statistic(), 0.0);
        let exact = AovTerms::<f64>::new(5.0, 5.0, 10, 1);
        assert_eq!(exact.residual, 0.0);
        assert!(exact.statistic().is_infinite());
    }

    #[test]
    fn statistic_dof() {
        let terms = AovTerms::new(3.0, 4.0, 13, 2);
        assert_eq!(terms.dof_model, 4);
        assert_eq!(terms.dof_residual, 8);
        assert_eq!(terms.statistic(), 8.0 / 4.0 * 3.0 / 1.0);
    }

    #[test]
    fn fit_input_is_centered() {
        let t = [0.0, 1.0, 2.0, 3.0];
        let m = [1.0, 2.0, 4.0, 9.0];
        let err = [1.0, 0.5, 1.0, 2.0];
        let mut ts = TimeSeries::from_errors(&t, &m, &err);
        let input = FitInput::new(&mut ts);
        assert_eq!(input.w_sum, 1.0 + 4.0 + 1.0 + 0.25);
        let weighted: f64 = input.y.iter().zip(input.w).map(|(y, w)| y * w).sum();
        assert!(weighted.abs() < 1e-12);
        let chi2: f64 = input.y.iter().zip(input.w).map(|(y, w)| y * y * w).sum();
        assert!((chi2 - input.total).abs() < 1e-12);
    }
}
