use crate::float_trait::Float;
use crate::periodogram::fit_trait::*;

use num_complex::Complex;
use num_traits::One;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Multiharmonic analysis of variance
///
/// The weighted least-squares fit is an orthogonal projection onto the polynomials of
/// $z = \exp(2\pi i \nu t)$ of order up to $2M$, the orthogonal basis is built by the Szegő
/// recurrence, so the time per frequency is $O(NM)$ and no linear system is solved.
///
/// Schwarzenberg-Czerny, 1996, [ApJL 460, L107](https://doi.org/10.1086/309985)
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename = "MHAOV")]
pub struct HarmonicFitMhaov;

impl HarmonicFitTrait for HarmonicFitMhaov {
    fn aov_terms<T: Float>(
        &self,
        input: &FitInput<T>,
        z: &[Complex<T>],
        n_harmonics: usize,
        workspace: &mut FitWorkspace<T>,
    ) -> Option<AovTerms<T>> {
        let n = input.len();
        assert_eq!(n, z.len(), "phasors must be aligned with observations");
        if n < min_observations(n_harmonics) {
            return None;
        }
        workspace.resize(n);
        // phi: orthogonal polynomial, zn: z^order, g: y z^M
        let FitWorkspace {
            a: phi,
            b: zn,
            c: g,
        } = workspace;
        for (((phi, zn), g), (&z, &y)) in phi
            .iter_mut()
            .zip(zn.iter_mut())
            .zip(g.iter_mut())
            .zip(z.iter().zip(input.y.iter()))
        {
            *phi = Complex::one();
            *zn = Complex::one();
            *g = (0..n_harmonics).fold(Complex::one(), |acc, _| acc * z) * y;
        }

        let tolerance = T::epsilon().sqrt() * input.w_sum;
        let max_order = 2 * n_harmonics;
        let mut explained = T::zero();
        for order in 0..=max_order {
            let norm: T = phi
                .iter()
                .zip(input.w)
                .map(|(phi, &w)| phi.norm_sqr() * w)
                .sum();
            if norm <= tolerance {
                return None;
            }
            let projection: Complex<T> = g
                .iter()
                .zip(phi.iter())
                .zip(input.w)
                .map(|((g, phi), &w)| g * phi.conj() * w)
                .sum();
            explained += projection.norm_sqr() / norm;

            if order == max_order {
                break;
            }
            let alpha = z
                .iter()
                .zip(phi.iter())
                .zip(input.w)
                .map(|((z, phi), &w)| z * phi * w)
                .sum::<Complex<T>>()
                / norm;
            for ((phi, zn), &z) in phi.iter_mut().zip(zn.iter_mut()).zip(z) {
                // reversed polynomial on the unit circle is z^n conj(phi)
                let reversed = *zn * phi.conj();
                *phi = z * *phi - alpha * reversed;
                *zn = *zn * z;
            }
        }
        Some(AovTerms::new(explained, input.total, n, n_harmonics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::TimeSeries;

    use approx::assert_relative_eq;
    use light_curve_common::linspace;

    fn phasors(t: &[f64], freq: f64) -> Vec<Complex<f64>> {
        t.iter()
            .map(|&t| Complex::from_polar(1.0, 2.0 * std::f64::consts::PI * freq * t))
            .collect()
    }

    #[test]
    fn noiseless_sine_is_fitted_exactly() {
        let freq = 0.37;
        let t = linspace(0.0_f64, 30.0, 40);
        let m: Vec<_> = t
            .iter()
            .map(|&t| 3.0 + f64::sin(2.0 * std::f64::consts::PI * freq * t + 0.5))
            .collect();
        let mut ts = TimeSeries::new_without_weight(&t, &m);
        let input = FitInput::new(&mut ts);
        let mut workspace = FitWorkspace::new(t.len());
        let terms = HarmonicFitMhaov
            .aov_terms(&input, &phasors(input.t, freq), 1, &mut workspace)
            .unwrap();
        assert_relative_eq!(terms.explained, input.total, max_relative = 1e-10);
        assert!(terms.statistic() > 1e8);
    }

    #[test]
    fn too_few_observations() {
        let t = [0.0, 1.0, 2.5, 3.0];
        let m = [0.0, 1.0, 0.0, 1.0];
        let mut ts = TimeSeries::new_without_weight(&t, &m);
        let input = FitInput::new(&mut ts);
        let mut workspace = FitWorkspace::default();
        let z = phasors(input.t, 0.3);
        assert!(HarmonicFitMhaov.aov_terms(&input, &z, 1, &mut workspace).is_some());
        assert!(HarmonicFitMhaov.aov_terms(&input, &z, 2, &mut workspace).is_none());
    }

    #[test]
    fn zero_frequency_is_degenerate() {
        let t = linspace(0.0_f64, 10.0, 20);
        let m: Vec<_> = t.iter().map(|&t| t.sin()).collect();
        let mut ts = TimeSeries::new_without_weight(&t, &m);
        let input = FitInput::new(&mut ts);
        let mut workspace = FitWorkspace::default();
        let z = phasors(input.t, 0.0);
        assert!(HarmonicFitMhaov.aov_terms(&input, &z, 1, &mut workspace).is_none());
    }

    #[test]
    fn flat_time_series() {
        let t = linspace(0.0_f64, 10.0, 20);
        let m = vec![5.0; 20];
        let mut ts = TimeSeries::new_without_weight(&t, &m);
        let input = FitInput::new(&mut ts);
        let mut workspace = FitWorkspace::default();
        let terms = HarmonicFitMhaov
            .aov_terms(&input, &phasors(input.t, 0.21), 2, &mut workspace)
            .unwrap();
        assert_eq!(terms.statistic(), 0.0);
    }
}
