use crate::float_trait::Float;
use crate::periodogram::fit_trait::*;

use num_complex::Complex;
use num_traits::One;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum number of harmonics supported by [HarmonicFitDirect]
pub const MAX_HARMONICS: usize = 8;

const MAX_PARAMS: usize = 2 * MAX_HARMONICS + 1;

/// Harmonic fit by the weighted normal equations
///
/// The normal matrix has a fixed maximum size and lives on the stack, it is decomposed by
/// Cholesky method. The explained sum of squares is $b^T A^{-1} b = |L^{-1} b|^2$, so no back
/// substitution is required. It is slower and less stable than
/// [HarmonicFitMhaov](crate::periodogram::HarmonicFitMhaov) and is used mostly to cross-check it.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename = "Direct")]
pub struct HarmonicFitDirect;

impl HarmonicFitTrait for HarmonicFitDirect {
    #[allow(clippy::needless_range_loop)]
    fn aov_terms<T: Float>(
        &self,
        input: &FitInput<T>,
        z: &[Complex<T>],
        n_harmonics: usize,
        _workspace: &mut FitWorkspace<T>,
    ) -> Option<AovTerms<T>> {
        assert!(
            n_harmonics <= MAX_HARMONICS,
            "HarmonicFitDirect supports up to {MAX_HARMONICS} harmonics"
        );
        let n = input.len();
        assert_eq!(n, z.len(), "phasors must be aligned with observations");
        if n < min_observations(n_harmonics) {
            return None;
        }
        let n_params = 2 * n_harmonics + 1;

        // Lower triangle only
        let mut matrix = [[T::zero(); MAX_PARAMS]; MAX_PARAMS];
        let mut rhs = [T::zero(); MAX_PARAMS];
        let mut basis = [T::zero(); MAX_PARAMS];
        basis[0] = T::one();
        for ((&z, &y), &w) in z.iter().zip(input.y.iter()).zip(input.w) {
            let mut zk = Complex::one();
            for k in 1..=n_harmonics {
                zk = zk * z;
                basis[2 * k - 1] = zk.re;
                basis[2 * k] = zk.im;
            }
            for i in 0..n_params {
                let wb = w * basis[i];
                rhs[i] += wb * y;
                for j in 0..=i {
                    matrix[i][j] += wb * basis[j];
                }
            }
        }

        let tolerance = T::epsilon().sqrt();
        for j in 0..n_params {
            let diagonal = matrix[j][j];
            let pivot = diagonal - (0..j).map(|k| matrix[j][k].powi(2)).sum::<T>();
            if pivot <= tolerance * diagonal {
                return None;
            }
            let l_jj = pivot.sqrt();
            matrix[j][j] = l_jj;
            for i in j + 1..n_params {
                let s = matrix[i][j] - (0..j).map(|k| matrix[i][k] * matrix[j][k]).sum::<T>();
                matrix[i][j] = s / l_jj;
            }
        }

        let mut u = [T::zero(); MAX_PARAMS];
        let mut explained = T::zero();
        for i in 0..n_params {
            let s = rhs[i] - (0..i).map(|k| matrix[i][k] * u[k]).sum::<T>();
            u[i] = s / matrix[i][i];
            explained += u[i].powi(2);
        }
        Some(AovTerms::new(explained, input.total, n, n_harmonics))
    }
}
