use crate::float_trait::Float;
use crate::periodogram::{AovTerms, PeriodogramValues, aov_statistic};

use conv::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Combination of single-passband fits into the multiband statistic
///
/// Only the passbands with a defined fit at the given frequency take part, weights are
/// normalised over them.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BandCombination {
    /// Pooled analysis of variance:
    /// $\theta = \frac{\sum d_2}{\sum d_1} \frac{\sum \mathrm{SSR}}{\sum \mathrm{SSE}}$
    ///
    /// A passband contributes its degrees of freedom and its weighted sums of squares, so larger
    /// and less noisy passbands dominate the statistic.
    #[default]
    Pooled,
    /// Mean of single-passband statistics weighted by the number of observations in each
    /// passband. Useful if no weight is given to observations
    Count,
    /// Mean of single-passband statistics weighted by
    /// $\chi^2 = \sum \left(\frac{m_i - \bar{m}}{\delta_i}\right)^2$
    Chi2,
}

impl BandCombination {
    /// Combined statistic at a single frequency, `None` if no passband has a defined fit
    pub fn combine<'a, T, I>(&self, terms: I) -> Option<T>
    where
        T: Float,
        I: IntoIterator<Item = &'a AovTerms<T>>,
    {
        match self {
            Self::Pooled => {
                let (explained, residual, dof_model, dof_residual, n) = terms.into_iter().fold(
                    (T::zero(), T::zero(), 0_usize, 0_usize, 0_usize),
                    |(explained, residual, dof_model, dof_residual, n), terms| {
                        (
                            explained + terms.explained,
                            residual + terms.residual,
                            dof_model + terms.dof_model,
                            dof_residual + terms.dof_residual,
                            n + 1,
                        )
                    },
                );
                (n > 0).then(|| {
                    aov_statistic(
                        explained,
                        residual,
                        dof_model.approx().unwrap(),
                        dof_residual.approx().unwrap(),
                    )
                })
            }
            Self::Count => Self::weighted_mean(
                terms
                    .into_iter()
                    .map(|t| (T::approx_from(t.n_obs).unwrap(), t)),
            ),
            Self::Chi2 => Self::weighted_mean(terms.into_iter().map(|t| (t.total, t))),
        }
    }

    fn weighted_mean<'a, T: Float>(
        weighted: impl Iterator<Item = (T, &'a AovTerms<T>)>,
    ) -> Option<T> {
        let (sum, norm, n) = weighted.fold(
            (T::zero(), T::zero(), 0_usize),
            |(sum, norm, n), (weight, terms)| {
                let weighted = if weight.is_zero() {
                    T::zero()
                } else {
                    weight * terms.statistic()
                };
                (sum + weighted, norm + weight, n + 1)
            },
        );
        match n {
            0 => None,
            // All passbands are flat
            _ if norm.is_zero() => Some(T::zero()),
            _ => Some(sum / norm),
        }
    }

    /// Combine per-passband fits over a frequency grid
    ///
    /// Every item of `per_band` must have the same length, the length of the frequency grid
    pub fn combine_bands<T: Float>(
        &self,
        per_band: &[Vec<Option<AovTerms<T>>>],
    ) -> PeriodogramValues<T> {
        let size = per_band.first().map_or(0, Vec::len);
        assert!(
            per_band.iter().all(|terms| terms.len() == size),
            "all passbands must be evaluated on the same frequency grid"
        );
        let (power, n_bands): (Vec<_>, Vec<_>) = (0..size)
            .map(|i| {
                let present = || per_band.iter().filter_map(move |terms| terms[i].as_ref());
                match self.combine(present()) {
                    Some(power) => (power, present().count()),
                    None => (T::zero(), 0),
                }
            })
            .unzip();
        PeriodogramValues {
            power: power.into(),
            n_bands: n_bands.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn terms(explained: f64, total: f64, n_obs: usize) -> AovTerms<f64> {
        AovTerms::new(explained, total, n_obs, 1)
    }

    #[test]
    fn single_band_is_unchanged() {
        let a = terms(3.0, 10.0, 20);
        for combination in [
            BandCombination::Pooled,
            BandCombination::Count,
            BandCombination::Chi2,
        ] {
            assert_relative_eq!(
                combination.combine([&a]).unwrap(),
                a.statistic(),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn pooled() {
        let a = terms(3.0, 10.0, 20);
        let b = terms(1.0, 2.0, 10);
        // d1 = 2 + 2, d2 = 17 + 7
        let desired = 24.0 / 4.0 * 4.0 / 8.0;
        assert_relative_eq!(
            BandCombination::Pooled.combine([&a, &b]).unwrap(),
            desired,
            max_relative = 1e-12
        );
    }

    #[test]
    fn count_and_chi2() {
        let a = terms(3.0, 10.0, 20);
        let b = terms(1.0, 2.0, 10);
        let count = (20.0 * a.statistic() + 10.0 * b.statistic()) / 30.0;
        assert_relative_eq!(
            BandCombination::Count.combine([&a, &b]).unwrap(),
            count,
            max_relative = 1e-12
        );
        let chi2 = (10.0 * a.statistic() + 2.0 * b.statistic()) / 12.0;
        assert_relative_eq!(
            BandCombination::Chi2.combine([&a, &b]).unwrap(),
            chi2,
            max_relative = 1e-12
        );
    }

    #[test]
    fn flat_bands() {
        let flat = terms(0.0, 0.0, 10);
        assert_eq!(BandCombination::Chi2.combine([&flat, &flat]), Some(0.0));
        assert_eq!(BandCombination::Pooled.combine([&flat, &flat]), Some(0.0));
    }

    #[test]
    fn undefined_only_if_all_bands_undefined() {
        let a = terms(3.0, 10.0, 20);
        let b = terms(1.0, 2.0, 10);
        let per_band = vec![vec![Some(a), None, None], vec![Some(b), Some(b), None]];
        let values = BandCombination::Pooled.combine_bands(&per_band);
        assert_eq!(values.n_bands.to_vec(), vec![2, 1, 0]);
        assert_relative_eq!(values.power[1], b.statistic(), max_relative = 1e-12);
        assert_eq!(values.power[2], 0.0);
        assert!(!values.is_informative(2));
    }

    #[test]
    fn serde() {
        assert_eq!(
            serde_json::to_string(&BandCombination::Chi2).unwrap(),
            r#""Chi2""#
        );
        let combination: BandCombination = serde_json::from_str(r#""Pooled""#).unwrap();
        assert_eq!(combination, BandCombination::default());
    }
}
