use crate::data::TimeSeries;
use crate::error::DataShapeError;
use crate::float_trait::Float;
use crate::multiband::PassbandTrait;

use itertools::Itertools;
use std::collections::BTreeMap;

/// Light curve observed in one or several passbands
///
/// Every passband holds its own [TimeSeries] sorted by time
#[derive(Clone, Debug)]
pub struct MultiBandTimeSeries<'a, P: PassbandTrait, T: Float> {
    mapping: BTreeMap<P, TimeSeries<'a, T>>,
}

impl<'a, P, T> MultiBandTimeSeries<'a, P, T>
where
    P: PassbandTrait,
    T: Float,
{
    pub fn new(map: impl Into<BTreeMap<P, TimeSeries<'a, T>>>) -> Self {
        Self {
            mapping: map.into(),
        }
    }

    pub fn passbands(&self) -> std::collections::btree_map::Keys<'_, P, TimeSeries<'a, T>> {
        self.mapping.keys()
    }

    pub fn mapping(&self) -> &BTreeMap<P, TimeSeries<'a, T>> {
        &self.mapping
    }

    pub fn mapping_mut(&mut self) -> &mut BTreeMap<P, TimeSeries<'a, T>> {
        &mut self.mapping
    }

    /// Number of passbands
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Total number of observations in all passbands
    pub fn total_lenu(&self) -> usize {
        self.mapping.values().map(TimeSeries::lenu).sum()
    }

    /// Time span between the first and the last observations in any passband
    pub fn duration(&mut self) -> T {
        let (t_min, t_max) = self
            .mapping
            .values_mut()
            .map(|ts| (ts.t.get_min(), ts.t.get_max()))
            .fold((T::infinity(), T::neg_infinity()), |(a, b), (min, max)| {
                (a.min(min), b.max(max))
            });
        if t_min.is_finite() {
            t_max - t_min
        } else {
            T::zero()
        }
    }
}

impl<P, T> MultiBandTimeSeries<'static, P, T>
where
    P: PassbandTrait,
    T: Float,
{
    /// Validate flat aligned arrays and split them into passbands
    ///
    /// Time is shifted by the earliest observation of the whole light curve, and every passband
    /// is sorted by time. Weights are inverse squared uncertainties.
    pub fn from_flat(t: &[T], m: &[T], err: &[T], passbands: &[P]) -> Result<Self, DataShapeError> {
        if t.len() != m.len() || t.len() != err.len() || t.len() != passbands.len() {
            return Err(DataShapeError::LengthMismatch {
                t: t.len(),
                m: m.len(),
                err: err.len(),
                bands: passbands.len(),
            });
        }
        if t.is_empty() {
            return Err(DataShapeError::Empty);
        }
        check_finite("t", t)?;
        check_finite("m", m)?;
        if let Some((index, &value)) = err
            .iter()
            .enumerate()
            .find(|&(_, &e)| !(e.is_finite() && e > T::zero()))
        {
            return Err(DataShapeError::NonPositiveUncertainty {
                index,
                value: value.to_f64().unwrap_or(f64::NAN),
            });
        }

        let t0 = t.iter().copied().fold(T::infinity(), T::min);
        let mut groups: BTreeMap<P, Vec<(T, T, T)>> = BTreeMap::new();
        for (&t, &m, &err, p) in itertools::multizip((t, m, err, passbands)) {
            groups.entry(p.clone()).or_default().push((t - t0, m, err));
        }
        let mapping = groups
            .into_iter()
            .map(|(passband, obs)| {
                // All values are finite here
                let (t, m, err): (Vec<_>, Vec<_>, Vec<_>) = obs
                    .into_iter()
                    .sorted_by(|a, b| a.0.partial_cmp(&b.0).unwrap())
                    .multiunzip();
                (passband, TimeSeries::from_errors(t, m, &err))
            })
            .collect();
        Ok(Self { mapping })
    }
}

fn check_finite<T: Float>(array: &'static str, a: &[T]) -> Result<(), DataShapeError> {
    match a.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(DataShapeError::NonFiniteValue {
            array,
            index,
            value: a[index].to_f64().unwrap_or(f64::NAN),
        }),
        None => Ok(()),
    }
}

impl<'a, P: PassbandTrait, T: Float> FromIterator<(P, TimeSeries<'a, T>)>
    for MultiBandTimeSeries<'a, P, T>
{
    fn from_iter<I: IntoIterator<Item = (P, TimeSeries<'a, T>)>>(iter: I) -> Self {
        Self {
            mapping: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_and_sort_passbands() {
        let t = [3.0, 1.0, 2.0, 5.0, 4.0];
        let m = [13.0, 11.0, 12.0, 15.0, 14.0];
        let err = [1.0, 1.0, 0.5, 1.0, 2.0];
        let bands = ["g", "g", "r", "r", "g"];
        let mut mbts = MultiBandTimeSeries::from_flat(&t, &m, &err, &bands).unwrap();

        assert_eq!(mbts.passbands().copied().collect::<Vec<_>>(), vec!["g", "r"]);
        assert_eq!(mbts.total_lenu(), 5);
        assert_eq!(mbts.duration(), 4.0);

        let g = mbts.mapping_mut().get_mut("g").unwrap();
        assert_eq!(g.t.as_slice(), &[0.0, 2.0, 3.0]);
        assert_eq!(g.m.as_slice(), &[11.0, 13.0, 14.0]);
        assert_eq!(g.w.as_slice(), &[1.0, 1.0, 0.25]);

        let r = mbts.mapping_mut().get_mut("r").unwrap();
        assert_eq!(r.t.as_slice(), &[1.0, 4.0]);
        assert_eq!(r.w.as_slice(), &[4.0, 1.0]);
    }

    #[test]
    fn length_mismatch() {
        let result = MultiBandTimeSeries::from_flat(&[0.0, 1.0], &[0.0], &[1.0, 1.0], &["g", "g"]);
        assert_eq!(
            result.unwrap_err(),
            DataShapeError::LengthMismatch {
                t: 2,
                m: 1,
                err: 2,
                bands: 2
            }
        );
    }

    #[test]
    fn empty() {
        let result = MultiBandTimeSeries::<&str, f64>::from_flat(&[], &[], &[], &[]);
        assert_eq!(result.unwrap_err(), DataShapeError::Empty);
    }

    #[test]
    fn non_positive_uncertainty() {
        let result = MultiBandTimeSeries::from_flat(
            &[0.0, 1.0, 2.0],
            &[0.0, 1.0, 2.0],
            &[1.0, 0.0, 1.0],
            &["g", "g", "g"],
        );
        assert_eq!(
            result.unwrap_err(),
            DataShapeError::NonPositiveUncertainty {
                index: 1,
                value: 0.0
            }
        );
    }

    #[test]
    fn non_finite_magnitude() {
        let result = MultiBandTimeSeries::from_flat(
            &[0.0, 1.0, 2.0],
            &[0.0, f64::INFINITY, 2.0],
            &[1.0, 1.0, 1.0],
            &["g", "g", "g"],
        );
        assert_eq!(
            result.unwrap_err(),
            DataShapeError::NonFiniteValue {
                array: "m",
                index: 1,
                value: f64::INFINITY
            }
        );
    }
}
