use crate::data::data_sample::DataSample;
use crate::float_trait::Float;

use ndarray::{Array1, Zip};
use ndarray_stats::SummaryStatisticsExt;

/// Single-passband time series
///
/// This struct caches it's properties, like weighted mean magnitude value, etc., that's why
/// mutable reference is required by the periodogram routines
#[derive(Clone, Debug)]
pub struct TimeSeries<'a, T>
where
    T: Float,
{
    pub t: DataSample<'a, T>,
    pub m: DataSample<'a, T>,
    pub w: DataSample<'a, T>,
    m_weighted_mean: Option<T>,
    m_chi2: Option<T>,
}

macro_rules! time_series_getter {
    ($t: ty, $attr: ident, $getter: ident, $func: expr) => {
        // This lint is false-positive in macros
        // https://github.com/rust-lang/rust-clippy/issues/1553
        #[allow(clippy::redundant_closure_call)]
        pub fn $getter(&mut self) -> $t {
            match self.$attr {
                Some(x) => x,
                None => {
                    self.$attr = Some($func(self));
                    self.$attr.unwrap()
                }
            }
        }
    };

    ($attr: ident, $getter: ident, $func: expr) => {
        time_series_getter!(T, $attr, $getter, $func);
    };
}

impl<'a, T> TimeSeries<'a, T>
where
    T: Float,
{
    /// Construct `TimeSeries` from array-like objects
    ///
    /// `t` is time, `m` is magnitude (or flux), `w` is weights, i.e. inverse squared
    /// uncertainties of `m`.
    ///
    /// All arrays must have the same length, `t` must increase monotonically. Input arrays could be
    /// [`ndarray::Array1`], [`ndarray::ArrayView1`], 1-D [`ndarray::CowArray`], or `&[T]`.
    pub fn new(
        t: impl Into<DataSample<'a, T>>,
        m: impl Into<DataSample<'a, T>>,
        w: impl Into<DataSample<'a, T>>,
    ) -> Self {
        let t = t.into();
        let m = m.into();
        let w = w.into();

        assert_eq!(t.len(), m.len(), "t and m should have the same size");
        assert_eq!(m.len(), w.len(), "m and w should have the same size");

        Self {
            t,
            m,
            w,
            m_weighted_mean: None,
            m_chi2: None,
        }
    }

    /// Construct [`TimeSeries`] from time and magnitude (flux) with unity weights
    pub fn new_without_weight(
        t: impl Into<DataSample<'a, T>>,
        m: impl Into<DataSample<'a, T>>,
    ) -> Self {
        let t = t.into();
        let w = Array1::ones(t.len());
        Self::new(t, m, w)
    }

    /// Construct [`TimeSeries`] from time, magnitude and magnitude uncertainties
    ///
    /// Weights are set to inverse squared uncertainties
    pub fn from_errors(
        t: impl Into<DataSample<'a, T>>,
        m: impl Into<DataSample<'a, T>>,
        err: &[T],
    ) -> Self {
        let w: Array1<_> = err.iter().map(|&e| (e * e).recip()).collect();
        Self::new(t, m, w)
    }

    /// Time series length
    #[inline]
    pub fn lenu(&self) -> usize {
        self.t.len()
    }

    time_series_getter!(
        m_weighted_mean,
        get_m_weighted_mean,
        |ts: &mut TimeSeries<T>| {
            ts.m.sample
                .weighted_mean(&ts.w.sample)
                .expect("time series must be non-empty")
        }
    );

    // Weighted total sum of squares around the weighted mean
    time_series_getter!(m_chi2, get_m_chi2, |ts: &mut TimeSeries<T>| {
        let m_weighed_mean = ts.get_m_weighted_mean();
        Zip::from(&ts.m.sample)
            .and(&ts.w.sample)
            .fold(T::zero(), |chi2, &m, &w| {
                chi2 + (m - m_weighed_mean).powi(2) * w
            })
    });

    /// Magnitudes minus their weighted mean
    pub fn m_centered(&mut self) -> Vec<T> {
        let mean = self.get_m_weighted_mean();
        self.m.sample.iter().map(|&m| m - mean).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unreadable_literal)]
#[allow(clippy::excessive_precision)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn time_series_m_weighted_mean() {
        let t: Vec<_> = (0..5).map(|i| i as f64).collect();
        let m = [
            12.77883145,
            18.89988406,
            17.55633632,
            18.36073996,
            11.83854198,
        ];
        let w = [0.1282489, 0.10576467, 0.32102692, 0.12962352, 0.10746144];
        let mut ts = TimeSeries::new(&t, &m, &w);
        // np.average(m, weights=w)
        let desired = 16.31817047752941;
        assert_relative_eq!(ts.get_m_weighted_mean(), desired, epsilon = 1e-6);
    }

    #[test]
    fn time_series_m_chi2() {
        let t: Vec<_> = (0..5).map(|i| i as f64).collect();
        let m = [
            12.77883145,
            18.89988406,
            17.55633632,
            18.36073996,
            11.83854198,
        ];
        let w = [0.1282489, 0.10576467, 0.32102692, 0.12962352, 0.10746144];
        let mut ts = TimeSeries::new(&t, &m, &w);
        // reduced chi2 times (N - 1)
        let desired = 1.3752251301435465 * 4.0;
        assert_relative_eq!(ts.get_m_chi2(), desired, epsilon = 1e-6);
    }

    #[test]
    fn weights_from_errors() {
        let t = [0.0, 1.0, 2.0];
        let m = [1.0, 2.0, 3.0];
        let err = [0.5, 1.0, 2.0];
        let mut ts = TimeSeries::from_errors(&t, &m, &err);
        assert_eq!(ts.w.as_slice(), &[4.0, 1.0, 0.25]);
    }

    #[test]
    fn centered_magnitudes_have_zero_weighted_mean() {
        let t = [0.0, 1.0, 2.0, 3.0];
        let m = [10.0, 12.0, 11.0, 15.0];
        let w = [1.0, 2.0, 3.0, 4.0];
        let mut ts = TimeSeries::new(&t, &m, &w);
        let centered = ts.m_centered();
        let weighted_sum: f64 = centered.iter().zip(w.iter()).map(|(m, w)| m * w).sum();
        assert_relative_eq!(weighted_sum, 0.0, epsilon = 1e-12);
    }
}
