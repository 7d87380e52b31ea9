use crate::data::SortedArray;
use crate::error::{InvalidRangeError, SortedArrayError};
use crate::float_trait::Float;
use crate::periodogram::phasor::{PhasorIterator, RecurrentPhasor};

use conv::{ConvAsUtil, RoundToNearest};
use enum_dispatch::enum_dispatch;
use ndarray::{Array1, ArrayView1};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Debug;

/// Frequency grid, frequencies are in cycles per unit of time and strictly increase
#[enum_dispatch]
pub trait FreqGridTrait<T: Float>: Send + Sync + Clone + Debug {
    fn size(&self) -> usize;
    fn get(&self, i: usize) -> T;
    fn minimum(&self) -> T;
    fn maximum(&self) -> T;

    /// Iterator of $\exp(i\,\nu\,\mathrm{time})$ over the frequencies $\nu$ starting from
    /// the `first`-th node
    fn iter_phasor_mul(&self, first: usize, time: T) -> PhasorIterator<'_, T>;

    /// Distance from the `i`-th node to the farthest of its neighbours
    fn local_step(&self, i: usize) -> T {
        let freq = self.get(i);
        let left = if i > 0 {
            freq - self.get(i - 1)
        } else {
            T::zero()
        };
        let right = if i + 1 < self.size() {
            self.get(i + 1) - freq
        } else {
            T::zero()
        };
        left.max(right)
    }

    fn to_array(&self) -> Array1<T> {
        (0..self.size()).map(|i| self.get(i)).collect()
    }
}

#[enum_dispatch(FreqGridTrait<T>)]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(bound = "T: Float")]
#[schemars(bound = "T: Float")]
#[non_exhaustive]
pub enum FreqGrid<T: Float> {
    Arbitrary(SortedArray<T>),
    Linear(LinearFreqGrid<T>),
    LogPeriod(LogPeriodFreqGrid<T>),
}

impl<T: Float> FreqGrid<T> {
    /// Construct from a sorted frequency array
    pub fn try_from_sorted_array(
        sorted_array: impl Into<Array1<T>>,
    ) -> Result<Self, SortedArrayError> {
        Ok(Self::Arbitrary(SortedArray::from_sorted(sorted_array)?))
    }

    /// Construct from an array reference, array will be copied and sorted
    pub fn from_array<'a>(array: impl Into<ArrayView1<'a, T>>) -> Self {
        let array_view = array.into();
        Self::Arbitrary(array_view.into())
    }

    /// Construct a linear grid
    pub fn linear(start: T, step: T, size: usize) -> Self {
        Self::Linear(LinearFreqGrid::new(start, step, size))
    }

    /// Construct a grid uniform in logarithm of period
    pub fn log_period(start: T, log_step: T, size: usize) -> Self {
        Self::LogPeriod(LogPeriodFreqGrid::new(start, log_step, size))
    }
}

impl<T: Float> From<FreqGrid<T>> for Cow<'static, FreqGrid<T>> {
    fn from(value: FreqGrid<T>) -> Self {
        Cow::Owned(value)
    }
}

impl<'a, T: Float> From<&'a FreqGrid<T>> for Cow<'a, FreqGrid<T>> {
    fn from(value: &'a FreqGrid<T>) -> Self {
        Cow::Borrowed(value)
    }
}

impl<T: Float> FreqGridTrait<T> for SortedArray<T> {
    fn size(&self) -> usize {
        self.len()
    }

    fn get(&self, i: usize) -> T {
        self[i]
    }

    fn minimum(&self) -> T {
        SortedArray::minimum(self)
    }

    fn maximum(&self) -> T {
        SortedArray::maximum(self)
    }

    fn iter_phasor_mul(&self, first: usize, time: T) -> PhasorIterator<'_, T> {
        let angle_iter = self[first..].iter().map(move |&freq| freq * time);
        PhasorIterator::from_angles(angle_iter)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(bound = "T: Float")]
#[schemars(bound = "T: Float")]
pub struct LinearFreqGrid<T: Float> {
    /// Grid start point
    start: T,
    /// Distance between points
    step: T,
    /// Number of points
    size: usize,
}

impl<T: Float> LinearFreqGrid<T> {
    pub fn new(start: T, step: T, size: usize) -> Self {
        assert!(start >= T::zero(), "start must not be negative");
        assert!(
            step.is_finite() && step.is_sign_positive() && !step.is_zero(),
            "frequency step must be finite and positive"
        );
        assert!(size > 0, "Size must not be zero");
        Self { start, step, size }
    }

    pub fn step(&self) -> T {
        self.step
    }
}

impl<T: Float> FreqGridTrait<T> for LinearFreqGrid<T> {
    fn size(&self) -> usize {
        self.size
    }

    fn get(&self, i: usize) -> T {
        self.start + self.step * i.approx().unwrap()
    }

    fn minimum(&self) -> T {
        self.start
    }

    fn maximum(&self) -> T {
        self.get(self.size - 1)
    }

    fn iter_phasor_mul(&self, first: usize, time: T) -> PhasorIterator<'_, T> {
        RecurrentPhasor::new(self.get(first) * time, self.step * time).into()
    }

    fn local_step(&self, _i: usize) -> T {
        if self.size > 1 { self.step } else { T::zero() }
    }
}

/// Grid uniform in $\ln P = -\ln\nu$: $\nu_k = \nu_0 \exp(k \Delta)$
///
/// The grid is denser in frequency at low frequencies (long periods)
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(bound = "T: Float")]
#[schemars(bound = "T: Float")]
pub struct LogPeriodFreqGrid<T: Float> {
    /// The lowest frequency
    start: T,
    /// Step in logarithm of period
    log_step: T,
    /// Number of points
    size: usize,
}

impl<T: Float> LogPeriodFreqGrid<T> {
    pub fn new(start: T, log_step: T, size: usize) -> Self {
        assert!(
            start.is_finite() && start > T::zero(),
            "start must be positive and finite"
        );
        assert!(
            log_step.is_finite() && log_step > T::zero(),
            "logarithmic step must be finite and positive"
        );
        assert!(size > 0, "Size must not be zero");
        Self {
            start,
            log_step,
            size,
        }
    }

    pub fn log_step(&self) -> T {
        self.log_step
    }
}

impl<T: Float> FreqGridTrait<T> for LogPeriodFreqGrid<T> {
    fn size(&self) -> usize {
        self.size
    }

    fn get(&self, i: usize) -> T {
        let i: T = i.approx().unwrap();
        self.start * T::exp(self.log_step * i)
    }

    fn minimum(&self) -> T {
        self.start
    }

    fn maximum(&self) -> T {
        self.get(self.size - 1)
    }

    fn iter_phasor_mul(&self, first: usize, time: T) -> PhasorIterator<'_, T> {
        let angle_iter = (first..self.size).map(move |i| self.get(i) * time);
        PhasorIterator::from_angles(angle_iter)
    }
}

/// Frequency grid builder
///
/// In linear mode nodes are separated by `resolution` starting from `fmin`, the number of nodes
/// is $\lceil (f_\mathrm{max} - f_\mathrm{min}) / \mathrm{resolution} \rceil + 1$.
///
/// In log-period mode nodes are uniform in $\ln P$, the step is chosen so that the distance
/// between the two highest frequencies doesn't exceed `resolution`, and the grid spans
/// $[f_\mathrm{min}, f_\mathrm{max}]$ exactly.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(bound = "T: Float")]
#[schemars(bound = "T: Float")]
#[serde(default)]
pub struct FreqGridParams<T> {
    pub fmin: T,
    pub fmax: T,
    pub resolution: T,
    pub log_period_spacing: bool,
}

impl<T: Float> FreqGridParams<T> {
    pub fn new(fmin: T, fmax: T, resolution: T) -> Self {
        Self {
            fmin,
            fmax,
            resolution,
            log_period_spacing: false,
        }
    }

    pub fn log_period(fmin: T, fmax: T, resolution: T) -> Self {
        Self {
            log_period_spacing: true,
            ..Self::new(fmin, fmax, resolution)
        }
    }

    pub fn default_fmin() -> T {
        T::zero()
    }

    pub fn default_fmax() -> T {
        T::one()
    }

    pub fn default_resolution() -> T {
        T::ten().powi(-4)
    }

    fn validate(&self) -> Result<(), InvalidRangeError> {
        if !(self.fmin.is_finite() && self.fmax.is_finite()) {
            return Err(InvalidRangeError::NonFiniteBound {
                fmin: to_f64(self.fmin),
                fmax: to_f64(self.fmax),
            });
        }
        if self.fmax <= self.fmin {
            return Err(InvalidRangeError::NonIncreasingBounds {
                fmin: to_f64(self.fmin),
                fmax: to_f64(self.fmax),
            });
        }
        if !(self.resolution.is_finite() && self.resolution > T::zero()) {
            return Err(InvalidRangeError::NonPositiveResolution(to_f64(
                self.resolution,
            )));
        }
        if self.log_period_spacing {
            if self.fmin <= T::zero() {
                return Err(InvalidRangeError::NonPositiveMinFreqLogPeriod(to_f64(
                    self.fmin,
                )));
            }
        } else if self.fmin < T::zero() {
            return Err(InvalidRangeError::NegativeMinFreq(to_f64(self.fmin)));
        }
        Ok(())
    }

    pub fn build(&self) -> Result<FreqGrid<T>, InvalidRangeError> {
        self.validate()?;
        let grid = if self.log_period_spacing {
            let log_range = T::ln(self.fmax / self.fmin);
            let nominal_log_step = T::ln_1p(self.resolution / self.fmax);
            let size = grid_size(log_range / nominal_log_step)?;
            let log_step = log_range / (size - 1).approx().unwrap();
            FreqGrid::log_period(self.fmin, log_step, size)
        } else {
            let size = grid_size((self.fmax - self.fmin) / self.resolution)?;
            FreqGrid::linear(self.fmin, self.resolution, size)
        };
        log::debug!(
            "Built {} frequency grid of {} nodes from {} to {}",
            if self.log_period_spacing {
                "log-period"
            } else {
                "linear"
            },
            grid.size(),
            grid.minimum(),
            grid.maximum(),
        );
        Ok(grid)
    }
}

impl<T: Float> Default for FreqGridParams<T> {
    fn default() -> Self {
        Self::new(
            Self::default_fmin(),
            Self::default_fmax(),
            Self::default_resolution(),
        )
    }
}

/// Number of nodes covering `n_steps` steps, the quotients which are integer up to the rounding
/// error are not ceiled up
fn grid_size<T: Float>(n_steps: T) -> Result<usize, InvalidRangeError> {
    let rounded = n_steps.round();
    let n_steps = if (n_steps - rounded).abs() <= T::epsilon().sqrt() * rounded.max(T::one()) {
        rounded
    } else {
        n_steps.ceil()
    };
    let n_steps: usize = n_steps
        .approx_by::<RoundToNearest>()
        .map_err(|_| InvalidRangeError::GridTooLarge(to_f64(n_steps)))?;
    n_steps
        .max(1)
        .checked_add(1)
        .ok_or(InvalidRangeError::GridTooLarge(f64::INFINITY))
}

fn to_f64<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn assert_strictly_increasing(grid: &FreqGrid<f64>) {
        let freq = grid.to_array().to_vec();
        assert!(
            freq.windows(2).all(|w| w[1] > w[0]),
            "grid is not strictly increasing"
        );
    }

    #[test]
    fn linear_grid_size() {
        let grid = FreqGridParams::new(0.01, 10.0, 1e-4).build().unwrap();
        assert_eq!(grid.size(), 99_901);
        assert_relative_eq!(grid.minimum(), 0.01);
        assert_relative_eq!(grid.maximum(), 10.0, max_relative = 1e-12);
        assert_strictly_increasing(&grid);
    }

    #[test]
    fn linear_grid_size_ceil() {
        let grid = FreqGridParams::new(0.0, 1.0, 0.3).build().unwrap();
        assert_eq!(grid.size(), 5);
        assert_relative_eq!(grid.maximum(), 1.2, max_relative = 1e-12);
    }

    #[test]
    fn linear_grid_is_deterministic() {
        let params = FreqGridParams::new(0.123, 4.56, 7.8e-3);
        assert_eq!(params.build().unwrap(), params.build().unwrap());
    }

    #[test]
    fn log_period_grid() {
        let params = FreqGridParams::log_period(0.01, 10.0, 1e-3);
        let grid = params.build().unwrap();
        assert_strictly_increasing(&grid);
        assert_relative_eq!(grid.minimum(), 0.01, max_relative = 1e-12);
        assert_relative_eq!(grid.maximum(), 10.0, max_relative = 1e-10);

        let log_period: Vec<_> = grid.to_array().iter().map(|f| -f64::ln(*f)).collect();
        let log_step = log_period[0] - log_period[1];
        for w in log_period.windows(2) {
            assert_relative_eq!(w[0] - w[1], log_step, max_relative = 1e-6);
        }

        // the coarsest frequency step is at the top and it is not larger than the resolution
        let n = grid.size();
        assert!(grid.get(n - 1) - grid.get(n - 2) <= params.resolution * (1.0 + 1e-9));
        assert!(grid.get(1) - grid.get(0) < grid.get(n - 1) - grid.get(n - 2));
    }

    #[test]
    fn invalid_ranges() {
        assert_eq!(
            FreqGridParams::new(1.0, 1.0, 1e-3).build().unwrap_err(),
            InvalidRangeError::NonIncreasingBounds {
                fmin: 1.0,
                fmax: 1.0
            }
        );
        assert_eq!(
            FreqGridParams::new(2.0, 1.0, 1e-3).build().unwrap_err(),
            InvalidRangeError::NonIncreasingBounds {
                fmin: 2.0,
                fmax: 1.0
            }
        );
        assert_eq!(
            FreqGridParams::new(0.0, 1.0, 0.0).build().unwrap_err(),
            InvalidRangeError::NonPositiveResolution(0.0)
        );
        assert_eq!(
            FreqGridParams::new(0.0, 1.0, -1e-3).build().unwrap_err(),
            InvalidRangeError::NonPositiveResolution(-1e-3)
        );
        assert_eq!(
            FreqGridParams::new(-0.5, 1.0, 1e-3).build().unwrap_err(),
            InvalidRangeError::NegativeMinFreq(-0.5)
        );
        assert_eq!(
            FreqGridParams::log_period(0.0, 1.0, 1e-3)
                .build()
                .unwrap_err(),
            InvalidRangeError::NonPositiveMinFreqLogPeriod(0.0)
        );
        assert!(matches!(
            FreqGridParams::new(0.0, f64::INFINITY, 1e-3).build(),
            Err(InvalidRangeError::NonFiniteBound { .. })
        ));
    }

    #[test]
    fn local_step() {
        let linear = FreqGrid::linear(0.5, 0.25, 10);
        assert_eq!(linear.local_step(0), 0.25);
        assert_eq!(linear.local_step(9), 0.25);

        let arbitrary = FreqGrid::from_array(&[1.0, 1.5, 3.0, 3.25]);
        assert_eq!(arbitrary.local_step(0), 0.5);
        assert_eq!(arbitrary.local_step(1), 1.5);
        assert_eq!(arbitrary.local_step(3), 0.25);
    }

    #[test]
    fn arbitrary_vs_linear_phasors() {
        let start = 0.33;
        let step = 0.1;
        let size = 1000;
        let time = 7.7;
        let first = 123;

        let linear_grid = FreqGrid::linear(start, step, size);
        let freqs: Vec<_> = (0..size).map(|i| start + step * i as f64).collect();
        let arbitrary_grid = FreqGrid::try_from_sorted_array(freqs).unwrap();

        for (a, b) in linear_grid
            .iter_phasor_mul(first, time)
            .zip(arbitrary_grid.iter_phasor_mul(first, time))
            .take(size - first)
        {
            assert_relative_eq!((a - b).norm(), 0.0, epsilon = 1e-10);
        }
        assert_eq!(arbitrary_grid.iter_phasor_mul(first, time).count(), size - first);
    }

    #[test]
    fn log_period_phasors_start_at_first() {
        let grid = FreqGrid::log_period(0.1, 0.01, 100);
        let time = 3.0;
        let z = grid.iter_phasor_mul(42, time).next().unwrap();
        assert_relative_eq!(z.arg(), (grid.get(42) * time), max_relative = 1e-12);
    }

    #[test]
    fn params_serde() {
        let params = FreqGridParams::log_period(0.01, 10.0, 1e-4);
        let json = serde_json::to_string(&params).unwrap();
        let restored: FreqGridParams<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(params, restored);

        let partial: FreqGridParams<f64> = serde_json::from_str(r#"{"fmax": 5.0}"#).unwrap();
        assert_eq!(
            partial,
            FreqGridParams::new(0.0, 5.0, FreqGridParams::<f64>::default_resolution())
        );
    }
}
