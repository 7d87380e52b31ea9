use crate::float_trait::Float;
use crate::periodogram::{FreqGridTrait, PeriodogramValues};

use std::cmp::Ordering;

/// Find local maxima of the array and return their indices
///
/// The first and the last points cannot be peaks, a plateau is reported by its first point
pub fn peak_indices<T>(a: &[T]) -> Vec<usize>
where
    T: Float,
{
    a.iter()
        .enumerate()
        .fold(
            (vec![], T::infinity(), false),
            |(mut v, prev_x, prev_is_rising), (i, &x)| {
                let is_rising = x > prev_x;
                if prev_is_rising && (!is_rising) {
                    v.push(i - 1);
                }
                (v, x, is_rising)
            },
        )
        .0
}

/// Find local maxima of the array and return their indices sorted in descending peak value,
/// equal peaks are sorted by index
pub fn peak_indices_reverse_sorted<T>(a: &[T]) -> Vec<usize>
where
    T: Float,
{
    let mut v = peak_indices(a);
    v.sort_by(|&x, &y| descending(a, x, y));
    v
}

fn descending<T: Float>(a: &[T], x: usize, y: usize) -> Ordering {
    a[y]
        .partial_cmp(&a[x])
        .unwrap_or(Ordering::Equal)
        .then(x.cmp(&y))
}

/// Indices of at most `n` best local maxima of the periodogram
///
/// Points without any contributing passband are not considered. Peaks are taken in descending
/// power order, a peak closer than `min_separation` in frequency to an already selected one is
/// skipped. If the periodogram has no local maximum, the index of the global maximum is
/// returned.
pub fn select_local_optima<T, G>(
    freq_grid: &G,
    values: &PeriodogramValues<T>,
    n: usize,
    min_separation: T,
) -> Vec<usize>
where
    T: Float,
    G: FreqGridTrait<T>,
{
    assert_eq!(
        freq_grid.size(),
        values.len(),
        "periodogram must be evaluated on the frequency grid"
    );
    if n == 0 {
        return vec![];
    }
    let power: Vec<_> = values
        .power
        .iter()
        .zip(values.n_bands.iter())
        .map(|(&power, &n_bands)| {
            if n_bands > 0 {
                power
            } else {
                T::neg_infinity()
            }
        })
        .collect();

    let peaks = peak_indices_reverse_sorted(&power);
    if peaks.is_empty() {
        return (0..power.len())
            .filter(|&i| values.is_informative(i))
            .min_by(|&x, &y| descending(&power, x, y))
            .into_iter()
            .collect();
    }

    let mut selected: Vec<usize> = Vec::with_capacity(n);
    for i in peaks {
        let freq = freq_grid.get(i);
        if selected
            .iter()
            .all(|&j| (freq_grid.get(j) - freq).abs() >= min_separation)
        {
            selected.push(i);
            if selected.len() == n {
                break;
            }
        }
    }
    selected
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    use crate::periodogram::FreqGrid;

    use light_curve_common::linspace;
    use ndarray::Array1;

    macro_rules! peak_indices {
        ($name: ident, $desired: expr, $x: expr $(,)?) => {
            #[test]
            fn $name() {
                let arr: Vec<f32> = $x.to_vec();
                assert_eq!(peak_indices_reverse_sorted(&arr), $desired);
            }
        };
    }

    peak_indices!(
        peak_indices_three_points_peak,
        [1_usize],
        [0.0_f32, 1.0, 0.0]
    );
    peak_indices!(
        peak_indices_three_points_plateau,
        [] as [usize; 0],
        [0.0_f32, 0.0, 0.0]
    );
    peak_indices!(
        peak_indices_three_points_dip,
        [] as [usize; 0],
        [0.0_f32, -1.0, 0.0]
    );
    peak_indices!(peak_indices_long_plateau, [] as [usize; 0], [0.0_f32; 100]);
    peak_indices!(
        peak_indices_sawtooth,
        (1..=99) // the first and the last point cannot be peak
            .filter(|i| i % 2 == 0)
            .collect::<Vec<_>>(),
        (0..=100)
            .map(|i| { if i % 2 == 0 { 1.0_f32 } else { 0.0_f32 } })
            .collect::<Vec<_>>(),
    );
    peak_indices!(
        peak_indices_one_peak,
        [50],
        linspace(-5.0_f32, 5.0, 101)
            .iter()
            .map(|&x| f32::exp(-0.5 * x * x))
            .collect::<Vec<_>>(),
    );

    fn periodogram_values(power: &[f64], n_bands: &[usize]) -> PeriodogramValues<f64> {
        PeriodogramValues {
            power: Array1::from(power.to_vec()),
            n_bands: Array1::from(n_bands.to_vec()),
        }
    }

    #[test]
    fn local_optima_are_sorted() {
        let grid = FreqGrid::linear(1.0, 1.0, 9);
        let values = periodogram_values(
            &[0.0, 2.0, 0.0, 5.0, 1.0, 0.0, 3.0, 0.0, 0.0],
            &[1; 9],
        );
        assert_eq!(select_local_optima(&grid, &values, 3, 0.0), vec![3, 6, 1]);
        assert_eq!(select_local_optima(&grid, &values, 2, 0.0), vec![3, 6]);
    }

    #[test]
    fn close_optima_are_suppressed() {
        let grid = FreqGrid::linear(1.0, 1.0, 9);
        let values = periodogram_values(
            &[0.0, 4.0, 0.0, 5.0, 1.0, 0.0, 3.0, 0.0, 0.0],
            &[1; 9],
        );
        assert_eq!(select_local_optima(&grid, &values, 3, 2.5), vec![3, 6]);
    }

    #[test]
    fn non_informative_points_are_ignored() {
        let grid = FreqGrid::linear(1.0, 1.0, 5);
        let values = periodogram_values(&[0.0, 1.0, 0.0, 2.0, 0.0], &[1, 1, 0, 1, 1]);
        assert_eq!(select_local_optima(&grid, &values, 3, 0.0), vec![3, 1]);
    }

    #[test]
    fn global_maximum_without_peaks() {
        let grid = FreqGrid::linear(1.0, 1.0, 5);
        let values = periodogram_values(&[1.0, 2.0, 3.0, 4.0, 5.0], &[1; 5]);
        assert_eq!(select_local_optima(&grid, &values, 3, 0.0), vec![4]);
        let empty = periodogram_values(&[0.0; 5], &[0; 5]);
        assert!(select_local_optima(&grid, &empty, 3, 0.0).is_empty());
    }
}
