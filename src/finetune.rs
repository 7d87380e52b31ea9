use crate::error::InvalidRangeError;
use crate::float_trait::Float;
use crate::periodogram::{FreqGrid, FreqGridParams, FreqGridTrait, PeriodogramValues};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Frequency with its periodogram power
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(bound = "T: Float")]
#[schemars(bound = "T: Float")]
pub struct FrequencyCandidate<T> {
    pub freq: T,
    pub power: T,
}

impl<T: Float> FrequencyCandidate<T> {
    pub fn new(freq: T, power: T) -> Self {
        Self { freq, power }
    }
}

/// Sort candidates by descending power, equal powers are sorted by frequency
pub fn sort_candidates<T: Float>(candidates: &mut [FrequencyCandidate<T>]) {
    candidates.sort_by(|a, b| {
        b.power
            .partial_cmp(&a.power)
            .unwrap_or(Ordering::Equal)
            .then(a.freq.partial_cmp(&b.freq).unwrap_or(Ordering::Equal))
    });
}

/// Parameters of the local optima refinement
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(bound = "T: Float")]
#[schemars(bound = "T: Float")]
#[serde(default)]
pub struct FinetuneParams<T> {
    /// Number of local optima to refine
    pub n_local_optima: usize,
    /// Step of the fine frequency grid
    pub resolution: T,
}

impl<T: Float> FinetuneParams<T> {
    pub fn new(n_local_optima: usize, resolution: T) -> Self {
        Self {
            n_local_optima,
            resolution,
        }
    }

    pub fn default_n_local_optima() -> usize {
        3
    }

    pub fn default_resolution() -> T {
        T::ten().powi(-5)
    }
}

impl<T: Float> Default for FinetuneParams<T> {
    fn default() -> Self {
        Self::new(Self::default_n_local_optima(), Self::default_resolution())
    }
}

/// Local refinement of a coarse grid node
///
/// A node $\nu_i$ with the local grid step $\delta_i$ is refined on the linear grid from
/// $\max(\nu_i - \delta_i, \mathrm{resolution})$ to $\nu_i + \delta_i$ with the step
/// `resolution`. The node is replaced by the best fine node only if the fine power is strictly
/// larger, so refinement never decreases the power.
#[derive(Clone, Copy, Debug)]
pub struct Finetuner<T> {
    resolution: T,
}

impl<T: Float> Finetuner<T> {
    pub fn new(resolution: T) -> Result<Self, InvalidRangeError> {
        if !(resolution.is_finite() && resolution > T::zero()) {
            return Err(InvalidRangeError::NonPositiveResolution(
                resolution.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(Self { resolution })
    }

    pub fn resolution(&self) -> T {
        self.resolution
    }

    /// Fine grid around the `i`-th node, `None` if the coarse grid has a single node
    pub fn fine_grid<G>(&self, freq_grid: &G, i: usize) -> Option<FreqGrid<T>>
    where
        G: FreqGridTrait<T>,
    {
        let delta = freq_grid.local_step(i);
        if delta <= T::zero() {
            return None;
        }
        let freq = freq_grid.get(i);
        let fmin = T::max(freq - delta, self.resolution);
        let fmax = freq + delta;
        FreqGridParams::new(fmin, fmax, self.resolution).build().ok()
    }

    /// Refine the `i`-th node having `power`, `evaluate` gives the periodogram on a fine grid
    pub fn refine<G, F>(
        &self,
        freq_grid: &G,
        i: usize,
        power: T,
        evaluate: F,
    ) -> FrequencyCandidate<T>
    where
        G: FreqGridTrait<T>,
        F: FnOnce(&FreqGrid<T>) -> PeriodogramValues<T>,
    {
        let coarse = FrequencyCandidate::new(freq_grid.get(i), power);
        let Some(fine_grid) = self.fine_grid(freq_grid, i) else {
            return coarse;
        };
        let values = evaluate(&fine_grid);
        let best = (0..values.len())
            .filter(|&j| values.is_informative(j))
            .map(|j| FrequencyCandidate::new(fine_grid.get(j), values.power[j]))
            .reduce(|best, candidate| {
                if candidate.power > best.power {
                    candidate
                } else {
                    best
                }
            });
        match best {
            Some(best) if best.power > coarse.power => {
                log::debug!(
                    "Frequency {} refined to {}, power {} -> {}",
                    coarse.freq,
                    best.freq,
                    coarse.power,
                    best.power
                );
                best
            }
            _ => coarse,
        }
    }
}
