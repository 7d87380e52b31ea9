//! Single-passband periodogram: harmonic fits over a frequency grid

use crate::data::TimeSeries;
use crate::error::UnknownHarmonicFitError;
use crate::float_trait::Float;

use ndarray::Array1;
use num_complex::Complex;
use num_traits::Zero;
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;

mod fit_direct;
pub use fit_direct::{HarmonicFitDirect, MAX_HARMONICS};

mod fit_mhaov;
pub use fit_mhaov::HarmonicFitMhaov;

mod fit_trait;
pub use fit_trait::{AovTerms, FitInput, FitWorkspace, HarmonicFitTrait, min_observations};
pub(crate) use fit_trait::aov_statistic;

mod freq;
pub use freq::{FreqGrid, FreqGridParams, FreqGridTrait, LinearFreqGrid, LogPeriodFreqGrid};

pub mod phasor;

/// Number of frequencies processed by a single parallel task
const CHUNK_SIZE: usize = 1 << 12;

/// Harmonic fit algorithm
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HarmonicFit {
    /// [HarmonicFitMhaov]
    #[default]
    #[serde(rename = "MHAOV")]
    Mhaov,
    /// [HarmonicFitDirect]
    Direct,
}

impl HarmonicFit {
    /// Maximum supported number of harmonics, if limited
    pub fn max_harmonics(&self) -> Option<usize> {
        match self {
            Self::Mhaov => None,
            Self::Direct => Some(MAX_HARMONICS),
        }
    }
}

impl HarmonicFitTrait for HarmonicFit {
    fn aov_terms<T: Float>(
        &self,
        input: &FitInput<T>,
        z: &[Complex<T>],
        n_harmonics: usize,
        workspace: &mut FitWorkspace<T>,
    ) -> Option<AovTerms<T>> {
        match self {
            Self::Mhaov => HarmonicFitMhaov.aov_terms(input, z, n_harmonics, workspace),
            Self::Direct => HarmonicFitDirect.aov_terms(input, z, n_harmonics, workspace),
        }
    }
}

impl From<HarmonicFitMhaov> for HarmonicFit {
    fn from(_: HarmonicFitMhaov) -> Self {
        Self::Mhaov
    }
}

impl From<HarmonicFitDirect> for HarmonicFit {
    fn from(_: HarmonicFitDirect) -> Self {
        Self::Direct
    }
}

impl FromStr for HarmonicFit {
    type Err = UnknownHarmonicFitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("mhaov") {
            Ok(Self::Mhaov)
        } else if s.eq_ignore_ascii_case("direct") {
            Ok(Self::Direct)
        } else {
            Err(UnknownHarmonicFitError(s.to_owned()))
        }
    }
}

/// Periodogram values on a frequency grid
///
/// `n_bands[i]` is the number of passbands contributed to `power[i]`. A point where no passband
/// gives a defined fit has zero power and zero `n_bands`, which distinguishes it from a point
/// with a valid low power.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(bound = "T: Float")]
pub struct PeriodogramValues<T> {
    pub power: Array1<T>,
    pub n_bands: Array1<usize>,
}

impl<T: Float> PeriodogramValues<T> {
    /// Single-passband values
    pub fn from_terms(terms: &[Option<AovTerms<T>>]) -> Self {
        let (power, n_bands): (Vec<_>, Vec<_>) = terms
            .iter()
            .map(|terms| match terms {
                Some(terms) => (terms.statistic(), 1),
                None => (T::zero(), 0),
            })
            .unzip();
        Self {
            power: power.into(),
            n_bands: n_bands.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    pub fn is_informative(&self, i: usize) -> bool {
        self.n_bands[i] > 0
    }

    /// Number of points with defined power
    pub fn n_informative(&self) -> usize {
        self.n_bands.iter().filter(|&&n| n > 0).count()
    }
}

/// Harmonic-fit periodogram of a single passband
///
/// The statistic at frequency $\nu$ is the analysis of variance ratio of the weighted
/// `n_harmonics`-harmonic fit with phases $2\pi\nu t$. Frequencies are processed in parallel
/// contiguous chunks, the result doesn't depend on the number of threads.
#[derive(Clone, Debug)]
pub struct Periodogram<'a, T>
where
    T: Float,
{
    freq_grid: Cow<'a, FreqGrid<T>>,
    fit: HarmonicFit,
    n_harmonics: usize,
}

impl<'a, T> Periodogram<'a, T>
where
    T: Float,
{
    pub fn new(fit: HarmonicFit, freq_grid: Cow<'a, FreqGrid<T>>, n_harmonics: usize) -> Self {
        assert!(n_harmonics > 0, "number of harmonics must be positive");
        if let Some(max) = fit.max_harmonics() {
            assert!(
                n_harmonics <= max,
                "{fit:?} harmonic fit supports up to {max} harmonics"
            );
        }
        Self {
            freq_grid,
            fit,
            n_harmonics,
        }
    }

    pub fn freq_grid(&self) -> &FreqGrid<T> {
        &self.freq_grid
    }

    pub fn freq(&self, i: usize) -> T {
        self.freq_grid.get(i)
    }

    pub fn n_harmonics(&self) -> usize {
        self.n_harmonics
    }

    /// Fit terms for every grid frequency, `None` marks undefined fits
    pub fn aov_terms(&self, ts: &mut TimeSeries<T>) -> Vec<Option<AovTerms<T>>> {
        let input = FitInput::new(ts);
        let size = self.freq_grid.size();
        if input.len() < min_observations(self.n_harmonics) {
            return vec![None; size];
        }
        let chunks: Vec<_> = (0..size.div_ceil(CHUNK_SIZE))
            .into_par_iter()
            .map(|i_chunk| {
                let first = i_chunk * CHUNK_SIZE;
                let last = usize::min(first + CHUNK_SIZE, size);
                self.chunk_aov_terms(&input, first, last)
            })
            .collect();
        chunks.into_iter().flatten().collect()
    }

    fn chunk_aov_terms(
        &self,
        input: &FitInput<T>,
        first: usize,
        last: usize,
    ) -> Vec<Option<AovTerms<T>>> {
        let mut phasors: Vec<_> = input
            .t
            .iter()
            .map(|&t| self.freq_grid.iter_phasor_mul(first, T::two_pi() * t))
            .collect();
        let mut z = vec![Complex::zero(); input.len()];
        let mut workspace = FitWorkspace::new(input.len());
        (first..last)
            .map(|_| {
                for (z, phasor) in z.iter_mut().zip(phasors.iter_mut()) {
                    *z = phasor
                        .next()
                        .expect("phasor iterator must cover the frequency grid");
                }
                self.fit.aov_terms(input, &z, self.n_harmonics, &mut workspace)
            })
            .collect()
    }

    pub fn power(&self, ts: &mut TimeSeries<T>) -> PeriodogramValues<T> {
        PeriodogramValues::from_terms(&self.aov_terms(ts))
    }
}
