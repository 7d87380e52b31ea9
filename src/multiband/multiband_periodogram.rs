use crate::data::MultiBandTimeSeries;
use crate::error::{DataShapeError, InsufficientDataError, PeriodogramError};
use crate::finetune::{FinetuneParams, Finetuner, FrequencyCandidate, sort_candidates};
use crate::float_trait::Float;
use crate::multiband::{BandCombination, DumpPassband, PassbandTrait};
use crate::peak_indices::select_local_optima;
use crate::periodogram::{
    FreqGrid, FreqGridParams, FreqGridTrait, HarmonicFit, Periodogram,
    PeriodogramValues, min_observations,
};

use macro_const::macro_const;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

macro_const! {
    const MIN_SEPARATION_DOC: &str = r"Minimum frequency distance between selected local optima

Peaks closer than this to an already selected higher peak are skipped. If not set, the inverse
time span of the whole light curve is used, which is the typical width of a periodogram peak.
";
}

/// Parameters of [MultiBandPeriodogram]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(bound = "T: Float")]
#[schemars(bound = "T: Float")]
#[serde(default)]
pub struct PeriodogramParameters<T> {
    /// Harmonic fit algorithm
    pub method: HarmonicFit,
    /// Number of harmonics of the fitted Fourier series
    pub n_harmonics: usize,
    /// Combination of passband statistics
    pub combination: BandCombination,
    /// Number of local optima selected after the grid evaluation
    pub n_local_optima: usize,
    /// Minimum frequency distance between selected local optima, the inverse time span of the
    /// light curve if not set
    pub min_separation: Option<T>,
}

impl<T: Float> PeriodogramParameters<T> {
    pub fn default_n_harmonics() -> usize {
        1
    }

    pub fn default_n_local_optima() -> usize {
        3
    }
}

impl<T: Float> Default for PeriodogramParameters<T> {
    fn default() -> Self {
        Self {
            method: HarmonicFit::default(),
            n_harmonics: Self::default_n_harmonics(),
            combination: BandCombination::default(),
            n_local_optima: Self::default_n_local_optima(),
            min_separation: None,
        }
    }
}

/// Complete configuration of a periodogram run: evaluation on a frequency grid followed by an
/// optional refinement of the best local optima
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(bound = "T: Float")]
#[schemars(bound = "T: Float")]
#[serde(default)]
pub struct PeriodogramConfig<T> {
    pub periodogram: PeriodogramParameters<T>,
    pub grid: FreqGridParams<T>,
    pub finetune: Option<FinetuneParams<T>>,
}

impl<T: Float> Default for PeriodogramConfig<T> {
    fn default() -> Self {
        Self {
            periodogram: PeriodogramParameters::default(),
            grid: FreqGridParams::default(),
            finetune: None,
        }
    }
}

#[derive(Clone, Debug)]
struct Evaluation<P, T>
where
    P: PassbandTrait,
    T: Float,
{
    freq_grid: FreqGrid<T>,
    per_single_band: BTreeMap<P, PeriodogramValues<T>>,
    per: PeriodogramValues<T>,
    dropped_passbands: Vec<InsufficientDataError>,
    candidates: Vec<FrequencyCandidate<T>>,
}

/// Multiband multiharmonic analysis of variance periodogram
///
/// Every passband is fitted by a weighted truncated Fourier series at every frequency of the
/// grid, the analysis of variance statistics of the passbands are combined into a single
/// multiband statistic. The best local optima of the combined periodogram can be refined on
/// a finer local grid.
///
/// Typical usage is [set_data](Self::set_data), then
/// [frequency_grid_evaluation](Self::frequency_grid_evaluation), then optionally
/// [finetune_best_frequencies](Self::finetune_best_frequencies), and finally
/// [get_best_frequencies](Self::get_best_frequencies).
///
/// Passbands with too few observations for the harmonic fit, or with undefined fits at every
/// grid frequency, are skipped and reported by [dropped_passbands](Self::dropped_passbands).
#[derive(Clone, Debug)]
pub struct MultiBandPeriodogram<P, T>
where
    P: PassbandTrait,
    T: Float,
{
    parameters: PeriodogramParameters<T>,
    data: Option<MultiBandTimeSeries<'static, P, T>>,
    baseline: T,
    evaluation: Option<Evaluation<P, T>>,
}

impl<P, T> MultiBandPeriodogram<P, T>
where
    P: PassbandTrait,
    T: Float,
{
    pub fn new(method: HarmonicFit, n_harmonics: usize) -> Self {
        Self::from_parameters(PeriodogramParameters {
            method,
            n_harmonics,
            ..Default::default()
        })
    }

    pub fn from_parameters(parameters: PeriodogramParameters<T>) -> Self {
        Self {
            parameters,
            data: None,
            baseline: T::zero(),
            evaluation: None,
        }
    }

    pub fn parameters(&self) -> &PeriodogramParameters<T> {
        &self.parameters
    }

    pub fn set_method(&mut self, method: HarmonicFit) -> &mut Self {
        self.parameters.method = method;
        self
    }

    pub fn set_n_harmonics(&mut self, n_harmonics: usize) -> &mut Self {
        self.parameters.n_harmonics = n_harmonics;
        self
    }

    pub fn set_combination(&mut self, combination: BandCombination) -> &mut Self {
        self.parameters.combination = combination;
        self
    }

    pub fn set_n_local_optima(&mut self, n_local_optima: usize) -> &mut Self {
        self.parameters.n_local_optima = n_local_optima;
        self
    }

    #[doc = MIN_SEPARATION_DOC!()]
    pub fn set_min_separation(&mut self, min_separation: T) -> &mut Self {
        self.parameters.min_separation = Some(min_separation);
        self
    }

    #[doc = MIN_SEPARATION_DOC!()]
    pub fn min_separation(&self) -> T {
        match self.parameters.min_separation {
            Some(min_separation) => min_separation,
            None if self.baseline > T::zero() => self.baseline.recip(),
            None => T::zero(),
        }
    }

    /// Set the light curve, previous results are discarded
    ///
    /// `err` are observation uncertainties, every observation is weighted by `err^-2`.
    pub fn set_data(
        &mut self,
        t: &[T],
        m: &[T],
        err: &[T],
        passbands: &[P],
    ) -> Result<(), DataShapeError> {
        self.data = None;
        self.evaluation = None;
        let mut data = MultiBandTimeSeries::from_flat(t, m, err, passbands)?;
        self.baseline = data.duration();
        log::debug!(
            "Light curve of {} observations in {} passband(s), time span {}",
            data.total_lenu(),
            data.len(),
            self.baseline,
        );
        self.data = Some(data);
        Ok(())
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluation.is_some()
    }

    fn check_harmonics(&self) -> Result<(), PeriodogramError> {
        let requested = self.parameters.n_harmonics;
        if requested == 0 {
            return Err(PeriodogramError::ZeroHarmonics);
        }
        match self.parameters.method.max_harmonics() {
            Some(maximum) if requested > maximum => Err(PeriodogramError::TooManyHarmonics {
                requested,
                maximum,
            }),
            _ => Ok(()),
        }
    }

    /// Evaluate the periodogram on a frequency grid and select the best local optima
    ///
    /// The grid spans from `fmin` to `fmax`, it is uniform in frequency with the step
    /// `resolution`, or uniform in logarithm of period if `log_period_spacing` is `true`,
    /// see [FreqGridParams] for details. Previous results are overwritten.
    pub fn frequency_grid_evaluation(
        &mut self,
        fmin: T,
        fmax: T,
        resolution: T,
        log_period_spacing: bool,
    ) -> Result<(), PeriodogramError> {
        self.frequency_grid_evaluation_with(&FreqGridParams {
            fmin,
            fmax,
            resolution,
            log_period_spacing,
        })
    }

    pub fn frequency_grid_evaluation_with(
        &mut self,
        grid_params: &FreqGridParams<T>,
    ) -> Result<(), PeriodogramError> {
        self.evaluation = None;
        self.check_harmonics()?;
        let min_separation = self.min_separation();
        let PeriodogramParameters {
            method,
            n_harmonics,
            combination,
            n_local_optima,
            ..
        } = self.parameters;
        let data = self.data.as_mut().ok_or(PeriodogramError::NoData)?;
        let freq_grid = grid_params.build()?;

        let periodogram = Periodogram::new(method, Cow::Borrowed(&freq_grid), n_harmonics);
        let minimum = min_observations(n_harmonics);
        let mut dropped_passbands = vec![];
        let mut passbands = vec![];
        let mut per_band_terms = vec![];
        for (passband, ts) in data.mapping_mut().iter_mut() {
            if ts.lenu() < minimum {
                let error = InsufficientDataError::short_time_series(passband, ts.lenu(), minimum);
                log::warn!("{error}, passband is skipped");
                dropped_passbands.push(error);
                continue;
            }
            let terms = periodogram.aov_terms(ts);
            let n_undefined = terms.iter().filter(|terms| terms.is_none()).count();
            if n_undefined == terms.len() {
                let error = InsufficientDataError::all_fits_degenerate(passband);
                log::warn!("{error}, passband is skipped");
                dropped_passbands.push(error);
                continue;
            }
            if n_undefined > 0 {
                log::debug!(
                    "Harmonic fit of passband {:?} is degenerate at {} of {} frequencies",
                    passband.name(),
                    n_undefined,
                    terms.len(),
                );
            }
            passbands.push(passband.clone());
            per_band_terms.push(terms);
        }
        if per_band_terms.is_empty() {
            return Err(PeriodogramError::NoUsablePassbands(dropped_passbands));
        }

        let per = combination.combine_bands(&per_band_terms);
        let per_single_band = passbands
            .into_iter()
            .zip(per_band_terms.iter())
            .map(|(passband, terms)| (passband, PeriodogramValues::from_terms(terms)))
            .collect();
        let candidates = select_local_optima(&freq_grid, &per, n_local_optima, min_separation)
            .into_iter()
            .map(|i| FrequencyCandidate::new(freq_grid.get(i), per.power[i]))
            .collect::<Vec<_>>();
        log::debug!(
            "Periodogram evaluated at {} frequencies, {} local optima selected",
            freq_grid.size(),
            candidates.len(),
        );
        self.evaluation = Some(Evaluation {
            freq_grid,
            per_single_band,
            per,
            dropped_passbands,
            candidates,
        });
        Ok(())
    }

    /// Select `n_local_optima` best local optima of the evaluated periodogram and refine them on
    /// local linear grids with the step `resolution`
    ///
    /// Optima are always selected from the grid periodogram, so repeated calls give the same
    /// result. Refined candidates are sorted by descending power.
    pub fn finetune_best_frequencies(
        &mut self,
        n_local_optima: usize,
        resolution: T,
    ) -> Result<(), PeriodogramError> {
        if n_local_optima == 0 {
            return Err(PeriodogramError::ZeroLocalOptima);
        }
        let finetuner = Finetuner::new(resolution)?;
        let min_separation = self.min_separation();
        let PeriodogramParameters {
            method,
            n_harmonics,
            combination,
            ..
        } = self.parameters;
        let evaluation = self
            .evaluation
            .as_mut()
            .ok_or(PeriodogramError::NotEvaluated)?;
        let data = self.data.as_mut().ok_or(PeriodogramError::NoData)?;

        let optima = select_local_optima(
            &evaluation.freq_grid,
            &evaluation.per,
            n_local_optima,
            min_separation,
        );
        if optima.len() < n_local_optima {
            log::warn!(
                "{} local optima requested, but only {} found",
                n_local_optima,
                optima.len()
            );
        }
        let mut candidates: Vec<_> = optima
            .into_iter()
            .map(|i| {
                finetuner.refine(
                    &evaluation.freq_grid,
                    i,
                    evaluation.per.power[i],
                    |fine_grid| {
                        let periodogram =
                            Periodogram::new(method, Cow::Borrowed(fine_grid), n_harmonics);
                        let per_band_terms: Vec<_> = data
                            .mapping_mut()
                            .iter_mut()
                            .filter(|(passband, _)| {
                                evaluation.per_single_band.contains_key(*passband)
                            })
                            .map(|(_, ts)| periodogram.aov_terms(ts))
                            .collect();
                        combination.combine_bands(&per_band_terms)
                    },
                )
            })
            .collect();
        sort_candidates(&mut candidates);
        evaluation.candidates = candidates;
        Ok(())
    }

    /// Run grid evaluation and optional finetuning with the given configuration
    ///
    /// The periodogram parameters are replaced by the configuration ones
    pub fn evaluate(&mut self, config: &PeriodogramConfig<T>) -> Result<(), PeriodogramError> {
        self.parameters = config.periodogram;
        self.frequency_grid_evaluation_with(&config.grid)?;
        if let Some(finetune) = config.finetune {
            self.finetune_best_frequencies(finetune.n_local_optima, finetune.resolution)?;
        }
        Ok(())
    }

    /// Best frequencies and their periodogram values in descending value order
    ///
    /// These are refined candidates if [finetune_best_frequencies](Self::finetune_best_frequencies)
    /// was called, or grid local optima otherwise. Both vectors are empty if the periodogram is
    /// not evaluated.
    pub fn get_best_frequencies(&self) -> (Vec<T>, Vec<T>) {
        self.best_candidates()
            .iter()
            .map(|candidate| (candidate.freq, candidate.power))
            .unzip()
    }

    pub fn best_candidates(&self) -> &[FrequencyCandidate<T>] {
        match &self.evaluation {
            Some(evaluation) => &evaluation.candidates,
            None => &[],
        }
    }

    /// Frequency grid of the last evaluation
    pub fn freq(&self) -> Option<&FreqGrid<T>> {
        self.evaluation.as_ref().map(|e| &e.freq_grid)
    }

    /// Combined periodogram of the last evaluation
    pub fn per(&self) -> Option<&PeriodogramValues<T>> {
        self.evaluation.as_ref().map(|e| &e.per)
    }

    /// Single-passband periodograms of the last evaluation, dropped passbands are not included
    pub fn per_single_band(&self) -> Option<&BTreeMap<P, PeriodogramValues<T>>> {
        self.evaluation.as_ref().map(|e| &e.per_single_band)
    }

    /// Passbands skipped by the last evaluation
    pub fn dropped_passbands(&self) -> &[InsufficientDataError] {
        match &self.evaluation {
            Some(evaluation) => &evaluation.dropped_passbands,
            None => &[],
        }
    }

    /// Light curve split into passbands
    pub fn data(&self) -> Option<&MultiBandTimeSeries<'static, P, T>> {
        self.data.as_ref()
    }
}

impl<T: Float> MultiBandPeriodogram<DumpPassband, T> {
    /// Set single-passband light curve
    pub fn set_single_band_data(&mut self, t: &[T], m: &[T], err: &[T]) -> Result<(), DataShapeError> {
        let passbands = vec![DumpPassband {}; t.len()];
        self.set_data(t, m, err, &passbands)
    }
}

impl<P, T> Default for MultiBandPeriodogram<P, T>
where
    P: PassbandTrait,
    T: Float,
{
    fn default() -> Self {
        Self::from_parameters(PeriodogramParameters::default())
    }
}
