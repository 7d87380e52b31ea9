use crate::multiband::PassbandTrait;

/// Input arrays given to [crate::MultiBandPeriodogram::set_data] are inconsistent
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DataShapeError {
    #[error("input arrays must have the same length, got t: {t}, m: {m}, err: {err}, bands: {bands}")]
    LengthMismatch {
        t: usize,
        m: usize,
        err: usize,
        bands: usize,
    },

    #[error("light curve must contain at least one observation")]
    Empty,

    #[error("{array} value {value} at index {index} is not finite")]
    NonFiniteValue {
        array: &'static str,
        index: usize,
        value: f64,
    },

    #[error("uncertainty {value} at index {index} must be positive and finite")]
    NonPositiveUncertainty { index: usize, value: f64 },
}

/// Frequency grid bounds or resolution are invalid
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InvalidRangeError {
    #[error("frequency bounds must be finite, got fmin: {fmin}, fmax: {fmax}")]
    NonFiniteBound { fmin: f64, fmax: f64 },

    #[error("fmax ({fmax}) must be larger than fmin ({fmin})")]
    NonIncreasingBounds { fmin: f64, fmax: f64 },

    #[error("frequency resolution must be positive and finite, got {0}")]
    NonPositiveResolution(f64),

    #[error("minimum frequency must not be negative, got {0}")]
    NegativeMinFreq(f64),

    #[error("minimum frequency must be positive for log-period spacing, got {0}")]
    NonPositiveMinFreqLogPeriod(f64),

    #[error("frequency grid would have {0} nodes, which is too many")]
    GridTooLarge(f64),
}

/// A passband cannot contribute to the periodogram at all
///
/// It is not fatal: the passband is dropped and the rest of the light curve is processed
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum InsufficientDataError {
    #[error("passband {passband} has {actual} observations, at least {minimum} are required")]
    ShortTimeSeries {
        passband: String,
        actual: usize,
        minimum: usize,
    },

    #[error("harmonic fit of passband {passband} is degenerate at every grid frequency")]
    AllFitsDegenerate { passband: String },
}

impl InsufficientDataError {
    pub fn short_time_series<P: PassbandTrait>(passband: &P, actual: usize, minimum: usize) -> Self {
        Self::ShortTimeSeries {
            passband: passband.name().into(),
            actual,
            minimum,
        }
    }

    pub fn all_fits_degenerate<P: PassbandTrait>(passband: &P) -> Self {
        Self::AllFitsDegenerate {
            passband: passband.name().into(),
        }
    }
}

/// Error returned from [crate::MultiBandPeriodogram] operations
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PeriodogramError {
    #[error(transparent)]
    DataShape(#[from] DataShapeError),

    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),

    #[error("no data: set_data() must be called first")]
    NoData,

    #[error("periodogram is not evaluated: frequency_grid_evaluation() must be called first")]
    NotEvaluated,

    #[error("no passband can be used for the periodogram: {0:?}")]
    NoUsablePassbands(Vec<InsufficientDataError>),

    #[error("number of local optima must be positive")]
    ZeroLocalOptima,

    #[error("number of harmonics must be positive")]
    ZeroHarmonics,

    #[error("{requested} harmonics requested, but the harmonic fit supports up to {maximum}")]
    TooManyHarmonics { requested: usize, maximum: usize },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown harmonic fit method {0:?}, expected \"MHAOV\" or \"Direct\"")]
pub struct UnknownHarmonicFitError(pub String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SortedArrayError {
    #[error("frequency array must be sorted in ascending order")]
    Unsorted,

    #[error("frequency array must be contiguous in memory")]
    NonContiguous,
}
