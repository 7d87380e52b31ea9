#![doc = include_str!("../README.md")]

mod data;
pub use data::{DataSample, MultiBandTimeSeries, SortedArray, TimeSeries};

mod error;
pub use error::{
    DataShapeError, InsufficientDataError, InvalidRangeError, PeriodogramError, SortedArrayError,
    UnknownHarmonicFitError,
};

mod finetune;
pub use finetune::{FinetuneParams, Finetuner, FrequencyCandidate};

mod float_trait;
pub use float_trait::Float;

pub mod multiband;
pub use multiband::{
    BandCombination, DumpPassband, MultiBandPeriodogram, PassbandTrait, PeriodogramConfig,
    PeriodogramParameters,
};

mod peak_indices;
#[doc(hidden)]
pub use peak_indices::{peak_indices, peak_indices_reverse_sorted};
pub use peak_indices::select_local_optima;

pub mod periodogram;
pub use periodogram::{
    AovTerms, FreqGrid, FreqGridParams, FreqGridTrait, HarmonicFit, HarmonicFitDirect,
    HarmonicFitMhaov, HarmonicFitTrait, Periodogram, PeriodogramValues,
};

mod types;

pub use ndarray;
