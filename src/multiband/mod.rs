//! Multiband periodogram

mod combination;
pub use combination::BandCombination;

mod multiband_periodogram;
pub use multiband_periodogram::{MultiBandPeriodogram, PeriodogramConfig, PeriodogramParameters};

mod passband;
pub use passband::*;
