mod data_sample;
pub use data_sample::DataSample;

mod multi_band_time_series;
pub use multi_band_time_series::MultiBandTimeSeries;

mod sorted_array;
pub use sorted_array::SortedArray;

mod time_series;
pub use time_series::TimeSeries;
