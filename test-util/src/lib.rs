pub use generator::SyntheticLightCurveGenerator;
pub use types::{LightCurve, MultiBandLightCurve};

mod generator;
mod types;
