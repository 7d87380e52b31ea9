use conv::prelude::*;
use ndarray::NdFloat;
use num_traits::FloatConst;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Display, LowerExp};
use std::iter::Sum;

/// Floating number trait, it is implemented for [f32] and [f64] only
///
/// Sums over observations are accumulated in `Self`, so [f64] is the recommended choice for
/// long light curves and fine frequency grids
pub trait Float:
    'static
    + Sized
    + NdFloat
    + FloatConst
    + Sum
    + Debug
    + Display
    + LowerExp
    + ApproxFrom<usize>
    + ApproxInto<usize, RoundToNearest>
    + JsonSchema
    + Serialize
    + DeserializeOwned
{
    fn half() -> Self;
    fn two() -> Self;
    fn four() -> Self;
    fn ten() -> Self;

    /// Full turn in radians, $2\pi$
    fn two_pi() -> Self {
        Self::two() * Self::PI()
    }
}

impl Float for f32 {
    #[inline]
    fn half() -> Self {
        0.5
    }

    #[inline]
    fn two() -> Self {
        2.0
    }

    #[inline]
    fn four() -> Self {
        4.0
    }

    #[inline]
    fn ten() -> Self {
        10.0
    }
}

impl Float for f64 {
    #[inline]
    fn half() -> Self {
        0.5
    }

    #[inline]
    fn two() -> Self {
        2.0
    }

    #[inline]
    fn four() -> Self {
        4.0
    }

    #[inline]
    fn ten() -> Self {
        10.0
    }
}
