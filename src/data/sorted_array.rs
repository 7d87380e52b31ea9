use crate::error::SortedArrayError;
use crate::float_trait::Float;

use ndarray::{Array1, ArrayView1};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::Deref;

// Underlying array is guaranteed to be sorted and contiguous
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SortedArray<T>(pub Array1<T>);

impl<T> SortedArray<T>
where
    T: Float,
{
    pub fn from_sorted(sorted_array: impl Into<Array1<T>>) -> Result<Self, SortedArrayError> {
        let sorted_array = sorted_array.into();
        if sorted_array
            .as_slice()
            .ok_or(SortedArrayError::NonContiguous)?
            .is_sorted()
        {
            Ok(Self(sorted_array))
        } else {
            Err(SortedArrayError::Unsorted)
        }
    }

    pub fn maximum(&self) -> T {
        self[self.len() - 1]
    }

    pub fn minimum(&self) -> T {
        self[0]
    }
}

impl<T> From<Vec<T>> for SortedArray<T>
where
    T: Float,
{
    fn from(mut v: Vec<T>) -> Self {
        v[..].sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());
        Self(Array1::from_vec(v))
    }
}

impl<T> From<&[T]> for SortedArray<T>
where
    T: Float,
{
    fn from(s: &[T]) -> Self {
        s.to_vec().into()
    }
}

impl<T> From<ArrayView1<'_, T>> for SortedArray<T>
where
    T: Float,
{
    fn from(v: ArrayView1<'_, T>) -> Self {
        v.to_vec().into()
    }
}

impl<T> Deref for SortedArray<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.0
            .as_slice()
            .expect("SortedArray is always contiguous")
    }
}

impl<T> AsRef<[T]> for SortedArray<T> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T> JsonSchema for SortedArray<T>
where
    T: JsonSchema,
{
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("SortedArray")
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <[T] as JsonSchema>::json_schema(generator)
    }
}
