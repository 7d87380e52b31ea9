//! Unit phasor iterators: $e^{i\phi} = \cos\phi + i \sin\phi$ over a sequence of angles

use crate::float_trait::Float;

use num_complex::Complex;

/// Iterator over phasors $e^{i\phi_k}$
pub enum PhasorIterator<'a, T> {
    Recurrent(RecurrentPhasor<T>),
    Values(ValuePhasorIterator<'a, T>),
}

impl<'a, T: Float> PhasorIterator<'a, T> {
    pub fn from_angles(iter: impl Iterator<Item = T> + 'a) -> Self {
        Self::Values(ValuePhasorIterator::new(iter))
    }

    pub fn from_linear_angles(first: T, step: T) -> Self {
        Self::Recurrent(RecurrentPhasor::new(first, step))
    }
}

impl<T> Iterator for PhasorIterator<'_, T>
where
    T: Float,
{
    type Item = Complex<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            PhasorIterator::Recurrent(iter) => iter.next(),
            PhasorIterator::Values(iter) => iter.next(),
        }
    }
}

/// Phasors of arbitrary angles, each one is evaluated directly
pub struct ValuePhasorIterator<'a, T> {
    angle_iter: Box<dyn Iterator<Item = T> + 'a>,
}

impl<'a, T> ValuePhasorIterator<'a, T> {
    pub fn new(angle_iter: impl Iterator<Item = T> + 'a) -> Self {
        Self {
            angle_iter: Box::new(angle_iter),
        }
    }
}

impl<T> Iterator for ValuePhasorIterator<'_, T>
where
    T: Float,
{
    type Item = Complex<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.angle_iter.next().map(|angle| {
            let (sin, cos) = angle.sin_cos();
            Complex::new(cos, sin)
        })
    }
}

/// Phasors of angles $\phi_k = \mathrm{first} + k \times \mathrm{step}$
///
/// Every next value is the previous one rotated by $e^{i\,\mathrm{step}}$, so no trigonometric
/// functions are evaluated after construction. Rounding error grows linearly with the number of
/// steps, so the iterator is meant for grid chunks rather than for arbitrary long sequences.
pub struct RecurrentPhasor<T> {
    increment: Complex<T>,
    current: Complex<T>,
}

impl<T: Float> RecurrentPhasor<T> {
    pub fn new(first: T, step: T) -> Self {
        Self {
            increment: Complex::from_polar(T::one(), step),
            current: Complex::from_polar(T::one(), first),
        }
    }
}

impl<T: Float> Iterator for RecurrentPhasor<T> {
    type Item = Complex<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let previous = self.current;
        self.current = previous * self.increment;
        Some(previous)
    }
}

impl<T> From<RecurrentPhasor<T>> for PhasorIterator<'static, T> {
    fn from(phasor: RecurrentPhasor<T>) -> Self {
        Self::Recurrent(phasor)
    }
}

impl<'a, T: Float> From<ValuePhasorIterator<'a, T>> for PhasorIterator<'a, T> {
    fn from(phasor: ValuePhasorIterator<'a, T>) -> Self {
        Self::Values(phasor)
    }
}
