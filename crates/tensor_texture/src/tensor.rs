use crate::error::ShapeError;

/// A scalar that can be stored in a packed texture channel.
pub trait Scalar: Copy {
    /// Value stored in a 32-bit float channel.
    fn to_f32(self) -> f32;

    /// Value stored in an 8-bit unorm channel, saturating.
    fn to_u8(self) -> u8;
}

impl Scalar for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn to_u8(self) -> u8 {
        // `as` saturates and maps NaN to 0
        self as u8
    }
}

impl Scalar for f64 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_u8(self) -> u8 {
        self as u8
    }
}

impl Scalar for half::f16 {
    #[inline]
    fn to_f32(self) -> f32 {
        half::f16::to_f32(self)
    }

    #[inline]
    fn to_u8(self) -> u8 {
        half::f16::to_f32(self) as u8
    }
}

impl Scalar for u8 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_u8(self) -> u8 {
        self
    }
}

/// Borrowed row-major tensor of any rank.
///
/// Rank is only checked when the view is packed, so callers can hand over
/// whatever their tensor source produced and get a [`ShapeError`] back.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a, T> {
    shape: &'a [usize],
    data: &'a [T],
}

impl<'a, T: Scalar> TensorView<'a, T> {
    pub fn new(shape: &'a [usize], data: &'a [T]) -> Self {
        Self { shape, data }
    }

    pub fn shape(&self) -> &'a [usize] {
        self.shape
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Validates this view as a points x features matrix.
    ///
    /// Returns `(num_points, num_dimensions)`.
    pub fn matrix_dims(&self) -> Result<(usize, usize), ShapeError> {
        let &[num_points, num_dimensions] = self.shape else {
            return Err(ShapeError::Rank(self.shape.len()));
        };

        if num_dimensions == 0 {
            return Err(ShapeError::ZeroDimensions);
        }

        let expected = num_points
            .checked_mul(num_dimensions)
            .ok_or(ShapeError::TooLarge {
                num_points,
                num_dimensions,
            })?;
        if self.data.len() != expected {
            return Err(ShapeError::DataLength {
                expected,
                actual: self.data.len(),
            });
        }

        Ok((num_points, num_dimensions))
    }

    /// Feature values of a single point. Assumes a validated matrix view.
    pub fn row(&self, point: usize, num_dimensions: usize) -> &'a [T] {
        let start = point * num_dimensions;
        &self.data[start..start + num_dimensions]
    }
}
