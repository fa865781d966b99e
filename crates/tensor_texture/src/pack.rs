use crate::error::ShapeError;
use crate::geometry::TextureShape;
use crate::tensor::{Scalar, TensorView};

/// A tensor scattered into a flat RGBA channel buffer.
///
/// `pixels` is row-major over the texture grid. Cells that no feature value
/// landed in stay zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedPixels<P> {
    pub shape: TextureShape,
    pub num_dimensions: usize,
    pub pixels: Vec<P>,
}

impl<P: Copy + Default> PackedPixels<P> {
    /// Packs a validated matrix view, converting every value with `convert`.
    pub fn pack<T: Scalar>(
        tensor: &TensorView<'_, T>,
        convert: impl Fn(T) -> P,
    ) -> Result<Self, ShapeError> {
        let (num_points, num_dimensions) = tensor.matrix_dims()?;
        let shape = TextureShape::new(num_points, num_dimensions)?;

        let mut pixels = vec![P::default(); shape.buffer_len()];
        for p in 0..num_points {
            let offset = shape.point_offset(p);
            let dst = &mut pixels[offset..offset + num_dimensions];
            for (out, &value) in dst.iter_mut().zip(tensor.row(p, num_dimensions)) {
                *out = convert(value);
            }
        }

        Ok(Self {
            shape,
            num_dimensions,
            pixels,
        })
    }

    /// Feature values of `point` as stored in the buffer, without padding.
    /// `None` past the last packed point.
    pub fn point(&self, point: usize) -> Option<&[P]> {
        if point >= self.shape.num_points {
            return None;
        }

        let offset = self.shape.point_offset(point);
        self.pixels.get(offset..offset + self.num_dimensions)
    }
}

impl PackedPixels<f32> {
    pub fn pack_f32<T: Scalar>(tensor: &TensorView<'_, T>) -> Result<Self, ShapeError> {
        Self::pack(tensor, Scalar::to_f32)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

impl PackedPixels<u8> {
    pub fn pack_u8<T: Scalar>(tensor: &TensorView<'_, T>) -> Result<Self, ShapeError> {
        Self::pack(tensor, Scalar::to_u8)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CHANNELS;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32 + 1.0).collect()
    }

    #[test]
    fn one_point_per_pixel() {
        let data = ramp(16);
        let packed = PackedPixels::pack_f32(&TensorView::new(&[4, 4], &data)).unwrap();

        // 2x2 texture, one point per pixel, no padding at all
        assert_eq!(packed.pixels, data);
    }

    #[test]
    fn partial_last_pixel_is_zero_padded() {
        let data = ramp(60);
        let packed = PackedPixels::pack_f32(&TensorView::new(&[10, 6], &data)).unwrap();

        assert_eq!(packed.pixels.len(), 80);
        assert_eq!(&packed.pixels[0..8], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0, 0.0]);
        assert_eq!(&packed.pixels[8..16], &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 0.0, 0.0]);
        assert_eq!(packed.point(9), Some(&data[54..60]));
    }

    #[test]
    fn point_past_the_end_is_none() {
        let data = ramp(20);
        let packed = PackedPixels::pack_f32(&TensorView::new(&[5, 4], &data)).unwrap();

        assert_eq!(packed.point(4), Some(&data[16..20]));
        // padding slot in the last row
        assert_eq!(packed.point(5), None);
        assert_eq!(packed.point(usize::MAX), None);

        let empty = PackedPixels::pack_f32(&TensorView::<f32>::new(&[0, 3], &[])).unwrap();
        assert_eq!(empty.point(0), None);
    }

    #[test]
    fn single_value() {
        let packed = PackedPixels::pack_f32(&TensorView::new(&[1, 1], &[3.25f32])).unwrap();
        assert_eq!(packed.pixels, vec![3.25, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn trailing_row_slots_are_zero() {
        // 5 points of 4 dims: 2 points per row, 3 rows, last slot empty
        let data = ramp(20);
        let packed = PackedPixels::pack_f32(&TensorView::new(&[5, 4], &data)).unwrap();

        assert_eq!(packed.shape.capacity(), 6);
        assert_eq!(&packed.pixels[20..], &[0.0; 4]);
    }

    #[test]
    fn exact_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let p = rng.random_range(1..200);
            let d = rng.random_range(1..40);
            let data: Vec<f32> = (0..p * d).map(|_| rng.random::<f32>() * 2e6 - 1e6).collect();
            let packed = PackedPixels::pack_f32(&TensorView::new(&[p, d], &data)).unwrap();

            for point in 0..p {
                let offset = point * packed.shape.pixels_per_point * CHANNELS;
                for dim in 0..d {
                    assert_eq!(
                        packed.pixels[offset + dim].to_bits(),
                        data[point * d + dim].to_bits()
                    );
                }
                // padding channels of this point
                for pad in d..packed.shape.pixels_per_point * CHANNELS {
                    assert_eq!(packed.pixels[offset + pad], 0.0);
                }
            }

            // slots past the last point
            let used = packed.shape.point_offset(p);
            assert!(packed.pixels[used..].iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn f64_values_are_narrowed() {
        let data = [0.1f64, 1e40, -2.5];
        let packed = PackedPixels::pack_f32(&TensorView::new(&[1, 3], &data)).unwrap();
        assert_eq!(packed.point(0), Some(&[0.1f32, f32::INFINITY, -2.5][..]));
    }

    #[test]
    fn bytes_alias_float_buffer() {
        let packed = PackedPixels::pack_f32(&TensorView::new(&[1, 1], &[1.0f32])).unwrap();
        assert_eq!(packed.as_bytes().len(), 16);
        assert_eq!(&packed.as_bytes()[0..4], &1.0f32.to_ne_bytes());
    }

    #[test]
    fn u8_packing() {
        let data = [1u8, 2, 3, 4, 5];
        let packed = PackedPixels::pack_u8(&TensorView::new(&[1, 5], &data)).unwrap();
        assert_eq!(packed.as_bytes(), &[1, 2, 3, 4, 5, 0, 0, 0]);
    }

    #[test]
    fn rank_checked_before_packing() {
        let data = ramp(8);
        let err = PackedPixels::pack_f32(&TensorView::new(&[2, 2, 2], &data)).unwrap_err();
        assert_eq!(err, ShapeError::Rank(3));
    }
}
