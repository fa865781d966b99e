use serde::Serialize;

use crate::error::ShapeError;

/// Channels per texel. Every 4 consecutive feature values share one RGBA pixel.
pub const CHANNELS: usize = 4;

/// Layout of a packed point set inside a 2D RGBA texture.
///
/// A shader needs this together with the texture to turn a point index into
/// texel coordinates, see [`TextureShape::locate`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct TextureShape {
    pub num_points: usize,
    pub points_per_row: usize,
    pub num_rows: usize,
    pub pixels_per_point: usize,
}

/// Position of one feature value inside the texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TexelCoord {
    pub x: usize,
    pub y: usize,
    pub channel: usize,
}

impl TextureShape {
    /// Picks a near-square layout for `num_points` points of `num_dimensions`
    /// features each.
    ///
    /// Rows hold `floor(sqrt(total_pixels) / pixels_per_point)` points (at least
    /// one), and there are just enough rows to hold every point.
    pub fn new(num_points: usize, num_dimensions: usize) -> Result<Self, ShapeError> {
        if num_dimensions == 0 {
            return Err(ShapeError::ZeroDimensions);
        }

        let too_large = ShapeError::TooLarge {
            num_points,
            num_dimensions,
        };
        let pixels_per_point = num_dimensions.div_ceil(CHANNELS);
        let total_pixels = num_points.checked_mul(pixels_per_point).ok_or(too_large)?;

        let points_per_row =
            (((total_pixels as f64).sqrt() / pixels_per_point as f64).floor() as usize).max(1);
        let num_rows = num_points.div_ceil(points_per_row);

        // the flat channel buffer must be addressable
        points_per_row
            .checked_mul(num_rows)
            .and_then(|n| n.checked_mul(pixels_per_point))
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or(too_large)?;

        Ok(Self {
            num_points,
            points_per_row,
            num_rows,
            pixels_per_point,
        })
    }

    /// Texture width in pixels.
    pub fn width(&self) -> usize {
        self.points_per_row * self.pixels_per_point
    }

    /// Texture height in pixels.
    pub fn height(&self) -> usize {
        self.num_rows
    }

    pub fn texel_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Length of the flat channel buffer backing the texture.
    pub fn buffer_len(&self) -> usize {
        self.texel_count() * CHANNELS
    }

    /// Number of points the grid can hold, including the padding slots of the
    /// last row.
    pub fn capacity(&self) -> usize {
        self.points_per_row * self.num_rows
    }

    /// Offset of a point's first channel in the flat buffer.
    #[inline]
    pub fn point_offset(&self, point: usize) -> usize {
        point * self.pixels_per_point * CHANNELS
    }

    /// Texel and channel holding feature `dim` of `point`.
    pub fn locate(&self, point: usize, dim: usize) -> TexelCoord {
        let texel = point * self.pixels_per_point + dim / CHANNELS;
        let width = self.width();

        TexelCoord {
            x: texel % width,
            y: texel / width,
            channel: dim % CHANNELS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn four_by_four() {
        let shape = TextureShape::new(4, 4).unwrap();
        assert_eq!(
            shape,
            TextureShape {
                num_points: 4,
                points_per_row: 2,
                num_rows: 2,
                pixels_per_point: 1,
            }
        );
        assert_eq!((shape.width(), shape.height()), (2, 2));
    }

    #[test]
    fn ten_points_six_dims() {
        let shape = TextureShape::new(10, 6).unwrap();
        assert_eq!(
            shape,
            TextureShape {
                num_points: 10,
                points_per_row: 2,
                num_rows: 5,
                pixels_per_point: 2,
            }
        );
        assert_eq!((shape.width(), shape.height()), (4, 5));
        assert_eq!(shape.buffer_len(), 80);
    }

    #[test]
    fn single_value() {
        let shape = TextureShape::new(1, 1).unwrap();
        assert_eq!((shape.points_per_row, shape.num_rows), (1, 1));
        assert_eq!((shape.width(), shape.height()), (1, 1));
    }

    #[test]
    fn pixels_per_point_rounds_up() {
        for d in 1..=4 {
            assert_eq!(TextureShape::new(3, d).unwrap().pixels_per_point, 1);
        }
        assert_eq!(TextureShape::new(3, 5).unwrap().pixels_per_point, 2);
        assert_eq!(TextureShape::new(3, 8).unwrap().pixels_per_point, 2);
        assert_eq!(TextureShape::new(3, 9).unwrap().pixels_per_point, 3);
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(TextureShape::new(5, 0), Err(ShapeError::ZeroDimensions));
        assert_eq!(TextureShape::new(0, 0), Err(ShapeError::ZeroDimensions));
    }

    #[test]
    fn unaddressable_layout_rejected() {
        assert_eq!(
            TextureShape::new(usize::MAX, 8),
            Err(ShapeError::TooLarge {
                num_points: usize::MAX,
                num_dimensions: 8
            })
        );
    }

    #[test]
    fn empty_point_set() {
        let shape = TextureShape::new(0, 3).unwrap();
        assert_eq!(shape.points_per_row, 1);
        assert_eq!(shape.num_rows, 0);
        assert_eq!(shape.buffer_len(), 0);
    }

    #[test]
    fn grid_covers_every_point() {
        let mut rng = StdRng::seed_from_u64(0x7e57);
        for _ in 0..2000 {
            let p = rng.random_range(1..50_000);
            let d = rng.random_range(1..300);
            let shape = TextureShape::new(p, d).unwrap();

            assert!(shape.points_per_row >= 1);
            assert!(shape.points_per_row <= p);
            assert!(shape.capacity() >= p, "{p}x{d} -> {shape:?}");
            // no fully empty trailing row
            assert!(shape.points_per_row * (shape.num_rows - 1) < p);
            assert_eq!(shape.pixels_per_point, d.div_ceil(4));
        }
    }

    #[test]
    fn locate_matches_flat_offset() {
        let shape = TextureShape::new(10, 6).unwrap();
        let width = shape.width();
        for p in 0..10 {
            for d in 0..6 {
                let c = shape.locate(p, d);
                let flat = (c.y * width + c.x) * CHANNELS + c.channel;
                assert_eq!(flat, shape.point_offset(p) + d);
            }
        }

        assert_eq!(
            shape.locate(3, 5),
            TexelCoord {
                x: 3,
                y: 1,
                channel: 1
            }
        );
    }
}
