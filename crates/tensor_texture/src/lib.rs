//! Packs point/feature matrices into RGBA textures so shader passes can fetch
//! any point's features with texel lookups.
//!
//! ```rust,no_run
//! use tensor_texture::{ContextConfig, GpuContext, TensorView, tensor_to_data_texture};
//!
//! # fn main() -> tensor_texture::Result<()> {
//! let gpu = pollster::block_on(GpuContext::headless(&ContextConfig::default()))?;
//! let points = [0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0];
//! let data = tensor_to_data_texture(&gpu, &TensorView::new(&[3, 2], &points))?;
//! assert_eq!(data.shape.pixels_per_point, 1);
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod error;
mod format;
mod geometry;
mod pack;
mod tensor;
mod texture;

pub use config::{BackendKind, ContextConfig, PowerPreference};
pub use context::{ComputeBackend, GpuContext, GpuTexture};
pub use error::{Error, Result, ShapeError};
pub use format::{ByteFormats, FloatFormats, FormatSelector, PixelLayout, ScalarType};
pub use geometry::{CHANNELS, TexelCoord, TextureShape};
pub use pack::PackedPixels;
pub use tensor::{Scalar, TensorView};
pub use texture::{
    FilterMode, TextureAllocator, TextureRequest, WrapMode, data_texture_layout_entry,
    validate_texture_size,
};

use tracing::debug;

/// A packed texture together with the layout needed to address it.
#[derive(Debug)]
pub struct DataTexture<H> {
    pub shape: TextureShape,
    pub texture: H,
}

type HandleOf<B> = <<B as ComputeBackend>::Allocator as TextureAllocator>::Handle;

/// Packs a points x features matrix into a 4-channel 32-bit float texture.
///
/// The texture uses nearest filtering and clamp-to-edge wrapping so values
/// read back in a shader are exactly the stored floats.
pub fn tensor_to_data_texture<B, T>(
    backend: &B,
    tensor: &TensorView<'_, T>,
) -> Result<DataTexture<HandleOf<B>>>
where
    B: ComputeBackend,
    T: Scalar,
{
    tensor.matrix_dims()?;
    let allocator = backend.active_context()?;

    let packed = PackedPixels::pack_f32(tensor)?;
    upload(
        allocator,
        "tensor_data_texture",
        packed.shape,
        ScalarType::F32,
        packed.as_bytes(),
    )
}

/// Like [`tensor_to_data_texture`] but stores each value as an 8-bit unorm
/// channel. Values are saturated to `0..=255`.
pub fn tensor_to_byte_texture<B, T>(
    backend: &B,
    tensor: &TensorView<'_, T>,
) -> Result<DataTexture<HandleOf<B>>>
where
    B: ComputeBackend,
    T: Scalar,
{
    tensor.matrix_dims()?;
    let allocator = backend.active_context()?;

    let packed = PackedPixels::pack_u8(tensor)?;
    upload(
        allocator,
        "tensor_byte_texture",
        packed.shape,
        ScalarType::U8,
        packed.as_bytes(),
    )
}

fn upload<A: TextureAllocator>(
    allocator: &A,
    label: &str,
    shape: TextureShape,
    scalar: ScalarType,
    pixels: &[u8],
) -> Result<DataTexture<A::Handle>> {
    let (width, height) = texture_extent(&shape)?;
    debug!(
        "{label}: {} points, {} per row, {} rows, {} px/point -> {width}x{height}",
        shape.num_points, shape.points_per_row, shape.num_rows, shape.pixels_per_point
    );

    let texture = allocator.create_texture(&TextureRequest {
        label,
        width,
        height,
        channels: CHANNELS as u32,
        scalar,
        filter: FilterMode::Nearest,
        wrap: WrapMode::ClampToEdge,
        pixels,
    })?;

    Ok(DataTexture { shape, texture })
}

fn texture_extent(shape: &TextureShape) -> Result<(u32, u32)> {
    let (width, height) = (shape.width(), shape.height());
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(Error::unsupported(format!(
            "{width}x{height} texture does not fit 32-bit extents"
        ))),
    }
}
