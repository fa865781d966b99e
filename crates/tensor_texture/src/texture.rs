use crate::error::{Error, Result};
use crate::format::{FormatSelector, ScalarType};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

impl From<FilterMode> for wgpu::FilterMode {
    fn from(mode: FilterMode) -> Self {
        match mode {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
}

impl From<WrapMode> for wgpu::AddressMode {
    fn from(mode: WrapMode) -> Self {
        match mode {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

/// Everything an allocator needs to create and fill one 2D texture.
#[derive(Debug, Clone, Copy)]
pub struct TextureRequest<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub scalar: ScalarType,
    pub filter: FilterMode,
    pub wrap: WrapMode,
    /// Tightly packed rows, `width * channels * scalar.size()` bytes each
    pub pixels: &'a [u8],
}

impl TextureRequest<'_> {
    pub fn bytes_per_row(&self) -> usize {
        self.width as usize * self.channels as usize * self.scalar.size()
    }

    /// Checks that `pixels` holds exactly `height` tight rows.
    pub fn check_pixels(&self) -> Result<()> {
        let expected = self.bytes_per_row() * self.height as usize;
        if self.pixels.len() != expected {
            return Err(Error::PixelData {
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }
}

/// Creates GPU textures from raw pixel data.
pub trait TextureAllocator {
    type Handle;

    fn create_texture(&self, request: &TextureRequest<'_>) -> Result<Self::Handle>;
}

/// Rejects empty textures and textures larger than `max_dimension` on either
/// axis.
pub fn validate_texture_size(width: u32, height: u32, max_dimension: u32) -> Result<()> {
    if width == 0 || height == 0 || width > max_dimension || height > max_dimension {
        return Err(Error::TextureSize {
            width,
            height,
            max: max_dimension,
        });
    }
    Ok(())
}

/// Row stride of a texture upload, rounded up to wgpu's copy alignment.
pub fn padded_bytes_per_row(unpadded: usize) -> usize {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize; // 256
    unpadded.div_ceil(align) * align
}

/// Copies tight rows into a buffer whose rows are `padded_bytes_per_row` long.
pub fn pad_rows(tight: &[u8], unpadded_bytes_per_row: usize, height: usize) -> Vec<u8> {
    let padded_bytes_per_row = padded_bytes_per_row(unpadded_bytes_per_row);
    if padded_bytes_per_row == unpadded_bytes_per_row {
        return tight.to_vec();
    }

    let mut padded = vec![0u8; padded_bytes_per_row * height];
    for y in 0..height {
        let src = &tight[y * unpadded_bytes_per_row..(y + 1) * unpadded_bytes_per_row];
        let dst = &mut padded
            [y * padded_bytes_per_row..y * padded_bytes_per_row + unpadded_bytes_per_row];
        dst.copy_from_slice(src);
    }
    padded
}

/// Inverse of [`pad_rows`].
pub fn strip_row_padding(padded: &[u8], unpadded_bytes_per_row: usize, height: usize) -> Vec<u8> {
    let padded_bytes_per_row = padded_bytes_per_row(unpadded_bytes_per_row);
    let mut tight = Vec::with_capacity(unpadded_bytes_per_row * height);
    for row in padded.chunks(padded_bytes_per_row).take(height) {
        tight.extend_from_slice(&row[..unpadded_bytes_per_row]);
    }
    tight
}

/// Bind group layout entry for a texture produced by a [`TextureAllocator`].
///
/// Float textures are declared non-filterable unless the format is, so they
/// can be read with `textureLoad` on any device.
pub fn data_texture_layout_entry(
    binding: u32,
    selector: &dyn FormatSelector,
    filter: FilterMode,
) -> wgpu::BindGroupLayoutEntry {
    let filterable = match selector.scalar_type() {
        ScalarType::U8 => true,
        ScalarType::F32 => filter == FilterMode::Linear,
    };

    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT | wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable },
        },
        count: None,
    }
}
