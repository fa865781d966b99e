//! Texture format selection.
//!
//! Maps a channel count and scalar type onto wgpu formats. wgpu has no
//! 3-channel 32-bit float or 8-bit formats, so three channels are rejected
//! instead of silently widened.

use crate::error::{Error, Result};

/// Storage type of a single channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScalarType {
    F32,
    U8,
}

impl ScalarType {
    pub fn size(self) -> usize {
        match self {
            ScalarType::F32 => 4,
            ScalarType::U8 => 1,
        }
    }
}

/// How texel data is laid out in the upload buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PixelLayout {
    pub channels: u32,
    pub bytes_per_texel: u32,
}

pub trait FormatSelector {
    /// GPU-side storage format for `channels` channels.
    fn internal_format(&self, channels: u32) -> Result<wgpu::TextureFormat>;

    /// Layout of the CPU-side pixel data for `channels` channels.
    fn pixel_layout(&self, channels: u32) -> Result<PixelLayout> {
        check_channels(channels)?;
        Ok(PixelLayout {
            channels,
            bytes_per_texel: channels * self.scalar_type().size() as u32,
        })
    }

    fn scalar_type(&self) -> ScalarType;
}

/// 32-bit float channels.
#[derive(Debug, Copy, Clone, Default)]
pub struct FloatFormats;

/// 8-bit normalized channels.
#[derive(Debug, Copy, Clone, Default)]
pub struct ByteFormats;

fn check_channels(channels: u32) -> Result<()> {
    match channels {
        1 | 2 | 4 => Ok(()),
        3 => Err(Error::unsupported("3-channel textures")),
        n => Err(Error::unsupported(format!("{n} channels"))),
    }
}

impl FormatSelector for FloatFormats {
    fn internal_format(&self, channels: u32) -> Result<wgpu::TextureFormat> {
        check_channels(channels)?;
        Ok(match channels {
            4 => wgpu::TextureFormat::Rgba32Float,
            2 => wgpu::TextureFormat::Rg32Float,
            _ => wgpu::TextureFormat::R32Float,
        })
    }

    fn scalar_type(&self) -> ScalarType {
        ScalarType::F32
    }
}

impl FormatSelector for ByteFormats {
    fn internal_format(&self, channels: u32) -> Result<wgpu::TextureFormat> {
        check_channels(channels)?;
        Ok(match channels {
            4 => wgpu::TextureFormat::Rgba8Unorm,
            2 => wgpu::TextureFormat::Rg8Unorm,
            _ => wgpu::TextureFormat::R8Unorm,
        })
    }

    fn scalar_type(&self) -> ScalarType {
        ScalarType::U8
    }
}

/// Selector for a scalar type.
pub fn selector(scalar: ScalarType) -> &'static dyn FormatSelector {
    match scalar {
        ScalarType::F32 => &FloatFormats,
        ScalarType::U8 => &ByteFormats,
    }
}
