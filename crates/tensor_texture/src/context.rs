use std::borrow::Cow;

use tracing::{debug, info, trace, warn};

use crate::config::ContextConfig;
use crate::error::{Error, Result};
use crate::format::{self, ScalarType};
use crate::texture::{
    FilterMode, TextureAllocator, TextureRequest, pad_rows, padded_bytes_per_row,
    strip_row_padding, validate_texture_size,
};

/// Supplies the GPU context textures are allocated against.
///
/// Callers pass a backend explicitly; there is no process-wide current
/// backend.
pub trait ComputeBackend {
    type Allocator: TextureAllocator;

    fn active_context(&self) -> Result<&Self::Allocator>;
}

impl<B: ComputeBackend> ComputeBackend for Option<B> {
    type Allocator = B::Allocator;

    fn active_context(&self) -> Result<&Self::Allocator> {
        self.as_ref()
            .ok_or(Error::BackendUnavailable)?
            .active_context()
    }
}

/// A wgpu device and queue.
#[derive(Debug, Clone)]
pub struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    label: String,
    max_dimension: u32,
}

/// A texture created by [`GpuContext`], ready to be bound.
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

impl GpuContext {
    /// Requests an adapter and device without a surface.
    pub async fn headless(config: &ContextConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: config.backends(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference.into(),
                force_fallback_adapter: config.force_fallback_adapter,
                compatible_surface: None,
            })
            .await
            .ok_or(Error::BackendUnavailable)?;

        let adapter_info = adapter.get_info();
        info!(
            "using adapter {} ({:?}, {:?})",
            adapter_info.name, adapter_info.backend, adapter_info.device_type
        );

        // linear filtering of float data textures needs this where available
        let required_features = adapter.features() & wgpu::Features::FLOAT32_FILTERABLE;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some(config.label.as_str()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                    required_features,
                    required_limits: adapter.limits(),
                },
                None,
            )
            .await?;

        Ok(Self::from_parts(device, queue, config))
    }

    /// Wraps a device created elsewhere, e.g. by the host renderer.
    pub fn from_parts(device: wgpu::Device, queue: wgpu::Queue, config: &ContextConfig) -> Self {
        let max_dimension = config.max_dimension(device.limits().max_texture_dimension_2d);
        debug!("gpu context ready, max texture dimension {max_dimension}");

        Self {
            device,
            queue,
            label: config.label.clone(),
            max_dimension,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Copies a texture back into tightly packed rows.
    pub fn read_back(&self, texture: &GpuTexture) -> Result<Vec<u8>> {
        let bytes_per_texel = texture.format.block_copy_size(None).ok_or_else(|| {
            Error::ReadBack(format!("{:?} has no block copy size", texture.format))
        })? as usize;

        let unpadded_bytes_per_row = texture.width as usize * bytes_per_texel;
        let padded_bytes_per_row = padded_bytes_per_row(unpadded_bytes_per_row);
        let height = texture.height as usize;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(format!("{}_readback", self.label).as_str()),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(format!("{}_readback_encoder", self.label).as_str()),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row as u32),
                    rows_per_image: Some(texture.height),
                },
            },
            extent(texture.width, texture.height),
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = crossbeam_channel::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| Error::ReadBack("map callback dropped".to_owned()))??;

        let tight = {
            let mapped = slice.get_mapped_range();
            strip_row_padding(&mapped, unpadded_bytes_per_row, height)
        };
        staging.unmap();

        Ok(tight)
    }

    /// Reads back a 32-bit float texture as channel values.
    pub fn read_back_f32(&self, texture: &GpuTexture) -> Result<Vec<f32>> {
        let bytes = self.read_back(texture)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

impl ComputeBackend for GpuContext {
    type Allocator = GpuContext;

    fn active_context(&self) -> Result<&GpuContext> {
        Ok(self)
    }
}

impl TextureAllocator for GpuContext {
    type Handle = GpuTexture;

    fn create_texture(&self, request: &TextureRequest<'_>) -> Result<GpuTexture> {
        request.check_pixels()?;

        let selector = format::selector(request.scalar);
        let format = selector.internal_format(request.channels)?;
        let layout = selector.pixel_layout(request.channels)?;
        trace!("{}: {:?} for {:?}", request.label, format, layout);

        if request.filter == FilterMode::Linear
            && request.scalar == ScalarType::F32
            && !self
                .device
                .features()
                .contains(wgpu::Features::FLOAT32_FILTERABLE)
        {
            return Err(Error::unsupported(
                "linear filtering of 32-bit float textures (FLOAT32_FILTERABLE)",
            ));
        }

        // wgpu rejects zero-sized textures, an empty point set gets one blank texel
        let (width, height, pixels) = if request.width == 0 || request.height == 0 {
            warn!(
                "{}: {}x{} texture is empty, allocating 1x1",
                request.label, request.width, request.height
            );
            (1, 1, Cow::Owned(vec![0u8; layout.bytes_per_texel as usize]))
        } else {
            (request.width, request.height, Cow::Borrowed(request.pixels))
        };

        validate_texture_size(width, height, self.max_dimension)?;

        let size = extent(width, height);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(request.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let unpadded_bytes_per_row = width as usize * layout.bytes_per_texel as usize;
        let padded = pad_rows(&pixels, unpadded_bytes_per_row, height as usize);

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &padded,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row(unpadded_bytes_per_row) as u32),
                rows_per_image: Some(height),
            },
            size,
        );

        let filter = request.filter.into();
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(request.label),
            address_mode_u: request.wrap.into(),
            address_mode_v: request.wrap.into(),
            address_mode_w: request.wrap.into(),
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        debug!(
            "{}: uploaded {}x{} {:?} ({} bytes)",
            request.label,
            width,
            height,
            format,
            padded.len()
        );

        Ok(GpuTexture {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            texture,
            sampler,
            format,
            width,
            height,
        })
    }
}
