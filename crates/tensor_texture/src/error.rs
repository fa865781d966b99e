/// Packing and upload errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("no active gpu backend")]
    BackendUnavailable,

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("texture size {width}x{height} is invalid (max dimension {max})")]
    TextureSize { width: u32, height: u32, max: u32 },

    #[error("pixel data is {actual} bytes, texture needs {expected}")]
    PixelData { expected: usize, actual: usize },

    #[error("device error: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("buffer map error: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("readback error: {0}")]
    ReadBack(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum ShapeError {
    /// Only matrices (points x features) can be packed
    #[error("input tensor must be 2-dimensional, got rank {0}")]
    Rank(usize),

    #[error("input tensor has no feature dimensions")]
    ZeroDimensions,

    #[error("tensor data has {actual} values but its shape needs {expected}")]
    DataLength { expected: usize, actual: usize },

    #[error("{num_points}x{num_dimensions} tensor is too large to pack")]
    TooLarge {
        num_points: usize,
        num_dimensions: usize,
    },
}

impl Error {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
