use serde::Deserialize;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerPreference {
    #[default]
    None,
    Low,
    High,
}

impl From<PowerPreference> for wgpu::PowerPreference {
    fn from(pref: PowerPreference) -> Self {
        match pref {
            PowerPreference::None => wgpu::PowerPreference::None,
            PowerPreference::Low => wgpu::PowerPreference::LowPower,
            PowerPreference::High => wgpu::PowerPreference::HighPerformance,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Vulkan,
    Metal,
    Dx12,
    Gl,
    BrowserWebgpu,
}

impl From<BackendKind> for wgpu::Backends {
    fn from(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Vulkan => wgpu::Backends::VULKAN,
            BackendKind::Metal => wgpu::Backends::METAL,
            BackendKind::Dx12 => wgpu::Backends::DX12,
            BackendKind::Gl => wgpu::Backends::GL,
            BackendKind::BrowserWebgpu => wgpu::Backends::BROWSER_WEBGPU,
        }
    }
}

/// Settings for creating a headless [`GpuContext`](crate::GpuContext).
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub power_preference: PowerPreference,
    pub force_fallback_adapter: bool,
    /// Empty means every backend wgpu was built with
    pub backends: Vec<BackendKind>,
    /// Prefix for wgpu object labels
    pub label: String,
    /// Clamp below the device's `max_texture_dimension_2d`
    pub max_texture_dimension: Option<u32>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            power_preference: PowerPreference::default(),
            force_fallback_adapter: false,
            backends: vec![],
            label: "tensor_texture".to_owned(),
            max_texture_dimension: None,
        }
    }
}

impl ContextConfig {
    pub fn backends(&self) -> wgpu::Backends {
        if self.backends.is_empty() {
            return wgpu::Backends::all();
        }

        self.backends
            .iter()
            .fold(wgpu::Backends::empty(), |acc, &kind| acc | wgpu::Backends::from(kind))
    }

    /// Effective texture dimension limit for a device limit.
    pub fn max_dimension(&self, device_max: u32) -> u32 {
        match self.max_texture_dimension {
            Some(max) => max.min(device_max),
            None => device_max,
        }
    }
}
