//! Runtime configuration handed from the binary to the event loop.

use corelib::orbit::OrbitSettings;
use corelib::scene::{EnvironmentPreset, ModelSettings};

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub backends: wgpu::Backends,
    pub show_fps: bool,
    pub width: u32,
    pub height: u32,
    pub model: ModelSettings,
    pub environment: EnvironmentPreset,
    pub controls: OrbitSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            show_fps: false,
            width: 400,
            height: 560,
            model: ModelSettings::default(),
            environment: EnvironmentPreset::City,
            controls: OrbitSettings::default(),
        }
    }
}
