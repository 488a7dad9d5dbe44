use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const SETTINGS_FILE: &str = "settings.json";

const DEFAULT_SHADOW_MAP_SIZE: u32 = 2048;

/// Start-up configuration for the renderer and its window.
///
/// Every field has a default, so a settings file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub window: WindowSettings,
    /// Edge length of the square directional shadow map.
    pub shadow_map_size: u32,
    /// Start in the deferred pipeline. F1 switches at runtime.
    pub deferred: bool,
    pub normal_mapping: bool,
    /// Directory searched for `<name>.wgsl` overrides of the built-in shaders.
    pub shader_dir: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            shadow_map_size: DEFAULT_SHADOW_MAP_SIZE,
            deferred: true,
            normal_mapping: true,
            shader_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Wait for vertical blank. Off by default so frame timing is visible.
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Deferred renderer".to_owned(),
            vsync: false,
        }
    }
}

impl RenderSettings {
    /// Reads [`SETTINGS_FILE`] from the working directory.
    pub fn load() -> Self {
        Self::load_from_path(SETTINGS_FILE)
    }

    /// Never fails: a missing or broken file logs and yields defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No settings at {:?}, using defaults", path);
                return Self::default();
            }
            Err(err) => {
                warn!("Could not read {:?}: {}. Using defaults", path, err);
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&contents) {
            Ok(settings) => {
                info!("Loaded settings from {:?}", path);
                settings.validate()
            }
            Err(err) => {
                warn!("Could not parse {:?}: {}. Using defaults", path, err);
                Self::default()
            }
        }
    }

    /// Replaces values the renderer cannot use.
    pub(crate) fn validate(mut self) -> Self {
        self.shadow_map_size = match self.shadow_map_size {
            0 => {
                warn!("Shadow map size of zero, using {}", DEFAULT_SHADOW_MAP_SIZE);
                DEFAULT_SHADOW_MAP_SIZE
            }
            size if size.is_power_of_two() => size,
            size => {
                let rounded = size.next_power_of_two();
                warn!("Shadow map size {} rounded up to {}", size, rounded);
                rounded
            }
        };

        if self.window.width == 0 || self.window.height == 0 {
            let defaults = WindowSettings::default();
            warn!(
                "Window size {}x{} is empty, using {}x{}",
                self.window.width, self.window.height, defaults.width, defaults.height
            );
            self.window.width = defaults.width;
            self.window.height = defaults.height;
        }

        self
    }

    /// Picks from the modes the surface reports. With vsync this is FIFO,
    /// which every surface supports. Without it the first available of
    /// mailbox and immediate wins, falling back to FIFO.
    pub fn present_mode(&self, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
        let preferred: &[wgpu::PresentMode] = if self.window.vsync {
            &[wgpu::PresentMode::Fifo]
        } else {
            &[wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]
        };

        preferred
            .iter()
            .copied()
            .find(|mode| available.contains(mode))
            .unwrap_or_else(|| {
                if !self.window.vsync {
                    warn!("No tearing present mode available, using FIFO");
                }
                wgpu::PresentMode::Fifo
            })
    }
}
