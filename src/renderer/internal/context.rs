use std::sync::Arc;

use winit::window::Window;

use crate::error::{RenderError, RenderResult};
use crate::renderer::internal::gbuffer::{DEPTH_FORMAT, GBUFFER_FORMATS, HDR_FORMAT};
use crate::settings::RenderSettings;

/// Format of the offscreen output used when there is no window.
pub(crate) const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub(crate) struct SurfaceOutput {
    pub(crate) surface: wgpu::Surface<'static>,
    pub(crate) config: wgpu::SurfaceConfiguration,
}

pub(crate) struct OffscreenOutput {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl OffscreenOutput {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("OffscreenOutput"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Where the present pass writes: the window's swapchain or an offscreen
/// texture that tests can read back.
pub(crate) enum Output {
    Surface(SurfaceOutput),
    Offscreen(OffscreenOutput),
}

/// The frame being presented, holding the swapchain texture alive until it
/// is shown.
pub(crate) struct OutputFrame {
    pub(crate) view: wgpu::TextureView,
    surface_texture: Option<wgpu::SurfaceTexture>,
}

impl OutputFrame {
    pub(crate) fn present(self) {
        if let Some(texture) = self.surface_texture {
            texture.present();
        }
    }
}

pub(crate) struct RenderContext {
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    pub(crate) output: Output,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl RenderContext {
    pub(crate) async fn new(window: Arc<Window>, settings: &RenderSettings) -> RenderResult<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;
        log::info!("Surface created successfully!");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = request_device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RenderError::IncompleteTarget {
                label: "surface",
                reason: "adapter reports no surface formats".to_string(),
            })?;

        let present_mode = settings.present_mode(&surface_caps.present_modes);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let width = size.width.max(1);
        let height = size.height.max(1);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("Surface configured: {:?} {}x{} {:?}", format, width, height, present_mode);

        Ok(Self {
            device,
            queue,
            output: Output::Surface(SurfaceOutput { surface, config }),
            width,
            height,
        })
    }

    /// A context without a window. The present pass renders into an
    /// offscreen texture instead of a swapchain.
    pub(crate) async fn headless(width: u32, height: u32) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = request_device(&adapter).await?;
        let width = width.max(1);
        let height = height.max(1);
        let offscreen = OffscreenOutput::new(&device, width, height);

        Ok(Self {
            device,
            queue,
            output: Output::Offscreen(offscreen),
            width,
            height,
        })
    }

    pub(crate) fn output_format(&self) -> wgpu::TextureFormat {
        match &self.output {
            Output::Surface(output) => output.config.format,
            Output::Offscreen(_) => OFFSCREEN_FORMAT,
        }
    }

    pub(crate) fn offscreen_texture(&self) -> Option<&wgpu::Texture> {
        match &self.output {
            Output::Surface(_) => None,
            Output::Offscreen(output) => Some(&output.texture),
        }
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        match &mut self.output {
            Output::Surface(output) => {
                output.config.width = width;
                output.config.height = height;
                output.surface.configure(&self.device, &output.config);
            }
            Output::Offscreen(output) => {
                *output = OffscreenOutput::new(&self.device, width, height);
            }
        }
    }

    pub(crate) fn acquire_frame(&mut self) -> RenderResult<OutputFrame> {
        match &self.output {
            Output::Surface(output) => {
                let frame = match output.surface.get_current_texture() {
                    Ok(frame) => frame,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        log::warn!("Surface lost or outdated, reconfiguring");
                        output.surface.configure(&self.device, &output.config);
                        output.surface.get_current_texture()?
                    }
                    Err(err) => return Err(err.into()),
                };
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(OutputFrame {
                    view,
                    surface_texture: Some(frame),
                })
            }
            Output::Offscreen(output) => Ok(OutputFrame {
                view: output.view.clone(),
                surface_texture: None,
            }),
        }
    }
}

async fn request_device(adapter: &wgpu::Adapter) -> RenderResult<(wgpu::Device, wgpu::Queue)> {
    let info = adapter.get_info();
    log::info!("Using adapter: {:?}", info);

    if let Some(missing) = missing_capabilities(&adapter.get_downlevel_capabilities(), |format| {
        adapter.get_texture_format_features(format)
    }) {
        log::error!("Adapter {} is missing {}", info.name, missing);
        return Err(RenderError::UnsupportedAdapter {
            adapter: info.name,
            missing,
        });
    }
    let adapter_features = adapter.features();

    let mut required_features = wgpu::Features::empty();
    if adapter_features.contains(wgpu::Features::TEXTURE_COMPRESSION_BC) {
        required_features |= wgpu::Features::TEXTURE_COMPRESSION_BC;
    } else {
        log::warn!("BC texture compression not supported; DDS textures will fail to load");
    }

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Device"),
            required_features,
            required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await?;

    device.on_uncaptured_error(Arc::new(|error| {
        log::error!("Uncaptured wgpu error: {error}");
        if cfg!(debug_assertions) {
            panic!("Uncaptured wgpu error: {error}");
        }
    }));

    Ok((device, queue))
}

/// Describes what the adapter lacks for the G-buffer, HDR and sRGB texture
/// views, or `None` when it can run every pass. Downlevel backends such as
/// GL report these per adapter instead of guaranteeing them.
fn missing_capabilities(
    downlevel: &wgpu::DownlevelCapabilities,
    format_features: impl Fn(wgpu::TextureFormat) -> wgpu::TextureFormatFeatures,
) -> Option<String> {
    let mut missing = Vec::new();

    let required = wgpu::DownlevelFlags::VIEW_FORMATS | wgpu::DownlevelFlags::COMPARISON_SAMPLERS;
    let absent = required.difference(downlevel.flags);
    if !absent.is_empty() {
        missing.push(format!("{absent:?}"));
    }

    for format in GBUFFER_FORMATS.into_iter().chain([HDR_FORMAT, DEPTH_FORMAT]) {
        let features = format_features(format);
        if !features
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
        {
            missing.push(format!("{format:?} render target"));
        }
    }

    if !format_features(HDR_FORMAT)
        .flags
        .contains(wgpu::TextureFormatFeatureFlags::BLENDABLE)
    {
        missing.push(format!("{HDR_FORMAT:?} blending"));
    }

    (!missing.is_empty()).then(|| missing.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_support(_: wgpu::TextureFormat) -> wgpu::TextureFormatFeatures {
        wgpu::TextureFormatFeatures {
            allowed_usages: wgpu::TextureUsages::all(),
            flags: wgpu::TextureFormatFeatureFlags::all(),
        }
    }

    #[test]
    fn compliant_adapter_has_nothing_missing() {
        let downlevel = wgpu::DownlevelCapabilities::default();
        assert_eq!(missing_capabilities(&downlevel, full_support), None);
    }

    #[test]
    fn adapter_without_view_formats_is_rejected() {
        let downlevel = wgpu::DownlevelCapabilities {
            flags: wgpu::DownlevelFlags::all() - wgpu::DownlevelFlags::VIEW_FORMATS,
            ..Default::default()
        };
        let missing = missing_capabilities(&downlevel, full_support).unwrap();
        assert!(missing.contains("VIEW_FORMATS"), "{missing}");
    }

    #[test]
    fn unrenderable_linear_depth_target_is_reported() {
        let downlevel = wgpu::DownlevelCapabilities::default();
        let missing = missing_capabilities(&downlevel, |format| {
            let mut features = full_support(format);
            if format == wgpu::TextureFormat::R32Float {
                features.allowed_usages = wgpu::TextureUsages::TEXTURE_BINDING;
            }
            features
        })
        .unwrap();

        assert!(missing.contains("R32Float render target"), "{missing}");
        assert!(!missing.contains("Rgba16Float"), "{missing}");
    }
}
