use crate::error::RenderError;

pub(crate) const ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub(crate) const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub(crate) const SPECULAR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub(crate) const LINEAR_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;
pub(crate) const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Hardware depth shared by the geometry and forward passes.
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub(crate) const GBUFFER_FORMATS: [wgpu::TextureFormat; 4] = [
    ALBEDO_FORMAT,
    NORMAL_FORMAT,
    SPECULAR_FORMAT,
    LINEAR_DEPTH_FORMAT,
];

/// Outcome of validating the screen-sized render targets after a resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStatus {
    Complete,
    Incomplete(String),
}

impl TargetStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, TargetStatus::Complete)
    }
}

pub(crate) struct RenderTarget {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC;
        Self::with_usage(device, label, format, (width, height), usage)
    }

    /// The hardware depth attachment is never sampled or read back.
    fn depth(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self::with_usage(
            device,
            "GBufferDepth",
            DEPTH_FORMAT,
            (width, height),
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )
    }

    fn with_usage(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        (width, height): (u32, u32),
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// Albedo, normal, specular and linear depth targets plus the shared depth
/// attachment.
pub(crate) struct GBuffer {
    pub(crate) albedo: RenderTarget,
    pub(crate) normal: RenderTarget,
    pub(crate) specular: RenderTarget,
    pub(crate) linear_depth: RenderTarget,
    pub(crate) depth: RenderTarget,
    width: u32,
    height: u32,
}

impl GBuffer {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self {
            albedo: RenderTarget::new(device, "GBufferAlbedo", ALBEDO_FORMAT, width, height),
            normal: RenderTarget::new(device, "GBufferNormal", NORMAL_FORMAT, width, height),
            specular: RenderTarget::new(device, "GBufferSpecular", SPECULAR_FORMAT, width, height),
            linear_depth: RenderTarget::new(
                device,
                "GBufferLinearDepth",
                LINEAR_DEPTH_FORMAT,
                width,
                height,
            ),
            depth: RenderTarget::depth(device, width, height),
            width,
            height,
        }
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn mismatched_target(&self) -> Option<&'static str> {
        let expected = (self.width, self.height);
        [
            ("albedo", self.albedo.size()),
            ("normal", self.normal.size()),
            ("specular", self.specular.size()),
            ("linear depth", self.linear_depth.size()),
            ("depth", self.depth.size()),
        ]
        .into_iter()
        .find(|(_, size)| *size != expected)
        .map(|(name, _)| name)
    }

    /// Bind group layout for passes that read the G-buffer with `textureLoad`.
    pub(crate) fn read_layout(device: &wgpu::Device, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayout {
        let entries: Vec<_> = (0..4)
            .map(|binding| unfiltered_texture_entry(binding, visibility))
            .collect();
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("GBufferReadLayout"),
            entries: &entries,
        })
    }

    pub(crate) fn read_bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("GBufferReadBindGroup"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.albedo.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&self.normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&self.specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&self.linear_depth.view),
                },
            ],
        })
    }
}

pub(crate) fn unfiltered_texture_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// HDR accumulation target written by the lighting or forward pass.
pub(crate) struct HdrTarget {
    pub(crate) target: RenderTarget,
}

impl HdrTarget {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self {
            target: RenderTarget::new(device, "HdrTarget", HDR_FORMAT, width, height),
        }
    }

    pub(crate) fn view(&self) -> &wgpu::TextureView {
        &self.target.view
    }

    pub(crate) fn texture(&self) -> &wgpu::Texture {
        &self.target.texture
    }
}

/// Allocates the G-buffer and HDR target inside a validation error scope and
/// checks every attachment has the requested size.
pub(crate) fn allocate_targets(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (GBuffer, HdrTarget, TargetStatus) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let gbuffer = GBuffer::new(device, width, height);
    let hdr = HdrTarget::new(device, width, height);
    let error = pollster::block_on(device.pop_error_scope());

    let status = match error {
        Some(error) => TargetStatus::Incomplete(error.to_string()),
        None => match gbuffer.mismatched_target() {
            Some(name) => TargetStatus::Incomplete(format!(
                "{name} attachment does not match {width}x{height}"
            )),
            None if hdr.target.size() != (width, height) => {
                TargetStatus::Incomplete(format!("HDR target does not match {width}x{height}"))
            }
            None => TargetStatus::Complete,
        },
    };

    if let TargetStatus::Incomplete(reason) = &status {
        log::error!(
            "{}",
            RenderError::IncompleteTarget {
                label: "gbuffer",
                reason: reason.clone(),
            }
        );
    } else {
        log::info!("Render targets allocated at {}x{}", width, height);
    }

    (gbuffer, hdr, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gbuffer_formats_are_renderable_without_features() {
        for format in GBUFFER_FORMATS {
            let features = format.guaranteed_format_features(wgpu::Features::empty());
            assert!(
                features
                    .allowed_usages
                    .contains(wgpu::TextureUsages::RENDER_ATTACHMENT),
                "{format:?}"
            );
        }
    }

    #[test]
    fn depth_attachment_has_no_stencil() {
        assert!(DEPTH_FORMAT.has_depth_aspect());
        assert!(!DEPTH_FORMAT.has_stencil_aspect());
    }

    #[test]
    fn target_status_reports_completeness() {
        assert!(TargetStatus::Complete.is_complete());
        assert!(!TargetStatus::Incomplete("albedo".into()).is_complete());
    }
}
