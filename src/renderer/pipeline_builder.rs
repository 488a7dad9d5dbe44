// src/renderer/pipeline_builder.rs

/// Which faces a pass rasterizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Culling {
    /// Counter-clockwise front faces, back faces culled.
    Back,
    /// Nothing culled, for fullscreen quads and triangles.
    None,
    /// Clockwise treated as front, so a counter-clockwise closed mesh shows
    /// its inner surface. The face given is the one culled.
    InsideOut(wgpu::Face),
}

impl Culling {
    fn primitive(self) -> wgpu::PrimitiveState {
        let (front_face, cull_mode) = match self {
            Culling::Back => (wgpu::FrontFace::Ccw, Some(wgpu::Face::Back)),
            Culling::None => (wgpu::FrontFace::Ccw, None),
            Culling::InsideOut(face) => (wgpu::FrontFace::Cw, Some(face)),
        };
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face,
            cull_mode,
            ..Default::default()
        }
    }
}

/// Render pipeline builder shared by every pass.
///
/// Starts from `vs_main`/`fs_main`, [`Culling::Back`], no depth and no colour
/// targets.
pub struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    label: Option<&'a str>,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    vertex_entry: &'a str,
    fragment_entry: Option<&'a str>,
    vertex_buffers: Vec<wgpu::VertexBufferLayout<'a>>,
    targets: Vec<Option<wgpu::ColorTargetState>>,
    depth: Option<wgpu::DepthStencilState>,
    culling: Culling,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        layout: &'a wgpu::PipelineLayout,
        shader: &'a wgpu::ShaderModule,
    ) -> Self {
        Self {
            device,
            label: None,
            layout,
            shader,
            vertex_entry: "vs_main",
            fragment_entry: Some("fs_main"),
            vertex_buffers: Vec::new(),
            targets: Vec::new(),
            depth: None,
            culling: Culling::Back,
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_entry_points(mut self, vertex: &'a str, fragment: &'a str) -> Self {
        self.vertex_entry = vertex;
        self.fragment_entry = Some(fragment);
        self
    }

    pub fn with_vertex_entry(mut self, vertex: &'a str) -> Self {
        self.vertex_entry = vertex;
        self
    }

    /// Drops the fragment stage. Shadow casters only write depth.
    pub fn depth_only(mut self) -> Self {
        self.fragment_entry = None;
        self
    }

    pub fn with_vertex_buffer(mut self, layout: wgpu::VertexBufferLayout<'a>) -> Self {
        self.vertex_buffers.push(layout);
        self
    }

    /// Appends one colour target per format, in attachment order.
    pub fn with_targets(mut self, formats: &[wgpu::TextureFormat]) -> Self {
        self.targets.extend(formats.iter().map(|&format| {
            Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
        }));
        self
    }

    /// A single target that sums into what is already there.
    pub fn with_additive_target(mut self, format: wgpu::TextureFormat) -> Self {
        self.targets.push(Some(wgpu::ColorTargetState {
            format,
            blend: Some(ADDITIVE_BLEND),
            write_mask: wgpu::ColorWrites::ALL,
        }));
        self
    }

    /// Depth test with writes enabled.
    pub fn with_depth(mut self, format: wgpu::TextureFormat, compare: wgpu::CompareFunction) -> Self {
        self.depth = Some(wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });
        self
    }

    /// Constant and slope-scaled bias on the depth state set by
    /// [`PipelineBuilder::with_depth`]. Without a depth state this does nothing.
    pub fn with_depth_bias(mut self, constant: i32, slope_scale: f32) -> Self {
        if let Some(depth) = self.depth.as_mut() {
            depth.bias = wgpu::DepthBiasState {
                constant,
                slope_scale,
                clamp: 0.0,
            };
        }
        self
    }

    pub fn with_culling(mut self, culling: Culling) -> Self {
        self.culling = culling;
        self
    }

    pub fn build(self) -> wgpu::RenderPipeline {
        let fragment = self.fragment_entry.map(|entry| wgpu::FragmentState {
            module: self.shader,
            entry_point: Some(entry),
            targets: &self.targets,
            compilation_options: Default::default(),
        });

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: self.label,
                layout: Some(self.layout),
                vertex: wgpu::VertexState {
                    module: self.shader,
                    entry_point: Some(self.vertex_entry),
                    buffers: &self.vertex_buffers,
                    compilation_options: Default::default(),
                },
                fragment,
                primitive: self.culling.primitive(),
                depth_stencil: self.depth,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }
}

const ADDITIVE: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::One,
    dst_factor: wgpu::BlendFactor::One,
    operation: wgpu::BlendOperation::Add,
};

/// `One + One` on colour and alpha, used to accumulate light.
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: ADDITIVE,
    alpha: ADDITIVE,
};
