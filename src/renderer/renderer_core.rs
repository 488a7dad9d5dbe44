// renderer/renderer_core.rs
use std::path::Path;
use std::sync::Arc;

use bitflags::bitflags;
use glam::Mat4;
use winit::window::Window;

use crate::asset::loader::{has_obj_extension, load_with_prompt, read_file, read_to_string};
use crate::asset::mesh::{ensure_drawable, index_format_for_size};
use crate::asset::{dds, mesh_file, obj, AssetErrorPrompt, Assets, Handle, LogAndCancel, Mesh, MeshInfo};
use crate::error::{LoadError, RenderError, RenderResult};
use crate::renderer::commands::{FrameCommands, RenderCommand};
use crate::renderer::internal::gbuffer::{allocate_targets, TargetStatus};
use crate::renderer::internal::lighting::LightMeshes;
use crate::renderer::internal::{
    CameraBuffer, DynamicObjectsBuffer, ForwardPass, GBuffer, GeometryPass, HdrTarget,
    LightingPass, MaterialBinder, PreparedDraw, PresentPass, RenderContext, ShadowResources,
};
use crate::renderer::lights::{camera_position, shadow_caster, DirectionalShadow, Light};
use crate::renderer::material::Material;
use crate::renderer::readback::{read_texture, RenderTarget, TargetImage};
use crate::renderer::shader::{
    self, FORWARD_SHADER, GBUFFER_SHADER, LIGHTING_SHADER, PRESENT_SHADER, SHADOW_SHADER,
};
use crate::renderer::tangents::{synthesize_tangents, widen_indices};
use crate::renderer::uniforms::{CameraUniform, ObjectData};
use crate::renderer::{primitives, Texture, Vertex, VertexFormat};
use crate::settings::RenderSettings;

const INITIAL_OBJECTS_CAPACITY: u32 = 1024;
const FIELD_OF_VIEW_DEGREES: f32 = 50.0;
const NEAR_PLANE: f32 = 1.0;
const FAR_PLANE: f32 = 10_000.0;

bitflags! {
    /// Per-frame switches flipped by the toggle calls.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u32 {
        const DEFERRED = 1 << 0;
        const DEBUG_GRAPHICS = 1 << 1;
        const NORMAL_MAPPING = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    Deferred,
    Forward,
}

/// Where the renderer is in its lifecycle. `Idle` sits between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    Begin,
    GeometryOrForward,
    Shadow,
    Lighting,
    Present,
    End,
    ShutDown,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RendererStats {
    pub draw_count: u32,
    pub skipped_draws: u32,
    pub light_count: u32,
    pub shadow_map_rendered: bool,
}

struct BuiltinMeshes {
    cube: Handle<Mesh>,
    quad: Handle<Mesh>,
    sphere: Handle<Mesh>,
}

/// Owns every GPU object. Games submit draws and lights each frame and call
/// [`Renderer::render`] once.
pub struct Renderer {
    assets: Assets,
    commands: FrameCommands,
    builtins: BuiltinMeshes,
    fullscreen_quad: Mesh,
    light_volume: Mesh,
    view: Mat4,
    projection: Mat4,
    view_2d: Mat4,
    flags: RenderFlags,
    phase: FramePhase,
    stats: RendererStats,
    target_status: TargetStatus,
    prompt: Box<dyn AssetErrorPrompt>,
    object_scratch: Vec<ObjectData>,
    camera_buffer: CameraBuffer,
    objects_buffer: DynamicObjectsBuffer,
    materials: MaterialBinder,
    gbuffer: GBuffer,
    hdr: HdrTarget,
    geometry: GeometryPass,
    shadows: ShadowResources,
    lighting: LightingPass,
    forward: ForwardPass,
    present: PresentPass,
    settings: RenderSettings,
    context: RenderContext,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, settings: RenderSettings) -> RenderResult<Self> {
        let settings = settings.validate();
        let context = RenderContext::new(window, &settings).await?;
        Self::from_context(context, settings)
    }

    /// A renderer that draws into an offscreen texture instead of a window.
    pub async fn headless(settings: RenderSettings, width: u32, height: u32) -> RenderResult<Self> {
        let settings = settings.validate();
        let context = RenderContext::headless(width, height).await?;
        Self::from_context(context, settings)
    }

    fn from_context(context: RenderContext, settings: RenderSettings) -> RenderResult<Self> {
        let device = &context.device;
        let mut prompt: Box<dyn AssetErrorPrompt> = Box::new(LogAndCancel);
        let shader_dir = settings.shader_dir.as_deref();

        let gbuffer_shader = shader::load(device, GBUFFER_SHADER, shader_dir, prompt.as_mut())?;
        let shadow_shader = shader::load(device, SHADOW_SHADER, shader_dir, prompt.as_mut())?;
        let lighting_shader = shader::load(device, LIGHTING_SHADER, shader_dir, prompt.as_mut())?;
        let forward_shader = shader::load(device, FORWARD_SHADER, shader_dir, prompt.as_mut())?;
        let present_shader = shader::load(device, PRESENT_SHADER, shader_dir, prompt.as_mut())?;

        let camera_buffer = CameraBuffer::new(device);
        let objects_buffer = DynamicObjectsBuffer::new(device, INITIAL_OBJECTS_CAPACITY);
        let materials = MaterialBinder::new(device, &context.queue);
        let (gbuffer, hdr, target_status) = allocate_targets(device, context.width, context.height);

        let geometry = GeometryPass::new(
            device,
            &gbuffer_shader,
            &camera_buffer,
            &objects_buffer,
            &materials,
        );
        let shadows = ShadowResources::new(
            device,
            &shadow_shader,
            &objects_buffer,
            settings.shadow_map_size,
        );
        let lighting = LightingPass::new(device, &lighting_shader, &camera_buffer, &shadows, &gbuffer);
        let forward = ForwardPass::new(
            device,
            &forward_shader,
            &camera_buffer,
            &objects_buffer,
            &materials,
        );
        let present = PresentPass::new(
            device,
            &present_shader,
            context.output_format(),
            &hdr,
            &gbuffer,
        );

        let (quad_vertices, quad_indices) = primitives::fullscreen_quad_mesh();
        let fullscreen_quad = Mesh::from_bytes(
            device,
            "FullscreenQuad",
            VertexFormat::PosTex,
            bytemuck::cast_slice(&quad_vertices),
            wgpu::IndexFormat::Uint16,
            bytemuck::cast_slice(&quad_indices),
        );
        let (sphere_vertices, sphere_indices) = primitives::sphere_mesh(24, 16);
        let light_volume = Mesh::from_bytes(
            device,
            "LightVolume",
            VertexFormat::PosNormTex,
            bytemuck::cast_slice(&sphere_vertices),
            wgpu::IndexFormat::Uint32,
            bytemuck::cast_slice(&sphere_indices),
        );

        let mut flags = RenderFlags::empty();
        flags.set(RenderFlags::DEFERRED, settings.deferred);
        flags.set(RenderFlags::NORMAL_MAPPING, settings.normal_mapping);

        let mut assets = Assets::default();
        let builtins = create_builtin_meshes(&context.device, &mut assets, flags);

        let aspect = context.width as f32 / context.height.max(1) as f32;
        log::info!(
            "Renderer initialised: {}x{}, {:?} pipeline",
            context.width,
            context.height,
            if settings.deferred {
                PipelineMode::Deferred
            } else {
                PipelineMode::Forward
            }
        );

        Ok(Self {
            assets,
            commands: FrameCommands::new(),
            builtins,
            fullscreen_quad,
            light_volume,
            view: Mat4::IDENTITY,
            projection: default_projection(aspect),
            view_2d: Mat4::IDENTITY,
            flags,
            phase: FramePhase::Idle,
            stats: RendererStats::default(),
            target_status,
            prompt,
            object_scratch: Vec::new(),
            camera_buffer,
            objects_buffer,
            materials,
            gbuffer,
            hdr,
            geometry,
            shadows,
            lighting,
            forward,
            present,
            settings,
            context,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.context.queue
    }

    /// Replaces the handler consulted when a texture, mesh, or shader
    /// override fails to load.
    pub fn set_error_prompt(&mut self, prompt: Box<dyn AssetErrorPrompt>) {
        self.prompt = prompt;
    }

    /// Releases frame state. Later calls to [`Renderer::render`] fail with
    /// [`RenderError::ShutDown`].
    pub fn shutdown(&mut self) {
        if self.phase == FramePhase::ShutDown {
            return;
        }
        self.commands.clear();
        self.phase = FramePhase::ShutDown;
        let (meshes, textures) = self.assets.live_counts();
        log::info!(
            "Renderer shut down with {} meshes and {} textures alive",
            meshes,
            textures
        );
    }

    pub fn is_shut_down(&self) -> bool {
        self.phase == FramePhase::ShutDown
    }

    /// Reallocates every screen-sized target and resets the default
    /// projection for the new aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring resize to {}x{}", width, height);
            return;
        }

        self.context.resize(width, height);
        let device = &self.context.device;
        let (gbuffer, hdr, status) = allocate_targets(device, width, height);
        self.gbuffer = gbuffer;
        self.hdr = hdr;
        self.target_status = status;
        self.lighting.resize(device, &self.gbuffer);
        self.present.resize(device, &self.hdr, &self.gbuffer);
        self.projection = default_projection(width as f32 / height as f32);
    }

    pub fn set_3d_view_matrix(&mut self, view: Mat4) {
        self.view = view;
    }

    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Stored for screen-space drawing. Nothing reads it yet.
    pub fn set_2d_view_matrix(&mut self, view: Mat4) {
        self.view_2d = view;
    }

    pub fn view_2d_matrix(&self) -> Mat4 {
        self.view_2d
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Uploads raw vertex and index data after checking the byte counts
    /// against the declared format and sizes.
    pub fn create_mesh(
        &mut self,
        vertex_count: u32,
        vertex_format: VertexFormat,
        index_count: u32,
        index_element_size: u32,
        vertex_bytes: &[u8],
        index_bytes: &[u8],
    ) -> RenderResult<Handle<Mesh>> {
        ensure_drawable(vertex_count as usize, index_count as usize)?;
        let expected_vertices = vertex_count as usize * vertex_format.stride() as usize;
        if vertex_bytes.len() != expected_vertices {
            return Err(LoadError::DataSize {
                what: "vertex",
                expected: expected_vertices,
                found: vertex_bytes.len(),
            }
            .into());
        }

        let index_format =
            index_format_for_size(index_element_size).ok_or(LoadError::IndexSize(index_element_size))?;
        let expected_indices = index_count as usize * index_element_size as usize;
        if index_bytes.len() != expected_indices {
            return Err(LoadError::DataSize {
                what: "index",
                expected: expected_indices,
                found: index_bytes.len(),
            }
            .into());
        }

        let mesh = upload_mesh(
            &self.context.device,
            self.flags,
            "Mesh",
            vertex_format,
            vertex_bytes,
            index_format,
            index_bytes,
        );
        let handle = self.assets.meshes.insert(mesh);
        log::info!(
            "Created mesh {:?}: {} vertices ({:?}), {} indices",
            handle,
            vertex_count,
            vertex_format,
            index_count
        );
        Ok(handle)
    }

    /// Loads a DDS (detected by its magic number) or any image the `image`
    /// crate decodes.
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> RenderResult<Handle<Texture>> {
        let path = path.as_ref();
        let context = &self.context;
        let texture = load_with_prompt(self.prompt.as_mut(), path, LoadError::is_recoverable, || {
            let bytes = read_file(path)?;
            if dds::is_dds(&bytes) {
                let image = dds::parse(&bytes)?;
                Texture::from_dds(&context.device, &context.queue, &image, path.to_str())
            } else {
                Texture::from_image_bytes(&context.device, &context.queue, &bytes, path)
            }
        })?;

        log::info!(
            "Loaded texture {:?}: {}x{} {:?}, {} mips",
            path,
            texture.width(),
            texture.height(),
            texture.format(),
            texture.mip_level_count()
        );
        Ok(self.assets.textures.insert(texture))
    }

    /// Loads an `.obj` file, or the binary mesh format for any other
    /// extension.
    pub fn load_mesh(&mut self, path: impl AsRef<Path>) -> RenderResult<Handle<Mesh>> {
        let path = path.as_ref();
        let (vertices, index_format, index_bytes) =
            load_with_prompt(self.prompt.as_mut(), path, LoadError::is_recoverable, || {
                if has_obj_extension(path) {
                    let mesh = obj::parse(&read_to_string(path)?)?;
                    let bytes = bytemuck::cast_slice(&mesh.indices).to_vec();
                    Ok((mesh.vertices, wgpu::IndexFormat::Uint32, bytes))
                } else {
                    let file = mesh_file::parse(&read_file(path)?)?;
                    let format =
                        index_format_for_size(file.index_size).ok_or(LoadError::IndexSize(file.index_size))?;
                    Ok((file.vertices, format, file.index_bytes))
                }
            })?;

        let label = path.file_name().and_then(|name| name.to_str()).unwrap_or("Mesh");
        let mesh = upload_mesh(
            &self.context.device,
            self.flags,
            label,
            VertexFormat::PosNormTex,
            bytemuck::cast_slice(&vertices),
            index_format,
            &index_bytes,
        );
        let handle = self.assets.meshes.insert(mesh);
        log::info!("Loaded mesh {:?} from {:?}", handle, path);
        Ok(handle)
    }

    /// Takes ownership of a texture built by the caller, e.g. with
    /// [`Texture::checkerboard`].
    pub fn add_texture(&mut self, texture: Texture) -> Handle<Texture> {
        self.assets.textures.insert(texture)
    }

    pub fn destroy_mesh(&mut self, mesh: Handle<Mesh>) -> RenderResult<()> {
        self.assets.remove_mesh(mesh).map(drop)
    }

    pub fn destroy_texture(&mut self, texture: Handle<Texture>) -> RenderResult<()> {
        self.assets.remove_texture(texture)?;
        self.materials.forget_texture(texture);
        Ok(())
    }

    pub fn mesh_info(&self, mesh: Handle<Mesh>) -> Option<MeshInfo> {
        self.assets.meshes.get(mesh).map(MeshInfo::from)
    }

    pub fn texture(&self, texture: Handle<Texture>) -> Option<&Texture> {
        self.assets.textures.get(texture)
    }

    pub fn cube_mesh(&self) -> Handle<Mesh> {
        self.builtins.cube
    }

    pub fn quad_mesh(&self) -> Handle<Mesh> {
        self.builtins.quad
    }

    pub fn sphere_mesh(&self) -> Handle<Mesh> {
        self.builtins.sphere
    }

    pub fn draw_3d(&mut self, mesh: Handle<Mesh>, material: Material, transform: Mat4) {
        self.commands.push_draw(RenderCommand {
            mesh,
            material,
            transform,
        });
    }

    pub fn draw_3d_textured(
        &mut self,
        mesh: Handle<Mesh>,
        texture: Handle<Texture>,
        normal_texture: Option<Handle<Texture>>,
        transform: Mat4,
    ) {
        let mut material = Material::textured(texture);
        material.normal = normal_texture;
        self.draw_3d(mesh, material, transform);
    }

    /// Screen-space sprites. There is no 2D pass, so the draw is dropped and
    /// does not count towards the frame's stats.
    pub fn draw_2d(&mut self, mesh: Handle<Mesh>, _texture: Handle<Texture>, _transform: Mat4) {
        log::trace!("Ignoring 2D draw of {:?}", mesh);
    }

    pub fn draw_light(&mut self, light: Light) {
        self.commands.push_light(light);
    }

    pub fn toggle_deferred(&mut self) {
        self.flags.toggle(RenderFlags::DEFERRED);
        log::info!("Pipeline mode: {:?}", self.pipeline_mode());
    }

    pub fn toggle_debug_graphics(&mut self) {
        self.flags.toggle(RenderFlags::DEBUG_GRAPHICS);
        log::info!(
            "Debug graphics {}",
            if self.flags.contains(RenderFlags::DEBUG_GRAPHICS) {
                "on"
            } else {
                "off"
            }
        );
    }

    pub fn flags(&self) -> RenderFlags {
        self.flags
    }

    pub fn pipeline_mode(&self) -> PipelineMode {
        if self.flags.contains(RenderFlags::DEFERRED) {
            PipelineMode::Deferred
        } else {
            PipelineMode::Forward
        }
    }

    pub fn frame_phase(&self) -> FramePhase {
        self.phase
    }

    pub fn gbuffer_size(&self) -> (u32, u32) {
        self.gbuffer.size()
    }

    pub fn target_status(&self) -> &TargetStatus {
        &self.target_status
    }

    pub fn shadow_map_size(&self) -> u32 {
        self.shadows.size()
    }

    pub fn last_frame_stats(&self) -> RendererStats {
        self.stats
    }

    /// Copies a render target back to the CPU. Blocks until the GPU is idle.
    pub fn read_target(&self, target: RenderTarget) -> RenderResult<TargetImage> {
        let texture = match target {
            RenderTarget::Albedo => &self.gbuffer.albedo.texture,
            RenderTarget::Normal => &self.gbuffer.normal.texture,
            RenderTarget::Specular => &self.gbuffer.specular.texture,
            RenderTarget::Depth => &self.gbuffer.linear_depth.texture,
            RenderTarget::Hdr => self.hdr.texture(),
            RenderTarget::Output => {
                self.context
                    .offscreen_texture()
                    .ok_or_else(|| RenderError::Readback {
                        label: target.label(),
                        reason: "window surfaces can't be read back".to_string(),
                    })?
            }
        };
        read_texture(&self.context.device, &self.context.queue, texture, target.label())
    }

    /// Draws everything submitted since the last frame, then clears the
    /// command list whether or not the frame succeeded.
    pub fn render(&mut self) -> RenderResult<()> {
        if self.phase == FramePhase::ShutDown {
            return Err(RenderError::ShutDown);
        }

        let result = self.render_frame();
        self.commands.clear();
        self.phase = FramePhase::End;
        if let Err(err) = &result {
            log::error!("Frame not presented: {}", err);
        }
        result
    }

    fn render_frame(&mut self) -> RenderResult<()> {
        self.phase = FramePhase::Begin;
        let frame = self.context.acquire_frame()?;
        let device = &self.context.device;
        let queue = &self.context.queue;

        let camera = CameraUniform::new(
            self.view,
            self.projection,
            self.context.width,
            self.context.height,
        );
        self.camera_buffer.update(queue, &camera);
        let eye = camera_position(self.view);

        self.object_scratch.clear();
        let mut draws: Vec<PreparedDraw<'_>> = Vec::with_capacity(self.commands.draws().len());
        let mut skipped_draws = 0;
        for command in self.commands.draws() {
            let Some(mesh) = self.assets.meshes.get(command.mesh) else {
                log::warn!("Skipping draw with stale mesh handle {:?}", command.mesh);
                skipped_draws += 1;
                continue;
            };
            draws.push(PreparedDraw {
                mesh,
                material: command.material.texture_key(),
                instance: self.object_scratch.len() as u32,
            });
            self.object_scratch
                .push(ObjectData::new(command.transform, &command.material));
        }

        self.objects_buffer
            .update(device, queue, &self.object_scratch);
        self.materials.prepare(
            device,
            &self.assets.textures,
            draws.iter().map(|draw| draw.material),
        );

        let lights = self.commands.lights();
        let mode = self.pipeline_mode();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("FrameEncoder"),
        });

        self.phase = FramePhase::GeometryOrForward;
        let mut shadow_map_rendered = false;
        match mode {
            PipelineMode::Deferred => {
                self.geometry.render(
                    &mut encoder,
                    &self.gbuffer,
                    &self.camera_buffer,
                    &self.objects_buffer,
                    &self.materials,
                    &draws,
                );

                self.phase = FramePhase::Shadow;
                let shadow = shadow_caster(lights).map(|direction| DirectionalShadow::new(direction, eye));
                shadow_map_rendered = shadow.is_some();
                self.shadows.render(
                    queue,
                    &mut encoder,
                    &self.objects_buffer,
                    shadow.map(|shadow| shadow.view_proj()),
                    &draws,
                );

                self.phase = FramePhase::Lighting;
                self.lighting.render(
                    device,
                    queue,
                    &mut encoder,
                    &self.hdr,
                    &self.camera_buffer,
                    &self.shadows,
                    LightMeshes {
                        fullscreen: &self.fullscreen_quad,
                        volume: &self.light_volume,
                    },
                    lights,
                    shadow.map(|shadow| shadow.texture_matrix()),
                    eye,
                );
            }
            PipelineMode::Forward => {
                self.forward.render(
                    queue,
                    &mut encoder,
                    &self.hdr,
                    &self.gbuffer,
                    &self.camera_buffer,
                    &self.objects_buffer,
                    &self.materials,
                    &draws,
                    lights,
                );
            }
        }

        self.phase = FramePhase::Present;
        let debug_view =
            mode == PipelineMode::Deferred && self.flags.contains(RenderFlags::DEBUG_GRAPHICS);
        self.present.render(
            queue,
            &mut encoder,
            &frame.view,
            &self.fullscreen_quad,
            debug_view,
        );

        queue.submit(Some(encoder.finish()));
        frame.present();

        self.stats = RendererStats {
            draw_count: draws.len() as u32,
            skipped_draws,
            light_count: lights.len() as u32,
            shadow_map_rendered,
        };
        log::debug!("Frame stats: {:?}", self.stats);
        Ok(())
    }
}

fn default_projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(
        FIELD_OF_VIEW_DEGREES.to_radians(),
        aspect,
        NEAR_PLANE,
        FAR_PLANE,
    )
}

/// Uploads vertex data, synthesizing tangents for `PosNormTex` meshes when
/// normal mapping is on.
fn upload_mesh(
    device: &wgpu::Device,
    flags: RenderFlags,
    label: &str,
    vertex_format: VertexFormat,
    vertex_bytes: &[u8],
    index_format: wgpu::IndexFormat,
    index_bytes: &[u8],
) -> Mesh {
    if vertex_format != VertexFormat::PosNormTex || !flags.contains(RenderFlags::NORMAL_MAPPING) {
        return Mesh::from_bytes(
            device,
            label,
            vertex_format,
            vertex_bytes,
            index_format,
            index_bytes,
        );
    }

    let vertices: Vec<Vertex> = vertex_bytes
        .chunks_exact(vertex_format.stride() as usize)
        .map(bytemuck::pod_read_unaligned)
        .collect();
    let index_size = crate::asset::mesh::index_element_size(index_format);
    let indices = widen_indices(index_bytes, index_size);
    let tangents = synthesize_tangents(&vertices, &indices);

    Mesh::from_bytes(
        device,
        label,
        VertexFormat::PosNormTanBitanTex,
        bytemuck::cast_slice(&tangents),
        index_format,
        index_bytes,
    )
}

fn create_builtin_meshes(device: &wgpu::Device, assets: &mut Assets, flags: RenderFlags) -> BuiltinMeshes {
    let (cube_vertices, cube_indices) = primitives::cube_mesh();
    let cube = upload_mesh(
        device,
        flags,
        "Cube",
        VertexFormat::PosNormTex,
        bytemuck::cast_slice(&cube_vertices),
        wgpu::IndexFormat::Uint16,
        bytemuck::cast_slice(&cube_indices),
    );

    let (quad_vertices, quad_indices) = primitives::quad_mesh();
    let quad = upload_mesh(
        device,
        flags,
        "Quad",
        VertexFormat::PosTex,
        bytemuck::cast_slice(&quad_vertices),
        wgpu::IndexFormat::Uint16,
        bytemuck::cast_slice(&quad_indices),
    );

    let (sphere_vertices, sphere_indices) = primitives::sphere_mesh(32, 16);
    let sphere = upload_mesh(
        device,
        flags,
        "Sphere",
        VertexFormat::PosNormTex,
        bytemuck::cast_slice(&sphere_vertices),
        wgpu::IndexFormat::Uint32,
        bytemuck::cast_slice(&sphere_indices),
    );

    BuiltinMeshes {
        cube: assets.meshes.insert(cube),
        quad: assets.meshes.insert(quad),
        sphere: assets.meshes.insert(sphere),
    }
}
