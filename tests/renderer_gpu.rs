//! Headless end-to-end tests. Each test skips itself when no GPU adapter is
//! available.
use deferred_renderer::asset::{Handle, Mesh};
use deferred_renderer::renderer::{
    FramePhase, Light, Material, PipelineMode, RenderTarget, Texture, VertexFormat,
};
use deferred_renderer::settings::RenderSettings;
use deferred_renderer::{init_logging, LoadError, RenderError, Renderer};
use glam::{Mat4, Vec3};

const WIDTH: u32 = 128;
const HEIGHT: u32 = 96;
const ALBEDO: [u8; 4] = [200, 120, 80, 255];
/// Fraction of albedo a directional light adds regardless of shadowing.
const AMBIENT: f32 = 0.05;

fn srgb_to_linear(encoded: u8) -> f32 {
    let c = encoded as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// A wide, thin slab whose top face sits at y = 0.1.
fn floor_transform() -> Mat4 {
    Mat4::from_scale(Vec3::new(20.0, 0.2, 20.0))
}

fn headless_renderer() -> Option<Renderer> {
    init_logging();
    match pollster::block_on(Renderer::headless(RenderSettings::default(), WIDTH, HEIGHT)) {
        Ok(renderer) => Some(renderer),
        Err(err) => {
            eprintln!("skipping GPU test, no usable adapter: {err}");
            None
        }
    }
}

fn submit_lit_cube(renderer: &mut Renderer) {
    let bytes: Vec<u8> = ALBEDO.iter().copied().cycle().take(4 * 4 * 4).collect();
    let texture = Texture::from_bytes(renderer.device(), renderer.queue(), &bytes, 4, 4, Some("Albedo"));
    let texture = renderer.add_texture(texture);

    renderer.set_3d_view_matrix(Mat4::look_at_rh(Vec3::new(0.0, 5.0, 2.0), Vec3::ZERO, Vec3::Y));
    renderer.draw_light(Light::directional(Vec3::new(0.0, -1.0, 0.0), Vec3::ONE));
    renderer.draw_3d(
        renderer.cube_mesh(),
        Material::textured(texture),
        Mat4::from_scale(Vec3::splat(2.0)),
    );
}

fn mesh_bytes(format: VertexFormat, vertex_count: u32, index_size: u32, index_count: u32) -> (Vec<u8>, Vec<u8>) {
    let vertices = vec![0u8; (vertex_count * format.stride()) as usize];
    let mut indices = Vec::new();
    for i in 0..index_count {
        let index = i % vertex_count;
        match index_size {
            2 => indices.extend_from_slice(&(index as u16).to_le_bytes()),
            _ => indices.extend_from_slice(&index.to_le_bytes()),
        }
    }
    (vertices, indices)
}

#[test]
fn create_mesh_keeps_index_data_for_every_format() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };

    let mut handles: Vec<Handle<Mesh>> = Vec::new();
    for format in VertexFormat::ALL {
        for index_size in [2, 4] {
            let (vertices, indices) = mesh_bytes(format, 4, index_size, 6);
            let handle = renderer
                .create_mesh(4, format, 6, index_size, &vertices, &indices)
                .expect("mesh upload");

            let info = renderer.mesh_info(handle).expect("live mesh");
            assert_eq!(info.index_count, 6);
            assert_eq!(info.index_size, index_size);
            assert_eq!(info.vertex_count, 4);
            let expected_format = match format {
                VertexFormat::PosNormTex => VertexFormat::PosNormTanBitanTex,
                other => other,
            };
            assert_eq!(info.vertex_format, expected_format);

            assert!(!handles.contains(&handle));
            handles.push(handle);
        }
    }
}

#[test]
fn create_mesh_rejects_mismatched_sizes() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };

    let (vertices, indices) = mesh_bytes(VertexFormat::PosTex, 3, 2, 3);
    let short = renderer.create_mesh(4, VertexFormat::PosTex, 3, 2, &vertices, &indices);
    assert!(matches!(
        short,
        Err(RenderError::Load(LoadError::DataSize { what: "vertex", .. }))
    ));

    let odd_width = renderer.create_mesh(3, VertexFormat::PosTex, 3, 3, &vertices, &indices);
    assert!(matches!(
        odd_width,
        Err(RenderError::Load(LoadError::IndexSize(3)))
    ));
}

#[test]
fn resize_twice_keeps_targets_complete() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };

    renderer.resize(200, 150);
    renderer.resize(200, 150);
    assert_eq!(renderer.gbuffer_size(), (200, 150));
    assert!(renderer.target_status().is_complete());

    renderer.resize(0, 150);
    assert_eq!(renderer.gbuffer_size(), (200, 150));
}

#[test]
fn deferred_frame_writes_albedo_and_light() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };
    assert_eq!(renderer.pipeline_mode(), PipelineMode::Deferred);

    submit_lit_cube(&mut renderer);
    renderer.render().expect("frame");

    let stats = renderer.last_frame_stats();
    assert_eq!(stats.draw_count, 1);
    assert_eq!(stats.light_count, 1);
    assert!(stats.shadow_map_rendered);
    assert_eq!(renderer.frame_phase(), FramePhase::End);

    let albedo = renderer.read_target(RenderTarget::Albedo).expect("albedo readback");
    let centre = albedo.center();
    for channel in 0..3 {
        let expected = ALBEDO[channel] as f32 / 255.0;
        assert!(
            (centre[channel] - expected).abs() < 0.02,
            "albedo channel {channel}: {} vs {expected}",
            centre[channel]
        );
    }

    // The top face looks straight at the light, so the red channel carries
    // the full linear albedo, far above the ambient floor.
    let hdr = renderer.read_target(RenderTarget::Hdr).expect("hdr readback");
    let lit = hdr.center();
    let albedo_red = srgb_to_linear(ALBEDO[0]);
    assert!(
        lit[0] > 0.9 * albedo_red,
        "centre pixel {lit:?} not lit by the sun (albedo {albedo_red})"
    );
    assert!(lit[0] > 10.0 * AMBIENT * albedo_red);

    let depth = renderer.read_target(RenderTarget::Depth).expect("depth readback");
    assert!(depth.center()[0] > 0.0);
}

#[test]
fn forward_frame_lights_the_hdr_target() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };

    renderer.toggle_deferred();
    assert_eq!(renderer.pipeline_mode(), PipelineMode::Forward);

    submit_lit_cube(&mut renderer);
    renderer.render().expect("frame");
    assert!(!renderer.last_frame_stats().shadow_map_rendered);

    let hdr = renderer.read_target(RenderTarget::Hdr).expect("hdr readback");
    assert!(hdr.center()[..3].iter().all(|&c| c > 0.0));

    let output = renderer.read_target(RenderTarget::Output).expect("output readback");
    assert_eq!((output.width, output.height), (WIDTH, HEIGHT));
}

#[test]
fn destroyed_mesh_draws_are_skipped() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };

    let (vertices, indices) = mesh_bytes(VertexFormat::PosTex, 3, 2, 3);
    let mesh = renderer
        .create_mesh(3, VertexFormat::PosTex, 3, 2, &vertices, &indices)
        .expect("mesh upload");
    renderer.destroy_mesh(mesh).expect("first destroy");
    assert!(matches!(
        renderer.destroy_mesh(mesh),
        Err(RenderError::StaleHandle("mesh"))
    ));

    renderer.draw_3d(mesh, Material::default(), Mat4::IDENTITY);
    renderer.render().expect("frame");
    let stats = renderer.last_frame_stats();
    assert_eq!(stats.draw_count, 0);
    assert_eq!(stats.skipped_draws, 1);
}

#[test]
fn render_after_shutdown_fails() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };

    renderer.shutdown();
    assert!(renderer.is_shut_down());
    assert!(matches!(renderer.render(), Err(RenderError::ShutDown)));
}

#[test]
fn occluder_leaves_only_ambient_in_its_shadow() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };

    renderer.set_3d_view_matrix(Mat4::look_at_rh(Vec3::new(0.0, 4.0, 8.0), Vec3::ZERO, Vec3::Y));
    renderer.draw_light(Light::directional(Vec3::NEG_Y, Vec3::ONE));
    let cube = renderer.cube_mesh();
    renderer.draw_3d(cube, Material::default(), floor_transform());
    // Hangs over the origin, out of the camera's line of sight to it
    renderer.draw_3d(
        cube,
        Material::default(),
        Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0)),
    );
    renderer.render().expect("frame");
    assert!(renderer.last_frame_stats().shadow_map_rendered);

    let hdr = renderer.read_target(RenderTarget::Hdr).expect("hdr readback");

    // Centre of the screen lands on the floor at about z = 0.2, under the box
    let shadowed = hdr.center();
    assert!(
        (shadowed[0] - AMBIENT).abs() < 0.01,
        "shadowed floor {shadowed:?} should be ambient only"
    );

    // Lower on screen the floor is at about z = 3.3, clear of the shadow
    let open = hdr.pixel(WIDTH / 2, HEIGHT * 3 / 4);
    assert!(open[0] > 0.5, "open floor {open:?} should be lit");
}

#[test]
fn point_light_volume_lights_from_inside_and_outside() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };
    let cube = renderer.cube_mesh();

    // Eye is about 2 units from the light, well inside its 6-unit radius
    renderer.set_3d_view_matrix(Mat4::look_at_rh(Vec3::new(0.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y));
    renderer.draw_light(Light::point(Vec3::new(0.0, 1.5, 1.0), 6.0, Vec3::ONE));
    renderer.draw_3d(cube, Material::default(), floor_transform());
    renderer.render().expect("frame from inside");
    assert!(!renderer.last_frame_stats().shadow_map_rendered);

    let inside = renderer.read_target(RenderTarget::Hdr).expect("hdr readback").center();
    assert!(inside[0] > 0.1, "floor unlit with the camera inside the volume: {inside:?}");

    // Eye is about 14 units away from a 3-unit light
    renderer.set_3d_view_matrix(Mat4::look_at_rh(Vec3::new(0.0, 8.0, 12.0), Vec3::ZERO, Vec3::Y));
    renderer.draw_light(Light::point(Vec3::new(0.0, 1.0, 0.0), 3.0, Vec3::ONE));
    renderer.draw_3d(cube, Material::default(), floor_transform());
    renderer.render().expect("frame from outside");

    let outside = renderer.read_target(RenderTarget::Hdr).expect("hdr readback").center();
    assert!(outside[0] > 0.1, "floor unlit with the camera outside the volume: {outside:?}");
}

#[test]
fn empty_meshes_are_rejected_before_upload() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };

    let empty = renderer.create_mesh(0, VertexFormat::PosNormTex, 0, 2, &[], &[]);
    assert!(matches!(
        empty,
        Err(RenderError::Load(LoadError::EmptyMesh { vertices: 0, indices: 0 }))
    ));

    let (vertices, _) = mesh_bytes(VertexFormat::PosTex, 3, 2, 3);
    let no_indices = renderer.create_mesh(3, VertexFormat::PosTex, 0, 2, &vertices, &[]);
    assert!(matches!(
        no_indices,
        Err(RenderError::Load(LoadError::EmptyMesh { vertices: 3, indices: 0 }))
    ));

    // Nothing was inserted, so a frame still renders cleanly
    renderer.render().expect("frame");
}

#[test]
fn faceless_obj_is_rejected() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };

    let path = std::env::temp_dir().join(format!("faceless-{}.obj", std::process::id()));
    std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\n").expect("write obj");
    let result = renderer.load_mesh(&path);
    let _ = std::fs::remove_file(&path);

    assert!(matches!(
        result,
        Err(RenderError::Load(LoadError::EmptyMesh { .. }))
    ));
}

#[test]
fn two_d_draws_are_accepted_and_ignored() {
    let Some(mut renderer) = headless_renderer() else {
        return;
    };

    let view = Mat4::orthographic_rh(0.0, WIDTH as f32, HEIGHT as f32, 0.0, -1.0, 1.0);
    renderer.set_2d_view_matrix(view);
    assert_eq!(renderer.view_2d_matrix(), view);

    let white = Texture::white(renderer.device(), renderer.queue());
    let white = renderer.add_texture(white);
    renderer.draw_2d(renderer.quad_mesh(), white, Mat4::IDENTITY);
    renderer.render().expect("frame");

    let stats = renderer.last_frame_stats();
    assert_eq!(stats.draw_count, 0);
    assert_eq!(stats.skipped_draws, 0);
}
